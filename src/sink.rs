//! Per-table output routing with batched writes.
//!
//! The [`Sink`] owns every open destination and every pending buffer of a
//! run. Statements are rendered into the buffer of their table and written
//! out in bulk whenever the configured [`FlushPolicy`] threshold is crossed.
//! Destinations are released exactly once, by [`Sink::finish`] or, on any
//! error path, when the sink is dropped.

mod destination;

use std::io::Write;

use indexmap::IndexMap;
use tracing::debug;

pub use destination::{DestinationFactory, DirectoryDestinations, EXTENSION, destination_name};

use crate::config::FlushPolicy;
use crate::errors::{Error, Result};
use crate::splitter::Statement;

/// Separator written after every statement.
const SEPARATOR: u8 = b'\n';

struct Destination<W> {
    writer: W,
    pending: Vec<u8>,
    statements: u64,
    bytes_written: u64,
}

/// Statistics of one destination at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReport {
    /// Destination name, i.e. the file stem.
    pub name: String,
    /// Statements routed to the destination.
    pub statements: u64,
    /// Bytes written to the destination.
    pub bytes: u64,
}

/// Statistics of every destination, in creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SinkReport {
    /// One entry per destination.
    pub tables: Vec<TableReport>,
}

impl SinkReport {
    /// Total statements across all destinations.
    #[must_use]
    pub fn statements(&self) -> u64 {
        self.tables.iter().map(|table| table.statements).sum()
    }

    /// Looks a destination up by name.
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&TableReport> {
        self.tables.iter().find(|table| table.name == name)
    }
}

/// Routes statements to lazily created per-table destinations.
pub struct Sink<F: DestinationFactory> {
    factory: F,
    destinations: IndexMap<String, Destination<F::Writer>>,
    policy: FlushPolicy,
    pending_bytes: usize,
    pending_statements: usize,
}

impl<F: DestinationFactory> Sink<F> {
    /// Creates a sink without any destination.
    #[must_use]
    pub fn new(factory: F, policy: FlushPolicy) -> Self {
        Self {
            factory,
            destinations: IndexMap::new(),
            policy,
            pending_bytes: 0,
            pending_statements: 0,
        }
    }

    /// Buffers `statement` for `table`, creating its destination on first use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CreateDestination`] when the destination cannot be
    /// created, or [`Error::Write`] when the write-out this triggers fails.
    pub fn write(&mut self, table: &str, statement: &Statement) -> Result<()> {
        let name = destination_name(table);
        let destination = if let Some(index) = self.destinations.get_index_of(&*name) {
            &mut self.destinations[index]
        } else {
            let writer = self
                .factory
                .create(&name)
                .map_err(|source| Error::CreateDestination {
                    table: table.to_owned(),
                    source,
                })?;
            debug!(table, destination = %name, "created destination");
            self.destinations
                .entry(name.into_owned())
                .or_insert(Destination {
                    writer,
                    pending: Vec::new(),
                    statements: 0,
                    bytes_written: 0,
                })
        };

        destination.pending.reserve(statement.rendered_len() + 1);
        statement.render_into(&mut destination.pending);
        destination.pending.push(SEPARATOR);
        destination.statements += 1;

        self.pending_bytes += statement.rendered_len() + 1;
        self.pending_statements += 1;
        if self
            .policy
            .should_flush(self.pending_bytes, self.pending_statements)
        {
            self.flush()?;
        }
        Ok(())
    }

    /// Writes every non-empty pending buffer out with a single call each.
    ///
    /// Buffers are cleared in place and keep their capacity. Flushing with
    /// nothing pending writes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Write`] for the first destination that fails.
    pub fn flush(&mut self) -> Result<()> {
        if self.pending_statements == 0 {
            return Ok(());
        }
        let mut written = 0;
        for (name, destination) in &mut self.destinations {
            if destination.pending.is_empty() {
                continue;
            }
            destination
                .writer
                .write_all(&destination.pending)
                .map_err(|source| Error::Write {
                    table: name.clone(),
                    bytes: destination.pending.len(),
                    source,
                })?;
            destination.bytes_written += destination.pending.len() as u64;
            written += 1;
            destination.pending.clear();
        }
        debug!(
            destinations = written,
            bytes = self.pending_bytes,
            statements = self.pending_statements,
            "flushed pending statements"
        );
        self.pending_bytes = 0;
        self.pending_statements = 0;
        Ok(())
    }

    /// Flushes what is left, then releases every destination.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Write`] when the final write-out fails. Destinations
    /// are released either way.
    pub fn finish(mut self) -> Result<SinkReport> {
        self.flush()?;
        let mut tables = Vec::with_capacity(self.destinations.len());
        for (name, mut destination) in self.destinations.drain(..) {
            destination.writer.flush().map_err(|source| Error::Write {
                table: name.clone(),
                bytes: 0,
                source,
            })?;
            tables.push(TableReport {
                name,
                statements: destination.statements,
                bytes: destination.bytes_written,
            });
        }
        Ok(SinkReport { tables })
    }

    /// Number of destinations created so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    /// Whether no destination has been created yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }

    /// Names of the destinations created so far, in creation order.
    pub fn destination_names(&self) -> impl Iterator<Item = &str> {
        self.destinations.keys().map(String::as_str)
    }

    /// Rendered bytes waiting for the next flush.
    #[must_use]
    pub fn pending_bytes(&self) -> usize {
        self.pending_bytes
    }

    /// Statements waiting for the next flush.
    #[must_use]
    pub fn pending_statements(&self) -> usize {
        self.pending_statements
    }
}
