//! The single-pass driver: reader, splitter, classifier and sink.

use std::fs::{self, File};
use std::io::Read;
use std::path::Path;
use std::time::{Duration, Instant};

use tracing::info;

use crate::classifier::TableClassifier;
use crate::config::SplitConfig;
use crate::errors::{Error, Result};
use crate::reader::ChunkReader;
use crate::sink::{DestinationFactory, DirectoryDestinations, Sink, SinkReport, TableReport};
use crate::splitter::StatementSplitter;

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Counters of one run, threaded through the pipeline.
#[derive(Debug, Clone)]
pub struct RunContext {
    total_bytes: Option<u64>,
    bytes_read: u64,
    statements: u64,
    started: Instant,
    progress_step: u64,
    next_progress: u64,
}

impl RunContext {
    /// Starts a run over a source of `total_bytes`, if known.
    #[must_use]
    pub fn new(total_bytes: Option<u64>, progress_step: u64) -> Self {
        let progress_step = progress_step.max(1);
        Self {
            total_bytes,
            bytes_read: 0,
            statements: 0,
            started: Instant::now(),
            progress_step,
            next_progress: progress_step,
        }
    }

    /// Accounts for `bytes` more source bytes.
    ///
    /// Emits a progress event and returns `true` each time the total crosses
    /// another progress step.
    pub fn advance(&mut self, bytes: usize) -> bool {
        self.bytes_read += bytes as u64;
        if self.bytes_read < self.next_progress {
            return false;
        }
        self.next_progress = (self.bytes_read / self.progress_step + 1) * self.progress_step;
        info!(
            bytes_read = self.bytes_read,
            percent = %format!("{:.2}", self.percent().unwrap_or_default()),
            statements = self.statements,
            elapsed = ?self.elapsed(),
            "progress"
        );
        true
    }

    /// Share of the source processed so far, in percent.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percent(&self) -> Option<f64> {
        self.total_bytes
            .filter(|&total| total > 0)
            .map(|total| self.bytes_read as f64 / total as f64 * 100.0)
    }

    /// Source bytes read so far.
    #[must_use]
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Statements routed so far.
    #[must_use]
    pub fn statements(&self) -> u64 {
        self.statements
    }

    /// Time since the run started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct SplitReport {
    /// Statements written across all tables.
    pub statements: u64,
    /// Source bytes consumed.
    pub bytes_read: u64,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
    /// Per-table statistics, in order of first appearance.
    pub tables: Vec<TableReport>,
}

/// Streams `reader` through the splitter and routes every statement.
///
/// The sink is finished once the source is exhausted. On error it is
/// dropped, which releases every destination opened so far.
///
/// # Errors
///
/// Returns the first read, create or write error, or
/// [`Error::InvalidConfig`] for an unusable `config`.
pub fn split_stream<R, F>(
    reader: R,
    sink: Sink<F>,
    classifier: &TableClassifier,
    config: &SplitConfig,
    ctx: &mut RunContext,
) -> Result<SinkReport>
where
    R: Read,
    F: DestinationFactory,
{
    config.validate()?;
    run_pass(reader, sink, classifier, config, ctx)
}

/// The single pass behind [`split_stream`], for an already validated
/// `config`.
fn run_pass<R, F>(
    reader: R,
    mut sink: Sink<F>,
    classifier: &TableClassifier,
    config: &SplitConfig,
    ctx: &mut RunContext,
) -> Result<SinkReport>
where
    R: Read,
    F: DestinationFactory,
{
    let mut chunks = ChunkReader::new(reader, config.chunk_size);
    let mut splitter = StatementSplitter::new();

    while let Some(chunk) = chunks.next_chunk()? {
        let len = chunk.len();
        splitter.push(chunk);
        route(&mut splitter, &mut sink, classifier, ctx)?;
        ctx.advance(len);
    }
    splitter.finish();
    route(&mut splitter, &mut sink, classifier, ctx)?;

    sink.finish()
}

fn route<F: DestinationFactory>(
    splitter: &mut StatementSplitter,
    sink: &mut Sink<F>,
    classifier: &TableClassifier,
    ctx: &mut RunContext,
) -> Result<()> {
    for statement in splitter.statements() {
        let table = classifier.classify(statement.as_bytes());
        sink.write(&table, &statement)?;
        ctx.statements += 1;
    }
    Ok(())
}

/// Splits the dump at `input` into one file per table inside `output_dir`.
///
/// The configuration is validated and the input is opened and inspected
/// before the output directory, which is created with its parents when
/// missing, so setup failures leave nothing behind.
///
/// # Errors
///
/// Returns [`Error::InvalidConfig`], a setup error ([`Error::OpenSource`],
/// [`Error::StatSource`], [`Error::CreateOutputDir`]) or any error of
/// [`split_stream`].
pub fn split_file(input: &Path, output_dir: &Path, config: &SplitConfig) -> Result<SplitReport> {
    config.validate()?;

    let source = File::open(input).map_err(|source| Error::OpenSource {
        path: input.to_path_buf(),
        source,
    })?;
    let total_bytes = source
        .metadata()
        .map_err(|source| Error::StatSource {
            path: input.to_path_buf(),
            source,
        })?
        .len();
    fs::create_dir_all(output_dir).map_err(|source| Error::CreateOutputDir {
        path: output_dir.to_path_buf(),
        source,
    })?;

    #[allow(clippy::cast_precision_loss)]
    let size_gib = total_bytes as f64 / GIB;
    info!(
        input = %input.display(),
        output = %output_dir.display(),
        size_gib = %format!("{size_gib:.2}"),
        "splitting dump"
    );

    let mut ctx = RunContext::new(Some(total_bytes), config.progress_step);
    let sink = Sink::new(DirectoryDestinations::new(output_dir), config.flush_policy);
    let report = run_pass(source, sink, &TableClassifier::new(), config, &mut ctx)?;

    let report = SplitReport {
        statements: ctx.statements(),
        bytes_read: ctx.bytes_read(),
        elapsed: ctx.elapsed(),
        tables: report.tables,
    };
    info!(
        statements = report.statements,
        tables = report.tables.len(),
        elapsed = ?report.elapsed,
        "split complete"
    );
    Ok(report)
}
