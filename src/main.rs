//! Command-line entry point: split a SQL dump into one file per table.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use clap::builder::PathBufValueParser;
use sql_dump_splitter::config::{DEFAULT_CHUNK_SIZE, DEFAULT_FLUSH_BYTES, DEFAULT_PROGRESS_STEP};
use sql_dump_splitter::sink::EXTENSION;
use sql_dump_splitter::{FlushPolicy, SplitConfig, split_file};
use tracing_subscriber::EnvFilter;

/// Split a large SQL dump into one file per table.
///
/// Statements end at every `;`. Each one is routed by its leading verb
/// (CREATE TABLE, INSERT INTO, UPDATE, DELETE FROM, ALTER TABLE, DROP TABLE)
/// to `<table>.sql`; anything else goes to `misc.sql`.
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    after_help = "Example:\n  sql-dump-splitter --input database.sql --output split_files"
)]
struct Args {
    /// SQL dump to split
    #[arg(short, long)]
    input: PathBuf,

    /// Directory receiving the table files (created if missing)
    #[arg(short, long, default_value = "output", value_parser = PathBufValueParser::new())]
    output: PathBuf,

    /// Bytes requested from the dump per read
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Flush buffered statements once more than this many bytes are pending
    #[arg(long, conflicts_with = "flush_statements")]
    flush_bytes: Option<usize>,

    /// Flush buffered statements once more than this many statements are pending
    #[arg(long)]
    flush_statements: Option<usize>,

    /// Bytes of input between two progress events
    #[arg(long, default_value_t = DEFAULT_PROGRESS_STEP)]
    progress_step: u64,

    /// Log verbosity
    #[arg(
        long,
        default_value = "info",
        value_parser = ["error", "warn", "info", "debug", "trace"]
    )]
    log_level: String,
}

impl Args {
    fn config(&self) -> SplitConfig {
        let flush_policy = match (self.flush_bytes, self.flush_statements) {
            (_, Some(statements)) => FlushPolicy::Statements(statements),
            (bytes, None) => FlushPolicy::Bytes(bytes.unwrap_or(DEFAULT_FLUSH_BYTES)),
        };
        SplitConfig::default()
            .with_chunk_size(self.chunk_size)
            .with_flush_policy(flush_policy)
            .with_progress_step(self.progress_step)
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!(
            "{}={}",
            env!("CARGO_CRATE_NAME"),
            args.log_level
        )))
        .with_writer(std::io::stderr)
        .init();

    println!("Splitting file: {}", args.input.display());
    println!("Output directory: {}", args.output.display());

    let report = split_file(&args.input, &args.output, &args.config())
        .with_context(|| format!("failed to split {}", args.input.display()))?;

    println!(
        "Done: {} statements into {} tables in {:.2?}",
        report.statements,
        report.tables.len(),
        report.elapsed
    );
    for table in &report.tables {
        println!(
            "  {}.{EXTENSION}: {} statements, {} bytes",
            table.name, table.statements, table.bytes
        );
    }
    Ok(())
}
