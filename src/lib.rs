#![doc = include_str!("../README.md")]
#![deny(clippy::mod_module_files)]

pub mod classifier;
pub mod config;
pub mod errors;
pub mod pipeline;
pub mod reader;
pub mod sink;
pub mod splitter;

// Re-export main types
pub use classifier::{FALLBACK_TABLE, TableClassifier, Verb};
pub use config::{FlushPolicy, SplitConfig};
pub use pipeline::{RunContext, SplitReport, split_file, split_stream};
pub use reader::ChunkReader;
pub use sink::{DestinationFactory, DirectoryDestinations, Sink, SinkReport, TableReport};
pub use splitter::{DELIMITER, Statement, StatementSplitter, is_valid_statement, split_all};

// Re-export errors
pub use errors::{Error, Result};
