//! Chunk-boundary fuzzer for the statement splitter.
//!
//! The first input byte picks a chunk size, the rest is the source. Feeding
//! the source chunk by chunk must yield exactly the statements of a single
//! whole-source pass.

use honggfuzz::fuzz;
use sql_dump_splitter::{StatementSplitter, split_all};

fn main() {
    loop {
        fuzz!(|data: &[u8]| {
            let Some((&size, source)) = data.split_first() else {
                return;
            };
            let size = usize::from(size).max(1);

            let mut splitter = StatementSplitter::new();
            let mut chunked = Vec::new();
            for chunk in source.chunks(size) {
                chunked.extend(splitter.ingest(chunk));
            }
            chunked.extend(splitter.ingest_last(&[]));

            assert_eq!(chunked, split_all(source));
        });
    }
}
