//! Classifier fuzzer.
//!
//! Classification must never panic, must be deterministic and must always
//! yield a non-empty lowercase name.

use honggfuzz::fuzz;
use sql_dump_splitter::TableClassifier;

fn main() {
    let classifier = TableClassifier::new();
    loop {
        fuzz!(|data: &[u8]| {
            let table = classifier.classify(data);
            assert!(!table.is_empty());
            assert_eq!(table, table.to_lowercase());
            assert_eq!(table, classifier.classify(data));
        });
    }
}
