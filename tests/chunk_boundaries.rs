//! Chunk-boundary invariance of the streaming splitter.
//!
//! The same source must produce the same statements, in the same order and
//! with the same text, whatever the size of the chunks it arrives in.

use rand::prelude::*;
use rand::rngs::StdRng;
use sql_dump_splitter::{Statement, StatementSplitter, is_valid_statement, split_all};

// =============================================================================
// Helper functions
// =============================================================================

/// Feed `source` in chunks of the given sizes, cycling through them.
fn split_with_sizes(source: &[u8], sizes: &[usize]) -> Vec<Statement> {
    let mut splitter = StatementSplitter::new();
    let mut statements = Vec::new();
    let mut rest = source;
    for &size in sizes.iter().cycle() {
        if rest.is_empty() {
            break;
        }
        let (chunk, tail) = rest.split_at(size.min(rest.len()));
        statements.extend(splitter.ingest(chunk));
        rest = tail;
    }
    splitter.finish();
    statements.extend(splitter.statements());
    statements
}

/// Split the whole source on `;` and keep the valid pieces, trimmed of
/// Unicode whitespace.
fn naive_split(source: &[u8]) -> Vec<Vec<u8>> {
    source
        .split(|&b| b == b';')
        .map(|piece| std::str::from_utf8(piece).map_or(piece, |text| text.trim().as_bytes()))
        .filter(|piece| is_valid_statement(piece))
        .map(<[u8]>::to_vec)
        .collect()
}

/// Build a dump exercising comments, blank pieces, multi-line statements,
/// multi-byte text and an unterminated tail.
fn synthetic_dump(rng: &mut StdRng, statements: usize) -> String {
    let tables = ["users", "orders", "order_items", "audit_log"];
    let mut dump = String::from("-- MySQL dump\n/*!40101 SET NAMES utf8 */;\n\n");
    for i in 0..statements {
        let table = tables[rng.random_range(0..tables.len())];
        let statement = match rng.random_range(0..7) {
            0 => format!("CREATE TABLE IF NOT EXISTS `{table}` (\n  id INT,\n  name TEXT\n)"),
            1 => format!("INSERT INTO `{table}` VALUES ({i}, 'naïve'),\n({}, 'zoë')", i + 1),
            2 => format!("UPDATE {table} SET name = 'x' WHERE id = {i}"),
            3 => format!("DELETE FROM {table} WHERE id = {i}"),
            4 => format!("-- only a comment about {table}\n"),
            5 => String::from("   \n\t\u{3000}\u{a0}"),
            _ => format!("LOCK TABLES `{table}` WRITE"),
        };
        dump.push_str(&statement);
        dump.push(';');
        if rng.random_range(0..3) == 0 {
            dump.push_str("\n\n");
        } else {
            dump.push('\n');
        }
    }
    dump.push_str("INSERT INTO users VALUES (999, 'no delimiter at end')\n");
    dump
}

// =============================================================================
// Tests
// =============================================================================

#[test]
fn test_fixed_chunk_sizes_match_whole_file() {
    let mut rng = StdRng::seed_from_u64(7);
    let dump = synthetic_dump(&mut rng, 200);
    let source = dump.as_bytes();
    let whole = split_all(source);
    assert!(whole.len() > 100);

    for size in [1, 7, 4096, source.len()] {
        assert_eq!(split_with_sizes(source, &[size]), whole, "chunk size {size}");
    }
}

#[test]
fn test_random_chunk_sizes_match_whole_file() {
    let mut rng = StdRng::seed_from_u64(42);
    for round in 0..20 {
        let dump = synthetic_dump(&mut rng, 50);
        let source = dump.as_bytes();
        let whole = split_all(source);
        let sizes: Vec<usize> = (0..16).map(|_| rng.random_range(1..64)).collect();
        assert_eq!(
            split_with_sizes(source, &sizes),
            whole,
            "round {round}, sizes {sizes:?}"
        );
    }
}

#[test]
fn test_no_loss_no_duplication_against_naive_split() {
    let mut rng = StdRng::seed_from_u64(1234);
    let dump = synthetic_dump(&mut rng, 300);
    let source = dump.as_bytes();

    let streamed: Vec<Vec<u8>> = split_with_sizes(source, &[3, 11, 97])
        .into_iter()
        .map(Statement::into_bytes)
        .collect();
    assert_eq!(streamed, naive_split(source));
}

#[test]
fn test_only_the_tail_is_unterminated() {
    let mut rng = StdRng::seed_from_u64(99);
    let dump = synthetic_dump(&mut rng, 40);
    let statements = split_with_sizes(dump.as_bytes(), &[5]);
    let (last, rest) = statements.split_last().unwrap();
    assert!(!last.is_terminated());
    assert_eq!(last.text(), "INSERT INTO users VALUES (999, 'no delimiter at end')");
    assert!(rest.iter().all(Statement::is_terminated));
}

#[test]
fn test_long_statement_spanning_many_chunks() {
    let mut dump = String::from("INSERT INTO big VALUES ");
    for i in 0..10_000 {
        if i > 0 {
            dump.push(',');
        }
        dump.push_str(&format!("({i}, 'row {i}')"));
    }
    dump.push_str(";INSERT INTO small VALUES (1);");

    let statements = split_with_sizes(dump.as_bytes(), &[64]);
    assert_eq!(statements.len(), 2);
    assert_eq!(statements[0].as_bytes().len(), dump.len() - 30);
    assert_eq!(statements[1].text(), "INSERT INTO small VALUES (1)");
}

#[test]
fn test_carry_is_bounded_by_distance_between_delimiters() {
    let mut splitter = StatementSplitter::new();
    let mut max_carry = 0;
    for _ in 0..1_000 {
        splitter.ingest(b"INSERT INTO t VALUES (1);");
        max_carry = max_carry.max(splitter.carry_len());
    }
    assert_eq!(max_carry, 0);

    splitter.ingest(b"INSERT INTO t VAL");
    assert_eq!(splitter.carry_len(), 17);
}
