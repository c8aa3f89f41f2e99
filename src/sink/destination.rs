//! Where the statements of one table end up.

use std::borrow::Cow;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Extension of every table file.
pub const EXTENSION: &str = "sql";

/// Opens the append target of a table.
///
/// Called at most once per destination name during a run.
pub trait DestinationFactory {
    /// The append target handed back for each destination.
    type Writer: Write;

    /// Creates the destination for `name`.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the destination cannot be
    /// created.
    fn create(&mut self, name: &str) -> io::Result<Self::Writer>;
}

/// Creates one `<name>.sql` file per destination inside a directory.
///
/// Existing files are truncated.
#[derive(Debug, Clone)]
pub struct DirectoryDestinations {
    dir: PathBuf,
}

impl DirectoryDestinations {
    /// Targets files in `dir`, which must already exist.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The output directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing destination `name`.
    #[must_use]
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{EXTENSION}"))
    }
}

impl DestinationFactory for DirectoryDestinations {
    type Writer = File;

    fn create(&mut self, name: &str) -> io::Result<File> {
        File::create(self.path_for(name))
    }
}

/// Turns a table name into a name usable as a file stem.
///
/// Path separators, characters rejected by common file systems and control
/// characters become `_`, so no table can write outside the output
/// directory. Names that are already safe are borrowed.
#[must_use]
pub fn destination_name(table: &str) -> Cow<'_, str> {
    fn is_unsafe(c: char) -> bool {
        c.is_control() || matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|')
    }

    if table.contains(is_unsafe) {
        Cow::Owned(table.replace(is_unsafe, "_"))
    } else {
        Cow::Borrowed(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_names_are_borrowed() {
        assert!(matches!(destination_name("users"), Cow::Borrowed("users")));
        assert_eq!(destination_name("shop.items"), "shop.items");
    }

    #[test]
    fn test_separators_are_replaced() {
        assert_eq!(destination_name("../etc/passwd"), ".._etc_passwd");
        assert_eq!(destination_name("a\\b:c"), "a_b_c");
        assert_eq!(destination_name("tab\there"), "tab_here");
    }

    #[test]
    fn test_path_for_appends_extension() {
        let destinations = DirectoryDestinations::new("/tmp/out");
        assert_eq!(
            destinations.path_for("users"),
            PathBuf::from("/tmp/out/users.sql")
        );
    }
}
