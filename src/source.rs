// Copyright 2021-2024 Martin Pool

//! A source file within a tree being mutated.
//!
//! `SourceFile` carries the file's text together with enough context (which
//! package it belongs to, whether it's one of the package's top-level
//! target files) to report diagnostics and to resolve further `mod`
//! statements relative to it.

use std::fmt;
use std::fs;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::warn;

use crate::package::Package;
use crate::span::LineColumn;
use crate::Result;

/// A single source file discovered while walking a package.
#[derive(Clone)]
pub struct SourceFile {
    /// The package that this file is part of.
    pub package: Arc<Package>,

    /// Path relative to the root of the tree, with forward slashes normalized
    /// on display.
    pub tree_relative_path: Utf8PathBuf,

    /// Full text of the file, with Unix line endings.
    pub code: String,

    /// True if this is one of the package's top-level target files (named
    /// directly by `Cargo.toml`), as opposed to a file reached by following
    /// a `mod` statement.
    pub is_top: bool,
}

impl SourceFile {
    /// Load a source file from disk, relative to `tree_path`.
    ///
    /// Returns `Ok(None)` if the file can't be read; callers treat this as
    /// "couldn't resolve this module reference", not a hard failure of the
    /// whole walk.
    pub fn load(
        tree_path: &Utf8Path,
        tree_relative_path: &Utf8Path,
        package: &Arc<Package>,
        is_top: bool,
    ) -> Result<Option<SourceFile>> {
        let full_path = tree_path.join(tree_relative_path);
        match fs::read_to_string(&full_path) {
            Ok(code) => Ok(Some(SourceFile {
                package: Arc::clone(package),
                tree_relative_path: tree_relative_path.to_owned(),
                code: code.replace("\r\n", "\n"),
                is_top,
            })),
            Err(err) => {
                warn!(?full_path, ?err, "failed to read source file");
                Ok(None)
            }
        }
    }

    /// Construct a `SourceFile` directly from in-memory text, for tests.
    #[cfg(test)]
    pub fn for_tests(
        tree_relative_path: &Utf8Path,
        code: &str,
        package_name: &str,
        is_top: bool,
    ) -> SourceFile {
        SourceFile {
            package: Arc::new(Package {
                name: package_name.to_owned(),
                relative_manifest_path: Utf8PathBuf::from("Cargo.toml"),
                top_sources: Vec::new(),
            }),
            tree_relative_path: tree_relative_path.to_owned(),
            code: code.to_owned(),
            is_top,
        }
    }

    /// The file's text.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The tree-relative path, with forward slashes, suitable for display
    /// and for matching against glob patterns.
    pub fn tree_relative_slashes(&self) -> String {
        self.tree_relative_path
            .components()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Format a location within this file for error messages, as `path:line`.
    pub fn format_source_location(&self, line_col: LineColumn) -> String {
        format!("{}:{}", self.tree_relative_slashes(), line_col.line)
    }

    /// Return the text of one 1-based line, if it exists.
    pub fn line(&self, line_number: usize) -> Option<&str> {
        line_number
            .checked_sub(1)
            .and_then(|i| self.code.lines().nth(i))
    }
}

impl fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceFile")
            .field("package", &self.package.name)
            .field("tree_relative_path", &self.tree_relative_path)
            .field("is_top", &self.is_top)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod test {
    use std::fs::File;
    use std::io::Write;
    use std::sync::Arc;

    use camino::Utf8Path;

    use super::*;

    #[test]
    fn source_file_normalizes_crlf() {
        let temp = tempfile::tempdir().unwrap();
        let temp_path = Utf8Path::from_path(temp.path()).unwrap();
        File::create(temp_path.join("lib.rs"))
            .unwrap()
            .write_all(b"fn main() {\r\n    640 << 10;\r\n}\r\n")
            .unwrap();
        let package = Arc::new(Package {
            name: "crlf_test".to_owned(),
            relative_manifest_path: Utf8PathBuf::from("Cargo.toml"),
            top_sources: Vec::new(),
        });
        let source_file = SourceFile::load(temp_path, Utf8Path::new("lib.rs"), &package, true)
            .unwrap()
            .unwrap();
        assert_eq!(source_file.code(), "fn main() {\n    640 << 10;\n}\n");
    }

    #[test]
    fn missing_file_returns_none_not_error() {
        let temp = tempfile::tempdir().unwrap();
        let temp_path = Utf8Path::from_path(temp.path()).unwrap();
        let package = Arc::new(Package {
            name: "missing_test".to_owned(),
            relative_manifest_path: Utf8PathBuf::from("Cargo.toml"),
            top_sources: Vec::new(),
        });
        assert!(
            SourceFile::load(temp_path, Utf8Path::new("nope.rs"), &package, true)
                .unwrap()
                .is_none()
        );
    }
}
