// Copyright 2021 - 2026 Martin Pool

//! A temporary directory containing mutated source to run cargo builds and tests.

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

use crate::manifest::{fix_cargo_config, fix_manifest};
use crate::options::Options;
use crate::{Console, Result};

/// A temporary directory initialized with a copy of the source, where mutations can be tested.
pub struct BuildDir {
    /// The path of the root of the temporary directory.
    path: Utf8PathBuf,
    /// A prefix for tempdir names, based on the name of the source directory.
    name_base: String,
    /// Holds the temporary directory, so that it will be deleted when this object is dropped.
    #[allow(dead_code)]
    temp_dir: TempDir,
}

impl BuildDir {
    /// Make a new build dir, copying from the workspace source directory.
    pub fn new(source_dir: &Utf8Path, options: &Options, console: &Console) -> Result<BuildDir> {
        let name_base = format!(
            "cargo-mutants-{}-",
            source_dir.file_name().unwrap_or("tree")
        );
        let temp_dir = crate::copy_tree::copy_tree(source_dir, &name_base, options, console)?;
        BuildDir::from_temp_dir(temp_dir, source_dir, name_base)
    }

    /// Wrap a temporary directory already populated by a [`crate::cloner::Cloner`] as a
    /// build dir, fixing up its manifest and `.cargo/config.toml` to point back at
    /// `source_dir`'s local registry overrides and path dependencies.
    pub fn from_temp_dir(
        temp_dir: TempDir,
        source_dir: &Utf8Path,
        name_base: impl Into<String>,
    ) -> Result<BuildDir> {
        let source_abs = source_dir
            .canonicalize_utf8()
            .unwrap_or_else(|_| source_dir.to_owned());
        let path: Utf8PathBuf = temp_dir.path().to_owned().try_into().expect("utf8 path");
        fix_manifest(&path.join("Cargo.toml"), &source_abs)?;
        fix_cargo_config(&path, &source_abs)?;
        Ok(BuildDir {
            temp_dir,
            name_base: name_base.into(),
            path,
        })
    }

    pub fn path(&self) -> &Utf8Path {
        self.path.as_path()
    }

    /// Overwrite a file within the build directory with new content.
    pub fn overwrite_file(&self, tree_relative_path: &Utf8Path, content: &str) -> Result<()> {
        std::fs::write(self.path.join(tree_relative_path), content)
            .map_err(|e| anyhow::Error::from(e).context(format!("write {tree_relative_path}")))
    }

    /// Make a copy of this build dir, including its target directory.
    #[allow(dead_code)]
    pub fn copy(&self, options: &Options, console: &Console) -> Result<BuildDir> {
        let temp_dir = crate::copy_tree::copy_tree(&self.path, &self.name_base, options, console)?;
        Ok(BuildDir {
            path: temp_dir.path().to_owned().try_into().expect("utf8 path"),
            temp_dir,
            name_base: self.name_base.clone(),
        })
    }
}

impl fmt::Debug for BuildDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildDir")
            .field("path", &self.path)
            .finish()
    }
}
