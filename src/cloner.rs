// Copyright 2026 Martin Pool

//! Ways to produce an isolated working copy of the source tree for a worker.
//!
//! `BuildDir` always goes through a [`Cloner`]: the default is a recursive
//! copy (see [`crate::copy_tree`]), but a tree under version control can
//! instead be cloned more cheaply, and the same cloned snapshot can be
//! packed as a tarball for transfer to an SSH worker.

use std::fmt::Debug;

use anyhow::Context;
use camino::Utf8Path;
use flate2::write::GzEncoder;
use flate2::Compression;
use tempfile::TempDir;
use tracing::debug;

use crate::options::Options;
use crate::process::get_command_output;
use crate::{Console, Result};

/// Produces an isolated copy of a source tree in a fresh temporary directory.
pub trait Cloner: Debug + Send + Sync {
    fn clone_tree(
        &self,
        from_path: &Utf8Path,
        name_base: &str,
        options: &Options,
        console: &Console,
    ) -> Result<TempDir>;
}

/// The default cloner: a recursive file copy, respecting `.gitignore` and VCS-dir options.
#[derive(Debug, Default)]
pub struct CopyCloner;

impl Cloner for CopyCloner {
    fn clone_tree(
        &self,
        from_path: &Utf8Path,
        name_base: &str,
        options: &Options,
        console: &Console,
    ) -> Result<TempDir> {
        crate::copy_tree::copy_tree(from_path, name_base, options, console)
    }
}

/// Clones a tree with `git clone --depth 1`, for source trees under git where
/// a shallow clone is cheaper than a full file-by-file copy.
///
/// Uncommitted changes are not carried over: only what's checked into git is cloned.
#[derive(Debug, Default)]
pub struct GitCloner;

impl Cloner for GitCloner {
    fn clone_tree(
        &self,
        from_path: &Utf8Path,
        name_base: &str,
        _options: &Options,
        console: &Console,
    ) -> Result<TempDir> {
        let temp_dir = tempfile::Builder::new()
            .prefix(name_base)
            .suffix(".tmp")
            .tempdir()
            .context("create temp dir")?;
        let dest: camino::Utf8PathBuf = temp_dir
            .path()
            .to_owned()
            .try_into()
            .context("convert path to UTF-8")?;
        console.start_copy(&dest);
        get_command_output(
            &[
                "git",
                "clone",
                "--depth=1",
                "--quiet",
                from_path.as_str(),
                dest.as_str(),
            ],
            from_path,
        )
        .with_context(|| format!("git clone {from_path} into {dest}"))?;
        console.finish_copy(&dest);
        debug!(?from_path, ?dest, "git clone complete");
        Ok(temp_dir)
    }
}

/// Pack a directory tree as a gzip-compressed tarball, for transfer to a remote worker.
///
/// Paired with [`unpack_tarball`] on the receiving end; used by the SSH
/// execution engine instead of copying files one at a time over the network.
pub fn pack_tarball(dir: &Utf8Path) -> Result<Vec<u8>> {
    let mut archive = tar_builder(dir)?;
    let encoder = archive.into_inner().context("finish tar archive")?;
    encoder.finish().context("finish gzip stream")
}

fn tar_builder(dir: &Utf8Path) -> Result<tar::Builder<GzEncoder<Vec<u8>>>> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder
        .append_dir_all(".", dir)
        .with_context(|| format!("archive {dir}"))?;
    Ok(builder)
}

/// Unpack a tarball produced by [`pack_tarball`] into `dest`, which must already exist.
pub fn unpack_tarball(bytes: &[u8], dest: &Utf8Path) -> Result<()> {
    let decoder = flate2::read::GzDecoder::new(bytes);
    let mut archive = tar::Archive::new(decoder);
    archive
        .unpack(dest)
        .with_context(|| format!("unpack tarball into {dest}"))
}

#[cfg(test)]
mod test {
    use std::fs;

    use camino::Utf8Path;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn pack_and_unpack_round_trip() {
        let src_dir = TempDir::new().unwrap();
        let src = Utf8Path::from_path(src_dir.path()).unwrap();
        fs::write(src.join("Cargo.toml"), "[package]\nname = \"a\"\n").unwrap();
        fs::create_dir(src.join("src")).unwrap();
        fs::write(src.join("src/lib.rs"), "fn f() {}\n").unwrap();

        let bytes = pack_tarball(src).unwrap();
        assert!(!bytes.is_empty());

        let dest_dir = TempDir::new().unwrap();
        let dest = Utf8Path::from_path(dest_dir.path()).unwrap();
        unpack_tarball(&bytes, dest).unwrap();

        assert_eq!(
            fs::read_to_string(dest.join("Cargo.toml")).unwrap(),
            "[package]\nname = \"a\"\n"
        );
        assert_eq!(
            fs::read_to_string(dest.join("src/lib.rs")).unwrap(),
            "fn f() {}\n"
        );
    }
}
