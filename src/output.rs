// Copyright 2021 - 2026 Martin Pool

//! A `mutants.out` directory holding logs, the session database, and a lock file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::log_file::LogFile;
use crate::Result;

pub mod lock;

const OUTDIR_NAME: &str = "mutants.out";
const ROTATED_NAME: &str = "mutants.out.old";
pub(crate) const LOCK_FILENAME: &str = "lock.json";

/// A `mutants.out` directory holding logs and other output information.
#[derive(Debug)]
pub struct OutputDir {
    path: PathBuf,
    log_dir: PathBuf,
    #[allow(dead_code)]
    lock_file: fs::File,
}

impl OutputDir {
    /// Create a new `mutants.out` output directory, within the given directory.
    ///
    /// If the directory already exists, it's rotated to `mutants.out.old`. If that directory
    /// exists, it's deleted.
    pub fn new<P: AsRef<Path>>(in_dir: P) -> Result<OutputDir> {
        let path: PathBuf = in_dir.as_ref().join(OUTDIR_NAME);
        if path.exists() {
            let rotated = in_dir.as_ref().join(ROTATED_NAME);
            if rotated.exists() {
                fs::remove_dir_all(&rotated).with_context(|| format!("remove {:?}", &rotated))?;
            }
            fs::rename(&path, &rotated)
                .with_context(|| format!("move {:?} to {:?}", &path, &rotated))?;
        }
        fs::create_dir(&path).with_context(|| format!("create output directory {:?}", &path))?;
        let log_dir = path.join("log");
        fs::create_dir(&log_dir).with_context(|| format!("create log directory {:?}", &log_dir))?;
        let debug_log_path = path.join("debug.log");
        crate::logging::open_debug_log(&debug_log_path)
            .with_context(|| format!("open debug log {:?}", &debug_log_path))?;
        let lock_file = lock::LockFile::acquire_lock(&path)?;
        Ok(OutputDir {
            path,
            log_dir,
            lock_file,
        })
    }

    /// Create a new log for a given scenario.
    pub fn create_log(&self, scenario_name: &str) -> Result<LogFile> {
        let log_dir = camino::Utf8Path::from_path(&self.log_dir).expect("output dir is UTF-8");
        LogFile::create_in(log_dir, scenario_name)
    }

    /// Return the path of the `mutants.out` directory.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Turn a scenario name into a safe filename fragment.
pub(crate) fn clean_filename(s: &str) -> String {
    let s = s.replace('/', "__");
    s.chars()
        .map(|c| match c {
            '\\' | ' ' | ':' | '<' | '>' | '?' | '*' | '|' | '"' => '_',
            c => c,
        })
        .collect::<String>()
}
