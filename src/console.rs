// Copyright 2021 - 2026 Martin Pool

//! Print messages and progress bars on the terminal.

use std::sync::Mutex;
use std::time::Instant;

use camino::Utf8Path;
use console::{style, StyledObject};
use nutmeg::View;

use crate::mutant::Mutant;

/// Top-level UI object that manages the state of an interactive console: mostly progress
/// views and plain messages.
pub struct Console {
    view: Mutex<View<ProgressModel>>,
}

impl Console {
    /// Construct a new console, attached to stdout.
    pub fn new() -> Console {
        Console {
            view: Mutex::new(View::new(ProgressModel::default(), nutmeg::Options::default())),
        }
    }

    /// Begin walking the tree to discover mutants, returning a handle that tracks progress.
    pub fn start_walk_tree(&self) -> WalkProgress {
        self.update(|model| model.task = "Walking tree".to_owned());
        WalkProgress {
            start: Instant::now(),
            files: 0,
            mutants: 0,
        }
    }

    /// Begin copying a tree into a scratch directory.
    pub fn start_copy(&self, dest: &Utf8Path) {
        self.update(|model| model.task = format!("Copy source to {dest}"));
    }

    /// Report incremental progress copying a tree.
    pub fn copy_progress(&self, dest: &Utf8Path, bytes_copied: u64) {
        self.update(|model| {
            model.task = format!(
                "Copy source to {dest} ({})",
                format_mb(bytes_copied)
            )
        });
    }

    /// Report that a copy finished.
    pub fn finish_copy(&self, _dest: &Utf8Path) {
        self.update(|model| model.task = String::new());
    }

    /// Print a plain message above the progress view.
    pub fn message(&self, message: &str) {
        self.view
            .lock()
            .expect("lock console view")
            .message(message);
    }

    /// Give the progress view a chance to redraw.
    pub fn tick(&self) {
        self.view.lock().expect("lock console view").update(|_| ());
    }

    fn update(&self, f: impl FnOnce(&mut ProgressModel)) {
        self.view.lock().expect("lock console view").update(f);
    }
}

impl Default for Console {
    fn default() -> Console {
        Console::new()
    }
}

#[derive(Default)]
struct ProgressModel {
    task: String,
}

impl nutmeg::Model for ProgressModel {
    fn render(&mut self, _width: usize) -> String {
        self.task.clone()
    }
}

/// Tracks progress while walking the source tree to discover mutants.
pub struct WalkProgress {
    start: Instant,
    files: usize,
    mutants: usize,
}

impl WalkProgress {
    pub fn increment_files(&mut self, n: usize) {
        self.files += n;
    }

    pub fn increment_mutants(&mut self, n: usize) {
        self.mutants += n;
    }

    /// Finish walking the tree, returning the elapsed time.
    pub fn finish(self) {
        tracing::debug!(
            files = self.files,
            mutants = self.mutants,
            elapsed = ?self.start.elapsed(),
            "found mutants",
        );
    }
}

/// Render a one-line, optionally colored, description of a mutant.
pub fn style_mutant(mutant: &Mutant) -> String {
    mutant.to_styled_string(true)
}

/// A styled message to print when the run is interrupted by the user.
pub fn style_interrupted() -> String {
    style("interrupted").bold().red().to_string()
}

pub fn style_status_good(s: &str) -> StyledObject<String> {
    style(s.to_owned()).green()
}

pub fn style_status_bad(s: &str) -> StyledObject<String> {
    style(s.to_owned()).red().bold()
}

fn format_mb(bytes: u64) -> String {
    format!("{} MB", bytes / 1_000_000)
}
