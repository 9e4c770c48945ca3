// Copyright 2026 Martin Pool

//! Tracing setup: a stderr layer controlled by `MUTANT_LAB_LOG`, plus a debug-level
//! file layer that starts writing once a run has an output directory to write into.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

static DEBUG_LOG: OnceLock<Arc<Mutex<Option<File>>>> = OnceLock::new();

fn slot() -> &'static Arc<Mutex<Option<File>>> {
    DEBUG_LOG.get_or_init(|| Arc::new(Mutex::new(None)))
}

/// Start (or restart) the debug log at `path`, overwriting whatever was there before.
///
/// Called once a run has created its `mutants.out` directory; before that, debug-level
/// events are simply dropped rather than buffered.
pub fn open_debug_log(path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    *slot().lock().expect("debug log lock") = Some(file);
    Ok(())
}

#[derive(Clone, Default)]
struct DebugLogWriter;

impl Write for DebugLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match slot().lock().expect("debug log lock").as_mut() {
            Some(file) => file.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match slot().lock().expect("debug log lock").as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for DebugLogWriter {
    type Writer = DebugLogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        DebugLogWriter
    }
}

/// Install the global tracing subscriber.
///
/// stderr gets whatever level `MUTANT_LAB_LOG` asks for (default `warn`); the debug
/// log file, once opened by [`open_debug_log`], gets everything from `debug` up,
/// independent of the stderr filter.
pub fn init() {
    let stderr_filter =
        EnvFilter::try_from_env("MUTANT_LAB_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(io::stderr)
        .with_filter(stderr_filter);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(DebugLogWriter)
        .with_filter(EnvFilter::new("debug"));
    Registry::default()
        .with(stderr_layer)
        .with(file_layer)
        .init();
}
