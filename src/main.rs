// Copyright 2021 - 2026 Martin Pool

//! `mutant-lab`: find inadequately-tested code by mutating it and checking whether your
//! tests notice.
//!
//! This binary wires together the pieces that live in the rest of this crate: it discovers
//! packages and candidate mutations in a Cargo tree, persists a run's plan and results in a
//! durable work database, and dispatches the work to either a local pool of worker processes
//! or a fleet of SSH-reachable remote hosts.

mod annotation;
mod ast;
mod build_dir;
mod cargo;
mod cloner;
mod config;
mod console;
mod copy_tree;
mod db;
mod engine;
mod exit_code;
mod filter;
mod fnvalue;
mod glob;
mod in_diff;
mod interceptor;
mod interrupt;
mod list;
mod log_file;
mod logging;
mod manifest;
mod mutant;
mod operator;
mod options;
mod outcome;
mod output;
mod package;
mod path;
mod plan;
mod pragma;
mod pretty;
mod process;
mod run;
mod shard;
mod source;
mod span;
mod ssh_engine;
mod tail_file;
mod timeouts;
mod tool;
mod visit;
mod worker;
mod workspace;

use std::process::ExitCode;
use std::sync::Arc;

use camino::Utf8PathBuf;
use clap::Parser;

pub use annotation::AutoAnnotation;
pub use console::Console;
pub use mutant::{Genre, Mutant};
pub use options::{BaselineStrategy, Options};
pub use outcome::Phase;

pub use anyhow::Context;
pub use interrupt::check_interrupted;

/// Alias used throughout the crate: every fallible operation bottoms out in `anyhow`.
pub type Result<T> = anyhow::Result<T>;

/// The crate version, used in the version banner and in work database metadata.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Appended to the replacement text of every mutated line, so that a mutated tree is
/// trivially recognizable from a diff, a build log, or a bug report.
pub const MUTATION_MARKER_COMMENT: &str = "/* ~ mutated by mutant-lab ~ */";

/// Find inadequately-tested code that can be removed without any tests failing.
#[derive(Parser, Debug)]
#[command(
    name = "cargo-mutants",
    bin_name = "cargo mutants",
    version = VERSION,
    about = "Find inadequately-tested code that can be removed without any tests failing."
)]
pub struct Args {
    /// Path to the root of the tree to mutate.
    #[arg(short = 'd', long, default_value = ".")]
    pub dir: Utf8PathBuf,

    /// Only mutate these packages, by name; may be repeated. Default: infer from `dir`.
    #[arg(short = 'p', long = "package")]
    pub package: Vec<String>,

    /// Mutate every package in the workspace, ignoring the current-directory inference.
    #[arg(long)]
    pub workspace: bool,

    /// List mutants that would be tested, instead of running them.
    #[arg(long)]
    pub list: bool,

    /// List source files that would be considered for mutation, instead of running them.
    #[arg(long)]
    pub list_files: bool,

    /// Print the fully resolved configuration and exit.
    #[arg(long)]
    pub show_config: bool,

    /// Emit JSON rather than text, for `--list` / `--list-files`.
    #[arg(long)]
    pub json: bool,

    /// Show a diff of the replaced code next to each mutant's description.
    #[arg(long)]
    pub diff: bool,

    /// Only consider files matching this glob; may be repeated.
    #[arg(long = "file")]
    pub file: Vec<String>,

    /// Exclude files matching this glob; may be repeated.
    #[arg(long)]
    pub exclude: Vec<String>,

    /// Expression to substitute for a value of a type that can't otherwise be constructed;
    /// may be repeated.
    #[arg(long = "error")]
    pub error: Vec<String>,

    /// Restrict mutation generation to these operator genres; may be repeated. Default: all.
    #[arg(long)]
    pub operators: Vec<String>,

    /// Also skip the arguments of calls to this function name; may be repeated.
    #[arg(long)]
    pub skip_calls: Vec<String>,

    /// Seed `skip_calls` with the built-in defaults (with_capacity, reserve, ...).
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub skip_calls_defaults: bool,

    /// Pass this additional argument to every `cargo` invocation; may be repeated.
    #[arg(long = "cargo-arg", allow_hyphen_values = true)]
    pub cargo_arg: Vec<String>,

    /// Pass this additional argument to `cargo test`; may be repeated.
    #[arg(long = "cargo-test-args", allow_hyphen_values = true)]
    pub cargo_test_args: Vec<String>,

    /// Whether to run a baseline check/build/test of the unmutated tree before any mutants.
    #[arg(long, value_enum, default_value_t = BaselineStrategy::Run)]
    pub baseline: BaselineStrategy,

    /// Maximum seconds allowed for the check or build phase of a scenario. Accepts decimal
    /// seconds.
    #[arg(long)]
    pub build_timeout: Option<f64>,

    /// Multiply the measured baseline build time by this factor to choose a build timeout.
    #[arg(long)]
    pub build_timeout_multiplier: Option<f64>,

    /// Maximum seconds allowed for the test phase of a scenario. Accepts decimal seconds.
    #[arg(short = 't', long)]
    pub timeout: Option<f64>,

    /// Multiply the measured baseline test time by this factor to choose a test timeout.
    #[arg(long)]
    pub timeout_multiplier: Option<f64>,

    /// Never use a test timeout shorter than this many seconds.
    #[arg(long)]
    pub minimum_test_timeout: Option<f64>,

    /// Colorize text output.
    #[arg(long)]
    pub colors: bool,

    /// Copy VCS directories (e.g. `.git`) into the scratch tree. Default: true.
    #[arg(long, action = clap::ArgAction::Set)]
    pub copy_vcs: Option<bool>,

    /// Respect `.gitignore` when copying the tree into a scratch directory. Default: true.
    #[arg(long, action = clap::ArgAction::Set)]
    pub gitignore: Option<bool>,

    /// Mutate the source tree in place instead of in a scratch copy. Dangerous: only use this
    /// on a tree you don't mind leaving mutated if the run is interrupted.
    #[arg(long)]
    pub in_place: bool,

    /// Create `mutants.out` within this directory, instead of within `dir`.
    #[arg(long)]
    pub output: Option<Utf8PathBuf>,

    /// Don't print elapsed times.
    #[arg(long)]
    pub no_times: bool,

    /// How to annotate missed mutants for a CI environment.
    #[arg(long, value_enum, default_value_t = AutoAnnotation::Auto)]
    pub annotations: AutoAnnotation,

    /// Only run shard k of n, given as `k/n`; the rest are skipped. Useful for splitting a
    /// big run across several CI jobs.
    #[arg(long)]
    pub shard: Option<String>,

    /// Only test mutants whose span intersects this unified diff file (e.g. of uncommitted
    /// changes), instead of every discovered mutant.
    #[arg(long = "in-diff")]
    pub in_diff: Option<Utf8PathBuf>,

    /// Number of local worker processes to run concurrently. Default: from config, or the
    /// number of available CPUs.
    #[arg(short = 'j', long)]
    pub jobs: Option<usize>,

    /// Print a shell completion script for the given shell to stdout and exit.
    #[arg(long)]
    pub completions: Option<clap_complete::Shell>,
}

fn main() -> Result<ExitCode> {
    interrupt::install_handler();
    logging::init();

    // Cargo subcommand invocation passes `mutants` as argv[1]; accept and ignore it so that
    // `cargo mutants ...` and `mutant-lab ...` both work the same way.
    let mut argv: Vec<String> = std::env::args().collect();
    if argv.get(1).map(String::as_str) == Some("mutants") {
        argv.remove(1);
    }
    let args = Args::parse_from(argv);

    if let Some(shell) = args.completions {
        let mut command = <Args as clap::CommandFactory>::command();
        let name = command.get_name().to_owned();
        clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
        return Ok(ExitCode::SUCCESS);
    }

    let console = Arc::new(Console::new());
    match run::run(&args, &console) {
        Ok(code) => Ok(ExitCode::from(code as u8)),
        Err(err) => {
            console.message(&format!("{err:#}"));
            Ok(ExitCode::from(exit_code::classify(&err) as u8))
        }
    }
}

/// Helpers shared only by `#[cfg(test)]` modules across the crate, for tests that mutate
/// process-global state such as environment variables and must therefore run in isolated,
/// forked processes (see the `rusty_fork_test!` uses in `annotation.rs`).
#[cfg(test)]
pub mod test_util {
    use std::env;

    pub fn single_threaded_set_env_var(key: &str, value: &str) {
        // Safety: these helpers are only ever called from within a `rusty_fork_test!` body,
        // which runs in its own forked, single-threaded process.
        unsafe {
            env::set_var(key, value);
        }
    }

    pub fn single_threaded_remove_env_var(key: &str) {
        unsafe {
            env::remove_var(key);
        }
    }
}
