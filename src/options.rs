// Copyright 2021 - 2026 Martin Pool

//! Global in-process options controlling how mutants are discovered, filtered, and run.
//!
//! [Options] is assembled by merging command-line [Args] over a tree's [Config] file, so that
//! the command line always wins. It's then threaded through discovery, scheduling, and
//! execution rather than being looked up again from either source.

use std::str::FromStr;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use globset::GlobSet;
use syn::Expr;

use crate::annotation::AutoAnnotation;
use crate::config::Config;
use crate::glob::build_glob_set;
use crate::mutant::Mutant;
use crate::{Args, Result};

/// Names of calls that are, by default, assumed to have no interesting effect on program
/// behavior and so are not worth mutating the arguments of.
const DEFAULT_SKIP_CALLS: &[&str] = &[
    "with_capacity",
    "reserve",
    "reserve_exact",
    "debug",
    "trace",
];

/// Whether to run a baseline check/build/test of the unmutated tree before mutants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum BaselineStrategy {
    /// Always run the baseline first.
    #[default]
    Run,
    /// Skip the baseline and assume the unmutated tree is viable.
    Skip,
}

/// Resolved options for a run: the merge of command-line arguments and config file settings.
#[derive(Debug, Clone)]
pub struct Options {
    pub additional_cargo_args: Vec<String>,
    pub additional_cargo_test_args: Vec<String>,
    pub baseline: BaselineStrategy,
    pub build_timeout: Option<Duration>,
    pub build_timeout_multiplier: Option<f64>,
    pub colors: bool,
    pub copy_vcs: bool,
    pub emit_diffs: bool,
    pub emit_json: bool,
    pub error_values: Vec<String>,
    pub examine_globset: Option<GlobSet>,
    pub exclude_globset: Option<GlobSet>,
    pub gitignore: bool,
    pub in_place: bool,
    pub minimum_test_timeout: Duration,
    /// Genre names to restrict mutation generation to; empty means all genres.
    pub operators_load: Vec<String>,
    pub output_in_dir: Option<Utf8PathBuf>,
    pub show_times: bool,
    pub skip_calls: Vec<String>,
    pub test_timeout: Option<Duration>,
    pub test_timeout_multiplier: Option<f64>,
    pub annotations: AutoAnnotation,
}

impl Default for Options {
    fn default() -> Options {
        Options {
            additional_cargo_args: Vec::new(),
            additional_cargo_test_args: Vec::new(),
            baseline: BaselineStrategy::default(),
            build_timeout: None,
            build_timeout_multiplier: None,
            colors: false,
            copy_vcs: true,
            emit_diffs: false,
            emit_json: false,
            error_values: Vec::new(),
            examine_globset: None,
            exclude_globset: None,
            gitignore: true,
            in_place: false,
            minimum_test_timeout: Duration::from_secs(20),
            operators_load: Vec::new(),
            output_in_dir: None,
            show_times: true,
            skip_calls: DEFAULT_SKIP_CALLS.iter().map(|s| s.to_string()).collect(),
            test_timeout: None,
            test_timeout_multiplier: None,
            annotations: AutoAnnotation::default(),
        }
    }
}

impl Options {
    /// Merge command-line arguments over a config file to produce the effective options.
    pub fn new(args: &Args, config: &Config) -> Result<Options> {
        let mut skip_calls: Vec<String> = if args.skip_calls_defaults {
            DEFAULT_SKIP_CALLS.iter().map(|s| s.to_string()).collect()
        } else {
            Vec::new()
        };
        skip_calls.extend(config.skip_calls.iter().cloned());
        skip_calls.extend(args.skip_calls.iter().cloned());

        let mut examine_globs = config.examine_globs.clone();
        examine_globs.extend(args.file.iter().cloned());
        let mut exclude_globs = config.exclude_globs.clone();
        exclude_globs.extend(args.exclude.iter().cloned());

        let mut error_values = config.error_values.clone();
        error_values.extend(args.error.iter().cloned());

        let mut operators_load = config.operators.load.clone();
        operators_load.extend(args.operators.iter().cloned());

        Ok(Options {
            additional_cargo_args: args.cargo_arg.clone(),
            additional_cargo_test_args: args.cargo_test_args.clone(),
            baseline: args.baseline,
            build_timeout: args.build_timeout.map(Duration::from_secs_f64),
            build_timeout_multiplier: args
                .build_timeout_multiplier
                .or(config.build_timeout_multiplier),
            colors: args.colors,
            copy_vcs: args.copy_vcs.unwrap_or(true),
            emit_diffs: args.diff,
            emit_json: args.json,
            examine_globset: build_glob_set(&examine_globs)?,
            exclude_globset: build_glob_set(&exclude_globs)?,
            error_values,
            gitignore: args.gitignore.unwrap_or(true),
            in_place: args.in_place,
            minimum_test_timeout: args
                .minimum_test_timeout
                .map(Duration::from_secs_f64)
                .unwrap_or(Duration::from_secs(20)),
            operators_load,
            output_in_dir: args.output.clone(),
            show_times: !args.no_times,
            skip_calls,
            test_timeout: args.timeout.map(Duration::from_secs_f64),
            test_timeout_multiplier: args.timeout_multiplier.or(config.timeout_multiplier),
            annotations: args.annotations,
        })
    }

    /// Parse the configured error replacement expressions, if any.
    pub fn parsed_error_exprs(&self) -> Result<Vec<Expr>> {
        self.error_values
            .iter()
            .map(|s| syn::parse_str(s).map_err(anyhow::Error::from))
            .collect()
    }

    /// True if the discovered mutant should be kept, given the examine/exclude filters.
    pub fn allows_mutant(&self, mutant: &Mutant) -> bool {
        self.allows_source_file_path(&mutant.source_file.tree_relative_path)
    }

    /// True if the given tree-relative path should be examined for mutants.
    pub fn allows_source_file_path(&self, path: &Utf8Path) -> bool {
        if let Some(examine) = &self.examine_globset {
            if !examine.is_match(path) {
                return false;
            }
        }
        if let Some(exclude) = &self.exclude_globset {
            if exclude.is_match(path) {
                return false;
            }
        }
        true
    }

    /// Build options directly from a slice of command-line argument strings, for tests.
    ///
    /// The leading program name is optional.
    pub fn from_arg_strs<I, S>(args: I) -> Options
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        use clap::Parser;
        let mut argv: Vec<String> = args.into_iter().map(|s| s.as_ref().to_owned()).collect();
        if argv.first().map(String::as_str) != Some("mutants") {
            argv.insert(0, "mutants".to_owned());
        }
        let parsed = Args::parse_from(argv);
        Options::new(&parsed, &Config::default()).expect("build Options from args")
    }
}

impl FromStr for BaselineStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "run" => Ok(BaselineStrategy::Run),
            "skip" => Ok(BaselineStrategy::Skip),
            _ => Err(format!("invalid baseline strategy {s:?}")),
        }
    }
}
