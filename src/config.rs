// Copyright 2022 - 2026 Martin Pool.

//! `.cargo/mutants.toml` configuration file.
//!
//! The config file is read after parsing command line arguments, and after finding the
//! source tree, because together they determine its location. Command-line arguments always
//! take priority over the config file; see [crate::options::Options::new].

use std::fs::read_to_string;
use std::str::FromStr;

use anyhow::Context;
use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Where and how the work database persists its state between runs.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Path to the SQLite session file, relative to the output directory.
    ///
    /// Defaults to `mutants.db` within `mutants.out` when not set.
    pub file: Option<String>,
}

/// Settings for the local or remote execution engine.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExecutionEngineConfig {
    /// Name of the engine to use: `local` or `ssh`.
    pub name: Option<String>,
    /// Number of local worker processes to run concurrently.
    pub jobs: Option<usize>,
    /// SSH host to connect to, for the `ssh` engine.
    pub ssh_host: Option<String>,
    /// Remote working directory to clone the tree into, for the `ssh` engine.
    pub ssh_remote_dir: Option<String>,
}

/// Settings controlling how the tree is cloned into scratch workspaces.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CloningConfig {
    /// Cloning method: `copy`, `git`, or `tar`.
    pub method: Option<String>,
}

/// Settings for interceptors that are loaded as plugins.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InterceptorsConfig {
    pub load: Vec<String>,
}

/// Settings for operators that are loaded as plugins.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OperatorsConfig {
    pub load: Vec<String>,
}

/// Configuration read from a tree's config file.
///
/// This is similar to [crate::options::Options], and eventually merged into it, but kept
/// separate because it needs to be deserialized and it is read before the command-line
/// arguments are available to override it.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Only check these globs for possible mutation.
    pub examine_globs: Vec<String>,
    /// Exclude these globs from mutation.
    pub exclude_globs: Vec<String>,
    /// Module paths to examine, e.g. `foo::bar`.
    pub examine_modules: Vec<String>,
    /// Module paths to exclude.
    pub exclude_modules: Vec<String>,
    /// Names of calls whose arguments should not be mutated, in addition to the built-in list.
    pub skip_calls: Vec<String>,
    /// Expressions to substitute for values of types that can't otherwise be constructed.
    pub error_values: Vec<String>,
    /// Multiply the measured baseline test duration by this factor to choose a test timeout.
    pub timeout_multiplier: Option<f64>,
    /// Multiply the measured baseline build duration by this factor to choose a build timeout.
    pub build_timeout_multiplier: Option<f64>,
    /// Additional arguments passed to every `cargo` invocation.
    pub additional_cargo_args: Vec<String>,
    /// Additional arguments passed to `cargo test` invocations.
    pub additional_cargo_test_args: Vec<String>,
    /// Work database/session settings.
    pub session: SessionConfig,
    /// Execution engine settings.
    #[serde(rename = "execution-engine")]
    pub execution_engine: ExecutionEngineConfig,
    /// Cloning settings.
    pub cloning: CloningConfig,
    /// Interceptor plugin settings.
    pub interceptors: InterceptorsConfig,
    /// Operator plugin settings.
    pub operators: OperatorsConfig,
}

impl Config {
    /// Parse a config file already read from disk.
    pub fn read_file(path: &Utf8Path) -> Result<Config> {
        let toml = read_to_string(path).with_context(|| format!("read config {path:?}"))?;
        Config::from_str(&toml).with_context(|| format!("parse toml from {path:?}"))
    }

    /// Read the config from a tree's `.cargo/mutants.toml`, returning a default (empty)
    /// config if the file does not exist.
    pub fn read_tree_config(tree_path: &Utf8Path) -> Result<Config> {
        let path = tree_path.join(".cargo").join("mutants.toml");
        if path.exists() {
            Config::read_file(&path)
        } else {
            Ok(Config::default())
        }
    }
}

impl FromStr for Config {
    type Err = anyhow::Error;

    fn from_str(toml: &str) -> Result<Config> {
        toml::de::from_str(toml).context("parse mutants.toml")
    }
}
