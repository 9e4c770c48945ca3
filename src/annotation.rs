// Copyright 2025 Martin Pool

//! Annotations: machine-readable messages that can e.g. cause mutants to be flagged in PRs.

use std::env;

use clap::ValueEnum;

use crate::mutant::Mutant;

/// Kind of error annotations to emit.
#[derive(Default, Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
#[value(rename_all = "lower")]
pub enum AutoAnnotation {
    /// No annotations.
    None,
    /// Auto detect from the execution environment.
    #[default]
    Auto,
    /// GitHub annotations.
    GitHub,
}

#[derive(Default, Debug, Clone, Copy, Eq, PartialEq)]
pub enum ResolvedAnnotation {
    /// No annotations.
    #[default]
    None,
    /// GitHub annotations.
    GitHub,
}

impl AutoAnnotation {
    /// Resolve the auto setting by auto-detecting CI environments.
    pub fn resolve(self) -> ResolvedAnnotation {
        match self {
            AutoAnnotation::Auto => {
                if env::var("GITHUB_ACTION").is_ok() {
                    ResolvedAnnotation::GitHub
                } else {
                    ResolvedAnnotation::None
                }
            }
            AutoAnnotation::GitHub => ResolvedAnnotation::GitHub,
            AutoAnnotation::None => ResolvedAnnotation::None,
        }
    }
}

impl ResolvedAnnotation {
    /// Format a message about this mutant being missed.
    pub fn format(self, mutant: &Mutant) -> String {
        match self {
            ResolvedAnnotation::None => String::new(),
            ResolvedAnnotation::GitHub => {
                // https://docs.github.com/en/actions/reference/workflow-commands-for-github-actions#setting-a-warning-message
                format!(
                    "::warning file={file},line={line},col={col},endLine={endline},endCol={endcol},title={title}:: {message}\n",
                    file = mutant.source_file.tree_relative_slashes(),
                    line = mutant.span.start.line,
                    col = mutant.span.start.column,
                    endline = mutant.span.end.line,
                    endcol = mutant.span.end.column,
                    message = mutant.describe_change(),
                    title = "Missed mutant",
                )
            }
        }
    }
}
