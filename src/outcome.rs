// Copyright 2021 - 2026 Martin Pool

//! Representation of the outcome of a scenario (check/build/test), and of a whole run.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::exit_code;
use crate::log_file::LogFile;

/// A phase of the build/test process that can be run in sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Phase {
    Check,
    Build,
    Test,
}

impl Phase {
    /// The cargo subcommand name for this phase.
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Check => "check",
            Phase::Build => "build",
            Phase::Test => "test",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The cargo-level result of running one phase: whether the subprocess succeeded, failed, or
/// was killed by a timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CargoResult {
    Timeout,
    Success,
    Failure,
}

impl CargoResult {
    pub fn success(&self) -> bool {
        matches!(self, CargoResult::Success)
    }
}

/// The result of running a single phase (check, build, or test) of a scenario.
#[derive(Debug, Clone)]
pub struct PhaseResult {
    pub phase: Phase,
    pub cargo_result: CargoResult,
    pub duration: Duration,
}

impl PhaseResult {
    pub fn is_success(&self) -> bool {
        self.cargo_result.success()
    }
}

/// All the data from running the phases of one scenario: the unmutated baseline, or a single
/// mutant.
#[derive(Debug)]
pub struct ScenarioOutcome {
    /// The log file recording what happened.
    pub log_file: LogFile,
    /// The results of each phase that was run, in order.
    pub phase_results: Vec<PhaseResult>,
    pub summary: SummaryOutcome,
}

impl ScenarioOutcome {
    pub fn new(log_file: LogFile, summary: SummaryOutcome) -> ScenarioOutcome {
        ScenarioOutcome {
            log_file,
            phase_results: Vec::new(),
            summary,
        }
    }

    pub fn add_phase_result(&mut self, phase_result: PhaseResult) {
        self.phase_results.push(phase_result);
    }

    /// Return the result of a specific phase, if it was run.
    pub fn phase_result(&self, phase: Phase) -> Option<&PhaseResult> {
        self.phase_results.iter().find(|pr| pr.phase == phase)
    }

    pub fn total_duration(&self) -> Duration {
        self.phase_results.iter().map(|pr| pr.duration).sum()
    }

    pub fn should_show_logs(&self) -> bool {
        !matches!(
            self.summary,
            SummaryOutcome::CaughtMutant | SummaryOutcome::Success
        )
    }
}

/// The bottom-line categorization of the outcome of running a scenario.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize)]
pub enum SummaryOutcome {
    /// Checking, building, or running tests succeeded on an unmutated tree.
    Success,
    /// The mutation was caught by a failing check, build, or test.
    CaughtMutant,
    /// The mutation was not caught by any check, build, or test.
    MissedMutant,
    /// A phase was killed for running too long; maybe the mutation caused an infinite loop.
    Timeout,
    /// The unmutated tree failed to check, build, or pass its tests.
    Unviable,
}

impl SummaryOutcome {
    /// Classify from the cargo result of a phase run against a mutated tree.
    ///
    /// For a non-baseline scenario, a `Success` on anything but the final
    /// `Test` phase isn't yet a verdict: it just means that phase didn't
    /// catch the mutant, and the next phase still needs to run.
    pub fn from_mutant_phase(phase: Phase, cargo_result: CargoResult, is_baseline: bool) -> Self {
        match cargo_result {
            CargoResult::Timeout => SummaryOutcome::Timeout,
            CargoResult::Failure if is_baseline => SummaryOutcome::Unviable,
            CargoResult::Failure => SummaryOutcome::CaughtMutant,
            CargoResult::Success if is_baseline => SummaryOutcome::Success,
            CargoResult::Success if phase == Phase::Test => SummaryOutcome::MissedMutant,
            CargoResult::Success => SummaryOutcome::Success,
        }
    }
}

/// Accumulated counts of outcomes across a whole run.
#[derive(Debug, Default, Clone)]
pub struct RunOutcome {
    caught: usize,
    missed: usize,
    timeout: usize,
    unviable: usize,
    success: usize,
}

impl RunOutcome {
    pub fn add(&mut self, summary: SummaryOutcome) {
        match summary {
            SummaryOutcome::CaughtMutant => self.caught += 1,
            SummaryOutcome::MissedMutant => self.missed += 1,
            SummaryOutcome::Timeout => self.timeout += 1,
            SummaryOutcome::Unviable => self.unviable += 1,
            SummaryOutcome::Success => self.success += 1,
        }
    }

    pub fn caught(&self) -> usize {
        self.caught
    }

    pub fn missed(&self) -> usize {
        self.missed
    }

    pub fn timeout(&self) -> usize {
        self.timeout
    }

    pub fn unviable(&self) -> usize {
        self.unviable
    }

    /// Return the process exit code that best reflects this run's outcome.
    pub fn exit_code(&self) -> i32 {
        if self.unviable > 0 {
            exit_code::BASELINE_FAILED
        } else if self.timeout > 0 {
            exit_code::TIMEOUT
        } else if self.missed > 0 {
            exit_code::FOUND_PROBLEMS
        } else {
            exit_code::SUCCESS
        }
    }
}
