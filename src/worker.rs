// Copyright 2026 Martin Pool

//! A worker: applies one mutation to a build directory, runs the configured
//! phases, classifies the result, and restores the original file.
//!
//! Each worker owns exactly one [`BuildDir`], so it can run many scenarios
//! in sequence without re-cloning the tree. Workers are handed to
//! [`crate::engine`] as owned, `'static` values so they can run on blocking
//! thread-pool tasks.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, debug_span};

use crate::build_dir::BuildDir;
use crate::mutant::Mutant;
use crate::outcome::{CargoResult, Phase, PhaseResult, ScenarioOutcome, SummaryOutcome};
use crate::output::OutputDir;
use crate::package::Package;
use crate::process::{Process, ProcessStatus};
use crate::timeouts::Timeouts;
use crate::tool::Tool;
use crate::{Options, Result};

/// Executes scenarios (the baseline, or one mutant) against a single build directory.
pub struct Worker {
    build_dir: BuildDir,
    tool: Arc<dyn Tool>,
    options: Arc<Options>,
    output_dir: Arc<OutputDir>,
}

impl Worker {
    pub fn new(
        build_dir: BuildDir,
        tool: Arc<dyn Tool>,
        options: Arc<Options>,
        output_dir: Arc<OutputDir>,
    ) -> Worker {
        Worker {
            build_dir,
            tool,
            options,
            output_dir,
        }
    }

    pub fn build_dir(&self) -> &BuildDir {
        &self.build_dir
    }

    /// Run check/build/test against the unmutated tree, to calibrate timeouts
    /// and confirm the tree is viable before spending time on mutants.
    pub fn run_baseline(&self, packages: Option<&[&Package]>) -> Result<ScenarioOutcome> {
        let _span = debug_span!("baseline").entered();
        self.run_phases("baseline", packages, Timeouts::for_baseline(&self.options), true)
    }

    /// Apply `mutant`, run the phases, and restore the original file regardless of outcome.
    pub fn test_mutant(&self, mutant: &Mutant, timeouts: Timeouts) -> Result<ScenarioOutcome> {
        let _span = debug_span!("mutant", name = %mutant.name(false)).entered();
        mutant.apply(&self.build_dir, &mutant.mutated_code())?;
        let packages = [mutant.source_file.package.as_ref()];
        let result = self.run_phases(&mutant.name(true), Some(packages.as_slice()), timeouts, false);
        if let Err(err) = mutant.revert(&self.build_dir) {
            debug!(?err, "failed to revert mutant; build dir may be unclean");
        }
        result
    }

    fn run_phases(
        &self,
        scenario_name: &str,
        packages: Option<&[&Package]>,
        timeouts: Timeouts,
        is_baseline: bool,
    ) -> Result<ScenarioOutcome> {
        let mut log_file = self.output_dir.create_log(scenario_name)?;
        let mut summary = SummaryOutcome::Success;
        let mut phase_results = Vec::new();
        for &phase in &[Phase::Check, Phase::Build, Phase::Test] {
            let timeout = match phase {
                Phase::Check | Phase::Build => timeouts.build,
                Phase::Test => timeouts.test,
            };
            let argv =
                self.tool
                    .compose_argv(&self.build_dir, packages, phase, &self.options)?;
            let env = self.tool.compose_env()?;
            let env_refs: Vec<(&str, &str)> =
                env.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
            let start = Instant::now();
            let mut process = Process::start(
                &argv,
                &env_refs,
                self.build_dir.path(),
                timeout,
                &mut log_file,
            )?;
            let status = loop {
                if let Some(status) = process.poll()? {
                    break status;
                }
                std::thread::sleep(Duration::from_millis(50));
            };
            let cargo_result = match status {
                ProcessStatus::Success => CargoResult::Success,
                ProcessStatus::Failure => CargoResult::Failure,
                ProcessStatus::Timeout => CargoResult::Timeout,
            };
            let duration = start.elapsed();
            phase_results.push(PhaseResult {
                phase,
                cargo_result,
                duration,
            });
            summary = SummaryOutcome::from_mutant_phase(phase, cargo_result, is_baseline);
            if !matches!(summary, SummaryOutcome::Success) {
                break;
            }
        }
        let mut outcome = ScenarioOutcome::new(log_file, summary);
        for phase_result in phase_results {
            outcome.add_phase_result(phase_result);
        }
        Ok(outcome)
    }
}
