// Copyright 2026 Martin Pool

//! The local execution engine: a bounded pool of workers, each with its own
//! [`BuildDir`] cloned from the source tree, testing mutants concurrently.

use std::sync::{Arc, Mutex};

use anyhow::Context;
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, warn};

use crate::build_dir::BuildDir;
use crate::cloner::Cloner;
use crate::console::Console;
use crate::db::{MutantOutcome, WorkDb, WorkerOutcome, WorkResult};
use crate::mutant::Mutant;
use crate::outcome::SummaryOutcome;
use crate::output::OutputDir;
use crate::timeouts::Timeouts;
use crate::tool::Tool;
use crate::worker::Worker;
use crate::{Options, Result};

/// Runs mutants locally, across a bounded pool of cloned build directories.
pub struct LocalExecutionEngine {
    cloner: Arc<dyn Cloner>,
    tool: Arc<dyn Tool>,
    options: Arc<Options>,
    output_dir: Arc<OutputDir>,
    jobs: usize,
}

impl LocalExecutionEngine {
    pub fn new(
        cloner: Arc<dyn Cloner>,
        tool: Arc<dyn Tool>,
        options: Arc<Options>,
        output_dir: Arc<OutputDir>,
        jobs: usize,
    ) -> LocalExecutionEngine {
        LocalExecutionEngine {
            cloner,
            tool,
            options,
            output_dir,
            jobs: jobs.max(1),
        }
    }

    /// Run every mutant in `mutants` against a fresh clone of `source_dir`, recording
    /// each result into `db` as it completes.
    ///
    /// Mutants are dispatched to whichever worker becomes free first, so a slow
    /// mutant on one worker doesn't hold up the others.
    pub async fn run(
        &self,
        source_dir: &camino::Utf8Path,
        mutants: Vec<(uuid::Uuid, Mutant)>,
        timeouts: Timeouts,
        db: Arc<Mutex<WorkDb>>,
        console: Arc<Console>,
    ) -> Result<()> {
        let semaphore = Arc::new(Semaphore::new(self.jobs));
        let (result_tx, mut result_rx) = mpsc::unbounded_channel::<WorkResult>();

        let mut handles = Vec::with_capacity(mutants.len());
        for (job_id, mutant) in mutants {
            let permit = semaphore.clone().acquire_owned().await.expect("semaphore open");
            let cloner = self.cloner.clone();
            let tool = self.tool.clone();
            let options = self.options.clone();
            let output_dir = self.output_dir.clone();
            let console = console.clone();
            let source_dir = source_dir.to_owned();
            let result_tx = result_tx.clone();
            let handle = tokio::task::spawn_blocking(move || {
                let _permit = permit;
                debug!(thread_id = ?std::thread::current().id(), "start thread");
                let result = run_one_mutant(
                    &cloner,
                    tool,
                    options,
                    output_dir,
                    &source_dir,
                    job_id,
                    &mutant,
                    timeouts,
                    &console,
                );
                let _ = result_tx.send(result);
            });
            handles.push(handle);
        }
        drop(result_tx);

        let writer = tokio::task::spawn(async move {
            while let Some(result) = result_rx.recv().await {
                let db = db.lock().expect("lock work database");
                if let Err(err) = db.record_result(&result) {
                    warn!(?err, job_id = %result.job_id, "failed to record work result");
                }
            }
        });

        for handle in handles {
            handle.await.context("join worker task")?;
        }
        writer.await.context("join result-writer task")?;
        Ok(())
    }
}

/// Clone the tree, build it, run one mutant in the fresh clone, and reduce its outcome
/// to a durable [`WorkResult`].
#[allow(clippy::too_many_arguments)]
fn run_one_mutant(
    cloner: &Arc<dyn Cloner>,
    tool: Arc<dyn Tool>,
    options: Arc<Options>,
    output_dir: Arc<OutputDir>,
    source_dir: &camino::Utf8Path,
    job_id: uuid::Uuid,
    mutant: &Mutant,
    timeouts: Timeouts,
    console: &Console,
) -> WorkResult {
    let name_base = format!("cargo-mutants-{job_id}-");
    let build_dir = match cloner
        .clone_tree(source_dir, &name_base, &options, console)
        .and_then(|temp_dir| BuildDir::from_temp_dir(temp_dir, source_dir, name_base.clone()))
    {
        Ok(build_dir) => build_dir,
        Err(err) => {
            debug!(?err, %job_id, "failed to clone build dir for mutant");
            return WorkResult {
                job_id,
                worker_outcome: WorkerOutcome::Abnormal,
                outcome: None,
                output: format!("{err:#}"),
            };
        }
    };
    let worker = Worker::new(build_dir, tool, options, output_dir);
    match worker.test_mutant(mutant, timeouts) {
        Ok(outcome) => {
            let output = outcome
                .log_file
                .get_log_content()
                .unwrap_or_else(|err| format!("{err:#}"));
            WorkResult {
                job_id,
                worker_outcome: WorkerOutcome::Normal,
                outcome: Some(classify(&outcome.summary)),
                output,
            }
        }
        Err(err) => WorkResult {
            job_id,
            worker_outcome: WorkerOutcome::Exception,
            outcome: None,
            output: format!("{err:#}"),
        },
    }
}

fn classify(summary: &SummaryOutcome) -> MutantOutcome {
    match summary {
        SummaryOutcome::MissedMutant => MutantOutcome::Survived,
        SummaryOutcome::CaughtMutant | SummaryOutcome::Timeout | SummaryOutcome::Success => {
            MutantOutcome::Killed
        }
        SummaryOutcome::Unviable => MutantOutcome::Incompetent,
    }
}
