// Copyright 2026 Martin Pool

//! The SSH execution engine: test mutants on a remote host reached over `openssh`,
//! which itself shells out to the system `ssh` binary — the same "invoke a real
//! external tool as a subprocess" pattern [`crate::cargo`] uses locally.

use std::sync::Arc;

use anyhow::{bail, Context};
use camino::Utf8Path;
use openssh::{KnownHosts, Session, Stdio};
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, Semaphore};
use tracing::{debug, warn};

use crate::cloner::pack_tarball;
use crate::db::{MutantOutcome, WorkDb, WorkerOutcome, WorkResult};
use crate::mutant::Mutant;
use crate::outcome::CargoResult;
use crate::timeouts::Timeouts;
use crate::{Options, Phase, Result};

/// Runs mutants on a single remote host, over a bounded pool of concurrent SSH sessions.
pub struct SshExecutionEngine {
    host: String,
    remote_dir: String,
    jobs: usize,
}

impl SshExecutionEngine {
    pub fn new(host: impl Into<String>, remote_dir: impl Into<String>, jobs: usize) -> SshExecutionEngine {
        SshExecutionEngine {
            host: host.into(),
            remote_dir: remote_dir.into(),
            jobs: jobs.max(1),
        }
    }

    /// Report the remote host's load average and logical CPU count, to help size
    /// how many sub-workers it can usefully run.
    pub async fn probe_capacity(&self) -> Result<RemoteCapacity> {
        let session = self.connect().await?;
        let uptime = run_remote(&session, "uptime").await?;
        let nproc = run_remote(&session, "nproc").await?;
        let cpus: usize = nproc.trim().parse().unwrap_or(1);
        Ok(RemoteCapacity {
            load_average: parse_load_average(&uptime),
            logical_cpus: cpus,
        })
    }

    /// Upload the source tree as a tarball and unpack it into the configured remote directory.
    pub async fn upload_tree(&self, source_dir: &Utf8Path) -> Result<()> {
        let bytes = pack_tarball(source_dir)?;
        let session = self.connect().await?;
        run_remote(&session, &format!("mkdir -p {}", shell_quote(&self.remote_dir))).await?;
        let mut child = session
            .command("tar")
            .arg("xz")
            .arg("-C")
            .arg(&self.remote_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .spawn()
            .await
            .context("spawn remote tar")?;
        child
            .stdin()
            .as_mut()
            .expect("tar stdin piped")
            .write_all(&bytes)
            .await
            .context("write tarball to remote tar")?;
        let status = child.wait().await.context("wait for remote tar")?;
        if !status.success() {
            bail!("remote tar extraction failed with {status:?}");
        }
        Ok(())
    }

    /// Run every mutant against the already-uploaded remote tree, recording results into `db`.
    pub async fn run(
        &self,
        mutants: Vec<(uuid::Uuid, Mutant)>,
        options: Arc<Options>,
        timeouts: Timeouts,
        db: Arc<Mutex<WorkDb>>,
    ) -> Result<()> {
        let semaphore = Arc::new(Semaphore::new(self.jobs));
        let mut handles = Vec::with_capacity(mutants.len());
        for (job_id, mutant) in mutants {
            let permit = semaphore.clone().acquire_owned().await.expect("semaphore open");
            let host = self.host.clone();
            let remote_dir = self.remote_dir.clone();
            let options = options.clone();
            let db = db.clone();
            let handle = tokio::spawn(async move {
                let _permit = permit;
                let result =
                    run_one_remote_mutant(&host, &remote_dir, &mutant, job_id, &options, timeouts)
                        .await
                        .unwrap_or_else(|err| WorkResult {
                            job_id,
                            worker_outcome: WorkerOutcome::Abnormal,
                            outcome: None,
                            output: format!("{err:#}"),
                        });
                let db = db.lock().await;
                if let Err(err) = db.record_result(&result) {
                    warn!(?err, %job_id, "failed to record remote work result");
                }
            });
            handles.push(handle);
        }
        for handle in handles {
            handle.await.context("join ssh worker task")?;
        }
        Ok(())
    }

    async fn connect(&self) -> Result<Session> {
        Session::connect(&self.host, KnownHosts::Strict)
            .await
            .with_context(|| format!("connect to {}", self.host))
    }
}

/// A remote host's reported capacity, from `uptime`/`nproc`.
#[derive(Debug, Clone, Copy)]
pub struct RemoteCapacity {
    pub load_average: Option<f64>,
    pub logical_cpus: usize,
}

async fn run_one_remote_mutant(
    host: &str,
    remote_dir: &str,
    mutant: &Mutant,
    job_id: uuid::Uuid,
    options: &Options,
    timeouts: Timeouts,
) -> Result<WorkResult> {
    let session = Session::connect(host, KnownHosts::Strict)
        .await
        .with_context(|| format!("connect to {host}"))?;
    let remote_path = format!(
        "{remote_dir}/{}",
        mutant.source_file.tree_relative_slashes()
    );
    let mutated_code = mutant.mutated_code();
    write_remote_file(&session, &remote_path, &mutated_code).await?;

    let mut summary = None;
    let mut combined_output = String::new();
    for (phase, timeout) in [
        (Phase::Check, timeouts.build),
        (Phase::Build, timeouts.build),
        (Phase::Test, timeouts.test),
    ] {
        let argv = crate::cargo::cargo_argv(None, phase, options);
        let command_line = format!("cd {} && {}", shell_quote(remote_dir), argv.join(" "));
        let result = tokio::time::timeout(timeout, run_remote(&session, &command_line)).await;
        let cargo_result = match &result {
            Err(_elapsed) => CargoResult::Timeout,
            Ok(Ok(_)) => CargoResult::Success,
            Ok(Err(_)) => CargoResult::Failure,
        };
        match result {
            Ok(Ok(text)) => combined_output.push_str(&text),
            Ok(Err(err)) => combined_output.push_str(&format!("{err:#}")),
            Err(_elapsed) => {
                combined_output.push_str(&format!("{phase} timed out after {timeout:?}\n"))
            }
        }
        let outcome = crate::outcome::SummaryOutcome::from_mutant_phase(phase, cargo_result, false);
        let done = !matches!(outcome, crate::outcome::SummaryOutcome::Success);
        summary = Some(outcome);
        if done {
            break;
        }
    }

    let original_code = mutant.source_file.code();
    if let Err(err) = write_remote_file(&session, &remote_path, original_code).await {
        debug!(?err, %job_id, "failed to restore remote file after mutant run");
    }

    let summary = summary.unwrap_or(crate::outcome::SummaryOutcome::Success);
    Ok(WorkResult {
        job_id,
        worker_outcome: WorkerOutcome::Normal,
        outcome: Some(classify(&summary)),
        output: combined_output,
    })
}

fn classify(summary: &crate::outcome::SummaryOutcome) -> MutantOutcome {
    use crate::outcome::SummaryOutcome::*;
    match summary {
        MissedMutant => MutantOutcome::Survived,
        CaughtMutant | Timeout | Success => MutantOutcome::Killed,
        Unviable => MutantOutcome::Incompetent,
    }
}

async fn write_remote_file(session: &Session, remote_path: &str, content: &str) -> Result<()> {
    let mut child = session
        .command("tee")
        .arg(remote_path)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .spawn()
        .await
        .with_context(|| format!("spawn remote tee {remote_path}"))?;
    child
        .stdin()
        .as_mut()
        .expect("tee stdin piped")
        .write_all(content.as_bytes())
        .await
        .with_context(|| format!("write remote file {remote_path}"))?;
    let status = child.wait().await.context("wait for remote tee")?;
    if !status.success() {
        bail!("remote tee of {remote_path} failed with {status:?}");
    }
    Ok(())
}

/// Run a command on the remote host and return its merged stdout+stderr.
async fn run_remote(session: &Session, command_line: &str) -> Result<String> {
    let output = session
        .command("sh")
        .arg("-c")
        .arg(command_line)
        .output()
        .await
        .with_context(|| format!("run remote command {command_line:?}"))?;
    let combined = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    if !output.status.success() {
        bail!("remote command {command_line:?} failed:\n{combined}");
    }
    Ok(combined)
}

fn parse_load_average(uptime_output: &str) -> Option<f64> {
    let (_, after) = uptime_output.rsplit_once("load average")?;
    let first = after.trim_start_matches([':', ' ']).split(',').next()?;
    first.trim().parse().ok()
}

/// Quote a path for inclusion in a remote shell command line.
fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_load_average_from_uptime() {
        let sample = " 10:00:00 up 1 day,  2:34,  1 user,  load average: 0.52, 0.58, 0.59";
        assert_eq!(parse_load_average(sample), Some(0.52));
    }

    #[test]
    fn shell_quote_escapes_single_quotes() {
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
    }
}
