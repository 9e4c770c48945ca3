// Copyright 2026 Martin Pool

//! The work database: a durable, resumable record of the mutation plan and
//! the outcomes observed for each planned mutation.
//!
//! Backed by a single SQLite file (`rusqlite`, bundled), in WAL journal
//! mode so a crashed run can be resumed by reopening the same file and
//! reading back which `job_id`s already have a result.

use std::str::FromStr;

use anyhow::{Context, Result};
use camino::Utf8Path;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::mutant::Mutant;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS config (id INTEGER PRIMARY KEY CHECK (id = 0), toml TEXT NOT NULL);
CREATE TABLE IF NOT EXISTS work_items (
    job_id TEXT PRIMARY KEY,
    module_path TEXT NOT NULL,
    operator_name TEXT NOT NULL,
    occurrence INTEGER NOT NULL,
    start_line INTEGER NOT NULL, start_col INTEGER NOT NULL,
    end_line INTEGER NOT NULL, end_col INTEGER NOT NULL,
    diff TEXT NOT NULL,
    UNIQUE (module_path, operator_name, occurrence)
);
CREATE TABLE IF NOT EXISTS work_results (
    job_id TEXT PRIMARY KEY REFERENCES work_items(job_id),
    worker_outcome TEXT NOT NULL,
    outcome TEXT,
    output TEXT NOT NULL
);
";

/// How the worker process itself terminated.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum WorkerOutcome {
    /// The worker ran the test command to completion.
    Normal,
    /// The worker raised an internal error unrelated to the mutant.
    Exception,
    /// The worker process was killed or crashed (e.g. OOM, signal).
    Abnormal,
    /// The test command exists but exercises no tests.
    NoTest,
    /// An interceptor pre-decided the outcome; the worker never ran.
    Skipped,
}

impl WorkerOutcome {
    fn as_str(self) -> &'static str {
        match self {
            WorkerOutcome::Normal => "normal",
            WorkerOutcome::Exception => "exception",
            WorkerOutcome::Abnormal => "abnormal",
            WorkerOutcome::NoTest => "no_test",
            WorkerOutcome::Skipped => "skipped",
        }
    }
}

impl FromStr for WorkerOutcome {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "normal" => WorkerOutcome::Normal,
            "exception" => WorkerOutcome::Exception,
            "abnormal" => WorkerOutcome::Abnormal,
            "no_test" => WorkerOutcome::NoTest,
            "skipped" => WorkerOutcome::Skipped,
            other => anyhow::bail!("unknown worker outcome {other:?}"),
        })
    }
}

/// What the mutant itself did, once the worker ran to completion.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum MutantOutcome {
    /// Tests still passed: the mutant escaped detection.
    Survived,
    /// A test failed: the mutant was caught.
    Killed,
    /// The mutated tree didn't even build.
    Incompetent,
}

impl MutantOutcome {
    fn as_str(self) -> &'static str {
        match self {
            MutantOutcome::Survived => "survived",
            MutantOutcome::Killed => "killed",
            MutantOutcome::Incompetent => "incompetent",
        }
    }
}

impl FromStr for MutantOutcome {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "survived" => MutantOutcome::Survived,
            "killed" => MutantOutcome::Killed,
            "incompetent" => MutantOutcome::Incompetent,
            other => anyhow::bail!("unknown mutant outcome {other:?}"),
        })
    }
}

/// One planned mutation: the durable, never-mutated record created at discovery time.
#[derive(Debug, Clone)]
pub struct WorkItem {
    pub job_id: Uuid,
    pub module_path: String,
    pub operator_name: String,
    pub occurrence: usize,
    pub start_line: usize,
    pub start_col: usize,
    pub end_line: usize,
    pub end_col: usize,
    pub diff: String,
}

impl WorkItem {
    /// Build the `job_id`-bearing plan record for one discovered mutant.
    ///
    /// `occurrence` is the zero-based index of this mutant among all mutants
    /// this operator produced for this file, under deterministic traversal.
    pub fn from_mutant(mutant: &Mutant, occurrence: usize) -> WorkItem {
        let span = mutant.span;
        WorkItem {
            job_id: Uuid::new_v4(),
            module_path: mutant.source_file.tree_relative_slashes(),
            operator_name: mutant.genre.name().to_owned(),
            occurrence,
            start_line: span.start.line,
            start_col: span.start.column.saturating_sub(1),
            end_line: span.end.line,
            end_col: span.end.column.saturating_sub(1),
            diff: mutant.diff(&mutant.mutated_code()),
        }
    }
}

/// The outcome of one attempted mutation test.
#[derive(Debug, Clone)]
pub struct WorkResult {
    pub job_id: Uuid,
    pub worker_outcome: WorkerOutcome,
    pub outcome: Option<MutantOutcome>,
    pub output: String,
}

impl WorkResult {
    /// True unless the mutant survived: a mutant with no defined `outcome`
    /// (because the worker didn't run normally) counts as killed, per the
    /// data model's derivation rule.
    pub fn is_killed(&self) -> bool {
        !matches!(self.outcome, Some(MutantOutcome::Survived))
    }
}

/// A durable, resumable store of a mutation run's plan and results.
pub struct WorkDb {
    conn: Connection,
}

impl WorkDb {
    /// Create a fresh database at `path`, recording `config_toml` as the plan's configuration.
    pub fn create(path: &Utf8Path, config_toml: &str) -> Result<WorkDb> {
        let conn = Connection::open(path)
            .with_context(|| format!("open work database {path}"))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", true)?;
        conn.execute_batch(SCHEMA)?;
        conn.execute(
            "INSERT INTO config (id, toml) VALUES (0, ?1)",
            params![config_toml],
        )?;
        Ok(WorkDb { conn })
    }

    /// Open an existing database, for resuming a crashed or interrupted run.
    pub fn open(path: &Utf8Path) -> Result<WorkDb> {
        let conn =
            Connection::open(path).with_context(|| format!("open work database {path}"))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", true)?;
        conn.execute_batch(SCHEMA)?;
        Ok(WorkDb { conn })
    }

    /// The configuration this plan was created with.
    pub fn config_toml(&self) -> Result<String> {
        Ok(self
            .conn
            .query_row("SELECT toml FROM config WHERE id = 0", [], |row| {
                row.get(0)
            })?)
    }

    /// Insert the whole work plan in a single transaction.
    pub fn insert_plan(&mut self, items: &[WorkItem]) -> Result<()> {
        let tx = self.conn.transaction()?;
        for item in items {
            tx.execute(
                "INSERT INTO work_items \
                 (job_id, module_path, operator_name, occurrence, \
                  start_line, start_col, end_line, end_col, diff) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    item.job_id.to_string(),
                    item.module_path,
                    item.operator_name,
                    item.occurrence as i64,
                    item.start_line as i64,
                    item.start_col as i64,
                    item.end_line as i64,
                    item.end_col as i64,
                    item.diff,
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Record the outcome of one job. Overwrites any previous result for the same `job_id`.
    pub fn record_result(&self, result: &WorkResult) -> Result<()> {
        self.conn.execute(
            "INSERT INTO work_results (job_id, worker_outcome, outcome, output) \
             VALUES (?1, ?2, ?3, ?4) \
             ON CONFLICT(job_id) DO UPDATE SET \
                worker_outcome = excluded.worker_outcome, \
                outcome = excluded.outcome, \
                output = excluded.output",
            params![
                result.job_id.to_string(),
                result.worker_outcome.as_str(),
                result.outcome.map(MutantOutcome::as_str),
                result.output,
            ],
        )?;
        Ok(())
    }

    /// All work items that don't yet have a recorded result.
    pub fn pending_work_items(&self) -> Result<Vec<WorkItem>> {
        let mut stmt = self.conn.prepare(
            "SELECT job_id, module_path, operator_name, occurrence, \
                    start_line, start_col, end_line, end_col, diff \
             FROM work_items \
             WHERE job_id NOT IN (SELECT job_id FROM work_results) \
             ORDER BY module_path, operator_name, occurrence",
        )?;
        let rows = stmt.query_map([], row_to_work_item)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("read pending work items")
    }

    /// Every work item in the plan, regardless of whether it has a result yet.
    pub fn work_items(&self) -> Result<Vec<WorkItem>> {
        let mut stmt = self.conn.prepare(
            "SELECT job_id, module_path, operator_name, occurrence, \
                    start_line, start_col, end_line, end_col, diff \
             FROM work_items \
             ORDER BY module_path, operator_name, occurrence",
        )?;
        let rows = stmt.query_map([], row_to_work_item)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("read work items")
    }

    /// All work items that already have a recorded result.
    pub fn completed_work_items(&self) -> Result<Vec<WorkItem>> {
        let mut stmt = self.conn.prepare(
            "SELECT job_id, module_path, operator_name, occurrence, \
                    start_line, start_col, end_line, end_col, diff \
             FROM work_items \
             WHERE job_id IN (SELECT job_id FROM work_results) \
             ORDER BY module_path, operator_name, occurrence",
        )?;
        let rows = stmt.query_map([], row_to_work_item)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("read completed work items")
    }

    /// Every result recorded so far.
    pub fn results(&self) -> Result<Vec<WorkResult>> {
        let mut stmt = self
            .conn
            .prepare("SELECT job_id, worker_outcome, outcome, output FROM work_results")?;
        let rows = stmt.query_map([], row_to_work_result)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("read work results")
    }

    pub fn num_work_items(&self) -> Result<usize> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM work_items", [], |row| row.get::<_, i64>(0))?
            as usize)
    }

    pub fn num_results(&self) -> Result<usize> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM work_results", [], |row| {
                row.get::<_, i64>(0)
            })? as usize)
    }

    /// Look up the result previously recorded for `job_id`, if any.
    pub fn result_for(&self, job_id: Uuid) -> Result<Option<WorkResult>> {
        self.conn
            .query_row(
                "SELECT job_id, worker_outcome, outcome, output FROM work_results WHERE job_id = ?1",
                params![job_id.to_string()],
                row_to_work_result,
            )
            .optional()
            .context("read work result")
    }

    /// Erase both the work plan and all results. Only legal before execution starts.
    pub fn clear(&self) -> Result<()> {
        self.conn.execute("DELETE FROM work_results", [])?;
        self.conn.execute("DELETE FROM work_items", [])?;
        Ok(())
    }
}

fn row_to_work_item(row: &rusqlite::Row) -> rusqlite::Result<WorkItem> {
    let job_id: String = row.get(0)?;
    Ok(WorkItem {
        job_id: Uuid::parse_str(&job_id).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?,
        module_path: row.get(1)?,
        operator_name: row.get(2)?,
        occurrence: row.get::<_, i64>(3)? as usize,
        start_line: row.get::<_, i64>(4)? as usize,
        start_col: row.get::<_, i64>(5)? as usize,
        end_line: row.get::<_, i64>(6)? as usize,
        end_col: row.get::<_, i64>(7)? as usize,
        diff: row.get(8)?,
    })
}

fn row_to_work_result(row: &rusqlite::Row) -> rusqlite::Result<WorkResult> {
    let job_id: String = row.get(0)?;
    let worker_outcome: String = row.get(1)?;
    let outcome: Option<String> = row.get(2)?;
    Ok(WorkResult {
        job_id: Uuid::parse_str(&job_id).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?,
        worker_outcome: worker_outcome.parse().map_err(|e: anyhow::Error| {
            rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, e.into())
        })?,
        outcome: outcome
            .map(|s| s.parse())
            .transpose()
            .map_err(|e: anyhow::Error| {
                rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, e.into())
            })?,
        output: row.get(3)?,
    })
}

#[cfg(test)]
mod test {
    use camino::Utf8Path;
    use tempfile::TempDir;

    use super::*;

    fn temp_db_path(temp_dir: &TempDir) -> camino::Utf8PathBuf {
        Utf8Path::from_path(temp_dir.path())
            .unwrap()
            .join("mutants.db")
    }

    fn sample_item(occurrence: usize) -> WorkItem {
        WorkItem {
            job_id: Uuid::new_v4(),
            module_path: "src/lib.rs".to_owned(),
            operator_name: "binary_operator".to_owned(),
            occurrence,
            start_line: 1,
            start_col: 0,
            end_line: 1,
            end_col: 5,
            diff: "--- a\n+++ b\n".to_owned(),
        }
    }

    #[test]
    fn create_and_reopen_preserves_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_db_path(&temp_dir);
        {
            let db = WorkDb::create(&path, "timeout_multiplier = 2.0").unwrap();
            assert_eq!(db.config_toml().unwrap(), "timeout_multiplier = 2.0");
        }
        let db = WorkDb::open(&path).unwrap();
        assert_eq!(db.config_toml().unwrap(), "timeout_multiplier = 2.0");
    }

    #[test]
    fn plan_then_results_tracks_pending() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_db_path(&temp_dir);
        let mut db = WorkDb::create(&path, "").unwrap();
        let items = vec![sample_item(0), sample_item(1)];
        db.insert_plan(&items).unwrap();
        assert_eq!(db.num_work_items().unwrap(), 2);
        assert_eq!(db.pending_work_items().unwrap().len(), 2);

        db.record_result(&WorkResult {
            job_id: items[0].job_id,
            worker_outcome: WorkerOutcome::Normal,
            outcome: Some(MutantOutcome::Killed),
            output: "test failed".to_owned(),
        })
        .unwrap();

        assert_eq!(db.num_results().unwrap(), 1);
        let pending = db.pending_work_items().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].job_id, items[1].job_id);

        let result = db.result_for(items[0].job_id).unwrap().unwrap();
        assert!(result.is_killed());
    }

    #[test]
    fn survived_outcome_is_not_killed() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_db_path(&temp_dir);
        let mut db = WorkDb::create(&path, "").unwrap();
        let item = sample_item(0);
        db.insert_plan(std::slice::from_ref(&item)).unwrap();
        db.record_result(&WorkResult {
            job_id: item.job_id,
            worker_outcome: WorkerOutcome::Normal,
            outcome: Some(MutantOutcome::Survived),
            output: String::new(),
        })
        .unwrap();
        let result = db.result_for(item.job_id).unwrap().unwrap();
        assert!(!result.is_killed());
    }

    #[test]
    fn clear_removes_plan_and_results() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_db_path(&temp_dir);
        let mut db = WorkDb::create(&path, "").unwrap();
        let item = sample_item(0);
        db.insert_plan(std::slice::from_ref(&item)).unwrap();
        db.record_result(&WorkResult {
            job_id: item.job_id,
            worker_outcome: WorkerOutcome::Normal,
            outcome: Some(MutantOutcome::Killed),
            output: String::new(),
        })
        .unwrap();
        db.clear().unwrap();
        assert_eq!(db.num_work_items().unwrap(), 0);
        assert_eq!(db.num_results().unwrap(), 0);
    }

    #[test]
    fn record_result_for_unplanned_job_id_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_db_path(&temp_dir);
        let db = WorkDb::create(&path, "").unwrap();
        let result = db.record_result(&WorkResult {
            job_id: Uuid::new_v4(),
            worker_outcome: WorkerOutcome::Normal,
            outcome: Some(MutantOutcome::Killed),
            output: String::new(),
        });
        assert!(result.is_err());
    }

    #[test]
    fn work_items_results_and_completed_cover_the_whole_plan() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_db_path(&temp_dir);
        let mut db = WorkDb::create(&path, "").unwrap();
        let items = vec![sample_item(0), sample_item(1)];
        db.insert_plan(&items).unwrap();
        assert_eq!(db.work_items().unwrap().len(), 2);
        assert!(db.completed_work_items().unwrap().is_empty());
        assert!(db.results().unwrap().is_empty());

        db.record_result(&WorkResult {
            job_id: items[0].job_id,
            worker_outcome: WorkerOutcome::Normal,
            outcome: Some(MutantOutcome::Killed),
            output: "caught".to_owned(),
        })
        .unwrap();

        assert_eq!(db.work_items().unwrap().len(), 2);
        let completed = db.completed_work_items().unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].job_id, items[0].job_id);
        assert_eq!(db.results().unwrap().len(), 1);
    }

    #[test]
    fn duplicate_module_operator_occurrence_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_db_path(&temp_dir);
        let mut db = WorkDb::create(&path, "").unwrap();
        let mut item_b = sample_item(0);
        item_b.job_id = Uuid::new_v4();
        db.insert_plan(&[sample_item(0)]).unwrap();
        assert!(db.insert_plan(&[item_b]).is_err());
    }
}
