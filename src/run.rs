// Copyright 2026 Martin Pool

//! The supervisor: turns parsed command-line [Args] into a session, walking the tree to
//! discover mutants, recording a plan in the [crate::db::WorkDb], running a baseline, and
//! dispatching the remaining work to whichever execution engine is configured.

use std::str::FromStr;
use std::sync::Arc;

use anyhow::bail;
use tracing::{info, warn};

use crate::annotation::ResolvedAnnotation;
use crate::build_dir::BuildDir;
use crate::cargo::CargoTool;
use crate::cloner::{Cloner, CopyCloner, GitCloner};
use crate::config::Config;
use crate::console::{style_status_bad, style_status_good};
use crate::db::WorkDb;
use crate::engine::LocalExecutionEngine;
use crate::in_diff::diff_filter_file;
use crate::options::{BaselineStrategy, Options};
use crate::outcome::RunOutcome;
use crate::output::OutputDir;
use crate::package::Package;
use crate::shard::Shard;
use crate::ssh_engine::SshExecutionEngine;
use crate::timeouts::Timeouts;
use crate::tool::Tool;
use crate::workspace::{PackageFilter, Workspace};
use crate::{exit_code, Args, Console, Result};

/// Run the whole program from parsed arguments, returning the process exit code.
pub fn run(args: &Args, console: &Arc<Console>) -> Result<i32> {
    let workspace = Workspace::open(&args.dir)?;
    let config = Config::read_tree_config(&workspace.dir)?;
    let options = Options::new(args, &config)?;

    let options = Arc::new(options);

    let package_filter = if args.workspace {
        PackageFilter::All
    } else if !args.package.is_empty() {
        PackageFilter::explicit(&args.package)
    } else {
        PackageFilter::Auto(workspace.dir.clone())
    };

    if args.show_config {
        console.message(&toml::to_string_pretty(&config)?);
        return Ok(exit_code::SUCCESS);
    }

    let mut discovered = workspace.discover(&package_filter, &options, console)?;

    if let Some(diff_path) = &args.in_diff {
        match diff_filter_file(std::mem::take(&mut discovered.mutants), diff_path) {
            Ok(filtered) => discovered.mutants = filtered,
            Err(err) => {
                warn!(%err, "diff filter rejected the run");
                console.message(&err.to_string());
                return Ok(err.exit_code());
            }
        }
    }

    if let Some(shard_str) = &args.shard {
        let shard = Shard::from_str(shard_str)?;
        discovered.mutants = shard.select(discovered.mutants);
    }

    if args.list {
        let mut out = String::new();
        crate::list::list_mutants(&mut out, &discovered, &options)?;
        print!("{out}");
        return Ok(exit_code::SUCCESS);
    }
    if args.list_files {
        let mut out = String::new();
        crate::list::list_files(&mut out, &discovered, &options)?;
        print!("{out}");
        return Ok(exit_code::SUCCESS);
    }

    if discovered.mutants.is_empty() {
        console.message("no mutants found");
        return Ok(exit_code::SUCCESS);
    }

    let output_in_dir = options
        .output_in_dir
        .clone()
        .unwrap_or_else(|| workspace.dir.clone());
    let output_dir = Arc::new(OutputDir::new(output_in_dir.as_std_path())?);

    let plan = crate::plan::Plan::build(discovered.mutants);
    let db_path = output_dir
        .path()
        .join(config.session.file.as_deref().unwrap_or("mutants.db"));
    let db_path = camino::Utf8Path::from_path(&db_path).expect("db path is UTF-8");
    {
        let mut init_db = WorkDb::create(db_path, &toml::to_string(&config)?)?;
        init_db.clear()?;
        init_db.insert_plan(&plan.work_items())?;
    }

    let cloner: Arc<dyn Cloner> = match config.cloning.method.as_deref() {
        Some("git") => Arc::new(GitCloner),
        _ => Arc::new(CopyCloner),
    };
    let tool: Arc<dyn Tool> = Arc::new(CargoTool::default());

    let packages: Vec<Arc<Package>> = workspace.packages(&package_filter)?;
    let package_refs: Vec<&Package> = packages.iter().map(|p| p.as_ref()).collect();

    let timeouts = match options.baseline {
        BaselineStrategy::Skip => {
            console.message("skipping baseline");
            Timeouts::without_baseline(&options)
        }
        BaselineStrategy::Run => {
            console.message("running baseline");
            let build_dir = BuildDir::new(&workspace.dir, &options, console)?;
            let worker = crate::worker::Worker::new(
                build_dir,
                tool.clone(),
                options.clone(),
                output_dir.clone(),
            );
            let baseline_packages = if package_refs.is_empty() {
                None
            } else {
                Some(package_refs.as_slice())
            };
            let baseline = worker.run_baseline(baseline_packages)?;
            if !matches!(baseline.summary, crate::outcome::SummaryOutcome::Success) {
                console.message(&style_status_bad("baseline failed").to_string());
                return Ok(exit_code::BASELINE_FAILED);
            }
            console.message(&style_status_good("baseline passed").to_string());
            Timeouts::from_baseline(&baseline, &options)
        }
    };

    let jobs = args
        .jobs
        .or(config.execution_engine.jobs)
        .unwrap_or_else(num_cpus);
    let available = num_cpus();
    if jobs > available * 2 {
        warn!("--jobs={jobs} is probably too high: this host has {available} available cores");
    }
    let engine_name = config.execution_engine.name.as_deref().unwrap_or("local");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .enable_io()
        .build()?;

    let mutants_with_ids: Vec<(uuid::Uuid, crate::mutant::Mutant)> = plan
        .entries()
        .iter()
        .map(|e| (e.work_item.job_id, e.mutant.clone()))
        .collect();

    match engine_name {
        "ssh" => {
            let host = config.execution_engine.ssh_host.clone().ok_or_else(|| {
                anyhow::anyhow!("execution-engine.ssh_host is required for the ssh engine")
            })?;
            let remote_dir = config
                .execution_engine
                .ssh_remote_dir
                .clone()
                .unwrap_or_else(|| "mutant-lab-remote".to_owned());
            let engine = SshExecutionEngine::new(host, remote_dir, jobs);
            let db = Arc::new(tokio::sync::Mutex::new(WorkDb::open(db_path)?));
            let source_dir = workspace.dir.clone();
            let run_options = options.clone();
            runtime.block_on(async move {
                engine.upload_tree(&source_dir).await?;
                engine.run(mutants_with_ids, run_options, timeouts, db).await
            })?;
        }
        "local" => {
            let engine =
                LocalExecutionEngine::new(cloner, tool, options.clone(), output_dir.clone(), jobs);
            let db = Arc::new(std::sync::Mutex::new(WorkDb::open(db_path)?));
            runtime.block_on(engine.run(
                &workspace.dir,
                mutants_with_ids,
                timeouts,
                db,
                console.clone(),
            ))?;
        }
        other => bail!("unknown execution engine {other:?}"),
    }

    let db = WorkDb::open(db_path)?;
    let mut run_outcome = RunOutcome::default();
    let annotations = options.annotations.resolve();
    for entry in plan.entries() {
        if let Some(result) = db.result_for(entry.work_item.job_id)? {
            if let Some(outcome) = result.outcome {
                let summary = summary_for(outcome);
                run_outcome.add(summary);
                if matches!(outcome, crate::db::MutantOutcome::Survived)
                    && !matches!(annotations, ResolvedAnnotation::None)
                {
                    print!("{}", annotations.format(&entry.mutant));
                }
            }
        }
    }

    info!(
        caught = run_outcome.caught(),
        missed = run_outcome.missed(),
        timeout = run_outcome.timeout(),
        unviable = run_outcome.unviable(),
        "run finished"
    );
    console.message(&format!(
        "{} mutants caught, {} missed, {} timeouts, {} unviable",
        run_outcome.caught(),
        run_outcome.missed(),
        run_outcome.timeout(),
        run_outcome.unviable(),
    ));

    Ok(run_outcome.exit_code())
}

fn summary_for(outcome: crate::db::MutantOutcome) -> crate::outcome::SummaryOutcome {
    use crate::db::MutantOutcome::*;
    use crate::outcome::SummaryOutcome;
    match outcome {
        Killed => SummaryOutcome::CaughtMutant,
        Survived => SummaryOutcome::MissedMutant,
        Incompetent => SummaryOutcome::Unviable,
    }
}

fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
