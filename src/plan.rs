// Copyright 2026 Martin Pool

//! Turn discovered mutants into a durable, `job_id`-keyed work plan.

use std::collections::HashMap;

use uuid::Uuid;

use crate::db::WorkItem;
use crate::mutant::Mutant;

mod concrete;

pub use concrete::Command;

/// One planned mutation together with the durable record that represents it in the database.
pub struct PlannedMutant {
    pub work_item: WorkItem,
    pub mutant: Mutant,
}

/// The full set of mutations to be tested in a run, in a stable order.
#[derive(Default)]
pub struct Plan {
    entries: Vec<PlannedMutant>,
}

impl Plan {
    /// Assign a `job_id` and a stable, zero-based `occurrence` to every mutant.
    ///
    /// `occurrence` counts repeats of the same operator within the same file, in
    /// traversal order, so that re-running discovery against an unchanged tree
    /// reproduces the same `(module_path, operator_name, occurrence)` triples.
    pub fn build(mutants: Vec<Mutant>) -> Plan {
        let mut next_occurrence: HashMap<(String, String), usize> = HashMap::new();
        let entries = mutants
            .into_iter()
            .map(|mutant| {
                let key = (
                    mutant.source_file.tree_relative_slashes(),
                    mutant.genre.name().to_owned(),
                );
                let counter = next_occurrence.entry(key).or_insert(0);
                let occurrence = *counter;
                *counter += 1;
                let work_item = WorkItem::from_mutant(&mutant, occurrence);
                PlannedMutant { work_item, mutant }
            })
            .collect();
        Plan { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn work_items(&self) -> Vec<WorkItem> {
        self.entries.iter().map(|e| e.work_item.clone()).collect()
    }

    pub fn entries(&self) -> &[PlannedMutant] {
        &self.entries
    }

    /// Find the mutant with a given `job_id`, for running work pulled from the database.
    pub fn mutant_for(&self, job_id: Uuid) -> Option<&Mutant> {
        self.entries
            .iter()
            .find(|e| e.work_item.job_id == job_id)
            .map(|e| &e.mutant)
    }
}
