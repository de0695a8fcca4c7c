// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Grouping records by assembly and by class.

use crate::{
    classify::FrameworkError,
    record::{TestOutcome, TestOutcomeRecord},
};
use std::{
    collections::{BTreeMap, HashSet},
    time::Duration,
};
use tracing::debug;

/// Counts and cumulative duration for a group of records.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Totals {
    /// `passed + failed + skipped`.
    pub total: usize,

    /// The number of passed records.
    pub passed: usize,

    /// The number of failed records, not counting framework errors.
    pub failed: usize,

    /// The number of skipped records.
    pub skipped: usize,

    /// The sum of the durations of all records in the group.
    pub time: Duration,
}

impl Totals {
    fn add_record(&mut self, record: &TestOutcomeRecord) {
        match record.outcome {
            TestOutcome::Passed => self.passed += 1,
            TestOutcome::Failed => self.failed += 1,
            TestOutcome::Skipped => self.skipped += 1,
            TestOutcome::NotExecuted | TestOutcome::Other => {}
        }
        self.total = self.passed + self.failed + self.skipped;
        self.time += record.duration;
    }

    fn add_totals(&mut self, other: &Totals) {
        self.total += other.total;
        self.passed += other.passed;
        self.failed += other.failed;
        self.skipped += other.skipped;
        self.time += other.time;
    }
}

/// The records of a single test class.
#[derive(Clone, Debug)]
pub struct AggregatedCollection {
    /// The full name of the class.
    pub type_name: String,

    /// The records, in the order they were recorded. Framework errors are not included.
    pub tests: Vec<TestOutcomeRecord>,

    /// Counts and duration over `tests`.
    pub totals: Totals,
}

/// The records of a single assembly.
#[derive(Clone, Debug)]
pub struct AggregatedAssembly {
    /// The assembly path.
    pub path: String,

    /// One collection per class, sorted by class name.
    pub collections: Vec<AggregatedCollection>,

    /// Framework errors, de-duplicated by message and stack trace.
    pub errors: Vec<FrameworkError>,

    /// The sum of the collections' totals.
    pub totals: Totals,
}

/// Groups records by assembly path, then by class name.
///
/// Both levels are sorted by key in ordinal order; within a class the records keep their
/// relative order. Failed records that are framework errors are moved to the assembly's
/// error list and do not count towards any totals.
pub fn aggregate(records: Vec<TestOutcomeRecord>) -> Vec<AggregatedAssembly> {
    let record_count = records.len();

    let mut grouped: BTreeMap<String, BTreeMap<String, Vec<TestOutcomeRecord>>> = BTreeMap::new();
    for record in records {
        grouped
            .entry(record.assembly_path.clone())
            .or_default()
            .entry(record.type_name.clone())
            .or_default()
            .push(record);
    }

    let assemblies: Vec<_> = grouped
        .into_iter()
        .map(|(path, classes)| aggregate_assembly(path, classes))
        .collect();

    debug!(
        records = record_count,
        assemblies = assemblies.len(),
        errors = assemblies.iter().map(|a| a.errors.len()).sum::<usize>(),
        "aggregated test results"
    );

    assemblies
}

fn aggregate_assembly(
    path: String,
    classes: BTreeMap<String, Vec<TestOutcomeRecord>>,
) -> AggregatedAssembly {
    let mut collections = Vec::with_capacity(classes.len());
    let mut errors: Vec<FrameworkError> = vec![];
    let mut totals = Totals::default();

    for (type_name, records) in classes {
        let mut collection = AggregatedCollection {
            type_name,
            tests: Vec::with_capacity(records.len()),
            totals: Totals::default(),
        };
        for record in records {
            match FrameworkError::classify(record) {
                Ok(error) => errors.push(error),
                Err(record) => {
                    collection.totals.add_record(&record);
                    collection.tests.push(record);
                }
            }
        }
        totals.add_totals(&collection.totals);
        collections.push(collection);
    }

    AggregatedAssembly {
        path,
        collections,
        errors: dedup_errors(errors),
        totals,
    }
}

fn dedup_errors(errors: Vec<FrameworkError>) -> Vec<FrameworkError> {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(errors.len());
    for error in errors {
        let key = error.dedup_key();
        if seen.insert((
            key.0.map(ToOwned::to_owned),
            key.1.map(ToOwned::to_owned),
        )) {
            unique.push(error);
        }
    }
    unique
}
