// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The run accumulator.

use crate::{
    aggregator::aggregate,
    builder::{ConfigFileProbe, FsConfigFileProbe, RunMetadata, build_document_with_probe},
    config::LoggerConfig,
    errors::WriteReportError,
    record::{TestOutcomeRecord, TestResultEvent},
};
use camino::Utf8PathBuf;
use chrono::{DateTime, FixedOffset, Local};
use std::{
    fs::File,
    io::{BufWriter, Write},
    sync::{Mutex, PoisonError},
};
use tracing::{debug, info, warn};
use xunit_xml::Assemblies;

/// Collects test results during a run and writes the xUnit report at the end.
///
/// [`record`](Self::record) may be called from any number of threads, including while
/// [`finish`](Self::finish) runs. Each recorded result ends up in exactly one document.
pub struct XunitLogger {
    config: LoggerConfig,
    start_time: DateTime<FixedOffset>,
    probe: Box<dyn ConfigFileProbe + Send + Sync>,
    records: Mutex<Vec<TestOutcomeRecord>>,
}

impl XunitLogger {
    /// Creates a new logger for a run starting now.
    pub fn new(config: LoggerConfig) -> Self {
        Self::with_start_time(config, Local::now().fixed_offset())
    }

    /// Creates a new logger for a run that started at the given time.
    pub fn with_start_time(
        config: LoggerConfig,
        start_time: impl Into<DateTime<FixedOffset>>,
    ) -> Self {
        Self {
            config,
            start_time: start_time.into(),
            probe: Box::new(FsConfigFileProbe),
            records: Mutex::new(vec![]),
        }
    }

    /// Replaces the probe used to find assembly config files.
    pub fn set_config_file_probe(
        &mut self,
        probe: impl ConfigFileProbe + Send + Sync + 'static,
    ) -> &mut Self {
        self.probe = Box::new(probe);
        self
    }

    /// Returns the logger configuration.
    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    /// Records a completed test.
    ///
    /// Results whose type and method names can't be determined are dropped with a warning.
    pub fn record(&self, event: TestResultEvent) {
        match TestOutcomeRecord::from_event(event) {
            Ok(record) => {
                // The buffer is plain data, so a panic while holding the lock can't leave
                // it inconsistent.
                let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
                records.push(record);
            }
            Err(error) => {
                warn!("dropping test result: {error}");
            }
        }
    }

    /// Builds the document from all results recorded so far.
    ///
    /// The recorded results are consumed: a second call only sees results recorded after
    /// the first one.
    pub fn finish(&self) -> Assemblies {
        let records = {
            let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::take(&mut *records)
        };
        debug!(records = records.len(), "finishing xUnit report");

        build_document_with_probe(aggregate(records), &self.run_metadata(), &*self.probe)
    }

    /// Builds the document and writes it to the configured path, returning that path.
    pub fn finish_to_file(&self) -> Result<Utf8PathBuf, WriteReportError> {
        let document = self.finish();

        let path = self.config.path();
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|error| WriteReportError::Fs {
                file: dir.to_path_buf(),
                error,
            })?;
        }

        let f = File::create(path).map_err(|error| WriteReportError::Fs {
            file: path.to_path_buf(),
            error,
        })?;
        let mut writer = BufWriter::new(f);
        document
            .serialize(&mut writer)
            .map_err(|error| WriteReportError::Serialize {
                file: path.to_path_buf(),
                error,
            })?;
        writer.flush().map_err(|error| WriteReportError::Fs {
            file: path.to_path_buf(),
            error,
        })?;

        info!("Results File: {path}");
        Ok(path.to_path_buf())
    }

    fn run_metadata(&self) -> RunMetadata {
        let mut metadata = RunMetadata::new(self.start_time);
        metadata.set_end_time(Local::now().fixed_offset());
        if let Some(environment) = self.config.environment() {
            metadata.set_environment(environment);
        }
        if let Some(version) = self.config.xunit_version() {
            metadata.set_framework_version(version);
        }
        metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::LoggerParameters, record::TestOutcome};
    use std::thread;

    fn logger() -> XunitLogger {
        let mut parameters = LoggerParameters::new();
        parameters.insert("LogFilePath".to_owned(), "/unused/results.xml".to_owned());
        XunitLogger::new(LoggerConfig::from_parameters(&parameters).unwrap())
    }

    #[test]
    fn unresolvable_names_are_dropped() {
        let logger = logger();
        logger.record(TestResultEvent::new("a.dll", "NoTypeName", TestOutcome::Passed));
        logger.record(TestResultEvent::new("a.dll", "Ns.Class.Method", TestOutcome::Passed));

        let document = logger.finish();
        assert_eq!(document.assemblies.len(), 1);
        assert_eq!(document.assemblies[0].total, 1);
    }

    #[test]
    fn finish_consumes_records() {
        let logger = logger();
        logger.record(TestResultEvent::new("a.dll", "Ns.Class.Method", TestOutcome::Passed));

        assert_eq!(logger.finish().assemblies.len(), 1);
        assert!(logger.finish().assemblies.is_empty());
    }

    #[test]
    fn concurrent_records_are_each_counted_once() {
        let logger = logger();
        let mut documents = vec![];

        thread::scope(|s| {
            for thread_idx in 0..8 {
                let logger = &logger;
                s.spawn(move || {
                    for test_idx in 0..50 {
                        logger.record(TestResultEvent::new(
                            "a.dll",
                            format!("Ns.Class{thread_idx}.Method{test_idx}"),
                            TestOutcome::Passed,
                        ));
                    }
                });
            }
            documents.push(logger.finish());
        });
        documents.push(logger.finish());

        let total: usize = documents
            .iter()
            .flat_map(|d| &d.assemblies)
            .map(|a| a.total)
            .sum();
        assert_eq!(total, 400);
    }
}
