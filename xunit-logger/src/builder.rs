// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Building the xUnit document from aggregated results.

use crate::{
    aggregator::{AggregatedAssembly, AggregatedCollection, Totals},
    classify::FrameworkError,
    record::{TestOutcome, TestOutcomeRecord},
};
use camino::Utf8Path;
use chrono::{DateTime, FixedOffset};
use tracing::debug;
use xunit_xml::{
    Assemblies, Assembly, Collection, ErrorEntry, Failure, Test, TestResultKind, XmlText,
};

/// Information about the run as a whole.
#[derive(Clone, Debug)]
pub struct RunMetadata {
    /// When the run started.
    pub start_time: DateTime<FixedOffset>,

    /// When the run ended, if known.
    pub end_time: Option<DateTime<FixedOffset>>,

    /// A free-form description of the environment.
    pub environment: Option<String>,

    /// The xUnit.net version, for example `2.4.1`.
    pub framework_version: Option<String>,
}

impl RunMetadata {
    /// Creates metadata for a run that started at the given time.
    pub fn new(start_time: impl Into<DateTime<FixedOffset>>) -> Self {
        Self {
            start_time: start_time.into(),
            end_time: None,
            environment: None,
            framework_version: None,
        }
    }

    /// Sets the end time.
    pub fn set_end_time(&mut self, end_time: impl Into<DateTime<FixedOffset>>) -> &mut Self {
        self.end_time = Some(end_time.into());
        self
    }

    /// Sets the environment description.
    pub fn set_environment(&mut self, environment: impl Into<String>) -> &mut Self {
        self.environment = Some(environment.into());
        self
    }

    /// Sets the xUnit.net version.
    pub fn set_framework_version(&mut self, version: impl Into<String>) -> &mut Self {
        self.framework_version = Some(version.into());
        self
    }
}

/// Checks whether an assembly has a `.config` file next to it.
pub trait ConfigFileProbe {
    /// Returns the path of the config file for `assembly_path`, if one exists.
    fn config_file(&self, assembly_path: &str) -> Option<String>;
}

/// Looks for `<assembly path>.config` on the local file system.
#[derive(Copy, Clone, Debug, Default)]
pub struct FsConfigFileProbe;

impl ConfigFileProbe for FsConfigFileProbe {
    fn config_file(&self, assembly_path: &str) -> Option<String> {
        let config_file = format!("{assembly_path}.config");
        Utf8Path::new(&config_file).is_file().then_some(config_file)
    }
}

/// Builds the document, probing the local file system for config files.
pub fn build_document(assemblies: Vec<AggregatedAssembly>, metadata: &RunMetadata) -> Assemblies {
    build_document_with_probe(assemblies, metadata, &FsConfigFileProbe)
}

/// Builds the document with a custom config file probe.
pub fn build_document_with_probe(
    assemblies: Vec<AggregatedAssembly>,
    metadata: &RunMetadata,
    probe: &dyn ConfigFileProbe,
) -> Assemblies {
    if let Some(end_time) = metadata.end_time {
        debug!(
            elapsed = %humantime_elapsed(metadata.start_time, end_time),
            "building xUnit document"
        );
    }

    let mut document = Assemblies::new(metadata.start_time);
    document.add_assemblies(
        assemblies
            .into_iter()
            .map(|assembly| build_assembly(assembly, metadata, probe)),
    );
    document
}

fn build_assembly(
    assembly: AggregatedAssembly,
    metadata: &RunMetadata,
    probe: &dyn ConfigFileProbe,
) -> Assembly {
    let AggregatedAssembly {
        path,
        collections,
        errors,
        totals,
    } = assembly;

    let mut element = Assembly::new(path.as_str(), metadata.start_time);
    if let Some(environment) = non_blank(metadata.environment.as_deref()) {
        element.set_environment(environment);
    }
    if let Some(version) = non_blank(metadata.framework_version.as_deref()) {
        element.set_test_framework(format!("xUnit.net {version}"));
    }
    if let Some(config_file) = probe.config_file(&path) {
        element.set_config_file(config_file);
    }

    for error in &errors {
        element.add_error(build_error(error));
    }

    // Counts and time come from the aggregator.
    element.collections = collections.into_iter().map(build_collection).collect();
    let Totals {
        total,
        passed,
        failed,
        skipped,
        time,
    } = totals;
    element.total = total;
    element.passed = passed;
    element.failed = failed;
    element.skipped = skipped;
    element.time = time;

    element
}

fn build_error(error: &FrameworkError) -> ErrorEntry {
    let parsed = error.parse();
    let mut failure = Failure::new(
        parsed.message,
        XmlText::from_optional(error.stack_trace()),
    );
    failure.set_exception_type(parsed.exception_type);
    ErrorEntry::new(parsed.category, parsed.scope_name, failure)
}

fn build_collection(collection: AggregatedCollection) -> Collection {
    let AggregatedCollection {
        type_name,
        tests,
        totals,
    } = collection;

    let mut element = Collection::new(format!("Test collection for {type_name}"));
    element.tests = tests.iter().map(build_test).collect();
    let Totals {
        total,
        passed,
        failed,
        skipped,
        time,
    } = totals;
    element.total = total;
    element.passed = passed;
    element.failed = failed;
    element.skipped = skipped;
    element.time = time;

    element
}

fn build_test(record: &TestOutcomeRecord) -> Test {
    let mut test = Test::new(
        record.display_name.as_str(),
        record.type_name.as_str(),
        record.method_name.as_str(),
        result_kind(record.outcome),
    );
    test.set_time(record.duration);

    if let Some(output) = record.standard_output() {
        test.set_output(output);
    }
    if let Some(reason) = record.skip_reason() {
        test.set_reason(reason);
    }
    if let Some(file) = record.source_file() {
        test.set_source(file, record.line_number.unwrap_or_default());
    }
    if record.outcome == TestOutcome::Failed {
        test.set_failure(Failure::new(
            XmlText::from_optional(record.error_message.as_deref()),
            XmlText::from_optional(record.error_stack_trace.as_deref()),
        ));
    }
    if let Some(traits) = &record.traits {
        test.set_traits(traits.iter().map(|t| (t.name.as_str(), t.value.as_str())));
    }

    test
}

fn result_kind(outcome: TestOutcome) -> TestResultKind {
    match outcome {
        TestOutcome::Passed => TestResultKind::Pass,
        TestOutcome::Failed => TestResultKind::Fail,
        TestOutcome::Skipped => TestResultKind::Skip,
        TestOutcome::NotExecuted | TestOutcome::Other => TestResultKind::Unknown,
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn humantime_elapsed(start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> String {
    let elapsed = (end - start).to_std().unwrap_or_default();
    humantime::format_duration(elapsed).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        aggregator::aggregate,
        record::{TestMessage, TestResultEvent, TestTrait},
    };
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use test_case::test_case;

    struct FixedProbe(&'static str);

    impl ConfigFileProbe for FixedProbe {
        fn config_file(&self, assembly_path: &str) -> Option<String> {
            (assembly_path == self.0).then(|| format!("{assembly_path}.config"))
        }
    }

    fn metadata() -> RunMetadata {
        RunMetadata::new(
            FixedOffset::east_opt(0)
                .unwrap()
                .with_ymd_and_hms(2024, 3, 7, 9, 5, 1)
                .unwrap(),
        )
    }

    fn record(name: &str, outcome: TestOutcome) -> TestOutcomeRecord {
        TestOutcomeRecord::from_event(TestResultEvent::new("/build/Tests.dll", name, outcome))
            .unwrap()
    }

    #[test_case(TestOutcome::Passed, TestResultKind::Pass ; "passed")]
    #[test_case(TestOutcome::Failed, TestResultKind::Fail ; "failed")]
    #[test_case(TestOutcome::Skipped, TestResultKind::Skip ; "skipped")]
    #[test_case(TestOutcome::NotExecuted, TestResultKind::Unknown ; "not executed")]
    #[test_case(TestOutcome::Other, TestResultKind::Unknown ; "other")]
    fn result_kinds(outcome: TestOutcome, expected: TestResultKind) {
        assert_eq!(result_kind(outcome), expected);
    }

    #[test]
    fn test_element() {
        let mut record = record("Ns.Class.Method", TestOutcome::Failed);
        record.display_name = "Method(x: 1)".to_owned();
        record.duration = Duration::from_millis(42);
        record.error_message = Some("bad \u{1}".to_owned());
        record.messages = vec![
            TestMessage::new("StdOutMsgs", "out"),
            TestMessage::new("skipReason", "<raw>"),
        ];
        record.traits = Some(vec![TestTrait::new("Category", "Slow")]);
        record.code_file_path = Some("Class.cs".to_owned());

        let test = build_test(&record);
        assert_eq!(test.name, "Method(x: 1)");
        assert_eq!(test.ty, "Ns.Class");
        assert_eq!(test.method, "Method");
        assert_eq!(test.time, Duration::from_millis(42));
        assert_eq!(test.result, TestResultKind::Fail);
        assert_eq!(test.output.as_ref().map(XmlText::as_str), Some("out\n"));
        assert_eq!(test.reason.as_deref(), Some("<raw>"));
        let source = test.source.expect("source location");
        assert_eq!((source.file.as_str(), source.line), ("Class.cs", 0));
        let failure = test.failure.expect("failure");
        assert_eq!(failure.message.as_str(), "bad \\u0001");
        assert_eq!(failure.stack_trace.as_str(), "");
        assert_eq!(failure.exception_type, None);
        assert_eq!(test.traits.map(|t| t.len()), Some(1));
    }

    #[test]
    fn passed_test_has_no_children() {
        let test = build_test(&record("Ns.Class.Method", TestOutcome::Passed));
        assert!(test.output.is_none());
        assert!(test.reason.is_none());
        assert!(test.source.is_none());
        assert!(test.failure.is_none());
        assert!(test.traits.is_none());
    }

    #[test]
    fn assembly_attributes() {
        let mut metadata = metadata();
        metadata
            .set_environment("ci")
            .set_framework_version("2.4.1");

        let document = build_document_with_probe(
            aggregate(vec![
                record("Ns.Class.Method", TestOutcome::Passed),
                TestOutcomeRecord::from_event(TestResultEvent::new(
                    "/build/Other.dll",
                    "Ns.Class.Method",
                    TestOutcome::Passed,
                ))
                .unwrap(),
            ]),
            &metadata,
            &FixedProbe("/build/Tests.dll"),
        );

        let [other, tests] = document.assemblies.as_slice() else {
            panic!("expected two assemblies");
        };
        assert_eq!(other.name, "/build/Other.dll");
        assert_eq!(other.config_file, None);
        assert_eq!(tests.environment.as_deref(), Some("ci"));
        assert_eq!(tests.test_framework.as_deref(), Some("xUnit.net 2.4.1"));
        assert_eq!(tests.config_file.as_deref(), Some("/build/Tests.dll.config"));
        assert_eq!(tests.collections[0].name, "Test collection for Ns.Class");
    }

    #[test]
    fn counts_come_from_aggregated_totals() {
        let mut skipped = record("Ns.Class.Skip", TestOutcome::Skipped);
        skipped.duration = Duration::from_millis(3);
        let mut not_executed = record("Ns.Other.Later", TestOutcome::NotExecuted);
        not_executed.duration = Duration::from_millis(7);
        let assemblies = aggregate(vec![
            record("Ns.Class.Pass", TestOutcome::Passed),
            skipped,
            not_executed,
        ]);
        let expected = assemblies[0].totals;
        let expected_collections: Vec<_> =
            assemblies[0].collections.iter().map(|c| c.totals).collect();

        let document = build_document_with_probe(assemblies, &metadata(), &FixedProbe(""));

        let assembly = &document.assemblies[0];
        assert_eq!(
            (assembly.total, assembly.passed, assembly.failed, assembly.skipped, assembly.time),
            (expected.total, expected.passed, expected.failed, expected.skipped, expected.time),
        );
        assert_eq!(
            (assembly.total, assembly.skipped, assembly.time),
            (2, 1, Duration::from_millis(10))
        );
        for (collection, totals) in assembly.collections.iter().zip(&expected_collections) {
            assert_eq!(
                (collection.total, collection.passed, collection.skipped, collection.time),
                (totals.total, totals.passed, totals.skipped, totals.time),
                "collection {}",
                collection.name,
            );
        }
    }

    #[test]
    fn blank_labels_are_omitted() {
        let mut metadata = metadata();
        metadata.set_environment(" ").set_framework_version("");

        let document = build_document_with_probe(
            aggregate(vec![record("Ns.Class.Method", TestOutcome::Passed)]),
            &metadata,
            &FixedProbe(""),
        );

        assert_eq!(document.assemblies[0].environment, None);
        assert_eq!(document.assemblies[0].test_framework, None);
    }

    #[test]
    fn error_entry() {
        let mut record = record("Ns.Class.Method", TestOutcome::Failed);
        record.error_message = Some(
            "(Test Class Cleanup Failure) (MyNamespace.MyClass) : System.Exception: boom".to_owned(),
        );
        record.error_stack_trace = Some("at MyClass.Dispose()".to_owned());

        let error = FrameworkError::classify(record).expect("framework error");
        let entry = build_error(&error);
        assert_eq!(entry.ty, "test-class-cleanup");
        assert_eq!(entry.name, "MyNamespace.MyClass");
        assert_eq!(entry.failure.exception_type.as_deref(), Some("System.Exception"));
        assert_eq!(entry.failure.message.as_str(), "boom");
        assert_eq!(entry.failure.stack_trace.as_str(), "at MyClass.Dispose()");
    }

    #[test]
    fn fs_probe_finds_config_file() {
        let dir = camino_tempfile::tempdir().unwrap();
        let assembly = dir.path().join("Tests.dll");
        let config = dir.path().join("Tests.dll.config");
        std::fs::write(&config, "<configuration/>").unwrap();

        assert_eq!(
            FsConfigFileProbe.config_file(assembly.as_str()),
            Some(config.to_string())
        );
        assert_eq!(
            FsConfigFileProbe.config_file(dir.path().join("Missing.dll").as_str()),
            None
        );
    }
}
