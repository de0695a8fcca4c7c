// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{serialize::serialize_assemblies, SerializeError, XmlText};
use chrono::{DateTime, FixedOffset};
use std::{io, time::Duration};

/// The root element of an xUnit v2 report.
#[derive(Clone, Debug)]
pub struct Assemblies {
    /// The time at which the run started.
    ///
    /// This is serialized in the fixed `MM/dd/yyyy HH:mm:ss` form.
    pub timestamp: DateTime<FixedOffset>,

    /// The assemblies contained in this report.
    pub assemblies: Vec<Assembly>,
}

impl Assemblies {
    /// Creates a new, empty `Assemblies` element.
    pub fn new(timestamp: impl Into<DateTime<FixedOffset>>) -> Self {
        Self {
            timestamp: timestamp.into(),
            assemblies: vec![],
        }
    }

    /// Adds an assembly.
    pub fn add_assembly(&mut self, assembly: Assembly) -> &mut Self {
        self.assemblies.push(assembly);
        self
    }

    /// Adds several assemblies.
    pub fn add_assemblies(&mut self, assemblies: impl IntoIterator<Item = Assembly>) -> &mut Self {
        for assembly in assemblies {
            self.add_assembly(assembly);
        }
        self
    }

    /// Serialize this report to the given writer.
    pub fn serialize(&self, writer: impl io::Write) -> Result<(), SerializeError> {
        serialize_assemblies(self, writer).map_err(SerializeError::from)
    }

    /// Serialize this report to a string.
    pub fn to_string(&self) -> Result<String, SerializeError> {
        let mut buf: Vec<u8> = vec![];
        self.serialize(&mut buf)?;
        String::from_utf8(buf).map_err(|utf8_err| {
            SerializeError::from(quick_xml::Error::NonDecodable(Some(utf8_err.utf8_error())))
        })
    }
}

/// A single test assembly: the results of one test binary.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct Assembly {
    /// The path to the assembly.
    pub name: String,

    /// A free-form description of the environment the tests ran in.
    pub environment: Option<String>,

    /// The test framework, for example `xUnit.net 2.4.1`.
    pub test_framework: Option<String>,

    /// The time at which the run started. Serialized as the `run-date` and `run-time`
    /// attributes.
    pub run_timestamp: DateTime<FixedOffset>,

    /// The path to the assembly's `.config` file, if there is one.
    pub config_file: Option<String>,

    /// The number of tests that passed, failed or were skipped.
    pub total: usize,

    /// The number of tests that passed.
    pub passed: usize,

    /// The number of tests that failed.
    pub failed: usize,

    /// The number of tests that were skipped.
    pub skipped: usize,

    /// The time taken by all tests in this assembly.
    pub time: Duration,

    /// Errors raised by the test framework rather than by individual tests.
    pub errors: Vec<ErrorEntry>,

    /// One collection per test class.
    pub collections: Vec<Collection>,
}

impl Assembly {
    /// Creates a new `Assembly`.
    pub fn new(name: impl Into<String>, run_timestamp: impl Into<DateTime<FixedOffset>>) -> Self {
        Self {
            name: name.into(),
            environment: None,
            test_framework: None,
            run_timestamp: run_timestamp.into(),
            config_file: None,
            total: 0,
            passed: 0,
            failed: 0,
            skipped: 0,
            time: Duration::ZERO,
            errors: vec![],
            collections: vec![],
        }
    }

    /// Sets the environment description.
    pub fn set_environment(&mut self, environment: impl Into<String>) -> &mut Self {
        self.environment = Some(environment.into());
        self
    }

    /// Sets the test framework name.
    pub fn set_test_framework(&mut self, test_framework: impl Into<String>) -> &mut Self {
        self.test_framework = Some(test_framework.into());
        self
    }

    /// Sets the config file path.
    pub fn set_config_file(&mut self, config_file: impl Into<String>) -> &mut Self {
        self.config_file = Some(config_file.into());
        self
    }

    /// Adds a framework error.
    pub fn add_error(&mut self, error: ErrorEntry) -> &mut Self {
        self.errors.push(error);
        self
    }

    /// Adds a collection and updates the counts and time.
    ///
    /// When generating a new report, use of this method is recommended over adding to
    /// `self.collections` directly.
    pub fn add_collection(&mut self, collection: Collection) -> &mut Self {
        self.total += collection.total;
        self.passed += collection.passed;
        self.failed += collection.failed;
        self.skipped += collection.skipped;
        self.time += collection.time;
        self.collections.push(collection);
        self
    }

    /// Adds several collections and updates the counts and time.
    pub fn add_collections(
        &mut self,
        collections: impl IntoIterator<Item = Collection>,
    ) -> &mut Self {
        for collection in collections {
            self.add_collection(collection);
        }
        self
    }
}

/// The tests belonging to a single test class.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct Collection {
    /// The name of this collection.
    pub name: String,

    /// The number of tests that passed, failed or were skipped.
    pub total: usize,

    /// The number of tests that passed.
    pub passed: usize,

    /// The number of tests that failed.
    pub failed: usize,

    /// The number of tests that were skipped.
    pub skipped: usize,

    /// The time taken by all tests in this collection.
    pub time: Duration,

    /// The tests in this collection.
    pub tests: Vec<Test>,
}

impl Collection {
    /// Creates a new `Collection`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            total: 0,
            passed: 0,
            failed: 0,
            skipped: 0,
            time: Duration::ZERO,
            tests: vec![],
        }
    }

    /// Adds a test to this collection and updates the counts.
    ///
    /// Tests with an [`Unknown`](TestResultKind::Unknown) result are listed and their time is
    /// counted, but they do not contribute to `total`.
    pub fn add_test(&mut self, test: Test) -> &mut Self {
        match test.result {
            TestResultKind::Pass => self.passed += 1,
            TestResultKind::Fail => self.failed += 1,
            TestResultKind::Skip => self.skipped += 1,
            TestResultKind::Unknown => {}
        }
        if test.result != TestResultKind::Unknown {
            self.total += 1;
        }
        self.time += test.time;
        self.tests.push(test);
        self
    }

    /// Adds several tests and updates the counts.
    pub fn add_tests(&mut self, tests: impl IntoIterator<Item = Test>) -> &mut Self {
        for test in tests {
            self.add_test(test);
        }
        self
    }
}

/// A single test result.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct Test {
    /// The display name of the test.
    pub name: String,

    /// The full name of the type containing the test.
    pub ty: String,

    /// The name of the test method.
    pub method: String,

    /// The time taken by the test.
    pub time: Duration,

    /// The result of the test.
    pub result: TestResultKind,

    /// Standard output captured while the test ran.
    pub output: Option<XmlText>,

    /// The reason the test was skipped.
    ///
    /// This is written verbatim as a CDATA section.
    pub reason: Option<String>,

    /// Where the test is defined.
    pub source: Option<SourceLocation>,

    /// Failure details, for failed tests.
    pub failure: Option<Failure>,

    /// Traits attached to the test. `Some` with an empty list still produces a `traits`
    /// element.
    pub traits: Option<Vec<Trait>>,
}

impl Test {
    /// Creates a new test.
    pub fn new(
        name: impl Into<String>,
        ty: impl Into<String>,
        method: impl Into<String>,
        result: TestResultKind,
    ) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            method: method.into(),
            time: Duration::ZERO,
            result,
            output: None,
            reason: None,
            source: None,
            failure: None,
            traits: None,
        }
    }

    /// Sets the time taken by the test.
    pub fn set_time(&mut self, time: Duration) -> &mut Self {
        self.time = time;
        self
    }

    /// Sets standard output.
    pub fn set_output(&mut self, output: impl Into<XmlText>) -> &mut Self {
        self.output = Some(output.into());
        self
    }

    /// Sets the skip reason.
    pub fn set_reason(&mut self, reason: impl Into<String>) -> &mut Self {
        self.reason = Some(reason.into());
        self
    }

    /// Sets the source location.
    pub fn set_source(&mut self, file: impl Into<String>, line: u32) -> &mut Self {
        self.source = Some(SourceLocation {
            file: file.into(),
            line,
        });
        self
    }

    /// Sets failure details.
    pub fn set_failure(&mut self, failure: Failure) -> &mut Self {
        self.failure = Some(failure);
        self
    }

    /// Sets the traits.
    pub fn set_traits(&mut self, traits: impl IntoIterator<Item = impl Into<Trait>>) -> &mut Self {
        self.traits = Some(traits.into_iter().map(Into::into).collect());
        self
    }
}

/// The result of a test, as written to the `result` attribute.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TestResultKind {
    /// Serialized as `Pass`.
    Pass,
    /// Serialized as `Fail`.
    Fail,
    /// Serialized as `Skip`.
    Skip,
    /// Serialized as `Unknown`.
    Unknown,
}

impl TestResultKind {
    /// Returns the string written to the `result` attribute.
    pub fn as_str(self) -> &'static str {
        match self {
            TestResultKind::Pass => "Pass",
            TestResultKind::Fail => "Fail",
            TestResultKind::Skip => "Skip",
            TestResultKind::Unknown => "Unknown",
        }
    }
}

/// The source file and line a test is defined at.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SourceLocation {
    /// The path to the source file.
    pub file: String,

    /// The line number.
    pub line: u32,
}

/// Failure details for a failed test or a framework error.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Failure {
    /// The exception type. Only written for framework errors.
    pub exception_type: Option<String>,

    /// The failure message.
    pub message: XmlText,

    /// The stack trace.
    pub stack_trace: XmlText,
}

impl Failure {
    /// Creates a new `Failure`.
    pub fn new(message: impl Into<XmlText>, stack_trace: impl Into<XmlText>) -> Self {
        Self {
            exception_type: None,
            message: message.into(),
            stack_trace: stack_trace.into(),
        }
    }

    /// Sets the exception type.
    pub fn set_exception_type(&mut self, exception_type: impl Into<String>) -> &mut Self {
        self.exception_type = Some(exception_type.into());
        self
    }
}

/// An error raised by the test framework, for example while cleaning up a test class.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ErrorEntry {
    /// The kind of error, for example `test-class-cleanup`.
    pub ty: String,

    /// The name of the assembly, collection, class or method that raised the error.
    pub name: String,

    /// Failure details.
    pub failure: Failure,
}

impl ErrorEntry {
    /// Creates a new `ErrorEntry`.
    pub fn new(ty: impl Into<String>, name: impl Into<String>, failure: Failure) -> Self {
        Self {
            ty: ty.into(),
            name: name.into(),
            failure,
        }
    }
}

/// A name/value pair attached to a test.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Trait {
    /// The name of the trait.
    pub name: String,

    /// The value of the trait.
    pub value: String,
}

impl Trait {
    /// Creates a new `Trait`.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl<T> From<(T, T)> for Trait
where
    T: Into<String>,
{
    fn from((k, v): (T, T)) -> Self {
        Trait::new(k, v)
    }
}
