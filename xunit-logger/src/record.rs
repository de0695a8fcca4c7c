// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test results as reported by the host, and the records they resolve into.

use crate::{errors::QualifiedNameParseError, name::parse_qualified_name};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The message category hosts use for captured standard output.
///
/// This is compared case-insensitively.
pub const STANDARD_OUTPUT_CATEGORY: &str = "StdOutMsgs";

/// The message category used for skip reasons. This is compared exactly.
pub const SKIP_REASON_CATEGORY: &str = "skipReason";

/// A completed test case, as reported by the host.
#[derive(Clone, Debug, Deserialize, Serialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct TestResultEvent {
    /// The path to the assembly (test binary) containing the test.
    pub source: String,

    /// The fully qualified name of the test, for example `Ns.Class.Method(x: 1)`.
    pub fully_qualified_name: String,

    /// The display name. Defaults to the fully qualified name.
    #[serde(default)]
    pub display_name: Option<String>,

    /// The full name of the type containing the test, if the host knows it.
    #[serde(default)]
    pub type_name: Option<String>,

    /// The name of the test method, if the host knows it.
    #[serde(default)]
    pub method_name: Option<String>,

    /// The outcome of the test.
    pub outcome: TestOutcome,

    /// How long the test took.
    #[serde(default, with = "humantime_serde")]
    pub duration: Duration,

    /// The error message, for failed tests.
    #[serde(default)]
    pub error_message: Option<String>,

    /// The error stack trace, for failed tests.
    #[serde(default)]
    pub error_stack_trace: Option<String>,

    /// Messages produced while running the test.
    #[serde(default)]
    pub messages: Vec<TestMessage>,

    /// Traits attached to the test case.
    #[serde(default)]
    pub traits: Option<Vec<TestTrait>>,

    /// The source file the test is defined in.
    #[serde(default)]
    pub code_file_path: Option<String>,

    /// The line the test is defined at.
    #[serde(default)]
    pub line_number: Option<u32>,
}

impl TestResultEvent {
    /// Creates a new event with no duration, messages or failure details.
    pub fn new(
        source: impl Into<String>,
        fully_qualified_name: impl Into<String>,
        outcome: TestOutcome,
    ) -> Self {
        Self {
            source: source.into(),
            fully_qualified_name: fully_qualified_name.into(),
            display_name: None,
            type_name: None,
            method_name: None,
            outcome,
            duration: Duration::ZERO,
            error_message: None,
            error_stack_trace: None,
            messages: vec![],
            traits: None,
            code_file_path: None,
            line_number: None,
        }
    }
}

/// The outcome of a single test case.
#[derive(Copy, Clone, Debug, Deserialize, Serialize, Eq, PartialEq)]
pub enum TestOutcome {
    /// The test passed.
    Passed,

    /// The test failed, or the framework reported an error against it.
    Failed,

    /// The test was skipped.
    Skipped,

    /// The test was not executed.
    NotExecuted,

    /// Any other outcome reported by the host, such as `None` or `NotFound`.
    #[serde(other)]
    Other,
}

/// A message produced while running a test.
#[derive(Clone, Debug, Deserialize, Serialize, Eq, PartialEq)]
pub struct TestMessage {
    /// The category, for example [`STANDARD_OUTPUT_CATEGORY`].
    pub category: String,

    /// The message text.
    pub text: String,
}

impl TestMessage {
    /// Creates a new message.
    pub fn new(category: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            text: text.into(),
        }
    }

    /// Returns true if this message is captured standard output.
    pub fn is_standard_output(&self) -> bool {
        self.category.eq_ignore_ascii_case(STANDARD_OUTPUT_CATEGORY)
    }

    /// Returns true if this message is a skip reason.
    pub fn is_skip_reason(&self) -> bool {
        self.category == SKIP_REASON_CATEGORY
    }
}

/// A name/value pair attached to a test case.
#[derive(Clone, Debug, Deserialize, Serialize, Eq, PartialEq)]
pub struct TestTrait {
    /// The trait name.
    pub name: String,

    /// The trait value.
    pub value: String,
}

impl TestTrait {
    /// Creates a new trait.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One completed test case, with its type and method names resolved.
///
/// Records are created by [`XunitLogger::record`](crate::logger::XunitLogger::record) and
/// are not modified afterwards.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TestOutcomeRecord {
    /// The path to the assembly containing the test.
    pub assembly_path: String,

    /// The full name of the type containing the test.
    pub type_name: String,

    /// The name of the test method.
    pub method_name: String,

    /// The display name of the test.
    pub display_name: String,

    /// How long the test took.
    pub duration: Duration,

    /// The outcome of the test.
    pub outcome: TestOutcome,

    /// The error message.
    pub error_message: Option<String>,

    /// The error stack trace.
    pub error_stack_trace: Option<String>,

    /// Messages produced while running the test, in the order they were produced.
    pub messages: Vec<TestMessage>,

    /// Traits attached to the test case.
    pub traits: Option<Vec<TestTrait>>,

    /// The source file the test is defined in.
    pub code_file_path: Option<String>,

    /// The line the test is defined at.
    pub line_number: Option<u32>,
}

impl TestOutcomeRecord {
    /// Resolves an event into a record.
    ///
    /// If the event carries both a type name and a method name, they are used as is.
    /// Otherwise they are derived from the fully qualified name, which fails if the name
    /// doesn't have the expected shape.
    pub fn from_event(event: TestResultEvent) -> Result<Self, QualifiedNameParseError> {
        let (type_name, method_name) = match (event.type_name, event.method_name) {
            (Some(type_name), Some(method_name)) => (type_name, method_name),
            _ => {
                let name = parse_qualified_name(&event.fully_qualified_name)?;
                (name.type_name.to_owned(), name.method_name.to_owned())
            }
        };

        let display_name = event
            .display_name
            .unwrap_or_else(|| event.fully_qualified_name.clone());

        Ok(Self {
            assembly_path: event.source,
            type_name,
            method_name,
            display_name,
            duration: event.duration,
            outcome: event.outcome,
            error_message: event.error_message,
            error_stack_trace: event.error_stack_trace,
            messages: event.messages,
            traits: event.traits,
            code_file_path: event.code_file_path,
            line_number: event.line_number,
        })
    }

    /// Returns all standard output messages, each followed by a line break.
    ///
    /// Returns `None` if the result would be blank.
    pub fn standard_output(&self) -> Option<String> {
        let mut output = String::new();
        for message in self.messages.iter().filter(|m| m.is_standard_output()) {
            output.push_str(&message.text);
            output.push('\n');
        }
        (!output.trim().is_empty()).then_some(output)
    }

    /// Returns the first skip reason, if any.
    pub fn skip_reason(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.is_skip_reason())
            .map(|m| m.text.as_str())
    }

    /// Returns the source file, if it is known and not blank.
    pub fn source_file(&self) -> Option<&str> {
        self.code_file_path
            .as_deref()
            .filter(|path| !path.trim().is_empty())
    }
}
