// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telling test failures apart from framework errors.
//!
//! xUnit.net reports failures in its own lifecycle code (for example a class fixture that
//! throws while being disposed) as failed results against a test. Their error messages
//! look like:
//!
//! ```text
//! (Test Class Cleanup Failure) (MyNamespace.MyClass) : System.Exception: boom
//! ```
//!
//! Such results are written to the assembly's `errors` section rather than counted as
//! failed tests.

use crate::record::{TestOutcome, TestOutcomeRecord};
use std::fmt;

/// The kind of lifecycle step that raised a framework error.
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum FrameworkErrorKind {
    /// Cleaning up the test assembly.
    AssemblyCleanup,
    /// Cleaning up a test collection.
    CollectionCleanup,
    /// Cleaning up a test class.
    ClassCleanup,
    /// Cleaning up a test case.
    TestCaseCleanup,
    /// Cleaning up a test.
    TestCleanup,
    /// Cleaning up a test method.
    MethodCleanup,
}

impl FrameworkErrorKind {
    /// All kinds, in the order their phrases are searched for.
    pub const ALL: [Self; 6] = [
        Self::AssemblyCleanup,
        Self::CollectionCleanup,
        Self::ClassCleanup,
        Self::TestCaseCleanup,
        Self::TestCleanup,
        Self::MethodCleanup,
    ];

    /// Returns the phrase that identifies this kind in an error message.
    pub fn phrase(self) -> &'static str {
        match self {
            Self::AssemblyCleanup => "Test Assembly Cleanup Failure",
            Self::CollectionCleanup => "Test Collection Cleanup Failure",
            Self::ClassCleanup => "Test Class Cleanup Failure",
            Self::TestCaseCleanup => "Test Case Cleanup Failure",
            Self::TestCleanup => "Test Cleanup Failure",
            Self::MethodCleanup => "Test Method Cleanup Failure",
        }
    }

    /// Returns the value written to the `type` attribute of an `error` element.
    pub fn tag(self) -> &'static str {
        match self {
            Self::AssemblyCleanup => "assembly-cleanup",
            Self::CollectionCleanup => "test-collection-cleanup",
            Self::ClassCleanup => "test-class-cleanup",
            Self::TestCaseCleanup => "test-case-cleanup",
            Self::TestCleanup => "test-cleanup",
            Self::MethodCleanup => "test-method-cleanup",
        }
    }

    /// Looks up a kind by its exact phrase.
    pub fn from_phrase(phrase: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.phrase() == phrase)
    }
}

impl fmt::Display for FrameworkErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.phrase())
    }
}

/// Returns the framework error kind for a record, or `None` if it is an ordinary result.
///
/// Only failed records with a non-blank error message are considered. The message is
/// searched for each phrase in [`FrameworkErrorKind::ALL`] order, anywhere in the message,
/// and the first phrase found wins.
pub fn framework_error_kind(record: &TestOutcomeRecord) -> Option<FrameworkErrorKind> {
    if record.outcome != TestOutcome::Failed {
        return None;
    }
    let message = record.error_message.as_deref()?;
    if message.trim().is_empty() {
        return None;
    }
    FrameworkErrorKind::ALL
        .into_iter()
        .find(|kind| message.contains(kind.phrase()))
}

/// Returns true if the record is a framework error rather than a test failure.
pub fn is_framework_error(record: &TestOutcomeRecord) -> bool {
    framework_error_kind(record).is_some()
}

/// A record that has been classified as a framework error.
///
/// The only way to obtain one is [`FrameworkError::classify`], so the error message is
/// known to contain one of the framework error phrases.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FrameworkError {
    kind: FrameworkErrorKind,
    record: TestOutcomeRecord,
}

impl FrameworkError {
    /// Classifies a record, handing it back unchanged if it is an ordinary result.
    pub fn classify(record: TestOutcomeRecord) -> Result<Self, TestOutcomeRecord> {
        match framework_error_kind(&record) {
            Some(kind) => Ok(Self { kind, record }),
            None => Err(record),
        }
    }

    /// Returns the kind matched while classifying.
    pub fn kind(&self) -> FrameworkErrorKind {
        self.kind
    }

    /// Returns the underlying record.
    pub fn record(&self) -> &TestOutcomeRecord {
        &self.record
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        self.record.error_message.as_deref().unwrap_or_default()
    }

    /// Returns the error stack trace.
    pub fn stack_trace(&self) -> Option<&str> {
        self.record.error_stack_trace.as_deref()
    }

    /// Splits the error message into its parts.
    pub fn parse(&self) -> ParsedErrorMessage<'_> {
        parse_error_message(self.message())
    }

    /// Returns the key used to de-duplicate errors: the message and the stack trace.
    pub(crate) fn dedup_key(&self) -> (Option<&str>, Option<&str>) {
        (
            self.record.error_message.as_deref(),
            self.record.error_stack_trace.as_deref(),
        )
    }
}

/// The parts of a framework error message.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ParsedErrorMessage<'a> {
    /// The tag for the category phrase, or empty if the phrase isn't recognized.
    pub category: &'static str,

    /// The name of the assembly, collection, class or method the error was raised for.
    pub scope_name: &'a str,

    /// The exception type, such as `System.Exception`.
    pub exception_type: &'a str,

    /// The rest of the message.
    pub message: &'a str,
}

/// Parses `(<phrase>) (<scope>) : <exception type>: <message>`.
///
/// Input that doesn't have this shape produces empty or partial fields.
pub(crate) fn parse_error_message(message: &str) -> ParsedErrorMessage<'_> {
    let (phrase, rest) = parenthesized(message);
    let (scope_name, rest) = parenthesized(rest);

    let rest = rest.strip_prefix(" : ").unwrap_or(rest);
    let (exception_type, message) = match rest.split_once(':') {
        Some((exception_type, message)) => (exception_type, message),
        None => (rest, ""),
    };
    let message = message.strip_prefix(' ').unwrap_or(message);

    ParsedErrorMessage {
        category: FrameworkErrorKind::from_phrase(phrase).map_or("", FrameworkErrorKind::tag),
        scope_name,
        exception_type: exception_type.trim_end(),
        message,
    }
}

// Returns the text between the first `(` and the following `)`, and everything after the
// `)`.
fn parenthesized(text: &str) -> (&str, &str) {
    let Some(start) = text.find('(') else {
        return ("", text);
    };
    let inner = &text[start + 1..];
    match inner.find(')') {
        Some(end) => (&inner[..end], &inner[end + 1..]),
        None => (inner, ""),
    }
}
