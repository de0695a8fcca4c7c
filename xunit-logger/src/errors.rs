// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by the xUnit logger.

use camino::{FromPathBufError, Utf8PathBuf};
use std::fmt;
use thiserror::Error;
use xunit_xml::SerializeError;

/// An error in the logger parameters.
///
/// These are reported before any results are aggregated.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// Neither an output file nor an output directory was specified.
    #[error("expected `LogFilePath` or `TestRunDirectory` logger parameter")]
    MissingDestination,

    /// The logger specification names a different logger.
    #[error("unknown logger `{name}` (expected `xunit`)")]
    UnknownLogger {
        /// The logger name that was specified.
        name: String,
    },

    /// A logger parameter is not of the form `key=value`.
    #[error("invalid logger parameter `{parameter}` (expected `key=value`)")]
    InvalidParameter {
        /// The parameter as specified.
        parameter: String,
    },

    /// The output path could not be made absolute.
    #[error("failed to resolve output path `{path}`")]
    ResolvePath {
        /// The path as specified.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: std::io::Error,
    },

    /// The absolute output path is not valid UTF-8.
    #[error("output path is not valid UTF-8")]
    NonUtf8Path {
        /// The underlying error.
        #[source]
        error: FromPathBufError,
    },
}

/// An error that occurred while splitting a fully qualified test name into its parts.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("cannot split `{name}` into type and method names: {kind}")]
pub struct QualifiedNameParseError {
    name: String,
    kind: QualifiedNameParseErrorKind,
}

impl QualifiedNameParseError {
    pub(crate) fn new(name: impl Into<String>, kind: QualifiedNameParseErrorKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Returns the name that failed to parse.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the reason the name failed to parse.
    pub fn kind(&self) -> QualifiedNameParseErrorKind {
        self.kind
    }
}

/// The reason a fully qualified test name could not be split.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum QualifiedNameParseErrorKind {
    /// The argument list does not end with `)`.
    UnterminatedArguments,

    /// There is no `.` between the type name and the method name.
    MissingTypeName,

    /// The method name is empty.
    EmptyMethodName,
}

impl fmt::Display for QualifiedNameParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedArguments => write!(f, "argument list does not end with `)`"),
            Self::MissingTypeName => write!(f, "no type name before the method name"),
            Self::EmptyMethodName => write!(f, "method name is empty"),
        }
    }
}

/// An error that occurred while writing the report.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WriteReportError {
    /// An error occurred while operating on the file system.
    #[error("error operating on path {file}")]
    Fs {
        /// The file being operated on.
        file: Utf8PathBuf,

        /// The underlying IO error.
        #[source]
        error: std::io::Error,
    },

    /// An error occurred while producing the XML document.
    #[error("error writing xUnit report to {file}")]
    Serialize {
        /// The output file.
        file: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: SerializeError,
    },
}
