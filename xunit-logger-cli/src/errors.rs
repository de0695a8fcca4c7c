// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::output::{NO_HEADING_TARGET, StderrStyles};
use camino::Utf8PathBuf;
use owo_colors::OwoColorize;
use std::error::Error;
use thiserror::Error;
use tracing::error;
use xunit_logger::errors::{ConfigError, WriteReportError};

/// Documented exit codes for `xunit-logger` failures.
///
/// Unknown or unexpected failures always result in exit code 1.
pub enum XunitLoggerExitCode {}

impl XunitLoggerExitCode {
    /// The report was written.
    pub const OK: i32 = 0;

    /// The logger parameters were invalid, or no destination was given.
    pub const CONFIG_ERROR: i32 = 96;

    /// The test results could not be read or parsed.
    pub const INVALID_INPUT: i32 = 97;

    /// The report could not be written.
    pub const WRITE_OUTPUT_ERROR: i32 = 110;
}

/// An error that occurred while reading test results.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReadEventsError {
    /// Reading from the input failed.
    #[error("error reading test results from {input}")]
    Read {
        /// The input being read.
        input: String,

        /// The underlying IO error.
        #[source]
        error: std::io::Error,
    },

    /// A line of input was not a valid test result.
    #[error("invalid test result at {input}:{line}")]
    Parse {
        /// The input being read.
        input: String,

        /// The 1-based line number.
        line: usize,

        /// The underlying JSON error.
        #[source]
        error: serde_json::Error,
    },
}

// The #[error()] strings are placeholders: display_to_stderr is the intended way to print these.

/// An expected failure of the `xunit-logger` binary.
#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("invalid logger configuration")]
    Config {
        #[from]
        err: ConfigError,
    },
    #[error("failed to open input file")]
    InputOpen {
        path: Utf8PathBuf,
        #[source]
        err: std::io::Error,
    },
    #[error("failed to read test results")]
    ReadEvents {
        #[from]
        err: ReadEventsError,
    },
    #[error("failed to write report")]
    WriteReport {
        #[from]
        err: WriteReportError,
    },
}

impl ExpectedError {
    pub(crate) fn input_open(path: Utf8PathBuf, err: std::io::Error) -> Self {
        Self::InputOpen { path, err }
    }

    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } => XunitLoggerExitCode::CONFIG_ERROR,
            Self::InputOpen { .. } | Self::ReadEvents { .. } => XunitLoggerExitCode::INVALID_INPUT,
            Self::WriteReport { .. } => XunitLoggerExitCode::WRITE_OUTPUT_ERROR,
        }
    }

    /// Displays this error to stderr.
    pub fn display_to_stderr(&self, styles: &StderrStyles) {
        let mut next_error = match self {
            Self::Config { err } => {
                error!("{err}");
                err.source()
            }
            Self::InputOpen { path, err } => {
                error!("failed to open input file `{}`", path.style(styles.bold));
                Some(err as &dyn Error)
            }
            Self::ReadEvents { err } => {
                error!("{err}");
                err.source()
            }
            Self::WriteReport { err } => {
                error!("failed to write xUnit report");
                Some(err as &dyn Error)
            }
        };

        while let Some(err) = next_error {
            error!(target: NO_HEADING_TARGET, "\nCaused by:\n  {}", err);
            next_error = err.source();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let config = ExpectedError::from(ConfigError::MissingDestination);
        let input = ExpectedError::input_open(
            "missing.ndjson".into(),
            std::io::Error::from(std::io::ErrorKind::NotFound),
        );
        let write = ExpectedError::from(WriteReportError::Fs {
            file: "/out.xml".into(),
            error: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        });

        let codes = [
            config.process_exit_code(),
            input.process_exit_code(),
            write.process_exit_code(),
        ];
        assert_eq!(
            codes,
            [
                XunitLoggerExitCode::CONFIG_ERROR,
                XunitLoggerExitCode::INVALID_INPUT,
                XunitLoggerExitCode::WRITE_OUTPUT_ERROR,
            ]
        );
        assert!(codes.iter().all(|&code| code != XunitLoggerExitCode::OK));
    }
}
