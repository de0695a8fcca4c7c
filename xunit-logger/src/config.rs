// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Logger parameters.
//!
//! Hosts pass parameters to loggers as `key=value` pairs, usually written on the command line
//! as `xunit;LogFilePath=results.xml;Environment=ci`.

use crate::errors::ConfigError;
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;

/// The name hosts use to select this logger.
pub const FRIENDLY_NAME: &str = "xunit";

/// The URI hosts use to select this logger.
pub const EXTENSION_URI: &str = "logger://Microsoft/TestPlatform/XUnitXmlLogger/v1";

/// The parameter naming the output file.
pub const LOG_FILE_PATH_KEY: &str = "LogFilePath";

/// The parameter naming the output directory.
pub const TEST_RUN_DIRECTORY_KEY: &str = "TestRunDirectory";

/// The parameter holding a description of the environment.
pub const ENVIRONMENT_KEY: &str = "Environment";

/// The parameter holding the xUnit.net version.
pub const XUNIT_VERSION_KEY: &str = "XUnitVersion";

/// The file name used when only an output directory is specified.
pub const DEFAULT_FILE_NAME: &str = "TestResults.xml";

/// Logger parameters, in the order they were specified.
pub type LoggerParameters = IndexMap<String, String>;

/// Resolved logger configuration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LoggerConfig {
    path: Utf8PathBuf,
    environment: Option<String>,
    xunit_version: Option<String>,
}

impl LoggerConfig {
    /// Resolves configuration from logger parameters.
    ///
    /// `LogFilePath` takes precedence over `TestRunDirectory`. Relative paths are resolved
    /// against the current directory.
    pub fn from_parameters(parameters: &LoggerParameters) -> Result<Self, ConfigError> {
        let path = if let Some(path) = parameters.get(LOG_FILE_PATH_KEY) {
            Utf8PathBuf::from(path)
        } else if let Some(dir) = parameters.get(TEST_RUN_DIRECTORY_KEY) {
            Utf8Path::new(dir).join(DEFAULT_FILE_NAME)
        } else {
            return Err(ConfigError::MissingDestination);
        };

        Ok(Self {
            path: absolute(path)?,
            environment: non_blank(parameters.get(ENVIRONMENT_KEY)),
            xunit_version: non_blank(parameters.get(XUNIT_VERSION_KEY)),
        })
    }

    /// Returns the absolute path the report is written to.
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Returns the environment description, if one was given.
    pub fn environment(&self) -> Option<&str> {
        self.environment.as_deref()
    }

    /// Returns the xUnit.net version, if one was given.
    pub fn xunit_version(&self) -> Option<&str> {
        self.xunit_version.as_deref()
    }
}

/// Parses a logger specification of the form `xunit;key=value;key=value`.
///
/// The logger may be named by [`FRIENDLY_NAME`] (in any case) or [`EXTENSION_URI`]. Empty
/// segments are ignored and later keys override earlier ones.
pub fn parse_logger_spec(spec: &str) -> Result<LoggerParameters, ConfigError> {
    let mut segments = spec.split(';');
    // split always yields at least one segment.
    let name = segments.next().unwrap_or_default().trim();
    if !name.eq_ignore_ascii_case(FRIENDLY_NAME) && name != EXTENSION_URI {
        return Err(ConfigError::UnknownLogger {
            name: name.to_owned(),
        });
    }

    let mut parameters = LoggerParameters::new();
    for segment in segments {
        if segment.trim().is_empty() {
            continue;
        }
        let Some((key, value)) = segment.split_once('=') else {
            return Err(ConfigError::InvalidParameter {
                parameter: segment.to_owned(),
            });
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(ConfigError::InvalidParameter {
                parameter: segment.to_owned(),
            });
        }
        parameters.insert(key.to_owned(), value.to_owned());
    }
    Ok(parameters)
}

fn absolute(path: Utf8PathBuf) -> Result<Utf8PathBuf, ConfigError> {
    if path.is_absolute() {
        return Ok(path);
    }
    let absolute = std::path::absolute(&path).map_err(|error| ConfigError::ResolvePath {
        path: path.clone(),
        error,
    })?;
    Utf8PathBuf::try_from(absolute).map_err(|error| ConfigError::NonUtf8Path { error })
}

fn non_blank(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn parameters(pairs: &[(&str, &str)]) -> LoggerParameters {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn log_file_path_wins() {
        let config = LoggerConfig::from_parameters(&parameters(&[
            ("TestRunDirectory", "/runs"),
            ("LogFilePath", "/out/results.xml"),
        ]))
        .unwrap();
        assert_eq!(config.path().as_str(), "/out/results.xml");
    }

    #[test]
    fn test_run_directory_uses_default_name() {
        let config =
            LoggerConfig::from_parameters(&parameters(&[("TestRunDirectory", "/runs")])).unwrap();
        assert_eq!(config.path().as_str(), "/runs/TestResults.xml");
    }

    #[test]
    fn relative_path_is_made_absolute() {
        let config =
            LoggerConfig::from_parameters(&parameters(&[("LogFilePath", "out/results.xml")]))
                .unwrap();
        assert!(config.path().is_absolute(), "{} is absolute", config.path());
        assert!(config.path().ends_with("out/results.xml"));
    }

    #[test]
    fn missing_destination() {
        let error =
            LoggerConfig::from_parameters(&parameters(&[("Environment", "ci")])).unwrap_err();
        assert!(matches!(error, ConfigError::MissingDestination), "{error:?}");
    }

    #[test]
    fn labels() {
        let config = LoggerConfig::from_parameters(&parameters(&[
            ("LogFilePath", "/out.xml"),
            ("Environment", "ci"),
            ("XUnitVersion", "  "),
        ]))
        .unwrap();
        assert_eq!(config.environment(), Some("ci"));
        assert_eq!(config.xunit_version(), None);
    }

    #[test_case("xunit", &[] ; "name only")]
    #[test_case("XUnit;LogFilePath=a.xml", &[("LogFilePath", "a.xml")] ; "case insensitive name")]
    #[test_case(
        "logger://Microsoft/TestPlatform/XUnitXmlLogger/v1;Environment=ci",
        &[("Environment", "ci")]
        ; "extension uri"
    )]
    #[test_case(
        "xunit;LogFilePath=a.xml;;Environment=a=b;LogFilePath=b.xml",
        &[("LogFilePath", "b.xml"), ("Environment", "a=b")]
        ; "later keys override"
    )]
    fn parse_spec(spec: &str, expected: &[(&str, &str)]) {
        assert_eq!(parse_logger_spec(spec).unwrap(), parameters(expected));
    }

    #[test]
    fn parse_spec_errors() {
        let error = parse_logger_spec("trx;LogFilePath=a.xml").unwrap_err();
        assert!(
            matches!(&error, ConfigError::UnknownLogger { name } if name == "trx"),
            "{error:?}"
        );

        let error = parse_logger_spec("xunit;Environment").unwrap_err();
        assert!(
            matches!(
                &error,
                ConfigError::InvalidParameter { parameter } if parameter == "Environment"
            ),
            "{error:?}"
        );

        let error = parse_logger_spec("xunit;=ci").unwrap_err();
        assert!(matches!(error, ConfigError::InvalidParameter { .. }), "{error:?}");
    }
}
