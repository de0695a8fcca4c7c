// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    ExpectedError,
    input::{STDIN_NAME, read_events},
    output::{OutputContext, OutputOpts, clap_styles},
};
use camino::Utf8PathBuf;
use clap::Parser;
use std::{
    fs::File,
    io::{self, BufReader},
};
use tracing::debug;
use xunit_logger::{
    config::{
        ENVIRONMENT_KEY, LOG_FILE_PATH_KEY, LoggerConfig, LoggerParameters,
        TEST_RUN_DIRECTORY_KEY, XUNIT_VERSION_KEY, parse_logger_spec,
    },
    logger::XunitLogger,
};

/// Writes an xUnit v2 XML report from test results.
///
/// Test results are read as newline-delimited JSON, one object per completed test case.
#[derive(Debug, Parser)]
#[command(version, name = "xunit-logger", styles = clap_styles::style())]
pub struct XunitLoggerApp {
    /// Logger specification, for example `xunit;LogFilePath=results.xml`
    ///
    /// Options given as flags override the corresponding keys.
    #[arg(long, value_name = "SPEC")]
    logger: Option<String>,

    /// Write the report to this file
    #[arg(long, value_name = "PATH")]
    log_file_path: Option<Utf8PathBuf>,

    /// Write the report to `TestResults.xml` in this directory
    #[arg(long, value_name = "DIR")]
    test_run_directory: Option<Utf8PathBuf>,

    /// Description of the environment the tests ran in
    #[arg(long, env = "XUNIT_LOGGER_ENVIRONMENT")]
    environment: Option<String>,

    /// xUnit.net version, written as the test framework of each assembly
    #[arg(long, value_name = "VERSION", env = "XUNIT_LOGGER_XUNIT_VERSION")]
    xunit_version: Option<String>,

    /// Read test results from this file [default: standard input]
    #[arg(long, short, value_name = "FILE")]
    input: Option<Utf8PathBuf>,

    #[command(flatten)]
    output: OutputOpts,
}

impl XunitLoggerApp {
    /// Initializes logging and returns the output context.
    pub fn init_output(&self) -> OutputContext {
        self.output.init()
    }

    /// Executes the app, returning the process exit code.
    pub fn exec(self) -> Result<i32, ExpectedError> {
        let config = LoggerConfig::from_parameters(&self.logger_parameters()?)?;
        let logger = XunitLogger::new(config);

        let count = match &self.input {
            Some(path) => {
                let f = File::open(path)
                    .map_err(|err| ExpectedError::input_open(path.clone(), err))?;
                read_events(BufReader::new(f), path.as_str(), |event| logger.record(event))?
            }
            None => read_events(io::stdin().lock(), STDIN_NAME, |event| logger.record(event))?,
        };
        debug!("read {count} test results");

        logger.finish_to_file()?;
        Ok(0)
    }

    fn logger_parameters(&self) -> Result<LoggerParameters, ExpectedError> {
        let mut parameters = match &self.logger {
            Some(spec) => parse_logger_spec(spec)?,
            None => LoggerParameters::new(),
        };

        let overrides = [
            (LOG_FILE_PATH_KEY, self.log_file_path.as_ref().map(|p| p.to_string())),
            (
                TEST_RUN_DIRECTORY_KEY,
                self.test_run_directory.as_ref().map(|p| p.to_string()),
            ),
            (ENVIRONMENT_KEY, self.environment.clone()),
            (XUNIT_VERSION_KEY, self.xunit_version.clone()),
        ];
        for (key, value) in overrides {
            if let Some(value) = value {
                parameters.insert(key.to_owned(), value);
            }
        }

        Ok(parameters)
    }
}
