// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns a flat set of test results into an xUnit v2 XML report.
//!
//! The basic flow is:
//!
//! 1. A host adapter creates an [`XunitLogger`](logger::XunitLogger) from the logger
//!    parameters ([`LoggerConfig`](config::LoggerConfig)).
//! 2. Each completed test is passed to [`XunitLogger::record`](logger::XunitLogger::record),
//!    from any thread.
//! 3. At the end of the run, [`XunitLogger::finish_to_file`](logger::XunitLogger::finish_to_file)
//!    groups the results by assembly and class ([`aggregator`]), builds the document
//!    ([`builder`]) and writes it out.

#![warn(missing_docs)]

pub mod aggregator;
pub mod builder;
pub mod classify;
pub mod config;
pub mod errors;
pub mod logger;
pub mod name;
pub mod record;
