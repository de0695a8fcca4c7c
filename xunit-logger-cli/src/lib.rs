// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Writes an xUnit v2 XML report from test results.
//!
//! Test results are read as newline-delimited JSON, one object per completed test case, from
//! a file or standard input. See `xunit-logger --help` for the options.

#![warn(missing_docs)]

mod dispatch;
mod errors;
mod input;
mod output;

#[doc(hidden)]
pub use dispatch::*;
#[doc(hidden)]
pub use errors::*;
