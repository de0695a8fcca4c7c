// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Build and serialize xUnit v2 XML reports in Rust.
//!
//! The document produced here follows the layout written by the xUnit.net console runner:
//!
//! ```text
//! assemblies
//!   assembly
//!     errors
//!       error / failure
//!     collection
//!       test
//! ```
//!
//! Free-text content (captured output, failure messages and stack traces) is stored as
//! [`XmlText`], which escapes characters that XML 1.0 does not allow. See [`sanitize`] for the
//! exact rules.

mod errors;
mod report;
mod sanitize;
mod serialize;

pub use errors::*;
pub use report::*;
pub use sanitize::*;
