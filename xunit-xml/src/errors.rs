// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use thiserror::Error;

/// An error that occurs while serializing an [`Assemblies`](crate::Assemblies) document.
///
/// Returned by [`Assemblies::serialize`](crate::Assemblies::serialize) and
/// [`Assemblies::to_string`](crate::Assemblies::to_string).
#[derive(Debug, Error)]
#[error("error serializing xUnit XML report")]
pub struct SerializeError {
    #[from]
    inner: quick_xml::Error,
}
