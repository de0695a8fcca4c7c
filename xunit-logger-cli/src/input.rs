// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reading newline-delimited JSON test results.

use crate::errors::ReadEventsError;
use std::io::BufRead;
use xunit_logger::record::TestResultEvent;

/// The name used for standard input in messages.
pub(crate) const STDIN_NAME: &str = "<stdin>";

/// Reads one event per non-blank line, passing each to `f`. Returns the number of events read.
pub(crate) fn read_events(
    reader: impl BufRead,
    input: &str,
    mut f: impl FnMut(TestResultEvent),
) -> Result<usize, ReadEventsError> {
    let mut count = 0;
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|error| ReadEventsError::Read {
            input: input.to_owned(),
            error,
        })?;
        if line.trim().is_empty() {
            continue;
        }

        let event = serde_json::from_str(&line).map_err(|error| ReadEventsError::Parse {
            input: input.to_owned(),
            line: idx + 1,
            error,
        })?;
        f(event);
        count += 1;
    }
    Ok(count)
}
