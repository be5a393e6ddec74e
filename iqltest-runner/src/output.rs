// Copyright (c) The iqltest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Locating the output a test's patterns are matched against.

use crate::{errors::OutputReadError, runner::InvocationOutcome};
use camino::Utf8PathBuf;

/// Where a test's output ends up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputDestination {
    /// The output is read from the captured process streams.
    Captured,

    /// The tool writes the output to this file, which is read back after the process exits.
    File(Utf8PathBuf),
}

/// Returns the lines a test's patterns should be matched against.
///
/// For captured output this is the lines of standard output followed by the lines of standard
/// error. For a named file this is the file's contents. Line terminators are stripped.
pub fn resolve_output(
    destination: &OutputDestination,
    outcome: &InvocationOutcome,
) -> Result<Vec<String>, OutputReadError> {
    match destination {
        OutputDestination::Captured => Ok(outcome.captured_lines()),
        OutputDestination::File(path) => {
            let contents =
                std::fs::read_to_string(path).map_err(|err| OutputReadError::new(path, err))?;
            Ok(split_lines(&contents))
        }
    }
}

/// Splits text into lines, stripping `\n` and `\r\n` terminators.
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines().map(ToOwned::to_owned).collect()
}
