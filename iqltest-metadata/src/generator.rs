// Copyright (c) The iqltest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The on-disk format for generator files.
//!
//! A generator file is a JSON object whose `integration_tests` key holds a list of
//! [`GeneratorRecord`]s. Each record describes one invocation of the query tool.

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The contents of a single generator file.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct GeneratorFile {
    /// The records in this file, in execution order.
    ///
    /// A file without this key is skipped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integration_tests: Option<Vec<GeneratorRecord>>,
}

impl GeneratorFile {
    /// Returns the records in this file, or an empty slice if the file defines none.
    pub fn records(&self) -> &[GeneratorRecord] {
        self.integration_tests.as_deref().unwrap_or_default()
    }
}

/// A declarative description of one test.
///
/// Every field is optional. A record is only actionable if it has a non-empty `query` or a
/// non-empty `input_file`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct GeneratorRecord {
    /// A literal query, passed as a positional argument after the instruction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,

    /// A file containing the query, passed as `-i=<path>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_file: Option<Utf8PathBuf>,

    /// A template-context file for `input_file`, passed as `-q=<path>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_tmpl_ctx_file: Option<Utf8PathBuf>,

    /// The output format. Defaults to [`Self::DEFAULT_OUTPUT_FORMAT`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    /// The output delimiter. Defaults to [`Self::DEFAULT_DELIMITER`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,

    /// Where the tool writes its output: a file path, or the literal `stdout`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_file: Option<Utf8PathBuf>,

    /// Patterns that must match the output, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expected: Vec<String>,

    /// The test name. Defaults to the record's index within its file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// The instruction keyword. Defaults to [`Self::DEFAULT_INSTRUCTION`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,

    /// Echo captured output after the test.
    #[serde(default, skip_serializing_if = "is_false")]
    pub verbose: bool,

    /// Pass `-H`.
    #[serde(default, skip_serializing_if = "is_false")]
    pub headless: bool,

    /// Pass `--dryrun`.
    #[serde(default, skip_serializing_if = "is_false")]
    pub dry_run: bool,

    /// Credentials file, passed as `--keyfilepath=<path>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyfilepath: Option<Utf8PathBuf>,

    /// Test data file, passed as `--iqldata=<path>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iqldata: Option<Utf8PathBuf>,

    /// Passed through as `--testwitoutapicalls=<value>` when truthy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub testwitoutapicalls: Option<FlagValue>,
}

impl GeneratorRecord {
    /// The output format used if a record doesn't specify one.
    pub const DEFAULT_OUTPUT_FORMAT: &'static str = "csv";

    /// The delimiter used if a record doesn't specify one.
    pub const DEFAULT_DELIMITER: &'static str = ",";

    /// The instruction used if a record doesn't specify one.
    pub const DEFAULT_INSTRUCTION: &'static str = "exec";

    /// The `output_file` value that selects the captured process streams.
    pub const STDOUT: &'static str = "stdout";

    /// Returns the query, if present and non-empty.
    pub fn query(&self) -> Option<&str> {
        non_empty(self.query.as_deref())
    }

    /// Returns the input file, if present and non-empty.
    pub fn input_file(&self) -> Option<&str> {
        non_empty(self.input_file.as_deref().map(|p| p.as_str()))
    }

    /// Returns the template-context file, if present and non-empty.
    pub fn external_tmpl_ctx_file(&self) -> Option<&str> {
        non_empty(self.external_tmpl_ctx_file.as_deref().map(|p| p.as_str()))
    }

    /// Returns the output format.
    pub fn output_format(&self) -> &str {
        self.output
            .as_deref()
            .unwrap_or(Self::DEFAULT_OUTPUT_FORMAT)
    }

    /// Returns the delimiter.
    pub fn delimiter(&self) -> &str {
        self.delimiter.as_deref().unwrap_or(Self::DEFAULT_DELIMITER)
    }

    /// Returns the instruction keyword.
    pub fn instruction(&self) -> &str {
        self.instruction
            .as_deref()
            .unwrap_or(Self::DEFAULT_INSTRUCTION)
    }

    /// Returns the declared output file, if present and non-empty.
    pub fn output_file(&self) -> Option<&str> {
        non_empty(self.output_file.as_deref().map(|p| p.as_str()))
    }

    /// Returns true if output should be read from the captured process streams.
    pub fn is_stdout_output(&self) -> bool {
        self.output_file() == Some(Self::STDOUT)
    }

    /// Returns the credentials file, if present and non-empty.
    pub fn keyfilepath(&self) -> Option<&str> {
        non_empty(self.keyfilepath.as_deref().map(|p| p.as_str()))
    }

    /// Returns the test data file, if present and non-empty.
    pub fn iqldata(&self) -> Option<&str> {
        non_empty(self.iqldata.as_deref().map(|p| p.as_str()))
    }

    /// Returns the `--testwitoutapicalls` value if it is set to something truthy.
    pub fn testwitoutapicalls(&self) -> Option<&FlagValue> {
        self.testwitoutapicalls.as_ref().filter(|v| v.is_truthy())
    }
}

/// A loosely-typed flag value, as found in hand-written generator files.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum FlagValue {
    /// A boolean.
    Bool(bool),
    /// A number.
    Number(serde_json::Number),
    /// A string.
    String(String),
}

impl FlagValue {
    /// Returns false for `false`, zero, and the empty string.
    pub fn is_truthy(&self) -> bool {
        match self {
            FlagValue::Bool(b) => *b,
            FlagValue::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
            FlagValue::String(s) => !s.is_empty(),
        }
    }
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagValue::Bool(b) => write!(f, "{b}"),
            FlagValue::Number(n) => write!(f, "{n}"),
            FlagValue::String(s) => f.write_str(s),
        }
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

fn is_false(b: &bool) -> bool {
    !*b
}
