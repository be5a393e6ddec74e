// Copyright (c) The iqltest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by iqltest.

use camino::Utf8PathBuf;
use std::{error, fmt};
use thiserror::Error;

/// An error that occurred while reading a named output file back from disk.
///
/// This fails the test that declared the output file, not the run.
#[derive(Debug, Error)]
#[error("failed to read output file `{path}`")]
pub struct OutputReadError {
    path: Utf8PathBuf,
    #[source]
    err: std::io::Error,
}

impl OutputReadError {
    pub(crate) fn new(path: impl Into<Utf8PathBuf>, err: std::io::Error) -> Self {
        Self {
            path: path.into(),
            err,
        }
    }

    /// Returns the path that could not be read.
    pub fn path(&self) -> &Utf8PathBuf {
        &self.path
    }
}

/// An error that occurred while compiling an expected pattern.
#[derive(Debug, Error)]
#[error("expected pattern #{index} (`{pattern}`) is not a valid regular expression")]
pub struct PatternCompileError {
    index: usize,
    pattern: String,
    #[source]
    err: regex::Error,
}

impl PatternCompileError {
    pub(crate) fn new(index: usize, pattern: impl Into<String>, err: regex::Error) -> Self {
        Self {
            index,
            pattern: pattern.into(),
            err,
        }
    }

    /// Returns the index of the invalid pattern.
    pub fn index(&self) -> usize {
        self.index
    }
}

/// An error that occurred while reading or expanding generator files.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GeneratorError {
    /// A generator directory could not be listed, or contains a file name that isn't valid UTF-8.
    #[error("failed to read generator directory `{dir}`")]
    ReadDir {
        /// The directory.
        dir: Utf8PathBuf,

        /// The underlying error.
        #[source]
        err: std::io::Error,
    },

    /// A generator file could not be read.
    #[error("failed to read generator file `{path}`")]
    ReadFile {
        /// The file.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        err: std::io::Error,
    },

    /// A generator file is not valid JSON, or doesn't match the generator format.
    #[error("failed to parse generator file `{path}`")]
    ParseFile {
        /// The file.
        path: Utf8PathBuf,

        /// The underlying error, including the JSON path at which it occurred.
        #[source]
        err: serde_path_to_error::Error<serde_json::Error>,
    },

    /// A record names neither a query nor an input file.
    #[error(transparent)]
    InvalidRecord(#[from] GeneratorRecordError),
}

/// A generator record that names neither a query nor an input file.
///
/// This is a fatal configuration error: the run is aborted as soon as it is encountered.
#[derive(Clone, Debug, Error)]
#[error("record #{index} in generator file `{file_name}` has neither `query` nor `input_file`")]
pub struct GeneratorRecordError {
    file_name: String,
    index: usize,
}

impl GeneratorRecordError {
    /// Creates a new error for the record at `index` in `file_name`.
    pub fn new(file_name: impl Into<String>, index: usize) -> Self {
        Self {
            file_name: file_name.into(),
            index,
        }
    }

    /// The name of the generator file containing the record.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// The index of the record within its file.
    pub fn index(&self) -> usize {
        self.index
    }
}

/// An error that occurred while preparing output directories before a run.
#[derive(Debug, Error)]
#[error("failed to prepare output directory `{dir}`")]
pub struct PrepareOutputError {
    dir: Utf8PathBuf,
    #[source]
    err: std::io::Error,
}

impl PrepareOutputError {
    pub(crate) fn new(dir: impl Into<Utf8PathBuf>, err: std::io::Error) -> Self {
        Self {
            dir: dir.into(),
            err,
        }
    }
}

/// An error that occurred while writing test presentation output.
#[derive(Debug, Error)]
#[error("error writing test output")]
pub struct WriteEventError {
    #[from]
    err: std::io::Error,
}

/// An error that ends a test run early.
#[derive(Debug, Error)]
pub enum RunError {
    /// A generator directory, file or record was unusable.
    #[error(transparent)]
    Generator(#[from] GeneratorError),

    /// Test output could not be written.
    #[error(transparent)]
    WriteEvent(#[from] WriteEventError),
}

/// Displays an error followed by each of its sources, separated by `: `.
pub struct DisplayErrorChain<E>(E);

impl<E: error::Error> DisplayErrorChain<E> {
    /// Creates a new chain display for `error`.
    pub fn new(error: E) -> Self {
        Self(error)
    }
}

impl<E: error::Error> fmt::Display for DisplayErrorChain<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)?;
        let mut source = self.0.source();
        while let Some(err) = source {
            write!(f, ": {err}")?;
            source = err.source();
        }
        Ok(())
    }
}
