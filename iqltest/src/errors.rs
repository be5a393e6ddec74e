// Copyright (c) The iqltest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::output::{NO_HEADING_TARGET, StderrStyles};
use iqltest_metadata::IqlTestExitCode;
use iqltest_runner::errors::*;
use owo_colors::OwoColorize;
use std::error::Error;
use thiserror::Error;
use tracing::error;

// The #[error()] strings are placeholder messages: errors are meant to be printed with
// display_to_stderr, which colorizes them.

/// An error that ends an `iqltest` run with a non-zero exit code.
#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("failed to prepare output directories")]
    PrepareOutput {
        #[from]
        err: PrepareOutputError,
    },
    #[error("failed to load generated tests")]
    Generator {
        #[from]
        err: GeneratorError,
    },
    #[error("failed to write test output")]
    WriteEvent {
        #[from]
        err: WriteEventError,
    },
    #[error("test run failed")]
    TestRunFailed { failing: usize, total: usize },
}

impl From<RunError> for ExpectedError {
    fn from(err: RunError) -> Self {
        match err {
            RunError::Generator(err) => Self::Generator { err },
            RunError::WriteEvent(err) => Self::WriteEvent { err },
        }
    }
}

impl ExpectedError {
    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::PrepareOutput { .. } => IqlTestExitCode::SETUP_ERROR,
            Self::Generator {
                err: GeneratorError::InvalidRecord(_),
            } => IqlTestExitCode::GENERATOR_RECORD_INVALID,
            Self::Generator { .. } | Self::WriteEvent { .. } => IqlTestExitCode::SETUP_ERROR,
            Self::TestRunFailed { .. } => IqlTestExitCode::TEST_RUN_FAILED,
        }
    }

    /// Displays this error to stderr.
    pub fn display_to_stderr(&self, styles: &StderrStyles) {
        let mut next_error = match self {
            Self::PrepareOutput { err } => {
                error!("failed to prepare output directories");
                Some(err as &dyn Error)
            }
            Self::Generator {
                err: GeneratorError::InvalidRecord(err),
            } => {
                error!(
                    "record #{} in generator file `{}` has neither `query` nor `input_file`",
                    err.index().style(styles.bold),
                    err.file_name().style(styles.bold),
                );
                None
            }
            Self::Generator { err } => {
                error!("failed to load generated tests");
                Some(err as &dyn Error)
            }
            Self::WriteEvent { err } => {
                error!("failed to write test output");
                Some(err as &dyn Error)
            }
            Self::TestRunFailed { failing, total } => {
                error!(
                    "test run failed: {} of {} tests failed",
                    failing.style(styles.bold),
                    total.style(styles.bold),
                );
                None
            }
        };

        while let Some(err) = next_error {
            error!(target: NO_HEADING_TARGET, "\nCaused by:\n  {}", err);
            next_error = err.source();
        }
    }
}
