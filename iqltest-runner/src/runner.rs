// Copyright (c) The iqltest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Running tests.
//!
//! Tests are run one at a time: each process is spawned, waited on and fully evaluated before the
//! next one starts. There are no timeouts, so a tool process that never exits stalls the run.

use crate::{
    errors::{GeneratorError, OutputReadError, PatternCompileError, RunError, WriteEventError},
    generator::{GeneratorExpander, list_generator_files, read_generator_file},
    invocation::{Invocation, TestDefinition},
    matcher::{ExpectedPatterns, MatchOutcome},
    output::{resolve_output, split_lines},
    reporter::{RunSummary, TestEvent, TestReporter},
};
use camino::Utf8Path;
use std::fmt;
use tracing::{debug, info};

/// The first line of captured output recorded for a process that couldn't be spawned.
pub const EXEC_FAIL_HEADING: &str = "Exception caught";

/// How a tool process ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExecStatus {
    /// The process ran and exited. The code is `None` if the process was killed by a signal.
    Exited(Option<i32>),

    /// The process couldn't be spawned.
    ExecFail(String),
}

/// What a tool process did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvocationOutcome {
    /// How the process ended.
    pub status: ExecStatus,

    /// Captured standard output.
    pub stdout: String,

    /// Captured standard error.
    pub stderr: String,
}

impl InvocationOutcome {
    /// Creates the outcome of a process that couldn't be spawned.
    ///
    /// The captured output is [`EXEC_FAIL_HEADING`] followed by the error text, so that the error
    /// is shown wherever output is.
    pub fn exec_fail(error: impl fmt::Display) -> Self {
        let error = error.to_string();
        Self {
            status: ExecStatus::ExecFail(error.clone()),
            stdout: EXEC_FAIL_HEADING.to_owned(),
            stderr: error,
        }
    }

    /// Returns the exit code, if the process exited normally.
    pub fn exit_code(&self) -> Option<i32> {
        match self.status {
            ExecStatus::Exited(code) => code,
            ExecStatus::ExecFail(_) => None,
        }
    }

    /// Returns true if the process ran and exited with code 0.
    pub fn is_success(&self) -> bool {
        self.exit_code() == Some(0)
    }

    /// Returns the lines of standard output followed by the lines of standard error.
    pub fn captured_lines(&self) -> Vec<String> {
        let mut lines = split_lines(&self.stdout);
        lines.extend(split_lines(&self.stderr));
        lines
    }
}

/// Runs `invocation` to completion, capturing its output.
///
/// The process gets a null standard input. A spawn failure is returned as
/// [`ExecStatus::ExecFail`], never as an error.
pub fn execute(invocation: &Invocation) -> InvocationOutcome {
    match execute_inner(invocation) {
        Ok(outcome) => outcome,
        Err(err) => {
            debug!("failed to spawn `{}`: {err}", invocation.program());
            InvocationOutcome::exec_fail(err)
        }
    }
}

fn execute_inner(invocation: &Invocation) -> std::io::Result<InvocationOutcome> {
    let expression = invocation.to_expression();
    debug!("executing command: {invocation}");
    let output = expression
        .stdin_null()
        .stdout_capture()
        .stderr_capture()
        .unchecked()
        .run()?;
    Ok(InvocationOutcome {
        status: ExecStatus::Exited(output.status.code()),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// The harness's conclusion about a single test.
#[derive(Debug)]
pub enum TestVerdict {
    /// Every expected pattern matched.
    Passed,

    /// The test had no expected patterns and the process exited with code 0.
    PassedWithoutAssertions,

    /// The process exited with a non-zero code, was killed, or couldn't be spawned.
    ExitFailure,

    /// An expected pattern was never matched.
    AssertionFailed {
        /// The index of the first unmatched pattern.
        index: usize,
        /// The first unmatched pattern.
        pattern: String,
        /// The lines the patterns were matched against.
        lines: Vec<String>,
    },

    /// The output file couldn't be read.
    OutputUnavailable(OutputReadError),

    /// An expected pattern isn't a valid regular expression.
    InvalidPattern(PatternCompileError),
}

impl TestVerdict {
    /// Returns true if the test passed.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            TestVerdict::Passed | TestVerdict::PassedWithoutAssertions
        )
    }

    /// Returns true if the process itself failed.
    pub fn is_exit_failure(&self) -> bool {
        matches!(self, TestVerdict::ExitFailure)
    }
}

/// Decides whether a test passed, given what its process did.
///
/// Patterns are only checked if the process exited with code 0. The output is only read if there
/// is at least one pattern.
pub fn evaluate(definition: &TestDefinition, outcome: &InvocationOutcome) -> TestVerdict {
    if !outcome.is_success() {
        return TestVerdict::ExitFailure;
    }

    let patterns = match ExpectedPatterns::new(&definition.expected) {
        Ok(patterns) => patterns,
        Err(error) => return TestVerdict::InvalidPattern(error),
    };
    if patterns.is_empty() {
        return TestVerdict::PassedWithoutAssertions;
    }

    let lines = match resolve_output(&definition.output, outcome) {
        Ok(lines) => lines,
        Err(error) => return TestVerdict::OutputUnavailable(error),
    };
    match patterns.match_lines(&lines) {
        MatchOutcome::Matched => TestVerdict::Passed,
        MatchOutcome::Unmatched { index, pattern } => TestVerdict::AssertionFailed {
            index,
            pattern,
            lines,
        },
    }
}

/// Runs tests in order, recording each result and reporting progress.
pub struct TestRunner<'a> {
    reporter: TestReporter<'a>,
}

impl<'a> TestRunner<'a> {
    /// Creates a new runner that reports to `reporter`.
    pub fn new(reporter: TestReporter<'a>) -> Self {
        Self { reporter }
    }

    /// Runs a single test and records its result in `summary`.
    ///
    /// Returns true if the test passed. Only a failure to write progress is an error: everything
    /// that can go wrong with the test itself is recorded as a failed test.
    pub fn run_test(
        &mut self,
        definition: &TestDefinition,
        summary: &mut RunSummary,
    ) -> Result<bool, WriteEventError> {
        let ordinal = summary.begin_test();
        let name = definition
            .name
            .clone()
            .unwrap_or_else(|| RunSummary::default_test_name(ordinal));
        self.reporter
            .report_event(TestEvent::TestStarted { name: &name })?;

        let outcome = execute(&definition.invocation);
        let verdict = evaluate(definition, &outcome);
        let passed = verdict.is_success();
        if passed {
            summary.record_success(name.as_str());
        } else {
            summary.record_failure(name.as_str());
        }

        self.reporter.report_event(TestEvent::TestFinished {
            name: &name,
            outcome: &outcome,
            verdict: &verdict,
            verbose: definition.verbose,
        })?;
        Ok(passed)
    }

    /// Runs every test in `definitions`, in order.
    pub fn run_tests(
        &mut self,
        definitions: impl IntoIterator<Item = TestDefinition>,
        summary: &mut RunSummary,
    ) -> Result<(), WriteEventError> {
        for definition in definitions {
            self.run_test(&definition, summary)?;
        }
        Ok(())
    }

    /// Runs the tests described by every generator file in `dir`.
    ///
    /// Files are visited in file-name order and records in file order. Each file is read just
    /// before its tests run, so an unreadable file or an invalid record ends the run after the
    /// tests before it have completed.
    pub fn run_generator_dir(
        &mut self,
        dir: &Utf8Path,
        expander: &GeneratorExpander<'_>,
        summary: &mut RunSummary,
    ) -> Result<(), RunError> {
        info!("running generated tests from {dir}");
        for entry in list_generator_files(dir)? {
            let file = read_generator_file(&entry.path)?;
            if file.records().is_empty() {
                debug!("{} defines no tests, skipping", entry.path);
                continue;
            }
            for (index, record) in file.records().iter().enumerate() {
                let definition = expander
                    .expand(&entry.name, index, record)
                    .map_err(GeneratorError::from)?;
                self.run_test(&definition, summary)?;
            }
        }
        Ok(())
    }

    /// Reports the final summary.
    pub fn finish(mut self, summary: &RunSummary) -> Result<(), WriteEventError> {
        self.reporter
            .report_event(TestEvent::RunFinished { summary })
    }
}
