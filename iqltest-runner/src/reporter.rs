// Copyright (c) The iqltest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reporting test progress and the final run summary.
//!
//! Progress goes to standard error, failure output and the summary to standard output. Every
//! message is surrounded by blank lines.

use crate::{
    errors::{DisplayErrorChain, WriteEventError},
    runner::{ExecStatus, InvocationOutcome, TestVerdict},
};
use owo_colors::{OwoColorize, Style};
use std::{
    fmt,
    io::{self, Write},
};

/// The width of the rule printed around the summary block.
const SUMMARY_RULE_WIDTH: usize = 24;

/// Running totals for a test run.
///
/// Exactly one of [`record_success`](Self::record_success) or
/// [`record_failure`](Self::record_failure) must be called per test.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    test_count: usize,
    succeeded: Vec<String>,
    failed: Vec<String>,
}

impl RunSummary {
    /// Creates an empty summary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts a new test attempt and returns its 1-based ordinal.
    pub fn begin_test(&mut self) -> usize {
        self.test_count += 1;
        self.test_count
    }

    /// The name given to a test that doesn't have one.
    pub fn default_test_name(ordinal: usize) -> String {
        format!("TEST #{ordinal}")
    }

    /// Records a passing test.
    pub fn record_success(&mut self, name: impl Into<String>) {
        self.succeeded.push(name.into());
    }

    /// Records a failing test.
    pub fn record_failure(&mut self, name: impl Into<String>) {
        self.failed.push(name.into());
    }

    /// The number of tests attempted.
    pub fn test_count(&self) -> usize {
        self.test_count
    }

    /// The number of tests that failed.
    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }

    /// The names of the tests that passed, in run order.
    pub fn succeeded(&self) -> &[String] {
        &self.succeeded
    }

    /// The names of the tests that failed, in run order.
    pub fn failed(&self) -> &[String] {
        &self.failed
    }

    /// Returns true if no test failed.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// A test event.
#[derive(Debug)]
pub enum TestEvent<'a> {
    /// A test is about to run.
    TestStarted {
        /// The test name.
        name: &'a str,
    },

    /// A test has finished and its verdict has been recorded.
    TestFinished {
        /// The test name.
        name: &'a str,
        /// What the process did.
        outcome: &'a InvocationOutcome,
        /// What the harness concluded.
        verdict: &'a TestVerdict,
        /// Echo the captured streams after the verdict.
        verbose: bool,
    },

    /// Every test has run.
    RunFinished {
        /// The final totals.
        summary: &'a RunSummary,
    },
}

/// Where the reporter writes to.
pub enum ReporterOutput<'a> {
    /// The process's standard output and standard error.
    Terminal,

    /// In-memory buffers.
    Buffer {
        /// Receives what would go to standard output.
        stdout: &'a mut Vec<u8>,
        /// Receives what would go to standard error.
        stderr: &'a mut Vec<u8>,
    },
}

/// Writes test events for people to read.
pub struct TestReporter<'a> {
    stdout: ReporterWriter<'a>,
    stderr: ReporterWriter<'a>,
    styles: Box<Styles>,
}

impl<'a> TestReporter<'a> {
    /// Creates a new reporter that writes to `output`.
    pub fn new(output: ReporterOutput<'a>) -> Self {
        let (stdout, stderr) = match output {
            ReporterOutput::Terminal => (ReporterWriter::Stdout, ReporterWriter::Stderr),
            ReporterOutput::Buffer { stdout, stderr } => (
                ReporterWriter::Buffer(stdout),
                ReporterWriter::Buffer(stderr),
            ),
        };
        Self {
            stdout,
            stderr,
            styles: Box::default(),
        }
    }

    /// Colorizes output.
    pub fn colorize(&mut self) {
        self.styles.colorize();
    }

    /// Reports a test event.
    pub fn report_event(&mut self, event: TestEvent<'_>) -> Result<(), WriteEventError> {
        self.write_event(&event)?;
        self.stdout.flush()?;
        self.stderr.flush()?;
        Ok(())
    }

    // ---
    // Helper methods
    // ---

    fn write_event(&mut self, event: &TestEvent<'_>) -> io::Result<()> {
        match event {
            TestEvent::TestStarted { name } => {
                write_layer(
                    &mut self.stderr,
                    format_args!("{} {name}", "BEGINNING TEST:".style(self.styles.heading)),
                )?;
            }
            TestEvent::TestFinished {
                name,
                outcome,
                verdict,
                verbose,
            } => {
                self.write_verdict(outcome, verdict)?;
                if *verbose && !verdict.is_exit_failure() {
                    for stream in [&outcome.stdout, &outcome.stderr] {
                        write_layer(&mut self.stderr, stream.trim_end_matches(['\r', '\n']))?;
                    }
                }
                write_layer(
                    &mut self.stderr,
                    format_args!("{} {name}", "TEST ENDED:".style(self.styles.heading)),
                )?;
            }
            TestEvent::RunFinished { summary } => {
                self.write_summary(summary)?;
            }
        }
        Ok(())
    }

    fn write_verdict(
        &mut self,
        outcome: &InvocationOutcome,
        verdict: &TestVerdict,
    ) -> io::Result<()> {
        match verdict {
            TestVerdict::Passed => {
                write_layer(
                    &mut self.stderr,
                    "assertion succeeded".style(self.styles.pass),
                )?;
            }
            TestVerdict::PassedWithoutAssertions => {
                write_layer(
                    &mut self.stderr,
                    "no assertion test succeeded".style(self.styles.pass),
                )?;
            }
            TestVerdict::ExitFailure => {
                if let ExecStatus::ExecFail(error) = &outcome.status {
                    write_layer(
                        &mut self.stderr,
                        format_args!("{}: {error}", "Exception caught".style(self.styles.fail)),
                    )?;
                }
                for line in outcome.captured_lines() {
                    write_layer(&mut self.stdout, line)?;
                }
            }
            TestVerdict::AssertionFailed {
                index,
                pattern,
                lines,
            } => {
                write_layer(
                    &mut self.stderr,
                    format_args!(
                        "{} #{index} failed: \"{pattern}\" unmatched in any output!!!",
                        "assertion".style(self.styles.fail),
                    ),
                )?;
                write_layer(
                    &mut self.stdout,
                    format_args!("failure output: {}", lines.join(" ")),
                )?;
            }
            TestVerdict::OutputUnavailable(error) => {
                self.write_check_error(error)?;
            }
            TestVerdict::InvalidPattern(error) => {
                self.write_check_error(error)?;
            }
        }
        Ok(())
    }

    fn write_check_error(&mut self, error: &(dyn std::error::Error + 'static)) -> io::Result<()> {
        write_layer(
            &mut self.stderr,
            format_args!(
                "{} {error}",
                "assertion not checked:".style(self.styles.fail)
            ),
        )?;
        write_layer(
            &mut self.stdout,
            format_args!("failure output: {}", DisplayErrorChain::new(error)),
        )
    }

    fn write_summary(&mut self, summary: &RunSummary) -> io::Result<()> {
        let rule = "#".repeat(SUMMARY_RULE_WIDTH);
        let writer = &mut self.stdout;

        write_layer(writer, &rule)?;
        write_layer(writer, "TEST SUMMARY".style(self.styles.heading))?;
        write_layer(writer, "The following tests succeeded:")?;
        for name in summary.succeeded() {
            write_layer(
                writer,
                format_args!("    {} {name}", "++".style(self.styles.pass)),
            )?;
        }

        if summary.is_success() {
            write_layer(
                writer,
                format_args!(
                    "Test suite {}; all {} tests succeeded",
                    "PASSED".style(self.styles.pass),
                    summary.test_count().style(self.styles.count),
                ),
            )?;
        } else {
            write_layer(
                writer,
                format_args!(
                    "Test suite {} with {} failing tests out of {} total",
                    "FAILED".style(self.styles.fail),
                    summary.failure_count().style(self.styles.count),
                    summary.test_count().style(self.styles.count),
                ),
            )?;
            write_layer(writer, "The following tests FAILED:")?;
            for name in summary.failed() {
                write_layer(
                    writer,
                    format_args!("    {} {name}", "--".style(self.styles.fail)),
                )?;
            }
        }

        write_layer(writer, &rule)
    }
}

fn write_layer(writer: &mut impl Write, message: impl fmt::Display) -> io::Result<()> {
    writeln!(writer)?;
    writeln!(writer, "{message}")?;
    writeln!(writer)
}

enum ReporterWriter<'a> {
    Stdout,
    Stderr,
    Buffer(&'a mut Vec<u8>),
}

impl Write for ReporterWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            ReporterWriter::Stdout => io::stdout().lock().write(buf),
            ReporterWriter::Stderr => io::stderr().lock().write(buf),
            ReporterWriter::Buffer(out) => out.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            ReporterWriter::Stdout => io::stdout().flush(),
            ReporterWriter::Stderr => io::stderr().flush(),
            ReporterWriter::Buffer(_) => Ok(()),
        }
    }
}

#[derive(Debug, Default)]
struct Styles {
    heading: Style,
    count: Style,
    pass: Style,
    fail: Style,
}

impl Styles {
    fn colorize(&mut self) {
        self.heading = Style::new().bold();
        self.count = Style::new().bold();
        self.pass = Style::new().green().bold();
        self.fail = Style::new().red().bold();
    }
}
