// Copyright (c) The iqltest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Building argument lists for the query tool.

use crate::output::OutputDestination;
use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;

/// Connection and configuration arguments shared by every invocation.
#[derive(Clone, Debug)]
pub struct BaseInvocation {
    executable: Utf8PathBuf,
    config_file: Utf8PathBuf,
    provider_root: Utf8PathBuf,
    log_level: String,
    db_file_path: Utf8PathBuf,
}

impl BaseInvocation {
    /// Creates a new base invocation.
    pub fn new(
        executable: impl Into<Utf8PathBuf>,
        config_file: impl Into<Utf8PathBuf>,
        provider_root: impl Into<Utf8PathBuf>,
        log_level: impl Into<String>,
        db_file_path: impl Into<Utf8PathBuf>,
    ) -> Self {
        Self {
            executable: executable.into(),
            config_file: config_file.into(),
            provider_root: provider_root.into(),
            log_level: log_level.into(),
            db_file_path: db_file_path.into(),
        }
    }

    /// Returns the path to the query tool.
    pub fn executable(&self) -> &Utf8Path {
        &self.executable
    }

    /// Starts a new invocation with the base arguments filled in.
    ///
    /// The tool always runs with `--offline`.
    pub fn invocation(&self) -> Invocation {
        let mut invocation = Invocation::new(self.executable.as_str());
        invocation
            .arg(format!("--configfile={}", self.config_file))
            .arg("--offline")
            .arg(format!("--providerroot={}", self.provider_root))
            .arg(format!("--loglevel={}", self.log_level))
            .arg(format!("--dbfilepath={}", self.db_file_path));
        invocation
    }
}

/// A fully-built command line for the query tool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
}

impl Invocation {
    /// Creates an invocation of `program` with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Appends an argument.
    pub fn arg(&mut self, arg: impl Into<String>) -> &mut Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    pub fn args(&mut self, args: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Appends the per-test arguments for an `exec`-style invocation.
    ///
    /// The order is `-o`, `-d`, `-f`, the instruction, then either the query or `-i` (and `-q` if a
    /// template context is present).
    pub fn exec_args(&mut self, exec: &ExecArgs) -> &mut Self {
        self.arg(format!("-o={}", exec.output_format));
        if let Some(delimiter) = &exec.delimiter {
            self.arg(format!("-d={delimiter}"));
        }
        if let Some(output_file) = &exec.output_file {
            self.arg(format!("-f={output_file}"));
        }
        self.arg(exec.instruction.as_str());
        match &exec.source {
            QuerySource::Query(query) => {
                self.arg(query.as_str());
            }
            QuerySource::InputFile {
                path,
                template_context,
            } => {
                self.arg(format!("-i={path}"));
                if let Some(ctx) = template_context {
                    self.arg(format!("-q={ctx}"));
                }
            }
        }
        self
    }

    /// Returns the program to run.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Returns the arguments, not including the program.
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Converts the invocation to a [`duct::Expression`].
    pub fn to_expression(&self) -> duct::Expression {
        duct::cmd(self.program.as_str(), self.args.iter().map(|arg| &**arg))
    }

    /// Returns the program followed by the arguments.
    pub fn all_args(&self) -> Vec<&str> {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&shell_words::join(self.all_args()))
    }
}

/// Per-test arguments for an `exec`-style invocation.
#[derive(Clone, Debug)]
pub struct ExecArgs {
    /// The `-o` output format.
    pub output_format: String,
    /// The `-d` delimiter, if any.
    pub delimiter: Option<String>,
    /// The `-f` output file, if any.
    pub output_file: Option<String>,
    /// The instruction keyword, e.g. `exec`.
    pub instruction: String,
    /// What the tool should run.
    pub source: QuerySource,
}

/// The query an invocation runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuerySource {
    /// A literal query string.
    Query(String),

    /// A file containing the query.
    InputFile {
        /// The input file.
        path: Utf8PathBuf,
        /// An optional template-context file.
        template_context: Option<Utf8PathBuf>,
    },
}

/// One test case: an invocation plus what its output must look like.
#[derive(Clone, Debug)]
pub struct TestDefinition {
    /// The test name. If absent, a name is derived from the test's ordinal.
    pub name: Option<String>,
    /// The command line to run.
    pub invocation: Invocation,
    /// Patterns that must match the output, in order. May be empty.
    pub expected: Vec<String>,
    /// Where the output to match is read from.
    pub output: OutputDestination,
    /// Echo captured output after the test.
    pub verbose: bool,
}

impl TestDefinition {
    /// Creates an unnamed test with no expectations that reads the captured streams.
    pub fn new(invocation: Invocation) -> Self {
        Self {
            name: None,
            invocation,
            expected: Vec::new(),
            output: OutputDestination::Captured,
            verbose: false,
        }
    }

    /// Sets the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the expected patterns.
    pub fn with_expected(mut self, expected: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.expected = expected.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the output destination.
    pub fn with_output(mut self, output: OutputDestination) -> Self {
        self.output = output;
        self
    }

    /// Sets the verbose flag.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}
