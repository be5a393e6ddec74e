// Copyright (c) The iqltest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Documented exit codes for `iqltest` runs.
///
/// Callers of the harness only get a pass/fail signal: every failure mode maps to exit code 1. The
/// separate names exist so that the reason for an exit can be traced in the source.
///
/// Unknown/unexpected failures will always result in exit code 1.
pub enum IqlTestExitCode {}

impl IqlTestExitCode {
    /// Every test succeeded.
    pub const OK: i32 = 0;

    /// One or more tests failed.
    pub const TEST_RUN_FAILED: i32 = 1;

    /// A generator record named neither a query nor an input file.
    ///
    /// This aborts the run as soon as the record is reached.
    pub const GENERATOR_RECORD_INVALID: i32 = 1;

    /// The harness could not be set up: a generator directory or file could not be read, or the
    /// output directories could not be prepared.
    pub const SETUP_ERROR: i32 = 1;
}
