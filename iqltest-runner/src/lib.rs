// Copyright (c) The iqltest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Core functionality for iqltest, an integration-test harness for a command-line SQL-like query
//! tool.
//!
//! A run builds [`invocation::TestDefinition`]s, either from the fixed [`suite::simple_suite`] or
//! from generator files via [`generator::GeneratorExpander`], and hands them to a
//! [`runner::TestRunner`]. Each test spawns the tool once, then its output is checked against the
//! test's expected patterns with [`matcher::ExpectedPatterns`]. Results accumulate in a
//! [`reporter::RunSummary`].

pub mod errors;
pub mod generator;
pub mod invocation;
pub mod matcher;
pub mod output;
pub mod paths;
pub mod reporter;
pub mod runner;
pub mod suite;
