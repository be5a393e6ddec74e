// Copyright (c) The iqltest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Offline integration test harness for the infraql query tool.
//!
//! `iqltest` runs a fixed simple suite followed by the tests described in generator files, prints
//! a summary, and exits non-zero if anything failed.

#![warn(missing_docs)]

mod dispatch;
mod errors;
mod output;

#[doc(hidden)]
pub use dispatch::*;
#[doc(hidden)]
pub use errors::*;
#[doc(hidden)]
pub use output::{OutputContext, OutputWriter, StderrStyles};
