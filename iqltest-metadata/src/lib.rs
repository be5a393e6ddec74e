// Copyright (c) The iqltest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Formats shared between the `iqltest` harness and the files that drive it.
//!
//! * [`IqlTestExitCode`] documents the process exit codes of `iqltest`.
//! * [`GeneratorFile`] and [`GeneratorRecord`] describe the JSON generator files that are
//!   expanded into tool invocations.

mod exit_codes;
mod generator;

pub use exit_codes::*;
pub use generator::*;
