// Copyright (c) The iqltest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A duplicate of iqltest's main.rs, so that integration tests have a binary target in this
//! package to run.

use color_eyre::Result;

fn main() -> Result<()> {
    color_eyre::install()?;
    let _ = enable_ansi_support::enable_ansi_support();

    iqltest::main_impl()
}
