// Copyright (c) The iqltest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

pub mod env;
pub mod iqltest_cli;
