// Copyright (c) The iqltest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Environment variables that would change how `iqltest` runs if inherited from the caller.
const HARNESS_ENV_VARS: &[&str] = &[
    "INFRAQL_TEST_ROOT",
    "INFRAQL_TEST_LOG_LEVEL",
    "INFRAQL_TEST_GOOGLE_PROJECT",
    "INFRAQL_TEST_GOOGLE_ZONE",
    "INFRAQL_TEST_VERBOSE",
    "IQLTEST_LOG",
];

#[track_caller]
pub fn set_env_vars() {
    // SAFETY:
    // Every test writes the same values, before spawning any processes.
    unsafe {
        // ANSI color codes would interfere with output checks.
        std::env::set_var("IQLTEST_COLOR", "never");

        for var in HARNESS_ENV_VARS {
            std::env::remove_var(var);
        }
    }
}
