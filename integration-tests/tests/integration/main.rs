// Copyright (c) The iqltest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests
//!
//! These run the `iqltest-dup` binary, a copy of `iqltest`'s main function, against `fake-iql`, a
//! stand-in for the query tool that prints canned results. See `test-helpers/` for both.

use indoc::indoc;
use integration_tests::env::set_env_vars;
use iqltest_metadata::IqlTestExitCode;
use pretty_assertions::assert_eq;

mod temp_test_root;

use temp_test_root::TempTestRoot;

/// The number of tests in the simple suite.
const SIMPLE_SUITE_LEN: usize = 19;

#[test]
fn simple_suite_passes() {
    set_env_vars();
    let root = TempTestRoot::new().unwrap();

    let output = root.cli().output();

    let stdout = output.stdout_as_str();
    assert!(
        stdout.contains(&format!(
            "Test suite PASSED; all {SIMPLE_SUITE_LEN} tests succeeded"
        )),
        "{output}"
    );
    assert!(stdout.contains("    ++ Verbose simple USE test + assertion"));
    assert!(!stdout.contains("FAILED"), "{output}");

    let stderr = output.stderr_as_str();
    assert!(stderr.contains("no assertion test succeeded"));
    assert_eq!(output.started_tests().len(), SIMPLE_SUITE_LEN);

    // Output files are written under outputs/.
    let providers_csv = fs_err::read_to_string(root.root().join("outputs/show-providers-alt.csv"))
        .expect("output file was written");
    assert_eq!(providers_csv, "name\ngoogle\n");
}

#[test]
fn generator_files_run_in_name_order() {
    set_env_vars();
    let root = TempTestRoot::new().unwrap();
    root.write_generator(
        "always",
        "b-second.json",
        r#"{"integration_tests": [{"name": "only", "query": "SHOW PROVIDERS;"}]}"#,
    )
    .unwrap();
    root.write_generator(
        "always",
        "a-first.json",
        indoc! {r#"
            {
                "integration_tests": [
                    {"name": "one", "query": "SELECT 1;", "expected": ["query$", "SELECT 1;"]},
                    {"query": "SELECT 2;", "output": "json", "output_file": "stdout", "expected": ["^\\[.*\\]$"]}
                ]
            }
        "#},
    )
    .unwrap();
    root.write_generator("always", "README.txt", "not a generator file")
        .unwrap();

    let output = root.cli().output();

    let generated: Vec<_> = output
        .started_tests()
        .into_iter()
        .skip(SIMPLE_SUITE_LEN)
        .collect();
    assert_eq!(
        generated,
        [
            "a-first.json: one",
            "a-first.json: #1",
            "b-second.json: only",
        ]
    );
    assert!(
        output
            .stdout_as_str()
            .contains("Test suite PASSED; all 22 tests succeeded"),
        "{output}"
    );

    // Records without an output file write to <assets>/<file>_<index>.<format>.
    let default_output = fs_err::read_to_string(root.assets_root().join("a-first.json_0.csv"))
        .expect("default output file was written");
    assert_eq!(default_output, "query\nSELECT 1;\n");
}

#[test]
fn failed_assertion_fails_the_run() {
    set_env_vars();
    let root = TempTestRoot::new().unwrap();
    root.write_generator(
        "always",
        "checks.json",
        r#"{"integration_tests": [{"name": "wrong", "query": "SELECT 1;", "expected": ["query", "SELECT 2"]}]}"#,
    )
    .unwrap();

    let output = root.cli().unchecked(true).output();

    assert_eq!(
        output.exit_status.code(),
        Some(IqlTestExitCode::TEST_RUN_FAILED),
        "{output}"
    );
    let stderr = output.stderr_as_str();
    assert!(
        stderr.contains(r#"assertion #1 failed: "SELECT 2" unmatched in any output!!!"#),
        "{output}"
    );
    let stdout = output.stdout_as_str();
    assert!(
        stdout.contains("failure output: query SELECT 1;"),
        "{output}"
    );
    assert!(
        stdout.contains("Test suite FAILED with 1 failing tests out of 20 total"),
        "{output}"
    );
    assert!(stdout.contains("The following tests FAILED:"));
    assert!(stdout.contains("    -- checks.json: wrong"));
}

#[test]
fn tool_failure_prints_captured_output() {
    set_env_vars();
    let root = TempTestRoot::new().unwrap();
    root.write_generator(
        "always",
        "failing.json",
        r#"{"integration_tests": [{"name": "boom", "query": "FAIL;", "output_file": "stdout"}]}"#,
    )
    .unwrap();

    let output = root.cli().unchecked(true).output();

    assert_eq!(
        output.exit_status.code(),
        Some(IqlTestExitCode::TEST_RUN_FAILED),
        "{output}"
    );
    let stdout = output.stdout_as_str();
    assert!(stdout.contains("\nfake-iql: running query\n"), "{output}");
    assert!(
        stdout.contains("\nfake-iql: simulated failure for `FAIL;`\n"),
        "{output}"
    );
    assert!(stdout.contains("    -- failing.json: boom"));
}

#[test]
fn invalid_record_aborts_the_run() {
    set_env_vars();
    let root = TempTestRoot::new().unwrap();
    root.write_generator(
        "always",
        "a.json",
        r#"{"integration_tests": [{"query": "SELECT 1;"}, {"name": "nothing to run"}]}"#,
    )
    .unwrap();
    root.write_generator(
        "always",
        "b.json",
        r#"{"integration_tests": [{"name": "never runs", "query": "SELECT 2;"}]}"#,
    )
    .unwrap();

    let output = root.cli().unchecked(true).output();

    assert_eq!(
        output.exit_status.code(),
        Some(IqlTestExitCode::GENERATOR_RECORD_INVALID),
        "{output}"
    );
    assert_eq!(
        output.started_tests().last().map(String::as_str),
        Some("a.json: #0"),
        "tests before the invalid record ran, and none after"
    );
    assert!(
        output
            .stderr_as_str()
            .contains("record #1 in generator file `a.json` has neither `query` nor `input_file`"),
        "{output}"
    );
    assert!(!output.stdout_as_str().contains("TEST SUMMARY"));
}

#[test]
fn unparseable_generator_file_is_a_setup_error() {
    set_env_vars();
    let root = TempTestRoot::new().unwrap();
    root.write_generator("always", "bad.json", "{ not json")
        .unwrap();

    let output = root.cli().unchecked(true).output();

    assert_eq!(
        output.exit_status.code(),
        Some(IqlTestExitCode::SETUP_ERROR),
        "{output}"
    );
    let stderr = output.stderr_as_str();
    assert!(
        stderr.contains("error: failed to load generated tests"),
        "{output}"
    );
    assert!(stderr.contains("Caused by:"), "{output}");
    assert!(stderr.contains("bad.json"), "{output}");
}

#[test]
fn files_without_tests_are_skipped() {
    set_env_vars();
    let root = TempTestRoot::new().unwrap();
    root.write_generator("always", "empty.json", "{}").unwrap();
    root.write_generator("always", "none.json", r#"{"integration_tests": []}"#)
        .unwrap();

    let output = root.cli().output();

    assert_eq!(output.started_tests().len(), SIMPLE_SUITE_LEN);
    assert!(
        output
            .stdout_as_str()
            .contains(&format!("all {SIMPLE_SUITE_LEN} tests succeeded")),
        "{output}"
    );
}

#[test]
fn csv_output_file_with_alternate_delimiter() {
    set_env_vars();
    let root = TempTestRoot::new().unwrap();
    root.write_generator(
        "always",
        "csv.json",
        indoc! {r#"
            {
                "integration_tests": [
                    {
                        "name": "alt-delimited",
                        "query": "SHOW EXTENDED RESOURCES FROM google.compute;",
                        "delimiter": ";",
                        "output_file": "resources-alt.csv",
                        "expected": ["name;id;title;description", "resourcePolicies;.*"]
                    }
                ]
            }
        "#},
    )
    .unwrap();

    // A stale CSV from an earlier run is deleted before any test runs.
    fs_err::create_dir_all(root.assets_root()).unwrap();
    fs_err::write(root.assets_root().join("stale.csv"), "old\n").unwrap();

    let output = root.cli().output();

    assert!(
        output
            .stderr_as_str()
            .contains("\nBEGINNING TEST: csv.json: alt-delimited\n\n\nassertion succeeded\n"),
        "{output}"
    );
    assert!(!root.assets_root().join("stale.csv").exists());
    assert!(root.assets_root().join("resources-alt.csv").exists());
}

#[test]
fn additional_dir_runs_after_always() {
    set_env_vars();
    let root = TempTestRoot::new().unwrap();
    root.write_generator(
        "always",
        "always.json",
        r#"{"integration_tests": [{"name": "first", "query": "SELECT 1;"}]}"#,
    )
    .unwrap();
    root.write_generator(
        "extra",
        "extra.json",
        r#"{"integration_tests": [{"name": "second", "query": "SELECT 2;"}]}"#,
    )
    .unwrap();

    let output = root
        .cli()
        .args(["--additionalintegrationtestdir", "extra"])
        .output();

    let generated: Vec<_> = output
        .started_tests()
        .into_iter()
        .skip(SIMPLE_SUITE_LEN)
        .collect();
    assert_eq!(generated, ["always.json: first", "extra.json: second"]);
}

#[test]
fn verbose_tests_echo_captured_output() {
    set_env_vars();
    let root = TempTestRoot::new().unwrap();
    root.write_generator(
        "always",
        "verbose.json",
        r#"{"integration_tests": [{"query": "SELECT 42;", "output_file": "stdout", "verbose": true}]}"#,
    )
    .unwrap();

    let output = root.cli().output();

    assert!(
        output
            .stderr_as_str()
            .contains("\nno assertion test succeeded\n\n\nquery\nSELECT 42;\n\n"),
        "{output}"
    );
}

#[test]
fn environment_configures_the_run() {
    set_env_vars();
    let root = TempTestRoot::new().unwrap();

    let output = root
        .cli()
        .env("INFRAQL_TEST_VERBOSE", "1")
        .env("INFRAQL_TEST_LOG_LEVEL", "debug")
        .env("INFRAQL_TEST_GOOGLE_PROJECT", "my-project")
        .env("INFRAQL_TEST_GOOGLE_ZONE", "my-zone")
        .output();

    let stderr = output.stderr_as_str();
    assert!(
        stderr.contains("against project my-project in zone my-zone"),
        "{output}"
    );
    // Verbose simple-suite tests echo the tool's stdout, which reflects the log level.
    assert!(
        stderr.contains(indoc! {r#"

            assertion succeeded


            [{"query":"SHOW PROVIDERS;","loglevel":"debug"}]

        "#}),
        "{output}"
    );
}

#[test]
fn falsey_verbose_variable_is_quiet() {
    set_env_vars();
    let root = TempTestRoot::new().unwrap();

    let output = root.cli().env("INFRAQL_TEST_VERBOSE", "false").output();

    let stderr = output.stderr_as_str();
    assert!(!stderr.contains(r#"[{"query""#), "{output}");
    assert!(
        stderr.contains("against project lab-kr-network-01 in zone australia-southeast1-b"),
        "{output}"
    );
}

#[test]
fn missing_always_dir_is_a_setup_error() {
    set_env_vars();
    let root = TempTestRoot::new().unwrap();
    fs_err::remove_dir(root.root().join("test-generators/always")).unwrap();

    let output = root.cli().unchecked(true).output();

    assert_eq!(
        output.exit_status.code(),
        Some(IqlTestExitCode::SETUP_ERROR),
        "{output}"
    );
    assert!(
        output
            .stderr_as_str()
            .contains("failed to read generator directory"),
        "{output}"
    );
}
