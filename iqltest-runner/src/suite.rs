// Copyright (c) The iqltest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The simple suite: a fixed list of statements every build of the tool must handle offline.

use crate::{
    invocation::{BaseInvocation, TestDefinition},
    output::OutputDestination,
    paths::HarnessPaths,
};

/// Matches a single-line JSON array.
pub const JSON_ARRAY_PATTERN: &str = r"^\[.*\]$";

const USE_GOOGLE: &str = "USE google;";

const STATEMENT_TESTS: &[(&str, &str)] = &[
    ("SHOW PROVIDERS;", "SHOW PROVIDERS"),
    ("SHOW SERVICES FROM google;", "SHOW SERVICES"),
    ("SHOW RESOURCES FROM google.compute__v1;", "SHOW RESOURCES"),
    (
        "USE google;; SHOW RESOURCES from google.compute;",
        "alt SHOW RESOURCES",
    ),
    ("SHOW EXTENDED PROVIDERS;", "SHOW EXTENDED PROVIDERS"),
    (
        "SHOW EXTENDED SERVICES FROM google;",
        "SHOW EXTENDED SERVICES",
    ),
    (
        "SHOW EXTENDED RESOURCES FROM google.compute;",
        "SHOW EXTENDED RESOURCES",
    ),
    (
        "USE google;; SHOW EXTENDED RESOURCES FROM google.compute;",
        "alt SHOW EXTENDED RESOURCES",
    ),
    (
        "DESCRIBE google.compute__v1.instances;",
        "DESCRIBE RESOURCE",
    ),
    (
        "DESCRIBE EXTENDED google.compute__v1.instances;",
        "DESCRIBE EXTENDED RESOURCE",
    ),
];

/// Returns the simple suite's tests, in run order.
pub fn simple_suite(
    base: &BaseInvocation,
    paths: &HarnessPaths,
    verbose: bool,
) -> Vec<TestDefinition> {
    let statement = |stmt: &str| {
        let mut invocation = base.invocation();
        invocation.args(["exec", "-o=json", stmt]);
        invocation
    };

    let mut tests = vec![
        TestDefinition::new(statement(USE_GOOGLE))
            .with_name("Verbose simple USE test + assertion")
            .with_verbose(verbose),
    ];
    tests.extend(STATEMENT_TESTS.iter().map(|&(stmt, label)| {
        TestDefinition::new(statement(stmt))
            .with_name(format!("Verbose simple {label} test + assertion"))
            .with_expected([JSON_ARRAY_PATTERN])
            .with_verbose(verbose)
    }));

    let inputs = paths.inputs_dir();
    let outputs = paths.outputs_dir();

    // Queries read from input files.
    let input_file_tests: [(&str, &str, Option<&str>, &str, &[&str], &str); 4] = [
        (
            "describe-google-compute.iql",
            "json",
            None,
            "describe-google-compute.json",
            &[JSON_ARRAY_PATTERN],
            "Verbose output file based DESCRIBE RESOURCE test + assertion",
        ),
        (
            "show-providers.iql",
            "json",
            None,
            "show-providers.json",
            &[JSON_ARRAY_PATTERN],
            "Verbose output file based SHOW PROVIDERS test + assertion",
        ),
        (
            "show-providers.iql",
            "csv",
            None,
            "show-providers.csv",
            &["name"],
            "Verbose output CSV file based SHOW PROVIDERS test + assertion",
        ),
        (
            "show-providers.iql",
            "csv",
            Some(";"),
            "show-providers-alt.csv",
            &["name", "google"],
            "Verbose output alt-delimited CSV file based SHOW PROVIDERS test + assertion",
        ),
    ];
    for (input, format, delimiter, output, expected, name) in input_file_tests {
        let output = outputs.join(output);
        let mut invocation = base.invocation();
        invocation.arg(format!("-o={format}"));
        if let Some(delimiter) = delimiter {
            invocation.arg(format!("-d={delimiter}"));
        }
        invocation
            .arg(format!("-i={}", inputs.join(input)))
            .arg(format!("-f={output}"))
            .arg("exec");
        tests.push(
            TestDefinition::new(invocation)
                .with_name(name)
                .with_expected(expected.iter().copied())
                .with_output(OutputDestination::File(output))
                .with_verbose(verbose),
        );
    }

    // Literal queries written to CSV files.
    let query_tests: [(Option<&str>, &str, &str, &[&str], &str); 4] = [
        (
            None,
            "show-services.csv",
            "SHOW EXTENDED SERVICES FROM google;",
            &["id,name,title,description"],
            "Verbose output CSV file based SHOW EXTENDED SERVICES test + assertion",
        ),
        (
            Some(";"),
            "show-services-alt.csv",
            "SHOW EXTENDED SERVICES FROM google;",
            &["id;name;title;description"],
            "Verbose output alt-delimited CSV file based SHOW EXTENDED SERVICES test + assertion",
        ),
        (
            Some(";"),
            "show-services-filtered-alt.csv",
            "show extended services where description like 'Provides natural language%' and version = 'v1'",
            &["id;name;title;description;version;preferred", "language__v1;.*"],
            "Verbose output, filtered, alt-delimited CSV file based SHOW EXTENDED SERVICES test + assertion",
        ),
        (
            Some(";"),
            "show-resources-filtered-alt.csv",
            "show extended resources from google.compute where name = 'resourcePolicies' and id like '%.resourcePol%';",
            &["name;id;title;description", "resourcePolicies;.*"],
            "Verbose output, filtered, alt-delimited CSV file based SHOW EXTENDED RESOURCES test + assertion",
        ),
    ];
    for (delimiter, output, query, expected, name) in query_tests {
        let output = outputs.join(output);
        let mut invocation = base.invocation();
        invocation.arg("-o=csv");
        if let Some(delimiter) = delimiter {
            invocation.arg(format!("-d={delimiter}"));
        }
        invocation.arg(format!("-f={output}")).args(["exec", query]);
        tests.push(
            TestDefinition::new(invocation)
                .with_name(name)
                .with_expected(expected.iter().copied())
                .with_output(OutputDestination::File(output))
                .with_verbose(verbose),
        );
    }

    tests
}
