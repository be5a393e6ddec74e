// Copyright (c) The iqltest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A stand-in for the infraql query tool, used by iqltest's integration tests.
//!
//! It understands the same command line shape as the real tool and prints canned results:
//! - `-o=json` prints a single-line JSON array holding the query and the `--loglevel` passed in.
//! - `-o=csv` prints a header and one row, joined by the `-d` delimiter (default `,`).
//! - `-f=<path>` writes the result to `<path>` instead of stdout, unless `<path>` is `stdout`.
//! - `-i=<path>` reads the query from `<path>`.
//!
//! A query containing `FAIL` prints an error to stderr and exits with code 1. `USE` statements
//! print nothing. The tool also exits with code 2 if it isn't run with `--offline`.

use std::{io::Write, process::exit};

#[derive(Debug, Default)]
struct Args {
    offline: bool,
    output_format: Option<String>,
    delimiter: Option<String>,
    output_file: Option<String>,
    input_file: Option<String>,
    loglevel: Option<String>,
    positional: Vec<String>,
}

impl Args {
    fn parse() -> Self {
        let mut args = Args::default();
        for arg in std::env::args().skip(1) {
            if arg == "--offline" {
                args.offline = true;
            } else if let Some(value) = arg.strip_prefix("-o=") {
                args.output_format = Some(value.to_owned());
            } else if let Some(value) = arg.strip_prefix("-d=") {
                args.delimiter = Some(value.to_owned());
            } else if let Some(value) = arg.strip_prefix("-f=") {
                args.output_file = Some(value.to_owned());
            } else if let Some(value) = arg.strip_prefix("-i=") {
                args.input_file = Some(value.to_owned());
            } else if let Some(value) = arg.strip_prefix("--loglevel=") {
                args.loglevel = Some(value.to_owned());
            } else if arg.starts_with('-') {
                // Other flags are accepted and ignored.
            } else {
                args.positional.push(arg);
            }
        }
        args
    }
}

fn main() {
    let args = Args::parse();
    if !args.offline {
        eprintln!("fake-iql: --offline not passed");
        exit(2);
    }

    // The first positional argument is the instruction, and the second is the query.
    let query = match (&args.input_file, args.positional.get(1)) {
        (_, Some(query)) => query.clone(),
        (Some(input_file), None) => match fs_err::read_to_string(input_file) {
            Ok(query) => query.trim().to_owned(),
            Err(err) => {
                eprintln!("fake-iql: {err}");
                exit(1);
            }
        },
        (None, None) => {
            eprintln!("fake-iql: no query");
            exit(1);
        }
    };

    if query.contains("FAIL") {
        println!("fake-iql: running query");
        eprintln!("fake-iql: simulated failure for `{query}`");
        exit(1);
    }

    let lowered = query.to_lowercase();
    if lowered.starts_with("use ") && !lowered.contains(";;") {
        return;
    }

    let result = match args.output_format.as_deref().unwrap_or("json") {
        "csv" => {
            let delimiter = args.delimiter.as_deref().unwrap_or(",");
            let (header, row) = csv_table(&lowered, &query);
            format!("{}\n{}\n", header.join(delimiter), row.join(delimiter))
        }
        _ => {
            let loglevel = args.loglevel.as_deref().unwrap_or("");
            format!("[{{\"query\":{query:?},\"loglevel\":{loglevel:?}}}]\n")
        }
    };

    match args.output_file.as_deref() {
        None | Some("stdout") => {
            let mut stdout = std::io::stdout().lock();
            if let Err(err) = stdout.write_all(result.as_bytes()) {
                eprintln!("fake-iql: {err}");
                exit(1);
            }
        }
        Some(path) => {
            if let Err(err) = fs_err::write(path, result) {
                eprintln!("fake-iql: {err}");
                exit(1);
            }
        }
    }
}

fn csv_table(lowered: &str, query: &str) -> (Vec<&'static str>, Vec<String>) {
    if lowered.contains("show providers") {
        (vec!["name"], owned(&["google"]))
    } else if lowered.contains("show extended services") && lowered.contains(" where ") {
        (
            vec!["id", "name", "title", "description", "version", "preferred"],
            owned(&[
                "language__v1",
                "language",
                "Cloud Natural Language API",
                "Provides natural language understanding technologies.",
                "v1",
                "true",
            ]),
        )
    } else if lowered.contains("show extended services") {
        (
            vec!["id", "name", "title", "description"],
            owned(&[
                "compute__v1",
                "compute",
                "Compute Engine API",
                "Creates VMs.",
            ]),
        )
    } else if lowered.contains("show extended resources") {
        (
            vec!["name", "id", "title", "description"],
            owned(&[
                "resourcePolicies",
                "google.compute.resourcePolicies",
                "Resource Policies",
                "Scheduling policies.",
            ]),
        )
    } else {
        (vec!["query"], vec![query.to_owned()])
    }
}

fn owned(row: &[&str]) -> Vec<String> {
    row.iter().map(|&s| s.to_owned()).collect()
}
