// Copyright (c) The iqltest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turning generator files into tests.

use crate::{
    errors::{GeneratorError, GeneratorRecordError},
    invocation::{BaseInvocation, ExecArgs, QuerySource, TestDefinition},
    output::OutputDestination,
};
use camino::{Utf8Path, Utf8PathBuf};
use iqltest_metadata::{GeneratorFile, GeneratorRecord};
use std::collections::BTreeSet;
use tracing::warn;

/// A generator file found in a generator directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratorFileEntry {
    /// The file name, used to name tests and default output files.
    pub name: String,

    /// The full path to the file.
    pub path: Utf8PathBuf,
}

/// Lists the `.json` files directly inside `dir`, sorted by file name.
pub fn list_generator_files(dir: &Utf8Path) -> Result<Vec<GeneratorFileEntry>, GeneratorError> {
    let read_dir_err = |err| GeneratorError::ReadDir {
        dir: dir.to_owned(),
        err,
    };

    let mut entries = Vec::new();
    for entry in dir.read_dir_utf8().map_err(read_dir_err)? {
        let entry = entry.map_err(read_dir_err)?;
        let file_type = entry.file_type().map_err(read_dir_err)?;
        if !file_type.is_file() || entry.path().extension() != Some("json") {
            continue;
        }
        entries.push(GeneratorFileEntry {
            name: entry.file_name().to_owned(),
            path: entry.path().to_owned(),
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Reads and parses a generator file.
///
/// Unknown keys are not an error: each is logged as a warning.
pub fn read_generator_file(path: &Utf8Path) -> Result<GeneratorFile, GeneratorError> {
    let contents = std::fs::read_to_string(path).map_err(|err| GeneratorError::ReadFile {
        path: path.to_owned(),
        err,
    })?;

    let mut ignored = BTreeSet::new();
    let mut cb = |path: serde_ignored::Path| {
        ignored.insert(path.to_string());
    };
    let mut deserializer = serde_json::Deserializer::from_str(&contents);
    let ignored_de = serde_ignored::Deserializer::new(&mut deserializer, &mut cb);
    let file: GeneratorFile = serde_path_to_error::deserialize(ignored_de)
        .map_err(|err| GeneratorError::ParseFile {
            path: path.to_owned(),
            err,
        })?;

    if !ignored.is_empty() {
        let keys = ignored.into_iter().collect::<Vec<_>>().join(", ");
        warn!("in generator file {path}, ignoring unknown keys: {keys}");
    }
    Ok(file)
}

/// Expands generator records into test definitions.
#[derive(Clone, Debug)]
pub struct GeneratorExpander<'a> {
    base: &'a BaseInvocation,
    assets_root: &'a Utf8Path,
}

impl<'a> GeneratorExpander<'a> {
    /// Creates a new expander. Relative paths in records are resolved against `assets_root`.
    pub fn new(base: &'a BaseInvocation, assets_root: &'a Utf8Path) -> Self {
        Self { base, assets_root }
    }

    /// Expands the record at `index` in the generator file `file_name`.
    ///
    /// Returns an error if the record has neither a query nor an input file.
    pub fn expand(
        &self,
        file_name: &str,
        index: usize,
        record: &GeneratorRecord,
    ) -> Result<TestDefinition, GeneratorRecordError> {
        let source = if let Some(query) = record.query() {
            QuerySource::Query(query.to_owned())
        } else if let Some(input_file) = record.input_file() {
            QuerySource::InputFile {
                path: self.resolve(input_file),
                template_context: record.external_tmpl_ctx_file().map(|f| self.resolve(f)),
            }
        } else {
            return Err(GeneratorRecordError::new(file_name, index));
        };

        let mut invocation = self.base.invocation();
        if let Some(value) = record.testwitoutapicalls() {
            invocation.arg(format!("--testwitoutapicalls={value}"));
        }
        if let Some(keyfilepath) = record.keyfilepath() {
            invocation.arg(format!("--keyfilepath={}", self.resolve(keyfilepath)));
        }
        if let Some(iqldata) = record.iqldata() {
            invocation.arg(format!("--iqldata={}", self.resolve(iqldata)));
        }
        if record.headless {
            invocation.arg("-H");
        }
        if record.dry_run {
            invocation.arg("--dryrun");
        }

        let output = if record.is_stdout_output() {
            OutputDestination::Captured
        } else {
            let path = match record.output_file() {
                Some(output_file) => self.resolve(output_file),
                None => {
                    let default_name = format!("{file_name}_{index}.{}", record.output_format());
                    self.assets_root.join(default_name)
                }
            };
            OutputDestination::File(path)
        };
        let output_file = match &output {
            OutputDestination::Captured => GeneratorRecord::STDOUT.to_owned(),
            OutputDestination::File(path) => path.to_string(),
        };

        invocation.exec_args(&ExecArgs {
            output_format: record.output_format().to_owned(),
            delimiter: Some(record.delimiter().to_owned()),
            output_file: Some(output_file),
            instruction: record.instruction().to_owned(),
            source,
        });

        let name = match &record.name {
            Some(name) => format!("{file_name}: {name}"),
            None => format!("{file_name}: #{index}"),
        };
        Ok(TestDefinition::new(invocation)
            .with_name(name)
            .with_expected(record.expected.iter().cloned())
            .with_output(output)
            .with_verbose(record.verbose))
    }

    fn resolve(&self, path: &str) -> Utf8PathBuf {
        let path = Utf8Path::new(path);
        if path.is_absolute() {
            path.to_owned()
        } else {
            self.assets_root.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino_tempfile::tempdir;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    const BASE_ARGS: [&str; 5] = [
        "--configfile=/t/.iqlrc",
        "--offline",
        "--providerroot=/t/.infraql",
        "--loglevel=warn",
        "--dbfilepath=/t/db.sqlite",
    ];

    fn base() -> BaseInvocation {
        BaseInvocation::new(
            "/build/infraql",
            "/t/.iqlrc",
            "/t/.infraql",
            "warn",
            "/t/db.sqlite",
        )
    }

    fn record(json: &str) -> GeneratorRecord {
        serde_json::from_str(json).expect("valid record")
    }

    fn args_after_base(definition: &TestDefinition) -> Vec<String> {
        let args = definition.invocation.get_args();
        assert_eq!(&args[..BASE_ARGS.len()], BASE_ARGS);
        args[BASE_ARGS.len()..].to_vec()
    }

    #[test]
    fn expand_query_with_defaults() {
        let base = base();
        let expander = GeneratorExpander::new(&base, Utf8Path::new("/t/assets"));
        let definition = expander
            .expand(
                "providers.json",
                0,
                &record(r#"{"query": "SHOW PROVIDERS;"}"#),
            )
            .expect("record is valid");

        assert_eq!(definition.name.as_deref(), Some("providers.json: #0"));
        assert_eq!(
            args_after_base(&definition),
            [
                "-o=csv",
                "-d=,",
                "-f=/t/assets/providers.json_0.csv",
                "exec",
                "SHOW PROVIDERS;",
            ]
        );
        assert_eq!(
            definition.output,
            OutputDestination::File("/t/assets/providers.json_0.csv".into())
        );
        assert!(definition.expected.is_empty());
        assert!(!definition.verbose);
    }

    #[test]
    fn expand_input_file_with_everything() {
        let base = base();
        let expander = GeneratorExpander::new(&base, Utf8Path::new("/t/assets"));
        let record = record(indoc! {r#"
            {
                "name": "templated",
                "input_file": "input/query.iql",
                "external_tmpl_ctx_file": "input/vars.jsonnet",
                "output": "json",
                "delimiter": ";",
                "output_file": "stdout",
                "expected": ["^\\[.*\\]$"],
                "verbose": true,
                "headless": true,
                "dry_run": true,
                "keyfilepath": "credentials/dummy.json",
                "iqldata": "/abs/data.json",
                "testwitoutapicalls": "1"
            }
        "#});
        let definition = expander
            .expand("templates.json", 3, &record)
            .expect("record is valid");

        assert_eq!(
            definition.name.as_deref(),
            Some("templates.json: templated")
        );
        assert_eq!(
            args_after_base(&definition),
            [
                "--testwitoutapicalls=1",
                "--keyfilepath=/t/assets/credentials/dummy.json",
                "--iqldata=/abs/data.json",
                "-H",
                "--dryrun",
                "-o=json",
                "-d=;",
                "-f=stdout",
                "exec",
                "-i=/t/assets/input/query.iql",
                "-q=/t/assets/input/vars.jsonnet",
            ]
        );
        assert_eq!(definition.output, OutputDestination::Captured);
        assert_eq!(definition.expected, [r"^\[.*\]$"]);
        assert!(definition.verbose);
    }

    #[test]
    fn query_takes_precedence_over_input_file() {
        let base = base();
        let expander = GeneratorExpander::new(&base, Utf8Path::new("/t/assets"));
        let definition = expander
            .expand(
                "a.json",
                0,
                &record(r#"{"query": "SELECT 1;", "input_file": "q.iql", "instruction": "shell"}"#),
            )
            .expect("record is valid");
        let args = args_after_base(&definition);
        assert_eq!(args[args.len() - 2..], ["shell", "SELECT 1;"]);
    }

    #[test]
    fn falsy_flags_are_omitted() {
        let base = base();
        let expander = GeneratorExpander::new(&base, Utf8Path::new("/t/assets"));
        let definition = expander
            .expand(
                "a.json",
                0,
                &record(r#"{"query": "q", "testwitoutapicalls": false, "keyfilepath": ""}"#),
            )
            .expect("record is valid");
        assert_eq!(args_after_base(&definition)[0], "-o=csv");
    }

    #[test]
    fn record_without_query_or_input_is_rejected() {
        let base = base();
        let expander = GeneratorExpander::new(&base, Utf8Path::new("/t/assets"));
        let err = expander
            .expand("broken.json", 2, &record(r#"{"name": "nothing to run"}"#))
            .expect_err("record is invalid");
        assert_eq!(err.file_name(), "broken.json");
        assert_eq!(err.index(), 2);
    }

    #[test]
    fn list_and_read_files() {
        let dir = tempdir().expect("created temp dir");
        std::fs::write(dir.path().join("b.json"), r#"{"integration_tests": []}"#)
            .expect("wrote b.json");
        std::fs::write(
            dir.path().join("a.json"),
            r#"{"integration_tests": [{"query": "q", "colour": "blue"}]}"#,
        )
        .expect("wrote a.json");
        std::fs::write(dir.path().join("notes.txt"), "not a generator").expect("wrote notes.txt");
        std::fs::create_dir(dir.path().join("nested.json")).expect("created nested dir");

        let entries = list_generator_files(dir.path()).expect("listed generator files");
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["a.json", "b.json"]);

        let file = read_generator_file(&entries[0].path).expect("a.json is valid");
        assert_eq!(file.records().len(), 1);
        assert_eq!(file.records()[0].query(), Some("q"));
    }

    #[test]
    fn parse_error_has_path() {
        let dir = tempdir().expect("created temp dir");
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"integration_tests": [{"expected": "not a list"}]}"#)
            .expect("wrote bad.json");

        match read_generator_file(&path) {
            Err(GeneratorError::ParseFile { err, .. }) => {
                assert_eq!(err.path().to_string(), "integration_tests[0].expected");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn missing_dir() {
        let dir = tempdir().expect("created temp dir");
        let missing = dir.path().join("missing");
        assert!(matches!(
            list_generator_files(&missing),
            Err(GeneratorError::ReadDir { .. })
        ));
    }
}
