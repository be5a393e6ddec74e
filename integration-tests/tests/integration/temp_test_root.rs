// Copyright (c) The iqltest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use camino::{Utf8Path, Utf8PathBuf};
use camino_tempfile::Utf8TempDir;
use integration_tests::iqltest_cli::IqlTestCli;

/// Input files read by the simple suite.
const SIMPLE_SUITE_INPUTS: &[(&str, &str)] = &[
    (
        "describe-google-compute.iql",
        "DESCRIBE google.compute__v1.instances;\n",
    ),
    ("show-providers.iql", "SHOW PROVIDERS;\n"),
];

/// A scratch test root with the layout `iqltest` expects.
pub struct TempTestRoot {
    // Held for its Drop impl.
    _temp_dir: Utf8TempDir,
    root: Utf8PathBuf,
}

impl TempTestRoot {
    pub fn new() -> color_eyre::Result<Self> {
        let temp_dir = camino_tempfile::Builder::new()
            .prefix("iqltest-root-")
            .tempdir()?;
        let root = temp_dir.path().to_owned();

        fs_err::create_dir_all(root.join("test-generators/always"))?;
        fs_err::create_dir_all(root.join("inputs"))?;
        for (name, contents) in SIMPLE_SUITE_INPUTS {
            fs_err::write(root.join("inputs").join(name), contents)?;
        }

        Ok(Self {
            _temp_dir: temp_dir,
            root,
        })
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn assets_root(&self) -> Utf8PathBuf {
        self.root.join("assets")
    }

    /// Writes a generator file into `test-generators/<dir>`, creating the directory if needed.
    pub fn write_generator(&self, dir: &str, name: &str, contents: &str) -> color_eyre::Result<()> {
        let dir = self.root.join("test-generators").join(dir);
        fs_err::create_dir_all(&dir)?;
        fs_err::write(dir.join(name), contents)?;
        Ok(())
    }

    /// Returns an `iqltest` invocation pointed at this root and the fake query tool.
    pub fn cli(&self) -> IqlTestCli {
        let fake_iql = Utf8Path::new(env!("CARGO_BIN_EXE_fake-iql"));
        let rundir = fake_iql.parent().expect("fake-iql has a parent directory");
        let executable = fake_iql.file_name().expect("fake-iql has a file name");

        let mut cli = IqlTestCli::new(env!("CARGO_BIN_EXE_iqltest-dup"));
        cli.args([
            "--testroot",
            self.root.as_str(),
            "--rundir",
            rundir.as_str(),
            "--executable",
            executable,
        ]);
        cli
    }
}
