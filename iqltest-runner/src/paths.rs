// Copyright (c) The iqltest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The layout of a test root directory.

use crate::errors::PrepareOutputError;
use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, warn};

/// Paths derived from the test root.
#[derive(Clone, Debug)]
pub struct HarnessPaths {
    test_root: Utf8PathBuf,
}

impl HarnessPaths {
    /// Creates a new set of paths rooted at `test_root`.
    pub fn new(test_root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            test_root: test_root.into(),
        }
    }

    /// The directory holding generator directories.
    pub fn generators_root(&self) -> Utf8PathBuf {
        self.test_root.join("test-generators")
    }

    /// The generator directory that is run on every invocation.
    pub fn always_dir(&self) -> Utf8PathBuf {
        self.generators_root().join("always")
    }

    /// The directory that relative paths in generator records resolve against.
    pub fn assets_root(&self) -> Utf8PathBuf {
        self.test_root.join("assets")
    }

    /// Input files for the simple suite.
    pub fn inputs_dir(&self) -> Utf8PathBuf {
        self.test_root.join("inputs")
    }

    /// Output files for the simple suite.
    pub fn outputs_dir(&self) -> Utf8PathBuf {
        self.test_root.join("outputs")
    }

    /// The default provider root passed to the tool.
    pub fn default_provider_root(&self) -> Utf8PathBuf {
        self.test_root.join(".infraql")
    }

    /// The default config file passed to the tool.
    pub fn default_config_file(&self) -> Utf8PathBuf {
        self.test_root.join(".iqlrc")
    }

    /// The default database file passed to the tool.
    pub fn default_db_file(&self) -> Utf8PathBuf {
        self.test_root.join("db/tmp/python-tests-tmp-db.sqlite")
    }

    /// Resolves an additional generator directory. Relative paths resolve against the generators
    /// root.
    pub fn resolve_additional_dir(&self, dir: &Utf8Path) -> Utf8PathBuf {
        if dir.is_absolute() {
            dir.to_owned()
        } else {
            self.generators_root().join(dir)
        }
    }

    /// Prepares for a run: deletes stale `*.csv` files directly inside the assets root, and creates
    /// the outputs and assets directories if they're missing.
    ///
    /// A file that can't be deleted is logged and skipped.
    pub fn prepare_output_dirs(&self) -> Result<(), PrepareOutputError> {
        let assets_root = self.assets_root();
        if assets_root.is_dir() {
            let entries = assets_root
                .read_dir_utf8()
                .map_err(|err| PrepareOutputError::new(&assets_root, err))?;
            for entry in entries {
                let entry = entry.map_err(|err| PrepareOutputError::new(&assets_root, err))?;
                let path = entry.path();
                if path.extension() != Some("csv") {
                    continue;
                }
                match std::fs::remove_file(path) {
                    Ok(()) => debug!("deleted stale output file {path}"),
                    Err(err) => warn!("error while deleting file {path}: {err}"),
                }
            }
        }

        for dir in [self.outputs_dir(), assets_root] {
            std::fs::create_dir_all(&dir).map_err(|err| PrepareOutputError::new(&dir, err))?;
        }
        Ok(())
    }
}
