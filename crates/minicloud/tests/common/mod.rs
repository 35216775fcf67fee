#![allow(deprecated)]

use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// A scratch directory with a minicloud.yaml using a file store
pub struct TestProject {
    pub root: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        fs::write(
            root.path().join("minicloud.yaml"),
            "store:\n  type: file\n  path: state\n",
        )
        .unwrap();
        Self { root }
    }

    pub fn config(&self) -> PathBuf {
        self.root.path().join("minicloud.yaml")
    }

    /// The binary, run inside the project with its configuration
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("minicloud").unwrap();
        cmd.current_dir(self.root.path())
            .env_remove("RUST_LOG")
            .env("MINICLOUD_CONFIG", self.config());
        cmd
    }
}
