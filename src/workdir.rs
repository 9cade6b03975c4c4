// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Per-run scratch directory holding the kubeconfig and the deploy key.
//!
//! The directory is owned by exactly one run and removed when dropped.

use crate::constants::files;
use crate::error::Result;
use std::fs::OpenOptions;
use std::io::Write;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

pub struct WorkDir {
    dir: TempDir,
}

impl WorkDir {
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .suffix("-gitops-e2e")
            .tempdir()?;
        debug!("Created working directory {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write the raw kubeconfig for the command line tools
    pub fn write_kubeconfig(&self, kubeconfig: &str) -> Result<PathBuf> {
        write_file(&self.path().join(files::KUBECONFIG), kubeconfig, 0o750)
    }

    /// Write the SSH deploy key, readable by the owner only
    pub fn write_private_key(&self, key: &str) -> Result<PathBuf> {
        write_file(&self.path().join(files::PRIVATE_KEY), key, 0o600)
    }
}

fn write_file(path: &Path, contents: &str, mode: u32) -> Result<PathBuf> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(mode)
        .open(path)?;
    file.write_all(contents.as_bytes())?;
    Ok(path.to_path_buf())
}
