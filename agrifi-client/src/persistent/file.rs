// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use super::Persist;

/// An implementation of [`Persist`] based on a JSON file.
#[derive(derive_more::Deref)]
pub struct File<T> {
    path: PathBuf,
    #[deref]
    value: T,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl<T: Serialize + DeserializeOwned> File<T> {
    /// Reads the value stored at `path`, or creates the file with the value returned
    /// by `value` if it doesn't exist yet.
    pub fn read_or_create(path: &Path, value: impl FnOnce() -> T) -> Result<Self, Error> {
        if path.exists() {
            return Self::read(path);
        }
        let mut this = Self {
            path: path.to_owned(),
            value: value(),
        };
        this.write()?;
        Ok(this)
    }

    /// Reads the value stored at `path`.
    pub fn read(path: &Path) -> Result<Self, Error> {
        let contents = fs_err::read(path)?;
        Ok(Self {
            path: path.to_owned(),
            value: serde_json::from_slice(&contents)?,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&mut self) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                tracing::debug!("{} does not exist, creating", parent.display());
                fs_err::create_dir_all(parent)?;
            }
        }
        let temporary = self.path.with_extension("json.tmp");
        fs_err::write(&temporary, serde_json::to_vec_pretty(&self.value)?)?;
        fs_err::rename(&temporary, &self.path)?;
        Ok(())
    }
}

impl<T: Serialize + DeserializeOwned> Persist for File<T> {
    type Error = Error;

    fn as_mut(&mut self) -> &mut T {
        &mut self.value
    }

    async fn persist(&mut self) -> Result<(), Error> {
        self.write()
    }

    fn into_value(self) -> T {
        self.value
    }
}
