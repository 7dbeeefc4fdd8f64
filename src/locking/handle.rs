// Copyright 2025 dentsusoken
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::error::{AccelError, Result};
use crate::locking::name::LockName;
use log::{debug, warn};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Holds an exclusive advisory lock on the named lock file until released or dropped.
#[derive(Debug)]
pub struct ProcessLockHandle {
    name: LockName,
    path: PathBuf,
    file: Option<File>,
    acquired_at: Instant,
}

impl ProcessLockHandle {
    pub(crate) fn new(name: LockName, path: PathBuf, file: File, acquired_at: Instant) -> Self {
        Self {
            name,
            path,
            file: Some(file),
            acquired_at,
        }
    }

    pub fn name(&self) -> &LockName {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_held(&self) -> bool {
        self.file.is_some()
    }

    pub fn release(mut self) -> Result<()> {
        self.release_inner()
    }

    fn release_inner(&mut self) -> Result<()> {
        let Some(file) = self.file.take() else {
            return Ok(());
        };

        if let Err(err) = file.unlock() {
            warn!(
                "Failed to release lock {} ({}): {err}",
                self.name,
                self.path.display()
            );
            return Err(AccelError::LockingRelease {
                name: self.name.to_string(),
                details: err.to_string(),
            });
        }

        debug!(
            "Released lock {} after {:.3}s",
            self.name,
            self.acquired_at.elapsed().as_secs_f64()
        );
        Ok(())
    }
}

impl Drop for ProcessLockHandle {
    fn drop(&mut self) {
        // Errors are already logged; nothing else can be done during drop.
        let _ = self.release_inner();
    }
}
