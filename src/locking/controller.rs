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

use crate::config::LockingConfig;
use crate::error::{AccelError, Result};
use crate::locking::handle::ProcessLockHandle;
use crate::locking::name::LockName;
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions, TryLockError};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Acquires the named cross-process lock without waiting.
///
/// `Ok(None)` means the lock is held by someone else or the platform cannot lock;
/// callers treat both as "use the standard transfer path".
pub trait ProcessLocker: Send + Sync {
    fn try_acquire(&self, name: &LockName) -> Result<Option<ProcessLockHandle>>;

    /// Like [`ProcessLocker::try_acquire`], but reports contention as
    /// [`AccelError::LockUnavailable`].
    fn acquire(&self, name: &LockName) -> Result<ProcessLockHandle> {
        self.try_acquire(name)?
            .ok_or_else(|| AccelError::LockUnavailable {
                name: name.to_string(),
            })
    }
}

/// Diagnostic metadata written into the lock file by the current holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockLease {
    pub name: String,
    pub pid: u32,
    pub acquired_at: DateTime<Utc>,
}

/// Advisory file locks under a locks directory.
#[derive(Debug, Clone)]
pub struct FileProcessLocker {
    locks_dir: PathBuf,
}

impl FileProcessLocker {
    pub fn new<P: Into<PathBuf>>(locks_dir: P) -> Self {
        Self {
            locks_dir: locks_dir.into(),
        }
    }

    pub fn from_config(config: &LockingConfig) -> Self {
        Self::new(config.resolved_locks_dir())
    }

    pub fn locks_dir(&self) -> &Path {
        &self.locks_dir
    }

    /// Reads the lease left by the last holder of `name`, if any.
    pub fn current_holder(&self, name: &LockName) -> Result<Option<LockLease>> {
        let lock_path = name.lock_path(&self.locks_dir);
        reject_symlink(&lock_path)?;
        let contents = match fs::read_to_string(&lock_path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        if contents.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&contents)?))
    }

    fn prepare_lock_file(&self, lock_path: &Path) -> io::Result<File> {
        fs::create_dir_all(&self.locks_dir)?;
        reject_symlink(lock_path)?;

        let mut options = OpenOptions::new();
        options.read(true).write(true).create(true).truncate(false);

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            // O_NOFOLLOW closes the gap between the symlink check and the open.
            options.mode(0o600).custom_flags(libc::O_NOFOLLOW);
        }

        let file = options.open(lock_path)?;
        if !file.metadata()?.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", lock_path.display()),
            ));
        }

        Ok(file)
    }

    fn write_lease(file: &mut File, name: &LockName) -> io::Result<()> {
        let lease = LockLease {
            name: name.to_string(),
            pid: std::process::id(),
            acquired_at: Utc::now(),
        };
        let payload =
            serde_json::to_vec_pretty(&lease).map_err(|err| io::Error::other(err.to_string()))?;

        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(&payload)?;
        file.sync_all()
    }
}

impl ProcessLocker for FileProcessLocker {
    fn try_acquire(&self, name: &LockName) -> Result<Option<ProcessLockHandle>> {
        let lock_path = name.lock_path(&self.locks_dir);
        let mut file =
            self.prepare_lock_file(&lock_path)
                .map_err(|err| AccelError::LockingAcquire {
                    name: name.to_string(),
                    details: format!("Failed to open lock file {}: {err}", lock_path.display()),
                })?;

        let acquisition_start = Instant::now();
        match file.try_lock() {
            Ok(()) => {}
            Err(TryLockError::WouldBlock) => {
                info!(
                    "Lock {name} at {} is held by another process",
                    lock_path.display()
                );
                return Ok(None);
            }
            Err(TryLockError::Error(err)) if err.kind() == io::ErrorKind::Unsupported => {
                info!(
                    "Advisory locking unsupported for {name} at {}",
                    lock_path.display()
                );
                return Ok(None);
            }
            Err(TryLockError::Error(err)) => {
                return Err(AccelError::LockingAcquire {
                    name: name.to_string(),
                    details: err.to_string(),
                });
            }
        }

        if let Err(err) = Self::write_lease(&mut file, name) {
            debug!(
                "Failed to record lease metadata in {}: {err}",
                lock_path.display()
            );
        }

        debug!("Acquired lock {name} at {}", lock_path.display());
        Ok(Some(ProcessLockHandle::new(
            name.clone(),
            lock_path,
            file,
            acquisition_start,
        )))
    }
}

fn reject_symlink(path: &Path) -> io::Result<()> {
    match fs::symlink_metadata(path) {
        Ok(metadata) if metadata.file_type().is_symlink() => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("refusing to use symlinked lock file {}", path.display()),
        )),
        Ok(_) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}
