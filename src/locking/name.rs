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

use crate::config::DEFAULT_LOCK_NAME;
use std::fmt;
use std::path::{Path, PathBuf};

const LOCK_EXTENSION: &str = "lock";

/// Identifier of a cross-process lock shared by every process using this library.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LockName(String);

impl LockName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the lock file path for this name inside `locks_dir`.
    pub fn lock_path(&self, locks_dir: &Path) -> PathBuf {
        locks_dir.join(format!("{}.{LOCK_EXTENSION}", self.0))
    }
}

impl Default for LockName {
    fn default() -> Self {
        Self::new(DEFAULT_LOCK_NAME)
    }
}

impl fmt::Display for LockName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
