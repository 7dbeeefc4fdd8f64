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

//! One-shot bootstrap of the accelerated transfer manager.
//!
//! The first call decides, under a single mutex, whether the accelerated path
//! is used: it tries the cross-process lock, builds the engine and records the
//! terminal outcome. Every later call returns that outcome unchanged. A failed
//! construction is recorded as permanently unavailable; its lock is released
//! right away so another process can take over.

use crate::config::{AccelConfig, TransferConfig};
use crate::engine::{EngineBackend, EngineFactory, TransferEngine};
use crate::error::{AccelError, Result};
use crate::locking::{FileProcessLocker, LockName, ProcessLockHandle, ProcessLocker};
use crate::manager::context::ClientContext;
use log::{debug, info, warn};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// A live accelerated transfer manager.
///
/// Holds the process lock for as long as it exists. The engine is declared
/// first so it is dropped before the lock is released.
#[derive(Debug)]
pub struct TransferManagerHandle {
    engine: TransferEngine,
    lock: ProcessLockHandle,
    region: String,
}

impl TransferManagerHandle {
    pub fn engine(&self) -> &TransferEngine {
        &self.engine
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn lock_name(&self) -> &LockName {
        self.lock.name()
    }
}

/// Observable summary of the recorded bootstrap outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapStatus {
    Uninitialized,
    Ready,
    Disabled,
    Unavailable,
    Failed,
}

enum BootstrapState {
    Uninitialized,
    Ready(Arc<TransferManagerHandle>),
    Disabled,
    Unavailable,
    Failed(String),
}

impl BootstrapState {
    /// `None` while no attempt has been made yet.
    fn cached(&self) -> Option<Option<Arc<TransferManagerHandle>>> {
        match self {
            BootstrapState::Uninitialized => None,
            BootstrapState::Ready(handle) => Some(Some(Arc::clone(handle))),
            BootstrapState::Failed(reason) => {
                debug!("Accelerated transfer unavailable after earlier failure: {reason}");
                Some(None)
            }
            BootstrapState::Disabled | BootstrapState::Unavailable => Some(None),
        }
    }

    fn status(&self) -> BootstrapStatus {
        match self {
            BootstrapState::Uninitialized => BootstrapStatus::Uninitialized,
            BootstrapState::Ready(_) => BootstrapStatus::Ready,
            BootstrapState::Disabled => BootstrapStatus::Disabled,
            BootstrapState::Unavailable => BootstrapStatus::Unavailable,
            BootstrapState::Failed(_) => BootstrapStatus::Failed,
        }
    }
}

/// Records exactly one accelerated-path decision.
pub struct TransferManagerCell {
    locker: Arc<dyn ProcessLocker>,
    factory: EngineFactory,
    lock_name: LockName,
    enabled: bool,
    state: Mutex<BootstrapState>,
}

impl TransferManagerCell {
    pub fn new(locker: Arc<dyn ProcessLocker>, factory: EngineFactory) -> Self {
        Self {
            locker,
            factory,
            lock_name: LockName::default(),
            enabled: true,
            state: Mutex::new(BootstrapState::Uninitialized),
        }
    }

    /// Cell using file locks and the network throughput advisor as configured.
    pub fn from_config(config: &AccelConfig, backend: Arc<dyn EngineBackend>) -> Self {
        Self::new(
            Arc::new(FileProcessLocker::from_config(&config.locking)),
            EngineFactory::with_network_advisor(backend),
        )
        .with_lock_name(LockName::new(config.locking.lock_name.clone()))
        .with_enabled(config.enabled)
    }

    pub fn with_lock_name(mut self, lock_name: LockName) -> Self {
        self.lock_name = lock_name;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn status(&self) -> BootstrapStatus {
        self.lock_state().status()
    }

    /// Returns the manager, building it on the first call.
    ///
    /// `Ok(None)` means the accelerated path is unavailable for this cell's
    /// lifetime. Only the call that performs a failed construction sees the
    /// error; later calls get `Ok(None)`.
    pub fn get_manager(
        &self,
        context: &ClientContext,
        config: &TransferConfig,
    ) -> Result<Option<Arc<TransferManagerHandle>>> {
        let mut state = self.lock_state();
        if let Some(outcome) = state.cached() {
            return Ok(outcome);
        }

        // Stays recorded if the backend panics, so no second attempt is made.
        *state = BootstrapState::Failed("initialization panicked".to_string());
        match self.initialize(context, config) {
            Ok((next, outcome)) => {
                *state = next;
                Ok(outcome)
            }
            Err(err) => {
                warn!("Accelerated transfer manager construction failed: {err}");
                *state = BootstrapState::Failed(err.to_string());
                Err(err)
            }
        }
    }

    fn initialize(
        &self,
        context: &ClientContext,
        config: &TransferConfig,
    ) -> Result<(BootstrapState, Option<Arc<TransferManagerHandle>>)> {
        if !self.enabled {
            info!("Accelerated transfers disabled by configuration");
            return Ok((BootstrapState::Disabled, None));
        }

        let lock = match self.locker.acquire(&self.lock_name) {
            Ok(lock) => lock,
            Err(err @ AccelError::LockUnavailable { .. }) => {
                info!("{err}; using the standard transfer path");
                return Ok((BootstrapState::Unavailable, None));
            }
            Err(err) => {
                warn!(
                    "Could not acquire lock {}: {err}; using the standard transfer path",
                    self.lock_name
                );
                return Ok((BootstrapState::Unavailable, None));
            }
        };

        let engine = self.factory.build(
            context.session(),
            config,
            context.region(),
            context.credential_adapter(),
        )?;

        let handle = Arc::new(TransferManagerHandle {
            engine,
            lock,
            region: context.region().to_string(),
        });
        debug!(
            "Accelerated transfer manager ready for region {}",
            handle.region()
        );
        Ok((BootstrapState::Ready(Arc::clone(&handle)), Some(handle)))
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, BootstrapState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for TransferManagerCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferManagerCell")
            .field("lock_name", &self.lock_name)
            .field("enabled", &self.enabled)
            .field("status", &self.status())
            .finish()
    }
}
