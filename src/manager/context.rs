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

use crate::config::TransferConfig;
use crate::credentials::{CredentialResolver, CredentialSnapshotAdapter};
use crate::engine::Session;
use crate::error::Result;
use crate::manager::cell::{TransferManagerCell, TransferManagerHandle};
use std::fmt;
use std::sync::Arc;

/// What the host client hands to the bootstrap: region, credentials, session and
/// the cell recording this client's accelerated-path decision.
pub struct ClientContext {
    region: String,
    credentials: Option<Arc<dyn CredentialResolver>>,
    session: Arc<Session>,
    manager: Arc<TransferManagerCell>,
}

impl ClientContext {
    pub fn new(
        region: impl Into<String>,
        credentials: Option<Arc<dyn CredentialResolver>>,
        manager: Arc<TransferManagerCell>,
    ) -> Self {
        Self {
            region: region.into(),
            credentials,
            session: Arc::new(Session::new()),
            manager,
        }
    }

    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Arc::new(session);
        self
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn credentials(&self) -> Option<&Arc<dyn CredentialResolver>> {
        self.credentials.as_ref()
    }

    pub fn credential_adapter(&self) -> CredentialSnapshotAdapter {
        CredentialSnapshotAdapter::new(self.credentials.clone())
    }

    pub fn manager_cell(&self) -> &Arc<TransferManagerCell> {
        &self.manager
    }

    /// Returns the accelerated transfer manager, or `None` when transfers must use
    /// the standard path.
    pub fn transfer_manager(
        &self,
        config: &TransferConfig,
    ) -> Result<Option<Arc<TransferManagerHandle>>> {
        self.manager.get_manager(self, config)
    }
}

impl fmt::Debug for ClientContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientContext")
            .field("region", &self.region)
            .field("has_credentials", &self.credentials.is_some())
            .field("session", &self.session)
            .field("manager", &self.manager.status())
            .finish()
    }
}
