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

use crate::credentials::resolver::{CredentialResolver, CredentialSnapshot};
use crate::error::{AccelError, Result};
use log::trace;
use std::fmt;
use std::sync::Arc;

/// Plain credential record handed to the engine on each request.
///
/// Field names and order are the engine's contract and must not change.
#[derive(Clone, PartialEq, Eq)]
pub struct EngineCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl From<CredentialSnapshot> for EngineCredentials {
    fn from(snapshot: CredentialSnapshot) -> Self {
        Self {
            access_key_id: snapshot.access_key().to_string(),
            secret_access_key: snapshot.secret_key().to_string(),
            session_token: snapshot.token().map(str::to_string),
        }
    }
}

impl fmt::Debug for EngineCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"** redacted **")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "** redacted **"),
            )
            .finish()
    }
}

/// Synchronous per-request credential callback consumed by the engine.
pub type CredentialProvider = Arc<dyn Fn() -> Result<EngineCredentials> + Send + Sync>;

/// Wraps an optional resolver and produces a fresh [`EngineCredentials`] on every call.
#[derive(Clone)]
pub struct CredentialSnapshotAdapter {
    resolver: Option<Arc<dyn CredentialResolver>>,
}

impl CredentialSnapshotAdapter {
    pub fn new(resolver: Option<Arc<dyn CredentialResolver>>) -> Self {
        Self { resolver }
    }

    /// Resolves the current snapshot and converts it for the engine.
    pub fn call(&self) -> Result<EngineCredentials> {
        let snapshot = self.resolver()?.frozen_credentials()?;
        trace!("Resolved a fresh credential snapshot for the engine");
        Ok(snapshot.into())
    }

    /// Returns the wrapped resolver without fetching credentials.
    pub fn load_credentials(&self) -> Result<Arc<dyn CredentialResolver>> {
        self.resolver().map(Arc::clone)
    }

    pub fn has_resolver(&self) -> bool {
        self.resolver.is_some()
    }

    /// Converts the adapter into the callable form the engine stores.
    pub fn into_provider(self) -> CredentialProvider {
        Arc::new(move || self.call())
    }

    fn resolver(&self) -> Result<&Arc<dyn CredentialResolver>> {
        self.resolver.as_ref().ok_or(AccelError::NoCredentials)
    }
}

impl fmt::Debug for CredentialSnapshotAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSnapshotAdapter")
            .field("has_resolver", &self.has_resolver())
            .finish()
    }
}
