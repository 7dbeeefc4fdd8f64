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
use crate::credentials::CredentialSnapshotAdapter;
use crate::engine::backend::{EngineBackend, EngineClient, EngineClientOptions};
use crate::engine::serializer::{RequestSerializer, Session};
use crate::error::{AccelError, Result};
use crate::throughput::{self, NetworkThroughputAdvisor, ThroughputAdvisor};
use log::debug;
use std::fmt;
use std::sync::Arc;

/// Engine client paired with the serializer that feeds it.
pub struct TransferEngine {
    client: Box<dyn EngineClient>,
    serializer: RequestSerializer,
}

impl TransferEngine {
    pub fn client(&self) -> &dyn EngineClient {
        self.client.as_ref()
    }

    pub fn serializer(&self) -> &RequestSerializer {
        &self.serializer
    }
}

impl fmt::Debug for TransferEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferEngine")
            .field("client", &self.client.describe())
            .field("serializer", &self.serializer)
            .finish()
    }
}

/// Builds [`TransferEngine`]s from host configuration.
#[derive(Clone)]
pub struct EngineFactory {
    backend: Arc<dyn EngineBackend>,
    advisor: Arc<dyn ThroughputAdvisor>,
}

impl EngineFactory {
    pub fn new(backend: Arc<dyn EngineBackend>, advisor: Arc<dyn ThroughputAdvisor>) -> Self {
        Self { backend, advisor }
    }

    pub fn with_network_advisor(backend: Arc<dyn EngineBackend>) -> Self {
        Self::new(backend, Arc::new(NetworkThroughputAdvisor::new()))
    }

    /// Negotiates parameters and constructs the engine client and serializer.
    ///
    /// Backend failures are returned as [`AccelError::EngineConstruction`]; nothing
    /// is retried here.
    pub fn build(
        &self,
        session: &Arc<Session>,
        config: &TransferConfig,
        region: &str,
        credentials: CredentialSnapshotAdapter,
    ) -> Result<TransferEngine> {
        if region.trim().is_empty() {
            return Err(AccelError::EngineConstruction(
                "region must be set".to_string(),
            ));
        }

        let negotiated =
            throughput::negotiate(config, self.advisor.recommended_throughput_gbps());

        let options = EngineClientOptions {
            region: region.to_string(),
            use_tls: true,
            verify_peer: false,
            target_throughput_bytes_per_sec: negotiated.target_throughput_bytes_per_sec,
            part_size: negotiated.part_size,
            credential_provider: credentials.into_provider(),
        };
        debug!("Creating engine client with {options:?}");

        let client = self
            .backend
            .create_client(options)
            .map_err(|err| match err {
                err @ AccelError::EngineConstruction(_) => err,
                other => AccelError::EngineConstruction(other.to_string()),
            })?;

        let serializer = RequestSerializer::new(Arc::clone(session), region);
        debug!(
            "Engine client {} ready for region {region}",
            client.describe()
        );

        Ok(TransferEngine { client, serializer })
    }
}

impl fmt::Debug for EngineFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineFactory").finish_non_exhaustive()
    }
}
