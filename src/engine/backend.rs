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

use crate::credentials::CredentialProvider;
use crate::error::Result;
use std::fmt;

/// Everything the native engine is constructed with.
#[derive(Clone)]
pub struct EngineClientOptions {
    pub region: String,
    pub use_tls: bool,
    pub verify_peer: bool,
    pub target_throughput_bytes_per_sec: u64,
    /// `None` leaves the part size to the engine.
    pub part_size: Option<u64>,
    pub credential_provider: CredentialProvider,
}

impl fmt::Debug for EngineClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineClientOptions")
            .field("region", &self.region)
            .field("use_tls", &self.use_tls)
            .field("verify_peer", &self.verify_peer)
            .field(
                "target_throughput_bytes_per_sec",
                &self.target_throughput_bytes_per_sec,
            )
            .field("part_size", &self.part_size)
            .finish_non_exhaustive()
    }
}

/// A live native engine client.
pub trait EngineClient: Send + Sync {
    /// Short description used in logs.
    fn describe(&self) -> String;
}

/// Builds native engine clients.
pub trait EngineBackend: Send + Sync {
    fn create_client(&self, options: EngineClientOptions) -> Result<Box<dyn EngineClient>>;
}
