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

use crate::user_agent;
use std::sync::Arc;

/// Host session used to serialize operation parameters into wire requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    profile: Option<String>,
    user_agent: String,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            profile: None,
            user_agent: user_agent::engine_client(),
        }
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    pub fn profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

/// Turns operation parameters into wire requests for the engine.
#[derive(Debug, Clone)]
pub struct RequestSerializer {
    session: Arc<Session>,
    region: String,
    endpoint_url: Option<String>,
}

impl RequestSerializer {
    /// The endpoint stays unset: a custom endpoint configured on the host client
    /// cannot be discovered from here.
    pub fn new(session: Arc<Session>, region: impl Into<String>) -> Self {
        Self {
            session,
            region: region.into(),
            endpoint_url: None,
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn endpoint_url(&self) -> Option<&str> {
        self.endpoint_url.as_deref()
    }

    /// Endpoint requests are sent to, falling back to the regional default.
    pub fn resolved_endpoint(&self) -> String {
        self.endpoint_url
            .clone()
            .unwrap_or_else(|| format!("https://s3.{}.amazonaws.com", self.region))
    }
}
