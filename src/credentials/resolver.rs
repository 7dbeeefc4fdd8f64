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
use std::env;
use std::fmt;

const ACCESS_KEY_ENV: &str = "AWS_ACCESS_KEY_ID";
const SECRET_KEY_ENV: &str = "AWS_SECRET_ACCESS_KEY";
const SESSION_TOKEN_ENV: &str = "AWS_SESSION_TOKEN";

/// Immutable point-in-time copy of access credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialSnapshot {
    access_key: String,
    secret_key: String,
    token: Option<String>,
}

impl CredentialSnapshot {
    pub fn new(
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        token: Option<String>,
    ) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            token,
        }
    }

    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

impl fmt::Debug for CredentialSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSnapshot")
            .field("access_key", &self.access_key)
            .field("secret_key", &"** redacted **")
            .field("token", &self.token.as_ref().map(|_| "** redacted **"))
            .finish()
    }
}

/// Source of credentials that may rotate over time.
///
/// Implementations must return the credentials valid at the moment of the call;
/// callers never cache the result.
pub trait CredentialResolver: Send + Sync {
    fn frozen_credentials(&self) -> Result<CredentialSnapshot>;
}

/// Resolver that always returns the same snapshot.
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    snapshot: CredentialSnapshot,
}

impl StaticCredentials {
    pub fn new(
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        token: Option<String>,
    ) -> Self {
        Self {
            snapshot: CredentialSnapshot::new(access_key, secret_key, token),
        }
    }
}

impl CredentialResolver for StaticCredentials {
    fn frozen_credentials(&self) -> Result<CredentialSnapshot> {
        Ok(self.snapshot.clone())
    }
}

/// Resolver reading the standard AWS environment variables on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvironmentCredentials;

impl EnvironmentCredentials {
    pub fn new() -> Self {
        Self
    }
}

impl CredentialResolver for EnvironmentCredentials {
    fn frozen_credentials(&self) -> Result<CredentialSnapshot> {
        let access_key = non_empty_var(ACCESS_KEY_ENV).ok_or(AccelError::NoCredentials)?;
        let secret_key = non_empty_var(SECRET_KEY_ENV).ok_or(AccelError::NoCredentials)?;
        Ok(CredentialSnapshot::new(
            access_key,
            secret_key,
            non_empty_var(SESSION_TOKEN_ENV),
        ))
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}
