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

//! Credential plumbing between the host client and the transfer engine.
//!
//! The host exposes an optional, pull-based [`CredentialResolver`]. The engine
//! wants a synchronous callable that hands back plain values on every request.
//! [`CredentialSnapshotAdapter`] bridges the two by resolving a fresh frozen
//! snapshot per invocation.

mod adapter;
mod resolver;

pub use adapter::{CredentialProvider, CredentialSnapshotAdapter, EngineCredentials};
pub use resolver::{
    CredentialResolver, CredentialSnapshot, EnvironmentCredentials, StaticCredentials,
};
