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

mod context;

pub use context::ErrorContext;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AccelError {
    #[error("No credentials available")]
    NoCredentials,

    #[error("Cross-process lock '{name}' is held by another process")]
    LockUnavailable { name: String },

    #[error("Failed to acquire cross-process lock '{name}': {details}")]
    LockingAcquire { name: String, details: String },

    #[error("Failed to release cross-process lock '{name}': {details}")]
    LockingRelease { name: String, details: String },

    #[error("Failed to construct transfer engine: {0}")]
    EngineConstruction(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ::config::ConfigError),
}

pub type Result<T> = std::result::Result<T, AccelError>;
