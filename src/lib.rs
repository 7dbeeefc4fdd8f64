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

//! Bootstrap for an accelerated object-storage transfer engine.
//!
//! [`manager::ClientContext::transfer_manager`] decides once whether this process
//! may run the accelerated engine (guarded by a cross-process lock), builds it
//! with negotiated throughput and part size, and feeds it credentials through a
//! per-request snapshot adapter. `None` means: use the standard transfer path.

pub mod config;
pub mod credentials;
pub mod engine;
pub mod error;
pub mod locking;
pub mod logging;
pub mod manager;
pub mod throughput;
pub mod user_agent;

pub use config::{AccelConfig, TransferConfig};
pub use error::{AccelError, Result};
pub use manager::{ClientContext, TransferManagerCell, TransferManagerHandle};
