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

//! Construction of the native transfer engine and its request serializer.
//!
//! The engine itself lives behind [`EngineBackend`] / [`EngineClient`]; this
//! module only decides what it is built with.

mod backend;
mod factory;
mod serializer;

pub use backend::{EngineBackend, EngineClient, EngineClientOptions};
pub use factory::{EngineFactory, TransferEngine};
pub use serializer::{RequestSerializer, Session};
