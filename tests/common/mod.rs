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

#![allow(dead_code)]

use accel_transfer::engine::{EngineBackend, EngineClient, EngineClientOptions, EngineFactory};
use accel_transfer::error::Result;
use accel_transfer::throughput::ThroughputAdvisor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub struct FakeClient {
    pub region: String,
}

impl EngineClient for FakeClient {
    fn describe(&self) -> String {
        format!("fake-engine({})", self.region)
    }
}

/// Backend that records every option set it is asked to build with.
#[derive(Default)]
pub struct RecordingBackend {
    options: Mutex<Vec<EngineClientOptions>>,
    calls: AtomicUsize,
}

impl RecordingBackend {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_options(&self) -> Option<EngineClientOptions> {
        self.options.lock().unwrap().last().cloned()
    }
}

impl EngineBackend for RecordingBackend {
    fn create_client(&self, options: EngineClientOptions) -> Result<Box<dyn EngineClient>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let region = options.region.clone();
        self.options.lock().unwrap().push(options);
        Ok(Box::new(FakeClient { region }))
    }
}

/// Advisor that counts how often the platform was queried.
pub struct CountingAdvisor {
    recommendation: Option<f64>,
    queries: AtomicUsize,
}

impl CountingAdvisor {
    pub fn new(recommendation: Option<f64>) -> Self {
        Self {
            recommendation,
            queries: AtomicUsize::new(0),
        }
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

impl ThroughputAdvisor for CountingAdvisor {
    fn recommended_throughput_gbps(&self) -> Option<f64> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.recommendation
    }
}

pub fn factory(backend: &Arc<RecordingBackend>, advisor: &Arc<CountingAdvisor>) -> EngineFactory {
    EngineFactory::new(backend.clone(), advisor.clone())
}
