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

mod common;

use accel_transfer::config::{AccelConfig, TransferConfig};
use accel_transfer::credentials::{CredentialResolver, CredentialSnapshot, StaticCredentials};
use accel_transfer::error::{AccelError, Result};
use accel_transfer::locking::{FileProcessLocker, LockName};
use accel_transfer::manager::{BootstrapStatus, ClientContext, TransferManagerCell};
use common::{CountingAdvisor, RecordingBackend, factory};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use tempfile::TempDir;

fn static_credentials() -> Option<Arc<dyn CredentialResolver>> {
    Some(Arc::new(StaticCredentials::new("AKID", "SECRET", None)))
}

fn file_cell(
    locks_dir: &std::path::Path,
    backend: &Arc<RecordingBackend>,
    advisor: &Arc<CountingAdvisor>,
) -> Arc<TransferManagerCell> {
    Arc::new(TransferManagerCell::new(
        Arc::new(FileProcessLocker::new(locks_dir)),
        factory(backend, advisor),
    ))
}

#[test]
fn bootstrap_negotiates_recommended_throughput() {
    let temp = TempDir::new().unwrap();
    let backend = Arc::new(RecordingBackend::default());
    let advisor = Arc::new(CountingAdvisor::new(Some(20.0)));
    let context = ClientContext::new(
        "us-east-1",
        static_credentials(),
        file_cell(temp.path(), &backend, &advisor),
    );
    let config = TransferConfig::new().with_multipart_chunksize(8_388_608);

    let manager = context.transfer_manager(&config).unwrap().unwrap();
    assert_eq!(manager.region(), "us-east-1");
    assert_eq!(manager.engine().client().describe(), "fake-engine(us-east-1)");

    let options = backend.last_options().unwrap();
    assert_eq!(options.target_throughput_bytes_per_sec, 2_500_000_000);
    assert_eq!(options.part_size, Some(8_388_608));
    assert!(options.use_tls);
    assert!(!options.verify_peer);
}

#[test]
fn explicit_bandwidth_ignores_recommendation() {
    let temp = TempDir::new().unwrap();
    let backend = Arc::new(RecordingBackend::default());
    let advisor = Arc::new(CountingAdvisor::new(Some(100.0)));
    let context = ClientContext::new(
        "us-east-1",
        static_credentials(),
        file_cell(temp.path(), &backend, &advisor),
    );

    context
        .transfer_manager(&TransferConfig::new().with_max_bandwidth(12_345_678))
        .unwrap()
        .unwrap();

    let options = backend.last_options().unwrap();
    assert_eq!(options.target_throughput_bytes_per_sec, 12_345_678);
}

#[test]
fn repeated_calls_return_identical_handle() {
    let temp = TempDir::new().unwrap();
    let backend = Arc::new(RecordingBackend::default());
    let advisor = Arc::new(CountingAdvisor::new(None));
    let context = ClientContext::new(
        "eu-central-1",
        static_credentials(),
        file_cell(temp.path(), &backend, &advisor),
    );

    let first = context.transfer_manager(&TransferConfig::default()).unwrap();
    let second = context
        .transfer_manager(&TransferConfig::new().with_max_bandwidth(1))
        .unwrap();

    assert!(Arc::ptr_eq(first.as_ref().unwrap(), second.as_ref().unwrap()));
    assert_eq!(backend.calls(), 1);
    assert_eq!(advisor.queries(), 1);
    assert_eq!(
        backend.last_options().unwrap().target_throughput_bytes_per_sec,
        1_250_000_000
    );
}

#[test]
fn second_holder_falls_back_until_first_is_dropped() {
    let temp = TempDir::new().unwrap();
    let backend = Arc::new(RecordingBackend::default());
    let advisor = Arc::new(CountingAdvisor::new(None));

    let owner = ClientContext::new(
        "us-east-1",
        static_credentials(),
        file_cell(temp.path(), &backend, &advisor),
    );
    let contender = ClientContext::new(
        "us-east-1",
        static_credentials(),
        file_cell(temp.path(), &backend, &advisor),
    );

    let held = owner.transfer_manager(&TransferConfig::default()).unwrap();
    assert!(held.is_some());
    assert!(
        contender
            .transfer_manager(&TransferConfig::default())
            .unwrap()
            .is_none()
    );
    assert_eq!(contender.manager_cell().status(), BootstrapStatus::Unavailable);

    // Dropping every handle releases the lock, but the contender's decision stands.
    drop(held);
    drop(owner);
    assert!(
        contender
            .transfer_manager(&TransferConfig::default())
            .unwrap()
            .is_none()
    );

    let fresh = ClientContext::new(
        "us-east-1",
        static_credentials(),
        file_cell(temp.path(), &backend, &advisor),
    );
    assert!(fresh.transfer_manager(&TransferConfig::default()).unwrap().is_some());
}

#[test]
fn concurrent_first_calls_build_once() {
    let temp = TempDir::new().unwrap();
    let backend = Arc::new(RecordingBackend::default());
    let advisor = Arc::new(CountingAdvisor::new(Some(25.0)));
    let context = Arc::new(ClientContext::new(
        "ap-northeast-1",
        static_credentials(),
        file_cell(temp.path(), &backend, &advisor),
    ));

    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let context = Arc::clone(&context);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                context
                    .transfer_manager(&TransferConfig::default())
                    .unwrap()
                    .unwrap()
            })
        })
        .collect();

    let managers: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(managers.iter().all(|m| Arc::ptr_eq(m, &managers[0])));
    assert_eq!(backend.calls(), 1);
}

struct RotatingCredentials {
    generation: AtomicU32,
}

impl CredentialResolver for RotatingCredentials {
    fn frozen_credentials(&self) -> Result<CredentialSnapshot> {
        let generation = self.generation.load(Ordering::SeqCst);
        Ok(CredentialSnapshot::new(
            format!("AKID-{generation}"),
            format!("SECRET-{generation}"),
            None,
        ))
    }
}

#[test]
fn engine_sees_rotated_credentials() {
    let temp = TempDir::new().unwrap();
    let backend = Arc::new(RecordingBackend::default());
    let advisor = Arc::new(CountingAdvisor::new(None));
    let rotating = Arc::new(RotatingCredentials {
        generation: AtomicU32::new(1),
    });
    let context = ClientContext::new(
        "us-east-1",
        Some(rotating.clone()),
        file_cell(temp.path(), &backend, &advisor),
    );

    context
        .transfer_manager(&TransferConfig::default())
        .unwrap()
        .unwrap();
    let provider = backend.last_options().unwrap().credential_provider;

    assert_eq!(provider().unwrap().access_key_id, "AKID-1");
    rotating.generation.store(2, Ordering::SeqCst);
    assert_eq!(provider().unwrap().access_key_id, "AKID-2");
}

#[test]
fn engine_without_resolver_fails_every_request() {
    let temp = TempDir::new().unwrap();
    let backend = Arc::new(RecordingBackend::default());
    let advisor = Arc::new(CountingAdvisor::new(None));
    let context = ClientContext::new("us-east-1", None, file_cell(temp.path(), &backend, &advisor));

    // The manager still builds; only requests fail.
    context
        .transfer_manager(&TransferConfig::default())
        .unwrap()
        .unwrap();
    let provider = backend.last_options().unwrap().credential_provider;

    for _ in 0..2 {
        assert!(matches!(provider(), Err(AccelError::NoCredentials)));
    }
}

#[test]
fn cell_from_config_respects_disabled_flag() {
    let temp = TempDir::new().unwrap();
    let mut config = AccelConfig::default();
    config.enabled = false;
    config.locking.locks_dir = Some(temp.path().to_path_buf());

    let backend = Arc::new(RecordingBackend::default());
    let cell = Arc::new(TransferManagerCell::from_config(&config, backend.clone()));
    let context = ClientContext::new("us-east-1", static_credentials(), cell);

    assert!(context.transfer_manager(&config.transfer).unwrap().is_none());
    assert_eq!(backend.calls(), 0);
    assert!(!LockName::default().lock_path(temp.path()).exists());
}

#[test]
fn cell_from_config_uses_configured_lock() {
    let temp = TempDir::new().unwrap();
    let mut config = AccelConfig::default();
    config.locking.locks_dir = Some(temp.path().to_path_buf());
    config.locking.lock_name = "team-a".to_string();

    let backend = Arc::new(RecordingBackend::default());
    let cell = Arc::new(TransferManagerCell::from_config(&config, backend.clone()));
    let context = ClientContext::new("us-east-1", static_credentials(), cell);

    let manager = context.transfer_manager(&config.transfer).unwrap().unwrap();
    assert_eq!(manager.lock_name().as_str(), "team-a");

    let lease = FileProcessLocker::new(temp.path())
        .current_holder(&LockName::new("team-a"))
        .unwrap()
        .unwrap();
    assert_eq!(lease.pid, std::process::id());
}
