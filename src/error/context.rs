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

use crate::error::AccelError;
use std::fmt;

pub struct ErrorContext<'a> {
    pub error: &'a AccelError,
    pub suggestion: Option<String>,
    pub details: Option<String>,
}

impl<'a> ErrorContext<'a> {
    pub fn new(error: &'a AccelError) -> Self {
        let (suggestion, details) = match error {
            AccelError::NoCredentials => {
                let suggestion = Some(
                    "Configure credentials for the client, or export AWS_ACCESS_KEY_ID and \
                     AWS_SECRET_ACCESS_KEY."
                        .to_string(),
                );
                let details = Some(
                    "The transfer engine requested credentials but no resolver is configured."
                        .to_string(),
                );
                (suggestion, details)
            }
            AccelError::LockUnavailable { name } => {
                let suggestion = Some(
                    "Another process already runs the accelerated engine. Transfers in this \
                     process use the standard path."
                        .to_string(),
                );
                let details = Some(format!("Lock '{name}' is held elsewhere."));
                (suggestion, details)
            }
            AccelError::LockingAcquire { name, details } => {
                let suggestion = Some(
                    "Check that the lock directory exists and is writable, or set \
                     ACCEL_TRANSFER_LOCKING__LOCKS_DIR to another location."
                        .to_string(),
                );
                let details = Some(format!("Lock '{name}': {details}"));
                (suggestion, details)
            }
            AccelError::EngineConstruction(msg) => {
                let suggestion = Some(
                    "Check max_bandwidth and multipart_chunksize in the transfer configuration."
                        .to_string(),
                );
                let details = Some(format!("Engine initialization failed: {msg}"));
                (suggestion, details)
            }
            AccelError::InvalidConfig(msg) | AccelError::ConfigError(msg) => {
                let suggestion = Some(
                    "Fix the value in accel-transfer.toml or the ACCEL_TRANSFER_* environment \
                     variables."
                        .to_string(),
                );
                let details = Some(msg.clone());
                (suggestion, details)
            }
            AccelError::Io(io_err) => {
                let suggestion = match io_err.kind() {
                    std::io::ErrorKind::PermissionDenied => {
                        Some("Check permissions of the lock directory.".to_string())
                    }
                    std::io::ErrorKind::NotFound => Some(
                        "Ensure the file or directory exists and the path is correct.".to_string(),
                    ),
                    _ => None,
                };
                let details = Some(format!("I/O error: {io_err}"));
                (suggestion, details)
            }
            _ => (None, None),
        };

        ErrorContext {
            error,
            suggestion,
            details,
        }
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestion = Some(suggestion);
        self
    }
}

impl<'a> fmt::Display for ErrorContext<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error: {}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\n\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}
