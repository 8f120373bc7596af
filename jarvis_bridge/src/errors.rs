/*
 * Copyright © 2025, United States Government, as represented by the Administrator of
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

use std::time::Duration;
use thiserror::Error;
use jarvis_common::{map_to_opaque_error, net::JarvisNetError};

pub type Result<T> = std::result::Result<T, BridgeError>;

/// jarvis_bridge specific error type. Note that we need those to be Clone (publish failures are
/// logged and counted from several tasks), hence we use our own mapping into opaque types that
/// do not store the source error
#[derive(Error,Debug,Clone)]
pub enum BridgeError {
    #[error("IO error {0}")]
    IOError(String),

    #[error("failed to bind UDP socket {0}: {1}")]
    Bind(String,String),

    #[error("JSON error {0}")]
    JsonError(String),

    #[error("config error {0}")]
    ConfigError(String),

    #[error("missing configuration: {0}")]
    MissingConfig(String),

    #[error("http error {0}")]
    Http(String),

    #[error("HTTP {status}: {reason}")]
    HttpStatus { status: u16, reason: String },

    #[error("timeout after {0:?}")]
    Timeout(Duration),

    #[error("invalid pairing code {0}")]
    InvalidPairingCode(String),

    #[error("pairing claim failed: {0}")]
    ClaimFailed(String),

    /// a generic error
    #[error("operation failed {0}")]
    OpFailed(String)
}

map_to_opaque_error!{ std::io::Error => BridgeError::IOError }
map_to_opaque_error!{ serde_json::Error => BridgeError::JsonError }
map_to_opaque_error!{ reqwest::Error => BridgeError::Http }
map_to_opaque_error!{ ron::error::SpannedError => BridgeError::ConfigError }

impl From<JarvisNetError> for BridgeError {
    fn from (e: JarvisNetError)->Self {
        match e {
            JarvisNetError::StatusError(status,reason) => BridgeError::HttpStatus { status, reason },
            other => BridgeError::Http( other.to_string())
        }
    }
}

pub fn config_error (msg: impl ToString)->BridgeError {
    BridgeError::ConfigError(msg.to_string())
}
