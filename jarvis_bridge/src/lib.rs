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

//! jarvis_bridge relays live DCS telemetry to a realtime broadcast channel.
//!
//! The data flow is `UdpListener` -> `BridgeHandler` -> `Publisher` -> `BroadcastSink`. The UDP side only
//! enqueues (latest value wins), the publisher side runs three timer loops (telemetry, tactical and
//! heartbeat) over shared state that is guarded by a single mutex. Publish failures put the telemetry
//! and tactical loops into an exponential backoff. Heartbeats are best effort.

use std::future::Future;
use tokio::task::JoinHandle;
use tracing::debug;

pub mod errors;
pub use errors::{BridgeError, Result};

pub mod packets;
pub mod metrics;
pub mod broadcast;
pub mod publisher;
pub mod udp;
pub mod pairing;
pub mod config;

/// default port of the DCS export script
pub const UDP_PORT: u16 = 7779;

/// channel we publish to if neither a channel nor a pairing code was given
pub const DEFAULT_CHANNEL: &str = "session:dev";

/// spawn a named tokio task. The name is only used for logging
pub fn spawn<F>(name: &str, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
{
    debug!("spawning task {name}");
    tokio::spawn( future)
}
