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

use std::{fmt, sync::{Arc, Mutex, atomic::{AtomicBool,AtomicU64,Ordering}}, time::{Duration,Instant}};
use tokio::{task::AbortHandle, time::{self, MissedTickBehavior}};
use tracing::{info,warn};
use jarvis_common::datetime::elapsed_between;

use crate::spawn;

/// throughput counters and simulator liveness tracking. This is an explicit instance that is shared
/// (as `Arc<Metrics>`) between the UDP handler and the publisher tasks.
///
/// The interval counters (`udp`, `published`, `errors`) are reset by each [`Metrics::take_summary`],
/// the running datagram count is never reset (it is reported in heartbeats)
pub struct Metrics {
    udp_received: AtomicU64,
    published: AtomicU64,
    errors: AtomicU64,
    total_udp_received: AtomicU64,

    last_log_at: Mutex<Instant>,

    was_dcs_active: AtomicBool,
    silence_transitions: AtomicU64,

    task: Mutex<Option<AbortHandle>>
}

/// snapshot of one logging interval
#[derive(Debug,Clone,Copy,PartialEq)]
pub struct MetricsSummary {
    pub udp: u64,
    pub published: u64,
    pub errors: u64,
    pub elapsed: Duration,
    /// received datagrams per second
    pub rate: f64,
}

impl fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "udp={} pub={} err={} rate={:.1}/s", self.udp, self.published, self.errors, self.rate)
    }
}

impl Metrics {
    pub fn new (now: Instant)->Self {
        Metrics {
            udp_received: AtomicU64::new(0),
            published: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            total_udp_received: AtomicU64::new(0),
            last_log_at: Mutex::new(now),
            was_dcs_active: AtomicBool::new(false), // nothing to report before we have seen DCS once
            silence_transitions: AtomicU64::new(0),
            task: Mutex::new(None)
        }
    }

    pub fn record_udp (&self) {
        self.udp_received.fetch_add( 1, Ordering::Relaxed);
        self.total_udp_received.fetch_add( 1, Ordering::Relaxed);
    }

    pub fn record_publish (&self) {
        self.published.fetch_add( 1, Ordering::Relaxed);
    }

    pub fn record_error (&self) {
        self.errors.fetch_add( 1, Ordering::Relaxed);
    }

    pub fn udp_received (&self)->u64 { self.udp_received.load(Ordering::Relaxed) }
    pub fn published (&self)->u64 { self.published.load(Ordering::Relaxed) }
    pub fn errors (&self)->u64 { self.errors.load(Ordering::Relaxed) }
    pub fn total_udp_received (&self)->u64 { self.total_udp_received.load(Ordering::Relaxed) }
    pub fn silence_transitions (&self)->u64 { self.silence_transitions.load(Ordering::Relaxed) }

    /// edge detector for simulator liveness. Logs (and returns true) only on an active->silent
    /// transition, no matter how often this is called while the simulator stays silent
    pub fn record_liveness (&self, dcs_active: bool)->bool {
        let was_active = self.was_dcs_active.swap( dcs_active, Ordering::Relaxed);

        if was_active && !dcs_active {
            self.silence_transitions.fetch_add( 1, Ordering::Relaxed);
            warn!("DCS_SILENT - no UDP packet within staleness timeout");
            true
        } else {
            if !was_active && dcs_active {
                info!("DCS active");
            }
            false
        }
    }

    /// get the interval counters and reset them
    pub fn take_summary (&self, now: Instant)->MetricsSummary {
        let elapsed = {
            let mut last_log_at = self.last_log_at.lock().unwrap_or_else( |e| e.into_inner());
            let elapsed = elapsed_between( *last_log_at, now);
            *last_log_at = now;
            elapsed
        };

        let udp = self.udp_received.swap( 0, Ordering::Relaxed);
        let published = self.published.swap( 0, Ordering::Relaxed);
        let errors = self.errors.swap( 0, Ordering::Relaxed);
        let rate = udp as f64 / elapsed.as_secs_f64().max(0.001);

        MetricsSummary { udp, published, errors, elapsed, rate }
    }

    pub fn log_summary (&self, now: Instant)->MetricsSummary {
        let summary = self.take_summary( now);
        info!("{summary}");
        summary
    }

    /// start the periodic metrics log task. This is a no-op if the task is already running
    pub fn start (self: &Arc<Self>, interval: Duration) {
        let mut task = self.task.lock().unwrap_or_else( |e| e.into_inner());
        if task.is_none() {
            let metrics = self.clone();
            let jh = spawn( "metrics", async move {
                let mut timer = time::interval_at( time::Instant::now() + interval, interval);
                timer.set_missed_tick_behavior( MissedTickBehavior::Skip);
                loop {
                    timer.tick().await;
                    metrics.log_summary( Instant::now());
                }
            });
            *task = Some(jh.abort_handle());
        }
    }

    pub fn terminate (&self) {
        if let Some(ah) = self.task.lock().unwrap_or_else( |e| e.into_inner()).take() {
            ah.abort();
        }
    }
}
