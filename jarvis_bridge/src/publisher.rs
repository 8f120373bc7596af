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

//! the publisher owns the shared bridge state (telemetry queue, tactical slot, liveness timestamp and
//! backoff) and runs the three timer loops that drain it into a [`BroadcastSink`].
//!
//! Tick functions take an explicit `now` so that the state machine can be driven deterministically.
//! The state mutex is never held across an await point.

use std::{sync::{Arc, Mutex, MutexGuard}, time::{Duration, Instant}};
use tokio::{task::AbortHandle, time::{self, MissedTickBehavior}};
use tracing::{info, warn};
use jarvis_common::{collections::BoundedQueue, datetime::is_within};

use crate::{
    broadcast::BroadcastSink, config::BridgeConfig, errors::{BridgeError, Result}, metrics::Metrics,
    packets::{HeartbeatPacket, Payload, RawPacket}, spawn, udp::PacketHandler
};

/* #region backoff ***********************************************************************************/

/// exponential backoff with a floor (`base`) and a ceiling (`max`), reset on success
#[derive(Debug,Clone)]
pub struct Backoff {
    base: Duration,
    max: Duration,
    current: Duration,
    until: Option<Instant>,
}

impl Backoff {
    pub fn new (base: Duration, max: Duration)->Self {
        let max = max.max(base);
        Backoff { base, max, current: base, until: None }
    }

    /// are we within the backoff window
    pub fn is_active (&self, now: Instant)->bool {
        self.until.is_some_and( |until| now < until)
    }

    /// record a failed send at `now`. Returns the backoff that was in effect when the failure happened,
    /// the next attempt is then deferred by the doubled (capped) value
    pub fn on_failure (&mut self, now: Instant)->Duration {
        let in_effect = self.current;
        self.current = (self.current * 2).min( self.max);
        self.until = Some(now + self.current);
        in_effect
    }

    pub fn reset (&mut self) {
        self.current = self.base;
        self.until = None;
    }

    pub fn current (&self)->Duration { self.current }
    pub fn until (&self)->Option<Instant> { self.until }
    pub fn base (&self)->Duration { self.base }
    pub fn max (&self)->Duration { self.max }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_and_caps () {
        let now = Instant::now();
        let mut backoff = Backoff::new( Duration::from_secs(1), Duration::from_secs(30));
        assert!( !backoff.is_active(now));

        let logged: Vec<u64> = (0..7).map( |_| backoff.on_failure(now).as_secs()).collect();
        assert_eq!( logged, vec![1, 2, 4, 8, 16, 30, 30]);
        assert_eq!( backoff.current(), Duration::from_secs(30));
        assert!( backoff.is_active( now + Duration::from_secs(29)));
        assert!( !backoff.is_active( now + Duration::from_secs(30)));

        backoff.reset();
        assert_eq!( backoff.current(), Duration::from_secs(1));
        assert!( backoff.until().is_none());
        assert!( !backoff.is_active(now));
    }

    #[test]
    fn test_backoff_window () {
        let now = Instant::now();
        let mut backoff = Backoff::new( Duration::from_secs(1), Duration::from_secs(30));
        backoff.on_failure( now);
        assert_eq!( backoff.until(), Some( now + Duration::from_secs(2)));
        assert!( backoff.is_active( now + Duration::from_millis(1999)));
        assert!( !backoff.is_active( now + Duration::from_secs(2)));
    }
}

/* #endregion backoff */

/// the mutable state shared between the UDP handler and the publisher loops
#[derive(Debug)]
pub struct PublisherState {
    pub last_udp_at: Option<Instant>,
    pub backoff: Backoff,
    pub queue: BoundedQueue<RawPacket>,
    pub tactical: Option<RawPacket>,
    pub tactical_dirty: bool,
}

impl PublisherState {
    pub fn new (max_queue_size: usize, backoff: Backoff)->Self {
        PublisherState {
            last_udp_at: None,
            backoff,
            queue: BoundedQueue::new( max_queue_size),
            tactical: None,
            tactical_dirty: false,
        }
    }
}

/// what a single tick of one of the publisher loops did
#[derive(Debug,Clone)]
pub enum TickOutcome {
    /// skipped because we are within the backoff window
    BackingOff,
    /// nothing to send
    Idle,
    Published,
    /// the send failed. `backoff` is the backoff that was in effect (and got logged)
    Failed { backoff: Duration, error: BridgeError },
}

impl TickOutcome {
    pub fn is_published (&self)->bool { matches!( self, TickOutcome::Published) }
    pub fn is_failed (&self)->bool { matches!( self, TickOutcome::Failed{..}) }
}

#[derive(Debug,Clone,Copy)]
enum LoopKind { Telemetry, Tactical, Heartbeat }

impl LoopKind {
    fn name (&self)->&'static str {
        match self {
            LoopKind::Telemetry => "publish",
            LoopKind::Tactical => "tactical",
            LoopKind::Heartbeat => "heartbeat",
        }
    }
}

/// timing parameters of the publisher loops
#[derive(Debug,Clone)]
pub struct PublisherTiming {
    pub publish_interval: Duration,
    pub tactical_interval: Duration,
    pub heartbeat_interval: Duration,
    pub staleness_timeout: Duration,
    pub publish_timeout: Duration,
}

impl From<&BridgeConfig> for PublisherTiming {
    fn from (config: &BridgeConfig)->Self {
        PublisherTiming {
            publish_interval: config.publish_interval(),
            tactical_interval: config.tactical_interval,
            heartbeat_interval: config.heartbeat_interval,
            staleness_timeout: config.staleness_timeout,
            publish_timeout: config.publish_timeout,
        }
    }
}

pub struct Publisher {
    state: Mutex<PublisherState>,
    metrics: Arc<Metrics>,
    sink: Arc<dyn BroadcastSink>,
    timing: PublisherTiming,
    tasks: Mutex<Vec<AbortHandle>>,
}

impl Publisher {
    pub fn new (config: &BridgeConfig, metrics: Arc<Metrics>, sink: Arc<dyn BroadcastSink>)->Self {
        let backoff = Backoff::new( config.base_backoff, config.max_backoff);
        let state = Mutex::new( PublisherState::new( config.max_queue_size, backoff));

        Publisher { state, metrics, sink, timing: PublisherTiming::from(config), tasks: Mutex::new( Vec::new()) }
    }

    fn lock_state (&self)->MutexGuard<'_,PublisherState> {
        self.state.lock().unwrap_or_else( |e| e.into_inner())
    }

    /// run `f` on the locked state. Mostly for inspection
    pub fn with_state<F,R> (&self, f: F)->R where F: FnOnce(&mut PublisherState)->R {
        f( &mut self.lock_state())
    }

    pub fn topic (&self)->&str { self.sink.topic() }

    pub fn queue_len (&self)->usize { self.lock_state().queue.len() }

    pub fn enqueue_telemetry (&self, pkt: RawPacket, now: Instant) {
        let mut state = self.lock_state();
        state.queue.push( pkt);
        state.last_udp_at = Some(now);
    }

    pub fn update_tactical (&self, pkt: RawPacket, now: Instant) {
        let mut state = self.lock_state();
        state.tactical = Some(pkt);
        state.tactical_dirty = true;
        state.last_udp_at = Some(now);
    }

    pub fn is_dcs_active (&self, now: Instant)->bool {
        is_within( self.lock_state().last_udp_at, now, self.timing.staleness_timeout)
    }

    async fn send (&self, payload: Payload<'_>)->Result<()> {
        match time::timeout( self.timing.publish_timeout, self.sink.broadcast( &payload)).await {
            Ok(res) => res,
            Err(_) => Err( BridgeError::Timeout( self.timing.publish_timeout))
        }
    }

    /// one tick of the telemetry loop: send the most recent queued sample unless we are backing off
    pub async fn publish_tick (&self, now: Instant)->TickOutcome {
        let pkt = {
            let mut state = self.lock_state();
            if state.backoff.is_active( now) {
                return TickOutcome::BackingOff
            }
            match state.queue.drain_latest() {
                Some(pkt) => pkt,
                None => return TickOutcome::Idle
            }
        };

        match self.send( Payload::Telemetry(&pkt)).await {
            Ok(()) => {
                self.metrics.record_publish();
                self.lock_state().backoff.reset();
                TickOutcome::Published
            }
            Err(error) => {
                self.metrics.record_error();
                let mut state = self.lock_state();
                let backoff = state.backoff.current();
                warn!("publish failed (retry in {:?}): {}", backoff, error);
                state.queue.push( pkt); // a newer sample might have arrived meanwhile, this can evict the retry
                state.backoff.on_failure( now);
                TickOutcome::Failed { backoff, error }
            }
        }
    }

    /// one tick of the tactical loop: send the tactical slot if it changed since the last successful send.
    /// Failures restore the dirty flag but do not extend the shared backoff
    pub async fn tactical_tick (&self, now: Instant)->TickOutcome {
        let pkt = {
            let mut state = self.lock_state();
            if state.backoff.is_active( now) {
                return TickOutcome::BackingOff
            }
            if !state.tactical_dirty {
                return TickOutcome::Idle
            }
            match state.tactical.clone() {
                Some(pkt) => {
                    state.tactical_dirty = false;
                    pkt
                }
                None => {
                    state.tactical_dirty = false;
                    return TickOutcome::Idle
                }
            }
        };

        match self.send( Payload::Tactical(&pkt)).await {
            Ok(()) => {
                self.metrics.record_publish();
                TickOutcome::Published
            }
            Err(error) => {
                self.metrics.record_error();
                let mut state = self.lock_state();
                let backoff = state.backoff.current();
                warn!("tactical publish failed: {}", error);
                state.tactical_dirty = true;
                TickOutcome::Failed { backoff, error }
            }
        }
    }

    /// one tick of the heartbeat loop. Heartbeats are best effort, failures are not counted or logged
    pub async fn heartbeat_tick (&self, now: Instant)->TickOutcome {
        let (dcs_active, queue_size) = {
            let state = self.lock_state();
            (is_within( state.last_udp_at, now, self.timing.staleness_timeout), state.queue.len())
        };
        self.metrics.record_liveness( dcs_active);

        let hb = HeartbeatPacket { dcs_active, packet_count: self.metrics.total_udp_received(), queue_size };
        match self.send( Payload::Heartbeat(&hb)).await {
            Ok(()) => TickOutcome::Published,
            Err(error) => TickOutcome::Failed { backoff: Duration::ZERO, error }
        }
    }

    /// spawn the telemetry, tactical and heartbeat loops. This is a no-op if they are already running
    pub fn start (self: &Arc<Self>) {
        let mut tasks = self.tasks.lock().unwrap_or_else( |e| e.into_inner());
        if !tasks.is_empty() {
            return
        }
        info!("publishing to channel: {}", self.topic());

        tasks.push( self.spawn_loop( LoopKind::Telemetry, self.timing.publish_interval));
        tasks.push( self.spawn_loop( LoopKind::Tactical, self.timing.tactical_interval));
        tasks.push( self.spawn_loop( LoopKind::Heartbeat, self.timing.heartbeat_interval));
    }

    fn spawn_loop (self: &Arc<Self>, kind: LoopKind, interval: Duration)->AbortHandle {
        let publisher = self.clone();
        let jh = spawn( kind.name(), async move {
            let mut timer = time::interval_at( time::Instant::now() + interval, interval);
            timer.set_missed_tick_behavior( MissedTickBehavior::Skip);
            loop {
                timer.tick().await;
                let now = Instant::now();
                match kind {
                    LoopKind::Telemetry => publisher.publish_tick( now).await,
                    LoopKind::Tactical => publisher.tactical_tick( now).await,
                    LoopKind::Heartbeat => publisher.heartbeat_tick( now).await,
                };
            }
        });
        jh.abort_handle()
    }

    /// abort all loops. Queued samples are not flushed
    pub fn terminate (&self) {
        let mut tasks = self.tasks.lock().unwrap_or_else( |e| e.into_inner());
        for ah in tasks.drain(..) {
            ah.abort();
        }
    }
}

/// the [`PacketHandler`] that connects the UDP listener to the publisher
pub struct BridgeHandler {
    metrics: Arc<Metrics>,
    publisher: Arc<Publisher>,
}

impl BridgeHandler {
    pub fn new (metrics: Arc<Metrics>, publisher: Arc<Publisher>)->Self {
        BridgeHandler { metrics, publisher }
    }
}

impl PacketHandler for BridgeHandler {
    fn on_telemetry (&self, pkt: RawPacket) {
        self.metrics.record_udp();
        self.publisher.enqueue_telemetry( pkt, Instant::now());
    }

    fn on_tactical (&self, pkt: RawPacket) {
        self.metrics.record_udp();
        self.publisher.update_tactical( pkt, Instant::now());
    }
}
