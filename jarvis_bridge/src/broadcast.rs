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
use async_trait::async_trait;
use reqwest::{Client, header::HeaderMap};
use serde::Serialize;
use tracing::debug;
use jarvis_common::net::{get_headermap, join_url, post_json};

use crate::{errors::{BridgeError, Result}, packets::Payload};

pub const BROADCAST_PATH: &str = "realtime/v1/api/broadcast";

/// the abstraction of the cloud pub/sub endpoint we publish to. `LiveBroadcaster` is the production
/// implementation, tests inject their own sinks to script failures and record what was sent
#[async_trait]
pub trait BroadcastSink: Send + Sync {
    /// publish a single message on the channel this sink is bound to. Any error counts as a failed send
    async fn broadcast (&self, payload: &Payload<'_>) -> Result<()>;

    /// the channel (topic) name this sink publishes to
    fn topic (&self)->&str;
}

#[derive(Serialize,Debug)]
pub struct BroadcastMessage<'a> {
    pub topic: &'a str,
    pub event: &'a str,
    pub payload: &'a Payload<'a>,
}

/// the POST body of the broadcast API
#[derive(Serialize,Debug)]
pub struct BroadcastEnvelope<'a> {
    pub messages: [BroadcastMessage<'a>; 1],
}

impl<'a> BroadcastEnvelope<'a> {
    pub fn new (topic: &'a str, payload: &'a Payload<'a>)->Self {
        BroadcastEnvelope { messages: [ BroadcastMessage { topic, event: payload.event(), payload } ] }
    }
}

/// broadcast sink that uses the HTTP broadcast endpoint of the realtime service
pub struct LiveBroadcaster {
    client: Client,
    endpoint: String,
    headers: HeaderMap,
    topic: String,
    timeout: Duration,
}

impl LiveBroadcaster {
    pub fn new (base_url: &str, api_key: &str, topic: impl ToString, timeout: Duration)->Result<Self> {
        let client = Client::builder().timeout( timeout).build()?;
        let endpoint = join_url( base_url, BROADCAST_PATH);
        let headers = get_headermap( &[("apikey", api_key)])?;

        Ok( LiveBroadcaster { client, endpoint, headers, topic: topic.to_string(), timeout } )
    }

    pub fn endpoint (&self)->&str { self.endpoint.as_str() }
}

#[async_trait]
impl BroadcastSink for LiveBroadcaster {
    async fn broadcast (&self, payload: &Payload<'_>) -> Result<()> {
        let body = BroadcastEnvelope::new( self.topic.as_str(), payload);

        match post_json( &self.client, &self.endpoint, &self.headers, &body, Some(self.timeout)).await {
            Ok(_) => {
                debug!("published {} to {}", payload.event(), self.topic);
                Ok(())
            }
            Err(e) if e.is_timeout() => Err( BridgeError::Timeout(self.timeout)),
            Err(e) => Err( e.into())
        }
    }

    fn topic (&self)->&str { self.topic.as_str() }
}
