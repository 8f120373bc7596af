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

use std::{fs, net::SocketAddr, path::Path, time::Duration};
use serde::{Deserialize, Serialize};
use tracing::debug;
use jarvis_common::datetime::{deserialize_duration, interval_for_rate, serialize_duration, secs};

use crate::{errors::{config_error, BridgeError, Result}, UDP_PORT};

pub const ENV_SUPABASE_URL: [&str;2] = ["SUPABASE_URL", "NEXT_PUBLIC_SUPABASE_URL"];
pub const ENV_SUPABASE_KEY: [&str;3] = ["SUPABASE_SERVICE_ROLE_KEY", "SUPABASE_KEY", "NEXT_PUBLIC_SUPABASE_ANON_KEY"];
pub const ENV_UDP_PORT: &str = "JARVIS_UDP_PORT";
pub const ENV_API_URL: &str = "JARVIS_API_URL";
pub const ENV_CHANNEL: &str = "BRIDGE_CHANNEL";

/// bridge configuration. Every field has a default so that a (partial) RON file is optional.
/// Credentials are usually provided through the environment
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
#[serde(default)]
pub struct BridgeConfig {
    pub udp_addr: SocketAddr,
    pub publish_rate_hz: f64,
    pub max_queue_size: usize,

    #[serde(deserialize_with="deserialize_duration", serialize_with="serialize_duration")]
    pub heartbeat_interval: Duration,
    #[serde(deserialize_with="deserialize_duration", serialize_with="serialize_duration")]
    pub tactical_interval: Duration,
    /// no UDP packet for this long means DCS is silent
    #[serde(deserialize_with="deserialize_duration", serialize_with="serialize_duration")]
    pub staleness_timeout: Duration,
    #[serde(deserialize_with="deserialize_duration", serialize_with="serialize_duration")]
    pub metrics_interval: Duration,
    #[serde(deserialize_with="deserialize_duration", serialize_with="serialize_duration")]
    pub publish_timeout: Duration,
    #[serde(deserialize_with="deserialize_duration", serialize_with="serialize_duration")]
    pub base_backoff: Duration,
    #[serde(deserialize_with="deserialize_duration", serialize_with="serialize_duration")]
    pub max_backoff: Duration,

    /// base URL of the realtime service
    pub supabase_url: Option<String>,
    pub api_key: Option<String>,
    /// base URL of the web app that hands out channels for pairing codes
    pub api_url: Option<String>,
}

impl Default for BridgeConfig {
    fn default()->Self {
        BridgeConfig {
            udp_addr: SocketAddr::from( ([0,0,0,0], UDP_PORT)),
            publish_rate_hz: 4.0,
            max_queue_size: 100,
            heartbeat_interval: secs(1),
            tactical_interval: secs(1),
            staleness_timeout: secs(3),
            metrics_interval: secs(5),
            publish_timeout: secs(5),
            base_backoff: secs(1),
            max_backoff: secs(30),
            supabase_url: None,
            api_key: None,
            api_url: None,
        }
    }
}

impl BridgeConfig {
    pub fn from_ron (src: &str)->Result<Self> {
        Ok( ron::from_str( src)? )
    }

    /// load from an optional RON file, then apply environment overrides and validate
    pub fn load (path: Option<&Path>)->Result<Self> {
        let mut config = match path {
            Some(path) => {
                debug!("loading config from {:?}", path);
                let src = fs::read_to_string( path).map_err( |e| config_error( format!("{}: {}", path.display(), e)))?;
                Self::from_ron( &src)?
            }
            None => BridgeConfig::default()
        };

        config.apply_env( |key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// apply overrides from `lookup` (normally the process environment). Empty values are ignored
    pub fn apply_env<F> (&mut self, lookup: F)->Result<()> where F: Fn(&str)->Option<String> {
        let get = |keys: &[&str]| keys.iter().find_map( |k| lookup(*k).filter( |v| !v.trim().is_empty()));

        if let Some(url) = get( &ENV_SUPABASE_URL[..]) { self.supabase_url = Some(url) }
        if let Some(key) = get( &ENV_SUPABASE_KEY[..]) { self.api_key = Some(key) }
        if let Some(url) = get( &[ENV_API_URL][..]) { self.api_url = Some(url) }

        if let Some(port) = get( &[ENV_UDP_PORT][..]) {
            let port: u16 = port.trim().parse().map_err( |_| config_error( format!("invalid {ENV_UDP_PORT}: {port}")))?;
            self.udp_addr.set_port( port);
        }
        Ok(())
    }

    pub fn validate (&self)->Result<()> {
        if interval_for_rate( self.publish_rate_hz).is_none() {
            return Err( config_error( format!("publish_rate_hz must be positive: {}", self.publish_rate_hz)))
        }
        if self.max_queue_size == 0 {
            return Err( config_error( "max_queue_size must not be 0"))
        }
        if self.base_backoff > self.max_backoff {
            return Err( config_error( format!("base_backoff {:?} exceeds max_backoff {:?}", self.base_backoff, self.max_backoff)))
        }
        if self.publish_timeout.is_zero() {
            return Err( config_error( "publish_timeout must not be 0"))
        }
        Ok(())
    }

    /// the telemetry publish period derived from `publish_rate_hz`
    pub fn publish_interval (&self)->Duration {
        interval_for_rate( self.publish_rate_hz).unwrap_or( Duration::from_millis(250))
    }

    /// the realtime service URL and key, which are required to run
    pub fn require_credentials (&self)->Result<(&str,&str)> {
        let url = self.supabase_url.as_deref().ok_or_else( || BridgeError::MissingConfig( ENV_SUPABASE_URL.join(" or ")))?;
        let key = self.api_key.as_deref().ok_or_else( || BridgeError::MissingConfig( ENV_SUPABASE_KEY.join(" or ")))?;
        Ok((url,key))
    }
}
