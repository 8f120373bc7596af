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

//! channel resolution. The bridge publishes to exactly one channel, which is either given explicitly,
//! obtained by claiming a pairing code from the web app, or the development default

use std::{fmt, time::Duration};
use reqwest::{header::HeaderMap, Client};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use jarvis_common::net::{join_url, post_json_query, JarvisNetError};

use crate::{config::BridgeConfig, errors::{BridgeError, Result}, DEFAULT_CHANNEL};

pub const PAIRING_CHARSET: &str = "ABCDEFGHJKMNPQRSTUVWXYZ23456789";
pub const PAIRING_CODE_LENGTH: usize = 6;
pub const CLAIM_PATH: &str = "api/bridge/claim";
pub const CLAIM_TIMEOUT: Duration = Duration::from_secs(10);

/// the broadcast channel name for a session
pub fn channel_name (session_id: &str)->String {
    format!("session:{session_id}")
}

pub fn is_valid_code (code: &str)->bool {
    code.chars().count() == PAIRING_CODE_LENGTH && code.chars().all( |c| PAIRING_CHARSET.contains(c))
}

/// trim and upper-case a user entered pairing code, then check it against the code format
pub fn normalize_code (code: &str)->Result<String> {
    let code = code.trim().to_uppercase();
    if is_valid_code( &code) {
        Ok(code)
    } else {
        Err( BridgeError::InvalidPairingCode( code))
    }
}

#[derive(Serialize,Debug)]
pub struct ClaimRequest<'a> {
    pub code: &'a str,
}

#[derive(Deserialize,Debug,Clone,PartialEq)]
#[serde(rename_all="camelCase")]
pub struct ClaimResponse {
    pub channel_name: String,
    pub session_id: String,
}

/// claim a (normalized) pairing code. Codes are single use, a second claim of the same code fails
pub async fn claim_code (client: &Client, api_url: &str, code: &str)->Result<ClaimResponse> {
    let url = join_url( api_url, CLAIM_PATH);
    let req = ClaimRequest { code };

    post_json_query( client, &url, &HeaderMap::new(), &req, Some(CLAIM_TIMEOUT)).await.map_err( |e| {
        match e {
            JarvisNetError::StatusError(404,_) => BridgeError::InvalidPairingCode( format!("{code} (invalid or expired)")),
            JarvisNetError::StatusError(410,_) => BridgeError::InvalidPairingCode( format!("{code} (expired)")),
            other => BridgeError::ClaimFailed( other.to_string())
        }
    })
}

/// how the bridge was told which channel to use
#[derive(Debug,Default,Clone)]
pub struct ChannelOptions {
    /// used verbatim
    pub channel: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug,Clone,PartialEq)]
pub enum ChannelSource {
    Explicit,
    Claimed { session_id: String },
    /// pairing code used as session id since there was no claim endpoint
    Unclaimed,
    Default,
}

#[derive(Debug,Clone,PartialEq)]
pub struct ChannelResolution {
    pub channel: String,
    pub source: ChannelSource,
}

impl fmt::Display for ChannelResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            ChannelSource::Explicit => write!(f, "{} (explicit)", self.channel),
            ChannelSource::Claimed{session_id} => write!(f, "{} (paired with session {})", self.channel, session_id),
            ChannelSource::Unclaimed => write!(f, "{} (unclaimed pairing code)", self.channel),
            ChannelSource::Default => write!(f, "{} (development default)", self.channel),
        }
    }
}

pub async fn resolve_channel (opts: &ChannelOptions, config: &BridgeConfig)->Result<ChannelResolution> {
    if let Some(channel) = opts.channel.as_ref().filter( |c| !c.trim().is_empty()) {
        return Ok( ChannelResolution { channel: channel.clone(), source: ChannelSource::Explicit })
    }

    if let Some(code) = &opts.code {
        let code = normalize_code( code)?;

        return match &config.api_url {
            Some(api_url) => {
                info!("claiming pairing code {code}");
                let client = Client::builder().build()?;
                let res = claim_code( &client, api_url, &code).await?;
                Ok( ChannelResolution { channel: res.channel_name, source: ChannelSource::Claimed { session_id: res.session_id } })
            }
            None => {
                warn!("no claim endpoint configured, using pairing code as session id");
                Ok( ChannelResolution { channel: channel_name( &code), source: ChannelSource::Unclaimed })
            }
        }
    }

    Ok( ChannelResolution { channel: DEFAULT_CHANNEL.to_string(), source: ChannelSource::Default })
}
