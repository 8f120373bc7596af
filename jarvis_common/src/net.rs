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

//! common utility functions for JSON-over-HTTP operations

use std::time::Duration;
use reqwest::{header::{HeaderMap,HeaderName,HeaderValue,CONTENT_TYPE}, Client, Response, StatusCode};
use serde::{de::DeserializeOwned,Serialize};

use crate::define_error;

define_error!{ pub JarvisNetError =
    HttpError(#[from] reqwest::Error) : "http error: {0}",
    StatusError(u16,String) : "HTTP {0}: {1}",
    HeaderError(String) : "invalid header: {0}",
    OpFailed(String) : "operation failed: {0}"
}

impl JarvisNetError {
    /// is this a (request or connect) timeout
    pub fn is_timeout (&self)->bool {
        match self {
            JarvisNetError::HttpError(e) => e.is_timeout(),
            _ => false
        }
    }
}

pub type Result<T> = std::result::Result<T, JarvisNetError>;

/// build a HeaderMap from (name,value) pairs
pub fn get_headermap (headers: &[(&str,&str)]) -> Result<HeaderMap> {
    let mut hm = HeaderMap::new();
    for (k,v) in headers {
        hm.append(
            HeaderName::from_bytes( k.trim().as_bytes()).map_err(|e| JarvisNetError::HeaderError(e.to_string()))?,
            HeaderValue::from_str( v.trim()).map_err(|e| JarvisNetError::HeaderError(e.to_string()))?
        );
    }
    Ok(hm)
}

/// turn non-success (non 2xx) responses into a `StatusError` with code and canonical reason
pub fn check_status (response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err( JarvisNetError::StatusError( status.as_u16(), reason_phrase(status)))
    }
}

pub fn reason_phrase (status: StatusCode)->String {
    status.canonical_reason().unwrap_or("unknown").to_string()
}

/// POST `data` as JSON body. Any non-success status is reported as error.
/// If `timeout` is given it overrides the client default for this request
pub async fn post_json<T> (client: &Client, url: &str, headers: &HeaderMap, data: &T, timeout: Option<Duration>) -> Result<Response>
    where T: Serialize + ?Sized
{
    let mut req = client.post( url)
        .headers( headers.clone())
        .header( CONTENT_TYPE, HeaderValue::from_static("application/json"))
        .json( data);

    if let Some(timeout) = timeout {
        req = req.timeout( timeout);
    }

    let response = req.send().await?;
    check_status( response)
}

/// POST `data` as JSON and deserialize the JSON response
pub async fn post_json_query<T,U> (client: &Client, url: &str, headers: &HeaderMap, data: &T, timeout: Option<Duration>) -> Result<U>
    where T: Serialize + ?Sized, U: DeserializeOwned
{
    let response = post_json( client, url, headers, data, timeout).await?;
    Ok( response.json().await? )
}

/// join a base URL (with or without trailing '/') and an absolute path
pub fn join_url (base: &str, path: &str)->String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
