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

use std::time::{Duration, Instant};
use serde::{Deserialize, Deserializer, Serializer};
use parse_duration::parse;

// for simple use cases that do not require to handle leap seconds and the like we provide our own wrappers
// to keep call sites short
#[inline] pub fn millis (n: u64)->Duration { Duration::from_millis(n) }
#[inline] pub fn secs (n: u64)->Duration { Duration::from_secs(n) }

/// the interval for a given rate in Hz. Non-positive or non-finite rates yield `None`
pub fn interval_for_rate (hz: f64)->Option<Duration> {
    if hz.is_finite() && hz > 0.0 {
        Some( Duration::from_secs_f64( 1.0 / hz))
    } else {
        None
    }
}

/// time elapsed between two monotonic instants, saturating at zero if `later` is before `earlier`
#[inline]
pub fn elapsed_between (earlier: Instant, later: Instant)->Duration {
    later.saturating_duration_since( earlier)
}

/// check if `since` (if any) lies less than `max_age` before `now`
pub fn is_within (since: Option<Instant>, now: Instant, max_age: Duration)->bool {
    since.map( |t| elapsed_between(t, now) < max_age).unwrap_or(false)
}

/// serde deserializer for human readable durations such as "250ms", "5s" or "1 min"
pub fn deserialize_duration <'a,D>(deserializer: D) -> Result<Duration,D::Error>
    where D: Deserializer<'a>
{
    String::deserialize(deserializer).and_then( |string| {
        parse(string.as_str())
            .map_err( |e| serde::de::Error::custom(format!("{:?}",e)))
    })
}

pub fn serialize_duration<S: Serializer> (dur: &Duration, s: S) -> Result<S::Ok, S::Error>  {
    let dur_str = format!("{}ms", dur.as_millis());
    s.serialize_str(&dur_str)
}
