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

//! the packet types we receive from the DCS export script and publish to the broadcast channel.
//! All values are in SI units (metres, radians, m/s). Field names follow the export script.
//! Received datagrams are relayed as-is (see [`RawPacket`]), the typed packets describe what the
//! export script sends

use serde::{Serialize,Deserialize,de::DeserializeOwned};
use serde_json::{Map,Value};
use jarvis_common::is_none;

/* #region telemetry  *******************************************************************************/

/// per-frame vehicle state sample. Packets have no identity other than `t_model`
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct TelemetryPacket {
    /// mission elapsed seconds (LoGetModelTime)
    pub t_model: f64,
    pub pos: Position,
    pub att: Attitude,
    pub spd: Speed,
    /// magnetic heading
    pub hdg_rad: f64,

    #[serde(default,skip_serializing_if="is_none")]
    pub aero: Option<Aero>,
    #[serde(default,skip_serializing_if="is_none")]
    pub fuel: Option<Fuel>,
    #[serde(default,skip_serializing_if="is_none")]
    pub eng: Option<Engine>,
}

#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
    /// MSL
    pub alt_m: f64,
    #[serde(default,skip_serializing_if="is_none")]
    pub alt_agl_m: Option<f64>,
}

#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct Attitude {
    pub pitch_rad: f64,
    pub bank_rad: f64,
    pub yaw_rad: f64,
}

#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct Speed {
    pub ias_mps: f64,
    #[serde(default,skip_serializing_if="is_none")]
    pub tas_mps: Option<f64>,
    /// positive is climbing
    #[serde(default,skip_serializing_if="is_none")]
    pub vvi_mps: Option<f64>,
    pub mach: f64,
}

#[derive(Serialize,Deserialize,Debug,Clone,Copy,PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct Aero {
    pub aoa_rad: f64,
    /// x: lateral, y: normal, z: longitudinal
    pub g: Vec3,
    /// rad/s
    pub ang_vel: Vec3,
}

/// 0..1 fractions
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct Fuel {
    pub internal: f64,
    pub external: f64,
}

/// primary engine
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct Engine {
    pub rpm_pct: f64,
    pub fuel_con: f64,
}

/* #endregion telemetry */

/* #region tactical  ********************************************************************************/

/// lower frequency weapons/systems/contacts snapshot. Each section is optional since the export
/// script only includes what the mission permissions (and the aircraft module) provide
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq,Default)]
pub struct TacticalPacket {
    #[serde(default,skip_serializing_if="is_none")]
    pub t_model: Option<f64>,
    #[serde(default,skip_serializing_if="is_none")]
    pub weapons: Option<Weapons>,
    #[serde(default,skip_serializing_if="is_none")]
    pub countermeasures: Option<Countermeasures>,
    #[serde(default,skip_serializing_if="is_none")]
    pub nav: Option<Navigation>,
    #[serde(default,skip_serializing_if="is_none")]
    pub mech: Option<Mechanization>,
    #[serde(default,skip_serializing_if="is_none")]
    pub mcp_warnings: Option<Vec<String>>,

    // sensor data is only available if the mission allows it (see `permissions`)
    #[serde(default,skip_serializing_if="is_none")]
    pub targets: Option<Vec<SensorTarget>>,
    #[serde(default,skip_serializing_if="is_none")]
    pub locked: Option<Vec<LockedTarget>>,
    #[serde(default,skip_serializing_if="is_none")]
    pub objects: Option<Vec<WorldObject>>,
    #[serde(default,skip_serializing_if="is_none")]
    pub permissions: Option<Permissions>,
}

#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct Weapons {
    #[serde(default)]
    pub current_station: u32,
    #[serde(default)]
    pub gun_rounds: u32,
    #[serde(default)]
    pub stations: Vec<Station>,
}

#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct Station {
    pub idx: u32,
    pub name: String,
    pub count: u32,
}

#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct Countermeasures {
    pub chaff: u32,
    pub flare: u32,
}

#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct Navigation {
    pub master_mode: String,
    pub sub_mode: String,
    #[serde(default)]
    pub autothrust: bool,
}

/// gear/flaps/speedbrakes as 0..1 values
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct Mechanization {
    pub gear_status: f64,
    pub flaps_value: f64,
    pub speedbrakes: f64,
}

#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct SensorTarget {
    pub id: u64,
    /// metres
    pub dist: f64,
    pub mach: f64,
    /// bit set of track/lock flags
    pub flags: u32,
    /// body axis angles
    pub fim: f64,
    pub fin: f64,
}

#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct LockedTarget {
    pub id: u64,
}

#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct WorldObject {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    /// coalition ("Allies", "Enemies", ..)
    #[serde(default)]
    pub coal: String,
    pub lat: f64,
    pub lon: f64,
    pub alt: f64,
    #[serde(default,skip_serializing_if="is_none")]
    pub hdg: Option<f64>,
}

#[derive(Serialize,Deserialize,Debug,Clone,Copy,PartialEq,Default)]
pub struct Permissions {
    #[serde(default)]
    pub objects: bool,
    #[serde(default)]
    pub sensors: bool,
}

/* #endregion tactical */

/// bridge generated liveness beacon
#[derive(Serialize,Debug,Clone,PartialEq)]
#[serde(tag="type", rename="heartbeat", rename_all="camelCase")]
pub struct HeartbeatPacket {
    pub dcs_active: bool,
    /// running count of received datagrams
    pub packet_count: u64,
    pub queue_size: usize,
}

/// a datagram of the export script as received. The JSON object (including its "type" tag) is relayed
/// unchanged, the typed schema above is only a view that can be obtained through [`RawPacket::decode`]
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
#[serde(transparent)]
pub struct RawPacket(Map<String,Value>);

impl RawPacket {
    /// JSON objects only
    pub fn from_value (value: Value)->Option<Self> {
        match value {
            Value::Object(map) => Some( RawPacket(map)),
            _ => None
        }
    }

    /// the "type" tag
    pub fn kind (&self)->Option<&str> {
        self.0.get("type").and_then( Value::as_str)
    }

    pub fn t_model (&self)->Option<f64> {
        self.0.get("t_model").and_then( Value::as_f64)
    }

    pub fn get (&self, key: &str)->Option<&Value> {
        self.0.get(key)
    }

    /// typed view, fails if the datagram does not match the schema of `T`
    pub fn decode<T: DeserializeOwned> (&self)->Option<T> {
        serde_json::from_value( Value::Object( self.0.clone())).ok()
    }
}

/// what we accept on the UDP port. The export script tags each datagram with a "type" field, anything
/// that is not a JSON object with one of these tags gets dropped
#[derive(Debug,Clone,PartialEq)]
pub enum UdpMessage {
    Telemetry(RawPacket),
    Tactical(RawPacket),
}

/// what we publish. Each payload carries its own "type" tag, which doubles as the broadcast event name
#[derive(Serialize,Debug,Clone,Copy)]
#[serde(untagged)]
pub enum Payload<'a> {
    Telemetry(&'a RawPacket),
    Tactical(&'a RawPacket),
    Heartbeat(&'a HeartbeatPacket),
}

impl<'a> Payload<'a> {
    pub fn event (&self)->&'static str {
        match self {
            Payload::Telemetry(_) => "telemetry",
            Payload::Tactical(_) => "tactical",
            Payload::Heartbeat(_) => "heartbeat",
        }
    }
}

/// classify a raw datagram. Returns `None` for anything that is not a UTF-8 JSON object with a known "type" tag
pub fn parse_datagram (data: &[u8])->Option<UdpMessage> {
    let pkt = RawPacket( serde_json::from_slice::<Map<String,Value>>(data).ok()?);
    match pkt.kind() {
        Some("telemetry") => Some( UdpMessage::Telemetry(pkt)),
        Some("tactical") => Some( UdpMessage::Tactical(pkt)),
        _ => None
    }
}
