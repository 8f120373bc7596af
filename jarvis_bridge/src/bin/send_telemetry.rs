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

use std::{net::UdpSocket, sync::{Arc, atomic::{AtomicBool, Ordering}}, thread, time::{Duration, Instant}};
use anyhow::Result;
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};
use jarvis_common::{datetime::interval_for_rate, process::set_ctrlc_handler};
use jarvis_bridge::{packets::*, UDP_PORT};

/// development tool that plays the role of the DCS export script
#[derive(Parser, Debug)]
#[command(version, about, long_about = "send synthetic DCS telemetry datagrams to a jarvis_bridge")]
struct Args {
    /// address of the bridge
    #[arg(long, default_value_t = format!("127.0.0.1:{UDP_PORT}"))]
    target: String,

    /// telemetry packets per second
    #[arg(long, default_value_t = 60.0)]
    rate: f64,

    /// seconds to run (until ctrl-c if not set)
    #[arg(long)]
    duration: Option<f64>,

    /// send a tactical packet every N telemetry packets (0 disables)
    #[arg(long, default_value_t = 30)]
    tactical_every: u64,

    /// interleave malformed datagrams
    #[arg(long)]
    garbage: bool,
}

#[derive(Serialize)]
#[serde(tag="type", rename_all="lowercase")]
enum Outgoing<'a> {
    Telemetry(&'a TelemetryPacket),
    Tactical(&'a TacticalPacket),
}

const GARBAGE: [&[u8];3] = [ b"not json", br#"{"type":"weather","wind":3}"#, &[0xff, 0xfe, 0x00] ];

fn main()->Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let interval = interval_for_rate( args.rate).ok_or_else( || anyhow::anyhow!("invalid rate: {}", args.rate))?;
    let socket = UdpSocket::bind("0.0.0.0:0")?;
    socket.connect( &args.target)?;

    let running = Arc::new( AtomicBool::new(true));
    {
        let running = running.clone();
        set_ctrlc_handler( move || running.store( false, Ordering::Relaxed)).map_err( |e| anyhow::anyhow!(e))?;
    }

    info!("sending to {} at {} Hz", args.target, args.rate);
    let start = Instant::now();
    let end = args.duration.map( |d| start + Duration::from_secs_f64(d));
    let mut n_sent: u64 = 0;
    let mut n_garbage: u64 = 0;

    while running.load( Ordering::Relaxed) && end.is_none_or( |end| Instant::now() < end) {
        let t = start.elapsed().as_secs_f64();
        n_sent += 1;

        send( &socket, &Outgoing::Telemetry( &telemetry_at(t)));
        if args.tactical_every > 0 && n_sent % args.tactical_every == 0 {
            send( &socket, &Outgoing::Tactical( &tactical_at(t)));
        }
        if args.garbage && n_sent % 10 == 0 {
            let _ = socket.send( GARBAGE[(n_garbage as usize) % GARBAGE.len()]);
            n_garbage += 1;
        }

        thread::sleep( interval);
    }

    info!("sent {} telemetry packets ({} garbage) in {:.1}s", n_sent, n_garbage, start.elapsed().as_secs_f64());
    Ok(())
}

fn send (socket: &UdpSocket, msg: &Outgoing<'_>) {
    match serde_json::to_vec( msg) {
        Ok(data) => if let Err(e) = socket.send( &data) { warn!("send failed: {e}") }
        Err(e) => warn!("serialization failed: {e}")
    }
}

/// a 2 min circle around Batumi at 3000m
fn telemetry_at (t: f64)->TelemetryPacket {
    let phase = t * std::f64::consts::TAU / 120.0;
    TelemetryPacket {
        t_model: t,
        pos: Position { lat: 41.6 + 0.1 * phase.sin(), lon: 41.6 + 0.1 * phase.cos(), alt_m: 3000.0, alt_agl_m: Some(2980.0) },
        att: Attitude { pitch_rad: 0.02, bank_rad: 0.35, yaw_rad: phase },
        spd: Speed { ias_mps: 180.0, tas_mps: Some(205.0), vvi_mps: Some(0.0), mach: 0.62 },
        hdg_rad: phase % std::f64::consts::TAU,
        aero: Some( Aero { aoa_rad: 0.05, g: Vec3 { x: 0.0, y: 1.06, z: 0.0 }, ang_vel: Vec3 { x: 0.0, y: 0.05, z: 0.0 } }),
        fuel: Some( Fuel { internal: (1.0 - t / 3600.0).max(0.0), external: 0.0 }),
        eng: Some( Engine { rpm_pct: 85.0, fuel_con: 0.6 }),
    }
}

fn tactical_at (t: f64)->TacticalPacket {
    TacticalPacket {
        t_model: Some(t),
        weapons: Some( Weapons { current_station: 2, gun_rounds: 510, stations: vec![
            Station { idx: 2, name: "AIM-120C".to_string(), count: 1 },
            Station { idx: 3, name: "AIM-9X".to_string(), count: 1 },
        ]}),
        countermeasures: Some( Countermeasures { chaff: 60, flare: 30 }),
        nav: Some( Navigation { master_mode: "NAV".to_string(), sub_mode: "ROUTE".to_string(), autothrust: false }),
        mech: Some( Mechanization { gear_status: 0.0, flaps_value: 0.0, speedbrakes: 0.0 }),
        mcp_warnings: Some( Vec::new()),
        permissions: Some( Permissions { objects: false, sensors: false }),
        ..Default::default()
    }
}
