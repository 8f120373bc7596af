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

use std::{path::PathBuf, sync::Arc, time::Instant};
use anyhow::{anyhow, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use jarvis_common::process::{exit, termination_signal};
use jarvis_bridge::{
    broadcast::LiveBroadcaster, config::{BridgeConfig, ENV_CHANNEL}, metrics::Metrics,
    pairing::{resolve_channel, ChannelOptions}, publisher::{BridgeHandler, Publisher}, udp::UdpListener
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = "relay DCS telemetry received over UDP to a realtime broadcast channel")]
struct Args {
    /// publish to this channel (development mode, overrides BRIDGE_CHANNEL)
    #[arg(short,long)]
    channel: Option<String>,

    /// pairing code shown by the web dashboard
    #[arg(long)]
    code: Option<String>,

    /// RON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// UDP port to listen on (overrides config and JARVIS_UDP_PORT)
    #[arg(long)]
    udp_port: Option<u16>,

    /// log at debug level
    #[arg(short,long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing( args.verbose);

    if let Err(e) = run( args).await {
        error!("{e}");
        eprintln!("jarvis_bridge: {e}");
        exit(1)
    }
}

fn init_tracing (verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else( |_| EnvFilter::new("info")) // use RUST_LOG to set max level
    };
    // only fails if there already is a global subscriber
    let _ = tracing_subscriber::fmt().with_env_filter( filter).try_init();
}

async fn run (args: Args)->Result<()> {
    let mut config = BridgeConfig::load( args.config.as_deref())?;
    if let Some(port) = args.udp_port {
        config.udp_addr.set_port( port);
    }
    let (supabase_url, api_key) = config.require_credentials()?;

    let opts = ChannelOptions {
        channel: args.channel.or_else( || std::env::var(ENV_CHANNEL).ok()),
        code: args.code,
    };
    let resolution = resolve_channel( &opts, &config).await?;

    info!("JARVIS DCS bridge v{}", env!("CARGO_PKG_VERSION"));
    info!("  realtime: {}", supabase_url);
    info!("  channel:  {}", resolution);
    info!("  UDP:      {}", config.udp_addr);
    info!("  rate:     {} Hz", config.publish_rate_hz);

    let metrics = Arc::new( Metrics::new( Instant::now()));
    let sink = Arc::new( LiveBroadcaster::new( supabase_url, api_key, &resolution.channel, config.publish_timeout)?);
    let publisher = Arc::new( Publisher::new( &config, metrics.clone(), sink));
    let handler = Arc::new( BridgeHandler::new( metrics.clone(), publisher.clone()));

    let listener = UdpListener::bind( config.udp_addr).await?;
    metrics.start( config.metrics_interval);
    publisher.start();
    let mut listener_task = listener.start( handler);

    let res = tokio::select! {
        sig = termination_signal() => {
            sig.map( |sig| info!("received {sig}, shutting down")).map_err( |e| anyhow!("signal handler failed: {e}"))
        }
        res = &mut listener_task => {
            match res {
                Ok(Ok(())) => Err( anyhow!("UDP listener terminated")),
                Ok(Err(e)) => Err( e.into()),
                Err(e) => Err( anyhow!("UDP listener task failed: {e}"))
            }
        }
    };

    // no flush, whatever is still queued is dropped
    listener_task.abort();
    publisher.terminate();
    metrics.terminate();

    if res.is_ok() {
        info!("Goodbye.");
    }
    res
}
