/// tests for the UDP listener using real sockets on localhost
/// run with "cargo test --test test_udp -- --nocapture"

use std::{net::SocketAddr, sync::{Arc, Mutex}, time::Duration};
use tokio::net::UdpSocket;
use jarvis_bridge::{errors::BridgeError, packets::*, udp::{dispatch, PacketHandler, UdpListener}};

#[derive(Default)]
struct Collector {
    telemetry: Mutex<Vec<RawPacket>>,
    tactical: Mutex<Vec<RawPacket>>,
}

impl PacketHandler for Collector {
    fn on_telemetry (&self, pkt: RawPacket) { self.telemetry.lock().unwrap().push(pkt) }
    fn on_tactical (&self, pkt: RawPacket) { self.tactical.lock().unwrap().push(pkt) }
}

impl Collector {
    fn counts (&self)->(usize,usize) {
        (self.telemetry.lock().unwrap().len(), self.tactical.lock().unwrap().len())
    }
}

const TELEMETRY: &str = r#"{"type":"telemetry","t_model":3.0,"pos":{"lat":1.0,"lon":2.0,"alt_m":3.0},
  "att":{"pitch_rad":0.0,"bank_rad":0.0,"yaw_rad":0.0},"spd":{"ias_mps":100.0,"mach":0.3},"hdg_rad":0.5}"#;

const TACTICAL: &str = r#"{"type":"tactical","nav":{"master_mode":"AA","sub_mode":"BVR","autothrust":false}}"#;

fn localhost ()->SocketAddr { "127.0.0.1:0".parse().unwrap() }

async fn wait_for (collector: &Collector, expected: (usize,usize)) {
    for _ in 0..100 {
        if collector.counts() == expected { return }
        tokio::time::sleep( Duration::from_millis(20)).await;
    }
}

#[test]
fn test_dispatch () {
    let collector = Collector::default();
    assert!( !dispatch( b"{garbage", &collector));
    assert!( dispatch( TELEMETRY.as_bytes(), &collector));
    assert!( dispatch( TACTICAL.as_bytes(), &collector));
    assert_eq!( collector.counts(), (1,1));
}

#[tokio::test]
async fn test_malformed_then_valid () {
    let listener = UdpListener::bind( localhost()).await.unwrap();
    let addr = listener.local_addr();
    let collector = Arc::new( Collector::default());
    let task = listener.start( collector.clone());

    let sender = UdpSocket::bind( localhost()).await.unwrap();
    sender.send_to( b"not json at all", addr).await.unwrap();
    sender.send_to( br#"{"type":"unknown"}"#, addr).await.unwrap();
    sender.send_to( TELEMETRY.as_bytes(), addr).await.unwrap();

    wait_for( &collector, (1,0)).await;
    // give stray datagrams a chance to show up
    tokio::time::sleep( Duration::from_millis(50)).await;
    assert_eq!( collector.counts(), (1,0));
    assert_eq!( collector.telemetry.lock().unwrap()[0].t_model(), Some(3.0));

    sender.send_to( TACTICAL.as_bytes(), addr).await.unwrap();
    wait_for( &collector, (1,1)).await;
    assert_eq!( collector.counts(), (1,1));
    let tactical: TacticalPacket = collector.tactical.lock().unwrap()[0].decode().unwrap();
    assert_eq!( tactical.nav.map( |n| n.master_mode), Some("AA".to_string()));

    assert!( !task.is_finished()); // bad datagrams do not end the listener
    task.abort();
}

#[tokio::test]
async fn test_bind_failure () {
    let first = UdpListener::bind( localhost()).await.unwrap();

    match UdpListener::bind( first.local_addr()).await {
        Err(BridgeError::Bind(addr,_)) => assert_eq!( addr, first.local_addr().to_string()),
        Err(e) => panic!("unexpected error {e}"),
        Ok(_) => panic!("second bind on same port succeeded")
    }
}
