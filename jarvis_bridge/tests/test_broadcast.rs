/// tests for the HTTP broadcast client against a minimal local HTTP server
/// run with "cargo test --test test_broadcast -- --nocapture"

use std::time::Duration;
use serde_json::Value;
use tokio::{io::{AsyncReadExt, AsyncWriteExt}, net::{TcpListener, TcpStream}, task::JoinHandle};
use jarvis_bridge::{broadcast::{BroadcastSink, LiveBroadcaster}, errors::BridgeError, packets::{HeartbeatPacket, Payload}};

const OK: &str = "HTTP/1.1 200 OK\r\ncontent-length: 0\r\nconnection: close\r\n\r\n";
const UNAVAILABLE: &str = "HTTP/1.1 503 Service Unavailable\r\ncontent-length: 0\r\nconnection: close\r\n\r\n";

/// read one request, returns (head, body)
async fn read_request (stream: &mut TcpStream)->(String,String) {
    let mut buf: Vec<u8> = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = stream.read( &mut chunk).await.unwrap();
        if n == 0 { break }
        buf.extend_from_slice( &chunk[..n]);

        if let Some(pos) = buf.windows(4).position( |w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy( &buf[..pos]).to_lowercase();
            let len = head.lines()
                .find_map( |l| l.strip_prefix("content-length:"))
                .and_then( |v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= pos + 4 + len {
                let head = String::from_utf8_lossy( &buf[..pos]).to_string();
                let body = String::from_utf8_lossy( &buf[pos+4..pos+4+len]).to_string();
                return (head, body)
            }
        }
    }
    panic!("incomplete request: {:?}", String::from_utf8_lossy(&buf))
}

/// serve a single request with `response` (or never answer if `None`)
async fn serve_once (response: Option<&'static str>)->(String, JoinHandle<(String,String)>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}/", listener.local_addr().unwrap());

    let server = tokio::spawn( async move {
        let (mut stream,_) = listener.accept().await.unwrap();
        let req = read_request( &mut stream).await;
        match response {
            Some(response) => stream.write_all( response.as_bytes()).await.unwrap(),
            None => tokio::time::sleep( Duration::from_secs(10)).await
        }
        req
    });

    (base_url, server)
}

fn heartbeat ()->HeartbeatPacket {
    HeartbeatPacket { dcs_active: true, packet_count: 7, queue_size: 1 }
}

#[tokio::test]
async fn test_broadcast_request () {
    let (base_url, server) = serve_once( Some(OK)).await;
    let sink = LiveBroadcaster::new( &base_url, "test-key", "session:test", Duration::from_secs(5)).unwrap();
    assert_eq!( sink.endpoint(), format!("{base_url}realtime/v1/api/broadcast"));

    let hb = heartbeat();
    sink.broadcast( &Payload::Heartbeat(&hb)).await.unwrap();

    let (head, body) = server.await.unwrap();
    println!("{head}\n\n{body}");
    assert!( head.starts_with("POST /realtime/v1/api/broadcast HTTP/1.1\r\n"));

    let headers = head.to_lowercase();
    assert!( headers.contains("\r\napikey: test-key\r\n") || headers.ends_with("\r\napikey: test-key"));
    assert!( headers.contains("content-type: application/json"));

    let v: Value = serde_json::from_str( &body).unwrap();
    assert_eq!( v["messages"][0]["topic"], "session:test");
    assert_eq!( v["messages"][0]["event"], "heartbeat");
    assert_eq!( v["messages"][0]["payload"]["type"], "heartbeat");
    assert_eq!( v["messages"][0]["payload"]["packetCount"], 7);
}

#[tokio::test]
async fn test_broadcast_status_error () {
    let (base_url, server) = serve_once( Some(UNAVAILABLE)).await;
    let sink = LiveBroadcaster::new( &base_url, "test-key", "session:test", Duration::from_secs(5)).unwrap();

    let hb = heartbeat();
    match sink.broadcast( &Payload::Heartbeat(&hb)).await {
        Err(BridgeError::HttpStatus { status, reason }) => {
            assert_eq!( status, 503);
            assert_eq!( reason, "Service Unavailable");
        }
        other => panic!("expected HTTP status error, got {other:?}")
    }
    server.await.unwrap();
}

#[tokio::test]
async fn test_broadcast_timeout () {
    let (base_url, server) = serve_once( None).await;
    let timeout = Duration::from_millis(200);
    let sink = LiveBroadcaster::new( &base_url, "test-key", "session:test", timeout).unwrap();

    let hb = heartbeat();
    match sink.broadcast( &Payload::Heartbeat(&hb)).await {
        Err(BridgeError::Timeout(d)) => assert_eq!( d, timeout),
        other => panic!("expected timeout, got {other:?}")
    }
    server.abort();
}
