#![allow(unused)]

use std::time::{Duration, Instant};
use serde::Deserialize;
use jarvis_common::datetime::{deserialize_duration, interval_for_rate, is_within, millis, secs};
use jarvis_common::net::join_url;

#[derive(Deserialize,Debug)]
struct Intervals {
    #[serde(deserialize_with="deserialize_duration")]
    publish: Duration,
    #[serde(deserialize_with="deserialize_duration")]
    metrics: Duration,
}

#[test]
fn test_deserialize_duration () {
    let intervals: Intervals = ron::from_str( r#"(publish: "250ms", metrics: "5s")"#).unwrap();
    println!("{intervals:?}");
    assert_eq!( intervals.publish, millis(250));
    assert_eq!( intervals.metrics, secs(5));
}

#[test]
fn test_interval_for_rate () {
    assert_eq!( interval_for_rate(4.0), Some(millis(250)));
    assert_eq!( interval_for_rate(1.0), Some(secs(1)));
    assert_eq!( interval_for_rate(0.0), None);
    assert_eq!( interval_for_rate(-2.0), None);
    assert_eq!( interval_for_rate(f64::NAN), None);
}

#[test]
fn test_is_within () {
    let t0 = Instant::now();
    assert!( !is_within( None, t0, secs(3)));
    assert!( is_within( Some(t0), t0 + millis(2999), secs(3)));
    assert!( !is_within( Some(t0), t0 + secs(3), secs(3)));
    assert!( is_within( Some(t0 + secs(1)), t0, secs(3))); // saturates at zero
}

#[test]
fn test_join_url () {
    assert_eq!( join_url("https://x.supabase.co/", "/realtime/v1/api/broadcast"), "https://x.supabase.co/realtime/v1/api/broadcast");
    assert_eq!( join_url("http://localhost:3000", "api/bridge/claim"), "http://localhost:3000/api/bridge/claim");
}
