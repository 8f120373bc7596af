/// tests for config parsing, environment overrides and channel resolution (no network)
/// run with "cargo test --test test_config -- --nocapture"

use std::{collections::HashMap, time::Duration};
use jarvis_bridge::{
    config::BridgeConfig, errors::BridgeError,
    pairing::{channel_name, is_valid_code, normalize_code, resolve_channel, ChannelOptions, ChannelSource},
    DEFAULT_CHANNEL
};

#[test]
fn test_defaults () {
    let config = BridgeConfig::default();
    assert_eq!( config.udp_addr.to_string(), "0.0.0.0:7779");
    assert_eq!( config.publish_interval(), Duration::from_millis(250));
    assert_eq!( config.max_queue_size, 100);
    assert_eq!( config.staleness_timeout, Duration::from_secs(3));
    assert_eq!( config.max_backoff, Duration::from_secs(30));
    assert!( config.validate().is_ok());
}

#[test]
fn test_ron_config () {
    let src = r#"(
        udp_addr: "127.0.0.1:9000",
        publish_rate_hz: 10.0,
        staleness_timeout: "1500ms",
        max_backoff: "60s",
        supabase_url: Some("https://example.supabase.co"),
    )"#;

    let config = BridgeConfig::from_ron( src).unwrap();
    println!("{config:#?}");
    assert_eq!( config.udp_addr.port(), 9000);
    assert_eq!( config.publish_interval(), Duration::from_millis(100));
    assert_eq!( config.staleness_timeout, Duration::from_millis(1500));
    assert_eq!( config.max_backoff, Duration::from_secs(60));
    assert_eq!( config.max_queue_size, 100); // not in file
    assert_eq!( config.supabase_url.as_deref(), Some("https://example.supabase.co"));

    assert!( matches!( BridgeConfig::from_ron("( publish_rate_hz: \"fast\" )"), Err(BridgeError::ConfigError(_))));
}

#[test]
fn test_validate () {
    let bad = [
        BridgeConfig { publish_rate_hz: 0.0, ..Default::default() },
        BridgeConfig { publish_rate_hz: -4.0, ..Default::default() },
        BridgeConfig { max_queue_size: 0, ..Default::default() },
        BridgeConfig { base_backoff: Duration::from_secs(60), ..Default::default() },
    ];
    for config in bad {
        assert!( matches!( config.validate(), Err(BridgeError::ConfigError(_))), "accepted {config:?}");
    }
}

#[test]
fn test_env_overrides () {
    let env: HashMap<&str,&str> = HashMap::from([
        ("NEXT_PUBLIC_SUPABASE_URL", "https://public.supabase.co"),
        ("SUPABASE_KEY", ""),  // empty values are ignored
        ("NEXT_PUBLIC_SUPABASE_ANON_KEY", "anon-key"),
        ("JARVIS_UDP_PORT", "7780"),
    ]);

    let mut config = BridgeConfig::default();
    assert!( matches!( config.require_credentials(), Err(BridgeError::MissingConfig(_))));

    config.apply_env( |k| env.get(k).map( |v| v.to_string())).unwrap();
    assert_eq!( config.udp_addr.port(), 7780);
    assert_eq!( config.require_credentials().unwrap(), ("https://public.supabase.co", "anon-key"));
    assert!( config.api_url.is_none());

    let mut config = BridgeConfig::default();
    assert!( config.apply_env( |k| (k == "JARVIS_UDP_PORT").then( || "seventy".to_string())).is_err());
}

#[test]
fn test_pairing_codes () {
    assert!( is_valid_code("ABC234"));
    assert!( !is_valid_code("ABC23"));
    assert!( !is_valid_code("ABCI23"));  // no I, O, 0 or 1
    assert!( !is_valid_code("ABC0Z2"));

    assert_eq!( normalize_code(" abc234 \n").unwrap(), "ABC234");
    assert!( matches!( normalize_code("abc1"), Err(BridgeError::InvalidPairingCode(_))));
    assert_eq!( channel_name("f00"), "session:f00");
}

#[tokio::test]
async fn test_resolve_channel () {
    let config = BridgeConfig::default();

    let res = resolve_channel( &ChannelOptions::default(), &config).await.unwrap();
    assert_eq!( res.channel, DEFAULT_CHANNEL);
    assert_eq!( res.source, ChannelSource::Default);

    let opts = ChannelOptions { channel: Some("session:abc".to_string()), code: Some("ABC234".to_string()) };
    let res = resolve_channel( &opts, &config).await.unwrap();
    assert_eq!( res.channel, "session:abc");
    assert_eq!( res.source, ChannelSource::Explicit);

    // no claim endpoint configured
    let opts = ChannelOptions { channel: None, code: Some("xyz789".to_string()) };
    let res = resolve_channel( &opts, &config).await.unwrap();
    assert_eq!( res.channel, "session:XYZ789");
    assert_eq!( res.source, ChannelSource::Unclaimed);

    let opts = ChannelOptions { channel: None, code: Some("nope".to_string()) };
    assert!( matches!( resolve_channel( &opts, &config).await, Err(BridgeError::InvalidPairingCode(_))));
}
