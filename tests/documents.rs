//! Whole-document decoding of a realistic configuration file.

use tomlet::{parse, Offset, Value};

const SERVER_CONFIG: &str = r##"
# Relay node configuration.

title = "relay node"
schema-version = 3

[server]
bind = "0.0.0.0"
ports = [8001, 8001, 8002]
max-connections = 5_000
read-timeout = 12.5        # seconds
enabled = true

[server.tls]
cert = 'C:\certs\relay.pem'
ciphers = [
    "TLS_AES_128_GCM_SHA256",
    "TLS_AES_256_GCM_SHA384", # preferred
]

[limits]
burst.capacity = 0x400
burst.refill-rate = 0b1010
"free tier".quota = 0o77

[metadata]
deployed = 2024-11-05T09:30:00.250-07:00
build-day = 2024-11-01
restart-window = 03:15:00
motd = """
Scheduled maintenance \
every first Sunday."""

[[peer]]
name = "alpha"
endpoint = { host = "10.0.0.1", port = 8001 }

[[peer]]
name = "beta"
endpoint = { host = "10.0.0.2", port = 8002 }
weight = -inf
"##;

#[test]
fn server_config() {
    let doc = parse(SERVER_CONFIG).unwrap();

    assert_eq!(doc.get("title").unwrap().as_str().unwrap(), "relay node");
    assert_eq!(doc.get("schema-version").unwrap().as_integer().unwrap(), 3);

    let server = doc.get("server").unwrap().as_table().unwrap();
    assert_eq!(
        server.get("ports").unwrap(),
        &[8001_i64, 8001, 8002].into_iter().collect::<Value<'_>>()
    );
    assert_eq!(
        server.get("max-connections").unwrap().as_integer().unwrap(),
        5_000
    );
    assert_eq!(server.get("read-timeout").unwrap().as_float().unwrap(), 12.5);
    assert!(server.get("enabled").unwrap().as_bool().unwrap());

    // The literal string keeps its backslashes.
    let tls = server.get("tls").unwrap().as_table().unwrap();
    assert_eq!(
        tls.get("cert").unwrap().as_str().unwrap(),
        r"C:\certs\relay.pem"
    );
    assert_eq!(tls.get("ciphers").unwrap().as_array().unwrap().len(), 2);

    // Dotted keys and non-decimal radices.
    let limits = doc.get("limits").unwrap().as_table().unwrap();
    let burst = limits.get("burst").unwrap().as_table().unwrap();
    assert_eq!(burst.get("capacity").unwrap().as_integer().unwrap(), 1024);
    assert_eq!(burst.get("refill-rate").unwrap().as_integer().unwrap(), 10);
    let free_tier = limits.get("free tier").unwrap().as_table().unwrap();
    assert_eq!(free_tier.get("quota").unwrap().as_integer().unwrap(), 63);

    // Date-times in all their local and offset forms.
    let metadata = doc.get("metadata").unwrap().as_table().unwrap();
    let deployed = metadata.get("deployed").unwrap().as_datetime().unwrap();
    assert_eq!(deployed.offset, Some(Offset::Custom { minutes: -420 }));
    assert_eq!(deployed.time.unwrap().microsecond, 250_000);
    let build_day = metadata.get("build-day").unwrap().as_datetime().unwrap();
    assert!(build_day.time.is_none());
    let window = metadata.get("restart-window").unwrap().as_datetime().unwrap();
    assert!(window.date.is_none());
    assert_eq!(window.time.unwrap().hour, 3);

    // The line-ending backslash joins the message onto one line.
    assert_eq!(
        metadata.get("motd").unwrap().as_str().unwrap(),
        "Scheduled maintenance every first Sunday."
    );

    // Array of tables, with inline tables inside.
    let peers = doc.get("peer").unwrap().as_array().unwrap();
    assert_eq!(peers.len(), 2);
    let alpha = peers.get(0).unwrap().as_table().unwrap();
    assert_eq!(alpha.get("name").unwrap().as_str().unwrap(), "alpha");
    let endpoint = alpha.get("endpoint").unwrap().as_table().unwrap();
    assert_eq!(endpoint.get("host").unwrap().as_str().unwrap(), "10.0.0.1");
    assert_eq!(endpoint.get("port").unwrap().as_integer().unwrap(), 8001);
    let beta = peers.get(1).unwrap().as_table().unwrap();
    assert_eq!(
        beta.get("weight").unwrap().as_float().unwrap(),
        f64::NEG_INFINITY
    );
}

#[test]
fn insertion_order_is_source_order() {
    let doc = parse(SERVER_CONFIG).unwrap();
    let keys: Vec<_> = doc.iter().map(|(key, _)| key).collect();
    assert_eq!(
        keys,
        ["title", "schema-version", "server", "limits", "metadata", "peer"]
    );

    let server: Vec<_> = doc
        .get("server")
        .unwrap()
        .as_table()
        .unwrap()
        .iter()
        .map(|(key, _)| key)
        .collect();
    assert_eq!(
        server,
        ["bind", "ports", "max-connections", "read-timeout", "enabled", "tls"]
    );
}
