//! Replays a short telemetry session through both flows.
//!
//! Run with `RUST_LOG=debug cargo run --example replay` to see the flows'
//! own logging.

use chrono::{Duration, Utc};
use sparkplug_flows::{
    MemoryStore, Message, Payload, Publisher, PublisherConfig, Result, Subscriber, SubscriberConfig,
};

fn timestamp() -> String {
    let now = chrono::Local::now();
    now.format("%H:%M:%S%.3f").to_string()
}

fn describe(payload: &Payload) -> String {
    payload
        .metrics()
        .map(|m| match (&m.name, m.alias) {
            (Some(name), Some(alias)) => format!("{}#{}={:?}", name, alias, m.value),
            (None, Some(alias)) => format!("#{}={:?}", alias, m.value),
            (Some(name), None) => format!("{}={:?}", name, m.value),
            (None, None) => format!("?={:?}", m.value),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn main() -> Result<()> {
    env_logger::init();

    println!("Sparkplug B flow replay");
    println!("=======================\n");

    let config = PublisherConfig::from_json(r#"{"groupId":"my-factory","edgeNodeId":"gateway01","debug":true}"#)?;
    let mut publisher = Publisher::new(config, MemoryStore::new());
    let mut subscriber = Subscriber::new(SubscriberConfig::new().with_debug(true), MemoryStore::new());

    let start = Utc::now();
    let session = [
        ("te/device/sensor01///m/", r#"{"temperature":23.5,"humidity":41.0}"#),
        ("te/device/sensor01///m/", r#"{"temperature":23.7}"#),
        ("te/device/sensor01///a/HighTemp", r#"{"text":"Temperature high"}"#),
        ("te/device/gateway01///m/", r#"{"cpu":12.5,"online":true}"#),
        ("te/device/sensor01///e/login", r#"{"text":"user admin logged in"}"#),
        ("te/device/sensor01///a/HighTemp", ""),
        ("te/device/sensor01///m/", r#"{"temperature":22.9,"pressure":1013.2}"#),
    ];

    for (i, (topic, body)) in session.into_iter().enumerate() {
        let input = Message::new(start + Duration::seconds(i as i64), topic, body);
        println!("[{}] <- {} {}", timestamp(), topic, body);

        for outbound in publisher.on_message(&input) {
            let payload = Payload::parse(&outbound.payload)?;
            println!(
                "[{}]    -> {} seq={:?} retain={} [{}]",
                timestamp(),
                outbound.topic,
                payload.seq(),
                outbound.is_retained(),
                describe(&payload)
            );

            for measurement in subscriber.on_message(&outbound) {
                println!(
                    "[{}]       => {} {}",
                    timestamp(),
                    measurement.topic,
                    String::from_utf8_lossy(&measurement.payload)
                );
            }
        }
        println!();
    }

    Ok(())
}
