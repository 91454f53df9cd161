//! Tests for Publisher and Subscriber configurations

use sparkplug_flows::{Error, PublisherConfig, SubscriberConfig};

#[test]
fn test_publisher_config_creation() {
    let config = PublisherConfig::new("TestGroup", "TestNode");

    assert_eq!(config.group_id.as_deref(), Some("TestGroup"));
    assert_eq!(config.edge_node_id.as_deref(), Some("TestNode"));
    assert!(!config.debug);
    assert_eq!(config.identity().unwrap(), ("TestGroup", "TestNode"));
}

#[test]
fn test_publisher_config_with_owned_strings() {
    let group = String::from("Group1");
    let node = String::from("Node1");

    let config = PublisherConfig::new(group, node).with_debug(true);

    assert_eq!(config.group_id.as_deref(), Some("Group1"));
    assert!(config.debug);
}

#[test]
fn test_publisher_config_from_json() {
    let config =
        PublisherConfig::from_json(r#"{"groupId":"my-factory","edgeNodeId":"gateway01","debug":true}"#)
            .unwrap();

    assert_eq!(config, PublisherConfig::new("my-factory", "gateway01").with_debug(true));
}

#[test]
fn test_publisher_config_missing_fields() {
    let config = PublisherConfig::from_json(r#"{"groupId":"my-factory"}"#).unwrap();
    match config.identity() {
        Err(Error::MissingConfig { field }) => assert_eq!(field, "edgeNodeId"),
        other => panic!("Expected MissingConfig, got {:?}", other),
    }

    let config = PublisherConfig::from_json("{}").unwrap();
    assert!(matches!(
        config.identity(),
        Err(Error::MissingConfig { field: "groupId" })
    ));
}

#[test]
fn test_publisher_config_empty_strings_are_missing() {
    let config = PublisherConfig::new("", "gateway01");
    assert!(config.identity().is_err());
}

#[test]
fn test_publisher_config_rejects_malformed_json() {
    assert!(matches!(
        PublisherConfig::from_json("{groupId:"),
        Err(Error::Json(_))
    ));
}

#[test]
fn test_subscriber_config() {
    assert!(!SubscriberConfig::new().debug);
    assert!(SubscriberConfig::new().with_debug(true).debug);
    assert!(SubscriberConfig::from_json(r#"{"debug":true}"#).unwrap().debug);
    assert!(!SubscriberConfig::from_json("{}").unwrap().debug);
}

#[test]
fn test_config_with_special_characters() {
    let config = PublisherConfig::new("Group-SubGroup", "Node#1");

    assert_eq!(config.group_id.as_deref(), Some("Group-SubGroup"));
    assert_eq!(config.edge_node_id.as_deref(), Some("Node#1"));
}
