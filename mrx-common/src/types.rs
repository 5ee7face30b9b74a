use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Wrapper the REST api uses for every list response
#[derive(Debug, Clone, Deserialize)]
pub struct ItemList<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

/// Identity of the running router process
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Router {
    pub process_id: u32,
    pub product_edition: String,
    pub time_started: DateTime<Utc>,
    pub version: String,
    pub hostname: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Metadata {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataConfig {
    pub cluster_name: String,
    pub time_refresh_in_ms: u64,
    /// Only present for group replication backed clusters
    #[serde(default)]
    pub group_replication_id: String,
    #[serde(default)]
    pub nodes: Vec<MetadataNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MetadataNode {
    pub hostname: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataStatus {
    pub refresh_failed: u64,
    #[serde(default)]
    pub refresh_succeeded: u64,
    /// Absent until the first refresh has succeeded
    #[serde(default)]
    pub time_last_refresh_succeeded: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_refresh_hostname: String,
    #[serde(default)]
    pub last_refresh_port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Route {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStatus {
    pub active_connections: u64,
    pub total_connections: u64,
    pub blocked_hosts: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteHealth {
    pub is_alive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RouteDestination {
    pub address: String,
    pub port: u16,
}

/// A single client connection flowing through a route.
/// Timestamps are optional since the router omits the
/// server side ones until the connection is established
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteConnection {
    pub source_address: String,
    pub destination_address: String,
    #[serde(default)]
    pub bytes_from_server: u64,
    #[serde(default)]
    pub bytes_to_server: u64,
    #[serde(default)]
    pub time_started: Option<DateTime<Utc>>,
    #[serde(default)]
    pub time_connected_to_server: Option<DateTime<Utc>>,
    #[serde(default)]
    pub time_last_sent_to_server: Option<DateTime<Utc>>,
    #[serde(default)]
    pub time_last_received_from_server: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn router_status_from_rest_payload() {
        let body = r#"{
            "processId": 8147,
            "productEdition": "MySQL Community - GPL",
            "timeStarted": "2019-07-15T10:34:13.123456Z",
            "version": "8.0.17",
            "hostname": "router-1"
        }"#;
        let router: Router = serde_json::from_str(body).unwrap();

        assert_eq!(router.process_id, 8147);
        assert_eq!(router.hostname, "router-1");
        assert_eq!(router.time_started.timestamp(), 1563186853);
    }

    #[test]
    fn connection_without_server_timestamps() {
        let body = r#"{"items": [{
            "bytesFromServer": 100,
            "bytesToServer": 42,
            "sourceAddress": "10.0.0.1:1",
            "destinationAddress": "10.0.0.2:2",
            "timeStarted": "2020-01-01T00:00:00Z"
        }]}"#;
        let list: ItemList<RouteConnection> = serde_json::from_str(body).unwrap();
        let conn = &list.items[0];

        assert_eq!(conn.bytes_from_server, 100);
        assert!(conn.time_started.is_some());
        assert!(conn.time_connected_to_server.is_none());
        assert!(conn.time_last_received_from_server.is_none());
    }

    #[test]
    fn metadata_config_counts_nodes() {
        let body = r#"{
            "clusterName": "cluster-a",
            "timeRefreshInMs": 500,
            "groupReplicationId": "a1b2",
            "nodes": [
                {"hostname": "db-1", "port": 3306},
                {"hostname": "db-2", "port": 3306}
            ]
        }"#;
        let config: MetadataConfig = serde_json::from_str(body).unwrap();

        assert_eq!(config.nodes.len(), 2);
        assert_eq!(config.group_replication_id, "a1b2");
    }

    #[test]
    fn empty_list_has_no_items() {
        let list: ItemList<Route> = serde_json::from_str("{}").unwrap();
        assert!(list.items.is_empty());
    }
}
