use super::ConnectionFamily;
use anyhow::Result;
use mrx_common::consts::NAMESPACE;
use prometheus::{Encoder, Gauge, GaugeVec, Opts, Registry, TextEncoder};
use std::collections::HashMap;
use strum::IntoEnumIterator;

const ROUTE_LABELS: &[&str] = &["name", "router_hostname"];
const CONNECTION_LABELS: &[&str] = &["name", "router_hostname", "source_address", "destination_address"];

/// Every gauge the exporter publishes, registered against
/// one registry that the metrics server encodes on scrape.
/// prometheus vectors lock internally so collection and
/// scrapes may run concurrently.
pub struct ExporterMetrics {
    registry: Registry,

    pub up: Gauge,
    pub router_status: GaugeVec,

    pub metadata: GaugeVec,
    pub metadata_config: GaugeVec,
    pub metadata_config_nodes: GaugeVec,
    pub metadata_status: GaugeVec,

    pub route: GaugeVec,
    pub route_active_connections: GaugeVec,
    pub route_total_connections: GaugeVec,
    pub route_blocked_hosts: GaugeVec,
    pub route_health: GaugeVec,
    pub route_destinations: GaugeVec,

    route_connections: HashMap<ConnectionFamily, GaugeVec>,
}

impl ExporterMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let up = Gauge::with_opts(Opts::new("up", "Whether the router REST api answered").namespace(NAMESPACE))?;
        registry.register(Box::new(up.clone()))?;

        let mut route_connections = HashMap::new();
        for family in ConnectionFamily::iter() {
            let vec = gauge_vec(&registry, &family.metric_name(), family.help(), CONNECTION_LABELS)?;
            route_connections.insert(family, vec);
        }

        Ok(Self {
            up,
            router_status: gauge_vec(
                &registry,
                "router_status",
                "Router process information",
                &["process_id", "product_edition", "time_started", "version", "hostname", "service_name"],
            )?,

            metadata: gauge_vec(&registry, "metadata", "Metadata cache present on the router", &["name"])?,
            metadata_config: gauge_vec(
                &registry,
                "metadata_config",
                "Metadata cache configuration",
                &["name", "cluster_name", "time_refresh_in_ms", "group_replication_id"],
            )?,
            metadata_config_nodes: gauge_vec(
                &registry,
                "metadata_config_nodes",
                "Number of cluster nodes known to the metadata cache",
                &["name", "router_hostname", "cluster_name"],
            )?,
            metadata_status: gauge_vec(
                &registry,
                "metadata_status",
                "Metadata cache refresh status",
                &[
                    "name",
                    "refresh_failed",
                    "time_last_refresh_succeeded",
                    "last_refresh_hostname",
                    "last_refresh_port",
                ],
            )?,

            route: gauge_vec(&registry, "route", "Route configured on the router", &["name"])?,
            route_active_connections: gauge_vec(
                &registry,
                "route_active_connections",
                "Active connections on the route",
                ROUTE_LABELS,
            )?,
            route_total_connections: gauge_vec(
                &registry,
                "route_total_connections",
                "Connections handled by the route since start",
                ROUTE_LABELS,
            )?,
            route_blocked_hosts: gauge_vec(
                &registry,
                "route_blocked_hosts",
                "Hosts blocked by the route",
                ROUTE_LABELS,
            )?,
            route_health: gauge_vec(
                &registry,
                "route_health",
                "1 if the route is alive, 0 otherwise",
                ROUTE_LABELS,
            )?,
            route_destinations: gauge_vec(
                &registry,
                "route_destinations",
                "Destination configured for the route",
                &["name", "address", "port"],
            )?,

            route_connections,
            registry,
        })
    }

    pub fn route_connections(&self, family: ConnectionFamily) -> &GaugeVec {
        // every family is registered in new()
        &self.route_connections[&family]
    }

    /// Prometheus text exposition of the whole registry
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(buffer)
    }

    /// Reads a sample without creating it. `labels` are
    /// (name, value) pairs and must match the full label set.
    #[cfg(test)]
    pub(crate) fn sample(&self, name: &str, labels: &[(&str, &str)]) -> Option<f64> {
        let full_name = format!("{NAMESPACE}_{name}");
        self.registry
            .gather()
            .iter()
            .filter(|mf| mf.get_name() == full_name)
            .flat_map(|mf| mf.get_metric().iter())
            .find(|m| {
                let pairs = m.get_label();
                pairs.len() == labels.len()
                    && labels
                        .iter()
                        .all(|(k, v)| pairs.iter().any(|p| p.get_name() == *k && p.get_value() == *v))
            })
            .map(|m| m.get_gauge().get_value())
    }

    /// Number of label combinations currently held for `name`
    #[cfg(test)]
    pub(crate) fn series_count(&self, name: &str) -> usize {
        let full_name = format!("{NAMESPACE}_{name}");
        self.registry
            .gather()
            .iter()
            .filter(|mf| mf.get_name() == full_name)
            .map(|mf| mf.get_metric().len())
            .sum()
    }
}

fn gauge_vec(registry: &Registry, name: &str, help: &str, labels: &[&str]) -> Result<GaugeVec> {
    let vec = GaugeVec::new(Opts::new(name, help).namespace(NAMESPACE), labels)?;
    registry.register(Box::new(vec.clone()))?;
    Ok(vec)
}
