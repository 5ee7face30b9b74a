use super::snapshot::{Topology, TrackedConnection};
use crate::client::RouterApi;
use crate::metrics::{ConnectionFamily, ExporterMetrics};
use anyhow::{Context, Result};
use log::trace;
use mrx_common::types::{RouteConnection, Router};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteMode {
    /// Values fetched from the router this cycle
    Live,
    /// Router down, last known routes forced to zero
    ZeroFilled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteReport {
    pub mode: RouteMode,
    pub routes: usize,
    pub connections: usize,
}

impl RouteReport {
    fn new(mode: RouteMode, topology: &Topology) -> Self {
        Self {
            mode,
            routes: topology.routes.len(),
            connections: topology.connections.len(),
        }
    }
}

fn connection_labels<'a>(route: &'a str, hostname: &'a str, conn: &'a RouteConnection) -> [&'a str; 4] {
    [route, hostname, &conn.source_address, &conn.destination_address]
}

/// Stage C with the router down. Every route and connection
/// of the last good topology is set to 0 with the labels it
/// carried, so consumers see it as idle rather than gone.
pub(super) fn zero_fill(
    metrics: &ExporterMetrics,
    topology: &Topology,
    families: &[ConnectionFamily],
) -> RouteReport {
    let hostname = topology.hostname.as_str();

    for route in &topology.routes {
        let labels = [route.name.as_str(), hostname];
        metrics.route_active_connections.with_label_values(&labels).set(0.0);
        metrics.route_total_connections.with_label_values(&labels).set(0.0);
        metrics.route_blocked_hosts.with_label_values(&labels).set(0.0);
        metrics.route_health.with_label_values(&labels).set(0.0);
    }

    for family in families {
        let gauges = metrics.route_connections(*family);
        for tracked in &topology.connections {
            gauges
                .with_label_values(&connection_labels(&tracked.route, hostname, &tracked.connection))
                .set(0.0);
        }
    }

    RouteReport::new(RouteMode::ZeroFilled, topology)
}

/// Stage C with a live router. Returns the topology seen,
/// only once every route has been collected.
pub(super) async fn collect_routes(
    api: &dyn RouterApi,
    metrics: &ExporterMetrics,
    router: &Router,
    families: &[ConnectionFamily],
) -> Result<Topology> {
    let routes = api.list_routes().await.context("Failed to list routes")?;

    // connections come and go between cycles, start
    // each enabled family from an empty label set
    for family in families {
        metrics.route_connections(*family).reset();
    }

    let hostname = router.hostname.as_str();
    let mut connections = Vec::new();

    for route in &routes {
        let name = route.name.as_str();
        let labels = [name, hostname];

        metrics.route.with_label_values(&[name]);

        let status = api
            .route_status(name)
            .await
            .with_context(|| format!("Failed to fetch status for route {name}"))?;
        metrics
            .route_active_connections
            .with_label_values(&labels)
            .set(status.active_connections as f64);
        metrics
            .route_total_connections
            .with_label_values(&labels)
            .set(status.total_connections as f64);
        metrics
            .route_blocked_hosts
            .with_label_values(&labels)
            .set(status.blocked_hosts as f64);

        let health = api
            .route_health(name)
            .await
            .with_context(|| format!("Failed to fetch health for route {name}"))?;
        metrics
            .route_health
            .with_label_values(&labels)
            .set(if health.is_alive { 1.0 } else { 0.0 });

        let destinations = api
            .route_destinations(name)
            .await
            .with_context(|| format!("Failed to fetch destinations for route {name}"))?;
        for dest in &destinations {
            let port = dest.port.to_string();
            metrics
                .route_destinations
                .with_label_values(&[name, &dest.address, &port]);
        }

        let route_connections = api
            .route_connections(name)
            .await
            .with_context(|| format!("Failed to fetch connections for route {name}"))?;
        for conn in &route_connections {
            for family in families {
                metrics
                    .route_connections(*family)
                    .with_label_values(&connection_labels(name, hostname, conn))
                    .set(family.value(conn));
            }
        }

        trace!(
            "Collected route {}: active={} total={} alive={} destinations={} connections={}",
            name,
            status.active_connections,
            status.total_connections,
            health.is_alive,
            destinations.len(),
            route_connections.len()
        );

        connections.extend(route_connections.into_iter().map(|connection| TrackedConnection {
            route: route.name.clone(),
            connection,
        }));
    }

    Ok(Topology {
        hostname: hostname.to_string(),
        routes,
        connections,
    })
}

/// Report for a topology the live path just produced
pub(super) fn live_report(topology: &Topology) -> RouteReport {
    RouteReport::new(RouteMode::Live, topology)
}
