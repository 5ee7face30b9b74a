use crate::client::RouterApi;
use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use mrx_common::ApiOp;
use mrx_common::types::{
    Metadata, MetadataConfig, MetadataStatus, Route, RouteConnection, RouteDestination,
    RouteHealth, RouteStatus, Router,
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Scripted router used by collector tests. Clones share
/// state so a test can keep a handle after boxing one
/// into the engine.
#[derive(Clone, Default)]
pub struct FakeRouterApi {
    state: Arc<Mutex<FakeState>>,
}

#[derive(Default)]
struct FakeState {
    router: Option<Router>,
    metadata: Vec<FakeMetadata>,
    routes: Vec<FakeRoute>,
    /// (op, name) pairs that error, an empty name fails every call of that op
    failing: HashSet<(ApiOp, String)>,
    calls: Vec<(ApiOp, String)>,
}

#[derive(Debug, Clone)]
pub struct FakeMetadata {
    pub name: String,
    pub config: MetadataConfig,
    pub status: MetadataStatus,
}

#[derive(Debug, Clone, Default)]
pub struct FakeRoute {
    pub name: String,
    pub status: RouteStatus,
    pub healthy: bool,
    pub destinations: Vec<RouteDestination>,
    pub connections: Vec<RouteConnection>,
}

pub fn router(hostname: &str) -> Router {
    Router {
        process_id: 4242,
        product_edition: "MySQL Community - GPL".into(),
        time_started: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
        version: "8.0.36".into(),
        hostname: hostname.into(),
    }
}

pub fn route(name: &str, active: u64, total: u64, blocked: u64, healthy: bool) -> FakeRoute {
    FakeRoute {
        name: name.into(),
        status: RouteStatus {
            active_connections: active,
            total_connections: total,
            blocked_hosts: blocked,
        },
        healthy,
        ..Default::default()
    }
}

pub fn connection(src: &str, dst: &str, bytes_from_server: u64) -> RouteConnection {
    RouteConnection {
        source_address: src.into(),
        destination_address: dst.into(),
        bytes_from_server,
        ..Default::default()
    }
}

pub fn metadata(name: &str, cluster: &str, nodes: usize) -> FakeMetadata {
    FakeMetadata {
        name: name.into(),
        config: MetadataConfig {
            cluster_name: cluster.into(),
            time_refresh_in_ms: 500,
            group_replication_id: "gr-1".into(),
            nodes: (0..nodes)
                .map(|i| mrx_common::types::MetadataNode {
                    hostname: format!("db-{i}"),
                    port: 3306,
                })
                .collect(),
        },
        status: MetadataStatus {
            refresh_failed: 0,
            refresh_succeeded: 10,
            time_last_refresh_succeeded: None,
            last_refresh_hostname: "db-0".into(),
            last_refresh_port: 3306,
        },
    }
}

impl FakeRouterApi {
    pub fn set_router(&self, router: Option<Router>) {
        self.state.lock().unwrap().router = router;
    }

    pub fn set_metadata(&self, metadata: Vec<FakeMetadata>) {
        self.state.lock().unwrap().metadata = metadata;
    }

    pub fn set_routes(&self, routes: Vec<FakeRoute>) {
        self.state.lock().unwrap().routes = routes;
    }

    /// Makes every call of `op` fail
    pub fn fail(&self, op: ApiOp) {
        self.fail_for(op, "");
    }

    /// Makes `op` fail only for the given route/metadata name
    pub fn fail_for(&self, op: ApiOp, name: &str) {
        self.state.lock().unwrap().failing.insert((op, name.into()));
    }

    pub fn heal(&self) {
        self.state.lock().unwrap().failing.clear();
    }

    pub fn calls(&self) -> Vec<(ApiOp, String)> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count_calls(&self, op: ApiOp) -> usize {
        self.calls().iter().filter(|(o, _)| *o == op).count()
    }

    fn call<T>(&self, op: ApiOp, name: &str, f: impl FnOnce(&FakeState) -> Result<T>) -> Result<T> {
        let mut state = self.state.lock().unwrap();
        state.calls.push((op, name.into()));

        if state.failing.contains(&(op, String::new()))
            || state.failing.contains(&(op, name.to_string()))
        {
            bail!("Injected failure for {op} {name}");
        }

        f(&*state)
    }
}

impl FakeState {
    fn route(&self, name: &str) -> Result<&FakeRoute> {
        self.routes
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| anyhow!("No such route {name}"))
    }

    fn metadata(&self, name: &str) -> Result<&FakeMetadata> {
        self.metadata
            .iter()
            .find(|m| m.name == name)
            .ok_or_else(|| anyhow!("No such metadata {name}"))
    }
}

#[async_trait]
impl RouterApi for FakeRouterApi {
    async fn router_status(&self) -> Result<Router> {
        self.call(ApiOp::RouterStatus, "", |s| {
            s.router.clone().ok_or_else(|| anyhow!("Connection refused"))
        })
    }

    async fn list_metadata(&self) -> Result<Vec<Metadata>> {
        self.call(ApiOp::ListMetadata, "", |s| {
            Ok(s.metadata
                .iter()
                .map(|m| Metadata { name: m.name.clone() })
                .collect())
        })
    }

    async fn metadata_config(&self, name: &str) -> Result<MetadataConfig> {
        self.call(ApiOp::MetadataConfig, name, |s| Ok(s.metadata(name)?.config.clone()))
    }

    async fn metadata_status(&self, name: &str) -> Result<MetadataStatus> {
        self.call(ApiOp::MetadataStatus, name, |s| Ok(s.metadata(name)?.status.clone()))
    }

    async fn list_routes(&self) -> Result<Vec<Route>> {
        self.call(ApiOp::ListRoutes, "", |s| {
            Ok(s.routes
                .iter()
                .map(|r| Route { name: r.name.clone() })
                .collect())
        })
    }

    async fn route_status(&self, name: &str) -> Result<RouteStatus> {
        self.call(ApiOp::RouteStatus, name, |s| Ok(s.route(name)?.status.clone()))
    }

    async fn route_health(&self, name: &str) -> Result<RouteHealth> {
        self.call(ApiOp::RouteHealth, name, |s| {
            Ok(RouteHealth {
                is_alive: s.route(name)?.healthy,
            })
        })
    }

    async fn route_destinations(&self, name: &str) -> Result<Vec<RouteDestination>> {
        self.call(ApiOp::RouteDestinations, name, |s| {
            Ok(s.route(name)?.destinations.clone())
        })
    }

    async fn route_connections(&self, name: &str) -> Result<Vec<RouteConnection>> {
        self.call(ApiOp::RouteConnections, name, |s| {
            Ok(s.route(name)?.connections.clone())
        })
    }
}
