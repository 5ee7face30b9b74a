use anyhow::Result;
use async_trait::async_trait;
use mrx_common::types::{
    Metadata, MetadataConfig, MetadataStatus, Route, RouteConnection, RouteDestination,
    RouteHealth, RouteStatus, Router,
};

/// Read-only view of a router's REST status surface.
/// Every call is a single request; retries are left
/// to the next collection cycle.
#[async_trait]
pub trait RouterApi: Send + Sync {
    async fn router_status(&self) -> Result<Router>;

    async fn list_metadata(&self) -> Result<Vec<Metadata>>;

    async fn metadata_config(&self, name: &str) -> Result<MetadataConfig>;

    async fn metadata_status(&self, name: &str) -> Result<MetadataStatus>;

    async fn list_routes(&self) -> Result<Vec<Route>>;

    async fn route_status(&self, name: &str) -> Result<RouteStatus>;

    async fn route_health(&self, name: &str) -> Result<RouteHealth>;

    async fn route_destinations(&self, name: &str) -> Result<Vec<RouteDestination>>;

    async fn route_connections(&self, name: &str) -> Result<Vec<RouteConnection>>;
}
