use mrx_common::types::{Route, RouteConnection, Router};

/// A connection as last seen, with the route it was seen on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedConnection {
    pub route: String,
    pub connection: RouteConnection,
}

/// Topology of the last fully successful route stage.
/// Replaced as a whole, never merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Topology {
    /// Router hostname the route metrics were labeled with
    pub hostname: String,
    pub routes: Vec<Route>,
    pub connections: Vec<TrackedConnection>,
}

/// State carried between cycles, owned by the engine.
/// Used to zero previously reported routes when the
/// router stops answering.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    router: Option<Router>,
    topology: Topology,
}

impl Snapshot {
    /// Last router identity fetched successfully
    pub fn router(&self) -> Option<&Router> {
        self.router.as_ref()
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn routes(&self) -> &[Route] {
        &self.topology.routes
    }

    pub fn connections(&self) -> &[TrackedConnection] {
        &self.topology.connections
    }

    pub(crate) fn set_router(&mut self, router: Router) {
        self.router = Some(router);
    }

    pub(crate) fn replace_topology(&mut self, topology: Topology) {
        self.topology = topology;
    }
}
