use strum::{Display, IntoStaticStr};

/// Every remote call the exporter makes, used to
/// tag errors with the operation that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ApiOp {
    RouterStatus,
    ListMetadata,
    MetadataConfig,
    MetadataStatus,
    ListRoutes,
    RouteStatus,
    RouteHealth,
    RouteDestinations,
    RouteConnections,
}

impl ApiOp {
    /// Path segments below the api base. `name` is kept as
    /// a single raw segment, escaping is left to the caller.
    pub fn segments<'a>(&self, name: &'a str) -> Vec<&'a str> {
        match self {
            ApiOp::RouterStatus => vec!["router", "status"],
            ApiOp::ListMetadata => vec!["metadata"],
            ApiOp::MetadataConfig => vec!["metadata", name, "config"],
            ApiOp::MetadataStatus => vec!["metadata", name, "status"],
            ApiOp::ListRoutes => vec!["routes"],
            ApiOp::RouteStatus => vec!["routes", name, "status"],
            ApiOp::RouteHealth => vec!["routes", name, "health"],
            ApiOp::RouteDestinations => vec!["routes", name, "destinations"],
            ApiOp::RouteConnections => vec!["routes", name, "connections"],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_place_name() {
        assert_eq!(ApiOp::RouterStatus.segments("ignored"), ["router", "status"]);
        assert_eq!(ApiOp::MetadataStatus.segments("bootstrap"), ["metadata", "bootstrap", "status"]);
        assert_eq!(ApiOp::RouteConnections.segments("rw"), ["routes", "rw", "connections"]);
    }

    #[test]
    fn name_stays_one_segment() {
        assert_eq!(ApiOp::RouteHealth.segments("a/b"), ["routes", "a/b", "health"]);
    }

    #[test]
    fn display_is_snake_case() {
        assert_eq!(ApiOp::RouteDestinations.to_string(), "route_destinations");
        let name: &'static str = ApiOp::ListMetadata.into();
        assert_eq!(name, "list_metadata");
    }
}
