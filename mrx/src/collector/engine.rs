use super::metadata::collect_metadata;
use super::route::{collect_routes, live_report, zero_fill};
use super::router::collect_router;
use super::{RouteReport, Snapshot, StageOutcome, StageStatus};
use crate::client::RouterApi;
use crate::config::{ExporterConfig, RouteConnectionsConfig};
use crate::metrics::{ConnectionFamily, ExporterMetrics};
use crate::r#loop::Collector;
use async_trait::async_trait;
use log::debug;
use std::sync::Arc;

/// What to collect beyond the always-on router,
/// metadata and route metrics
#[derive(Debug, Clone, Default)]
pub struct CollectSettings {
    /// Label value on the router status metric
    pub service_name: String,
    pub metadata_status: bool,
    pub route_connections: RouteConnectionsConfig,
}

impl CollectSettings {
    pub fn from_config(config: &ExporterConfig) -> Self {
        Self {
            service_name: config.service_name.clone(),
            metadata_status: config.collect.metadata_status,
            route_connections: config.collect.route_connections,
        }
    }
}

/// Summary of one cycle, mostly for logging and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub router: StageStatus,
    pub metadata: StageStatus,
    pub routes: StageStatus,
    pub route_report: Option<RouteReport>,
}

impl CycleReport {
    pub fn router_up(&self) -> bool {
        self.router == StageStatus::Complete
    }
}

/// Runs the router, metadata and route stages in order
/// against one router, publishing into the shared metrics.
/// A failed stage is logged and never stops later stages
/// or the next cycle.
pub struct CollectionEngine {
    api: Box<dyn RouterApi>,
    metrics: Arc<ExporterMetrics>,
    settings: CollectSettings,
    snapshot: Snapshot,
}

impl CollectionEngine {
    pub fn new(api: Box<dyn RouterApi>, metrics: Arc<ExporterMetrics>, settings: CollectSettings) -> Self {
        Self {
            api,
            metrics,
            settings,
            snapshot: Snapshot::default(),
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub async fn run_cycle(&mut self) -> CycleReport {
        let router = collect_router(self.api.as_ref(), &self.metrics, &self.settings.service_name).await;
        router.report("Router");

        if let Some(live) = router.complete() {
            self.snapshot.set_router(live.clone());
        }
        let live = router.complete();

        let metadata = match live {
            None => StageOutcome::Skipped,
            Some(r) => {
                collect_metadata(self.api.as_ref(), &self.metrics, r, self.settings.metadata_status)
                    .await
                    .into()
            }
        };
        metadata.report("Metadata");

        let families = ConnectionFamily::enabled(&self.settings.route_connections);
        let routes = match live {
            None => StageOutcome::Complete(zero_fill(&self.metrics, self.snapshot.topology(), &families)),
            Some(r) => match collect_routes(self.api.as_ref(), &self.metrics, r, &families).await {
                Ok(topology) => {
                    let report = live_report(&topology);
                    self.snapshot.replace_topology(topology);
                    StageOutcome::Complete(report)
                }
                Err(e) => StageOutcome::Aborted(e),
            },
        };
        routes.report("Route");

        let report = CycleReport {
            router: router.status(),
            metadata: metadata.status(),
            routes: routes.status(),
            route_report: routes.complete().copied(),
        };

        debug!(
            "Cycle done: router={} metadata={} routes={} {:?}",
            <&str>::from(report.router),
            <&str>::from(report.metadata),
            <&str>::from(report.routes),
            report.route_report
        );

        report
    }
}

#[async_trait]
impl Collector for CollectionEngine {
    async fn collect(&mut self) {
        self.run_cycle().await;
    }
}
