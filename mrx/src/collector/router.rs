use super::StageOutcome;
use crate::client::RouterApi;
use crate::metrics::ExporterMetrics;
use anyhow::Context;
use mrx_common::types::Router;

/// Stage A. Sets `up` either way and, when the router
/// answers, publishes its identity as labels.
pub(super) async fn collect_router(
    api: &dyn RouterApi,
    metrics: &ExporterMetrics,
    service_name: &str,
) -> StageOutcome<Router> {
    let router = match api.router_status().await.context("Failed to fetch router status") {
        Ok(router) => router,
        Err(e) => {
            metrics.up.set(0.0);
            return StageOutcome::Aborted(e);
        }
    };

    metrics.up.set(1.0);

    let process_id = router.process_id.to_string();
    let time_started = router.time_started.to_string();
    metrics.router_status.with_label_values(&[
        &process_id,
        &router.product_edition,
        &time_started,
        &router.version,
        &router.hostname,
        service_name,
    ]);

    StageOutcome::Complete(router)
}
