use crate::client::RouterApi;
use crate::metrics::ExporterMetrics;
use anyhow::{Context, Result};
use log::trace;
use mrx_common::types::Router;

/// Stage B, only run with a live router. Returns the number
/// of metadata caches published; the first failed call ends
/// the stage and leaves earlier entries in place.
pub(super) async fn collect_metadata(
    api: &dyn RouterApi,
    metrics: &ExporterMetrics,
    router: &Router,
    collect_status: bool,
) -> Result<usize> {
    let metadata = api.list_metadata().await.context("Failed to list metadata")?;

    // status labels carry counters and timestamps so the
    // whole set is rebuilt every cycle
    if collect_status {
        metrics.metadata_status.reset();
    }

    for entry in &metadata {
        let name = entry.name.as_str();
        metrics.metadata.with_label_values(&[name]);

        let config = api
            .metadata_config(name)
            .await
            .with_context(|| format!("Failed to fetch config for metadata {name}"))?;

        let refresh_ms = config.time_refresh_in_ms.to_string();
        metrics.metadata_config.with_label_values(&[
            name,
            &config.cluster_name,
            &refresh_ms,
            &config.group_replication_id,
        ]);
        metrics
            .metadata_config_nodes
            .with_label_values(&[name, &router.hostname, &config.cluster_name])
            .set(config.nodes.len() as f64);

        if collect_status {
            let status = api
                .metadata_status(name)
                .await
                .with_context(|| format!("Failed to fetch status for metadata {name}"))?;

            let refresh_failed = status.refresh_failed.to_string();
            let last_succeeded = status
                .time_last_refresh_succeeded
                .map(|t| t.to_string())
                .unwrap_or_default();
            let last_port = status.last_refresh_port.to_string();
            metrics.metadata_status.with_label_values(&[
                name,
                &refresh_failed,
                &last_succeeded,
                &status.last_refresh_hostname,
                &last_port,
            ]);
        }

        trace!("Collected metadata {} ({} nodes)", name, config.nodes.len());
    }

    Ok(metadata.len())
}
