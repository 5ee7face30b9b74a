use anyhow::{Context, Result, bail};
use config::{Config, Environment, File};
use mrx_common::consts;
use schemars::JsonSchema;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Prefix for environment overrides, e.g.
/// `MYSQLROUTER_EXPORTER_URL` or
/// `MYSQLROUTER_EXPORTER_COLLECT__METADATA_STATUS`
pub const ENV_PREFIX: &str = "MYSQLROUTER_EXPORTER";

/// TLS material used when talking to the router REST api
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct TlsConfig {
    /// CA bundle (PEM) used to verify the router certificate
    #[serde(default)]
    pub ca_cert_path: Option<PathBuf>,
    /// Client certificate (PEM), requires key_path
    #[serde(default)]
    pub cert_path: Option<PathBuf>,
    /// Client private key (PEM), requires cert_path
    #[serde(default)]
    pub key_path: Option<PathBuf>,
    /// Accept any certificate the router presents
    #[serde(default)]
    pub skip_verify: bool,
}

/// Per connection metric families. Each one costs the
/// router a full walk of its connection table so all
/// are disabled unless asked for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, JsonSchema)]
pub struct RouteConnectionsConfig {
    #[serde(default)]
    pub byte_from_server: bool,
    #[serde(default)]
    pub byte_to_server: bool,
    #[serde(default)]
    pub time_started: bool,
    #[serde(default)]
    pub time_connected_to_server: bool,
    #[serde(default)]
    pub time_last_sent_to_server: bool,
    #[serde(default)]
    pub time_last_received_from_server: bool,
}

/// Optional, more expensive collections
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, JsonSchema)]
pub struct CollectConfig {
    /// Collect metadata refresh status
    #[serde(default)]
    pub metadata_status: bool,
    #[serde(default)]
    pub route_connections: RouteConnectionsConfig,
}

/// The user facing exporter config
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ExporterConfig {
    /// Base url of the router REST api e.g. https://router:8443
    pub url: String,
    /// Username for REST api basic auth
    #[serde(default)]
    pub user: Option<String>,
    /// Password for REST api basic auth
    #[serde(default)]
    pub pass: Option<String>,
    /// Port the /metrics endpoint listens on
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,
    /// Attached as a label to the router status metric
    pub service_name: String,
    #[serde(default)]
    pub tls: TlsConfig,
    /// Seconds between collection cycles
    #[serde(default = "default_collect_interval_secs")]
    pub collect_interval_secs: u64,
    /// Upper bound on any single REST call
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Grace period for the metrics server to drain
    /// after a shutdown signal
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
    #[serde(default)]
    pub collect: CollectConfig,
}

const fn default_listen_port() -> u16 {
    consts::DEFAULT_LISTEN_PORT
}
const fn default_collect_interval_secs() -> u64 {
    consts::DEFAULT_COLLECT_INTERVAL_SECS
}
const fn default_request_timeout_secs() -> u64 {
    5
}
const fn default_shutdown_timeout_secs() -> u64 {
    5
}

impl ExporterConfig {
    /// Loads the optional config file at `path` with
    /// environment variables layered on top
    pub fn load(path: &Path) -> Result<ExporterConfig> {
        let config = Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<ExporterConfig>()
            .context("MYSQLROUTER_EXPORTER_URL and MYSQLROUTER_EXPORTER_SERVICE_NAME are required")?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            bail!("Router REST api url must not be empty");
        }
        if self.service_name.trim().is_empty() {
            bail!("Service name must not be empty");
        }
        if self.collect_interval_secs == 0 {
            bail!("Collect interval must be greater than 0 seconds");
        }
        if self.tls.cert_path.is_some() != self.tls.key_path.is_some() {
            bail!("TLS cert_path and key_path must be given together");
        }

        Ok(())
    }

    pub fn collect_interval(&self) -> Duration {
        Duration::from_secs(self.collect_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_yaml(yaml: &str) -> ExporterConfig {
        Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn defaults_apply() {
        let config = from_yaml("url: http://localhost:8080\nservice_name: db");

        assert_eq!(config.listen_port, 9152);
        assert_eq!(config.collect_interval(), Duration::from_secs(2));
        assert!(!config.collect.metadata_status);
        assert_eq!(config.collect.route_connections, RouteConnectionsConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn nested_collect_flags() {
        let config = from_yaml(
            "url: http://localhost:8080
service_name: db
collect:
  metadata_status: true
  route_connections:
    byte_from_server: true
    time_started: true",
        );

        assert!(config.collect.metadata_status);
        assert!(config.collect.route_connections.byte_from_server);
        assert!(config.collect.route_connections.time_started);
        assert!(!config.collect.route_connections.byte_to_server);
    }

    #[test]
    fn zero_interval_rejected() {
        let config = from_yaml("url: http://localhost\nservice_name: db\ncollect_interval_secs: 0");
        assert!(config.validate().is_err());
    }

    #[test]
    fn cert_without_key_rejected() {
        let config = from_yaml("url: http://localhost\nservice_name: db\ntls:\n  cert_path: /tmp/c.pem");
        assert!(config.validate().is_err());
    }

    #[test]
    fn blank_url_rejected() {
        let config = from_yaml("url: ' '\nservice_name: db");
        assert!(config.validate().is_err());
    }
}
