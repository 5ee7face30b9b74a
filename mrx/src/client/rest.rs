use crate::client::RouterApi;
use crate::config::{ExporterConfig, TlsConfig};
use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use log::{debug, trace};
use mrx_common::ApiOp;
use mrx_common::consts::API_BASE_PATH;
use mrx_common::types::{
    ItemList, Metadata, MetadataConfig, MetadataStatus, Route, RouteConnection,
    RouteDestination, RouteHealth, RouteStatus, Router,
};
use reqwest::{Certificate, Client, Identity, Url};
use serde::de::DeserializeOwned;
use std::fs;
use std::time::Duration;

/// [`RouterApi`] backed by the router's HTTP(S) REST api
pub struct RestClient {
    http: Client,
    /// Url prefix including the api version path
    base_url: Url,
    user: Option<String>,
    pass: Option<String>,
}

impl RestClient {
    pub fn new(config: &ExporterConfig) -> Result<Self> {
        let http = build_http_client(&config.tls, config.request_timeout())?;

        Ok(Self {
            http,
            base_url: api_base_url(&config.url)?,
            user: config.user.clone().filter(|u| !u.is_empty()),
            pass: config.pass.clone(),
        })
    }

    /// Each segment is percent-encoded so a route named
    /// `a/b` stays one path segment
    fn url(&self, op: ApiOp, name: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("Router url {} cannot carry a path", self.base_url))?
            .pop_if_empty()
            .extend(op.segments(name));
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, op: ApiOp, name: &str) -> Result<T> {
        let url = self.url(op, name)?;
        trace!("GET {}", url);

        let mut request = self.http.get(url.clone());
        if let Some(user) = &self.user {
            request = request.basic_auth(user, self.pass.as_ref());
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to fetch {op} from {url}"))?;

        let status = response.status();
        if !status.is_success() {
            bail!("Router returned {status} for {op} ({url})");
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to decode {op} response from {url}"))
    }

    async fn get_items<T: DeserializeOwned>(&self, op: ApiOp, name: &str) -> Result<Vec<T>> {
        let list: ItemList<T> = self.get(op, name).await?;
        Ok(list.items)
    }
}

fn api_base_url(url: &str) -> Result<Url> {
    let base = format!("{}{}", url.trim().trim_end_matches('/'), API_BASE_PATH);
    Url::parse(&base).with_context(|| format!("Invalid router url {url}"))
}

/// Builds the http client. Skipping verification wins
/// over any configured CA or client certificate.
fn build_http_client(tls: &TlsConfig, timeout: Duration) -> Result<Client> {
    let mut builder = Client::builder().use_rustls_tls().timeout(timeout);

    if tls.skip_verify {
        debug!("TLS verification disabled for router REST api");
        builder = builder.danger_accept_invalid_certs(true);
    } else {
        if let Some(ca_path) = &tls.ca_cert_path {
            let pem = fs::read(ca_path)
                .with_context(|| format!("Failed to read CA cert {}", ca_path.display()))?;
            let ca = Certificate::from_pem(&pem)
                .with_context(|| format!("Invalid CA cert {}", ca_path.display()))?;
            builder = builder.add_root_certificate(ca);
        }

        if let (Some(cert_path), Some(key_path)) = (&tls.cert_path, &tls.key_path) {
            let mut pem = fs::read(cert_path)
                .with_context(|| format!("Failed to read client cert {}", cert_path.display()))?;
            let key = fs::read(key_path)
                .with_context(|| format!("Failed to read client key {}", key_path.display()))?;
            pem.push(b'\n');
            pem.extend_from_slice(&key);

            let identity = Identity::from_pem(&pem).context("Invalid client cert/key pair")?;
            builder = builder.identity(identity);
        }
    }

    builder.build().context("Failed to build router REST client")
}

#[async_trait]
impl RouterApi for RestClient {
    async fn router_status(&self) -> Result<Router> {
        self.get(ApiOp::RouterStatus, "").await
    }

    async fn list_metadata(&self) -> Result<Vec<Metadata>> {
        self.get_items(ApiOp::ListMetadata, "").await
    }

    async fn metadata_config(&self, name: &str) -> Result<MetadataConfig> {
        self.get(ApiOp::MetadataConfig, name).await
    }

    async fn metadata_status(&self, name: &str) -> Result<MetadataStatus> {
        self.get(ApiOp::MetadataStatus, name).await
    }

    async fn list_routes(&self) -> Result<Vec<Route>> {
        self.get_items(ApiOp::ListRoutes, "").await
    }

    async fn route_status(&self, name: &str) -> Result<RouteStatus> {
        self.get(ApiOp::RouteStatus, name).await
    }

    async fn route_health(&self, name: &str) -> Result<RouteHealth> {
        self.get(ApiOp::RouteHealth, name).await
    }

    async fn route_destinations(&self, name: &str) -> Result<Vec<RouteDestination>> {
        self.get_items(ApiOp::RouteDestinations, name).await
    }

    async fn route_connections(&self, name: &str) -> Result<Vec<RouteConnection>> {
        self.get_items(ApiOp::RouteConnections, name).await
    }
}
