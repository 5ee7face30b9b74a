use super::ExporterMetrics;
use anyhow::{Context, Result};
use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::header::CONTENT_TYPE;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use log::{debug, error, info, warn};
use prometheus::TEXT_FORMAT;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};

/// Serves `GET /metrics` from the shared registry
pub struct MetricsServer {
    local_addr: SocketAddr,
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl MetricsServer {
    /// Binds `addr` and starts accepting scrapes. A bind
    /// failure is returned, everything after is logged.
    pub async fn start(metrics: Arc<ExporterMetrics>, addr: SocketAddr) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind metrics listener on {addr}"))?;
        let local_addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(run_http(listener, metrics, shutdown_rx));

        info!("Metrics server listening on {}/metrics", local_addr);

        Ok(Self {
            local_addr,
            shutdown: shutdown_tx,
            handle,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops accepting, closes idle keep-alive connections
    /// and waits up to `grace` for in-flight scrapes before
    /// dropping them
    pub async fn shutdown(mut self, grace: Duration) {
        let _ = self.shutdown.send(true);

        let abort = self.handle.abort_handle();
        match tokio::time::timeout(grace, &mut self.handle).await {
            Ok(_) => info!("Metrics server stopped"),
            Err(_) => {
                warn!("Metrics server did not drain within {:?}, closing open connections", grace);
                abort.abort();
            }
        }
    }
}

async fn run_http(
    listener: TcpListener,
    metrics: Arc<ExporterMetrics>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut connections = JoinSet::new();

    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    let metrics = metrics.clone();
                    let stop = shutdown.clone();
                    connections.spawn(async move {
                        if let Err(e) = serve_connection(stream, metrics, stop).await {
                            debug!("Metrics connection from {} failed: {}", peer, e);
                        }
                    });
                }
                Err(e) => error!("Metrics accept error: {}", e),
            },
            // reap finished connections so the set stays small
            Some(_) = connections.join_next(), if !connections.is_empty() => {}
        }
    }

    drop(listener);
    while connections.join_next().await.is_some() {}
}

async fn serve_connection(
    stream: TcpStream,
    metrics: Arc<ExporterMetrics>,
    mut stop: watch::Receiver<bool>,
) -> Result<(), hyper::Error> {
    let io = TokioIo::new(stream);
    let service = service_fn(move |req: Request<Incoming>| {
        let metrics = metrics.clone();
        async move { Ok::<_, hyper::Error>(handle_request(&req, &metrics)) }
    });

    let conn = http1::Builder::new().serve_connection(io, service);
    tokio::pin!(conn);

    tokio::select! {
        result = conn.as_mut() => return result,
        // finishes a response in flight, closes at once if idle
        _ = stop.changed() => conn.as_mut().graceful_shutdown(),
    }

    conn.await
}

fn handle_request(req: &Request<Incoming>, metrics: &ExporterMetrics) -> Response<Full<Bytes>> {
    if req.method() != Method::GET || req.uri().path() != "/metrics" {
        return plain(StatusCode::NOT_FOUND, "not found");
    }

    match metrics.encode() {
        Ok(body) => Response::builder()
            .header(CONTENT_TYPE, TEXT_FORMAT)
            .body(Full::new(Bytes::from(body)))
            .unwrap_or_else(|_| plain(StatusCode::INTERNAL_SERVER_ERROR, "encode failed")),
        Err(e) => {
            error!("Failed to encode metrics: {:#}", e);
            plain(StatusCode::INTERNAL_SERVER_ERROR, "encode failed")
        }
    }
}

fn plain(status: StatusCode, body: &'static str) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from_static(body.as_bytes())));
    *response.status_mut() = status;
    response
}
