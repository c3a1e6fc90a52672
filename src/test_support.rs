//! Local upstreams and a stub resolver so tests never leave the loopback interface

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::header::LOCATION;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use url::Url;

use crate::config::probe_config::{ProbeConfig, SERVICE_NAME};
use crate::error::ProbeError;
use crate::http_probe::prelude::HostResolver;

/// Resolver that answers every lookup with a fixed address, or fails.
pub struct StaticResolver(Option<IpAddr>);

impl StaticResolver {
    pub fn to(ip: IpAddr) -> Self {
        Self(Some(ip))
    }

    pub fn failing() -> Self {
        Self(None)
    }
}

#[async_trait]
impl HostResolver for StaticResolver {
    async fn lookup(&self, host: &str) -> Result<IpAddr, ProbeError> {
        self.0
            .ok_or_else(|| ProbeError::Resolve(format!("no record found for {host}")))
    }
}

/// Probe config aimed at `http://<host>:<port>/`.
pub fn test_probe_config(host: &str, port: u16, timeout: Duration) -> ProbeConfig {
    ProbeConfig {
        service: SERVICE_NAME.to_string(),
        host: host.to_string(),
        url: Url::parse(&format!("http://{host}:{port}/")).expect("valid test URL"),
        timeout,
        dns_timeout: Duration::from_millis(500),
    }
}

/// Upstream that answers every request with `status`.
pub async fn spawn_upstream(status: u16) -> SocketAddr {
    spawn_responder(status, None).await
}

/// Upstream that answers every request with a 301 to `location`.
pub async fn spawn_redirecting_upstream(location: String) -> SocketAddr {
    spawn_responder(301, Some(location)).await
}

async fn spawn_responder(status: u16, location: Option<String>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind upstream");
    let addr = listener.local_addr().expect("upstream address");

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let location = location.clone();
            tokio::spawn(async move {
                let service = service_fn(move |_req: Request<Incoming>| {
                    let location = location.clone();
                    async move {
                        let mut response = Response::builder().status(status);
                        if let Some(location) = location {
                            response = response.header(LOCATION, location);
                        }
                        response.body(Full::new(Bytes::from_static(b"upstream")))
                    }
                });
                let _ = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service)
                    .await;
            });
        }
    });

    addr
}

/// Upstream that accepts connections and never answers.
pub async fn spawn_silent_upstream() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind upstream");
    let addr = listener.local_addr().expect("upstream address");

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });

    addr
}
