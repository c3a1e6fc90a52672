use std::net::{IpAddr, SocketAddr};

use reqwest::Client;
use reqwest::redirect::Policy;
use tokio::time::timeout;

use super::prelude::*;
use super::report;
use crate::config::probe_config::ProbeConfig;
use crate::error::ProbeError;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// What came back from the single GET.
struct Exchange {
    status: Option<u16>,
    error: Option<ProbeError>,
}

/// One-shot client bounded by the probe timeout.
///
/// When the lookup succeeded, the client is pinned to that address so the
/// reported IP is the one actually contacted. Proxies are bypassed and
/// redirects are not followed for the same reason; a 3xx is reported as is.
fn build_client(config: &ProbeConfig, resolved_ip: Option<IpAddr>) -> reqwest::Result<Client> {
    let mut builder = Client::builder()
        .timeout(config.timeout)
        .user_agent(USER_AGENT)
        .redirect(Policy::none())
        .no_proxy();

    if let (Some(ip), Some(domain)) = (resolved_ip, config.url.host_str()) {
        if domain == config.host {
            let port = config.url.port_or_known_default().unwrap_or(443);
            builder = builder.resolve(domain, SocketAddr::new(ip, port));
        }
    }

    builder.build()
}

async fn fetch(config: &ProbeConfig, resolved_ip: Option<IpAddr>) -> Exchange {
    let client = match build_client(config, resolved_ip) {
        Ok(client) => client,
        Err(e) => {
            return Exchange {
                status: None,
                error: Some(ProbeError::Transport(report(&e))),
            };
        }
    };

    let mut status = None;
    let exchange = async {
        let response = client.get(config.url.clone()).send().await?;
        status = Some(response.status().as_u16());
        // The body is read in full so the timeout covers the whole transfer.
        response.bytes().await?;
        Ok::<(), reqwest::Error>(())
    };
    let outcome = timeout(config.timeout, exchange).await;

    let error = match outcome {
        Ok(Ok(())) => None,
        Ok(Err(e)) if e.is_timeout() => Some(ProbeError::Timeout(config.timeout)),
        Ok(Err(e)) => Some(ProbeError::Transport(report(&e))),
        Err(_) => Some(ProbeError::Timeout(config.timeout)),
    };

    Exchange { status, error }
}

/// Resolve the target, GET its URL once and report what happened.
///
/// A failed lookup does not stop the request from being attempted. Only a
/// transport failure makes the result not ok; any status code counts as a
/// completed request.
pub async fn probe_target(config: &ProbeConfig, resolver: &dyn HostResolver) -> ProbeResult {
    tracing::debug!("Probing {} via {}", config.host, config.url);

    let resolved_ip = match resolver.lookup(&config.host).await {
        Ok(ip) => {
            tracing::debug!("Resolved {} to {}", config.host, ip);
            Some(ip)
        }
        Err(e) => {
            tracing::warn!("Resolving {} failed: {}", config.host, e);
            None
        }
    };

    let exchange = fetch(config, resolved_ip).await;
    if let Some(e) = &exchange.error {
        tracing::warn!("Request to {} failed: {}", config.url, e);
    }

    ProbeResult::new(
        &config.service,
        &config.host,
        resolved_ip,
        exchange.status,
        exchange.error.as_ref(),
    )
}
