//! HTTP listener exposing the probe as a JSON endpoint

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use hyper::Request;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpListener;

use crate::config::app_config::AppConfig;
use crate::config::probe_config::ProbeConfig;
use crate::http_probe::prelude::*;

pub mod handlers;

/// How long in-flight probes may run after shutdown was requested.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Read-only state shared by every connection.
pub struct AppState {
    pub probe: ProbeConfig,
    pub resolver: Arc<dyn HostResolver>,
}

pub async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let resolver = DnsResolver::setup(&config.dns_hosts, config.probe.dns_timeout)?;
    let state = Arc::new(AppState {
        probe: config.probe,
        resolver: Arc::new(resolver),
    });

    let listener = TcpListener::bind(config.listen).await?;
    tracing::info!(
        "{} listening on {}, probing {}",
        state.probe.service,
        listener.local_addr()?,
        state.probe.url
    );

    serve(listener, state, shutdown_signal()).await;
    Ok(())
}

/// Accept connections until `shutdown` completes, then drain the open ones.
pub async fn serve(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()>,
) {
    let graceful = GracefulShutdown::new();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(conn) => conn,
                    Err(e) => {
                        tracing::error!("Accept failed: {}", e);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        continue;
                    }
                };

                let state = state.clone();
                let service = service_fn(move |req: Request<Incoming>| {
                    handlers::handle(req, state.clone())
                });
                let conn = http1::Builder::new().serve_connection(TokioIo::new(stream), service);
                let conn = graceful.watch(conn);

                tokio::spawn(async move {
                    if let Err(e) = conn.await {
                        tracing::debug!("Connection from {} closed with error: {}", peer, e);
                    }
                });
            }
            _ = &mut shutdown => {
                tracing::info!("Shutdown requested, no longer accepting connections");
                break;
            }
        }
    }

    tokio::select! {
        _ = graceful.shutdown() => tracing::info!("All connections closed"),
        _ = tokio::time::sleep(SHUTDOWN_GRACE) => {
            tracing::warn!("Gave up waiting for open connections after {:?}", SHUTDOWN_GRACE);
        }
    }
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => tracing::info!("Received Ctrl+C signal"),
            Err(e) => tracing::error!("Failed to listen for Ctrl+C: {}", e),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                tracing::info!("Received SIGTERM signal");
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
