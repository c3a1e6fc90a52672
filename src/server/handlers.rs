use std::convert::Infallible;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{ALLOW, CONTENT_TYPE, HeaderValue};
use hyper::{Method, Request, Response, StatusCode};
use serde_json::json;

use super::AppState;
use crate::http_probe::prelude::*;

/// Paths that run the probe. Query strings are ignored.
pub const PROBE_PATHS: [&str; 2] = ["/", "/api/v1/endpoint1"];

pub const HEALTH_PATH: &str = "/health";

pub type Body = Full<Bytes>;

fn json_response(status: StatusCode, body: String) -> Response<Body> {
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

fn error_response(status: StatusCode, service: &str, error: &str) -> Response<Body> {
    let body = json!({ "service": service, "ok": false, "error": error });
    json_response(status, body.to_string())
}

/// Route a request. Never fails: every outcome is a JSON response.
pub async fn handle<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<Body>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    let response = match (&method, path.as_str()) {
        (&Method::GET, HEALTH_PATH) => health(&state),
        (&Method::GET, p) if PROBE_PATHS.contains(&p) => probe(&state).await,
        (_, p) if PROBE_PATHS.contains(&p) || p == HEALTH_PATH => {
            let mut response = error_response(
                StatusCode::METHOD_NOT_ALLOWED,
                &state.probe.service,
                "METHOD_NOT_ALLOWED",
            );
            response
                .headers_mut()
                .insert(ALLOW, HeaderValue::from_static("GET"));
            response
        }
        _ => error_response(StatusCode::NOT_FOUND, &state.probe.service, "NOT_FOUND"),
    };

    tracing::debug!("{} {} -> {}", method, path, response.status());
    Ok(response)
}

/// Liveness of this process only, the target is not contacted.
fn health(state: &AppState) -> Response<Body> {
    let body = json!({ "service": state.probe.service, "ok": true });
    json_response(StatusCode::OK, body.to_string())
}

async fn probe(state: &AppState) -> Response<Body> {
    let result = probe_target(&state.probe, state.resolver.as_ref()).await;

    tracing::info!(
        ok = result.ok(),
        http_code = result.http_code(),
        resolved_ip = %result.resolved_ip(),
        error = %result.error(),
        "Probe of {} finished",
        result.host()
    );

    // The outer status is 200 whatever the probe outcome.
    match result.to_json_pretty() {
        Ok(body) => json_response(StatusCode::OK, body),
        Err(e) => {
            tracing::error!("Failed to serialize probe result: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                result.service(),
                "SERIALIZATION_FAILED",
            )
        }
    }
}
