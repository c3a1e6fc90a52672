use std::net::IpAddr;

use serde::Serialize;

use crate::error::ProbeError;

/// Outcome of one probe, serialized as the response body.
///
/// Fields are private so that `ok` can only ever be derived from the error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeResult {
    service: String,
    host: String,
    /// First resolved address, empty when resolution failed.
    resolved_ip: String,
    /// Upstream status code, 0 when no response arrived.
    http_code: u16,
    /// Transport error message, empty on success.
    #[serde(rename = "curl_error")]
    error: String,
    ok: bool,
}

impl ProbeResult {
    pub fn new(
        service: &str,
        host: &str,
        resolved_ip: Option<IpAddr>,
        http_status: Option<u16>,
        error: Option<&ProbeError>,
    ) -> Self {
        let error = error.map(ToString::to_string).unwrap_or_default();
        Self {
            service: service.to_string(),
            host: host.to_string(),
            resolved_ip: resolved_ip.map(|ip| ip.to_string()).unwrap_or_default(),
            http_code: http_status.unwrap_or(0),
            ok: error.is_empty(),
            error,
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn resolved_ip(&self) -> &str {
        &self.resolved_ip
    }

    pub fn http_code(&self) -> u16 {
        self.http_code
    }

    pub fn error(&self) -> &str {
        &self.error
    }

    pub fn ok(&self) -> bool {
        self.ok
    }

    /// Pretty-printed JSON body.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
