use std::time::Duration;

use url::Url;

/// Identifier reported in every response body.
pub const SERVICE_NAME: &str = "endpoint1-php";

/// The host this probe checks. Not caller-supplied.
pub const TARGET_HOST: &str = "www.wikipedia.org";

/// Upper bound on the outbound request, connect through body transfer.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Upper bound on the DNS lookup that precedes the request.
pub const DEFAULT_DNS_TIMEOUT: Duration = Duration::from_secs(2);

/// The fixed description of what gets probed.
///
/// Built once at startup and shared read-only between requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Static identifier of this probe, echoed as `service`.
    pub service: String,

    /// Hostname that is resolved and echoed as `host`.
    pub host: String,

    /// URL of the single GET request. Always `https://<host>/` outside of tests.
    pub url: Url,

    /// Request-level timeout.
    pub timeout: Duration,

    /// Bound on the DNS lookup.
    pub dns_timeout: Duration,
}

impl ProbeConfig {
    /// The fixed probe: `www.wikipedia.org`, 5 second request timeout.
    pub fn target() -> Result<Self, url::ParseError> {
        Self::for_host(TARGET_HOST)
    }

    /// Probe configuration for `host`, requesting `https://<host>/`.
    pub fn for_host(host: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            service: SERVICE_NAME.to_string(),
            host: host.to_string(),
            url: Url::parse(&format!("https://{host}/"))?,
            timeout: REQUEST_TIMEOUT,
            dns_timeout: DEFAULT_DNS_TIMEOUT,
        })
    }
}

#[cfg(test)]
pub mod test {
    use super::*;

    #[test]
    fn test_target_probe_config() {
        let config = ProbeConfig::target().expect("valid target");
        assert_eq!(config.service, "endpoint1-php");
        assert_eq!(config.host, "www.wikipedia.org");
        assert_eq!(config.url.as_str(), "https://www.wikipedia.org/");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.dns_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_for_host_builds_https_root_url() {
        let config = ProbeConfig::for_host("www.wikipedia.org").expect("valid host");
        assert_eq!(config, ProbeConfig::target().expect("valid target"));

        let other = ProbeConfig::for_host("example.org").expect("valid host");
        assert_eq!(other.url.as_str(), "https://example.org/");
        assert_eq!(other.url.host_str(), Some("example.org"));
        assert_eq!(other.service, SERVICE_NAME);
    }
}
