//! Error types for probing and startup configuration

use std::net::AddrParseError;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while probing the target.
///
/// None of these ever reach the caller as a protocol-level failure: the probe
/// renders them into the `curl_error` field of the result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// The hostname could not be resolved
    #[error("could not resolve host: {0}")]
    Resolve(String),

    /// The request did not complete within the configured timeout
    #[error("operation timed out after {} milliseconds", .0.as_millis())]
    Timeout(Duration),

    /// Connection, TLS, request or body transfer failure
    #[error("{0}")]
    Transport(String),
}

/// Errors raised while loading the process configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid listen address {value:?}: {source}")]
    ListenAddr {
        value: String,
        #[source]
        source: AddrParseError,
    },

    #[error("PORT must be a valid port number, got {0:?}")]
    Port(String),

    #[error("invalid DNS host {value:?}: {source}")]
    DnsHost {
        value: String,
        #[source]
        source: AddrParseError,
    },

    #[error("DNS timeout must be a positive number of milliseconds, got {0:?}")]
    DnsTimeout(String),

    #[error("invalid probe target URL: {0}")]
    TargetUrl(#[from] url::ParseError),

    #[error("failed to set up DNS resolver: {0}")]
    Resolver(String),
}
