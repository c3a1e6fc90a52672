use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use serde::Deserialize;

use super::probe_config::ProbeConfig;
use crate::error::ConfigError;

/// Port used when neither `LISTEN_ADDR`, `PORT` nor the config file name one.
pub const DEFAULT_PORT: u16 = 9001;

/// Optional YAML file pointed at by `CONFIG_FILE`.
///
/// Only process-level settings live here. What gets probed is fixed.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Socket address to listen on, e.g. `127.0.0.1:9001`.
    #[serde(default)]
    pub listen: Option<String>,

    /// Name servers to query instead of the system configuration.
    #[serde(default)]
    pub dns_hosts: Option<Vec<String>>,

    /// Bound on the DNS lookup in milliseconds.
    #[serde(default)]
    pub dns_timeout_ms: Option<u64>,
}

pub struct AppConfig {
    pub listen: SocketAddr,
    /// Empty means use the system resolver configuration.
    pub dns_hosts: Vec<IpAddr>,
    pub probe: ProbeConfig,
}

/// Load the application configuration from the environment and an optional YAML file.
///
/// Environment variables take precedence over the file named by `CONFIG_FILE`,
/// which takes precedence over the built-in defaults.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let file = match env::var("CONFIG_FILE") {
        Ok(path) => read_config_file(&path)?,
        Err(_) => FileConfig::default(),
    };

    let config = AppConfig::from_sources(file, |key| env::var(key).ok())?;

    if config.dns_hosts.is_empty() {
        tracing::info!("Using system DNS configuration");
    } else {
        tracing::info!("Using DNS hosts: {:?}", config.dns_hosts);
    }

    Ok(config)
}

pub fn read_config_file(path: &str) -> Result<FileConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_string(),
        source,
    })?;
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_string(),
        source,
    })
}

impl AppConfig {
    /// Merge the config file with values looked up through `env`.
    pub fn from_sources(
        file: FileConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let listen = match (env("LISTEN_ADDR"), env("PORT"), file.listen) {
            (Some(addr), _, _) => parse_listen_addr(&addr)?,
            (None, Some(port), _) => {
                let port: u16 = port
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::Port(port.clone()))?;
                SocketAddr::from((Ipv4Addr::LOCALHOST, port))
            }
            (None, None, Some(addr)) => parse_listen_addr(&addr)?,
            (None, None, None) => SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
        };

        let dns_hosts = match env("DNS_HOSTS") {
            Some(hosts) => hosts
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(parse_dns_host)
                .collect::<Result<Vec<_>, _>>()?,
            None => file
                .dns_hosts
                .unwrap_or_default()
                .iter()
                .map(|s| parse_dns_host(s.trim()))
                .collect::<Result<Vec<_>, _>>()?,
        };

        let mut probe = ProbeConfig::target()?;
        if let Some(ms) = env("DNS_TIMEOUT_MS") {
            probe.dns_timeout = parse_dns_timeout(&ms)?;
        } else if let Some(ms) = file.dns_timeout_ms {
            probe.dns_timeout = parse_dns_timeout(&ms.to_string())?;
        }

        Ok(AppConfig {
            listen,
            dns_hosts,
            probe,
        })
    }
}

fn parse_listen_addr(value: &str) -> Result<SocketAddr, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|source| ConfigError::ListenAddr {
            value: value.to_string(),
            source,
        })
}

fn parse_dns_host(value: &str) -> Result<IpAddr, ConfigError> {
    value.parse().map_err(|source| ConfigError::DnsHost {
        value: value.to_string(),
        source,
    })
}

fn parse_dns_timeout(value: &str) -> Result<Duration, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
        _ => Err(ConfigError::DnsTimeout(value.to_string())),
    }
}
