use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;
use trust_dns_resolver::{
    TokioAsyncResolver,
    config::{
        LookupIpStrategy, NameServerConfig, NameServerConfigGroup, Protocol, ResolverConfig,
        ResolverOpts,
    },
};

use crate::error::{ConfigError, ProbeError};

/// Resolves the probe target to a single address.
#[async_trait]
pub trait HostResolver: Send + Sync {
    /// Return the first address `host` resolves to.
    async fn lookup(&self, host: &str) -> Result<IpAddr, ProbeError>;
}

/// `HostResolver` backed by trust-dns, with every lookup bounded by a timeout.
pub struct DnsResolver {
    resolver: TokioAsyncResolver,
    timeout: Duration,
}

impl DnsResolver {
    /// Use `dns_hosts` when given, the system configuration otherwise.
    pub fn setup(dns_hosts: &[IpAddr], timeout: Duration) -> Result<Self, ConfigError> {
        if dns_hosts.is_empty() {
            Self::from_system_conf(timeout)
        } else {
            Ok(Self::with_name_servers(dns_hosts, timeout))
        }
    }

    /// Resolver configured from `/etc/resolv.conf` (or the platform equivalent).
    pub fn from_system_conf(timeout: Duration) -> Result<Self, ConfigError> {
        let (config, mut opts) = trust_dns_resolver::system_conf::read_system_conf()
            .map_err(|e| ConfigError::Resolver(e.to_string()))?;
        apply_probe_opts(&mut opts, timeout);
        Ok(Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
            timeout,
        })
    }

    /// Resolver that queries the given name servers over TCP on port 53.
    pub fn with_name_servers(dns_hosts: &[IpAddr], timeout: Duration) -> Self {
        let mut opts = ResolverOpts::default();
        apply_probe_opts(&mut opts, timeout);

        let mut name_servers = NameServerConfigGroup::new();
        for ip in dns_hosts {
            name_servers.push(NameServerConfig {
                socket_addr: (*ip, 53).into(),
                protocol: Protocol::Tcp,
                tls_dns_name: None,
                trust_negative_responses: false,
                bind_addr: None,
            });
        }

        let resolver_config = ResolverConfig::from_parts(None, vec![], name_servers);
        Self {
            resolver: TokioAsyncResolver::tokio(resolver_config, opts),
            timeout,
        }
    }
}

/// Two attempts bounded by the lookup timeout, IPv4 first, nothing cached
/// between probes.
fn apply_probe_opts(opts: &mut ResolverOpts, timeout: Duration) {
    opts.attempts = 2;
    opts.timeout = timeout;
    opts.cache_size = 0;
    opts.ip_strategy = LookupIpStrategy::Ipv4thenIpv6;
}

#[async_trait]
impl HostResolver for DnsResolver {
    async fn lookup(&self, host: &str) -> Result<IpAddr, ProbeError> {
        match timeout(self.timeout, self.resolver.lookup_ip(host)).await {
            Ok(Ok(lookup)) => lookup
                .iter()
                .next()
                .ok_or_else(|| ProbeError::Resolve(format!("no addresses found for {host}"))),
            Ok(Err(e)) => Err(ProbeError::Resolve(e.to_string())),
            Err(_) => Err(ProbeError::Resolve(format!(
                "lookup of {host} timed out after {} milliseconds",
                self.timeout.as_millis()
            ))),
        }
    }
}
