//! Hostname resolution for pending enumerator lookups

use crate::config::{AddressOrder, ResolverConfig};
use crate::error::{ConnectError, Result};
use std::net::{SocketAddr, ToSocketAddrs};

/// Resolve `host:port` through the platform resolver.
pub(crate) fn resolve(host: &str, port: u16, config: &ResolverConfig) -> Result<Vec<SocketAddr>> {
    log::debug!("resolving {host}:{port}");
    let addrs = (host, port)
        .to_socket_addrs()
        .map_err(|e| ConnectError::Resolution(format!("failed to resolve '{host}': {e}")))?;
    Ok(apply_policy(addrs.collect(), config))
}

/// Async variant of [`resolve`].
#[cfg(feature = "tokio-runtime")]
pub(crate) async fn resolve_async(
    host: &str,
    port: u16,
    config: &ResolverConfig,
) -> Result<Vec<SocketAddr>> {
    log::debug!("resolving {host}:{port} (async)");
    let addrs = tokio::net::lookup_host((host, port))
        .await
        .map_err(|e| ConnectError::Resolution(format!("failed to resolve '{host}': {e}")))?;
    Ok(apply_policy(addrs.collect(), config))
}

fn apply_policy(mut addrs: Vec<SocketAddr>, config: &ResolverConfig) -> Vec<SocketAddr> {
    match config.address_order {
        AddressOrder::Any => {}
        // Stable sorts keep resolver order within each family.
        AddressOrder::Ipv4First => addrs.sort_by_key(|addr| addr.is_ipv6()),
        AddressOrder::Ipv6First => addrs.sort_by_key(|addr| addr.is_ipv4()),
    }
    if config.max_results > 0 && addrs.len() > config.max_results as usize {
        log::debug!(
            "truncating {} resolved addresses to {}",
            addrs.len(),
            config.max_results
        );
        addrs.truncate(config.max_results as usize);
    }
    addrs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mixed() -> Vec<SocketAddr> {
        vec![
            "[2001:db8::1]:80".parse().unwrap(),
            "10.0.0.1:80".parse().unwrap(),
            "[2001:db8::2]:80".parse().unwrap(),
            "10.0.0.2:80".parse().unwrap(),
        ]
    }

    #[test]
    fn test_order_any_preserved() {
        let config = ResolverConfig::default();
        assert_eq!(apply_policy(mixed(), &config), mixed());
    }

    #[test]
    fn test_ipv4_first() {
        let config = ResolverConfig {
            address_order: AddressOrder::Ipv4First,
            ..Default::default()
        };
        let ordered = apply_policy(mixed(), &config);
        assert!(ordered[0].is_ipv4() && ordered[1].is_ipv4());
        // Resolver order within the family is preserved.
        assert_eq!(ordered[0], "10.0.0.1:80".parse().unwrap());
    }

    #[test]
    fn test_ipv6_first() {
        let config = ResolverConfig {
            address_order: AddressOrder::Ipv6First,
            ..Default::default()
        };
        let ordered = apply_policy(mixed(), &config);
        assert!(ordered[0].is_ipv6() && ordered[1].is_ipv6());
    }

    #[test]
    fn test_max_results_truncates() {
        let config = ResolverConfig {
            max_results: 3,
            ..Default::default()
        };
        assert_eq!(apply_policy(mixed(), &config).len(), 3);
    }

    #[test]
    fn test_resolve_ip_literal() {
        let addrs = resolve("127.0.0.1", 8080, &ResolverConfig::default()).expect("literal");
        assert_eq!(addrs, vec!["127.0.0.1:8080".parse().unwrap()]);
    }
}
