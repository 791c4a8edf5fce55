// src/utils.rs
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use log::debug;
use tokio::net::lookup_host;
use crate::error::QueryError;

/// A `host:port` query target as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTarget {
    pub host: String,
    pub port: u16,
}

impl QueryTarget {
    pub fn parse(address: &str) -> Result<Self, QueryError> {
        let parts: Vec<&str> = address.trim().split(':').collect();
        let [host, port] = parts.as_slice() else {
            return Err(QueryError::InvalidAddress(address.to_string()));
        };
        if host.is_empty() {
            return Err(QueryError::InvalidAddress(address.to_string()));
        }
        let port = port
            .parse::<u16>()
            .map_err(|_| QueryError::InvalidPort(port.to_string()))?;

        Ok(Self { host: host.to_string(), port })
    }

    pub async fn resolve(&self) -> Result<SocketAddr, QueryError> {
        let mut addrs = lookup_host((self.host.as_str(), self.port))
            .await
            .map_err(|e| {
                debug!("Lookup of {} failed: {}", self, e);
                QueryError::Unresolved(self.to_string())
            })?;
        addrs.next().ok_or_else(|| QueryError::Unresolved(self.to_string()))
    }
}

impl fmt::Display for QueryTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Wildcard local address in the same family as `remote`.
pub fn local_bind_addr(remote: &SocketAddr) -> SocketAddr {
    match remote.ip() {
        IpAddr::V4(_) => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
        IpAddr::V6(_) => SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0),
    }
}
