use std::net::{IpAddr, Ipv4Addr, SocketAddr};

const BIND_ADDR_VAR: &str = "POKER_BIND_ADDR";
const PORT_VAR: &str = "POKER_PORT";

const DEFAULT_BIND_ADDR: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
const DEFAULT_PORT: u16 = 3000;

/// Where the server listens, read from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: IpAddr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: DEFAULT_BIND_ADDR,
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// Reads `POKER_BIND_ADDR` and `POKER_PORT`, falling back to `0.0.0.0:3000`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = ServerConfig::default();

        ServerConfig {
            bind_addr: parse_or(lookup(BIND_ADDR_VAR), BIND_ADDR_VAR, defaults.bind_addr),
            port: parse_or(lookup(PORT_VAR), PORT_VAR, defaults.port),
        }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display,
{
    match value {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid {} '{}', using {}", key, raw, default);
            default
        }),
    }
}
