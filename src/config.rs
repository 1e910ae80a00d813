use std::net::{IpAddr, Ipv4Addr, SocketAddr};

pub const DEFAULT_PORT: u16 = 4000;

/// Default filter keeps our own spans at info and quiets the HTTP layer;
/// RUST_LOG overrides the whole thing.
pub const DEFAULT_LOG_FILTER: &str = "lingohub_backend=info,tower_http=warn";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let host = std::env::var("HOST")
            .ok()
            .and_then(|value| value.parse::<IpAddr>().ok())
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));

        let log_level =
            std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());

        Self {
            host,
            port,
            log_level,
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_overrides_are_parsed() {
        std::env::set_var("HOST", "127.0.0.1");
        std::env::set_var("PORT", "5055");

        let config = Config::from_env();
        assert_eq!(config.bind_addr().to_string(), "127.0.0.1:5055");

        std::env::remove_var("HOST");
        std::env::remove_var("PORT");
    }

    #[test]
    fn test_bind_addr_joins_host_and_port() {
        let config = Config {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: DEFAULT_PORT,
            log_level: DEFAULT_LOG_FILTER.to_string(),
        };
        assert_eq!(config.bind_addr().to_string(), "0.0.0.0:4000");
    }
}
