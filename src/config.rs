use clap::Parser;
use std::{net::SocketAddr, time::Duration};

/// Server settings. Every flag defaults to the value a stock offline
/// server would use.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Offline-mode server for the handshake, status and login phases", long_about = None)]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:25565")]
    pub bind: SocketAddr,

    /// Description shown in the server list
    #[arg(long, default_value = "A Minecraft Server")]
    pub motd: String,

    /// Player capacity reported in the server list and join packet
    #[arg(long, default_value_t = 20)]
    pub max_players: i32,

    /// View distance in chunks sent on join
    #[arg(long, default_value_t = 10)]
    pub view_distance: i32,

    /// Simulation distance in chunks sent on join
    #[arg(long, default_value_t = 10)]
    pub simulation_distance: i32,

    /// Seconds a login may sit idle between packets before it is dropped
    #[arg(long, default_value_t = 10)]
    pub login_timeout_secs: u64,
}

impl ServerConfig {
    pub fn login_timeout(&self) -> Duration {
        Duration::from_secs(self.login_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::parse_from(["minecraft-offline-server"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stock_server() {
        let config = ServerConfig::default();
        assert_eq!(config.bind, "0.0.0.0:25565".parse().unwrap());
        assert_eq!(config.motd, "A Minecraft Server");
        assert_eq!(config.max_players, 20);
        assert_eq!(config.view_distance, 10);
        assert_eq!(config.simulation_distance, 10);
        assert_eq!(config.login_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn flags_override_defaults() {
        let config = ServerConfig::parse_from([
            "minecraft-offline-server",
            "--bind",
            "127.0.0.1:0",
            "--motd",
            "hello",
            "--login-timeout-secs",
            "3",
        ]);
        assert_eq!(config.bind.port(), 0);
        assert_eq!(config.motd, "hello");
        assert_eq!(config.login_timeout_secs, 3);
        assert_eq!(config.max_players, 20);
    }
}
