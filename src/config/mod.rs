// Configuration module entry point
// Builds the immutable server configuration and the shared application state

mod state;
mod types;

use std::net::SocketAddr;
use std::time::Duration;

// Re-export public types
pub use state::AppState;
pub use types::Config;

pub const DEFAULT_PORT: u16 = 8000;

/// Result of interpreting the optional positional port argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortArg {
    /// No argument given
    Missing,
    /// A usable port number
    Valid(u16),
    /// Argument present but not a port number
    Invalid,
}

impl PortArg {
    pub fn parse(arg: Option<&str>) -> Self {
        match arg {
            None => Self::Missing,
            Some(raw) => raw.trim().parse::<u16>().map_or(Self::Invalid, Self::Valid),
        }
    }

    pub const fn port(self) -> Option<u16> {
        match self {
            Self::Valid(port) => Some(port),
            Self::Missing | Self::Invalid => None,
        }
    }
}

impl Config {
    /// Build configuration from built-in defaults, with an optional port override
    /// taken from the command line
    pub fn load(port_override: Option<u16>) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", i64::from(DEFAULT_PORT))?
            .set_default("content.index_file", "index.html")?
            .set_default("content.script_extension", ".sh")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_override_option("server.port", port_override.map(i64::from))?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Upper bound on how long a single connection may stay open
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(std::cmp::max(
            self.performance.read_timeout,
            self.performance.write_timeout,
        ))
    }
}
