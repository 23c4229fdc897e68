// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub content: ContentConfig,
    pub performance: PerformanceConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// What the server exposes from the working directory
#[derive(Debug, Deserialize, Clone)]
pub struct ContentConfig {
    /// Landing page served on `/`
    pub index_file: String,
    /// Suffix a file must carry to be listed or served (including the dot)
    pub script_extension: String,
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    /// Seconds
    pub read_timeout: u64,
    /// Seconds
    pub write_timeout: u64,
}
