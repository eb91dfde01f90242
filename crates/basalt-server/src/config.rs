use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub logging: LoggingSection,
    #[serde(default)]
    pub plugins: PluginsSection,
}

#[derive(Debug, Deserialize)]
pub struct ServerSection {
    /// Root command name actors prefix sub-commands with.
    #[serde(default = "default_name")]
    pub name: String,
    /// Tick interval in milliseconds. Default: 50 (20 ticks per second).
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

fn default_name() -> String {
    "Basalt".into()
}

fn default_tick_ms() -> u64 {
    50
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            name: default_name(),
            tick_ms: default_tick_ms(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoggingSection {
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".into()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PluginsSection {
    #[serde(default = "default_plugins_directory")]
    pub directory: String,
}

fn default_plugins_directory() -> String {
    "plugins".into()
}

impl Default for PluginsSection {
    fn default() -> Self {
        Self {
            directory: default_plugins_directory(),
        }
    }
}

impl ServerConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }
}
