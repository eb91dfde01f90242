//! The plugin trait implemented by framework consumers.

use serde_json::Value;

use crate::host::Services;

/// Metadata about a plugin.
#[derive(Debug, Clone)]
pub struct PluginInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub author: String,
}

/// A framework consumer.
///
/// Implementations register commands, schedule jobs, queue tasks, and
/// request responses through the [`Services`] passed to `on_enable`.
pub trait Plugin: Send {
    /// Return plugin metadata.
    fn info(&self) -> PluginInfo;

    /// Called when the plugin is loaded.
    fn on_enable(&mut self, services: &mut Services);

    /// Called when the host shuts down, in reverse load order.
    fn on_disable(&mut self) {}

    /// Return a default config as JSON. If `Some`, the plugin gets a
    /// config file seeded with it on first load.
    fn default_config(&self) -> Option<Value> {
        None
    }

    /// Called with the loaded config before `on_enable`.
    fn load_config(&mut self, _config: Value) {}
}
