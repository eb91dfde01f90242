//! Host-side plugin loading and the shared service container.

use std::fs;
use std::path::{Path, PathBuf};

use basalt_command::{CommandRegistry, CommandResult, ResponseStatus, ResponseTracker};
use basalt_sched::{QueueWorker, TickScheduler};
use serde_json::Value;
use tracing::{info, warn};

use crate::plugin::{Plugin, PluginInfo};

/// The shared framework services, constructed by the host at startup.
///
/// `commands` is owned outright; the scheduler, worker, and response
/// tracker are cheap-clone handles, so plugin command handlers can
/// capture their own copies.
pub struct Services {
    pub commands: CommandRegistry,
    pub scheduler: TickScheduler,
    pub worker: QueueWorker,
    pub responses: ResponseTracker,
}

impl Services {
    /// Build the service set for commands under `root_command`.
    pub fn new(root_command: &str) -> Self {
        let scheduler = TickScheduler::new();
        let worker = QueueWorker::new(&scheduler);
        Self {
            commands: CommandRegistry::new(root_command),
            scheduler,
            worker,
            responses: ResponseTracker::new(),
        }
    }

    /// Advance one server tick.
    pub fn tick(&self) {
        self.scheduler.tick();
    }

    /// Handle one text line from an actor.
    ///
    /// The line is checked against pending response prompts first; only
    /// when it is not a response does normal command dispatch run. A
    /// leading `/` on a command line is accepted and stripped.
    pub fn handle_line(&self, actor: &str, line: &str) -> CommandResult {
        match self.responses.on_message(actor, line) {
            ResponseStatus::Handled { messages } => CommandResult {
                success: true,
                messages,
                should_stop: false,
            },
            ResponseStatus::NotHandled => {
                let stripped = line.strip_prefix('/').unwrap_or(line);
                self.commands.execute(actor, stripped)
            }
        }
    }
}

/// Loads plugins, applies their configs, and tears them down in
/// reverse order at shutdown.
pub struct PluginHost {
    plugins_dir: PathBuf,
    plugins: Vec<LoadedPlugin>,
}

struct LoadedPlugin {
    info: PluginInfo,
    plugin: Box<dyn Plugin>,
}

impl PluginHost {
    /// Create a host that keeps plugin configs under `plugins_dir`.
    pub fn new(plugins_dir: impl Into<PathBuf>) -> Self {
        Self {
            plugins_dir: plugins_dir.into(),
            plugins: Vec::new(),
        }
    }

    /// Load and enable a plugin.
    ///
    /// If the plugin declares a default config, the file at
    /// `<plugins_dir>/<name>/config.json` is read (or seeded with the
    /// default on first load) and handed to `load_config` before
    /// `on_enable` runs.
    pub fn load(&mut self, mut plugin: Box<dyn Plugin>, services: &mut Services) {
        let info = plugin.info();

        if let Some(default) = plugin.default_config() {
            let path = self.plugins_dir.join(&info.name).join("config.json");
            let config = load_or_seed_config(&path, &default);
            plugin.load_config(config);
        }

        plugin.on_enable(services);
        info!("Enabled plugin {} v{}", info.name, info.version);
        self.plugins.push(LoadedPlugin { info, plugin });
    }

    /// Disable all plugins, most recently loaded first.
    pub fn shutdown(&mut self) {
        for loaded in self.plugins.iter_mut().rev() {
            loaded.plugin.on_disable();
            info!("Disabled plugin {}", loaded.info.name);
        }
        self.plugins.clear();
    }

    /// Metadata for every loaded plugin, in load order.
    pub fn plugins(&self) -> impl Iterator<Item = &PluginInfo> {
        self.plugins.iter().map(|p| &p.info)
    }
}

// Read the plugin config, seeding the file with the default when absent.
// Malformed or unreadable files fall back to the default with a warning.
fn load_or_seed_config(path: &Path, default: &Value) -> Value {
    if path.exists() {
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(value) => value,
                Err(e) => {
                    warn!("Failed to parse {}: {e}", path.display());
                    default.clone()
                }
            },
            Err(e) => {
                warn!("Failed to read {}: {e}", path.display());
                default.clone()
            }
        }
    } else {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                warn!("Failed to create {}: {e}", parent.display());
            }
        }
        match serde_json::to_string_pretty(default) {
            Ok(json) => {
                if let Err(e) = fs::write(path, json) {
                    warn!("Failed to write {}: {e}", path.display());
                }
            }
            Err(e) => warn!("Failed to serialize {}: {e}", path.display()),
        }
        default.clone()
    }
}
