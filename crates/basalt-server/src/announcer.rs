//! Bundled demo plugin: scheduled announcements.

use basalt_command::{CommandInfo, CommandResult};
use basalt_plugin::{Plugin, PluginInfo, Services};
use serde_json::Value;
use tracing::info;

/// Announces a message immediately or after a tick delay.
pub struct AnnouncerPlugin {
    prefix: String,
}

impl AnnouncerPlugin {
    pub fn new() -> Self {
        Self {
            prefix: "[Server]".to_string(),
        }
    }
}

impl Default for AnnouncerPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for AnnouncerPlugin {
    fn info(&self) -> PluginInfo {
        PluginInfo {
            name: "Announcer".into(),
            version: "1.0.0".into(),
            description: "Broadcasts announcements, optionally delayed".into(),
            author: "Basalt".into(),
        }
    }

    fn on_enable(&mut self, services: &mut Services) {
        let scheduler = services.scheduler.clone();
        let prefix = self.prefix.clone();

        let result = CommandInfo::new("announce", "Broadcast an announcement")
            .and_then(|info| info.static_params(["message"]))
            .and_then(|info| info.floating_params(["delay=0"]))
            .and_then(|info| {
                services.commands.register(&[], info, move |ctx| {
                    let message = ctx.arg("message").unwrap_or("").to_string();
                    let delay: u64 = match ctx.arg("delay").unwrap_or("0").parse() {
                        Ok(ticks) => ticks,
                        Err(_) => return CommandResult::err("--delay must be a tick count."),
                    };

                    if delay == 0 {
                        CommandResult::ok(format!("{prefix} {message}"))
                    } else {
                        let prefix = prefix.clone();
                        scheduler.run_later(delay, move || {
                            info!("{prefix} {message}");
                        });
                        CommandResult::ok(format!("Announcement scheduled in {delay} ticks."))
                    }
                })
            });

        if let Err(e) = result {
            info!("Announcer failed to register its command: {e}");
        }
    }

    fn default_config(&self) -> Option<Value> {
        Some(serde_json::json!({ "prefix": "[Server]" }))
    }

    fn load_config(&mut self, config: Value) {
        if let Some(prefix) = config.get("prefix").and_then(Value::as_str) {
            self.prefix = prefix.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled_services() -> Services {
        let mut services = Services::new("Basalt");
        let mut plugin = AnnouncerPlugin::new();
        plugin.on_enable(&mut services);
        services
    }

    #[test]
    fn immediate_announcement() {
        let services = enabled_services();
        let result = services.handle_line("console", "announce maintenance");
        assert!(result.success);
        assert_eq!(result.messages[0], "[Server] maintenance");
    }

    #[test]
    fn delayed_announcement_is_scheduled() {
        let services = enabled_services();
        let result = services.handle_line("console", "announce restart --delay 20");
        assert!(result.success);
        assert_eq!(result.messages[0], "Announcement scheduled in 20 ticks.");
    }

    #[test]
    fn bad_delay_is_rejected() {
        let services = enabled_services();
        let result = services.handle_line("console", "announce restart --delay soon");
        assert!(!result.success);
        assert!(result.messages[0].contains("--delay"));
    }

    #[test]
    fn config_changes_prefix() {
        let mut services = Services::new("Basalt");
        let mut plugin = AnnouncerPlugin::new();
        plugin.load_config(serde_json::json!({ "prefix": "[Maint]" }));
        plugin.on_enable(&mut services);

        let result = services.handle_line("console", "announce reboot");
        assert_eq!(result.messages[0], "[Maint] reboot");
    }
}
