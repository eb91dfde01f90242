mod announcer;
mod builtin;
mod config;

use std::path::Path;
use std::time::Duration;

use basalt_plugin::{PluginHost, Services};
use config::ServerConfig;
use tokio::io::AsyncBufReadExt;
use tracing::{info, warn};

const CONFIG_FILE: &str = "server.toml";
const CONSOLE_ACTOR: &str = "console";

#[tokio::main]
async fn main() {
    let config = if Path::new(CONFIG_FILE).exists() {
        match ServerConfig::load(CONFIG_FILE) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load {CONFIG_FILE}: {e}");
                std::process::exit(1);
            }
        }
    } else {
        ServerConfig::default()
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!(
        "Basalt framework host v{} starting",
        env!("CARGO_PKG_VERSION")
    );
    info!("Command root: {}", config.server.name);
    info!("Tick interval: {} ms", config.server.tick_ms);

    let mut services = Services::new(&config.server.name);
    if let Err(e) = builtin::register(&mut services) {
        warn!("Failed to register built-in commands: {e}");
        std::process::exit(1);
    }

    let mut plugin_host = PluginHost::new(&config.plugins.directory);
    plugin_host.load(Box::new(announcer::AnnouncerPlugin::new()), &mut services);

    let (shutdown_tx, mut shutdown_rx) = tokio::sync::watch::channel(false);

    // Handle Ctrl+C
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    // Console REPL: read lines from stdin
    let (console_tx, mut console_rx) = tokio::sync::mpsc::channel::<String>(32);
    tokio::spawn(async move {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let mut lines = stdin.lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let line = line.trim().to_string();
            if !line.is_empty() && console_tx.send(line).await.is_err() {
                break;
            }
        }
    });

    let mut tick_interval = tokio::time::interval(Duration::from_millis(config.server.tick_ms));
    info!("Ready. Type 'help' for a list of commands.");

    loop {
        tokio::select! {
            _ = tick_interval.tick() => {
                services.tick();
            }
            Some(line) = console_rx.recv() => {
                if handle_console_line(&services, &line) {
                    break;
                }
            }
            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    break;
                }
            }
        }
    }

    plugin_host.shutdown();
    info!("Server shut down.");
}

// Returns true when the host should stop.
fn handle_console_line(services: &Services, line: &str) -> bool {
    let stripped = line.strip_prefix('/').unwrap_or(line);
    if stripped.split_whitespace().next() == Some("help") {
        for message in builtin::help_text(&services.commands) {
            info!("{message}");
        }
        return false;
    }

    let result = services.handle_line(CONSOLE_ACTOR, line);
    for message in &result.messages {
        if result.success {
            info!("{message}");
        } else {
            warn!("{message}");
        }
    }
    result.should_stop
}
