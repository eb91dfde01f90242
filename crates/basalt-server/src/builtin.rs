//! Built-in host commands.

use basalt_command::{
    CommandError, CommandInfo, CommandRegistry, CommandResult, ResponseType, UsageGenerator,
};
use basalt_plugin::Services;
use basalt_sched::{QueueTask, TaskConcurrency};
use tracing::info;

/// Register the built-in commands on a fresh service set.
pub fn register(services: &mut Services) -> Result<(), CommandError> {
    // `help` is handled directly by the console loop; the registration
    // only makes it show up in listings.
    services.commands.register(
        &[],
        CommandInfo::new("help", "List available commands")?,
        |_| CommandResult::err("This command is handled internally."),
    )?;

    services.commands.register(
        &[],
        CommandInfo::new("stop", "Stop the server")?,
        |_| CommandResult {
            success: true,
            messages: vec!["Stopping the server...".to_string()],
            should_stop: true,
        },
    )?;

    let responses = services.responses.clone();
    let scheduler = services.scheduler.clone();
    let worker = services.worker.clone();
    services.commands.register(
        &[],
        CommandInfo::new("purge", "Clear cached data after confirmation")?,
        move |ctx| {
            let scheduler = scheduler.clone();
            let worker = worker.clone();
            let actor = ctx.sender_name.clone();
            responses.request(
                &ctx.sender_name,
                "purge",
                &[ResponseType::Confirm, ResponseType::Deny],
                move |response| {
                    if response != ResponseType::Confirm {
                        info!("Purge aborted by {actor}");
                        return;
                    }
                    let task =
                        QueueTask::new(&scheduler, "purge", TaskConcurrency::Async, |handle| {
                            handle.complete();
                        });
                    task.future()
                        .on_complete({
                            let actor = actor.clone();
                            move || info!("Purge finished for {actor}")
                        })
                        .on_fail(|reason| {
                            info!(
                                "Purge failed: {}",
                                reason.as_deref().unwrap_or("no reason given")
                            );
                        });
                    worker.add_task(task);
                },
            );
            CommandResult::ok("Purge requested. Reply /y to confirm or /n to abort.")
        },
    )?;

    Ok(())
}

/// Build the `help` listing: one usage line per top-level command.
pub fn help_text(commands: &CommandRegistry) -> Vec<String> {
    let generator = UsageGenerator::new(commands.root_name());
    let mut lines = vec!["Available commands:".to_string()];
    for command in commands.commands() {
        lines.push(format!(
            "  {} - {}",
            generator.generate(command).trim_end(),
            command.info().description()
        ));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn services() -> Services {
        let mut services = Services::new("Basalt");
        register(&mut services).unwrap();
        services
    }

    #[test]
    fn stop_flags_shutdown() {
        let services = services();
        let result = services.handle_line("console", "stop");
        assert!(result.success);
        assert!(result.should_stop);
    }

    #[test]
    fn purge_waits_for_confirmation() {
        let services = services();
        let result = services.handle_line("console", "purge");
        assert!(result.success);
        assert_eq!(services.responses.pending("console"), 1);
        assert_eq!(services.worker.queued(), 0);

        let result = services.handle_line("console", "/y");
        assert!(result.success);
        assert_eq!(services.responses.pending("console"), 0);
        assert_eq!(services.worker.queued(), 1);
    }

    #[test]
    fn purge_denied_queues_nothing() {
        let services = services();
        services.handle_line("console", "purge");
        services.handle_line("console", "/n");
        assert_eq!(services.responses.pending("console"), 0);
        assert_eq!(services.worker.queued(), 0);
    }

    #[test]
    fn help_text_lists_commands() {
        let services = services();
        let lines = help_text(&services.commands);
        assert!(lines[0].contains("Available commands"));
        assert!(lines.iter().any(|l| l.contains("/Basalt help")));
        assert!(lines.iter().any(|l| l.contains("/Basalt stop")));
        assert!(lines.iter().any(|l| l.contains("/Basalt purge")));
    }
}
