//! Usage string rendering.

use crate::registry::RegisteredCommand;

/// Renders `/<root> <path><command> <params>` usage lines.
///
/// Required static parameters render as `<name>`, optional as `[name]`,
/// floating parameters as `<--name>` / `[--name]`, and flags as
/// `[-name]`. A command that owns sub-commands renders the abbreviated
/// group form `/<root> <path><command> ?` instead.
pub struct UsageGenerator {
    root: String,
}

impl UsageGenerator {
    /// Create a generator for commands under `root`.
    pub fn new(root: &str) -> Self {
        Self {
            root: root.to_string(),
        }
    }

    /// Build the usage string for a registered command.
    pub fn generate(&self, command: &RegisteredCommand) -> String {
        let mut out = String::with_capacity(64);
        out.push('/');
        out.push_str(&self.root);
        out.push(' ');

        for segment in command.parent_path() {
            out.push_str(segment);
            out.push(' ');
        }

        out.push_str(command.info().name());
        out.push(' ');

        if command.has_subcommands() {
            out.push('?');
            return out;
        }

        for param in command.info().static_param_list() {
            let required = !param.has_default_value();
            out.push(if required { '<' } else { '[' });
            out.push_str(param.name());
            out.push(if required { '>' } else { ']' });
            out.push(' ');
        }

        for param in command.info().floating_param_list() {
            let required = !param.has_default_value();
            out.push(if required { '<' } else { '[' });
            out.push_str("--");
            out.push_str(param.name());
            out.push(if required { '>' } else { ']' });
            out.push(' ');
        }

        for flag in command.info().flag_param_list() {
            out.push_str("[-");
            out.push_str(flag.name());
            out.push_str("] ");
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::info::CommandInfo;
    use crate::registry::{CommandRegistry, CommandResult};

    fn registry() -> CommandRegistry {
        CommandRegistry::new("Basalt")
    }

    #[test]
    fn required_static_params() {
        let mut reg = registry();
        let info = CommandInfo::new("give", "Give an item")
            .unwrap()
            .static_params(["playerName", "amount"])
            .unwrap();
        reg.register(&[], info, |_| CommandResult::ok("")).unwrap();

        let gen = UsageGenerator::new("Basalt");
        let cmd = reg.find(&["give"]).unwrap();
        assert_eq!(gen.generate(cmd), "/Basalt give <playerName> <amount> ");
    }

    #[test]
    fn optional_and_floating_and_flags() {
        let mut reg = registry();
        let info = CommandInfo::new("fill", "Fill a region")
            .unwrap()
            .static_params(["block", "depth=1"])
            .unwrap()
            .floating_params(["world", "speed=normal"])
            .unwrap()
            .flags(["silent"])
            .unwrap();
        reg.register(&[], info, |_| CommandResult::ok("")).unwrap();

        let gen = UsageGenerator::new("Basalt");
        let cmd = reg.find(&["fill"]).unwrap();
        assert_eq!(
            gen.generate(cmd),
            "/Basalt fill <block> [depth] <--world> [--speed] [-silent] "
        );
    }

    #[test]
    fn command_group_renders_abbreviated_form() {
        let mut reg = registry();
        let group = CommandInfo::new("econ", "Economy commands").unwrap();
        reg.register_group(&[], group).unwrap();
        let pay = CommandInfo::new("pay", "Pay a player")
            .unwrap()
            .static_params(["playerName", "amount"])
            .unwrap();
        reg.register(&["econ"], pay, |_| CommandResult::ok(""))
            .unwrap();

        let gen = UsageGenerator::new("Basalt");
        let cmd = reg.find(&["econ"]).unwrap();
        assert_eq!(gen.generate(cmd), "/Basalt econ ?");
    }

    #[test]
    fn nested_command_includes_parent_path() {
        let mut reg = registry();
        reg.register_group(&[], CommandInfo::new("econ", "").unwrap())
            .unwrap();
        reg.register_group(&["econ"], CommandInfo::new("admin", "").unwrap())
            .unwrap();
        let give = CommandInfo::new("give", "")
            .unwrap()
            .static_params(["playerName", "amount"])
            .unwrap();
        reg.register(&["econ", "admin"], give, |_| CommandResult::ok(""))
            .unwrap();

        let gen = UsageGenerator::new("Basalt");
        let cmd = reg.find(&["econ", "admin", "give"]).unwrap();
        assert_eq!(
            gen.generate(cmd),
            "/Basalt econ admin give <playerName> <amount> "
        );
    }
}
