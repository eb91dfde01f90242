//! Hierarchical command registry and dispatch.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::debug;

use crate::error::CommandError;
use crate::info::CommandInfo;
use crate::usage::UsageGenerator;

/// Context passed to a command handler.
pub struct CommandContext {
    /// Name of the actor executing the command.
    pub sender_name: String,
    /// Parsed parameter values, keyed by parameter name. Optional
    /// parameters the actor omitted are present with their defaults.
    pub args: HashMap<String, String>,
    /// Flags present on the invocation.
    pub flags: HashSet<String>,
}

impl CommandContext {
    /// Get a parsed argument by parameter name.
    pub fn arg(&self, name: &str) -> Option<&str> {
        self.args.get(name).map(String::as_str)
    }

    /// Whether a flag was set on the invocation.
    pub fn flag(&self, name: &str) -> bool {
        self.flags.contains(name)
    }
}

/// Result returned by a command handler.
pub struct CommandResult {
    /// Whether the command executed successfully.
    pub success: bool,
    /// Messages to send back to the actor.
    pub messages: Vec<String>,
    /// If true, the host should shut down.
    pub should_stop: bool,
}

impl CommandResult {
    /// Create a successful result with a single message.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            messages: vec![message.into()],
            should_stop: false,
        }
    }

    /// Create a failed result with a single message.
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            messages: vec![message.into()],
            should_stop: false,
        }
    }
}

/// Boxed command handler.
pub type CommandFn = Box<dyn Fn(&CommandContext) -> CommandResult + Send>;

/// A node in the command tree.
pub struct RegisteredCommand {
    info: CommandInfo,
    parent_path: Vec<String>,
    handler: Option<CommandFn>,
    subcommands: BTreeMap<String, RegisteredCommand>,
}

impl RegisteredCommand {
    /// The command's metadata.
    pub fn info(&self) -> &CommandInfo {
        &self.info
    }

    /// Ancestor command names in root-to-leaf order, excluding the root name.
    pub fn parent_path(&self) -> &[String] {
        &self.parent_path
    }

    /// Whether this command owns sub-commands (a command group).
    pub fn has_subcommands(&self) -> bool {
        !self.subcommands.is_empty()
    }

    /// The command's sub-commands, in name order.
    pub fn subcommands(&self) -> impl Iterator<Item = &RegisteredCommand> {
        self.subcommands.values()
    }
}

/// Registry of commands under a single root name.
pub struct CommandRegistry {
    root_name: String,
    usage: UsageGenerator,
    commands: BTreeMap<String, RegisteredCommand>,
}

impl CommandRegistry {
    /// Create an empty registry for commands under `root_name`.
    pub fn new(root_name: &str) -> Self {
        Self {
            root_name: root_name.to_string(),
            usage: UsageGenerator::new(root_name),
            commands: BTreeMap::new(),
        }
    }

    /// The root command name.
    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    /// Register a command under a parent path (`&[]` for top level).
    pub fn register(
        &mut self,
        parent: &[&str],
        info: CommandInfo,
        handler: impl Fn(&CommandContext) -> CommandResult + Send + 'static,
    ) -> Result<(), CommandError> {
        self.insert(parent, info, Some(Box::new(handler)))
    }

    /// Register a command group: a command with sub-commands but no
    /// handler of its own. Invoking it prints its usage.
    pub fn register_group(&mut self, parent: &[&str], info: CommandInfo) -> Result<(), CommandError> {
        self.insert(parent, info, None)
    }

    fn insert(
        &mut self,
        parent: &[&str],
        info: CommandInfo,
        handler: Option<CommandFn>,
    ) -> Result<(), CommandError> {
        let mut map = &mut self.commands;
        for segment in parent {
            let node = map
                .get_mut(*segment)
                .ok_or_else(|| CommandError::UnknownParent(segment.to_string()))?;
            map = &mut node.subcommands;
        }

        let name = info.name().to_string();
        if map.contains_key(&name) {
            return Err(CommandError::AlreadyRegistered(name));
        }

        debug!("registered command {}", name);
        map.insert(
            name,
            RegisteredCommand {
                info,
                parent_path: parent.iter().map(|s| s.to_string()).collect(),
                handler,
                subcommands: BTreeMap::new(),
            },
        );
        Ok(())
    }

    /// Look up a command by its full path.
    pub fn find(&self, path: &[&str]) -> Option<&RegisteredCommand> {
        let (first, rest) = path.split_first()?;
        let mut current = self.commands.get(*first)?;
        for segment in rest {
            current = current.subcommands.get(*segment)?;
        }
        Some(current)
    }

    /// Usage string for a registered command path.
    pub fn usage(&self, path: &[&str]) -> Option<String> {
        self.find(path).map(|cmd| self.usage.generate(cmd))
    }

    /// Top-level commands, in name order.
    pub fn commands(&self) -> impl Iterator<Item = &RegisteredCommand> {
        self.commands.values()
    }

    /// Dispatch an input line for an actor.
    ///
    /// Tokens descend the sub-command tree as far as they match;
    /// remaining tokens bind to the resolved command's parameters.
    pub fn execute(&self, sender_name: &str, line: &str) -> CommandResult {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((first, mut rest)) = tokens.split_first() else {
            return CommandResult::err("No command given.");
        };

        let Some(mut current) = self.commands.get(*first) else {
            return CommandResult::err(format!(
                "Unknown command: {first}. Type '{} help' for a list of commands.",
                self.root_name
            ));
        };

        while let Some((next, tail)) = rest.split_first() {
            match current.subcommands.get(*next) {
                Some(sub) => {
                    current = sub;
                    rest = tail;
                }
                None => break,
            }
        }

        let Some(handler) = &current.handler else {
            return CommandResult::err(format!("Usage: {}", self.usage.generate(current)));
        };

        match bind_args(current.info(), rest) {
            Ok((args, flags)) => {
                let ctx = CommandContext {
                    sender_name: sender_name.to_string(),
                    args,
                    flags,
                };
                handler(&ctx)
            }
            Err(message) => {
                let mut result =
                    CommandResult::err(format!("Usage: {}", self.usage.generate(current)));
                result.messages.insert(0, message);
                result
            }
        }
    }
}

type BoundArgs = (HashMap<String, String>, HashSet<String>);

// Bind raw argument tokens against a command's parameter declarations.
fn bind_args(info: &CommandInfo, tokens: &[&str]) -> Result<BoundArgs, String> {
    let mut args = HashMap::new();
    let mut flags = HashSet::new();
    let mut positional: Vec<&str> = Vec::new();

    let mut iter = tokens.iter().copied();
    while let Some(token) = iter.next() {
        if let Some(name) = token.strip_prefix("--") {
            if !info.floating_param_list().iter().any(|p| p.name() == name) {
                return Err(format!("Unknown parameter: --{name}"));
            }
            let Some(value) = iter.next() else {
                return Err(format!("Missing value for --{name}"));
            };
            args.insert(name.to_string(), value.to_string());
        } else if is_flag_token(token) {
            let name = &token[1..];
            if !info.flag_param_list().iter().any(|f| f.name() == name) {
                return Err(format!("Unknown flag: -{name}"));
            }
            flags.insert(name.to_string());
        } else {
            positional.push(token);
        }
    }

    let static_params = info.static_param_list();
    if positional.len() > static_params.len() {
        return Err("Too many arguments.".to_string());
    }

    for (i, param) in static_params.iter().enumerate() {
        if let Some(value) = positional.get(i) {
            args.insert(param.name().to_string(), value.to_string());
        } else if let Some(default) = param.default_value() {
            args.insert(param.name().to_string(), default.to_string());
        } else {
            return Err(format!("Missing required parameter: <{}>", param.name()));
        }
    }

    for param in info.floating_param_list() {
        if !args.contains_key(param.name()) {
            if let Some(default) = param.default_value() {
                args.insert(param.name().to_string(), default.to_string());
            } else {
                return Err(format!("Missing required parameter: <--{}>", param.name()));
            }
        }
    }

    Ok((args, flags))
}

// A single-dash token is a flag unless it looks like a negative number.
fn is_flag_token(token: &str) -> bool {
    token.len() > 1
        && token.starts_with('-')
        && !token.starts_with("--")
        && !token[1..].starts_with(|c: char| c.is_ascii_digit())
}
