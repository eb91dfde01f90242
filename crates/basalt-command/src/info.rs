//! Per-command metadata: name, description, and parameter lists.

use crate::error::CommandError;
use crate::parameter::{CommandParameter, FlagParameter};

/// Immutable description of a command and its declared parameters.
///
/// Built once at registration time. Declaration mistakes (empty names,
/// an optional static parameter before a required one, colliding names)
/// surface immediately to the registering caller.
#[derive(Debug, Clone)]
pub struct CommandInfo {
    name: String,
    description: String,
    static_params: Vec<CommandParameter>,
    floating_params: Vec<CommandParameter>,
    flag_params: Vec<FlagParameter>,
}

impl CommandInfo {
    /// Create command metadata with no parameters.
    pub fn new(name: &str, description: &str) -> Result<Self, CommandError> {
        if name.is_empty() {
            return Err(CommandError::EmptyCommandName);
        }

        Ok(Self {
            name: name.to_string(),
            description: description.to_string(),
            static_params: Vec::new(),
            floating_params: Vec::new(),
            flag_params: Vec::new(),
        })
    }

    /// Declare positional parameters from raw `name` / `name=default` tokens.
    ///
    /// A parameter with a default must not precede one without: the
    /// positional binding could never reach the later required one.
    pub fn static_params<'a, I>(mut self, raw: I) -> Result<Self, CommandError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        for token in raw {
            let param = CommandParameter::parse(token)?;

            if !param.has_default_value() {
                if let Some(optional) = self.static_params.iter().find(|p| p.has_default_value()) {
                    return Err(CommandError::OptionalBeforeRequired {
                        optional: optional.name().to_string(),
                        required: param.name().to_string(),
                    });
                }
            }

            self.check_unique(param.name())?;
            self.static_params.push(param);
        }
        Ok(self)
    }

    /// Declare floating (`--name`) parameters from raw tokens.
    pub fn floating_params<'a, I>(mut self, raw: I) -> Result<Self, CommandError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        for token in raw {
            let param = CommandParameter::parse(token)?;
            self.check_unique(param.name())?;
            self.floating_params.push(param);
        }
        Ok(self)
    }

    /// Declare flag (`-name`) parameters.
    pub fn flags<'a, I>(mut self, raw: I) -> Result<Self, CommandError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        for token in raw {
            let flag = FlagParameter::parse(token)?;
            self.check_unique(flag.name())?;
            self.flag_params.push(flag);
        }
        Ok(self)
    }

    /// The command name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The one-line command description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Declared positional parameters, in binding order.
    pub fn static_param_list(&self) -> &[CommandParameter] {
        &self.static_params
    }

    /// Declared floating parameters.
    pub fn floating_param_list(&self) -> &[CommandParameter] {
        &self.floating_params
    }

    /// Declared flags.
    pub fn flag_param_list(&self) -> &[FlagParameter] {
        &self.flag_params
    }

    // Names must be unique across all three parameter categories.
    fn check_unique(&self, name: &str) -> Result<(), CommandError> {
        let taken = self.static_params.iter().any(|p| p.name() == name)
            || self.floating_params.iter().any(|p| p.name() == name)
            || self.flag_params.iter().any(|f| f.name() == name);

        if taken {
            return Err(CommandError::DuplicateParameter(name.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_full_declaration() {
        let info = CommandInfo::new("give", "Give an item")
            .unwrap()
            .static_params(["playerName", "amount=1"])
            .unwrap()
            .floating_params(["world=overworld"])
            .unwrap()
            .flags(["silent"])
            .unwrap();

        assert_eq!(info.name(), "give");
        assert_eq!(info.static_param_list().len(), 2);
        assert_eq!(info.floating_param_list().len(), 1);
        assert_eq!(info.flag_param_list().len(), 1);
        assert!(info.static_param_list()[1].has_default_value());
    }

    #[test]
    fn empty_command_name_fails() {
        assert!(matches!(
            CommandInfo::new("", "nope"),
            Err(CommandError::EmptyCommandName)
        ));
    }

    #[test]
    fn optional_before_required_fails() {
        let err = CommandInfo::new("give", "")
            .unwrap()
            .static_params(["amount=1", "playerName"])
            .unwrap_err();

        assert_eq!(
            err,
            CommandError::OptionalBeforeRequired {
                optional: "amount".to_string(),
                required: "playerName".to_string(),
            }
        );
    }

    #[test]
    fn required_after_required_is_fine() {
        let info = CommandInfo::new("give", "")
            .unwrap()
            .static_params(["playerName", "amount", "reason=none"])
            .unwrap();
        assert_eq!(info.static_param_list().len(), 3);
    }

    #[test]
    fn duplicate_static_name_fails() {
        let err = CommandInfo::new("give", "")
            .unwrap()
            .static_params(["amount", "amount"])
            .unwrap_err();
        assert_eq!(err, CommandError::DuplicateParameter("amount".to_string()));
    }

    #[test]
    fn duplicate_across_categories_fails() {
        let err = CommandInfo::new("give", "")
            .unwrap()
            .static_params(["silent"])
            .unwrap()
            .flags(["silent"])
            .unwrap_err();
        assert_eq!(err, CommandError::DuplicateParameter("silent".to_string()));
    }

    #[test]
    fn duplicate_floating_vs_static_fails() {
        let err = CommandInfo::new("give", "")
            .unwrap()
            .static_params(["world"])
            .unwrap()
            .floating_params(["world=overworld"])
            .unwrap_err();
        assert_eq!(err, CommandError::DuplicateParameter("world".to_string()));
    }
}
