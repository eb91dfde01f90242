//! Command parameter declarations.
//!
//! A raw declaration token is either `name` or `name=default`. A
//! parameter with a default value is optional; one without is required.

use crate::error::CommandError;

/// A positional or floating (`--name`) command parameter.
///
/// Immutable once parsed from its raw declaration token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandParameter {
    name: String,
    default_value: Option<String>,
}

impl CommandParameter {
    /// Parse a raw declaration token, splitting on the first `=`.
    ///
    /// The left side is the parameter name and must be non-empty. The
    /// right side, when present, is the default value, trimmed.
    pub fn parse(raw: &str) -> Result<Self, CommandError> {
        let (name, default_value) = match raw.split_once('=') {
            Some((name, default)) => (name, Some(default.trim().to_string())),
            None => (raw, None),
        };

        if name.is_empty() {
            return Err(CommandError::EmptyParameterName(raw.to_string()));
        }

        Ok(Self {
            name: name.to_string(),
            default_value,
        })
    }

    /// The parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The default value, if the parameter has one.
    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    /// Whether the parameter has a default value and is therefore optional.
    pub fn has_default_value(&self) -> bool {
        self.default_value.is_some()
    }
}

/// A boolean presence-only switch (`-name`). Flags never carry a default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagParameter {
    name: String,
}

impl FlagParameter {
    /// Parse a raw flag declaration token.
    pub fn parse(raw: &str) -> Result<Self, CommandError> {
        if raw.is_empty() {
            return Err(CommandError::EmptyParameterName(raw.to_string()));
        }
        if raw.contains('=') {
            return Err(CommandError::FlagWithDefault(raw.to_string()));
        }

        Ok(Self {
            name: raw.to_string(),
        })
    }

    /// The flag name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_with_default() {
        let param = CommandParameter::parse("amount=10").unwrap();
        assert_eq!(param.name(), "amount");
        assert_eq!(param.default_value(), Some("10"));
        assert!(param.has_default_value());
    }

    #[test]
    fn parse_without_default() {
        let param = CommandParameter::parse("amount").unwrap();
        assert_eq!(param.name(), "amount");
        assert_eq!(param.default_value(), None);
        assert!(!param.has_default_value());
    }

    #[test]
    fn parse_trims_default() {
        let param = CommandParameter::parse("mode= fast ").unwrap();
        assert_eq!(param.default_value(), Some("fast"));
    }

    #[test]
    fn parse_splits_on_first_equals() {
        let param = CommandParameter::parse("expr=a=b").unwrap();
        assert_eq!(param.name(), "expr");
        assert_eq!(param.default_value(), Some("a=b"));
    }

    #[test]
    fn parse_empty_default_is_still_optional() {
        let param = CommandParameter::parse("note=").unwrap();
        assert_eq!(param.default_value(), Some(""));
        assert!(param.has_default_value());
    }

    #[test]
    fn parse_empty_name_fails() {
        assert_eq!(
            CommandParameter::parse("=10"),
            Err(CommandError::EmptyParameterName("=10".to_string()))
        );
        assert_eq!(
            CommandParameter::parse(""),
            Err(CommandError::EmptyParameterName(String::new()))
        );
    }

    #[test]
    fn parse_flag() {
        let flag = FlagParameter::parse("silent").unwrap();
        assert_eq!(flag.name(), "silent");
    }

    #[test]
    fn parse_flag_rejects_default() {
        assert_eq!(
            FlagParameter::parse("silent=true"),
            Err(CommandError::FlagWithDefault("silent=true".to_string()))
        );
    }

    #[test]
    fn parse_flag_rejects_empty() {
        assert_eq!(
            FlagParameter::parse(""),
            Err(CommandError::EmptyParameterName(String::new()))
        );
    }
}
