//! Command parsing, registry, usage generation, and response prompts.
//!
//! Commands register under a single root name with declared positional,
//! floating (`--name`), and flag (`-name`) parameters. Dispatch binds an
//! input line against those declarations and hands the handler a parsed
//! context. The response module matches follow-up lines such as `/y`
//! against pending prompts before normal command handling runs.

pub mod error;
pub mod info;
pub mod parameter;
pub mod registry;
pub mod response;
pub mod usage;

pub use error::CommandError;
pub use info::CommandInfo;
pub use parameter::{CommandParameter, FlagParameter};
pub use registry::{CommandContext, CommandFn, CommandRegistry, CommandResult, RegisteredCommand};
pub use response::{RequestId, ResponseStatus, ResponseTracker, ResponseType, RESPONSE_MARKER};
pub use usage::UsageGenerator;
