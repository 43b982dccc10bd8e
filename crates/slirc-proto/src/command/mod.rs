//! IRC command types and parsing.

mod parse;
mod serialize;
/// Command subcommands (CAP, BATCH, CHATHISTORY).
pub mod subcommands;
mod types;
pub(crate) mod util;

pub use subcommands::{BatchSubCommand, CapSubCommand, ChatHistorySubCommand, MessageReference};
pub use types::{Command, CommandRef};
