mod batch;
mod cap;
mod chathistory;
mod metadata;

pub use batch::BatchSubCommand;
pub use cap::CapSubCommand;
pub use chathistory::{ChatHistorySubCommand, MessageReference};
pub use metadata::MetadataSubCommand;
