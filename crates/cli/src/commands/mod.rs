//! Command handlers for the paperchat CLI.

pub mod ask;

pub use ask::AskCommand;
