/// Set of commands which the automation agent can receive and process
pub mod command;
/// Set of messages the agent broadcasts to its connected control consoles
pub mod message;
/// Data model shared between the agent and the consoles mirroring its state
pub mod model;
