/// Line-oriented front end; stands in for a full renderer and exercises
/// every subscription surface of the state store
pub mod cli;
/// WebSocket link to the agent with fixed-delay automatic reconnection
pub mod connection;
/// Client-side validation and serialization of user intents
pub mod dispatch;
/// Persisted display name
pub mod identity;
/// User-facing notices and ephemeral progress reports
pub mod notify;
/// Drag-and-drop queue reorder gesture tracking
pub mod reorder;
/// Canonical client state, merge protocol and the main processing loop
pub mod state_store;
mod termination;

pub use termination::{create_termination, Interrupted, Terminator};
