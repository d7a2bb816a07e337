mod action;
mod state;
#[allow(clippy::module_inception)]
mod state_store;

pub use action::Action;
pub use state::{Effect, State};
pub use state_store::StateStore;
