//! Client for the trainer roster backend: remote store, element tree,
//! interaction controller and the application context tying them together.

pub mod app;
pub mod config;
pub mod controller;
pub mod error;
pub mod store;
pub mod view;

pub use app::App;
pub use config::{load_settings, Settings};
pub use controller::{InteractionController, Outcome, SkipReason};
pub use error::{ActionError, StoreError, StoreOperation};
pub use store::{HttpRemoteStore, RemoteStore};
pub use view::{Action, NodeId, View, ViewError};

/// Most creatures a roster may show via the add control.
pub const ROSTER_LIMIT: usize = 6;

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
