//! Client-side state synchronization core for the storydesk writing assistant.
//!
//! The pieces, leaf-first:
//! - [`bus`] - synchronous pub/sub used for change notification
//! - [`store`] - the single source of truth and its patch/snapshot contract
//! - [`client`] - the async resource-client boundary to the backend
//! - [`http`] - the reqwest implementation of that boundary
//! - [`loader`] - sequential background hydration of summary projects
//! - [`actions`] - user-level mutations that resynchronize the store
//! - [`guard`] - per-action reentrancy guards for double-fired UI events
//! - [`phases`] - the directed relationship-phase model and its derived views
//!
//! Rendering, modal construction and prompt building live elsewhere; this
//! crate only owns state and its synchronization with the backend.

pub mod actions;
pub mod bus;
pub mod client;
pub mod config;
pub mod guard;
pub mod http;
pub mod loader;
pub mod phases;
pub mod store;

pub use actions::ProjectActions;
pub use bus::{CoreEvent, EventBus, SubscriptionId, Topic};
pub use client::{CredentialCache, ResourceClient, ResourceError};
pub use config::CoreConfig;
pub use guard::{ActionGuards, ActionKind};
pub use http::HttpResourceClient;
pub use loader::{hydrate_all, HydrationOutcome, SkipReason};
pub use store::{AppState, EntityKind, LoadingKey, StatePatch, Store};
