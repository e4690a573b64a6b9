//! Lockdesk HTTP API: lock registry, listing/lock bindings, distribution
//! runs, and vendor onboarding, over the provisioning and vendor crates.

pub mod background;
pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod routes;
pub mod state;
