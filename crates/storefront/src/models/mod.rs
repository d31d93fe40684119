//! Domain models for the storefront.

pub mod identity;

pub use identity::{Identity, session_keys};
