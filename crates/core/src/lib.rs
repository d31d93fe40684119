//! GreenBasket Core - Shared types library.
//!
//! This crate provides common types used by the GreenBasket storefront:
//! identity roles, type-safe entity IDs, validated emails, prices, and
//! order statuses.
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. All
//! business logic lives in the upstream REST services; these types describe
//! the data that crosses the wire and the handful of invariants the client
//! itself maintains.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
