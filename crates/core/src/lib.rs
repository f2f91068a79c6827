//! Laceup Core - Shared types library.
//!
//! This crate provides common types used across all Laceup components:
//! - `cart` - Cart state management library
//! - `cli` - Command-line front end for cart operations
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no storage.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and prices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
