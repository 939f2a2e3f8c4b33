//! Lobsters Core - Shared types library.
//!
//! This crate provides common types used across all Lobsters components:
//! - `site` - Comments, hats, stories, mention detection and story search
//! - `cli` - Command-line tools for migrations, search and diagnostics
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and public short ids

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
