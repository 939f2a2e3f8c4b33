//! Core types for Lobsters.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod short_id;

pub use id::*;
pub use short_id::{ShortId, ShortIdError};
