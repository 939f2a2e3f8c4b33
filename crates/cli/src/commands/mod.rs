//! Subcommand implementations.

pub mod comment;
pub mod index_schema;
pub mod mentions;
pub mod migrate;
pub mod search;
