//! Lobsters site library.
//!
//! Comment validation and posting, recent URL mention detection, and story
//! search. The `lobsters` binary and the integration tests build on it.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod search;
pub mod services;
pub mod state;
