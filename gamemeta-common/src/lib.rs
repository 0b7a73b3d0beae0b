//! # gamemeta Common Library
//!
//! Shared code for the gamemeta crates including:
//! - Error types
//! - TOML configuration loading and validation
//! - Logging initialisation

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
