//! # Sense Common Library
//!
//! Shared code for the Sense binaries:
//! - Error type
//! - API request/response wire types
//! - Configuration file resolution

pub mod api;
pub mod config;
pub mod error;

pub use error::{Error, Result};
