//! Common error types for Sense

use thiserror::Error;

/// Common result type for Sense operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared across the Sense binaries
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or resolution error
    #[error("Configuration error: {0}")]
    Config(String),
}
