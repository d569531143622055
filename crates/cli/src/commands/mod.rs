//! CLI command implementations.

pub mod basket;
pub mod token;

use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] eshop_basket::config::ConfigError),

    /// The buyer id argument is invalid.
    #[error("Invalid buyer id: {0}")]
    InvalidBuyer(#[from] eshop_core::BuyerIdError),

    /// The basket store failed.
    #[error("Store error: {0}")]
    Store(#[from] eshop_basket::store::StoreError),

    /// Token could not be issued.
    #[error("Token error: {0}")]
    Token(#[from] eshop_basket::auth::AuthError),

    /// Output could not be rendered.
    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}
