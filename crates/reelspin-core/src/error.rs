//! Error types for the spin pipeline

use rust_decimal::Decimal;
use thiserror::Error;

/// Slot engine errors
#[derive(Error, Debug)]
pub enum SlotError {
    #[error("Invalid spin configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown symbol in win data: {0}")]
    UnknownSymbol(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Symbol not found: {0}")]
    NotFound(String),

    #[error("Invalid symbol catalog: {0}")]
    InvalidCatalog(String),

    #[error("Insufficient balance: balance {balance}, bet {bet}")]
    InsufficientBalance { balance: Decimal, bet: Decimal },

    #[error("Player not found: {0}")]
    PlayerNotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Amount overflow: {0}")]
    Overflow(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SlotError {
    /// Stable machine-readable code for the outer layer
    pub fn code(&self) -> &'static str {
        match self {
            SlotError::InvalidConfig(_) => "invalid_config",
            SlotError::UnknownSymbol(_) => "unknown_symbol",
            SlotError::Validation(_) => "validation",
            SlotError::NotFound(_) => "not_found",
            SlotError::InvalidCatalog(_) => "invalid_catalog",
            SlotError::InsufficientBalance { .. } => "insufficient_balance",
            SlotError::PlayerNotFound(_) => "player_not_found",
            SlotError::Storage(_) => "storage",
            SlotError::Parse(_) => "parse",
            SlotError::Overflow(_) => "overflow",
            SlotError::Io(_) => "io",
        }
    }

    /// Errors raised before any grid is generated
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            SlotError::Validation(_)
                | SlotError::InvalidConfig(_)
                | SlotError::InsufficientBalance { .. }
                | SlotError::PlayerNotFound(_)
        )
    }
}

/// Result type for slot operations
pub type SlotResult<T> = Result<T, SlotError>;
