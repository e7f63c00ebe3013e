//! Error types for the rateio library.

use rust_decimal::Decimal;

use crate::models::CardId;

/// All errors that can occur when deriving figures or accessing storage.
#[derive(Debug, thiserror::Error)]
pub enum RateioError {
    /// No active investor exists to receive a share of an expense.
    #[error("no active investors to split the expense among")]
    NoActiveInvestors,

    /// A card carries a negative credit limit.
    #[error("card {card} has an invalid credit limit: {limit}")]
    InvalidLimit {
        /// Offending card.
        card: CardId,
        /// The negative limit found on the card.
        limit: Decimal,
    },

    /// A reference period is missing, unparseable or out of range.
    #[error("invalid period: {0}")]
    InvalidPeriod(String),

    /// A money amount is not positive or has sub-cent precision.
    #[error("invalid amount: {0}")]
    InvalidAmount(Decimal),

    /// A recorded investor split does not reconcile with its expense.
    #[error("invalid split: {0}")]
    InvalidSplit(String),

    /// A card has billing days outside the calendar range.
    #[error("invalid card: {0}")]
    InvalidCard(String),

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Storage backend failed.
    #[error("storage error: {0}")]
    Storage(Box<dyn core::error::Error + Send + Sync>),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, RateioError>;
