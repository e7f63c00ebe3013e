//! Data models for ledger entities.
//!
//! This module contains strongly-typed representations of investors,
//! categories, cards, expenses and contributions, newtype ID wrappers,
//! and enumeration types for constrained values.

mod card;
mod category;
mod contribution;
mod enums;
mod expense;
mod ids;
mod investor;

pub use card::Card;
pub use category::Category;
pub use chrono::NaiveDate;
pub use contribution::Contribution;
pub use enums::{
    CategoryKind, EventKind, EventStatus, ExpenseKind, ExpenseStatus, PaymentKind,
    PaymentMethod, RecurrenceFrequency,
};
pub use expense::{Expense, InvestorShare};
pub use ids::{CardId, CategoryId, ContributionId, ExpenseId, InvestorId};
pub use investor::Investor;
pub use rust_decimal::Decimal;
