//! Shared-expense ledger core for a group of investors.
//!
//! Splits expenses evenly among active investors, tracks credit card
//! utilization, aggregates a calendar month into totals and a daily
//! running balance, and projects expenses and contributions onto a
//! calendar. The derivation modules ([`split`], [`card`], [`aggregate`],
//! [`calendar`]) are pure functions over slices; [`ledger`] binds them to
//! a [`storage`] backend.

pub mod aggregate;
pub mod calendar;
pub mod card;
pub mod dates;
pub mod error;
pub mod ledger;
pub mod models;
pub mod money;
pub mod split;
pub mod storage;
