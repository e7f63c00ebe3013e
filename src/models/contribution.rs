//! Capital contribution ("aporte") model.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ContributionId, InvestorId};

/// Capital injected by one investor on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contribution {
    /// Unique identifier.
    pub id: ContributionId,
    /// Contributing investor.
    pub investor_id: InvestorId,
    /// Contributed amount (> 0).
    pub amount: Decimal,
    /// Date the money came in.
    pub date: NaiveDate,
    /// Free-form note.
    #[serde(default)]
    pub description: String,
}
