//! Shared expense model.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{CardId, CategoryId, ExpenseId, ExpenseKind, ExpenseStatus, InvestorId, PaymentMethod};

/// One investor's part of a shared expense.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestorShare {
    /// Investor bearing this part.
    pub investor_id: InvestorId,
    /// Amount allocated to the investor.
    pub amount: Decimal,
}

/// A shared cost item, optionally split among investors and optionally
/// charged to a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// Unique identifier.
    pub id: ExpenseId,
    /// Short description shown in lists and the calendar.
    pub description: String,
    /// Where the expense came from (payee, supplier).
    #[serde(default)]
    pub source: String,
    /// Category used for grouping.
    pub category_id: CategoryId,
    /// Total amount (> 0).
    pub amount: Decimal,
    /// Date of purchase.
    pub purchase_date: NaiveDate,
    /// Date the payment is due; drives period bucketing.
    pub due_date: NaiveDate,
    /// How the expense is paid.
    pub payment: PaymentMethod,
    /// Whether the expense has been paid.
    pub status: ExpenseStatus,
    /// Single, recurring or instalment expense.
    pub kind: ExpenseKind,
    /// Per-investor allocation; sums to `amount` when populated.
    #[serde(default)]
    pub investor_split: Vec<InvestorShare>,
}

impl Expense {
    /// Returns `true` if the expense has been paid.
    #[inline]
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.status == ExpenseStatus::Paid
    }

    /// Returns `true` if the expense is charged to the given card.
    #[inline]
    #[must_use]
    pub fn is_charged_to(&self, card: &CardId) -> bool {
        self.payment.card_id() == Some(card)
    }

    /// Distinct investors taking part in the split, in split order.
    #[must_use]
    pub fn participants(&self) -> Vec<&InvestorId> {
        let mut seen: Vec<&InvestorId> = Vec::with_capacity(self.investor_split.len());
        for share in &self.investor_split {
            if !seen.contains(&&share.investor_id) {
                seen.push(&share.investor_id);
            }
        }
        seen
    }

    /// Total allocated to `investor` by this expense's split.
    #[must_use]
    pub fn share_of(&self, investor: &InvestorId) -> Decimal {
        self.investor_split
            .iter()
            .filter(|share| share.investor_id == *investor)
            .map(|share| share.amount)
            .sum()
    }

    /// Instalment marker such as `3/10`, for instalment expenses only.
    #[must_use]
    pub fn installment_label(&self) -> Option<String> {
        match self.kind {
            ExpenseKind::Installment {
                current_installment,
                total_installments,
            } => Some(format!("{current_installment}/{total_installments}")),
            ExpenseKind::Single | ExpenseKind::Recurring { .. } => None,
        }
    }

    /// Due date of the next occurrence of a recurring expense.
    ///
    /// Returns `None` for non-recurring expenses or when the date would
    /// overflow the calendar.
    #[must_use]
    pub fn next_due_date(&self) -> Option<NaiveDate> {
        match self.kind {
            ExpenseKind::Recurring { frequency } => {
                crate::dates::add_months(self.due_date, frequency.months())
            }
            ExpenseKind::Single | ExpenseKind::Installment { .. } => None,
        }
    }
}
