//! Enumeration types for constrained ledger values.

use serde::{Deserialize, Serialize};

use super::CardId;

/// Whether a category groups income or expenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CategoryKind {
    /// Money coming in.
    Income,
    /// Money going out.
    Expense,
}

/// How an expense was paid.
///
/// The card reference only exists for card payments, so an expense can
/// never carry a dangling `card_id` next to a cash or transfer payment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(
    tag = "method",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum PaymentMethod {
    /// Paid in cash.
    Cash,
    /// Paid by bank transfer.
    Transfer,
    /// Charged to a credit card.
    Card {
        /// Card the expense was charged to.
        card_id: CardId,
    },
}

impl PaymentMethod {
    /// Returns the card this payment was charged to, if any.
    #[inline]
    #[must_use]
    pub const fn card_id(&self) -> Option<&CardId> {
        match *self {
            Self::Card { ref card_id } => Some(card_id),
            Self::Cash | Self::Transfer => None,
        }
    }

    /// Returns `true` for card payments.
    #[inline]
    #[must_use]
    pub const fn is_card(&self) -> bool {
        matches!(*self, Self::Card { .. })
    }

    /// The payment method without its card reference.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> PaymentKind {
        match *self {
            Self::Cash => PaymentKind::Cash,
            Self::Transfer => PaymentKind::Transfer,
            Self::Card { .. } => PaymentKind::Card,
        }
    }
}

/// Payment method discriminant, used for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaymentKind {
    /// Cash payment.
    Cash,
    /// Bank transfer.
    Transfer,
    /// Any card.
    Card,
}

/// Settlement state of an expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExpenseStatus {
    /// Not yet paid.
    Pending,
    /// Already paid.
    Paid,
}

/// Repetition interval of a recurring expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecurrenceFrequency {
    /// Every month.
    Monthly,
    /// Every three months.
    Quarterly,
    /// Every six months.
    Semiannual,
    /// Every twelve months.
    Annual,
}

impl RecurrenceFrequency {
    /// Number of calendar months between two occurrences.
    #[inline]
    #[must_use]
    pub const fn months(self) -> u32 {
        match self {
            Self::Monthly => 1,
            Self::Quarterly => 3,
            Self::Semiannual => 6,
            Self::Annual => 12,
        }
    }
}

/// Shape of an expense over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ExpenseKind {
    /// One-off expense.
    Single,
    /// Expense repeating on a fixed frequency.
    Recurring {
        /// How often the expense repeats.
        frequency: RecurrenceFrequency,
    },
    /// One instalment of a purchase paid in parts.
    Installment {
        /// Position of this instalment (1-based).
        current_installment: u32,
        /// Total number of instalments.
        total_installments: u32,
    },
}

/// Origin of a calendar event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    /// Projected from an expense.
    Expense,
    /// Projected from a contribution.
    Contribution,
}

/// Display status of a calendar event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventStatus {
    /// Expense not yet paid.
    Pending,
    /// Expense already paid.
    Paid,
    /// Contribution received.
    Confirmed,
}

impl From<ExpenseStatus> for EventStatus {
    #[inline]
    fn from(status: ExpenseStatus) -> Self {
        match status {
            ExpenseStatus::Pending => Self::Pending,
            ExpenseStatus::Paid => Self::Paid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_method_serde_card() {
        let method = PaymentMethod::Card {
            card_id: CardId::from("c-1"),
        };
        let json = serde_json::to_string(&method).unwrap();
        assert_eq!(json, r#"{"method":"card","cardId":"c-1"}"#);
        let deserialized: PaymentMethod = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, method);
    }

    #[test]
    fn payment_method_serde_cash() {
        let json = serde_json::to_string(&PaymentMethod::Cash).unwrap();
        assert_eq!(json, r#"{"method":"cash"}"#);
        let deserialized: PaymentMethod =
            serde_json::from_str(r#"{"method":"transfer"}"#).unwrap();
        assert_eq!(deserialized, PaymentMethod::Transfer);
    }

    #[test]
    fn payment_kind_drops_card_reference() {
        let method = PaymentMethod::Card {
            card_id: CardId::from("c-9"),
        };
        assert_eq!(method.kind(), PaymentKind::Card);
        assert_eq!(PaymentMethod::Cash.kind(), PaymentKind::Cash);
        assert_eq!(PaymentMethod::Transfer.kind(), PaymentKind::Transfer);
    }

    #[test]
    fn card_payment_without_card_id_fails() {
        let result = serde_json::from_str::<PaymentMethod>(r#"{"method":"card"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn payment_method_card_accessor() {
        let card = PaymentMethod::Card {
            card_id: CardId::from("c-9"),
        };
        assert_eq!(card.card_id(), Some(&CardId::from("c-9")));
        assert!(card.is_card());
        assert_eq!(PaymentMethod::Cash.card_id(), None);
        assert!(!PaymentMethod::Transfer.is_card());
    }

    #[test]
    fn expense_kind_serde_installment() {
        let kind = ExpenseKind::Installment {
            current_installment: 3,
            total_installments: 10,
        };
        let json = serde_json::to_string(&kind).unwrap();
        assert_eq!(
            json,
            r#"{"type":"installment","currentInstallment":3,"totalInstallments":10}"#
        );
        let deserialized: ExpenseKind = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, kind);
    }

    #[test]
    fn expense_kind_serde_recurring() {
        let kind: ExpenseKind =
            serde_json::from_str(r#"{"type":"recurring","frequency":"semiannual"}"#).unwrap();
        assert_eq!(
            kind,
            ExpenseKind::Recurring {
                frequency: RecurrenceFrequency::Semiannual
            }
        );
    }

    #[test]
    fn recurrence_months() {
        let variants = [
            (RecurrenceFrequency::Monthly, 1),
            (RecurrenceFrequency::Quarterly, 3),
            (RecurrenceFrequency::Semiannual, 6),
            (RecurrenceFrequency::Annual, 12),
        ];
        for (variant, months) in variants {
            assert_eq!(variant.months(), months);
        }
    }

    #[test]
    fn expense_status_serde_roundtrip() {
        let variants = [
            (ExpenseStatus::Pending, r#""pending""#),
            (ExpenseStatus::Paid, r#""paid""#),
        ];
        for (variant, expected_json) in variants {
            let json = serde_json::to_string(&variant).unwrap();
            assert_eq!(json, expected_json);
        }
    }

    #[test]
    fn event_status_from_expense_status() {
        assert_eq!(EventStatus::from(ExpenseStatus::Paid), EventStatus::Paid);
        assert_eq!(
            EventStatus::from(ExpenseStatus::Pending),
            EventStatus::Pending
        );
    }

    #[test]
    fn invalid_category_kind_fails() {
        let result = serde_json::from_str::<CategoryKind>(r#""transfer""#);
        assert!(result.is_err());
    }
}
