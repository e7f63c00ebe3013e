//! Credit card model.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{CardId, InvestorId};

/// A credit card used to pay shared expenses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// Unique identifier.
    pub id: CardId,
    /// Display name.
    pub name: String,
    /// Card network/brand (e.g. "Visa").
    pub brand: String,
    /// Credit limit (>= 0).
    pub credit_limit: Decimal,
    /// Day of month the statement closes (1..=31).
    pub closing_day: u8,
    /// Day of month the statement is due (1..=31).
    pub due_day: u8,
    /// Investor holding the card.
    pub owner_investor_id: InvestorId,
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn deserialize_card() {
        let json = r#"{
            "id": "card-nu",
            "name": "Nubank",
            "brand": "Mastercard",
            "creditLimit": "5000.00",
            "closingDay": 3,
            "dueDay": 10,
            "ownerInvestorId": "inv-1"
        }"#;
        let card: Card = serde_json::from_str(json).unwrap();
        assert_eq!(card.credit_limit, dec!(5000.00));
        assert_eq!(card.closing_day, 3);
        assert_eq!(card.due_day, 10);
        assert_eq!(card.owner_investor_id, InvestorId::from("inv-1"));
    }
}
