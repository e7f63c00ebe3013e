//! Investor model.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::InvestorId;

/// A person contributing capital and sharing expenses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Investor {
    /// Unique identifier.
    pub id: InvestorId,
    /// Display name.
    pub name: String,
    /// Contact e-mail.
    pub email: String,
    /// Whether the investor takes part in new expense splits.
    pub active: bool,
    /// Running balance maintained outside this crate.
    pub current_balance: Decimal,
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn deserialize_investor() {
        let json = r#"{
            "id": "inv-1",
            "name": "Ana Souza",
            "email": "ana@example.com",
            "active": true,
            "currentBalance": "1500.25"
        }"#;
        let investor: Investor = serde_json::from_str(json).unwrap();
        assert_eq!(investor.id, InvestorId::from("inv-1"));
        assert!(investor.active);
        assert_eq!(investor.current_balance, dec!(1500.25));
    }

    #[test]
    fn serialize_roundtrip() {
        let investor = Investor {
            id: InvestorId::from("inv-2"),
            name: "Bruno".to_owned(),
            email: "bruno@example.com".to_owned(),
            active: false,
            current_balance: dec!(0),
        };
        let json = serde_json::to_string(&investor).unwrap();
        assert!(json.contains("currentBalance"));
        let deserialized: Investor = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, investor);
    }
}
