//! Income/expense category model.

use serde::{Deserialize, Serialize};

use super::{CategoryId, CategoryKind};

/// A descriptive grouping for expenses or income.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Unique identifier.
    pub id: CategoryId,
    /// Display name.
    pub name: String,
    /// Display color (e.g. `#ff8800`).
    pub color: String,
    /// Icon identifier.
    pub icon: String,
    /// Whether the category groups income or expenses.
    pub kind: CategoryKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_category() {
        let json = r##"{
            "id": "cat-food",
            "name": "Alimentação",
            "color": "#22c55e",
            "icon": "utensils",
            "kind": "expense"
        }"##;
        let category: Category = serde_json::from_str(json).unwrap();
        assert_eq!(category.id, CategoryId::from("cat-food"));
        assert_eq!(category.kind, CategoryKind::Expense);
        assert_eq!(category.icon, "utensils");
    }
}
