//! In-memory storage backend.
//!
//! Provides [`InMemoryStorage`], a thread-safe implementation of both
//! storage traits for tests and for embedding the ledger without touching
//! the filesystem.

use core::hash::Hash;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

#[cfg(feature = "async")]
use core::future::{self, Future};

use crate::error::{RateioError, Result};
use crate::models::{
    Card, CardId, Category, CategoryId, Contribution, ContributionId, Expense, ExpenseId,
    Investor, InvestorId,
};

/// Thread-safe in-memory storage.
///
/// Implements [`super::Storage`] (async) and [`super::BlockingStorage`]
/// (blocking).
///
/// # Upsert semantics
///
/// Items with an existing ID are replaced in place; new items are appended
/// in the order given, so collections keep their insertion order.
///
/// # Example
///
/// ```rust
/// use rateio_rs::storage::InMemoryStorage;
///
/// let storage = InMemoryStorage::new();
/// // LedgerBlocking::builder().storage(storage).build()
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    /// All state behind a single mutex.
    inner: Mutex<Inner>,
}

/// Inner mutable state.
#[derive(Debug, Default)]
struct Inner {
    /// Stored investors.
    investors: Vec<Investor>,
    /// Stored categories.
    categories: Vec<Category>,
    /// Stored cards.
    cards: Vec<Card>,
    /// Stored expenses.
    expenses: Vec<Expense>,
    /// Stored contributions.
    contributions: Vec<Contribution>,
}

impl InMemoryStorage {
    /// Creates an empty storage.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the inner lock and applies a closure.
    fn with_lock<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> Result<R> {
        let mut inner = self.inner.lock().map_err(|err| lock_error(&err))?;
        Ok(f(&mut inner))
    }
}

/// Merges `new_items` into `existing` by key, keeping insertion order.
pub(super) fn upsert_by_key<T, K>(existing: &mut Vec<T>, new_items: Vec<T>, key_fn: fn(&T) -> K)
where
    K: Hash + Eq,
{
    let mut positions: HashMap<K, usize> = existing
        .iter()
        .enumerate()
        .map(|(idx, item)| (key_fn(item), idx))
        .collect();
    for item in new_items {
        let key = key_fn(&item);
        match positions.get(&key).and_then(|&idx| existing.get_mut(idx)) {
            Some(slot) => *slot = item,
            None => {
                let _old = positions.insert(key, existing.len());
                existing.push(item);
            }
        }
    }
}

/// Removes items whose key is in `ids`.
pub(super) fn remove_by_key<T, K>(existing: &mut Vec<T>, ids: &[K], key_fn: fn(&T) -> K)
where
    K: Hash + Eq,
{
    let id_set: HashSet<&K> = ids.iter().collect();
    existing.retain(|item| !id_set.contains(&key_fn(item)));
}

/// Wraps a mutex poison error.
fn lock_error<T>(err: &std::sync::PoisonError<T>) -> RateioError {
    RateioError::Storage(err.to_string().into())
}

#[cfg(feature = "blocking")]
impl super::BlockingStorage for InMemoryStorage {
    #[inline]
    fn investors(&self) -> Result<Vec<Investor>> {
        self.with_lock(|inner| inner.investors.clone())
    }

    #[inline]
    fn categories(&self) -> Result<Vec<Category>> {
        self.with_lock(|inner| inner.categories.clone())
    }

    #[inline]
    fn cards(&self) -> Result<Vec<Card>> {
        self.with_lock(|inner| inner.cards.clone())
    }

    #[inline]
    fn expenses(&self) -> Result<Vec<Expense>> {
        self.with_lock(|inner| inner.expenses.clone())
    }

    #[inline]
    fn contributions(&self) -> Result<Vec<Contribution>> {
        self.with_lock(|inner| inner.contributions.clone())
    }

    #[inline]
    fn upsert_investors(&self, items: Vec<Investor>) -> Result<()> {
        self.with_lock(|inner| upsert_by_key(&mut inner.investors, items, |i| i.id.clone()))
    }

    #[inline]
    fn upsert_categories(&self, items: Vec<Category>) -> Result<()> {
        self.with_lock(|inner| upsert_by_key(&mut inner.categories, items, |c| c.id.clone()))
    }

    #[inline]
    fn upsert_cards(&self, items: Vec<Card>) -> Result<()> {
        self.with_lock(|inner| upsert_by_key(&mut inner.cards, items, |c| c.id.clone()))
    }

    #[inline]
    fn upsert_expenses(&self, items: Vec<Expense>) -> Result<()> {
        self.with_lock(|inner| upsert_by_key(&mut inner.expenses, items, |e| e.id.clone()))
    }

    #[inline]
    fn upsert_contributions(&self, items: Vec<Contribution>) -> Result<()> {
        self.with_lock(|inner| upsert_by_key(&mut inner.contributions, items, |c| c.id.clone()))
    }

    #[inline]
    fn remove_investors(&self, ids: &[InvestorId]) -> Result<()> {
        self.with_lock(|inner| remove_by_key(&mut inner.investors, ids, |i| i.id.clone()))
    }

    #[inline]
    fn remove_categories(&self, ids: &[CategoryId]) -> Result<()> {
        self.with_lock(|inner| remove_by_key(&mut inner.categories, ids, |c| c.id.clone()))
    }

    #[inline]
    fn remove_cards(&self, ids: &[CardId]) -> Result<()> {
        self.with_lock(|inner| remove_by_key(&mut inner.cards, ids, |c| c.id.clone()))
    }

    #[inline]
    fn remove_expenses(&self, ids: &[ExpenseId]) -> Result<()> {
        self.with_lock(|inner| remove_by_key(&mut inner.expenses, ids, |e| e.id.clone()))
    }

    #[inline]
    fn remove_contributions(&self, ids: &[ContributionId]) -> Result<()> {
        self.with_lock(|inner| remove_by_key(&mut inner.contributions, ids, |c| c.id.clone()))
    }

    #[inline]
    fn clear(&self) -> Result<()> {
        self.with_lock(|inner| *inner = Inner::default())
    }
}

#[cfg(feature = "async")]
impl super::Storage for InMemoryStorage {
    #[inline]
    fn investors(&self) -> impl Future<Output = Result<Vec<Investor>>> + Send {
        future::ready(self.with_lock(|inner| inner.investors.clone()))
    }

    #[inline]
    fn categories(&self) -> impl Future<Output = Result<Vec<Category>>> + Send {
        future::ready(self.with_lock(|inner| inner.categories.clone()))
    }

    #[inline]
    fn cards(&self) -> impl Future<Output = Result<Vec<Card>>> + Send {
        future::ready(self.with_lock(|inner| inner.cards.clone()))
    }

    #[inline]
    fn expenses(&self) -> impl Future<Output = Result<Vec<Expense>>> + Send {
        future::ready(self.with_lock(|inner| inner.expenses.clone()))
    }

    #[inline]
    fn contributions(&self) -> impl Future<Output = Result<Vec<Contribution>>> + Send {
        future::ready(self.with_lock(|inner| inner.contributions.clone()))
    }

    #[inline]
    fn upsert_investors(&self, items: Vec<Investor>) -> impl Future<Output = Result<()>> + Send {
        future::ready(
            self.with_lock(|inner| upsert_by_key(&mut inner.investors, items, |i| i.id.clone())),
        )
    }

    #[inline]
    fn upsert_categories(&self, items: Vec<Category>) -> impl Future<Output = Result<()>> + Send {
        future::ready(
            self.with_lock(|inner| upsert_by_key(&mut inner.categories, items, |c| c.id.clone())),
        )
    }

    #[inline]
    fn upsert_cards(&self, items: Vec<Card>) -> impl Future<Output = Result<()>> + Send {
        future::ready(
            self.with_lock(|inner| upsert_by_key(&mut inner.cards, items, |c| c.id.clone())),
        )
    }

    #[inline]
    fn upsert_expenses(&self, items: Vec<Expense>) -> impl Future<Output = Result<()>> + Send {
        future::ready(
            self.with_lock(|inner| upsert_by_key(&mut inner.expenses, items, |e| e.id.clone())),
        )
    }

    #[inline]
    fn upsert_contributions(
        &self,
        items: Vec<Contribution>,
    ) -> impl Future<Output = Result<()>> + Send {
        future::ready(self.with_lock(|inner| {
            upsert_by_key(&mut inner.contributions, items, |c| c.id.clone());
        }))
    }

    #[inline]
    fn remove_investors(&self, ids: &[InvestorId]) -> impl Future<Output = Result<()>> + Send {
        future::ready(
            self.with_lock(|inner| remove_by_key(&mut inner.investors, ids, |i| i.id.clone())),
        )
    }

    #[inline]
    fn remove_categories(&self, ids: &[CategoryId]) -> impl Future<Output = Result<()>> + Send {
        future::ready(
            self.with_lock(|inner| remove_by_key(&mut inner.categories, ids, |c| c.id.clone())),
        )
    }

    #[inline]
    fn remove_cards(&self, ids: &[CardId]) -> impl Future<Output = Result<()>> + Send {
        future::ready(
            self.with_lock(|inner| remove_by_key(&mut inner.cards, ids, |c| c.id.clone())),
        )
    }

    #[inline]
    fn remove_expenses(&self, ids: &[ExpenseId]) -> impl Future<Output = Result<()>> + Send {
        future::ready(
            self.with_lock(|inner| remove_by_key(&mut inner.expenses, ids, |e| e.id.clone())),
        )
    }

    #[inline]
    fn remove_contributions(
        &self,
        ids: &[ContributionId],
    ) -> impl Future<Output = Result<()>> + Send {
        future::ready(self.with_lock(|inner| {
            remove_by_key(&mut inner.contributions, ids, |c| c.id.clone());
        }))
    }

    #[inline]
    fn clear(&self) -> impl Future<Output = Result<()>> + Send {
        future::ready(self.with_lock(|inner| *inner = Inner::default()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{CategoryKind, ExpenseKind, ExpenseStatus, PaymentMethod};

    fn test_investor(id: &str) -> Investor {
        Investor {
            id: InvestorId::from(id),
            name: format!("Investor {id}"),
            email: format!("{id}@example.com"),
            active: true,
            current_balance: Decimal::ZERO,
        }
    }

    fn test_category(id: &str) -> Category {
        Category {
            id: CategoryId::from(id),
            name: format!("Category {id}"),
            color: "#ff0000".to_owned(),
            icon: "tag".to_owned(),
            kind: CategoryKind::Expense,
        }
    }

    fn test_card(id: &str) -> Card {
        Card {
            id: CardId::from(id),
            name: format!("Card {id}"),
            brand: "Visa".to_owned(),
            credit_limit: dec!(1000.00),
            closing_day: 5,
            due_day: 15,
            owner_investor_id: InvestorId::from("i-1"),
        }
    }

    fn test_expense(id: &str, amount: Decimal) -> Expense {
        let day = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        Expense {
            id: ExpenseId::from(id),
            description: format!("Expense {id}"),
            source: String::new(),
            category_id: CategoryId::from("c-1"),
            amount,
            purchase_date: day,
            due_date: day,
            payment: PaymentMethod::Cash,
            status: ExpenseStatus::Pending,
            kind: ExpenseKind::Single,
            investor_split: Vec::new(),
        }
    }

    fn test_contribution(id: &str) -> Contribution {
        Contribution {
            id: ContributionId::from(id),
            investor_id: InvestorId::from("i-1"),
            amount: dec!(250.00),
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            description: String::new(),
        }
    }

    #[test]
    fn upsert_replaces_in_place_and_appends() {
        let mut items = vec![
            test_expense("e-1", dec!(1)),
            test_expense("e-2", dec!(2)),
        ];
        upsert_by_key(
            &mut items,
            vec![test_expense("e-3", dec!(3)), test_expense("e-1", dec!(10))],
            |e| e.id.clone(),
        );
        let view: Vec<(&str, Decimal)> = items
            .iter()
            .map(|e| (e.id.as_inner(), e.amount))
            .collect();
        assert_eq!(
            view,
            vec![("e-1", dec!(10)), ("e-2", dec!(2)), ("e-3", dec!(3))]
        );
    }

    #[test]
    fn remove_ignores_unknown_ids() {
        let mut items = vec![test_investor("i-1"), test_investor("i-2")];
        remove_by_key(
            &mut items,
            &[InvestorId::from("i-2"), InvestorId::from("nope")],
            |i| i.id.clone(),
        );
        assert_eq!(items.len(), 1);
    }

    #[cfg(feature = "blocking")]
    mod blocking_tests {
        use super::*;
        use crate::storage::BlockingStorage;

        #[test]
        fn upsert_and_read_investors_in_order() {
            let s = InMemoryStorage::new();
            s.upsert_investors(vec![test_investor("i-2"), test_investor("i-1")])
                .unwrap();
            let ids: Vec<String> = s
                .investors()
                .unwrap()
                .into_iter()
                .map(|i| i.id.into_inner())
                .collect();
            assert_eq!(ids, vec!["i-2", "i-1"]);
        }

        #[test]
        fn upsert_and_remove_categories() {
            let s = InMemoryStorage::new();
            s.upsert_categories(vec![test_category("c-1")]).unwrap();
            assert_eq!(s.categories().unwrap().len(), 1);
            s.remove_categories(&[CategoryId::from("c-1")]).unwrap();
            assert!(s.categories().unwrap().is_empty());
        }

        #[test]
        fn upsert_and_remove_cards() {
            let s = InMemoryStorage::new();
            s.upsert_cards(vec![test_card("k-1"), test_card("k-2")])
                .unwrap();
            s.remove_cards(&[CardId::from("k-1")]).unwrap();
            let cards = s.cards().unwrap();
            assert_eq!(cards.len(), 1);
            assert_eq!(cards.first().unwrap().id, CardId::from("k-2"));
        }

        #[test]
        fn upsert_replaces_expense() {
            let s = InMemoryStorage::new();
            s.upsert_expenses(vec![test_expense("e-1", dec!(10.00))])
                .unwrap();
            s.upsert_expenses(vec![test_expense("e-1", dec!(12.50))])
                .unwrap();
            let expenses = s.expenses().unwrap();
            assert_eq!(expenses.len(), 1);
            assert_eq!(expenses.first().unwrap().amount, dec!(12.50));
            s.remove_expenses(&[ExpenseId::from("e-1")]).unwrap();
            assert!(s.expenses().unwrap().is_empty());
        }

        #[test]
        fn clear_resets_everything() {
            let s = InMemoryStorage::new();
            s.upsert_investors(vec![test_investor("i-1")]).unwrap();
            s.upsert_contributions(vec![test_contribution("a-1")])
                .unwrap();
            s.upsert_cards(vec![test_card("k-1")]).unwrap();
            s.clear().unwrap();
            assert!(s.investors().unwrap().is_empty());
            assert!(s.contributions().unwrap().is_empty());
            assert!(s.cards().unwrap().is_empty());
        }
    }

    #[cfg(feature = "async")]
    mod async_tests {
        use super::*;
        use crate::storage::Storage;

        #[tokio::test]
        async fn upsert_and_read_investors() {
            let s = InMemoryStorage::new();
            s.upsert_investors(vec![test_investor("i-1"), test_investor("i-2")])
                .await
                .unwrap();
            assert_eq!(s.investors().await.unwrap().len(), 2);
        }

        #[tokio::test]
        async fn upsert_and_remove_contributions() {
            let s = InMemoryStorage::new();
            s.upsert_contributions(vec![test_contribution("a-1")])
                .await
                .unwrap();
            assert_eq!(s.contributions().await.unwrap().len(), 1);
            s.remove_contributions(&[ContributionId::from("a-1")])
                .await
                .unwrap();
            assert!(s.contributions().await.unwrap().is_empty());
        }

        #[tokio::test]
        async fn upsert_and_remove_expenses() {
            let s = InMemoryStorage::new();
            s.upsert_expenses(vec![test_expense("e-1", dec!(5.00))])
                .await
                .unwrap();
            s.remove_expenses(&[ExpenseId::from("e-1")]).await.unwrap();
            assert!(s.expenses().await.unwrap().is_empty());
        }

        #[tokio::test]
        async fn clear_resets_everything() {
            let s = InMemoryStorage::new();
            s.upsert_categories(vec![test_category("c-1")])
                .await
                .unwrap();
            s.upsert_cards(vec![test_card("k-1")]).await.unwrap();
            s.clear().await.unwrap();
            assert!(s.categories().await.unwrap().is_empty());
            assert!(s.cards().await.unwrap().is_empty());
        }
    }
}
