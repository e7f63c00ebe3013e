//! High-level ledger facade over a storage backend.
//!
//! [`Ledger`] (async) and [`LedgerBlocking`] load the raw collections from
//! a [`crate::storage::Storage`] / [`crate::storage::BlockingStorage`]
//! backend and run the pure derivations in [`crate::split`],
//! [`crate::card`], [`crate::aggregate`] and [`crate::calendar`] over them.
//! Writes go through validation before they reach storage.

use crate::models::{
    CardId, CategoryId, Expense, ExpenseStatus, InvestorId, NaiveDate, PaymentKind,
};

/// Composable filter for querying expenses from storage.
///
/// Every set criterion must hold for an expense to pass.
///
/// # Examples
///
/// ```
/// use rateio_rs::ledger::ExpenseFilter;
/// use rateio_rs::models::{CategoryId, ExpenseStatus, NaiveDate};
///
/// let filter = ExpenseFilter::new()
///     .due_between(
///         NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///         NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
///     )
///     .category(CategoryId::from("groceries"))
///     .status(ExpenseStatus::Pending);
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExpenseFilter {
    /// Earliest due date (inclusive).
    pub due_from: Option<NaiveDate>,
    /// Latest due date (inclusive).
    pub due_to: Option<NaiveDate>,
    /// Category ID.
    pub category: Option<CategoryId>,
    /// Card the expense is charged to.
    pub card: Option<CardId>,
    /// Payment status.
    pub status: Option<ExpenseStatus>,
    /// Payment method, ignoring the card reference.
    pub payment: Option<PaymentKind>,
    /// Investor taking part in the split.
    pub investor: Option<InvestorId>,
}

impl ExpenseFilter {
    /// Creates an empty filter that matches every expense.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to expenses due within `[from, to]`.
    #[inline]
    #[must_use]
    pub const fn due_between(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.due_from = Some(from);
        self.due_to = Some(to);
        self
    }

    /// Restricts to one category.
    #[inline]
    #[must_use]
    pub fn category(mut self, id: CategoryId) -> Self {
        self.category = Some(id);
        self
    }

    /// Restricts to expenses charged to one card.
    #[inline]
    #[must_use]
    pub fn card(mut self, id: CardId) -> Self {
        self.card = Some(id);
        self
    }

    /// Restricts to one payment status.
    #[inline]
    #[must_use]
    pub const fn status(mut self, status: ExpenseStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Restricts to one payment method.
    #[inline]
    #[must_use]
    pub const fn payment(mut self, kind: PaymentKind) -> Self {
        self.payment = Some(kind);
        self
    }

    /// Restricts to expenses whose split includes `id`.
    #[inline]
    #[must_use]
    pub fn investor(mut self, id: InvestorId) -> Self {
        self.investor = Some(id);
        self
    }

    /// Returns `true` if the expense satisfies all set criteria.
    #[inline]
    #[must_use]
    pub fn matches(&self, expense: &Expense) -> bool {
        self.matches_due(expense)
            && self
                .category
                .as_ref()
                .is_none_or(|id| expense.category_id == *id)
            && self.card.as_ref().is_none_or(|id| expense.is_charged_to(id))
            && self.status.is_none_or(|status| expense.status == status)
            && self
                .payment
                .is_none_or(|kind| expense.payment.kind() == kind)
            && self.investor.as_ref().is_none_or(|id| {
                expense
                    .investor_split
                    .iter()
                    .any(|share| share.investor_id == *id)
            })
    }

    /// Checks the due-date bounds.
    fn matches_due(&self, expense: &Expense) -> bool {
        self.due_from.is_none_or(|from| expense.due_date >= from)
            && self.due_to.is_none_or(|to| expense.due_date <= to)
    }
}

/// Generates a ledger facade (async or blocking).
macro_rules! define_ledger {
    (
        ledger_name: $ledger:ident,
        builder_name: $builder:ident,
        storage_trait: $storage_trait:ident,
        ledger_doc: $ledger_doc:expr,
        builder_doc: $builder_doc:expr,
        $(async_kw: $async_kw:tt,)?
        $(await_kw: $await_ext:tt,)?
    ) => {
        #[doc = $builder_doc]
        #[derive(Debug)]
        pub struct $builder<S: $storage_trait> {
            /// Storage backend.
            storage: Option<S>,
        }

        impl<S: $storage_trait> $builder<S> {
            /// Sets the storage backend.
            #[inline]
            #[must_use]
            pub fn storage(mut self, storage: S) -> Self {
                self.storage = Some(storage);
                self
            }

            /// Builds the ledger.
            ///
            /// # Errors
            ///
            /// Returns [`RateioError::Storage`] if no storage was provided.
            #[inline]
            pub fn build(self) -> Result<$ledger<S>> {
                let storage = self.storage.ok_or_else(|| {
                    RateioError::Storage("storage backend is required".into())
                })?;
                Ok($ledger { storage })
            }
        }

        #[doc = $ledger_doc]
        #[derive(Debug)]
        pub struct $ledger<S: $storage_trait> {
            /// Storage backend.
            storage: S,
        }

        impl<S: $storage_trait> $ledger<S> {
            /// Creates a new builder.
            #[inline]
            #[must_use]
            pub const fn builder() -> $builder<S> {
                $builder { storage: None }
            }

            /// Returns a reference to the storage backend.
            #[inline]
            #[must_use]
            pub const fn storage(&self) -> &S {
                &self.storage
            }

            /// Returns all investors.
            ///
            /// # Errors
            ///
            /// Returns an error if the storage backend fails to read.
            #[inline]
            pub $($async_kw)? fn investors(&self) -> Result<Vec<Investor>> {
                self.storage.investors() $( .$await_ext )?
            }

            /// Returns all categories.
            ///
            /// # Errors
            ///
            /// Returns an error if the storage backend fails to read.
            #[inline]
            pub $($async_kw)? fn categories(&self) -> Result<Vec<Category>> {
                self.storage.categories() $( .$await_ext )?
            }

            /// Returns all cards.
            ///
            /// # Errors
            ///
            /// Returns an error if the storage backend fails to read.
            #[inline]
            pub $($async_kw)? fn cards(&self) -> Result<Vec<Card>> {
                self.storage.cards() $( .$await_ext )?
            }

            /// Returns all expenses.
            ///
            /// # Errors
            ///
            /// Returns an error if the storage backend fails to read.
            #[inline]
            pub $($async_kw)? fn expenses(&self) -> Result<Vec<Expense>> {
                self.storage.expenses() $( .$await_ext )?
            }

            /// Returns all contributions.
            ///
            /// # Errors
            ///
            /// Returns an error if the storage backend fails to read.
            #[inline]
            pub $($async_kw)? fn contributions(&self) -> Result<Vec<Contribution>> {
                self.storage.contributions() $( .$await_ext )?
            }

            /// Returns investors currently taking part in new splits.
            ///
            /// # Errors
            ///
            /// Returns an error if the storage backend fails to read.
            pub $($async_kw)? fn active_investors(&self) -> Result<Vec<Investor>> {
                let all = self.storage.investors() $( .$await_ext )? ?;
                Ok(all.into_iter().filter(|inv| inv.active).collect())
            }

            /// Returns expenses matching `filter`.
            ///
            /// # Errors
            ///
            /// Returns an error if the storage backend fails to read.
            pub $($async_kw)? fn filter_expenses(
                &self,
                filter: &ExpenseFilter,
            ) -> Result<Vec<Expense>> {
                let all = self.storage.expenses() $( .$await_ext )? ?;
                Ok(all.into_iter().filter(|exp| filter.matches(exp)).collect())
            }

            /// Splits `amount` evenly among the active investors.
            ///
            /// # Errors
            ///
            /// Returns [`RateioError::NoActiveInvestors`] or
            /// [`RateioError::InvalidAmount`] from the split, or a storage
            /// error.
            pub $($async_kw)? fn split_amount(&self, amount: Decimal) -> Result<Vec<InvestorShare>> {
                let investors = self.storage.investors() $( .$await_ext )? ?;
                split_expense(amount, &investors)
            }

            /// Stores investors (insert or replace by ID).
            ///
            /// # Errors
            ///
            /// Returns an error if the storage backend fails to write.
            #[inline]
            pub $($async_kw)? fn save_investors(&self, investors: Vec<Investor>) -> Result<()> {
                self.storage.upsert_investors(investors) $( .$await_ext )?
            }

            /// Stores categories (insert or replace by ID).
            ///
            /// # Errors
            ///
            /// Returns an error if the storage backend fails to write.
            #[inline]
            pub $($async_kw)? fn save_categories(&self, categories: Vec<Category>) -> Result<()> {
                self.storage.upsert_categories(categories) $( .$await_ext )?
            }

            /// Validates and stores cards (insert or replace by ID).
            ///
            /// # Errors
            ///
            /// Returns [`RateioError::InvalidLimit`] or
            /// [`RateioError::InvalidCard`] for the first invalid card, or a
            /// storage error.
            pub $($async_kw)? fn save_cards(&self, cards: Vec<Card>) -> Result<()> {
                for item in &cards {
                    card::validate_card(item)?;
                }
                self.storage.upsert_cards(cards) $( .$await_ext )?
            }

            /// Validates and stores an expense, returning what was stored.
            ///
            /// An expense without a split is split evenly among the active
            /// investors first.
            ///
            /// # Errors
            ///
            /// - [`RateioError::InvalidAmount`] if the amount is not a
            ///   positive whole number of cents;
            /// - [`RateioError::InvalidCard`] if it is charged to an unknown
            ///   card;
            /// - [`RateioError::NoActiveInvestors`] if it needs a split and
            ///   nobody is active;
            /// - [`RateioError::InvalidSplit`] if a given split does not
            ///   reconcile with the amount.
            #[tracing::instrument(skip_all, fields(expense = %expense.id))]
            pub $($async_kw)? fn record_expense(&self, mut expense: Expense) -> Result<Expense> {
                if expense.amount <= Decimal::ZERO {
                    return Err(RateioError::InvalidAmount(expense.amount));
                }
                let _cents = to_cents(expense.amount)?;
                if let Some(card_id) = expense.payment.card_id() {
                    let cards = self.storage.cards() $( .$await_ext )? ?;
                    if !cards.iter().any(|known| known.id == *card_id) {
                        return Err(RateioError::InvalidCard(format!("unknown card {card_id}")));
                    }
                }
                if expense.investor_split.is_empty() {
                    let investors = self.storage.investors() $( .$await_ext )? ?;
                    expense.investor_split = split_expense(expense.amount, &investors)?;
                    tracing::debug!(
                        shares = expense.investor_split.len(),
                        "split expense among active investors"
                    );
                }
                validate_split(expense.amount, &expense.investor_split)?;
                self.storage.upsert_expenses(vec![expense.clone()]) $( .$await_ext )? ?;
                tracing::debug!(amount = %expense.amount, "expense recorded");
                Ok(expense)
            }

            /// Validates and stores a contribution.
            ///
            /// # Errors
            ///
            /// Returns [`RateioError::InvalidAmount`] if the amount is not a
            /// positive whole number of cents, or a storage error.
            #[tracing::instrument(skip_all, fields(contribution = %contribution.id))]
            pub $($async_kw)? fn record_contribution(&self, contribution: Contribution) -> Result<()> {
                if contribution.amount <= Decimal::ZERO {
                    return Err(RateioError::InvalidAmount(contribution.amount));
                }
                let _cents = to_cents(contribution.amount)?;
                let investors = self.storage.investors() $( .$await_ext )? ?;
                if !investors.iter().any(|inv| inv.id == contribution.investor_id) {
                    tracing::warn!(
                        investor = %contribution.investor_id,
                        "contribution from unknown investor"
                    );
                }
                self.storage.upsert_contributions(vec![contribution]) $( .$await_ext )? ?;
                tracing::debug!("contribution recorded");
                Ok(())
            }

            /// Deletes expenses by ID. Unknown IDs are ignored.
            ///
            /// # Errors
            ///
            /// Returns an error if the storage backend fails to write.
            #[inline]
            pub $($async_kw)? fn delete_expenses(&self, ids: &[ExpenseId]) -> Result<()> {
                self.storage.remove_expenses(ids) $( .$await_ext )?
            }

            /// Utilization of one card.
            ///
            /// # Errors
            ///
            /// Returns [`RateioError::InvalidCard`] if the card does not
            /// exist, [`RateioError::InvalidLimit`] for a negative limit, or
            /// a storage error.
            pub $($async_kw)? fn card_utilization(&self, id: &CardId) -> Result<CardUtilization> {
                let found = self.find_card(id) $( .$await_ext )? ?;
                let expenses = self.storage.expenses() $( .$await_ext )? ?;
                card::card_utilization(&found, &expenses)
            }

            /// Per-cycle invoice totals of one card.
            ///
            /// # Errors
            ///
            /// Returns [`RateioError::InvalidCard`] if the card does not
            /// exist or has invalid billing days, or a storage error.
            pub $($async_kw)? fn invoices(&self, id: &CardId) -> Result<Vec<InvoiceTotal>> {
                let found = self.find_card(id) $( .$await_ext )? ?;
                let expenses = self.storage.expenses() $( .$await_ext )? ?;
                card::invoice_totals(&found, &expenses)
            }

            /// Utilization across every card.
            ///
            /// # Errors
            ///
            /// Returns [`RateioError::InvalidLimit`] if a card has a negative
            /// limit, or a storage error.
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn portfolio(&self) -> Result<PortfolioUtilization> {
                let cards = self.storage.cards() $( .$await_ext )? ?;
                let expenses = self.storage.expenses() $( .$await_ext )? ?;
                tracing::debug!(cards = cards.len(), expenses = expenses.len(), "computing portfolio");
                card::portfolio_utilization(&cards, &expenses)
            }

            /// Summary of the calendar month containing `reference`.
            ///
            /// # Errors
            ///
            /// Returns [`RateioError::InvalidPeriod`] for an unrepresentable
            /// month, or a storage error.
            pub $($async_kw)? fn period_summary(&self, reference: NaiveDate) -> Result<PeriodSummary> {
                let period = Period::containing(reference)?;
                self.summarize(period) $( .$await_ext )?
            }

            /// Summary of the month named by `input` (`YYYY-MM` or
            /// `YYYY-MM-DD`).
            ///
            /// # Errors
            ///
            /// Returns [`RateioError::InvalidPeriod`] if `input` is empty or
            /// malformed, or a storage error.
            pub $($async_kw)? fn period_summary_for(&self, input: &str) -> Result<PeriodSummary> {
                let period = Period::parse(input)?;
                self.summarize(period) $( .$await_ext )?
            }

            /// Monthly totals for the `months` months ending with the month
            /// of `reference`, oldest first.
            ///
            /// # Errors
            ///
            /// Returns [`RateioError::InvalidPeriod`] or a storage error.
            pub $($async_kw)? fn monthly_trend(
                &self,
                reference: NaiveDate,
                months: u32,
            ) -> Result<Vec<MonthTotals>> {
                let expenses = self.storage.expenses() $( .$await_ext )? ?;
                let contributions = self.storage.contributions() $( .$await_ext )? ?;
                aggregate::monthly_trend(reference, months, &expenses, &contributions)
            }

            /// Every expense and contribution as calendar events.
            ///
            /// # Errors
            ///
            /// Returns an error if the storage backend fails to read.
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn calendar_events(&self) -> Result<Vec<CalendarEvent>> {
                let expenses = self.storage.expenses() $( .$await_ext )? ?;
                let contributions = self.storage.contributions() $( .$await_ext )? ?;
                let investors = self.storage.investors() $( .$await_ext )? ?;
                let events = calendar::project_events(&expenses, &contributions, &investors);
                tracing::debug!(events = events.len(), "projected calendar");
                Ok(events)
            }

            /// Calendar events on `day`.
            ///
            /// # Errors
            ///
            /// Returns an error if the storage backend fails to read.
            pub $($async_kw)? fn events_on_day(&self, day: NaiveDate) -> Result<Vec<CalendarEvent>> {
                let events = self.calendar_events() $( .$await_ext )? ?;
                Ok(calendar::events_on_day(&events, day).into_iter().cloned().collect())
            }

            /// Pending expenses due within `days` days of `today`.
            ///
            /// # Errors
            ///
            /// Returns an error if the storage backend fails to read.
            pub $($async_kw)? fn upcoming_expenses(
                &self,
                today: NaiveDate,
                days: u32,
            ) -> Result<Vec<Expense>> {
                let expenses = self.storage.expenses() $( .$await_ext )? ?;
                Ok(aggregate::upcoming_expenses(&expenses, today, days)
                    .into_iter()
                    .cloned()
                    .collect())
            }

            /// Pending expenses past their due date.
            ///
            /// # Errors
            ///
            /// Returns an error if the storage backend fails to read.
            pub $($async_kw)? fn overdue_expenses(&self, today: NaiveDate) -> Result<Vec<Expense>> {
                let expenses = self.storage.expenses() $( .$await_ext )? ?;
                Ok(aggregate::overdue_expenses(&expenses, today)
                    .into_iter()
                    .cloned()
                    .collect())
            }

            /// Loads every collection and aggregates `period`.
            #[tracing::instrument(skip_all, fields(period = %period))]
            $($async_kw)? fn summarize(&self, period: Period) -> Result<PeriodSummary> {
                let expenses = self.storage.expenses() $( .$await_ext )? ?;
                let contributions = self.storage.contributions() $( .$await_ext )? ?;
                let categories = self.storage.categories() $( .$await_ext )? ?;
                let investors = self.storage.investors() $( .$await_ext )? ?;
                tracing::debug!(
                    expenses = expenses.len(),
                    contributions = contributions.len(),
                    "aggregating period"
                );
                aggregate::summarize(period, &expenses, &contributions, &categories, &investors)
            }

            /// Looks up a stored card by ID.
            $($async_kw)? fn find_card(&self, id: &CardId) -> Result<Card> {
                let cards = self.storage.cards() $( .$await_ext )? ?;
                cards
                    .into_iter()
                    .find(|found| found.id == *id)
                    .ok_or_else(|| RateioError::InvalidCard(format!("unknown card {id}")))
            }
        }
    };
}

#[cfg(feature = "async")]
mod async_ledger {
    //! Async ledger facade.

    use crate::aggregate::{self, MonthTotals, PeriodSummary};
    use crate::calendar::{self, CalendarEvent};
    use crate::card::{self, CardUtilization, InvoiceTotal, PortfolioUtilization};
    use crate::dates::Period;
    use crate::error::{RateioError, Result};
    use crate::models::{
        Card, CardId, Category, Contribution, Decimal, Expense, ExpenseId, Investor,
        InvestorShare, NaiveDate,
    };
    use crate::money::to_cents;
    use crate::split::{split_expense, validate_split};
    use crate::storage::Storage;

    use super::ExpenseFilter;

    define_ledger! {
        ledger_name: Ledger,
        builder_name: LedgerBuilder,
        storage_trait: Storage,
        ledger_doc: "Async ledger facade over a [`Storage`] backend.\n\nUse [`Ledger::builder()`] to construct an instance.",
        builder_doc: "Builder for constructing a [`Ledger`].",
        async_kw: async,
        await_kw: await,
    }
}

#[cfg(feature = "blocking")]
mod blocking_ledger {
    //! Blocking ledger facade.

    use crate::aggregate::{self, MonthTotals, PeriodSummary};
    use crate::calendar::{self, CalendarEvent};
    use crate::card::{self, CardUtilization, InvoiceTotal, PortfolioUtilization};
    use crate::dates::Period;
    use crate::error::{RateioError, Result};
    use crate::models::{
        Card, CardId, Category, Contribution, Decimal, Expense, ExpenseId, Investor,
        InvestorShare, NaiveDate,
    };
    use crate::money::to_cents;
    use crate::split::{split_expense, validate_split};
    use crate::storage::BlockingStorage;

    use super::ExpenseFilter;

    define_ledger! {
        ledger_name: LedgerBlocking,
        builder_name: LedgerBlockingBuilder,
        storage_trait: BlockingStorage,
        ledger_doc: "Blocking ledger facade over a [`BlockingStorage`] backend.\n\nUse [`LedgerBlocking::builder()`] to construct an instance.",
        builder_doc: "Builder for constructing a [`LedgerBlocking`].",
    }
}

#[cfg(feature = "async")]
pub use async_ledger::{Ledger, LedgerBuilder};
#[cfg(feature = "blocking")]
pub use blocking_ledger::{LedgerBlocking, LedgerBlockingBuilder};
