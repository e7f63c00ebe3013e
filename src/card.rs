//! Card utilization calculator.
//!
//! Utilization is lifetime-to-date: every expense charged to a card
//! counts against its limit, paid or pending, regardless of the card's
//! statement cycle. The billing-cycle helpers at the bottom of this module
//! only bucket charges for display and never reset utilization.

use std::collections::BTreeMap;

use chrono::{Datelike as _, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::dates::{add_months, clamped_date};
use crate::error::{RateioError, Result};
use crate::models::{Card, CardId, Expense, ExpenseStatus};
use crate::money::{add_money, clamp_percent, percent_of, sub_money, sum_money};

/// Percentage below which a card counts as lightly used.
const MODERATE_THRESHOLD: Decimal = Decimal::from_parts(50, 0, 0, false, 0);
/// Percentage from which a card counts as heavily used.
const HIGH_THRESHOLD: Decimal = Decimal::from_parts(80, 0, 0, false, 0);

/// Coarse usage band of a card, for badges and colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UtilizationLevel {
    /// Below 50% of the limit.
    Low,
    /// From 50% up to (excluding) 80%.
    Moderate,
    /// From 80% up to and including 100%.
    High,
    /// Above the limit.
    OverLimit,
}

impl UtilizationLevel {
    /// Classifies a utilization percentage.
    #[inline]
    #[must_use]
    pub fn from_percent(percent: Decimal) -> Self {
        if percent > Decimal::ONE_HUNDRED {
            Self::OverLimit
        } else if percent >= HIGH_THRESHOLD {
            Self::High
        } else if percent >= MODERATE_THRESHOLD {
            Self::Moderate
        } else {
            Self::Low
        }
    }
}

/// Utilization figures for one card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardUtilization {
    /// Card the figures belong to.
    pub card_id: CardId,
    /// Sum of every expense charged to the card.
    pub utilized: Decimal,
    /// `100 * utilized / limit`, or 0 for a zero limit. Not clamped.
    pub percent_utilized: Decimal,
    /// `limit - utilized`; negative when over the limit.
    pub available: Decimal,
}

impl CardUtilization {
    /// Percentage clamped to `[0, 100]` for progress bars.
    #[inline]
    #[must_use]
    pub fn display_percent(&self) -> Decimal {
        clamp_percent(self.percent_utilized)
    }

    /// Usage band of the card.
    #[inline]
    #[must_use]
    pub fn level(&self) -> UtilizationLevel {
        UtilizationLevel::from_percent(self.percent_utilized)
    }

    /// Returns `true` if charges exceed the limit.
    #[inline]
    #[must_use]
    pub fn is_over_limit(&self) -> bool {
        self.available < Decimal::ZERO
    }
}

/// Utilization figures summed over a set of cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioUtilization {
    /// Sum of all credit limits.
    pub total_limit: Decimal,
    /// Sum of all card utilization.
    pub total_utilized: Decimal,
    /// `total_limit - total_utilized`.
    pub total_available: Decimal,
    /// `100 * total_utilized / total_limit`, or 0 for a zero total limit.
    pub percent_utilized: Decimal,
    /// Number of cards in the portfolio.
    pub active_card_count: usize,
    /// Sum of pending card-paid expenses (the next invoices).
    pub upcoming_invoice_total: Decimal,
    /// Per-card figures keyed by card id.
    pub per_card: BTreeMap<CardId, CardUtilization>,
}

/// Computes utilized amount, percentage and available limit for `card`.
///
/// # Errors
///
/// Returns [`RateioError::InvalidLimit`] if the card's credit limit is
/// negative, and [`RateioError::InvalidAmount`] if the charges overflow.
pub fn card_utilization(card: &Card, expenses: &[Expense]) -> Result<CardUtilization> {
    ensure_limit(card)?;
    let utilized = sum_money(
        expenses
            .iter()
            .filter(|expense| expense.is_charged_to(&card.id))
            .map(|expense| expense.amount),
    )?;
    Ok(CardUtilization {
        card_id: card.id.clone(),
        utilized,
        percent_utilized: percent_of(utilized, card.credit_limit)?,
        available: sub_money(card.credit_limit, utilized)?,
    })
}

/// Sums card utilization across `cards`.
///
/// `upcoming_invoice_total` covers every pending card-paid expense in
/// `expenses`, including charges to cards outside `cards`.
///
/// # Errors
///
/// Returns [`RateioError::InvalidLimit`] for the first card with a
/// negative credit limit, [`RateioError::InvalidCard`] if two cards share
/// an id, and [`RateioError::InvalidAmount`] if a total overflows.
pub fn portfolio_utilization(cards: &[Card], expenses: &[Expense]) -> Result<PortfolioUtilization> {
    let mut per_card = BTreeMap::new();
    let mut total_limit = Decimal::ZERO;
    let mut total_utilized = Decimal::ZERO;
    for card in cards {
        if per_card.contains_key(&card.id) {
            return Err(RateioError::InvalidCard(format!(
                "card {} appears more than once",
                card.id
            )));
        }
        let usage = card_utilization(card, expenses)?;
        total_limit = add_money(total_limit, card.credit_limit)?;
        total_utilized = add_money(total_utilized, usage.utilized)?;
        let _previous = per_card.insert(card.id.clone(), usage);
    }

    let upcoming_invoice_total = sum_money(
        expenses
            .iter()
            .filter(|expense| expense.payment.is_card() && expense.status == ExpenseStatus::Pending)
            .map(|expense| expense.amount),
    )?;

    Ok(PortfolioUtilization {
        total_limit,
        total_utilized,
        total_available: sub_money(total_limit, total_utilized)?,
        percent_utilized: percent_of(total_utilized, total_limit)?,
        active_card_count: cards.len(),
        upcoming_invoice_total,
        per_card,
    })
}

/// Checks a card's limit and billing days.
///
/// # Errors
///
/// Returns [`RateioError::InvalidLimit`] for a negative limit and
/// [`RateioError::InvalidCard`] for a closing or due day outside `1..=31`.
pub fn validate_card(card: &Card) -> Result<()> {
    ensure_limit(card)?;
    for (label, day) in [("closing", card.closing_day), ("due", card.due_day)] {
        if !(1..=31).contains(&day) {
            return Err(RateioError::InvalidCard(format!(
                "card {} has {label} day {day}",
                card.id
            )));
        }
    }
    Ok(())
}

/// Rejects negative credit limits.
fn ensure_limit(card: &Card) -> Result<()> {
    if card.credit_limit < Decimal::ZERO {
        return Err(RateioError::InvalidLimit {
            card: card.id.clone(),
            limit: card.credit_limit,
        });
    }
    Ok(())
}

// ── Billing cycle bucketing ─────────────────────────────────────────────

/// Statement closing and due dates of one card invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingCycle {
    /// Last day whose purchases land on this invoice.
    pub closing_date: NaiveDate,
    /// Day the invoice must be paid.
    pub due_date: NaiveDate,
}

/// Total charged on one invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceTotal {
    /// Invoice dates.
    pub cycle: BillingCycle,
    /// Sum of every charge on the invoice.
    pub total: Decimal,
    /// Sum of the charges not yet paid.
    pub pending: Decimal,
}

/// Returns the invoice that a purchase on `date` lands on.
///
/// The statement closes on the first `closing_day` on or after `date`
/// (a purchase on the closing day itself still makes that invoice), and
/// is due on the next `due_day` strictly after closing. Day numbers are
/// clamped to the length of short months.
///
/// # Errors
///
/// Returns [`RateioError::InvalidCard`] for billing days outside `1..=31`
/// (or [`RateioError::InvalidLimit`] for a negative limit), and
/// [`RateioError::InvalidPeriod`] if the dates overflow the calendar.
pub fn billing_cycle(card: &Card, date: NaiveDate) -> Result<BillingCycle> {
    validate_card(card)?;
    let closing_day = u32::from(card.closing_day);
    let due_day = u32::from(card.due_day);

    let mut closing_date = day_in_month_of(date, closing_day)?;
    if closing_date < date {
        closing_date = day_in_month_of(next_month(date)?, closing_day)?;
    }
    let mut due_date = day_in_month_of(closing_date, due_day)?;
    if due_date <= closing_date {
        due_date = day_in_month_of(next_month(closing_date)?, due_day)?;
    }
    Ok(BillingCycle {
        closing_date,
        due_date,
    })
}

/// Buckets the card's charges into invoices by purchase date, ordered by
/// closing date.
///
/// # Errors
///
/// Same as [`billing_cycle`], plus [`RateioError::InvalidAmount`] if an
/// invoice total overflows.
pub fn invoice_totals(card: &Card, expenses: &[Expense]) -> Result<Vec<InvoiceTotal>> {
    let mut buckets: BTreeMap<BillingCycle, (Decimal, Decimal)> = BTreeMap::new();
    for expense in expenses.iter().filter(|exp| exp.is_charged_to(&card.id)) {
        let cycle = billing_cycle(card, expense.purchase_date)?;
        let entry = buckets.entry(cycle).or_insert((Decimal::ZERO, Decimal::ZERO));
        entry.0 = add_money(entry.0, expense.amount)?;
        if !expense.is_paid() {
            entry.1 = add_money(entry.1, expense.amount)?;
        }
    }
    Ok(buckets
        .into_iter()
        .map(|(cycle, (total, pending))| InvoiceTotal {
            cycle,
            total,
            pending,
        })
        .collect())
}

/// The given day in the month of `anchor`, clamped to the month length.
fn day_in_month_of(anchor: NaiveDate, day: u32) -> Result<NaiveDate> {
    clamped_date(anchor.year(), anchor.month(), day)
        .ok_or_else(|| RateioError::InvalidPeriod(format!("no day {day} near {anchor}")))
}

/// Some day in the month after `anchor`.
fn next_month(anchor: NaiveDate) -> Result<NaiveDate> {
    let first = anchor
        .with_day(1)
        .and_then(|first| add_months(first, 1))
        .ok_or_else(|| RateioError::InvalidPeriod(format!("no month after {anchor}")))?;
    Ok(first)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{CategoryId, ExpenseId, ExpenseKind, InvestorId, PaymentMethod};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn card(id: &str, limit: Decimal) -> Card {
        Card {
            id: CardId::from(id),
            name: format!("Card {id}"),
            brand: "Visa".to_owned(),
            credit_limit: limit,
            closing_day: 3,
            due_day: 10,
            owner_investor_id: InvestorId::from("a"),
        }
    }

    fn charge(id: &str, card_id: &str, amount: Decimal, status: ExpenseStatus) -> Expense {
        Expense {
            id: ExpenseId::from(id),
            description: format!("Charge {id}"),
            source: String::new(),
            category_id: CategoryId::from("cat"),
            amount,
            purchase_date: date(2024, 5, 2),
            due_date: date(2024, 5, 10),
            payment: PaymentMethod::Card {
                card_id: CardId::from(card_id),
            },
            status,
            kind: ExpenseKind::Single,
            investor_split: Vec::new(),
        }
    }

    fn cash(id: &str, amount: Decimal) -> Expense {
        Expense {
            payment: PaymentMethod::Cash,
            ..charge(id, "none", amount, ExpenseStatus::Pending)
        }
    }

    #[test]
    fn utilization_counts_paid_and_pending() {
        let card = card("c1", dec!(1000.00));
        let expenses = vec![
            charge("e1", "c1", dec!(300.00), ExpenseStatus::Paid),
            charge("e2", "c1", dec!(200.00), ExpenseStatus::Pending),
            charge("e3", "c2", dec!(999.00), ExpenseStatus::Pending),
            cash("e4", dec!(50.00)),
        ];
        let usage = card_utilization(&card, &expenses).unwrap();
        assert_eq!(usage.utilized, dec!(500.00));
        assert_eq!(usage.percent_utilized, dec!(50));
        assert_eq!(usage.available, dec!(500.00));
        assert_eq!(usage.level(), UtilizationLevel::Moderate);
        assert!(!usage.is_over_limit());
    }

    #[test]
    fn portfolio_scenario() {
        let cards = vec![card("c1", dec!(1000.00))];
        let expenses = vec![
            charge("e1", "c1", dec!(300.00), ExpenseStatus::Paid),
            charge("e2", "c1", dec!(200.00), ExpenseStatus::Pending),
        ];
        let portfolio = portfolio_utilization(&cards, &expenses).unwrap();
        assert_eq!(portfolio.total_limit, dec!(1000.00));
        assert_eq!(portfolio.total_utilized, dec!(500.00));
        assert_eq!(portfolio.total_available, dec!(500.00));
        assert_eq!(portfolio.percent_utilized, dec!(50));
        assert_eq!(portfolio.upcoming_invoice_total, dec!(200.00));
        assert_eq!(portfolio.active_card_count, 1);
        let usage = portfolio.per_card.get(&CardId::from("c1")).unwrap();
        assert_eq!(usage.percent_utilized, dec!(50));
    }

    #[test]
    fn zero_limit_has_zero_percent() {
        let card = card("c1", dec!(0));
        let expenses = vec![charge("e1", "c1", dec!(10.00), ExpenseStatus::Paid)];
        let usage = card_utilization(&card, &expenses).unwrap();
        assert_eq!(usage.percent_utilized, dec!(0));
        assert_eq!(usage.available, dec!(-10.00));
        assert!(usage.is_over_limit());
    }

    #[test]
    fn negative_limit_is_rejected() {
        let card = card("c1", dec!(-1));
        let err = card_utilization(&card, &[]).unwrap_err();
        assert!(matches!(err, RateioError::InvalidLimit { .. }));

        let err = portfolio_utilization(&[card], &[]).unwrap_err();
        assert!(matches!(err, RateioError::InvalidLimit { .. }));
    }

    #[test]
    fn over_limit_is_not_clamped() {
        let card = card("c1", dec!(100.00));
        let expenses = vec![charge("e1", "c1", dec!(150.00), ExpenseStatus::Pending)];
        let usage = card_utilization(&card, &expenses).unwrap();
        assert_eq!(usage.percent_utilized, dec!(150));
        assert_eq!(usage.display_percent(), dec!(100));
        assert_eq!(usage.available, dec!(-50.00));
        assert_eq!(usage.level(), UtilizationLevel::OverLimit);
    }

    #[test]
    fn duplicate_card_ids_are_rejected() {
        let cards = vec![card("c1", dec!(1000.00)), card("c1", dec!(500.00))];
        let err = portfolio_utilization(&cards, &[]).unwrap_err();
        assert!(matches!(err, RateioError::InvalidCard(msg) if msg.contains("c1")));
    }

    #[test]
    fn overflowing_charges_are_an_error() {
        let card = card("c1", dec!(1000.00));
        let expenses = vec![
            charge("e1", "c1", Decimal::MAX, ExpenseStatus::Pending),
            charge("e2", "c1", Decimal::MAX, ExpenseStatus::Pending),
        ];
        assert!(matches!(
            card_utilization(&card, &expenses),
            Err(RateioError::InvalidAmount(_))
        ));
        assert!(matches!(
            portfolio_utilization(&[card], &expenses),
            Err(RateioError::InvalidAmount(_))
        ));
    }

    #[test]
    fn huge_utilization_percent_is_an_error() {
        let card = card("c1", dec!(1.00));
        let expenses = vec![charge("e1", "c1", Decimal::MAX, ExpenseStatus::Paid)];
        assert!(matches!(
            card_utilization(&card, &expenses),
            Err(RateioError::InvalidAmount(_))
        ));
    }

    #[test]
    fn empty_portfolio() {
        let portfolio = portfolio_utilization(&[], &[cash("e1", dec!(5.00))]).unwrap();
        assert_eq!(portfolio.total_limit, dec!(0));
        assert_eq!(portfolio.percent_utilized, dec!(0));
        assert_eq!(portfolio.upcoming_invoice_total, dec!(0));
        assert!(portfolio.per_card.is_empty());
    }

    #[test]
    fn utilization_levels() {
        assert_eq!(UtilizationLevel::from_percent(dec!(0)), UtilizationLevel::Low);
        assert_eq!(UtilizationLevel::from_percent(dec!(49.99)), UtilizationLevel::Low);
        assert_eq!(UtilizationLevel::from_percent(dec!(50)), UtilizationLevel::Moderate);
        assert_eq!(UtilizationLevel::from_percent(dec!(80)), UtilizationLevel::High);
        assert_eq!(UtilizationLevel::from_percent(dec!(100)), UtilizationLevel::High);
        assert_eq!(
            UtilizationLevel::from_percent(dec!(100.01)),
            UtilizationLevel::OverLimit
        );
    }

    #[test]
    fn billing_cycle_before_and_after_closing() {
        let card = card("c1", dec!(1000));
        let on_closing = billing_cycle(&card, date(2024, 5, 3)).unwrap();
        assert_eq!(on_closing.closing_date, date(2024, 5, 3));
        assert_eq!(on_closing.due_date, date(2024, 5, 10));

        let after_closing = billing_cycle(&card, date(2024, 5, 4)).unwrap();
        assert_eq!(after_closing.closing_date, date(2024, 6, 3));
        assert_eq!(after_closing.due_date, date(2024, 6, 10));
    }

    #[test]
    fn billing_cycle_due_in_following_month() {
        let mut card = card("c1", dec!(1000));
        card.closing_day = 25;
        card.due_day = 5;
        let cycle = billing_cycle(&card, date(2024, 12, 26)).unwrap();
        assert_eq!(cycle.closing_date, date(2025, 1, 25));
        assert_eq!(cycle.due_date, date(2025, 2, 5));
    }

    #[test]
    fn billing_cycle_clamps_short_months() {
        let mut card = card("c1", dec!(1000));
        card.closing_day = 31;
        card.due_day = 30;
        let cycle = billing_cycle(&card, date(2024, 2, 10)).unwrap();
        assert_eq!(cycle.closing_date, date(2024, 2, 29));
        assert_eq!(cycle.due_date, date(2024, 3, 30));
    }

    #[test]
    fn invalid_billing_day_is_rejected() {
        let mut card = card("c1", dec!(1000));
        card.due_day = 0;
        assert!(matches!(
            billing_cycle(&card, date(2024, 1, 1)),
            Err(RateioError::InvalidCard(_))
        ));
        card.due_day = 32;
        assert!(matches!(validate_card(&card), Err(RateioError::InvalidCard(_))));
    }

    #[test]
    fn invoice_totals_bucket_by_purchase_date() {
        let card = card("c1", dec!(1000));
        let mut early = charge("e1", "c1", dec!(100.00), ExpenseStatus::Paid);
        early.purchase_date = date(2024, 5, 1);
        let mut late = charge("e2", "c1", dec!(40.00), ExpenseStatus::Pending);
        late.purchase_date = date(2024, 5, 20);
        let mut later = charge("e3", "c1", dec!(60.00), ExpenseStatus::Pending);
        later.purchase_date = date(2024, 6, 2);
        let other = charge("e4", "c2", dec!(5.00), ExpenseStatus::Pending);

        let invoices = invoice_totals(&card, &[later, early, late, other]).unwrap();
        assert_eq!(invoices.len(), 2);
        let first = invoices.first().unwrap();
        assert_eq!(first.cycle.closing_date, date(2024, 5, 3));
        assert_eq!(first.total, dec!(100.00));
        assert_eq!(first.pending, dec!(0));
        let second = invoices.get(1).unwrap();
        assert_eq!(second.cycle.closing_date, date(2024, 6, 3));
        assert_eq!(second.total, dec!(100.00));
        assert_eq!(second.pending, dec!(100.00));
    }

    mod properties {
        use proptest::prelude::*;

        use super::*;

        /// Charges of up to 100k in whole cents, on one of two cards.
        fn arb_charges() -> impl Strategy<Value = Vec<Expense>> {
            proptest::collection::vec((1_i64..=10_000_000, any::<bool>(), any::<bool>()), 0..20)
                .prop_map(|entries| {
                    entries
                        .into_iter()
                        .enumerate()
                        .map(|(idx, (cents, on_first, paid))| {
                            let status = if paid {
                                ExpenseStatus::Paid
                            } else {
                                ExpenseStatus::Pending
                            };
                            let target = if on_first { "c1" } else { "c2" };
                            charge(&format!("e{idx}"), target, Decimal::new(cents, 2), status)
                        })
                        .collect()
                })
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(256))]

            /// Adding a charge never lowers utilization or raises the
            /// available limit.
            #[test]
            fn adding_a_charge_is_monotonic(
                limit_cents in 0_i64..=100_000_000,
                mut expenses in arb_charges(),
                extra_cents in 1_i64..=10_000_000,
            ) {
                let card = card("c1", Decimal::new(limit_cents, 2));
                let before = card_utilization(&card, &expenses).unwrap();
                expenses.push(charge(
                    "extra",
                    "c1",
                    Decimal::new(extra_cents, 2),
                    ExpenseStatus::Pending,
                ));
                let after = card_utilization(&card, &expenses).unwrap();
                prop_assert!(after.utilized > before.utilized);
                prop_assert!(after.available < before.available);
                prop_assert!(after.percent_utilized >= before.percent_utilized);
            }

            /// Utilization plus availability always equals the limit, and
            /// the portfolio totals are the sums of the per-card figures.
            #[test]
            fn portfolio_totals_reconcile(
                first_limit in 0_i64..=100_000_000,
                second_limit in 0_i64..=100_000_000,
                expenses in arb_charges(),
            ) {
                let cards = vec![
                    card("c1", Decimal::new(first_limit, 2)),
                    card("c2", Decimal::new(second_limit, 2)),
                ];
                let portfolio = portfolio_utilization(&cards, &expenses).unwrap();
                let mut utilized = Decimal::ZERO;
                for usage in portfolio.per_card.values() {
                    let limit = cards
                        .iter()
                        .find(|card| card.id == usage.card_id)
                        .map(|card| card.credit_limit)
                        .unwrap_or_default();
                    prop_assert_eq!(usage.utilized + usage.available, limit);
                    utilized += usage.utilized;
                }
                prop_assert_eq!(portfolio.total_utilized, utilized);
                prop_assert_eq!(
                    portfolio.total_available,
                    portfolio.total_limit - portfolio.total_utilized
                );
                prop_assert_eq!(portfolio.active_card_count, 2);
            }
        }
    }
}
