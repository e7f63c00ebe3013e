//! Period aggregator.
//!
//! Turns raw expenses and contributions into the monthly figures behind
//! the dashboard and reports. Expenses are bucketed by due date and
//! contributions by their date. Only paid expenses reduce the available
//! balance and the daily cash-flow line; pending ones still count in the
//! expense totals and breakdowns.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::dates::Period;
use crate::error::Result;
use crate::money::{add_money, sub_money, sum_money};
use crate::models::{
    Category, CategoryId, Contribution, Expense, ExpenseStatus, Investor, InvestorId,
};

/// Expense total of one category within a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    /// Category, or `None` for expenses whose category is not in the
    /// catalog.
    pub category_id: Option<CategoryId>,
    /// Sum of the category's expenses.
    pub total: Decimal,
}

/// What one investor put in and was allocated within a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestorTotal {
    /// Investor, or `None` for contributions and split entries pointing at
    /// unknown investors.
    pub investor_id: Option<InvestorId>,
    /// Sum of the investor's contributions.
    pub contributed: Decimal,
    /// Sum of the investor's expense shares.
    pub allocated_expense: Decimal,
    /// `contributed - allocated_expense`.
    pub net: Decimal,
}

/// Cash movement of one day and the running balance after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyBalance {
    /// Calendar day.
    pub day: NaiveDate,
    /// Contributions received that day.
    pub inflow: Decimal,
    /// Paid expenses due that day.
    pub outflow: Decimal,
    /// `inflow - outflow`.
    pub net_delta: Decimal,
    /// Running sum of `net_delta` since the first day of the period.
    pub cumulative_balance: Decimal,
}

/// Monthly dashboard/report figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSummary {
    /// Month the figures cover.
    pub period: Period,
    /// Sum of every expense due in the period.
    pub expenses_total: Decimal,
    /// Part of `expenses_total` already paid.
    pub expenses_paid: Decimal,
    /// Part of `expenses_total` still pending.
    pub expenses_pending: Decimal,
    /// Sum of the period's contributions.
    pub contributions_total: Decimal,
    /// `contributions_total - expenses_paid`.
    pub available_balance: Decimal,
    /// Non-zero category totals, largest first.
    pub per_category: Vec<CategoryTotal>,
    /// One entry per investor (input order), then the unknown bucket.
    pub per_investor: Vec<InvestorTotal>,
    /// One entry per day of the period, ascending.
    pub daily_running_balance: Vec<DailyBalance>,
}

/// Totals of one month in a trend series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthTotals {
    /// Month the totals cover.
    pub period: Period,
    /// Sum of every expense due in the month.
    pub expenses_total: Decimal,
    /// Part of `expenses_total` already paid.
    pub expenses_paid: Decimal,
    /// Sum of the month's contributions.
    pub contributions_total: Decimal,
    /// `contributions_total - expenses_paid`.
    pub balance: Decimal,
}

/// Aggregates the calendar month containing `reference`.
///
/// # Errors
///
/// Returns [`crate::error::RateioError::InvalidPeriod`] if the month
/// around `reference` cannot be represented, and
/// [`crate::error::RateioError::InvalidAmount`] if a total overflows.
pub fn aggregate_period(
    reference: NaiveDate,
    expenses: &[Expense],
    contributions: &[Contribution],
    categories: &[Category],
    investors: &[Investor],
) -> Result<PeriodSummary> {
    let period = Period::containing(reference)?;
    summarize(period, expenses, contributions, categories, investors)
}

/// Aggregates an already resolved `period`.
///
/// # Errors
///
/// Returns [`crate::error::RateioError::InvalidAmount`] if a total
/// overflows.
pub fn summarize(
    period: Period,
    expenses: &[Expense],
    contributions: &[Contribution],
    categories: &[Category],
    investors: &[Investor],
) -> Result<PeriodSummary> {
    let expenses: Vec<&Expense> = expenses_in(period, expenses).collect();
    let contributions: Vec<&Contribution> = contributions_in(period, contributions).collect();

    let expenses_total = sum_money(expenses.iter().map(|exp| exp.amount))?;
    let expenses_paid = sum_money(
        expenses
            .iter()
            .filter(|exp| exp.status == ExpenseStatus::Paid)
            .map(|exp| exp.amount),
    )?;
    let contributions_total = sum_money(contributions.iter().map(|c| c.amount))?;

    Ok(PeriodSummary {
        period,
        expenses_total,
        expenses_paid,
        expenses_pending: sub_money(expenses_total, expenses_paid)?,
        contributions_total,
        available_balance: sub_money(contributions_total, expenses_paid)?,
        per_category: category_totals(&expenses, categories)?,
        per_investor: investor_totals(&expenses, &contributions, investors)?,
        daily_running_balance: daily_balances(period, &expenses, &contributions)?,
    })
}

/// Per-month totals for the `months` months ending with the month of
/// `reference`, oldest first.
///
/// # Errors
///
/// Returns [`crate::error::RateioError::InvalidPeriod`] if a month in the
/// range cannot be represented, and
/// [`crate::error::RateioError::InvalidAmount`] if a total overflows.
pub fn monthly_trend(
    reference: NaiveDate,
    months: u32,
    expenses: &[Expense],
    contributions: &[Contribution],
) -> Result<Vec<MonthTotals>> {
    let mut periods = Vec::new();
    let mut current = Period::containing(reference)?;
    for remaining in (0..months).rev() {
        periods.push(current);
        if remaining > 0 {
            current = current.previous()?;
        }
    }
    periods.reverse();

    periods
        .into_iter()
        .map(|period| {
            let mut expenses_total = Decimal::ZERO;
            let mut expenses_paid = Decimal::ZERO;
            for expense in expenses_in(period, expenses) {
                expenses_total = add_money(expenses_total, expense.amount)?;
                if expense.is_paid() {
                    expenses_paid = add_money(expenses_paid, expense.amount)?;
                }
            }
            let contributions_total =
                sum_money(contributions_in(period, contributions).map(|c| c.amount))?;
            Ok(MonthTotals {
                period,
                expenses_total,
                expenses_paid,
                contributions_total,
                balance: sub_money(contributions_total, expenses_paid)?,
            })
        })
        .collect()
}

/// Pending expenses due between `today` and `today + days` (inclusive),
/// soonest first.
#[must_use]
pub fn upcoming_expenses(expenses: &[Expense], today: NaiveDate, days: u32) -> Vec<&Expense> {
    let horizon = today
        .checked_add_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MAX);
    let mut due: Vec<&Expense> = expenses
        .iter()
        .filter(|exp| !exp.is_paid() && exp.due_date >= today && exp.due_date <= horizon)
        .collect();
    due.sort_by(|left, right| {
        left.due_date
            .cmp(&right.due_date)
            .then_with(|| left.id.cmp(&right.id))
    });
    due
}

/// Pending expenses whose due date is before `today`, oldest first.
#[must_use]
pub fn overdue_expenses(expenses: &[Expense], today: NaiveDate) -> Vec<&Expense> {
    let mut overdue: Vec<&Expense> = expenses
        .iter()
        .filter(|exp| !exp.is_paid() && exp.due_date < today)
        .collect();
    overdue.sort_by(|left, right| {
        left.due_date
            .cmp(&right.due_date)
            .then_with(|| left.id.cmp(&right.id))
    });
    overdue
}

/// Expenses due inside `period`.
fn expenses_in(period: Period, expenses: &[Expense]) -> impl Iterator<Item = &Expense> {
    expenses
        .iter()
        .filter(move |exp| period.contains(exp.due_date))
}

/// Contributions dated inside `period`.
fn contributions_in(
    period: Period,
    contributions: &[Contribution],
) -> impl Iterator<Item = &Contribution> {
    contributions
        .iter()
        .filter(move |c| period.contains(c.date))
}

/// Non-zero category totals sorted by descending total, ties by id, with
/// the unknown-category bucket last.
fn category_totals(expenses: &[&Expense], categories: &[Category]) -> Result<Vec<CategoryTotal>> {
    let known: HashSet<&CategoryId> = categories.iter().map(|cat| &cat.id).collect();
    let mut totals: HashMap<&CategoryId, Decimal> = HashMap::new();
    let mut unknown = Decimal::ZERO;
    for expense in expenses {
        if known.contains(&expense.category_id) {
            let total = totals.entry(&expense.category_id).or_insert(Decimal::ZERO);
            *total = add_money(*total, expense.amount)?;
        } else {
            tracing::warn!(
                expense = %expense.id,
                category = %expense.category_id,
                "expense references unknown category"
            );
            unknown = add_money(unknown, expense.amount)?;
        }
    }

    let mut result: Vec<CategoryTotal> = totals
        .into_iter()
        .filter(|&(_, total)| !total.is_zero())
        .map(|(id, total)| CategoryTotal {
            category_id: Some(id.clone()),
            total,
        })
        .collect();
    result.sort_by(|left, right| {
        right
            .total
            .cmp(&left.total)
            .then_with(|| left.category_id.cmp(&right.category_id))
    });
    if !unknown.is_zero() {
        result.push(CategoryTotal {
            category_id: None,
            total: unknown,
        });
    }
    Ok(result)
}

/// Contributed/allocated/net per investor in input order, followed by the
/// unknown-investor bucket when it is non-zero.
fn investor_totals(
    expenses: &[&Expense],
    contributions: &[&Contribution],
    investors: &[Investor],
) -> Result<Vec<InvestorTotal>> {
    let known: HashSet<&InvestorId> = investors.iter().map(|inv| &inv.id).collect();
    let mut contributed: HashMap<&InvestorId, Decimal> = HashMap::new();
    let mut allocated: HashMap<&InvestorId, Decimal> = HashMap::new();
    let mut unknown_contributed = Decimal::ZERO;
    let mut unknown_allocated = Decimal::ZERO;

    for contribution in contributions {
        if known.contains(&contribution.investor_id) {
            let total = contributed
                .entry(&contribution.investor_id)
                .or_insert(Decimal::ZERO);
            *total = add_money(*total, contribution.amount)?;
        } else {
            tracing::warn!(
                contribution = %contribution.id,
                investor = %contribution.investor_id,
                "contribution references unknown investor"
            );
            unknown_contributed = add_money(unknown_contributed, contribution.amount)?;
        }
    }
    for expense in expenses {
        for share in &expense.investor_split {
            if known.contains(&share.investor_id) {
                let total = allocated.entry(&share.investor_id).or_insert(Decimal::ZERO);
                *total = add_money(*total, share.amount)?;
            } else {
                tracing::warn!(
                    expense = %expense.id,
                    investor = %share.investor_id,
                    "split references unknown investor"
                );
                unknown_allocated = add_money(unknown_allocated, share.amount)?;
            }
        }
    }

    let mut result = investors
        .iter()
        .map(|investor| {
            let put_in = contributed.get(&investor.id).copied().unwrap_or_default();
            let owed = allocated.get(&investor.id).copied().unwrap_or_default();
            Ok(InvestorTotal {
                investor_id: Some(investor.id.clone()),
                contributed: put_in,
                allocated_expense: owed,
                net: sub_money(put_in, owed)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    if !unknown_contributed.is_zero() || !unknown_allocated.is_zero() {
        result.push(InvestorTotal {
            investor_id: None,
            contributed: unknown_contributed,
            allocated_expense: unknown_allocated,
            net: sub_money(unknown_contributed, unknown_allocated)?,
        });
    }
    Ok(result)
}

/// Day-by-day cash flow over the whole period.
fn daily_balances(
    period: Period,
    expenses: &[&Expense],
    contributions: &[&Contribution],
) -> Result<Vec<DailyBalance>> {
    let mut flows: BTreeMap<NaiveDate, (Decimal, Decimal)> = BTreeMap::new();
    for contribution in contributions {
        let day = flows
            .entry(contribution.date)
            .or_insert((Decimal::ZERO, Decimal::ZERO));
        day.0 = add_money(day.0, contribution.amount)?;
    }
    for expense in expenses.iter().filter(|exp| exp.is_paid()) {
        let day = flows
            .entry(expense.due_date)
            .or_insert((Decimal::ZERO, Decimal::ZERO));
        day.1 = add_money(day.1, expense.amount)?;
    }

    let mut cumulative_balance = Decimal::ZERO;
    period
        .days()
        .map(|day| {
            let (inflow, outflow) = flows
                .get(&day)
                .copied()
                .unwrap_or((Decimal::ZERO, Decimal::ZERO));
            let net_delta = sub_money(inflow, outflow)?;
            cumulative_balance = add_money(cumulative_balance, net_delta)?;
            Ok(DailyBalance {
                day,
                inflow,
                outflow,
                net_delta,
                cumulative_balance,
            })
        })
        .collect()
}
