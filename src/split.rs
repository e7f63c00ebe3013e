//! Expense split calculator.
//!
//! Shares are computed in whole cents so the parts of an expense always
//! add back up to the expense amount:
//!
//! 1. active investors are ordered by id;
//! 2. each receives `floor(cents / n)`;
//! 3. the `r < n` cents left over go one each to the first `r` investors.
//!
//! Two shares of the same split therefore never differ by more than one
//! cent, and `100.00` across three investors becomes
//! `33.34 / 33.33 / 33.33`.

use rust_decimal::Decimal;

use crate::error::{RateioError, Result};
use crate::models::{Investor, InvestorShare};
use crate::money::{MINIMAL_UNIT, from_cents, sub_money, sum_money, to_cents};

/// Splits `amount` evenly among the active investors in `investors`.
///
/// Inactive investors are skipped and receive no share. The returned
/// shares are ordered by investor id.
///
/// # Errors
///
/// Returns [`RateioError::InvalidAmount`] if `amount` is not positive,
/// has sub-cent precision or is too large to count in cents, and
/// [`RateioError::NoActiveInvestors`] if no investor is active.
pub fn split_expense(amount: Decimal, investors: &[Investor]) -> Result<Vec<InvestorShare>> {
    if amount <= Decimal::ZERO {
        return Err(RateioError::InvalidAmount(amount));
    }
    let cents = to_cents(amount)?;

    let mut active: Vec<&Investor> = investors.iter().filter(|inv| inv.active).collect();
    if active.is_empty() {
        return Err(RateioError::NoActiveInvestors);
    }
    active.sort_by(|left, right| left.id.cmp(&right.id));

    let count = Decimal::from(active.len());
    let base = (cents / count).floor();
    let leftover = cents - base * count;

    let shares = active
        .into_iter()
        .enumerate()
        .map(|(idx, investor)| {
            let extra = if Decimal::from(idx) < leftover {
                Decimal::ONE
            } else {
                Decimal::ZERO
            };
            InvestorShare {
                investor_id: investor.id.clone(),
                amount: from_cents(base + extra),
            }
        })
        .collect();
    Ok(shares)
}

/// Checks that a recorded split reconciles with its expense amount.
///
/// An empty split is valid (the expense is simply not allocated yet).
/// Otherwise no share may be negative and the shares must add up to
/// `amount` within one cent.
///
/// # Errors
///
/// Returns [`RateioError::InvalidSplit`] describing the first violation,
/// or [`RateioError::InvalidAmount`] if the shares overflow when summed.
pub fn validate_split(amount: Decimal, shares: &[InvestorShare]) -> Result<()> {
    if shares.is_empty() {
        return Ok(());
    }
    if let Some(negative) = shares.iter().find(|share| share.amount < Decimal::ZERO) {
        return Err(RateioError::InvalidSplit(format!(
            "share of {} is negative: {}",
            negative.investor_id, negative.amount
        )));
    }
    let total = sum_money(shares.iter().map(|share| share.amount))?;
    if sub_money(total, amount)?.abs() > MINIMAL_UNIT {
        return Err(RateioError::InvalidSplit(format!(
            "shares add up to {total}, expected {amount}"
        )));
    }
    Ok(())
}
