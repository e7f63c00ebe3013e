//! Money and percentage helpers.
//!
//! All amounts are [`Decimal`] with two fractional digits. Formatting
//! follows the Brazilian real convention (`R$ 1.234,56`); the derivation
//! modules never format, they return raw decimals.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{RateioError, Result};

/// Number of fractional digits in a money amount.
pub const MONEY_SCALE: u32 = 2;

/// The smallest representable money amount (`0.01`).
pub const MINIMAL_UNIT: Decimal = Decimal::from_parts(1, 0, 0, false, MONEY_SCALE);

/// Currency symbol prepended by [`format_currency`].
const CURRENCY_SYMBOL: &str = "R$";

/// Rounds `amount` to cents, half away from zero.
#[inline]
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Converts `amount` into a whole number of cents.
///
/// # Errors
///
/// Returns [`RateioError::InvalidAmount`] if the amount carries sub-cent
/// precision or is too large to count in cents.
#[inline]
pub fn to_cents(amount: Decimal) -> Result<Decimal> {
    let cents = amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .ok_or(RateioError::InvalidAmount(amount))?;
    if cents.fract().is_zero() {
        Ok(cents.trunc())
    } else {
        Err(RateioError::InvalidAmount(amount))
    }
}

/// Converts a whole number of cents back into a money amount.
#[inline]
#[must_use]
pub fn from_cents(cents: Decimal) -> Decimal {
    cents * MINIMAL_UNIT
}

/// Adds two amounts.
///
/// # Errors
///
/// Returns [`RateioError::InvalidAmount`] carrying `right` if the sum
/// leaves the representable range.
#[inline]
pub fn add_money(left: Decimal, right: Decimal) -> Result<Decimal> {
    left.checked_add(right)
        .ok_or(RateioError::InvalidAmount(right))
}

/// Subtracts `right` from `left`.
///
/// # Errors
///
/// Returns [`RateioError::InvalidAmount`] carrying `right` on overflow.
#[inline]
pub fn sub_money(left: Decimal, right: Decimal) -> Result<Decimal> {
    left.checked_sub(right)
        .ok_or(RateioError::InvalidAmount(right))
}

/// Sums `amounts`, stopping at the first overflow.
///
/// # Errors
///
/// Returns [`RateioError::InvalidAmount`] carrying the amount that
/// overflowed the running total.
#[inline]
pub fn sum_money<I>(amounts: I) -> Result<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    amounts.into_iter().try_fold(Decimal::ZERO, add_money)
}

/// `100 * part / whole`, defined as 0 when `whole` is zero.
///
/// # Errors
///
/// Returns [`RateioError::InvalidAmount`] carrying `part` if the
/// percentage cannot be represented.
#[inline]
pub fn percent_of(part: Decimal, whole: Decimal) -> Result<Decimal> {
    if whole.is_zero() {
        return Ok(Decimal::ZERO);
    }
    part.checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.checked_div(whole))
        .ok_or(RateioError::InvalidAmount(part))
}

/// Formats `amount` as `R$ 1.234,56` (negative: `-R$ 1.234,56`).
#[must_use]
pub fn format_currency(amount: Decimal) -> String {
    let sign = if round_money(amount).is_sign_negative() && !round_money(amount).is_zero() {
        "-"
    } else {
        ""
    };
    let (integer, fraction) = split_fixed(amount.abs(), MONEY_SCALE);
    format!(
        "{sign}{CURRENCY_SYMBOL} {},{fraction}",
        group_thousands(&integer)
    )
}

/// Formats a percentage with `places` decimals, e.g. `50,0%`.
#[must_use]
pub fn format_percent(value: Decimal, places: u32) -> String {
    let sign = if value.is_sign_negative() && !value.round_dp(places).is_zero() {
        "-"
    } else {
        ""
    };
    let (integer, fraction) = split_fixed(value.abs(), places);
    if fraction.is_empty() {
        format!("{sign}{integer}%")
    } else {
        format!("{sign}{integer},{fraction}%")
    }
}

/// Clamps a percentage into `[0, 100]` for display.
#[inline]
#[must_use]
pub fn clamp_percent(value: Decimal) -> Decimal {
    value.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
}

/// Rounds a non-negative value to `places` and returns its integer and
/// fractional digit strings.
fn split_fixed(value: Decimal, places: u32) -> (String, String) {
    let mut rounded = value.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(places);
    let text = rounded.to_string();
    match text.split_once('.') {
        Some((integer, fraction)) => (integer.to_owned(), fraction.to_owned()),
        None => (text, String::new()),
    }
}

/// Inserts `.` every three digits from the right.
fn group_thousands(digits: &str) -> String {
    let count = digits.chars().count();
    let mut out = String::with_capacity(count * 2);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (count - idx) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}
