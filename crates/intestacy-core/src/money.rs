//! Exact sterling amounts.
//!
//! All estate arithmetic goes through [`Money`]; binary floating point never
//! touches an amount. An amount keeps the precision it was entered with (down
//! to 10⁻¹⁸ of a pound) and is only rounded to the penny when rendered as
//! `£1,234.56` by `Display`.

use std::fmt;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Fractional decimal digits held internally.
const FRACTION_DIGITS: i64 = 18;
const UNITS_PER_POUND: i128 = 1_000_000_000_000_000_000;
const UNITS_PER_PENNY: i128 = UNITS_PER_POUND / 100;

/// A sterling amount in units of 10⁻¹⁸ pounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i128);

/// Reasons a raw amount string was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyParseError {
    #[error("no amount given")]
    Empty,

    #[error("'{0}' is not a valid number")]
    Invalid(String),

    #[error("amount must not be negative")]
    Negative,

    #[error("amount is too large")]
    Overflow,
}

impl Money {
    pub const ZERO: Money = Money(0);

    /// Build an amount from whole pounds.
    pub const fn from_pounds(pounds: i64) -> Self {
        Money(pounds as i128 * UNITS_PER_POUND)
    }

    /// Build an amount from pence.
    pub const fn from_pence(pence: i64) -> Self {
        Money(pence as i128 * UNITS_PER_PENNY)
    }

    /// Build an amount from internal units (10⁻¹⁸ pounds).
    pub const fn from_units(units: i128) -> Self {
        Money(units)
    }

    /// The exact amount in internal units.
    pub const fn units(self) -> i128 {
        self.0
    }

    /// The amount rounded half-up (away from zero) to whole pence.
    pub fn pence(self) -> i128 {
        let rounded = (self.0.unsigned_abs() + UNITS_PER_PENNY.unsigned_abs() / 2)
            / UNITS_PER_PENNY.unsigned_abs();
        // Fits: the quotient is far below i128::MAX.
        let rounded = rounded as i128;
        if self.0 < 0 {
            -rounded
        } else {
            rounded
        }
    }

    /// The amount rounded to the penny, as presented to users.
    pub fn round_to_penny(self) -> Money {
        Money(self.pence() * UNITS_PER_PENNY)
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Split into `(lower, upper)` halves that sum back to `self`.
    ///
    /// When the amount is an odd number of units the upper half carries the
    /// extra unit.
    pub fn halve(self) -> (Money, Money) {
        let lower = Money(self.0.div_euclid(2));
        (lower, self - lower)
    }

    /// Divide into `n` equal shares using largest-remainder allocation.
    ///
    /// Every share is `⌊self / n⌋`; the first `self mod n` shares get one
    /// extra unit so the shares always sum to `self`. Returns an empty vector
    /// when `n` is zero.
    pub fn split_even(self, n: u32) -> Vec<Money> {
        if n == 0 {
            return Vec::new();
        }
        let n = i128::from(n);
        let base = self.0.div_euclid(n);
        let extra = self.0.rem_euclid(n);
        (0..n)
            .map(|i| Money(if i < extra { base + 1 } else { base }))
            .collect()
    }

    /// Exact decimal form without symbol or separators: at least two
    /// fractional digits, more when the amount needs them (`522000.00`,
    /// `1000.005`).
    pub fn to_decimal_string(self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let per_pound = UNITS_PER_POUND.unsigned_abs();
        let fraction = format!("{:018}", abs % per_pound);
        let trimmed = fraction.trim_end_matches('0');
        let fraction = if trimmed.len() < 2 {
            &fraction[..2]
        } else {
            trimmed
        };
        format!("{sign}{}.{fraction}", abs / per_pound)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

/// Currency form: `£` + thousands separators + two decimals, rounded
/// half-up to the penny.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pence = self.pence();
        let abs = pence.unsigned_abs();
        let pounds = (abs / 100).to_string();
        let mut grouped = String::with_capacity(pounds.len() + pounds.len() / 3);
        for (i, ch) in pounds.chars().enumerate() {
            if i > 0 && (pounds.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        let sign = if pence < 0 { "-" } else { "" };
        write!(f, "{sign}£{grouped}.{:02}", abs % 100)
    }
}

/// Parse user or file input such as `522000`, `£522,000.00`, `1234.5` or
/// `1.5e6`.
///
/// Up to 18 fractional digits are kept exactly. Anything finer is rounded
/// half-up, except that a non-zero amount never rounds down to zero.
impl FromStr for Money {
    type Err = MoneyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(MoneyParseError::Empty);
        }
        let invalid = || MoneyParseError::Invalid(trimmed.to_string());

        let (negative, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, trimmed),
        };
        let body = body.strip_prefix('£').unwrap_or(body).trim_start();

        let (mantissa, exponent) = match body.split_once(['e', 'E']) {
            Some((m, e)) => (m, i64::from(e.parse::<i32>().map_err(|_| invalid())?)),
            None => (body, 0),
        };
        let (whole, frac) = match mantissa.split_once('.') {
            Some((w, f)) => (w, f),
            None => (mantissa, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if !frac.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let whole = parse_grouped_digits(whole).ok_or_else(invalid)?;

        let digits = format!("{whole}{frac}");
        let digits = digits.trim_start_matches('0');
        let frac_len = i64::try_from(frac.len()).map_err(|_| invalid())?;
        let units = scale_digits(digits, exponent - frac_len + FRACTION_DIGITS)?;

        if negative && units != 0 {
            return Err(MoneyParseError::Negative);
        }
        Ok(Money(units))
    }
}

/// Value of `digits × 10^shift` as an integer, rounding half-up when `shift`
/// drops digits. `digits` has no leading zeros; empty means zero.
fn scale_digits(digits: &str, shift: i64) -> Result<i128, MoneyParseError> {
    if digits.is_empty() {
        return Ok(0);
    }
    if shift >= 0 {
        let base: i128 = digits.parse().map_err(|_| MoneyParseError::Overflow)?;
        let factor = u32::try_from(shift)
            .ok()
            .and_then(|s| 10i128.checked_pow(s))
            .ok_or(MoneyParseError::Overflow)?;
        return base.checked_mul(factor).ok_or(MoneyParseError::Overflow);
    }

    let drop = usize::try_from(shift.unsigned_abs()).unwrap_or(usize::MAX);
    let (kept, round_digit) = if drop > digits.len() {
        ("", b'0')
    } else {
        let (kept, dropped) = digits.split_at(digits.len() - drop);
        (kept, dropped.bytes().next().unwrap_or(b'0'))
    };
    let kept: i128 = if kept.is_empty() {
        0
    } else {
        kept.parse().map_err(|_| MoneyParseError::Overflow)?
    };
    let rounded = kept
        .checked_add(i128::from(round_digit >= b'5'))
        .ok_or(MoneyParseError::Overflow)?;
    // `digits` is non-zero, so the amount is at least one unit.
    Ok(rounded.max(1))
}

/// Strip comma thousands separators from the whole-pounds part, checking the
/// grouping. Empty means zero pounds (as in `.50`).
fn parse_grouped_digits(s: &str) -> Option<String> {
    if s.is_empty() {
        return Some("0".to_string());
    }
    if s.contains(',') {
        let mut groups = s.split(',');
        let head = groups.next()?;
        if head.is_empty() || head.len() > 3 {
            return None;
        }
        if groups.clone().any(|g| g.len() != 3) {
            return None;
        }
    }
    let digits: String = s.chars().filter(|c| *c != ',').collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(digits)
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_decimal_string())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
