//! Fixed-point price representation.
//!
//! A [`Price`] stores a whole number of hundredths, so the value written to the
//! cache and the value returned to the caller can never drift apart through a
//! binary floating-point round trip.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Decimal amount with exactly two fraction digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price {
    hundredths: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParsePriceError {
    #[error("empty price string")]
    Empty,
    #[error("invalid price literal: {0:?}")]
    Invalid(String),
    #[error("price has more than two fraction digits: {0:?}")]
    TooPrecise(String),
    #[error("price out of range: {0:?}")]
    OutOfRange(String),
}

impl Price {
    pub const fn from_hundredths(hundredths: i64) -> Self {
        Self { hundredths }
    }

    pub const fn hundredths(&self) -> i64 {
        self.hundredths
    }

    /// Round a raw model output to two fraction digits, half away from zero.
    ///
    /// Rounding operates on the shortest decimal literal that identifies `value`
    /// (the same digits a JSON encoder would emit), so `1.005` becomes `1.01`
    /// even though its binary approximation is slightly below the midpoint.
    ///
    /// Returns `None` for NaN, infinities and magnitudes beyond `i64` hundredths.
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        // f64 Display never switches to exponent notation.
        let literal = format!("{}", value.abs());
        let (int_part, frac_part) = match literal.split_once('.') {
            Some((i, f)) => (i, f),
            None => (literal.as_str(), ""),
        };

        let whole: i64 = int_part.parse().ok()?;
        let mut frac = frac_part.bytes().map(|b| i64::from(b - b'0'));
        let tenths = frac.next().unwrap_or(0);
        let cents = frac.next().unwrap_or(0);
        let round_up = frac.next().map(|d| d >= 5).unwrap_or(false);

        let magnitude = whole
            .checked_mul(100)?
            .checked_add(tenths * 10 + cents)?
            .checked_add(i64::from(round_up))?;
        let hundredths = if value.is_sign_negative() {
            -magnitude
        } else {
            magnitude
        };
        Some(Self { hundredths })
    }

    pub fn as_f64(&self) -> f64 {
        self.hundredths as f64 / 100.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.hundredths < 0 { "-" } else { "" };
        let abs = self.hundredths.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl FromStr for Price {
    type Err = ParsePriceError;

    /// Parses `"-?digits(.d{1,2})?"` exactly, without going through `f64`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParsePriceError::Empty);
        }
        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let (int_part, frac_part) = match unsigned.split_once('.') {
            Some((i, f)) => (i, f),
            None => (unsigned, ""),
        };

        let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
        if int_part.is_empty()
            || !all_digits(int_part)
            || !all_digits(frac_part)
            || (unsigned.contains('.') && frac_part.is_empty())
        {
            return Err(ParsePriceError::Invalid(s.to_string()));
        }
        if frac_part.len() > 2 {
            return Err(ParsePriceError::TooPrecise(s.to_string()));
        }

        let out_of_range = || ParsePriceError::OutOfRange(s.to_string());
        let whole: i64 = int_part.parse().map_err(|_| out_of_range())?;
        let frac: i64 = match frac_part.len() {
            0 => 0,
            1 => frac_part.parse::<i64>().map_err(|_| out_of_range())? * 10,
            _ => frac_part.parse().map_err(|_| out_of_range())?,
        };
        let magnitude = whole
            .checked_mul(100)
            .and_then(|v| v.checked_add(frac))
            .ok_or_else(out_of_range)?;

        Ok(Self {
            hundredths: if negative { -magnitude } else { magnitude },
        })
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
