//! Currency amounts.

use crate::error::PmoError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An amount of US dollars, stored in cents.
///
/// Parses from and prints as `$256.00`; the dollar sign is optional on input.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cash {
    cents: i64,
}

impl Cash {
    /// Zero dollars.
    pub const ZERO: Cash = Cash { cents: 0 };

    /// Creates an amount from cents.
    pub const fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Creates an amount of whole dollars.
    pub const fn dollars(dollars: i64) -> Self {
        Self {
            cents: dollars * 100,
        }
    }

    /// The amount in cents.
    pub const fn cents(&self) -> i64 {
        self.cents
    }

    /// Is the amount below zero?
    pub const fn is_negative(&self) -> bool {
        self.cents < 0
    }
}

impl FromStr for Cash {
    type Err = PmoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PmoError::InvalidCash(s.to_string());
        let text = s.trim();
        let (negative, text) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let text = text.strip_prefix('$').unwrap_or(text);
        let (whole, fraction) = match text.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (text, ""),
        };
        if whole.is_empty()
            || !whole.chars().all(|c| c.is_ascii_digit())
            || fraction.len() > 2
            || !fraction.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }
        let whole: i64 = whole.parse().map_err(|_| invalid())?;
        let fraction: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => fraction.parse().map_err(|_| invalid())?,
        };
        let cents = whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(fraction))
            .ok_or_else(invalid)?;
        Ok(Self {
            cents: if negative { -cents } else { cents },
        })
    }
}

impl TryFrom<String> for Cash {
    type Error = PmoError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Cash> for String {
    fn from(cash: Cash) -> Self {
        cash.to_string()
    }
}

impl fmt::Display for Cash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.cents < 0 { "-" } else { "" };
        let abs = self.cents.unsigned_abs();
        write!(f, "{sign}${}.{:02}", abs / 100, abs % 100)
    }
}

impl fmt::Debug for Cash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cash({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forms() {
        assert_eq!("$256".parse::<Cash>().unwrap(), Cash::dollars(256));
        assert_eq!("256".parse::<Cash>().unwrap(), Cash::dollars(256));
        assert_eq!("$12.5".parse::<Cash>().unwrap(), Cash::from_cents(1250));
        assert_eq!("$0.05".parse::<Cash>().unwrap(), Cash::from_cents(5));
        assert_eq!("-$3".parse::<Cash>().unwrap(), Cash::dollars(-3));
    }

    #[test]
    fn test_rejects_garbage() {
        for bad in ["", "$", "abc", "$1.234", "$1,00", "$-1", "1.2.3"] {
            assert!(bad.parse::<Cash>().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Cash::dollars(256).to_string(), "$256.00");
        assert_eq!(Cash::from_cents(1205).to_string(), "$12.05");
        assert_eq!(Cash::from_cents(-50).to_string(), "-$0.50");
        assert_eq!(Cash::ZERO.to_string(), "$0.00");
    }

    #[test]
    fn test_ordering() {
        assert!(Cash::dollars(300) > Cash::dollars(256));
        assert!(Cash::from_cents(-1) < Cash::ZERO);
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&Cash::dollars(64)).unwrap();
        assert_eq!(json, "\"$64.00\"");
        let back: Cash = serde_json::from_str("\"$64\"").unwrap();
        assert_eq!(back, Cash::dollars(64));
    }
}
