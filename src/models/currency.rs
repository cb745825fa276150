use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ParseEnumError;

/// The two ledger currencies tracked per user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    /// The primary coin.
    #[serde(alias = "primary")]
    Brokecoin,
    #[default]
    Chips,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Brokecoin => "brokecoin",
            Currency::Chips => "chips",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Currency::Brokecoin => "Brokecoin",
            Currency::Chips => "Chips",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Brokecoin => "₿",
            Currency::Chips => "🎰",
        }
    }

    /// Amount prefixed with the currency symbol, e.g. `🎰25`.
    pub fn format_amount(&self, amount: f64) -> String {
        format!("{}{}", self.symbol(), format_number(amount))
    }
}

/// Whole amounts print without a fractional part, like the backend sends them.
pub fn format_number(amount: f64) -> String {
    if amount.fract() == 0.0 && amount.abs() < 1e15 {
        format!("{}", amount as i64)
    } else {
        format!("{amount}")
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Currency {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "brokecoin" | "primary" => Ok(Currency::Brokecoin),
            "chips" => Ok(Currency::Chips),
            _ => Err(ParseEnumError::new("currency", s, "brokecoin, chips")),
        }
    }
}
