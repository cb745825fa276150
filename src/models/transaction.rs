use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Currency, ParseEnumError};

/// Kind of ledger movement. Types the console does not know are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransactionType {
    PurchaseChips,
    CashoutChips,
    Bet,
    Win,
    Refund,
    Other(String),
}

impl TransactionType {
    pub fn as_str(&self) -> &str {
        match self {
            TransactionType::PurchaseChips => "purchase_chips",
            TransactionType::CashoutChips => "cashout_chips",
            TransactionType::Bet => "bet",
            TransactionType::Win => "win",
            TransactionType::Refund => "refund",
            TransactionType::Other(raw) => raw,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            TransactionType::PurchaseChips => "Purchase Chips",
            TransactionType::CashoutChips => "Cashout Chips",
            TransactionType::Bet => "Bet",
            TransactionType::Win => "Win",
            TransactionType::Refund => "Refund",
            TransactionType::Other(raw) => raw,
        }
    }
}

impl From<String> for TransactionType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "purchase_chips" | "purchase" => TransactionType::PurchaseChips,
            "cashout_chips" | "cashout" => TransactionType::CashoutChips,
            "bet" => TransactionType::Bet,
            "win" => TransactionType::Win,
            "refund" => TransactionType::Refund,
            _ => TransactionType::Other(raw),
        }
    }
}

impl From<TransactionType> for String {
    fn from(kind: TransactionType) -> Self {
        match kind {
            TransactionType::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for TransactionType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match TransactionType::from(s.trim().to_ascii_lowercase()) {
            TransactionType::Other(_) => Err(ParseEnumError::new(
                "transaction type",
                s,
                "purchase_chips, cashout_chips, bet, win, refund",
            )),
            known => Ok(known),
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
    Cancelled,
    Other(String),
}

impl TransactionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Failed => "failed",
            TransactionStatus::Cancelled => "cancelled",
            TransactionStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for TransactionStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "pending" => TransactionStatus::Pending,
            "completed" => TransactionStatus::Completed,
            "failed" => TransactionStatus::Failed,
            "cancelled" => TransactionStatus::Cancelled,
            _ => TransactionStatus::Other(raw),
        }
    }
}

impl From<TransactionStatus> for String {
    fn from(status: TransactionStatus) -> Self {
        match status {
            TransactionStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for TransactionStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match TransactionStatus::from(s.trim().to_ascii_lowercase()) {
            TransactionStatus::Other(_) => Err(ParseEnumError::new(
                "transaction status",
                s,
                "pending, completed, failed, cancelled",
            )),
            known => Ok(known),
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ids are UUIDs as issued by the backend; anything else is a decode error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: f64,
    #[serde(default)]
    pub currency: Currency,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
}

impl Transaction {
    pub fn display_amount(&self) -> String {
        self.currency.format_amount(self.amount)
    }
}
