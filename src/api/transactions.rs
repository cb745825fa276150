use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use super::{Ack, ApiClient, Filters};
use crate::error::AppError;
use crate::models::{Page, Transaction, TransactionStatus, TransactionType};
use crate::query::{PageSource, QueryKey};

pub const TRANSACTIONS: &str = "transactions";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilters {
    pub status: Option<TransactionStatus>,
    pub kind: Option<TransactionType>,
    pub wallet_address: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl From<&TransactionFilters> for Filters {
    fn from(f: &TransactionFilters) -> Self {
        let mut filters = Filters::new();
        filters.set("status", f.status.as_ref());
        filters.set("type", f.kind.as_ref());
        filters.set("wallet_address", f.wallet_address.as_ref());
        filters.set("start_date", f.start_date);
        filters.set("end_date", f.end_date);
        filters
    }
}

#[derive(Serialize)]
struct StatusChange<'a> {
    status: &'a str,
}

impl ApiClient {
    pub async fn list_transactions(
        &self,
        filters: &Filters,
        page: u32,
        limit: u32,
    ) -> Result<Page<Transaction>, AppError> {
        self.get("/transactions", &filters.to_query(page, limit)).await
    }

    pub async fn update_transaction_status(
        &self,
        id: Uuid,
        status: &TransactionStatus,
    ) -> Result<Ack, AppError> {
        let body = StatusChange {
            status: status.as_str(),
        };
        self.patch(&format!("/transactions/{id}/status"), &body).await
    }
}

pub struct TransactionList(pub ApiClient);

#[async_trait]
impl PageSource for TransactionList {
    type Item = Transaction;

    fn resource(&self) -> &'static str {
        TRANSACTIONS
    }

    async fn fetch_page(&self, key: &QueryKey) -> Result<Page<Transaction>, AppError> {
        self.0
            .list_transactions(&key.filters, key.page, key.page_size)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_use_backend_names() {
        let filters = Filters::from(&TransactionFilters {
            kind: Some(TransactionType::Bet),
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            ..Default::default()
        });
        assert_eq!(filters.get("type"), Some("bet"));
        assert_eq!(filters.get("start_date"), Some("2024-03-01"));
        assert_eq!(filters.get("status"), None);
    }
}
