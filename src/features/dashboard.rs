use crate::api::transactions::TransactionList;
use crate::api::ApiClient;
use crate::error::AppError;
use crate::format;
use crate::models::currency::format_number;
use crate::models::{SystemStats, Transaction};
use crate::query::{QueryClient, ResourceQuery};

/// How many transactions the "recent" panel shows.
pub const RECENT_LIMIT: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatCard {
    pub title: &'static str,
    pub value: String,
    /// Second line, only on the balance card.
    pub detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentTransaction {
    pub label: String,
    pub when: String,
    pub amount: String,
    pub status: String,
}

impl From<&Transaction> for RecentTransaction {
    fn from(t: &Transaction) -> Self {
        RecentTransaction {
            label: t.kind.label().to_string(),
            when: format::ago(&t.created_at),
            amount: t.display_amount(),
            status: t.status.to_string(),
        }
    }
}

pub struct Dashboard {
    api: ApiClient,
    stats: Option<SystemStats>,
    recent: ResourceQuery<TransactionList>,
}

impl Dashboard {
    pub fn new(api: ApiClient, queries: QueryClient) -> Self {
        let recent = ResourceQuery::new(TransactionList(api.clone()), queries)
            .with_page_size(RECENT_LIMIT);
        Dashboard {
            api,
            stats: None,
            recent,
        }
    }

    /// Stats and recent transactions load independently; the first error is
    /// returned after both were attempted.
    pub async fn load(&mut self) -> Result<(), AppError> {
        let stats = match self.api.system_stats().await {
            Ok(stats) => {
                self.stats = Some(stats);
                Ok(())
            }
            Err(e) => Err(e),
        };
        let recent = self.recent.sync().await.map(|_| ());
        stats.and(recent)
    }

    pub fn stats(&self) -> Option<&SystemStats> {
        self.stats.as_ref()
    }

    /// Four cards; placeholders until the stats arrive.
    pub fn cards(&self) -> Vec<StatCard> {
        let Some(stats) = &self.stats else {
            return ["Total Users", "Total Transactions", "Pending Transactions", "Total Balance"]
                .into_iter()
                .map(|title| StatCard {
                    title,
                    value: crate::table::SKELETON_CELL.to_string(),
                    detail: None,
                })
                .collect();
        };
        vec![
            StatCard {
                title: "Total Users",
                value: stats.total_users.to_string(),
                detail: None,
            },
            StatCard {
                title: "Total Transactions",
                value: stats.total_transactions.to_string(),
                detail: None,
            },
            StatCard {
                title: "Pending Transactions",
                value: stats.pending_transactions.to_string(),
                detail: None,
            },
            StatCard {
                title: "Total Balance",
                value: format!("{} BC", format_number(stats.total_balances.brokecoin)),
                detail: Some(format!("{} Chips", format_number(stats.total_balances.chips))),
            },
        ]
    }

    pub fn recent(&self) -> Vec<RecentTransaction> {
        self.recent
            .state()
            .items
            .iter()
            .map(RecentTransaction::from)
            .collect()
    }

    pub fn recent_loading(&self) -> bool {
        self.recent.state().is_loading
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    use crate::models::stats::TotalBalances;
    use crate::session::SessionStore;

    fn dashboard() -> Dashboard {
        let base = Url::parse("http://127.0.0.1:9/api").unwrap();
        let api = ApiClient::with_base_url(base, SessionStore::in_memory()).unwrap();
        Dashboard::new(api, QueryClient::new())
    }

    #[test]
    fn placeholder_cards_until_loaded() {
        let board = dashboard();
        let cards = board.cards();
        assert_eq!(cards.len(), 4);
        assert!(cards.iter().all(|c| c.value == crate::table::SKELETON_CELL));
        assert!(board.recent_loading());
    }

    #[test]
    fn balance_card_shows_both_currencies() {
        let mut board = dashboard();
        board.stats = Some(SystemStats {
            total_users: 12,
            total_transactions: 340,
            pending_transactions: 3,
            total_balances: TotalBalances {
                brokecoin: 1500.0,
                chips: 82000.5,
            },
        });
        let cards = board.cards();
        assert_eq!(cards[0].value, "12");
        assert_eq!(cards[3].value, "1500 BC");
        assert_eq!(cards[3].detail.as_deref(), Some("82000.5 Chips"));
    }
}
