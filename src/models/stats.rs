use serde::{Deserialize, Serialize};

/// `GET /admin/stats`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStats {
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub total_transactions: u64,
    #[serde(default)]
    pub pending_transactions: u64,
    #[serde(default)]
    pub total_balances: TotalBalances,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TotalBalances {
    #[serde(default, alias = "primary")]
    pub brokecoin: f64,
    #[serde(default)]
    pub chips: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_partial_stats() {
        let stats: SystemStats =
            serde_json::from_str(r#"{"totalUsers":12,"totalBalances":{"primary":40.5}}"#).unwrap();
        assert_eq!(stats.total_users, 12);
        assert_eq!(stats.pending_transactions, 0);
        assert_eq!(stats.total_balances.brokecoin, 40.5);
        assert_eq!(stats.total_balances.chips, 0.0);
    }
}
