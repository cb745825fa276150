use super::ApiClient;
use crate::error::AppError;
use crate::models::SystemStats;

impl ApiClient {
    pub async fn system_stats(&self) -> Result<SystemStats, AppError> {
        self.get("/stats", &[]).await
    }
}
