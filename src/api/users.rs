use async_trait::async_trait;
use uuid::Uuid;

use super::{Ack, ApiClient, Filters};
use crate::error::AppError;
use crate::models::user::{BalanceAdjustment, UserPayload};
use crate::models::{Page, User, UserRole};
use crate::query::{PageSource, QueryKey};

pub const USERS: &str = "users";
pub const ADMINS: &str = "admins";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilters {
    pub role: Option<UserRole>,
}

impl From<&UserFilters> for Filters {
    fn from(f: &UserFilters) -> Self {
        let mut filters = Filters::new();
        filters.set("role", f.role);
        filters
    }
}

impl ApiClient {
    pub async fn list_users(
        &self,
        filters: &Filters,
        page: u32,
        limit: u32,
    ) -> Result<Page<User>, AppError> {
        self.get("/users", &filters.to_query(page, limit)).await
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User, AppError> {
        self.get(&format!("/users/{id}"), &[]).await
    }

    pub async fn create_user(&self, user: &UserPayload) -> Result<Ack, AppError> {
        self.post("/users", user).await
    }

    pub async fn update_user(&self, id: Uuid, user: &UserPayload) -> Result<Ack, AppError> {
        self.put(&format!("/users/{id}"), user).await
    }

    pub async fn delete_user(&self, id: Uuid) -> Result<Ack, AppError> {
        self.delete(&format!("/users/{id}")).await
    }

    pub async fn adjust_balance(
        &self,
        id: Uuid,
        adjustment: &BalanceAdjustment,
    ) -> Result<Ack, AppError> {
        self.post(&format!("/users/{id}/balance"), adjustment).await
    }

    /// Operator accounts. Rows without a role are admins.
    pub async fn list_admins(
        &self,
        filters: &Filters,
        page: u32,
        limit: u32,
    ) -> Result<Page<User>, AppError> {
        let page: Page<User> = self.get("/admins", &filters.to_query(page, limit)).await?;
        Ok(page.map(|mut admin| {
            admin.role.get_or_insert(UserRole::Admin);
            admin
        }))
    }
}

pub struct UserList(pub ApiClient);

#[async_trait]
impl PageSource for UserList {
    type Item = User;

    fn resource(&self) -> &'static str {
        USERS
    }

    async fn fetch_page(&self, key: &QueryKey) -> Result<Page<User>, AppError> {
        self.0.list_users(&key.filters, key.page, key.page_size).await
    }
}

pub struct AdminList(pub ApiClient);

#[async_trait]
impl PageSource for AdminList {
    type Item = User;

    fn resource(&self) -> &'static str {
        ADMINS
    }

    async fn fetch_page(&self, key: &QueryKey) -> Result<Page<User>, AppError> {
        self.0.list_admins(&key.filters, key.page, key.page_size).await
    }
}
