//! Users page. Platform users and operator accounts are listed together:
//! both lists are fetched for the same page and shown as one table.

use uuid::Uuid;

use crate::api::users::{AdminList, UserFilters, UserList, ADMINS, USERS};
use crate::api::{Ack, ApiClient, Filters};
use crate::dialog::{ConfirmDialog, ConfirmOutcome, FormDialog, MutationContext, SubmitOutcome};
use crate::error::AppError;
use crate::format;
use crate::forms::{BalanceForm, UserForm};
use crate::models::page::total_pages;
use crate::models::user::{BalanceAdjustment, UserPayload};
use crate::models::{Currency, User, UserRole};
use crate::query::ResourceQuery;
use crate::table::{Column, DataTable, RenderedTable, SortValue, TableEvent};

use super::pagination;

const TOUCHES: &[&str] = &[USERS, ADMINS];

pub fn columns() -> Vec<Column<User>> {
    vec![
        Column::new("username", "Username", |u: &User| u.username.clone())
            .sortable(|u| SortValue::Text(u.username.clone()))
            .always_visible(),
        Column::new("wallet_address", "Wallet", |u: &User| {
            u.wallet_address
                .clone()
                .unwrap_or_else(|| format::DASH.to_string())
        }),
        Column::new("chips_balance", "Chips", |u: &User| {
            Currency::Chips.format_amount(u.chips_balance)
        })
        .sortable(|u| SortValue::Number(u.chips_balance)),
        Column::new("brokecoin_balance", "Brokecoin", |u: &User| {
            Currency::Brokecoin.format_amount(u.brokecoin_balance)
        })
        .sortable(|u| SortValue::Number(u.brokecoin_balance)),
        Column::new("role", "Role", |u: &User| u.role().label().to_string())
            .filterable(|u| u.role().as_str().to_string()),
        Column::new("status", "Status", |u: &User| {
            u.status
                .map_or_else(|| format::DASH.to_string(), |s| s.to_string())
        })
        .filterable(|u| u.status.map(|s| s.as_str().to_string()).unwrap_or_default()),
        Column::new("created_at", "Created", |u: &User| format::timestamp(&u.created_at))
            .sortable(|u| SortValue::Time(u.created_at.timestamp())),
        Column::new("last_login", "Last login", |u: &User| {
            u.last_login
                .as_ref()
                .map_or_else(|| format::DASH.to_string(), format::ago)
        })
        .sortable(|u| {
            u.last_login
                .map_or(SortValue::Missing, |at| SortValue::Time(at.timestamp()))
        }),
    ]
}

pub struct UsersPage {
    api: ApiClient,
    ctx: MutationContext,
    users: ResourceQuery<UserList>,
    admins: ResourceQuery<AdminList>,
    pub table: DataTable<User>,
    pub form: FormDialog<UserForm>,
    editing: Option<Uuid>,
    pub balance: FormDialog<BalanceForm>,
    pub delete: ConfirmDialog<User>,
}

impl UsersPage {
    pub fn new(api: ApiClient, ctx: MutationContext, page_size: u32) -> Self {
        let users = ResourceQuery::new(UserList(api.clone()), ctx.queries.clone())
            .with_page_size(page_size);
        let admins = ResourceQuery::new(AdminList(api.clone()), ctx.queries.clone())
            .with_page_size(page_size);
        let mut table = DataTable::new(columns());
        table.set_loading(true);
        UsersPage {
            api,
            ctx,
            users,
            admins,
            table,
            form: FormDialog::new(TOUCHES),
            editing: None,
            balance: FormDialog::new(TOUCHES),
            delete: ConfirmDialog::new(TOUCHES),
        }
    }

    /// Fetch both lists and merge them: users first, then admins.
    pub async fn load(&mut self) -> Result<(), AppError> {
        self.table.set_loading(true);
        let users = self.users.sync().await.map(|_| ());
        let admins = self.admins.sync().await.map(|_| ());

        let users_state = self.users.state();
        let admins_state = self.admins.state();
        let mut rows: Vec<User> = users_state
            .items
            .iter()
            .cloned()
            .map(|mut user| {
                user.role = Some(UserRole::User);
                user
            })
            .collect();
        rows.extend(admins_state.items.iter().cloned());

        let key = self.users.key();
        let page_count = total_pages(users_state.total + admins_state.total, key.page_size);
        self.table.set_data(
            rows,
            pagination(key, page_count),
            users_state.is_loading || admins_state.is_loading,
        );
        users.and(admins)
    }

    /// Point both lists at a page without loading it.
    pub fn configure(&mut self, filters: &UserFilters, page: u32, page_size: u32) {
        let filters = Filters::from(filters);
        self.users.set_filters(filters.clone());
        self.admins.set_filters(filters);
        self.users.set_page_size(page_size);
        self.admins.set_page_size(page_size);
        self.users.set_page(page);
        self.admins.set_page(page);
    }

    pub async fn handle(&mut self, event: TableEvent) -> Result<(), AppError> {
        let changed = match event {
            TableEvent::PageChanged(page) => {
                self.users.set_page(page) | self.admins.set_page(page)
            }
            TableEvent::PageSizeChanged(size) => {
                self.users.set_page_size(size) | self.admins.set_page_size(size)
            }
        };
        if changed {
            self.load().await?;
        }
        Ok(())
    }

    pub async fn filter(&mut self, filters: &UserFilters) -> Result<(), AppError> {
        let filters = Filters::from(filters);
        let changed =
            self.users.set_filters(filters.clone()) | self.admins.set_filters(filters);
        if changed {
            self.load().await?;
        }
        Ok(())
    }

    pub fn render(&self) -> RenderedTable {
        self.table.render()
    }

    pub fn open_add(&mut self) {
        self.editing = None;
        self.form.open();
    }

    pub fn open_edit(&mut self, user: &User) {
        self.editing = Some(user.id);
        self.form.open_with(UserForm::from(user));
    }

    pub fn editing(&self) -> Option<Uuid> {
        self.editing
    }

    /// Create or update, depending on how the form was opened.
    pub async fn save(&mut self) -> SubmitOutcome<Ack> {
        let normalized = self.form.values().clone().normalized();
        *self.form.values_mut() = normalized;

        let api = self.api.clone();
        let outcome = match self.editing {
            Some(id) => {
                self.form
                    .submit(&self.ctx, "User updated successfully", |form| async move {
                        api.update_user(id, &UserPayload::from(form)).await
                    })
                    .await
            }
            None => {
                self.form
                    .submit(&self.ctx, "User added successfully", |form| async move {
                        api.create_user(&UserPayload::from(form)).await
                    })
                    .await
            }
        };
        if outcome.is_saved() {
            self.editing = None;
        }
        outcome
    }

    pub fn open_balance(&mut self) {
        self.balance.open();
    }

    pub async fn adjust_balance(&mut self, user_id: Uuid) -> SubmitOutcome<Ack> {
        let api = self.api.clone();
        self.balance
            .submit(&self.ctx, "Balance updated successfully", |form| async move {
                api.adjust_balance(user_id, &BalanceAdjustment::from(form))
                    .await
            })
            .await
    }

    pub fn request_delete(&mut self, user: User) {
        self.delete.request(user);
    }

    pub fn cancel_delete(&mut self) {
        self.delete.cancel();
    }

    pub async fn confirm_delete(&mut self) -> ConfirmOutcome<Ack> {
        let api = self.api.clone();
        self.delete
            .confirm(&self.ctx, "User deleted successfully", |user| async move {
                api.delete_user(user.id).await
            })
            .await
    }
}
