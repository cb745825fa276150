use uuid::Uuid;

use crate::api::transactions::{TransactionFilters, TransactionList, TRANSACTIONS};
use crate::api::{Ack, ApiClient, Filters};
use crate::dialog::{FormDialog, MutationContext, SubmitOutcome};
use crate::error::AppError;
use crate::format;
use crate::forms::TransactionStatusForm;
use crate::models::Transaction;
use crate::query::ResourceQuery;
use crate::table::{Column, SortValue};

use super::ListView;

pub fn columns() -> Vec<Column<Transaction>> {
    vec![
        Column::new("id", "ID", |t: &Transaction| t.id.to_string()).always_visible(),
        Column::new("user", "User", |t: &Transaction| t.user_id.to_string()),
        Column::new("type", "Type", |t: &Transaction| t.kind.label().to_string())
            .filterable(|t| t.kind.as_str().to_string()),
        Column::new("amount", "Amount", Transaction::display_amount)
            .sortable(|t| SortValue::Number(t.amount)),
        Column::new("currency", "Currency", |t: &Transaction| {
            t.currency.label().to_string()
        })
        .filterable(|t| t.currency.as_str().to_string()),
        Column::new("status", "Status", |t: &Transaction| t.status.to_string())
            .filterable(|t| t.status.as_str().to_string()),
        Column::new("created_at", "Created", |t: &Transaction| format::ago(&t.created_at))
        .sortable(|t| SortValue::Time(t.created_at.timestamp())),
        Column::new("confirmed_at", "Confirmed", |t: &Transaction| {
            t.confirmed_at
                .as_ref()
                .map_or_else(|| format::DASH.to_string(), format::ago)
        })
        .sortable(|t| {
            t.confirmed_at
                .map_or(SortValue::Missing, |at| SortValue::Time(at.timestamp()))
        }),
    ]
}

pub struct TransactionsPage {
    api: ApiClient,
    ctx: MutationContext,
    pub list: ListView<TransactionList>,
    pub status: FormDialog<TransactionStatusForm>,
}

impl TransactionsPage {
    pub fn new(api: ApiClient, ctx: MutationContext, page_size: u32) -> Self {
        let query = ResourceQuery::new(TransactionList(api.clone()), ctx.queries.clone())
            .with_page_size(page_size);
        TransactionsPage {
            api,
            ctx,
            list: ListView::new(query, columns()),
            status: FormDialog::new(&[TRANSACTIONS]),
        }
    }

    pub async fn load(&mut self) -> Result<(), AppError> {
        self.list.refresh().await
    }

    pub async fn filter(&mut self, filters: &TransactionFilters) -> Result<(), AppError> {
        self.list.set_filters(Filters::from(filters)).await
    }

    pub fn open_status(&mut self, transaction: &Transaction) {
        self.status.open_with(TransactionStatusForm {
            status: transaction.status.clone(),
        });
    }

    pub async fn save_status(&mut self, id: Uuid) -> SubmitOutcome<Ack> {
        let api = self.api.clone();
        self.status
            .submit(&self.ctx, "Transaction status updated", |form| async move {
                api.update_transaction_status(id, &form.status).await
            })
            .await
    }
}
