use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, instrument};
use uuid::Uuid;

use common::pagination::Pagination;
use models::{category, transaction};

use crate::categories::repository::CategoryRepository;
use crate::errors::ServiceError;

use super::domain::{CreateTransactionInput, NewEntry, TransactionPage};
use super::repository::LedgerRepository;

/// Ledger business service independent of web framework.
pub struct TransactionService<L: LedgerRepository, C: CategoryRepository> {
    ledger: Arc<L>,
    categories: Arc<C>,
}

impl<L: LedgerRepository, C: CategoryRepository> TransactionService<L, C> {
    pub fn new(ledger: Arc<L>, categories: Arc<C>) -> Self {
        Self { ledger, categories }
    }

    /// Create one entry. An outcome that would drive the total balance
    /// negative is rejected with `InsufficientFunds` and nothing is
    /// persisted; income entries always pass the gate. The category is
    /// resolved by exact title, created on first reference.
    #[instrument(skip(self, input), fields(kind = ?input.kind, category = %input.category))]
    pub async fn create(&self, input: CreateTransactionInput) -> Result<transaction::Model, ServiceError> {
        transaction::validate_title(&input.title)?;
        transaction::validate_value(input.value)?;
        category::validate_title(&input.category)?;

        // Advisory fast-path; the store re-checks atomically on insert.
        let balance = self.ledger.balance().await?;
        if input.kind == transaction::TransactionKind::Outcome
            && balance.total - input.value < Decimal::ZERO
        {
            return Err(ServiceError::InsufficientFunds);
        }

        let resolved = self.categories.find_or_create(&input.category).await?;
        let created = self
            .ledger
            .insert(NewEntry {
                title: input.title,
                value: input.value,
                kind: input.kind,
                category_id: resolved.id,
            })
            .await?;
        info!(id = %created.id, "transaction_created");
        Ok(created)
    }

    /// Delete by id; unknown ids fail with `NotFound`. Deletion needs no
    /// balance re-check.
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let found = self
            .ledger
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("transaction"))?;
        self.ledger.remove(found).await?;
        info!(%id, "transaction_deleted");
        Ok(())
    }

    /// One page of entries plus the derived balance and the total count
    /// (surfaced by the HTTP layer as pagination metadata).
    pub async fn list(&self, opts: Pagination) -> Result<TransactionPage, ServiceError> {
        let total = self.ledger.count().await?;
        let transactions = self.ledger.list_page(opts).await?;
        let balance = self.ledger.balance().await?;
        Ok(TransactionPage { transactions, balance, total })
    }
}
