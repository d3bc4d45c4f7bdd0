use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use common::pagination::Pagination;
use models::transaction::{self, TransactionKind};

use crate::errors::ServiceError;
use crate::ledger::domain::{Balance, NewEntry};
use crate::ledger::repository::LedgerRepository;

/// SeaORM-backed ledger store.
pub struct SeaOrmLedgerRepository {
    pub db: DatabaseConnection,
}

/// One aggregate round-trip: value summed per kind. Generic over the
/// connection so it also runs inside the insert transaction.
async fn balance_query<C: ConnectionTrait>(conn: &C) -> Result<Balance, ServiceError> {
    let rows: Vec<(TransactionKind, Decimal)> = transaction::Entity::find()
        .select_only()
        .column(transaction::Column::Kind)
        .column_as(transaction::Column::Value.sum(), "value_sum")
        .group_by(transaction::Column::Kind)
        .into_tuple()
        .all(conn)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;

    let mut balance = Balance::zero();
    for (kind, sum) in rows {
        balance.apply(kind, sum);
    }
    Ok(balance)
}

fn to_active(m: &transaction::Model) -> transaction::ActiveModel {
    transaction::ActiveModel {
        id: Set(m.id),
        title: Set(m.title.clone()),
        value: Set(m.value),
        kind: Set(m.kind),
        category_id: Set(m.category_id),
        created_at: Set(m.created_at),
        updated_at: Set(m.updated_at),
    }
}

#[async_trait]
impl LedgerRepository for SeaOrmLedgerRepository {
    async fn balance(&self) -> Result<Balance, ServiceError> {
        balance_query(&self.db).await
    }

    async fn list_page(&self, opts: Pagination) -> Result<Vec<transaction::Model>, ServiceError> {
        let (page_idx, per_page) = opts.normalize();
        transaction::Entity::find()
            .order_by_asc(transaction::Column::CreatedAt)
            .order_by_asc(transaction::Column::Id)
            .paginate(&self.db, per_page)
            .fetch_page(page_idx)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))
    }

    async fn count(&self) -> Result<u64, ServiceError> {
        transaction::Entity::find()
            .count(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<transaction::Model>, ServiceError> {
        transaction::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))
    }

    async fn insert(&self, entry: NewEntry) -> Result<transaction::Model, ServiceError> {
        let txn = self.db.begin().await.map_err(|e| ServiceError::Db(e.to_string()))?;

        // Balance check and write share one transaction, so the check cannot
        // interleave with another committed outcome.
        if entry.kind == TransactionKind::Outcome {
            let balance = balance_query(&txn).await?;
            if balance.total - entry.value < Decimal::ZERO {
                txn.rollback().await.map_err(|e| ServiceError::Db(e.to_string()))?;
                return Err(ServiceError::InsufficientFunds);
            }
        }

        let created =
            transaction::create(&txn, &entry.title, entry.value, entry.kind, entry.category_id)
                .await?;
        txn.commit().await.map_err(|e| ServiceError::Db(e.to_string()))?;
        Ok(created)
    }

    async fn insert_many(&self, entries: Vec<NewEntry>) -> Result<Vec<transaction::Model>, ServiceError> {
        if entries.is_empty() {
            return Ok(Vec::new());
        }
        let now = Utc::now().into();
        let rows: Vec<transaction::Model> = entries
            .into_iter()
            .map(|e| transaction::Model {
                id: Uuid::new_v4(),
                title: e.title,
                value: e.value,
                kind: e.kind,
                category_id: e.category_id,
                created_at: now,
                updated_at: now,
            })
            .collect();
        let ams: Vec<transaction::ActiveModel> = rows.iter().map(to_active).collect();
        transaction::Entity::insert_many(ams)
            .exec(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        Ok(rows)
    }

    async fn remove(&self, entry: transaction::Model) -> Result<(), ServiceError> {
        transaction::Entity::delete_by_id(entry.id)
            .exec(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        Ok(())
    }
}
