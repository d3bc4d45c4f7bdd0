use async_trait::async_trait;
use uuid::Uuid;

use common::pagination::Pagination;

use super::domain::{Balance, NewEntry};
use crate::errors::ServiceError;

/// Repository abstraction over the transaction store.
///
/// `insert` owns the solvency invariant: implementations must make the
/// balance check and the outcome write a single atomic unit, returning
/// `InsufficientFunds` when the resulting total would go negative.
/// `insert_many` is the bulk-import path and performs no balance check.
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    async fn balance(&self) -> Result<Balance, ServiceError>;
    async fn list_page(&self, opts: Pagination) -> Result<Vec<models::transaction::Model>, ServiceError>;
    async fn count(&self) -> Result<u64, ServiceError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<models::transaction::Model>, ServiceError>;
    async fn insert(&self, entry: NewEntry) -> Result<models::transaction::Model, ServiceError>;
    async fn insert_many(&self, entries: Vec<NewEntry>) -> Result<Vec<models::transaction::Model>, ServiceError>;
    async fn remove(&self, entry: models::transaction::Model) -> Result<(), ServiceError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use chrono::Utc;
    use models::transaction::{Model, TransactionKind};
    use rust_decimal::Decimal;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockLedgerRepository {
        entries: Mutex<Vec<Model>>, // insertion order is the listing order
    }

    impl MockLedgerRepository {
        fn fold(entries: &[Model]) -> Balance {
            let mut balance = Balance::zero();
            for e in entries {
                balance.apply(e.kind, e.value);
            }
            balance
        }

        fn make_model(entry: &NewEntry) -> Model {
            let now = Utc::now().into();
            Model {
                id: Uuid::new_v4(),
                title: entry.title.clone(),
                value: entry.value,
                kind: entry.kind,
                category_id: entry.category_id,
                created_at: now,
                updated_at: now,
            }
        }
    }

    #[async_trait]
    impl LedgerRepository for MockLedgerRepository {
        async fn balance(&self) -> Result<Balance, ServiceError> {
            let entries = self.entries.lock().unwrap();
            Ok(Self::fold(&entries))
        }

        async fn list_page(&self, opts: Pagination) -> Result<Vec<Model>, ServiceError> {
            let (page_idx, per_page) = opts.normalize();
            let entries = self.entries.lock().unwrap();
            Ok(entries
                .iter()
                .skip((page_idx * per_page) as usize)
                .take(per_page as usize)
                .cloned()
                .collect())
        }

        async fn count(&self) -> Result<u64, ServiceError> {
            Ok(self.entries.lock().unwrap().len() as u64)
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<Model>, ServiceError> {
            let entries = self.entries.lock().unwrap();
            Ok(entries.iter().find(|e| e.id == id).cloned())
        }

        async fn insert(&self, entry: NewEntry) -> Result<Model, ServiceError> {
            let mut entries = self.entries.lock().unwrap();
            if entry.kind == TransactionKind::Outcome {
                let balance = Self::fold(&entries);
                if balance.total - entry.value < Decimal::ZERO {
                    return Err(ServiceError::InsufficientFunds);
                }
            }
            let model = Self::make_model(&entry);
            entries.push(model.clone());
            Ok(model)
        }

        async fn insert_many(&self, new: Vec<NewEntry>) -> Result<Vec<Model>, ServiceError> {
            let mut entries = self.entries.lock().unwrap();
            let models: Vec<Model> = new.iter().map(Self::make_model).collect();
            entries.extend(models.iter().cloned());
            Ok(models)
        }

        async fn remove(&self, entry: Model) -> Result<(), ServiceError> {
            let mut entries = self.entries.lock().unwrap();
            entries.retain(|e| e.id != entry.id);
            Ok(())
        }
    }
}
