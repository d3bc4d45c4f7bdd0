use async_trait::async_trait;

use crate::errors::ServiceError;

/// Repository abstraction over the category store.
///
/// Title uniqueness is guaranteed by the store; `find_or_create` must be
/// safe against two callers racing on the same new title.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn find_by_title(&self, title: &str) -> Result<Option<models::category::Model>, ServiceError>;
    async fn find_all(&self) -> Result<Vec<models::category::Model>, ServiceError>;
    async fn find_or_create(&self, title: &str) -> Result<models::category::Model, ServiceError>;
    /// Batch-create new titles in one store round-trip.
    async fn insert_many(&self, titles: Vec<String>) -> Result<Vec<models::category::Model>, ServiceError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use chrono::Utc;
    use models::category::Model;
    use std::sync::Mutex;
    use uuid::Uuid;

    #[derive(Default)]
    pub struct MockCategoryRepository {
        categories: Mutex<Vec<Model>>,
    }

    fn make_model(title: &str) -> Model {
        let now = Utc::now().into();
        Model { id: Uuid::new_v4(), title: title.to_string(), created_at: now, updated_at: now }
    }

    #[async_trait]
    impl CategoryRepository for MockCategoryRepository {
        async fn find_by_title(&self, title: &str) -> Result<Option<Model>, ServiceError> {
            let categories = self.categories.lock().unwrap();
            Ok(categories.iter().find(|c| c.title == title).cloned())
        }

        async fn find_all(&self) -> Result<Vec<Model>, ServiceError> {
            Ok(self.categories.lock().unwrap().clone())
        }

        async fn find_or_create(&self, title: &str) -> Result<Model, ServiceError> {
            let mut categories = self.categories.lock().unwrap();
            if let Some(found) = categories.iter().find(|c| c.title == title) {
                return Ok(found.clone());
            }
            let model = make_model(title);
            categories.push(model.clone());
            Ok(model)
        }

        async fn insert_many(&self, titles: Vec<String>) -> Result<Vec<Model>, ServiceError> {
            let mut categories = self.categories.lock().unwrap();
            // Mimic the unique key on title
            for title in &titles {
                if categories.iter().any(|c| &c.title == title) {
                    return Err(ServiceError::Db(format!(
                        "duplicate key value violates unique constraint: {}",
                        title
                    )));
                }
            }
            let models: Vec<Model> = titles.iter().map(|t| make_model(t)).collect();
            categories.extend(models.iter().cloned());
            Ok(models)
        }
    }
}
