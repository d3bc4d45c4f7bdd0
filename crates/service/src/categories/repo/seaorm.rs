use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use models::category;

use crate::categories::repository::CategoryRepository;
use crate::errors::ServiceError;

/// SeaORM-backed category store.
pub struct SeaOrmCategoryRepository {
    pub db: DatabaseConnection,
}

#[async_trait]
impl CategoryRepository for SeaOrmCategoryRepository {
    async fn find_by_title(&self, title: &str) -> Result<Option<category::Model>, ServiceError> {
        Ok(category::find_by_title(&self.db, title).await?)
    }

    async fn find_all(&self) -> Result<Vec<category::Model>, ServiceError> {
        category::Entity::find()
            .all(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))
    }

    async fn find_or_create(&self, title: &str) -> Result<category::Model, ServiceError> {
        if let Some(found) = category::find_by_title(&self.db, title).await? {
            return Ok(found);
        }
        match category::create(&self.db, title).await {
            Ok(created) => Ok(created),
            // Lost the race on the unique title key; the winner's row exists now
            Err(models::errors::ModelError::Db(_)) => category::find_by_title(&self.db, title)
                .await?
                .ok_or_else(|| ServiceError::Db(format!("category '{}' missing after conflict", title))),
            Err(e) => Err(ServiceError::from(e)),
        }
    }

    async fn insert_many(&self, titles: Vec<String>) -> Result<Vec<category::Model>, ServiceError> {
        if titles.is_empty() {
            return Ok(Vec::new());
        }
        for title in &titles {
            category::validate_title(title)?;
        }
        let now = Utc::now().into();
        let rows: Vec<category::Model> = titles
            .into_iter()
            .map(|title| category::Model { id: Uuid::new_v4(), title, created_at: now, updated_at: now })
            .collect();
        let ams: Vec<category::ActiveModel> = rows
            .iter()
            .map(|m| category::ActiveModel {
                id: Set(m.id),
                title: Set(m.title.clone()),
                created_at: Set(m.created_at),
                updated_at: Set(m.updated_at),
            })
            .collect();
        category::Entity::insert_many(ams)
            .exec(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        Ok(rows)
    }
}
