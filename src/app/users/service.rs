//! 用户业务服务

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use super::{
    model::User,
    serializer::{from_representation, WriteMode},
    store::UserStore,
};
use crate::core::error::CoreError;

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<User>, CoreError> {
        Ok(self.store.list().await?)
    }

    pub async fn retrieve(&self, id: i64) -> Result<User, CoreError> {
        self.store.get(id).await?.ok_or(CoreError::NotFound)
    }

    pub async fn create(&self, data: &Value) -> Result<User, CoreError> {
        let fields = from_representation(data, WriteMode::Full)?;
        let user = self.store.insert(fields).await?;
        info!("Created user: {} ({})", user.display_name(), user.id);
        Ok(user)
    }

    /// `partial` 为 true 时只修改提交的字段
    pub async fn update(&self, id: i64, data: &Value, partial: bool) -> Result<User, CoreError> {
        let existing = self.retrieve(id).await?;
        let mode = if partial {
            WriteMode::Partial(&existing)
        } else {
            WriteMode::Full
        };
        let fields = from_representation(data, mode)?;

        let user = self
            .store
            .replace(id, fields)
            .await?
            .ok_or(CoreError::NotFound)?;
        info!("Updated user: {} ({})", user.display_name(), user.id);
        Ok(user)
    }

    pub async fn delete(&self, id: i64) -> Result<(), CoreError> {
        if !self.store.delete(id).await? {
            return Err(CoreError::NotFound);
        }
        info!("Deleted user: {}", id);
        Ok(())
    }
}

/// 路径中的 id，无法解析时按不存在处理
pub fn parse_id(raw: &str) -> Result<i64, CoreError> {
    raw.parse::<i64>().map_err(|_| CoreError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::users::store::MemoryUserStore;
    use serde_json::json;

    fn service() -> UserService {
        UserService::new(Arc::new(MemoryUserStore::new()))
    }

    #[tokio::test]
    async fn create_then_retrieve_returns_same_record() {
        let service = service();
        let created = service
            .create(&json!({"first_name": "Alan", "last_name": "Turing", "age": 41}))
            .await
            .unwrap();
        let fetched = service.retrieve(created.id).await.unwrap();
        assert_eq!(created, fetched);
    }

    #[tokio::test]
    async fn invalid_update_leaves_record_untouched() {
        let service = service();
        let created = service
            .create(&json!({"first_name": "Alan", "last_name": "Turing", "age": 41}))
            .await
            .unwrap();

        let err = service
            .update(created.id, &json!({"age": 101}), true)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(service.retrieve(created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn missing_records_are_not_found() {
        let service = service();
        assert!(matches!(service.retrieve(1).await, Err(CoreError::NotFound)));
        assert!(matches!(
            service.update(1, &json!({}), true).await,
            Err(CoreError::NotFound)
        ));
        assert!(matches!(service.delete(1).await, Err(CoreError::NotFound)));
    }

    #[test]
    fn non_numeric_ids_are_not_found() {
        assert!(matches!(parse_id("abc"), Err(CoreError::NotFound)));
        assert_eq!(parse_id("12").unwrap(), 12);
    }
}
