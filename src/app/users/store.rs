//! 用户存储

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::model::{User, UserFields};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[cfg(feature = "database")]
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("stored row {id} is invalid: {reason}")]
    CorruptRow { id: i64, reason: String },
}

/// 存储接口
///
/// `list` 按 `last_name` 的字节序升序返回（大写字母排在小写之前），同名按
/// `id` 升序。
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn list(&self) -> Result<Vec<User>, StoreError>;

    async fn get(&self, id: i64) -> Result<Option<User>, StoreError>;

    async fn insert(&self, fields: UserFields) -> Result<User, StoreError>;

    /// 记录不存在时返回 `None`
    async fn replace(&self, id: i64, fields: UserFields) -> Result<Option<User>, StoreError>;

    /// 返回是否删除了记录
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;
}

/// 内存存储，id 自增且不复用
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    table: RwLock<MemoryTable>,
}

#[derive(Debug, Default)]
struct MemoryTable {
    rows: BTreeMap<i64, User>,
    last_id: i64,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let table = self.table.read().await;
        // BTreeMap 按 id 迭代，稳定排序保证同名记录按 id 排列
        let mut users: Vec<User> = table.rows.values().cloned().collect();
        users.sort_by(|a, b| a.fields.last_name.cmp(&b.fields.last_name));
        Ok(users)
    }

    async fn get(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn insert(&self, fields: UserFields) -> Result<User, StoreError> {
        let mut table = self.table.write().await;
        table.last_id += 1;
        let user = User::new(table.last_id, fields);
        table.rows.insert(user.id, user.clone());
        Ok(user)
    }

    async fn replace(&self, id: i64, fields: UserFields) -> Result<Option<User>, StoreError> {
        let mut table = self.table.write().await;
        Ok(table.rows.get_mut(&id).map(|user| {
            user.fields = fields;
            user.clone()
        }))
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.table.write().await.rows.remove(&id).is_some())
    }
}
