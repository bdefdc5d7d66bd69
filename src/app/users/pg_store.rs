//! PostgreSQL 用户存储

use async_trait::async_trait;
use sqlx::postgres::PgPool;

use super::{
    choices::Sex,
    countries::Country,
    model::{User, UserFields},
    store::{StoreError, UserStore},
};

const COLUMNS: &str = "id, first_name, last_name, email, age, sex, country";

/// 与内存存储一致的字节序，不受数据库 locale 影响
const ORDERING: &str = r#"last_name COLLATE "C", id"#;

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    first_name: String,
    last_name: String,
    email: Option<String>,
    age: Option<i32>,
    sex: Option<String>,
    country: Option<String>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let corrupt = |reason: String| StoreError::CorruptRow { id: row.id, reason };

        let sex = match row.sex.as_deref() {
            Some(raw) => Some(Sex::parse(raw).ok_or_else(|| corrupt(format!("sex {:?}", raw)))?),
            None => None,
        };
        let country = match row.country.as_deref() {
            Some(raw) => Some(
                Country::lookup(raw).ok_or_else(|| corrupt(format!("country {:?}", raw)))?,
            ),
            None => None,
        };

        Ok(User::new(
            row.id,
            UserFields {
                first_name: row.first_name,
                last_name: row.last_name,
                email: row.email,
                age: row.age,
                sex,
                country,
            },
        ))
    }
}

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users ORDER BY {}",
            COLUMNS, ORDERING
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn get(&self, id: i64) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, UserRow>(&format!("SELECT {} FROM users WHERE id = $1", COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn insert(&self, fields: UserFields) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (first_name, last_name, email, age, sex, country) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            COLUMNS
        ))
        .bind(&fields.first_name)
        .bind(&fields.last_name)
        .bind(&fields.email)
        .bind(fields.age)
        .bind(fields.sex.map(Sex::as_str))
        .bind(fields.country.map(Country::code))
        .fetch_one(&self.pool)
        .await?;

        User::try_from(row)
    }

    async fn replace(&self, id: i64, fields: UserFields) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET first_name = $1, last_name = $2, email = $3, age = $4, \
             sex = $5, country = $6 WHERE id = $7 RETURNING {}",
            COLUMNS
        ))
        .bind(&fields.first_name)
        .bind(&fields.last_name)
        .bind(&fields.email)
        .bind(fields.age)
        .bind(fields.sex.map(Sex::as_str))
        .bind(fields.country.map(Country::code))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(User::try_from)
        .transpose()
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(sex: Option<&str>, country: Option<&str>) -> UserRow {
        UserRow {
            id: 7,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: None,
            age: Some(36),
            sex: sex.map(str::to_string),
            country: country.map(str::to_string),
        }
    }

    #[test]
    fn ordering_uses_byte_collation() {
        assert!(ORDERING.starts_with(r#"last_name COLLATE "C""#));
        assert!(ORDERING.ends_with(", id"));
    }

    #[test]
    fn rows_convert_to_users() {
        let user = User::try_from(row(Some("W"), Some("GB"))).unwrap();
        assert_eq!(user.id, 7);
        assert_eq!(user.fields.sex, Some(Sex::W));
        assert_eq!(user.fields.country.map(Country::code), Some("GB"));
    }

    #[test]
    fn unknown_stored_values_are_corrupt_rows() {
        let err = User::try_from(row(Some("Male"), None)).unwrap_err();
        assert!(matches!(err, StoreError::CorruptRow { id: 7, .. }));
    }
}
