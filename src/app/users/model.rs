//! 用户数据模型

use serde::Serialize;
use validator::Validate;

use super::{choices::Sex, countries::Country};

/// 已持久化的用户
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: i64,
    #[serde(flatten)]
    pub fields: UserFields,
}

/// 除 `id` 以外的全部字段；写入前经过 [`Validate`] 校验
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Validate)]
pub struct UserFields {
    #[validate(length(max = 30, message = "Ensure this field has no more than 30 characters."))]
    pub first_name: String,

    #[validate(length(max = 30, message = "Ensure this field has no more than 30 characters."))]
    pub last_name: String,

    #[validate(
        email(message = "Enter a valid email address."),
        length(max = 30, message = "Ensure this field has no more than 30 characters.")
    )]
    pub email: Option<String>,

    #[validate(range(min = 15, max = 100, code = "invalid_choice"))]
    pub age: Option<i32>,

    pub sex: Option<Sex>,

    pub country: Option<Country>,
}

impl User {
    pub fn new(id: i64, fields: UserFields) -> Self {
        Self { id, fields }
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.fields.first_name, self.fields.last_name)
    }
}
