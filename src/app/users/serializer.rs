//! 用户资源的序列化与反序列化
//!
//! 输出带自链接的扁平对象；输入先逐字段解析（必填、空值、类型、取值表），
//! 再交给 [`Validate`] 做长度、邮箱、年龄范围校验。任何字段失败都整体拒绝。

use serde::Serialize;
use serde_json::{Map, Value};
use validator::Validate;

use super::{
    choices::Sex,
    countries::Country,
    model::{User, UserFields},
};
use crate::core::{error::FieldErrors, extract::BaseUrl};

const REQUIRED: &str = "This field is required.";
const NOT_NULL: &str = "This field may not be null.";
const NOT_BLANK: &str = "This field may not be blank.";

/// 对外的 JSON 表示
#[derive(Debug, Clone, Serialize)]
pub struct UserRepresentation {
    pub url: String,
    #[serde(flatten)]
    pub user: User,
}

/// 写入模式：完整替换或在现有记录上合并
#[derive(Debug, Clone, Copy)]
pub enum WriteMode<'a> {
    Full,
    Partial(&'a User),
}

pub fn user_url(base_url: &BaseUrl, id: i64) -> String {
    base_url.join(&format!("/users/{}/", id))
}

pub fn to_representation(user: User, base_url: &BaseUrl) -> UserRepresentation {
    UserRepresentation {
        url: user_url(base_url, user.id),
        user,
    }
}

pub fn from_representation(data: &Value, mode: WriteMode<'_>) -> Result<UserFields, FieldErrors> {
    let Some(object) = data.as_object() else {
        let mut errors = FieldErrors::new();
        errors.add(
            "non_field_errors",
            format!(
                "Invalid data. Expected a dictionary, but got {}.",
                type_name(data)
            ),
        );
        return Err(errors);
    };

    let (mut fields, partial) = match mode {
        WriteMode::Full => (UserFields::default(), false),
        WriteMode::Partial(existing) => (existing.fields.clone(), true),
    };
    let mut errors = FieldErrors::new();
    let mut reader = FieldReader {
        object,
        partial,
        errors: &mut errors,
    };

    if let Some(Some(value)) = reader.read("first_name", true, parse_text) {
        fields.first_name = value;
    }
    if let Some(Some(value)) = reader.read("last_name", true, parse_text) {
        fields.last_name = value;
    }
    if let Some(value) = reader.read("email", false, parse_text) {
        fields.email = value;
    }
    if let Some(value) = reader.read("age", false, parse_age) {
        fields.age = value;
    }
    if let Some(value) = reader.read("sex", false, parse_sex) {
        fields.sex = value;
    }
    if let Some(value) = reader.read("country", false, parse_country) {
        fields.country = value;
    }

    if let Err(validation) = fields.validate() {
        errors.merge(validation.into());
    }

    errors.into_result().map(|_| fields)
}

struct FieldReader<'a> {
    object: &'a Map<String, Value>,
    partial: bool,
    errors: &'a mut FieldErrors,
}

impl FieldReader<'_> {
    /// 返回 `None` 表示保留原值；`Some(None)` 表示置空
    fn read<T>(
        &mut self,
        name: &str,
        required: bool,
        parse: fn(&Value) -> Result<Option<T>, String>,
    ) -> Option<Option<T>> {
        let value = match self.object.get(name) {
            None if self.partial => return None,
            None if required => {
                self.errors.add(name, REQUIRED);
                return None;
            }
            None | Some(Value::Null) if !required => return Some(None),
            None | Some(Value::Null) => {
                self.errors.add(name, NOT_NULL);
                return None;
            }
            Some(value) => value,
        };

        match parse(value) {
            Ok(Some(parsed)) => Some(Some(parsed)),
            Ok(None) if required => {
                self.errors.add(name, NOT_BLANK);
                None
            }
            Ok(None) => Some(None),
            Err(message) => {
                self.errors.add(name, message);
                None
            }
        }
    }
}

/// 字符串去首尾空白，空串视为未填写
fn parse_text(value: &Value) -> Result<Option<String>, String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return Err("Not a valid string.".to_string()),
    };
    Ok((!text.is_empty()).then_some(text))
}

/// 取值按字符串形式匹配，只接受规范写法的整数
fn parse_age(value: &Value) -> Result<Option<i32>, String> {
    let raw = match value {
        Value::String(s) if s.is_empty() => return Ok(None),
        Value::String(s) => s.clone(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        other => other.to_string(),
    };

    raw.parse::<i32>()
        .ok()
        .filter(|age| age.to_string() == raw)
        .map(Some)
        .ok_or_else(|| invalid_choice(&raw))
}

fn parse_sex(value: &Value) -> Result<Option<Sex>, String> {
    match value {
        Value::String(s) if s.is_empty() => Ok(None),
        Value::String(s) => Sex::parse(s).map(Some).ok_or_else(|| invalid_choice(s)),
        other => Err(invalid_choice(&other.to_string())),
    }
}

fn parse_country(value: &Value) -> Result<Option<Country>, String> {
    match value {
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => Country::lookup(s).map(Some).ok_or_else(|| invalid_choice(s)),
        other => Err(invalid_choice(&other.to_string())),
    }
}

fn invalid_choice(raw: &str) -> String {
    format!("\"{}\" is not a valid choice.", raw)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "NoneType",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}
