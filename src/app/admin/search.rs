//! 管理后台的搜索
//!
//! 查询串按空白拆分；每个词必须（不区分大小写）出现在任一可搜索字段中。

use crate::app::users::model::User;

pub fn split_terms(query: &str) -> Vec<String> {
    query.split_whitespace().map(str::to_lowercase).collect()
}

pub fn matches(user: &User, terms: &[String]) -> bool {
    let haystacks = searchable_values(user);
    terms
        .iter()
        .all(|term| haystacks.iter().any(|value| value.contains(term.as_str())))
}

/// first_name, last_name, email, sex, age
fn searchable_values(user: &User) -> Vec<String> {
    let fields = &user.fields;
    let mut values = vec![fields.first_name.to_lowercase(), fields.last_name.to_lowercase()];
    values.extend(fields.email.as_ref().map(|email| email.to_lowercase()));
    values.extend(fields.sex.map(|sex| sex.as_str().to_lowercase()));
    values.extend(fields.age.map(|age| age.to_string()));
    values
}
