//! `sex` 字段取值表
//!
//! 单字母代号与完整标签是不同的取值，但显示为同一个标签。写入时保留
//! 提交的原始取值，不做归一化。

use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sex {
    Man,
    Woman,
    Other,
    PreferNotToSay,
    M,
    W,
    O,
    P,
}

/// (取值, 原始记号, 显示标签)
const SEX_CHOICES: [(Sex, &str, &str); 8] = [
    (Sex::Man, "Man", "Man"),
    (Sex::Woman, "Woman", "Woman"),
    (Sex::Other, "Other", "Other"),
    (Sex::PreferNotToSay, "Prefer not to say", "Prefer not to say"),
    (Sex::M, "M", "Man"),
    (Sex::W, "W", "Woman"),
    (Sex::O, "O", "Other"),
    (Sex::P, "P", "Prefer not to say"),
];

impl Sex {
    /// 精确匹配（区分大小写）
    pub fn parse(token: &str) -> Option<Self> {
        SEX_CHOICES
            .iter()
            .find(|(_, raw, _)| *raw == token)
            .map(|(sex, _, _)| *sex)
    }

    pub fn as_str(self) -> &'static str {
        self.entry().1
    }

    pub fn label(self) -> &'static str {
        self.entry().2
    }

    /// 供管理后台下拉框使用
    pub fn choices() -> impl Iterator<Item = (&'static str, &'static str)> {
        SEX_CHOICES.iter().map(|(_, raw, label)| (*raw, *label))
    }

    fn entry(self) -> &'static (Sex, &'static str, &'static str) {
        // 表覆盖了所有变体
        SEX_CHOICES
            .iter()
            .find(|(sex, _, _)| *sex == self)
            .unwrap_or(&SEX_CHOICES[0])
    }
}

impl Serialize for Sex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
