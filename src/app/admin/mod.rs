//! 管理后台：用户列表、搜索、增删改

pub mod handler;
pub mod search;
pub mod templates;
