//! # 用户管理服务
//!
//! 单一 User 资源的 REST 接口，包括：
//! - `/users/` 的增删改查，带自链接和可选分页
//! - `/api-token-auth/` 令牌签发与可选的令牌认证
//! - `/admin/` 基于 HTTP Basic 的管理后台
//! - 内存存储或 PostgreSQL 存储（`database` feature）

pub mod app;
pub mod core;
pub mod infrastructure;
pub mod router;

pub use infrastructure::config::Config;
pub use router::{build_router, AppState};
