//! 账户、令牌签发与认证中间件

pub mod handler;
pub mod middleware;
pub mod service;
