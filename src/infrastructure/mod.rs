//! 基础设施层：配置、日志、数据库连接

pub mod config;
#[cfg(feature = "database")]
pub mod database;
pub mod logger;
