//! 用户资源：模型、序列化、存储、服务与处理器

pub mod choices;
pub mod countries;
pub mod handler;
pub mod model;
#[cfg(feature = "database")]
pub mod pg_store;
pub mod serializer;
pub mod service;
pub mod store;
