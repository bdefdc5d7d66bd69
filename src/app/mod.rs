//! 应用层

pub mod admin;
pub mod auth;
pub mod users;
