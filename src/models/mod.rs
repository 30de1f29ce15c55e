//! 数据模型模块
//! 用户记录、请求/响应 DTO 与统一响应信封

pub mod auth;
pub mod envelope;
pub mod user;
