//! 统一响应信封
//! `{success, message?, code?, data?}`

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应，仅包含数据
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            message: None,
            code: None,
            data: Some(data),
        }
    }

    /// 成功响应，包含提示信息与数据
    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            code: None,
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// 仅包含提示信息的成功响应
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            code: None,
            data: None,
        }
    }

    /// 失败响应
    pub fn error(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            code: Some(code),
            data: None,
        }
    }
}
