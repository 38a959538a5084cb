use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::{infrastructure::validation::FieldErrors, service::toolkit::ToolkitError};

/// 故障响应中返回给客户端的通用消息，不包含内部错误细节
pub const SAFE_FAULT_MESSAGE: &str = "The wallet toolkit could not complete the request";
pub const SAFE_TIMEOUT_MESSAGE: &str = "The wallet toolkit did not respond in time";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppErrorCode {
    // HTTP 基础错误码
    NotFound,
    PayloadTooLarge,
    Timeout,
    Internal,

    // 业务错误码
    ExternalServiceError,
}

impl AppErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppErrorCode::NotFound => "not_found",
            AppErrorCode::PayloadTooLarge => "payload_too_large",
            AppErrorCode::Timeout => "timeout",
            AppErrorCode::Internal => "internal",
            AppErrorCode::ExternalServiceError => "external_service_error",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppError {
    pub code: AppErrorCode,
    pub message: String,
    pub status: StatusCode,
    pub trace_id: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: &'a str,
    trace_id: Option<&'a str>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            code: self.code.as_str(),
            message: &self.message,
            trace_id: self.trace_id.as_deref(),
        };
        (self.status, Json(body)).into_response()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.code.as_str(), self.status, self.message)
    }
}

impl std::error::Error for AppError {}

impl AppError {
    fn with_code(code: AppErrorCode, status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            code,
            message: msg.into(),
            status,
            trace_id: None,
        }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::with_code(AppErrorCode::NotFound, StatusCode::NOT_FOUND, msg)
    }

    pub fn payload_too_large(msg: impl Into<String>) -> Self {
        Self::with_code(
            AppErrorCode::PayloadTooLarge,
            StatusCode::PAYLOAD_TOO_LARGE,
            msg,
        )
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_code(
            AppErrorCode::Internal,
            StatusCode::INTERNAL_SERVER_ERROR,
            msg,
        )
    }

    /// 工具调用超时：对外仍是 500
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::with_code(AppErrorCode::Timeout, StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    pub fn external_service_error(msg: impl Into<String>) -> Self {
        Self::with_code(
            AppErrorCode::ExternalServiceError,
            StatusCode::INTERNAL_SERVER_ERROR,
            msg,
        )
    }

    /// 设置追踪ID
    pub fn with_trace_id(mut self, trace_id: String) -> Self {
        self.trace_id = Some(trace_id);
        self
    }
}

/// 网关处理器的错误类型
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// 输入验证失败：400，响应体为字段错误映射
    #[error("validation failed: {0}")]
    Validation(FieldErrors),
    /// 工具自身的 4xx 拒绝：状态与响应体原样返回
    #[error("toolkit rejected request with status {status}")]
    Rejected { status: StatusCode, body: Value },
    #[error("{0}")]
    Fault(AppError),
}

impl GatewayError {
    /// 将工具错误映射到对外响应；故障只返回通用消息
    pub fn from_toolkit(err: ToolkitError, trace_id: Option<&str>) -> Self {
        let fault = match err {
            ToolkitError::Rejected { status, body } => {
                match StatusCode::from_u16(status) {
                    Ok(status) if status.is_client_error() => {
                        return GatewayError::Rejected { status, body }
                    }
                    _ => AppError::external_service_error(SAFE_FAULT_MESSAGE),
                }
            }
            ToolkitError::Timeout(_) => AppError::timeout(SAFE_TIMEOUT_MESSAGE),
            ToolkitError::Upstream(_) | ToolkitError::Decode(_) => {
                AppError::external_service_error(SAFE_FAULT_MESSAGE)
            }
            ToolkitError::Transport(_) => AppError::internal(SAFE_FAULT_MESSAGE),
        };
        match trace_id {
            Some(id) => GatewayError::Fault(fault.with_trace_id(id.to_string())),
            None => GatewayError::Fault(fault),
        }
    }
}

impl From<FieldErrors> for GatewayError {
    fn from(errors: FieldErrors) -> Self {
        GatewayError::Validation(errors)
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        match self {
            GatewayError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, Json(errors)).into_response()
            }
            GatewayError::Rejected { status, body } => (status, Json(body)).into_response(),
            GatewayError::Fault(err) => err.into_response(),
        }
    }
}
