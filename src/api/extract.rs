//! 请求体提取与验证
//!
//! 请求体解析为 JSON 对象后交给请求类型的 `validate`；
//! 任何失败都以字段错误映射返回 400，不会进入委托逻辑。

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::StatusCode,
};
use serde_json::{Map, Value};

use crate::{
    error::{AppError, GatewayError},
    infrastructure::validation::{json_type_name, FieldErrors, ValidateRequest},
};

/// 已验证的请求体
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: ValidateRequest + Send,
{
    type Rejection = GatewayError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                GatewayError::Fault(AppError::payload_too_large("Request body too large"))
            } else {
                GatewayError::Validation(FieldErrors::non_field(rejection.body_text()))
            }
        })?;

        let body = parse_object(&bytes)?;
        T::validate(&body).map(ValidatedJson).map_err(GatewayError::Validation)
    }
}

/// 空请求体视为空对象，由字段验证报告缺失字段
pub fn parse_object(bytes: &[u8]) -> Result<Map<String, Value>, FieldErrors> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(FieldErrors::non_field(format!(
            "Invalid data. Expected a dictionary, but got {}.",
            json_type_name(&other)
        ))),
        Err(e) => Err(FieldErrors::non_field(format!("JSON parse error - {}", e))),
    }
}
