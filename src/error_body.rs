use serde::Serialize;
use utoipa::ToSchema;

/// 故障响应体（仅用于 OpenAPI 文档）
#[derive(Serialize, ToSchema)]
pub struct ErrorBodyDoc {
    #[schema(example = "internal")]
    pub code: String,
    pub message: String,
    pub trace_id: Option<String>,
}
