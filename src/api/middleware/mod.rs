pub mod trace_id;

// 别名
pub use trace_id::{trace_id_middleware, TraceId, TraceIdGenerator};
