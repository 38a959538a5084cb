//! 访问日志集成测试
//!
//! 单独的测试二进制：捕获 tracing 输出，避免与其它测试共享订阅者

mod common;

use std::{
    io,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use tower::ServiceExt as _;

use common::{build_app, MockToolkit, Mode};

/// 写入共享缓冲区的日志输出
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_access_log_carries_trace_id() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let app = build_app(MockToolkit::new(Mode::Normal), Duration::from_secs(2));

    // 客户端提供的 trace id
    let request = Request::builder()
        .method(Method::GET)
        .uri("/blockchain-choices")
        .header("x-trace-id", "trace-log-42")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // 服务端生成的 trace id
    let request = Request::builder()
        .method(Method::GET)
        .uri("/healthz")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let generated = response.headers()["x-trace-id"]
        .to_str()
        .unwrap()
        .to_string();

    let text = logs.text();
    let lines: Vec<&str> = text
        .lines()
        .filter(|line| line.contains("http_request"))
        .collect();
    assert_eq!(lines.len(), 2, "captured: {}", text);
    assert!(lines[0].contains("trace_id=trace-log-42"), "{}", lines[0]);
    assert!(lines[0].contains("path=/blockchain-choices"));
    assert!(
        lines[1].contains(&format!("trace_id={}", generated)),
        "{}",
        lines[1]
    );
    assert!(!text.contains("trace_id=-"));
}
