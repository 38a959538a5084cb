use std::{
    collections::HashMap,
    sync::{Mutex, OnceLock},
};

static METRICS: OnceLock<Mutex<MetricsState>> = OnceLock::new();

struct MetricsState {
    total: u64,
    errors: u64,
    per_endpoint: HashMap<String, u64>,
    per_endpoint_err: HashMap<String, u64>,
    // 工具调用成功/失败与时延统计（毫秒）
    upstream_ok: u64,
    upstream_err: u64,
    upstream_latency_sum_ms: u128,
    // 简易直方图分桶（毫秒）：<50, <100, <250, <500, <1000, >=1000
    upstream_hist_buckets: [u64; 6],
    // 按操作统计的工具调用次数
    per_operation: HashMap<&'static str, u64>,
}

fn state() -> &'static Mutex<MetricsState> {
    METRICS.get_or_init(|| {
        Mutex::new(MetricsState {
            total: 0,
            errors: 0,
            per_endpoint: HashMap::new(),
            per_endpoint_err: HashMap::new(),
            upstream_ok: 0,
            upstream_err: 0,
            upstream_latency_sum_ms: 0,
            upstream_hist_buckets: [0; 6],
            per_operation: HashMap::new(),
        })
    })
}

fn lock() -> std::sync::MutexGuard<'static, MetricsState> {
    match state().lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(), // 避免因锁污染导致 panic
    }
}

pub fn count_ok(endpoint: &str) {
    let mut s = lock();
    s.total += 1;
    *s.per_endpoint.entry(endpoint.to_string()).or_insert(0) += 1;
}

pub fn count_err(endpoint: &str) {
    let mut s = lock();
    s.total += 1;
    s.errors += 1;
    *s.per_endpoint.entry(endpoint.to_string()).or_insert(0) += 1;
    *s.per_endpoint_err.entry(endpoint.to_string()).or_insert(0) += 1;
}

pub fn observe_upstream_latency_ms(operation: &'static str, latency_ms: u128, ok: bool) {
    let mut s = lock();
    if ok {
        s.upstream_ok += 1;
    } else {
        s.upstream_err += 1;
    }
    *s.per_operation.entry(operation).or_insert(0) += 1;
    s.upstream_latency_sum_ms += latency_ms;
    let b = if latency_ms < 50 {
        0
    } else if latency_ms < 100 {
        1
    } else if latency_ms < 250 {
        2
    } else if latency_ms < 500 {
        3
    } else if latency_ms < 1000 {
        4
    } else {
        5
    };
    s.upstream_hist_buckets[b] += 1;
}

pub fn render_prometheus() -> String {
    let s = lock();
    let mut out = String::new();
    out.push_str("# HELP walletgate_requests_total Total requests\n");
    out.push_str("# TYPE walletgate_requests_total counter\n");
    out.push_str(&format!("walletgate_requests_total {}\n", s.total));

    out.push_str("# HELP walletgate_errors_total Total error responses\n");
    out.push_str("# TYPE walletgate_errors_total counter\n");
    out.push_str(&format!("walletgate_errors_total {}\n", s.errors));

    out.push_str("# HELP walletgate_endpoint_requests_total Requests per endpoint\n");
    out.push_str("# TYPE walletgate_endpoint_requests_total counter\n");
    for (k, v) in s.per_endpoint.iter() {
        out.push_str(&format!(
            "walletgate_endpoint_requests_total{{endpoint=\"{}\"}} {}\n",
            k, v
        ));
    }

    out.push_str("# HELP walletgate_endpoint_errors_total Errors per endpoint\n");
    out.push_str("# TYPE walletgate_endpoint_errors_total counter\n");
    for (k, v) in s.per_endpoint_err.iter() {
        out.push_str(&format!(
            "walletgate_endpoint_errors_total{{endpoint=\"{}\"}} {}\n",
            k, v
        ));
    }

    // 工具调用统计
    out.push_str("# HELP walletgate_toolkit_calls_total Toolkit calls per operation\n");
    out.push_str("# TYPE walletgate_toolkit_calls_total counter\n");
    for (k, v) in s.per_operation.iter() {
        out.push_str(&format!(
            "walletgate_toolkit_calls_total{{operation=\"{}\"}} {}\n",
            k, v
        ));
    }

    out.push_str("# HELP walletgate_upstream_requests_total Upstream requests\n");
    out.push_str("# TYPE walletgate_upstream_requests_total counter\n");
    out.push_str(&format!(
        "walletgate_upstream_requests_total{{result=\"ok\"}} {}\n",
        s.upstream_ok
    ));
    out.push_str(&format!(
        "walletgate_upstream_requests_total{{result=\"err\"}} {}\n",
        s.upstream_err
    ));

    out.push_str("# HELP walletgate_upstream_latency_ms_sum Sum of upstream latency in ms\n");
    out.push_str("# TYPE walletgate_upstream_latency_ms_sum counter\n");
    out.push_str(&format!(
        "walletgate_upstream_latency_ms_sum {}\n",
        s.upstream_latency_sum_ms
    ));

    out.push_str(
        "# HELP walletgate_upstream_latency_ms_bucket Upstream latency histogram buckets\n",
    );
    out.push_str("# TYPE walletgate_upstream_latency_ms_bucket histogram\n");
    // 累积桶
    let bounds = [50, 100, 250, 500, 1000];
    let mut cumulative = 0u64;
    for (i, bound) in bounds.iter().enumerate() {
        cumulative += s.upstream_hist_buckets[i];
        out.push_str(&format!(
            "walletgate_upstream_latency_ms_bucket{{le=\"{}\"}} {}\n",
            bound, cumulative
        ));
    }
    out.push_str(&format!(
        "walletgate_upstream_latency_ms_bucket{{le=\"+Inf\"}} {}\n",
        s.upstream_hist_buckets.iter().sum::<u64>()
    ));

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_contains_recorded_series() {
        count_ok("/metrics-test-ok");
        count_err("/metrics-test-err");
        observe_upstream_latency_ms("metrics_test_op", 120, true);

        let text = render_prometheus();
        assert!(text.contains("walletgate_endpoint_requests_total{endpoint=\"/metrics-test-ok\"}"));
        assert!(text.contains("walletgate_endpoint_errors_total{endpoint=\"/metrics-test-err\"} 1"));
        assert!(text.contains("walletgate_toolkit_calls_total{operation=\"metrics_test_op\"}"));
        assert!(text.contains("walletgate_upstream_latency_ms_bucket{le=\"+Inf\"}"));
    }
}
