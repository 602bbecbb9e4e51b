//! Pipeline 指标收集模块
//!
//! 记录 ingestion / dispatch 的运行指标，并在内存中聚合 manager 更新耗时。

use std::collections::BTreeMap;

use metrics::{counter, gauge, histogram};

/// 记录 webhook 接收
pub fn record_event_received() {
    counter!("pokealarm_events_received_total").increment(1);
}

/// 记录无法解析的请求体
pub fn record_malformed_payload() {
    counter!("pokealarm_payloads_malformed_total").increment(1);
}

/// 记录无法识别的事件类型
pub fn record_unrecognized_payload() {
    counter!("pokealarm_payloads_unrecognized_total").increment(1);
}

/// 记录队列深度
pub fn record_queue_depth(depth: usize) {
    gauge!("pokealarm_queue_depth").set(depth as f64);
}

/// 记录背压告警
pub fn record_backpressure_warning(depth: usize) {
    counter!("pokealarm_backpressure_warnings_total").increment(1);
    histogram!("pokealarm_backpressure_depth").record(depth as f64);
}

/// 记录事件分发结果
pub fn record_event_dispatched(sink_name: &str, kind: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "pokealarm_events_dispatched_total",
        "sink" => sink_name.to_string(),
        "kind" => kind.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// 记录单个 manager 的更新耗时
pub fn record_update_latency_ms(sink_name: &str, latency_ms: f64) {
    histogram!(
        "pokealarm_update_latency_ms",
        "sink" => sink_name.to_string()
    )
    .record(latency_ms);
}

/// Manager 更新耗时聚合器
///
/// 在内存中聚合耗时，便于在关闭时输出摘要。
#[derive(Debug, Clone, Default)]
pub struct UpdateLatencyAggregator {
    per_sink: BTreeMap<String, RunningStats>,
}

impl UpdateLatencyAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一次耗时 (同时上报到 metrics recorder)
    pub fn record(&mut self, sink_name: &str, latency_ms: f64) {
        record_update_latency_ms(sink_name, latency_ms);
        self.per_sink
            .entry(sink_name.to_string())
            .or_default()
            .push(latency_ms);
    }

    /// 各 manager 的耗时摘要 (按名称排序)
    pub fn summary(&self) -> Vec<(String, StatsSummary)> {
        self.per_sink
            .iter()
            .map(|(name, stats)| (name.clone(), StatsSummary::from(stats)))
            .collect()
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// 样本数量
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 均值
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// 标准差
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
