// ABOUTME: Injected metrics sink with a no-op and an in-memory recording implementation
// ABOUTME: The recording sink renders the Prometheus text exposition format for GET /metrics
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Operational metrics
//!
//! Everything that wants to record a metric receives an `Arc<dyn MetricsSink>`
//! from [`crate::resources::ServerResources`]; there is no global registry.

use std::fmt::Write as _;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use uuid::Uuid;

/// Destination for operational metrics
pub trait MetricsSink: Send + Sync {
    /// One finished HTTP request; `endpoint` is the matched route template
    fn record_http_request(&self, method: &str, endpoint: &str, status: u16, duration: Duration);

    /// One database operation
    fn record_db_query(&self, operation: &str, success: bool, duration: Duration);

    /// A training request entered `status`
    fn record_training_request(&self, status: &str);

    /// Current workload of a mentor
    fn set_mentor_workload(&self, mentor_id: Uuid, workload: i64);

    /// A learning process was created
    fn learning_started(&self);

    /// A learning process was completed with `rating`
    fn learning_completed(&self, rating: i64);

    /// Connection pool occupancy, sampled when metrics are scraped
    fn set_db_connections(&self, active: u32, idle: u32);

    /// Prometheus text exposition; empty when nothing is recorded
    fn render(&self) -> String {
        String::new()
    }
}

/// Sink that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn record_http_request(&self, _: &str, _: &str, _: u16, _: Duration) {}
    fn record_db_query(&self, _: &str, _: bool, _: Duration) {}
    fn record_training_request(&self, _: &str) {}
    fn set_mentor_workload(&self, _: Uuid, _: i64) {}
    fn learning_started(&self) {}
    fn learning_completed(&self, _: i64) {}
    fn set_db_connections(&self, _: u32, _: u32) {}
}

/// Upper bounds of the HTTP latency buckets, in microseconds
const HTTP_BUCKETS_MICROS: &[u64] = &[
    5_000, 10_000, 25_000, 50_000, 100_000, 250_000, 500_000, 1_000_000, 2_500_000, 5_000_000,
    10_000_000,
];

/// Upper bounds of the database latency buckets, in microseconds
const DB_BUCKETS_MICROS: &[u64] = &[
    1_000, 5_000, 10_000, 25_000, 50_000, 100_000, 250_000, 500_000, 1_000_000,
];

/// Fixed-bucket latency histogram
#[derive(Debug)]
struct Histogram {
    bounds: &'static [u64],
    buckets: Vec<AtomicU64>,
    sum_micros: AtomicU64,
    count: AtomicU64,
}

impl Histogram {
    fn new(bounds: &'static [u64]) -> Self {
        Self {
            bounds,
            buckets: bounds.iter().map(|_| AtomicU64::new(0)).collect(),
            sum_micros: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    fn observe(&self, value_micros: u64) {
        // Values past the last bound only show up in +Inf
        if let Some(slot) = self.bounds.iter().position(|&bound| value_micros <= bound) {
            self.buckets[slot].fetch_add(1, Ordering::Relaxed);
        }
        self.sum_micros.fetch_add(value_micros, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    fn sum_seconds(&self) -> f64 {
        self.sum_micros.load(Ordering::Relaxed) as f64 / 1_000_000.0
    }

    fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Cumulative counts paired with their `le` label
    fn cumulative(&self) -> Vec<(String, u64)> {
        let mut running = 0;
        let mut rows: Vec<(String, u64)> = self
            .bounds
            .iter()
            .zip(&self.buckets)
            .map(|(bound, bucket)| {
                running += bucket.load(Ordering::Relaxed);
                ((*bound as f64 / 1_000_000.0).to_string(), running)
            })
            .collect();
        rows.push(("+Inf".to_owned(), self.count()));
        rows
    }
}

/// One rendered histogram series: label set, cumulative buckets, sum, count
type HistogramRow = (String, Vec<(String, u64)>, f64, u64);

fn micros(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}

/// In-memory sink backing the `/metrics` endpoint
#[derive(Debug, Default)]
pub struct RecordingMetrics {
    http_requests: DashMap<(String, String, u16), AtomicU64>,
    http_durations: DashMap<(String, String), Histogram>,
    db_queries: DashMap<(String, bool), AtomicU64>,
    db_durations: DashMap<String, Histogram>,
    training_requests: DashMap<String, AtomicU64>,
    mentor_workload: DashMap<Uuid, AtomicI64>,
    learnings_active: AtomicI64,
    learnings_completed: AtomicU64,
    feedback_sum: AtomicU64,
    feedback_count: AtomicU64,
    db_connections_active: AtomicU64,
    db_connections_idle: AtomicU64,
}

impl RecordingMetrics {
    /// Empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests counted for a method, route, and status
    #[must_use]
    pub fn http_request_count(&self, method: &str, endpoint: &str, status: u16) -> u64 {
        self.http_requests
            .get(&(method.to_owned(), endpoint.to_owned(), status))
            .map_or(0, |c| c.load(Ordering::Relaxed))
    }

    /// Last reported workload of a mentor
    #[must_use]
    pub fn mentor_workload(&self, mentor_id: Uuid) -> Option<i64> {
        self.mentor_workload
            .get(&mentor_id)
            .map(|w| w.load(Ordering::Relaxed))
    }

    /// Learning processes started and not yet completed since startup
    #[must_use]
    pub fn active_learnings(&self) -> i64 {
        self.learnings_active.load(Ordering::Relaxed)
    }

    fn render_counters(out: &mut String, name: &str, help: &str, rows: Vec<(String, u64)>) {
        let _ = writeln!(out, "# HELP {name} {help}");
        let _ = writeln!(out, "# TYPE {name} counter");
        for (labels, value) in rows {
            let _ = writeln!(out, "{name}{labels} {value}");
        }
    }

    fn render_gauge(out: &mut String, name: &str, help: &str, value: u64) {
        let _ = writeln!(out, "# HELP {name} {help}");
        let _ = writeln!(out, "# TYPE {name} gauge");
        let _ = writeln!(out, "{name} {value}");
    }

    /// `labels` of each row are the inner label list without braces
    fn render_histogram(out: &mut String, name: &str, help: &str, rows: Vec<HistogramRow>) {
        let _ = writeln!(out, "# HELP {name} {help}");
        let _ = writeln!(out, "# TYPE {name} histogram");
        for (labels, buckets, sum, count) in rows {
            for (le, cumulative) in buckets {
                let _ = writeln!(out, "{name}_bucket{{{labels},le=\"{le}\"}} {cumulative}");
            }
            let _ = writeln!(out, "{name}_sum{{{labels}}} {sum}");
            let _ = writeln!(out, "{name}_count{{{labels}}} {count}");
        }
    }
}

impl MetricsSink for RecordingMetrics {
    fn record_http_request(&self, method: &str, endpoint: &str, status: u16, duration: Duration) {
        self.http_requests
            .entry((method.to_owned(), endpoint.to_owned(), status))
            .or_default()
            .fetch_add(1, Ordering::Relaxed);
        self.http_durations
            .entry((method.to_owned(), endpoint.to_owned()))
            .or_insert_with(|| Histogram::new(HTTP_BUCKETS_MICROS))
            .observe(micros(duration));
    }

    fn record_db_query(&self, operation: &str, success: bool, duration: Duration) {
        self.db_queries
            .entry((operation.to_owned(), success))
            .or_default()
            .fetch_add(1, Ordering::Relaxed);
        self.db_durations
            .entry(operation.to_owned())
            .or_insert_with(|| Histogram::new(DB_BUCKETS_MICROS))
            .observe(micros(duration));
    }

    fn record_training_request(&self, status: &str) {
        self.training_requests
            .entry(status.to_owned())
            .or_default()
            .fetch_add(1, Ordering::Relaxed);
    }

    fn set_mentor_workload(&self, mentor_id: Uuid, workload: i64) {
        self.mentor_workload
            .entry(mentor_id)
            .or_default()
            .store(workload, Ordering::Relaxed);
    }

    fn learning_started(&self) {
        self.learnings_active.fetch_add(1, Ordering::Relaxed);
    }

    fn learning_completed(&self, rating: i64) {
        self.learnings_active.fetch_sub(1, Ordering::Relaxed);
        self.learnings_completed.fetch_add(1, Ordering::Relaxed);
        self.feedback_sum
            .fetch_add(u64::try_from(rating).unwrap_or(0), Ordering::Relaxed);
        self.feedback_count.fetch_add(1, Ordering::Relaxed);
    }

    fn set_db_connections(&self, active: u32, idle: u32) {
        self.db_connections_active
            .store(u64::from(active), Ordering::Relaxed);
        self.db_connections_idle.store(u64::from(idle), Ordering::Relaxed);
    }

    fn render(&self) -> String {
        let mut out = String::new();

        let mut rows: Vec<(String, u64)> = self
            .http_requests
            .iter()
            .map(|e| {
                let (method, endpoint, status) = e.key();
                (
                    format!("{{method=\"{method}\",endpoint=\"{endpoint}\",status=\"{status}\"}}"),
                    e.value().load(Ordering::Relaxed),
                )
            })
            .collect();
        rows.sort();
        Self::render_counters(&mut out, "http_requests_total", "Total HTTP requests", rows);

        let mut rows: Vec<HistogramRow> = self
            .http_durations
            .iter()
            .map(|e| {
                let (method, endpoint) = e.key();
                (
                    format!("method=\"{method}\",endpoint=\"{endpoint}\""),
                    e.value().cumulative(),
                    e.value().sum_seconds(),
                    e.value().count(),
                )
            })
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        Self::render_histogram(
            &mut out,
            "http_request_duration_seconds",
            "HTTP request latency",
            rows,
        );

        let mut rows: Vec<(String, u64)> = self
            .db_queries
            .iter()
            .map(|e| {
                let (operation, success) = e.key();
                (
                    format!("{{operation=\"{operation}\",success=\"{success}\"}}"),
                    e.value().load(Ordering::Relaxed),
                )
            })
            .collect();
        rows.sort();
        Self::render_counters(&mut out, "db_queries_total", "Total database operations", rows);

        let mut rows: Vec<HistogramRow> = self
            .db_durations
            .iter()
            .map(|e| {
                (
                    format!("operation=\"{}\"", e.key()),
                    e.value().cumulative(),
                    e.value().sum_seconds(),
                    e.value().count(),
                )
            })
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        Self::render_histogram(
            &mut out,
            "db_query_duration_seconds",
            "Database operation latency",
            rows,
        );
        Self::render_gauge(
            &mut out,
            "db_connections_active",
            "Pool connections currently checked out",
            self.db_connections_active.load(Ordering::Relaxed),
        );
        Self::render_gauge(
            &mut out,
            "db_connections_idle",
            "Pool connections open and idle",
            self.db_connections_idle.load(Ordering::Relaxed),
        );

        let mut rows: Vec<(String, u64)> = self
            .training_requests
            .iter()
            .map(|e| {
                (
                    format!("{{status=\"{}\"}}", e.key()),
                    e.value().load(Ordering::Relaxed),
                )
            })
            .collect();
        rows.sort();
        Self::render_counters(
            &mut out,
            "training_requests_total",
            "Training requests by status reached",
            rows,
        );

        Self::render_counters(
            &mut out,
            "learning_processes_completed_total",
            "Completed learning processes",
            vec![(String::new(), self.learnings_completed.load(Ordering::Relaxed))],
        );

        let _ = writeln!(out, "# HELP mentors_workload Active students per mentor");
        let _ = writeln!(out, "# TYPE mentors_workload gauge");
        let mut workloads: Vec<(String, i64)> = self
            .mentor_workload
            .iter()
            .map(|e| (e.key().to_string(), e.value().load(Ordering::Relaxed)))
            .collect();
        workloads.sort();
        for (mentor, workload) in workloads {
            let _ = writeln!(out, "mentors_workload{{mentor_id=\"{mentor}\"}} {workload}");
        }

        let _ = writeln!(out, "# HELP learning_processes_active Learning processes in progress");
        let _ = writeln!(out, "# TYPE learning_processes_active gauge");
        let _ = writeln!(out, "learning_processes_active {}", self.active_learnings());

        let _ = writeln!(out, "# HELP feedback_rating Completion feedback ratings");
        let _ = writeln!(out, "# TYPE feedback_rating summary");
        let _ = writeln!(
            out,
            "feedback_rating_sum {}",
            self.feedback_sum.load(Ordering::Relaxed)
        );
        let _ = writeln!(
            out,
            "feedback_rating_count {}",
            self.feedback_count.load(Ordering::Relaxed)
        );

        out
    }
}
