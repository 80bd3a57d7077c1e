//! Optional metrics instrumentation for quill.
//!
//! When the `observe` feature is enabled, store operations emit counters and
//! histograms via the [`metrics`] crate. A downstream application must install
//! a metrics recorder (e.g. `metrics-exporter-prometheus`) to collect the data.
//!
//! When the feature is **not** enabled every function in this module is a
//! zero-cost no-op.

/// Record an append (counter + latency histogram).
///
/// - `quill.append.total` – counter with `backend` and `outcome` labels
/// - `quill.append.duration_seconds` – histogram with `backend` label
#[inline]
pub fn record_append(backend: &'static str, duration: std::time::Duration, success: bool) {
    #[cfg(feature = "observe")]
    {
        let outcome = if success { "ok" } else { "fail" };
        metrics::counter!("quill.append.total", "backend" => backend, "outcome" => outcome)
            .increment(1);
        metrics::histogram!("quill.append.duration_seconds", "backend" => backend)
            .record(duration.as_secs_f64());
    }
    #[cfg(not(feature = "observe"))]
    {
        let _ = (backend, duration, success);
    }
}

/// Record a query (counter + latency + rows returned).
///
/// - `quill.query.total` – counter with `backend` and `outcome` labels
/// - `quill.query.duration_seconds` – histogram with `backend` label
/// - `quill.query.rows_total` – counter with `backend` label
#[inline]
pub fn record_query(backend: &'static str, duration: std::time::Duration, rows: Option<usize>) {
    #[cfg(feature = "observe")]
    {
        let outcome = if rows.is_some() { "ok" } else { "fail" };
        metrics::counter!("quill.query.total", "backend" => backend, "outcome" => outcome)
            .increment(1);
        metrics::histogram!("quill.query.duration_seconds", "backend" => backend)
            .record(duration.as_secs_f64());
        if let Some(rows) = rows {
            metrics::counter!("quill.query.rows_total", "backend" => backend)
                .increment(rows as u64);
        }
    }
    #[cfg(not(feature = "observe"))]
    {
        let _ = (backend, duration, rows);
    }
}

/// Record a stored record that could not be decoded and was skipped.
///
/// - `quill.parse_skips_total` – counter with `backend` label
#[inline]
pub fn record_parse_skip(backend: &'static str) {
    #[cfg(feature = "observe")]
    {
        metrics::counter!("quill.parse_skips_total", "backend" => backend).increment(1);
    }
    #[cfg(not(feature = "observe"))]
    {
        let _ = backend;
    }
}

/// Record an audit write dropped by the request adapter.
///
/// - `quill.middleware.dropped_total` – counter
#[inline]
pub fn record_dropped_audit() {
    #[cfg(feature = "observe")]
    {
        metrics::counter!("quill.middleware.dropped_total").increment(1);
    }
}
