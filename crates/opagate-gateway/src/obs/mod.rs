//! Lightweight in-process metrics.
//!
//! Counters and a latency histogram stored as atomics, rendered in Prometheus
//! text format by `AuthzMetrics::render` for hosts that expose a scrape route.

pub mod metrics;

pub use metrics::AuthzMetrics;
