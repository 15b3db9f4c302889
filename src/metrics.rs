//! Prometheus metrics & middleware helper.

use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use once_cell::sync::Lazy;
use prometheus::IntCounter;

/// Global Prometheus handle reused in tests.
pub static METRICS: Lazy<PrometheusMetrics> = Lazy::new(|| {
    PrometheusMetricsBuilder::new("deathwatch")
        .endpoint("/metrics") // exposed URL
        .build()
        .expect("metrics builder")
});

/// Wagers accepted since startup.
pub static BETS_PLACED: Lazy<IntCounter> = Lazy::new(|| {
    let counter = IntCounter::new("deathwatch_bets_placed_total", "Wagers accepted")
        .expect("counter definition");
    METRICS
        .registry
        .register(Box::new(counter.clone()))
        .expect("register bets_placed");
    counter
});

/// Wagers resolved (won, lost, or refunded) since startup.
pub static BETS_RESOLVED: Lazy<IntCounter> = Lazy::new(|| {
    let counter = IntCounter::new("deathwatch_bets_resolved_total", "Wagers resolved")
        .expect("counter definition");
    METRICS
        .registry
        .register(Box::new(counter.clone()))
        .expect("register bets_resolved");
    counter
});
