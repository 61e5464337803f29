use {prometheus_metric_storage::StorageRegistry, std::sync::OnceLock};

/// Metrics for the wallet engine.
#[derive(Debug, Clone, prometheus_metric_storage::MetricStorage)]
#[metric(subsystem = "wallet_engine")]
struct Metrics {
    /// Balance lookups served from the cache.
    cache_hits: prometheus::IntCounter,

    /// Balance lookups that had to query the chains.
    cache_misses: prometheus::IntCounter,

    /// Balance entries that degraded to an error.
    #[metric(labels("kind"))]
    balance_fetch_errors: prometheus::IntCounterVec,

    /// Failed network fee estimations.
    #[metric(labels("reason"))]
    estimation_errors: prometheus::IntCounterVec,

    /// Submitted transactions by their final outcome.
    #[metric(labels("outcome"))]
    transactions: prometheus::IntCounterVec,
}

pub fn cache_hit() {
    get().cache_hits.inc();
}

pub fn cache_miss() {
    get().cache_misses.inc();
}

/// `kind` is one of `native`, `token` or `chain`. A failed chain counts once,
/// not once per entry.
pub fn balance_fetch_error(kind: &str) {
    get().balance_fetch_errors.with_label_values(&[kind]).inc();
}

pub fn estimation_failed(reason: &str) {
    get().estimation_errors.with_label_values(&[reason]).inc();
}

pub fn transaction(outcome: &str) {
    get().transactions.with_label_values(&[outcome]).inc();
}

/// The registry the metrics get exported through. Backed by the process wide
/// default prometheus registry.
pub fn storage_registry() -> &'static StorageRegistry {
    static REGISTRY: OnceLock<StorageRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| StorageRegistry::new(prometheus::default_registry().clone()))
}

/// Get the metrics instance.
fn get() -> &'static Metrics {
    Metrics::instance(storage_registry()).expect("unexpected error getting metrics instance")
}
