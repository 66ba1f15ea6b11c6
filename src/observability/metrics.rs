//! Metrics collection and exposition.
//!
//! # Metrics
//! - `router_resolutions_total` (counter): resolutions by outcome (matched, fallback, no_route)
//! - `router_tree_swaps_total` (counter): trees installed after startup
//! - `router_tree_nodes` (gauge): node count of the live tree
//! - `registry_component_loads_total` (counter): finished loads by outcome (ok, error)
//! - `registry_cache_hits_total` (counter): materializations served from cache
//! - `registry_coalesced_loads_total` (counter): callers that joined an in-flight load

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with an HTTP scrape endpoint.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to start metrics endpoint"),
    }
}

pub fn record_resolution(outcome: &'static str) {
    ::metrics::counter!("router_resolutions_total", "outcome" => outcome).increment(1);
}

pub fn record_tree_swap() {
    ::metrics::counter!("router_tree_swaps_total").increment(1);
}

pub fn record_tree_nodes(nodes: usize) {
    ::metrics::gauge!("router_tree_nodes").set(nodes as f64);
}

pub fn record_component_load(outcome: &'static str) {
    ::metrics::counter!("registry_component_loads_total", "outcome" => outcome).increment(1);
}

pub fn record_cache_hit() {
    ::metrics::counter!("registry_cache_hits_total").increment(1);
}

pub fn record_coalesced_load() {
    ::metrics::counter!("registry_coalesced_loads_total").increment(1);
}
