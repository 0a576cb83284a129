//! Tests for the tracing setup.

use std::sync::Mutex;

use vigil_core::tracing::init_tracing;

static TRACING_MUTEX: Mutex<()> = Mutex::new(());

#[test]
fn test_per_crate_filter_is_accepted() {
    let _lock = TRACING_MUTEX.lock().unwrap();
    std::env::set_var("VIGIL_LOG", "vigil_analysis=debug,vigil_cli=warn");
    init_tracing();
    std::env::remove_var("VIGIL_LOG");
}

#[test]
fn test_init_tracing_idempotent() {
    let _lock = TRACING_MUTEX.lock().unwrap();
    init_tracing();
    init_tracing();
    init_tracing();
}

#[test]
fn test_invalid_filter_falls_back() {
    let _lock = TRACING_MUTEX.lock().unwrap();
    std::env::set_var("VIGIL_LOG", "[[[not a filter");
    init_tracing();
    std::env::remove_var("VIGIL_LOG");
    tracing::info!("still alive");
}
