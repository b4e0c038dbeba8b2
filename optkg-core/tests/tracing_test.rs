//! Tests for the Opt-KG tracing setup.

use std::sync::Mutex;

use optkg_core::tracing::init_tracing;

static TRACING_MUTEX: Mutex<()> = Mutex::new(());

#[test]
fn test_optkg_log_filter_accepted() {
    let _lock = TRACING_MUTEX.lock().unwrap();
    std::env::set_var("OPTKG_LOG", "optkg_allocation::policy=debug,optkg_core=warn");
    init_tracing();
    std::env::remove_var("OPTKG_LOG");
}

#[test]
fn test_init_tracing_idempotent() {
    let _lock = TRACING_MUTEX.lock().unwrap();
    init_tracing();
    init_tracing();
    tracing::info!(target: "optkg_core", "tracing initialised");
}
