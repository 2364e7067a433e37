//! Global config handle.
//!
//! Uses `arc-swap` for lock-free reads from request worker threads.

use crate::config::ConcatConfig;
use arc_swap::ArcSwap;
use std::sync::{Arc, LazyLock};

/// Global config storage.
pub static CONFIG: LazyLock<ArcSwap<ConcatConfig>> =
    LazyLock::new(|| ArcSwap::from_pointee(ConcatConfig::default()));

#[inline]
pub fn cfg() -> Arc<ConcatConfig> {
    CONFIG.load_full()
}

#[inline]
pub fn init_config(config: ConcatConfig) -> Arc<ConcatConfig> {
    let arc = Arc::new(config);
    CONFIG.store(Arc::clone(&arc));
    arc
}
