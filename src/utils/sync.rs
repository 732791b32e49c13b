//! Synchronization primitives shared by the caches.
pub use parking_lot::{Mutex, RwLock};
pub use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, LazyLock, OnceLock,
};
