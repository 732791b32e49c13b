//! Calling machinery: frames, method bodies, thunks and their caches.
pub mod body;
pub mod cache;
mod frame;
pub mod metrics;
pub mod specialization;
pub mod thunk;

pub use body::{call_virtual, Callable, MethodBody, NativeMethod};
pub use cache::{MethodInvoker, ThunkCache, ThunkCacheEntry};
pub use frame::{Argument, CallFrame};
pub use metrics::{CacheStats, RuntimeMetrics};
pub use specialization::{Specialization, SpecializationCache};
pub use thunk::{Thunk, ThunkCompiler, ThunkOp};
