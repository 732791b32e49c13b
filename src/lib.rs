//! # dynproxy-rs
//!
//! Runtime proxies over a small object model: types with explicit method
//! tables, objects that report their runtime type, and calls made through
//! precompiled thunks instead of reflective invocation.
//!
//! ## Core Types
//!
//! - **[`ProxyFactory`]**: creates proxy instances for an interface set.
//! - **[`Interceptor`]**: receives every intercepted call as an [`InvocationContext`].
//! - **[`MethodInvoker`]**: calls any method through a cached [`vm::Thunk`].
//! - **[`types::TypeBuilder`]**: defines the interfaces and classes proxies wrap.
pub mod config;
pub mod error;
pub mod proxy;
pub mod state;
pub mod types;
pub mod utils;
pub mod value;
pub mod vm;

pub use config::ProxyConfig;
pub use error::ProxyError;
pub use proxy::{
    Interceptor, InvocationContext, MethodFilter, Proxy, ProxyBuilder, ProxyDescriptor,
    ProxyFactory, ProxyObject, ProxyType, TransparentInterceptor,
};
pub use types::{members::MethodDescription, runtime::RuntimeType, TypeBuilder, TypeDescription};
pub use value::{Instance, Object, ObjectRef, Value};
pub use vm::{MethodInvoker, NativeMethod};
