//! Runtime proxy synthesis.
//!
//! [`ProxyFactory`] is the entry point: it builds (or reuses) a proxy type for
//! an interface set and a [`MethodFilter`], instantiates it and wires up the
//! target and [`Interceptor`].
pub mod bodies;
pub mod builder;
pub mod descriptor;
pub mod factory;
pub mod invocation;

pub use builder::{ProxyBuilder, ProxyType};
pub use descriptor::{MethodFilter, ProxyDescriptor};
pub use factory::{Proxy, ProxyFactory, ProxyObject};
pub use invocation::{Interceptor, InvocationContext, TransparentInterceptor};
