use crate::{
    error::ProxyError,
    proxy::bodies::{InterceptedMethod, PassThroughMethod, TargetAccessor},
    types::members::MethodDescription,
    utils::sync::Arc,
    value::{ObjectRef, Value},
    vm::CallFrame,
};
use enum_dispatch::enum_dispatch;
use std::fmt::{Debug, Formatter};

#[enum_dispatch]
pub trait Callable {
    fn call(&self, this: &ObjectRef, frame: &mut CallFrame) -> Result<Value, ProxyError>;
}

/// An entry in a type's method table.
#[enum_dispatch(Callable)]
#[derive(Clone, Debug)]
pub enum MethodBody {
    NativeMethod,
    InterceptedMethod,
    PassThroughMethod,
    TargetAccessor,
}

type NativeFn = dyn Fn(&ObjectRef, &mut CallFrame) -> Result<Value, ProxyError> + Send + Sync;

/// A method implemented in Rust.
#[derive(Clone)]
pub struct NativeMethod(Arc<NativeFn>);

impl NativeMethod {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&ObjectRef, &mut CallFrame) -> Result<Value, ProxyError> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }
}

impl Callable for NativeMethod {
    fn call(&self, this: &ObjectRef, frame: &mut CallFrame) -> Result<Value, ProxyError> {
        (self.0)(this, frame)
    }
}

impl Debug for NativeMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "NativeMethod({:p})", Arc::as_ptr(&self.0) as *const ())
    }
}

/// Runs the body the receiver's type provides for `method`.
pub fn call_virtual(
    instance: &ObjectRef,
    method: &MethodDescription,
    frame: &mut CallFrame,
) -> Result<Value, ProxyError> {
    instance
        .object_type()
        .require_virtual(method)?
        .call(instance, frame)
}
