use crate::{
    error::ProxyError,
    types::members::MethodDescription,
    utils::sync::Arc,
    value::{ObjectRef, Value},
    vm::cache::ThunkCacheEntry,
};
use std::fmt::{Debug, Formatter};

/// Handles every intercepted call on a proxy.
pub trait Interceptor: Send + Sync {
    fn invoke(&self, context: &mut InvocationContext) -> Result<Value, ProxyError>;
}

impl<F> Interceptor for F
where
    F: Fn(&mut InvocationContext) -> Result<Value, ProxyError> + Send + Sync,
{
    fn invoke(&self, context: &mut InvocationContext) -> Result<Value, ProxyError> {
        self(context)
    }
}

/// Forwards every call to the target unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct TransparentInterceptor;

impl Interceptor for TransparentInterceptor {
    fn invoke(&self, context: &mut InvocationContext) -> Result<Value, ProxyError> {
        context.proceed()
    }
}

/// One intercepted call: the method, the proxy's target, one slot per
/// parameter and the way to reach the original implementation.
///
/// Out parameters are seeded with whatever the caller passed in.
pub struct InvocationContext {
    method: MethodDescription,
    target: Option<ObjectRef>,
    arguments: Vec<Value>,
    proceed: Arc<ThunkCacheEntry>,
}

impl InvocationContext {
    pub(crate) fn new(
        method: MethodDescription,
        target: Option<ObjectRef>,
        arguments: Vec<Value>,
        proceed: Arc<ThunkCacheEntry>,
    ) -> Self {
        Self {
            method,
            target,
            arguments,
            proceed,
        }
    }

    pub fn method(&self) -> &MethodDescription {
        &self.method
    }

    pub fn target(&self) -> Option<&ObjectRef> {
        self.target.as_ref()
    }

    pub fn set_target(&mut self, target: Option<ObjectRef>) {
        self.target = target;
    }

    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }

    pub fn arguments_mut(&mut self) -> &mut [Value] {
        &mut self.arguments
    }

    pub fn argument(&self, index: usize) -> Option<&Value> {
        self.arguments.get(index)
    }

    pub fn set_argument(&mut self, index: usize, value: impl Into<Value>) -> Result<(), ProxyError> {
        let count = self.arguments.len();
        let slot = self
            .arguments
            .get_mut(index)
            .ok_or(ProxyError::ArgumentOutOfRange { index, count })?;
        *slot = value.into();
        Ok(())
    }

    /// Calls the target with the current slots. Out and by-ref results land
    /// back in the slots.
    pub fn proceed(&mut self) -> Result<Value, ProxyError> {
        let target = self.target.clone().ok_or_else(|| {
            ProxyError::NullReference(format!("no target to proceed to for {:?}", self.method))
        })?;
        self.proceed.invoke(&target, &mut self.arguments)
    }

    /// Calls the intercepted method on any compatible instance.
    pub fn proceed_with(&self, target: &ObjectRef, arguments: &mut [Value]) -> Result<Value, ProxyError> {
        self.proceed.invoke(target, arguments)
    }
}

impl Debug for InvocationContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvocationContext")
            .field("method", &self.method)
            .field("target", &self.target)
            .field("arguments", &self.arguments)
            .finish()
    }
}
