//! Method bodies installed in synthesized proxy types.
use crate::{
    error::ProxyError,
    proxy::{
        factory::{Proxy, ProxyObject},
        invocation::InvocationContext,
    },
    types::members::MethodDescription,
    utils::sync::Arc,
    value::{ObjectRef, Value},
    vm::{
        body::{call_virtual, Callable},
        cache::ThunkCacheEntry,
        metrics::RuntimeMetrics,
        specialization::SpecializationCache,
        CallFrame,
    },
};
use tracing::trace;

fn as_proxy(this: &ObjectRef) -> Result<&ProxyObject, ProxyError> {
    this.downcast_ref::<ProxyObject>()
        .ok_or_else(|| ProxyError::type_mismatch("proxy instance", this.object_type().type_name()))
}

/// Where an intercepted call proceeds to.
#[derive(Clone, Debug)]
pub enum ProceedDispatch {
    Direct(Arc<ThunkCacheEntry>),
    /// Generic methods pick their specialization from the live type arguments.
    Generic(Arc<SpecializationCache>),
}

/// Routes a call through the proxy's interceptor.
#[derive(Clone, Debug)]
pub struct InterceptedMethod {
    method: MethodDescription,
    dispatch: ProceedDispatch,
    metrics: Arc<RuntimeMetrics>,
}

impl InterceptedMethod {
    pub fn new(method: MethodDescription, dispatch: ProceedDispatch, metrics: Arc<RuntimeMetrics>) -> Self {
        Self {
            method,
            dispatch,
            metrics,
        }
    }
}

impl Callable for InterceptedMethod {
    fn call(&self, this: &ObjectRef, frame: &mut CallFrame) -> Result<Value, ProxyError> {
        let proxy = as_proxy(this)?;
        let interceptor = proxy.interceptor().ok_or_else(|| {
            ProxyError::NullReference(format!("no interceptor assigned for {:?}", self.method))
        })?;

        let (method, proceed) = match &self.dispatch {
            ProceedDispatch::Direct(entry) => (self.method.clone(), entry.clone()),
            ProceedDispatch::Generic(cache) => {
                let specialization = cache.get_or_create(&frame.generics().method_generics)?;
                (specialization.method.clone(), specialization.entry.clone())
            }
        };

        let arguments = (0..method.parameter_count())
            .map(|i| frame.argument(i))
            .collect::<Result<Vec<_>, _>>()?;

        self.metrics.record_intercepted_call();
        trace!("intercepting {:?}", method);

        let mut context = InvocationContext::new(method.clone(), proxy.target(), arguments, proceed);
        let result = interceptor.invoke(&mut context)?;

        for (i, p) in method.parameters().iter().enumerate() {
            if p.direction.is_by_ref() && frame.is_by_ref(i) {
                let ty = method.generics.make_concrete(&p.ty);
                frame.store(i, context.arguments()[i].narrow(&ty)?)?;
            }
        }

        let return_type = method.return_type();
        if return_type.is_void() {
            Ok(Value::Void)
        } else {
            result.narrow(&return_type)
        }
    }
}

/// Forwards the frame to the target without involving the interceptor.
#[derive(Clone, Debug)]
pub struct PassThroughMethod {
    method: MethodDescription,
    metrics: Arc<RuntimeMetrics>,
}

impl PassThroughMethod {
    pub fn new(method: MethodDescription, metrics: Arc<RuntimeMetrics>) -> Self {
        Self { method, metrics }
    }
}

impl Callable for PassThroughMethod {
    fn call(&self, this: &ObjectRef, frame: &mut CallFrame) -> Result<Value, ProxyError> {
        let target = as_proxy(this)?.target().ok_or_else(|| {
            ProxyError::NullReference(format!("no target to forward {:?} to", self.method))
        })?;
        self.metrics.record_pass_through_call();
        trace!("forwarding {:?}", self.method);
        call_virtual(&target, &self.method, frame)
    }
}

/// `get_Target` and `set_Target` of the proxy capability interface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetAccessor {
    Get,
    Set,
}

impl Callable for TargetAccessor {
    fn call(&self, this: &ObjectRef, frame: &mut CallFrame) -> Result<Value, ProxyError> {
        let proxy = as_proxy(this)?;
        match self {
            TargetAccessor::Get => Ok(proxy.target().map_or(Value::Null, Value::Object)),
            TargetAccessor::Set => {
                match frame.argument(0)? {
                    Value::Null => proxy.set_target(None)?,
                    Value::Object(target) => proxy.set_target(Some(target))?,
                    other => {
                        return Err(ProxyError::type_mismatch(
                            proxy.proxy_type().primary().type_name(),
                            other.type_name(),
                        ))
                    }
                }
                Ok(Value::Void)
            }
        }
    }
}
