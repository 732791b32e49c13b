use crate::{
    config::ProxyConfig,
    error::ProxyError,
    proxy::{
        builder::{ProxyBuilder, ProxyType},
        descriptor::MethodFilter,
        invocation::Interceptor,
    },
    state::SharedState,
    types::TypeDescription,
    utils::sync::{Arc, RwLock},
    value::{Object, ObjectRef},
    vm::{cache::MethodInvoker, metrics::CacheStats},
};
use std::any::Any;

/// Access to the state every proxy instance carries.
pub trait Proxy {
    fn target(&self) -> Option<ObjectRef>;

    /// Fails with a type mismatch unless the target implements the proxy's
    /// primary type.
    fn set_target(&self, target: Option<ObjectRef>) -> Result<(), ProxyError>;

    fn interceptor(&self) -> Option<Arc<dyn Interceptor>>;

    fn set_interceptor(&self, interceptor: Option<Arc<dyn Interceptor>>);
}

pub struct ProxyObject {
    proxy_type: ProxyType,
    target: RwLock<Option<ObjectRef>>,
    interceptor: RwLock<Option<Arc<dyn Interceptor>>>,
}

impl ProxyObject {
    pub(crate) fn new(proxy_type: ProxyType) -> Self {
        Self {
            proxy_type,
            target: RwLock::new(None),
            interceptor: RwLock::new(None),
        }
    }

    pub fn proxy_type(&self) -> &ProxyType {
        &self.proxy_type
    }
}

impl Object for ProxyObject {
    fn object_type(&self) -> TypeDescription {
        self.proxy_type.type_description()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Proxy for ProxyObject {
    fn target(&self) -> Option<ObjectRef> {
        self.target.read().clone()
    }

    fn set_target(&self, target: Option<ObjectRef>) -> Result<(), ProxyError> {
        if let Some(t) = &target {
            let primary = self.proxy_type.primary();
            if !t.instance_of(primary) {
                return Err(ProxyError::type_mismatch(
                    primary.type_name(),
                    t.object_type().type_name(),
                ));
            }
        }
        *self.target.write() = target;
        Ok(())
    }

    fn interceptor(&self) -> Option<Arc<dyn Interceptor>> {
        self.interceptor.read().clone()
    }

    fn set_interceptor(&self, interceptor: Option<Arc<dyn Interceptor>>) {
        *self.interceptor.write() = interceptor;
    }
}

/// Creates proxies. Every factory owns its own caches.
pub struct ProxyFactory {
    state: Arc<SharedState>,
    builder: ProxyBuilder,
}

impl Default for ProxyFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ProxyFactory {
    /// Configured from the environment, see [`ProxyConfig::from_env`].
    pub fn new() -> Self {
        Self::with_config(ProxyConfig::from_env())
    }

    pub fn with_config(config: ProxyConfig) -> Self {
        let state = SharedState::new(config);
        Self {
            builder: ProxyBuilder::new(state.clone()),
            state,
        }
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.state.config
    }

    pub fn builder(&self) -> &ProxyBuilder {
        &self.builder
    }

    pub fn invoker(&self) -> MethodInvoker {
        MethodInvoker::new(self.state.clone())
    }

    pub fn state(&self) -> &Arc<SharedState> {
        &self.state
    }

    pub fn cache_statistics(&self) -> CacheStats {
        self.state.cache_statistics()
    }

    pub fn create_proxy(
        &self,
        primary: TypeDescription,
        interfaces: &[TypeDescription],
        target: Option<ObjectRef>,
        interceptor: Arc<dyn Interceptor>,
    ) -> Result<ObjectRef, ProxyError> {
        self.create_proxy_with_filter(
            primary,
            interfaces,
            target,
            interceptor,
            MethodFilter::default_filter(),
        )
    }

    pub fn create_proxy_with_filter(
        &self,
        primary: TypeDescription,
        interfaces: &[TypeDescription],
        target: Option<ObjectRef>,
        interceptor: Arc<dyn Interceptor>,
        filter: MethodFilter,
    ) -> Result<ObjectRef, ProxyError> {
        let proxy_type = self
            .builder
            .get_proxy_type_with_filter(primary, interfaces, filter)?;
        let proxy = proxy_type.new_object();
        proxy.set_target(target)?;
        proxy.set_interceptor(Some(interceptor));
        Ok(ObjectRef::new(proxy))
    }
}
