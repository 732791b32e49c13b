//! Proxy type synthesis.
//!
//! A proxy type is built in four steps, each advancing a [`TypeBuildContext`]:
//! collecting the method set, implementing the proxy capability interface,
//! implementing every collected method and finally publishing the type.
use crate::{
    error::ProxyError,
    proxy::{
        bodies::{InterceptedMethod, PassThroughMethod, ProceedDispatch, TargetAccessor},
        descriptor::{MethodFilter, ProxyDescriptor},
        factory::ProxyObject,
    },
    state::SharedState,
    types::{
        members::{FieldDefinition, MethodDescription},
        runtime::RuntimeType,
        TypeBuilder, TypeDescription, TypeKind,
    },
    utils::sync::Arc,
    value::ObjectRef,
    vm::body::MethodBody,
};
use std::collections::{HashMap, HashSet};
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildState {
    Uninitialized,
    ContextBuilt,
    InterfaceContractImplemented,
    MethodsImplemented,
    Finalized,
}

/// A method the proxy implements, plus the base-class declarations it overrides.
#[derive(Debug)]
struct TargetMethod {
    method: MethodDescription,
    overridden: Vec<MethodDescription>,
}

struct TypeBuildContext {
    state: BuildState,
    descriptor: ProxyDescriptor,
    builder: Option<TypeBuilder>,
    target_methods: Vec<TargetMethod>,
    member_names: HashMap<String, usize>,
}

impl TypeBuildContext {
    fn new(descriptor: ProxyDescriptor) -> Self {
        Self {
            state: BuildState::Uninitialized,
            descriptor,
            builder: None,
            target_methods: vec![],
            member_names: HashMap::new(),
        }
    }

    fn advance(&mut self, from: BuildState, to: BuildState) -> Result<(), ProxyError> {
        if self.state != from {
            return Err(ProxyError::InvalidProxyType(format!(
                "proxy build for {:?} is {:?}, expected {:?}",
                self.descriptor.primary, self.state, from
            )));
        }
        self.state = to;
        Ok(())
    }

    fn builder(&mut self) -> Result<&mut TypeBuilder, ProxyError> {
        let primary = self.descriptor.primary;
        self.builder.as_mut().ok_or_else(|| {
            ProxyError::InvalidProxyType(format!("proxy build for {:?} has no type builder", primary))
        })
    }

    /// The first request for a name returns it unchanged, later ones get a
    /// counter appended starting at 0.
    fn unique_member_name(&mut self, name: &str) -> String {
        match self.member_names.get_mut(name) {
            None => {
                self.member_names.insert(name.to_string(), 0);
                name.to_string()
            }
            Some(count) => {
                let unique = format!("{}{}", name, count);
                *count += 1;
                unique
            }
        }
    }
}

fn is_proxyable(method: &MethodDescription) -> bool {
    method.is_virtual() && !method.is_special_name()
}

/// Collects the method set in declaration order: the primary type (and its
/// override chain or base interfaces), then supplementary interfaces, then the
/// universal base type. Overrides absorb the declarations they replace.
fn collect_target_methods(descriptor: &ProxyDescriptor) -> Vec<TargetMethod> {
    let mut targets: Vec<TargetMethod> = vec![];
    let mut seen = HashSet::new();

    let mut push = |targets: &mut Vec<TargetMethod>, method: MethodDescription| {
        if is_proxyable(&method) && seen.insert(method.clone()) {
            targets.push(TargetMethod {
                method,
                overridden: vec![],
            });
        }
    };

    let primary = descriptor.primary;
    if primary.is_interface() {
        for m in primary.methods() {
            push(&mut targets, m);
        }
    } else {
        let mut chain = vec![];
        let mut current = Some(primary);
        while let Some(td) = current {
            chain.push(td);
            current = td.definition().extends;
        }
        let mut chain_len = 0;
        for td in chain {
            for m in td.methods().filter(is_proxyable) {
                let overrides = targets[..chain_len]
                    .iter_mut()
                    .find(|t| t.method.method().signature_matches(m.method()));
                match overrides {
                    Some(t) => t.overridden.push(m),
                    None => {
                        push(&mut targets, m);
                        chain_len = targets.len();
                    }
                }
            }
        }
    }
    for iface in primary.all_interfaces() {
        for m in iface.methods() {
            push(&mut targets, m);
        }
    }

    for &iface in &descriptor.interfaces {
        for m in iface.methods() {
            push(&mut targets, m);
        }
        for base in iface.all_interfaces() {
            for m in base.methods() {
                push(&mut targets, m);
            }
        }
    }

    let absorbed: HashSet<MethodDescription> = targets
        .iter()
        .flat_map(|t| t.overridden.iter().cloned())
        .collect();
    for m in TypeDescription::object().methods() {
        if !absorbed.contains(&m) {
            push(&mut targets, m);
        }
    }

    targets
}

/// A synthesized proxy type.
#[derive(Clone, Debug)]
pub struct ProxyType {
    ty: TypeDescription,
    descriptor: ProxyDescriptor,
}

impl ProxyType {
    pub fn type_description(&self) -> TypeDescription {
        self.ty
    }

    pub fn descriptor(&self) -> &ProxyDescriptor {
        &self.descriptor
    }

    pub fn primary(&self) -> TypeDescription {
        self.descriptor.primary
    }

    pub(crate) fn new_object(&self) -> ProxyObject {
        ProxyObject::new(self.clone())
    }

    /// A new proxy with neither target nor interceptor.
    pub fn create_instance(&self) -> ObjectRef {
        ObjectRef::new(self.new_object())
    }
}

impl PartialEq for ProxyType {
    fn eq(&self, other: &Self) -> bool {
        self.ty == other.ty
    }
}

pub struct ProxyBuilder {
    state: Arc<SharedState>,
}

impl ProxyBuilder {
    pub fn new(state: Arc<SharedState>) -> Self {
        Self { state }
    }

    pub fn get_proxy_type(
        &self,
        primary: TypeDescription,
        interfaces: &[TypeDescription],
    ) -> Result<ProxyType, ProxyError> {
        self.get_proxy_type_with_filter(primary, interfaces, MethodFilter::default_filter())
    }

    /// Reuses an earlier type for an equal descriptor when proxy type caching
    /// is enabled.
    pub fn get_proxy_type_with_filter(
        &self,
        primary: TypeDescription,
        interfaces: &[TypeDescription],
        filter: MethodFilter,
    ) -> Result<ProxyType, ProxyError> {
        let descriptor = ProxyDescriptor::new(primary, interfaces, filter);
        if self.state.config.cache_proxy_types {
            self.state
                .proxy_types
                .get_or_build(&descriptor, || self.build(&descriptor))
        } else {
            self.build(&descriptor)
        }
    }

    /// Proxies whose target is created on first use are not supported.
    pub fn get_proxy_type_with_target_factory<F>(
        &self,
        primary: TypeDescription,
        _interfaces: &[TypeDescription],
        _target_factory: F,
    ) -> Result<ProxyType, ProxyError>
    where
        F: Fn() -> ObjectRef + Send + Sync + 'static,
    {
        Err(ProxyError::UnimplementedCapability(format!(
            "lazily created targets for {:?} proxies",
            primary
        )))
    }

    /// Mints a new proxy type, bypassing the type cache.
    pub fn build(&self, descriptor: &ProxyDescriptor) -> Result<ProxyType, ProxyError> {
        let context = TypeBuildContext::new(descriptor.clone());
        let context = self.initialize_build_context(context)?;
        let context = self.implement_proxy_interface(context)?;
        let context = self.implement_methods(context)?;
        self.finalize(context)
    }

    fn initialize_build_context(&self, mut context: TypeBuildContext) -> Result<TypeBuildContext, ProxyError> {
        let primary = context.descriptor.primary;
        match primary.kind() {
            TypeKind::Interface | TypeKind::Class => {}
            TypeKind::Proxy => {
                return Err(ProxyError::InvalidProxyType(format!(
                    "{:?} is itself a proxy type",
                    primary
                )))
            }
        }
        if let Some(bad) = context.descriptor.interfaces.iter().find(|i| !i.is_interface()) {
            return Err(ProxyError::InvalidProxyType(format!(
                "{:?} is not an interface",
                bad
            )));
        }

        let base = if primary.is_interface() {
            TypeDescription::object()
        } else {
            primary
        };
        let mut builder = TypeBuilder::proxy(format!("{}Proxy", primary.type_name()), base);
        if primary.is_interface() {
            builder.add_interface(primary);
        }
        for &iface in &context.descriptor.interfaces {
            builder.add_interface(iface);
        }
        builder.add_field(FieldDefinition::new("target", RuntimeType::Type(primary)));
        builder.add_field(FieldDefinition::new("interceptor", RuntimeType::Object));

        let target_methods = collect_target_methods(&context.descriptor);
        // nothing shared is touched until every signature is known to compile
        for target in &target_methods {
            self.state.compiler.check_signature(&target.method)?;
        }
        context.target_methods = target_methods;
        context.builder = Some(builder);
        context.advance(BuildState::Uninitialized, BuildState::ContextBuilt)?;
        Ok(context)
    }

    fn implement_proxy_interface(&self, mut context: TypeBuildContext) -> Result<TypeBuildContext, ProxyError> {
        let capability = TypeDescription::proxy_capability();
        let builder = context.builder()?;
        builder.add_interface(capability);
        for (name, accessor) in [("get_Target", TargetAccessor::Get), ("set_Target", TargetAccessor::Set)] {
            let decl = capability
                .method(name)
                .ok_or_else(|| ProxyError::MethodNotFound(format!("IProxy::{}", name)))?;
            builder.add_implementation(&decl, accessor);
        }
        context.advance(
            BuildState::ContextBuilt,
            BuildState::InterfaceContractImplemented,
        )?;
        Ok(context)
    }

    fn implement_methods(&self, mut context: TypeBuildContext) -> Result<TypeBuildContext, ProxyError> {
        let primary = context.descriptor.primary;
        let targets = std::mem::take(&mut context.target_methods);

        for target in &targets {
            let method = &target.method;

            let declared_name = if method.parent.is_interface() && method.parent != primary {
                format!("{}.{}", method.parent.type_name(), method.name())
            } else {
                method.name().to_string()
            };
            let member_name = context.unique_member_name(&declared_name);

            let body: MethodBody = if context.descriptor.filter.should_intercept(method) {
                let (slot_type, dispatch) = if method.is_generic() {
                    let cache = Arc::new(self.state.specialization_cache(method));
                    ("SpecializationCache", ProceedDispatch::Generic(cache))
                } else {
                    let entry = self.state.thunks.entry(method);
                    if self.state.config.eager_thunks {
                        entry.thunk()?;
                    }
                    ("ThunkEntry", ProceedDispatch::Direct(entry))
                };
                context.builder()?.add_field(
                    FieldDefinition::new(format!("{}{}", member_name, slot_type), RuntimeType::Object)
                        .static_member(),
                );
                InterceptedMethod::new(method.clone(), dispatch, self.state.metrics.clone()).into()
            } else {
                PassThroughMethod::new(method.clone(), self.state.metrics.clone()).into()
            };

            let mut definition = method.method().clone();
            definition.name = member_name;
            let builder = context.builder()?;
            builder.add_method_with_body(definition, body.clone());
            builder.add_implementation(method, body.clone());
            for overridden in &target.overridden {
                builder.add_implementation(overridden, body.clone());
            }
        }

        context.target_methods = targets;
        context.advance(
            BuildState::InterfaceContractImplemented,
            BuildState::MethodsImplemented,
        )?;
        Ok(context)
    }

    fn finalize(&self, mut context: TypeBuildContext) -> Result<ProxyType, ProxyError> {
        context.advance(BuildState::MethodsImplemented, BuildState::Finalized)?;
        let builder = context.builder.take().ok_or_else(|| {
            ProxyError::InvalidProxyType(format!(
                "proxy build for {:?} has no type builder",
                context.descriptor.primary
            ))
        })?;
        let ty = builder.finish();
        self.state.metrics.record_proxy_type_built();
        debug!(
            "synthesized proxy type {} ({} methods)",
            ty.type_name(),
            context.target_methods.len()
        );
        Ok(ProxyType {
            ty,
            descriptor: context.descriptor,
        })
    }
}
