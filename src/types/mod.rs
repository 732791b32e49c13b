//! Runtime representation of the types proxies are built from and for.
//!
//! ## Core Types
//!
//! - **[`TypeDescription`]**: a handle to a leaked, process-lifetime [`TypeDefinition`].
//! - **[`MethodDescription`]**: a method of a type, optionally closed over generic arguments.
//! - **[`TypeBuilder`]**: defines interfaces and classes together with their method tables.
use crate::{
    error::ProxyError,
    utils::sync::{LazyLock, OnceLock},
    value::Value,
    vm::{
        body::{MethodBody, NativeMethod},
        CallFrame,
    },
};
use members::{FieldDefinition, MethodDefinition, MethodDescription, Parameter};
use runtime::RuntimeType;
use std::{
    collections::HashMap,
    fmt::{Debug, Formatter},
    hash::{Hash, Hasher},
};

#[macro_use]
mod macros;

pub mod generics;
pub mod members;
pub mod runtime;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Interface,
    Class,
    Proxy,
}

pub struct TypeDefinition {
    pub name: String,
    pub kind: TypeKind,
    pub extends: Option<TypeDescription>,
    pub interfaces: Vec<TypeDescription>,
    pub methods: Vec<MethodDefinition>,
    pub fields: Vec<FieldDefinition>,
    method_table: OnceLock<HashMap<MethodDescription, MethodBody>>,
}

impl TypeDefinition {
    fn method_table(&self) -> Option<&HashMap<MethodDescription, MethodBody>> {
        self.method_table.get()
    }
}

#[derive(Clone, Copy)]
pub struct TypeDescription {
    definition: &'static TypeDefinition,
}

impl TypeDescription {
    pub fn definition(&self) -> &'static TypeDefinition {
        self.definition
    }

    pub fn type_name(&self) -> &'static str {
        &self.definition.name
    }

    pub fn kind(&self) -> TypeKind {
        self.definition.kind
    }

    pub fn is_interface(&self) -> bool {
        self.definition.kind == TypeKind::Interface
    }

    /// The universal base type every class extends.
    pub fn object() -> TypeDescription {
        static OBJECT: LazyLock<TypeDescription> = LazyLock::new(build_object_type);
        *OBJECT
    }

    /// The interface every synthesized proxy implements.
    pub fn proxy_capability() -> TypeDescription {
        static PROXY: LazyLock<TypeDescription> = LazyLock::new(|| {
            TypeBuilder::interface("IProxy")
                .method(
                    MethodDefinition::new("get_Target")
                        .returns(RuntimeType::Object)
                        .special_name(),
                )
                .method(
                    MethodDefinition::new("set_Target")
                        .parameter(Parameter::input("value", RuntimeType::Object))
                        .special_name(),
                )
                .finish()
        });
        *PROXY
    }

    /// First declared method with the given name.
    pub fn method(&self, name: &str) -> Option<MethodDescription> {
        self.definition
            .methods
            .iter()
            .position(|m| m.name == name)
            .map(|i| MethodDescription::new(*self, i))
    }

    pub fn methods(&self) -> impl Iterator<Item = MethodDescription> + '_ {
        (0..self.definition.methods.len()).map(move |i| MethodDescription::new(*self, i))
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldDefinition> {
        self.definition.fields.iter().find(|f| f.name == name)
    }

    /// Every interface this type implements, directly or through bases and
    /// other interfaces, deduplicated in discovery order.
    pub fn all_interfaces(&self) -> Vec<TypeDescription> {
        let mut found = vec![];
        let mut current = Some(*self);
        while let Some(td) = current {
            for &i in &td.definition.interfaces {
                collect_interfaces(i, &mut found);
            }
            current = td.definition.extends;
        }
        found
    }

    pub fn is_assignable_to(&self, other: TypeDescription) -> bool {
        if *self == other || other == Self::object() {
            return true;
        }
        let mut current = Some(*self);
        while let Some(td) = current {
            if td == other {
                return true;
            }
            current = td.definition.extends;
        }
        other.is_interface() && self.all_interfaces().contains(&other)
    }

    /// Finds the body the method table of this type (or its nearest base)
    /// holds for a method. Generic methods resolve through their definition.
    pub fn resolve_virtual(&self, method: &MethodDescription) -> Option<&'static MethodBody> {
        let key = method.open();
        let mut current = Some(*self);
        while let Some(td) = current {
            if let Some(body) = td.definition.method_table().and_then(|t| t.get(&key)) {
                return Some(body);
            }
            current = td.definition.extends;
        }
        None
    }
}

fn collect_interfaces(iface: TypeDescription, found: &mut Vec<TypeDescription>) {
    if found.contains(&iface) {
        return;
    }
    found.push(iface);
    for &base in &iface.definition.interfaces {
        collect_interfaces(base, found);
    }
}

impl Debug for TypeDescription {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

impl PartialEq for TypeDescription {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.definition, other.definition)
    }
}

impl Eq for TypeDescription {}

impl Hash for TypeDescription {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.definition as *const TypeDefinition).hash(state);
    }
}

fn build_object_type() -> TypeDescription {
    let equals = NativeMethod::new(|this, frame: &mut CallFrame| {
        let same = match frame.argument(0)? {
            Value::Object(other) => other == *this,
            _ => false,
        };
        Ok(Value::Boolean(same))
    });
    let get_hash_code = NativeMethod::new(|this, _| Ok(Value::Int32(this.address() as i32)));
    let to_string = NativeMethod::new(|this, _| Ok(Value::from(this.object_type().type_name())));

    TypeBuilder::root("System.Object")
        .method_with_body(
            MethodDefinition::new("Equals")
                .parameter(Parameter::input("obj", RuntimeType::Object))
                .returns(RuntimeType::Boolean),
            equals,
        )
        .method_with_body(
            MethodDefinition::new("GetHashCode").returns(RuntimeType::Int32),
            get_hash_code,
        )
        .method_with_body(
            MethodDefinition::new("ToString").returns(RuntimeType::String),
            to_string,
        )
        .finish()
}

/// Defines a type and its method table. Classes extend the universal base
/// type unless told otherwise.
pub struct TypeBuilder {
    name: String,
    kind: TypeKind,
    extends: Option<TypeDescription>,
    interfaces: Vec<TypeDescription>,
    methods: Vec<MethodDefinition>,
    fields: Vec<FieldDefinition>,
    own_bodies: Vec<(usize, MethodBody)>,
    implementations: Vec<(MethodDescription, MethodBody)>,
}

impl TypeBuilder {
    fn new(name: impl Into<String>, kind: TypeKind, extends: Option<TypeDescription>) -> Self {
        Self {
            name: name.into(),
            kind,
            extends,
            interfaces: vec![],
            methods: vec![],
            fields: vec![],
            own_bodies: vec![],
            implementations: vec![],
        }
    }

    fn root(name: &str) -> Self {
        Self::new(name, TypeKind::Class, None)
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Interface, None)
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Class, Some(TypeDescription::object()))
    }

    pub(crate) fn proxy(name: impl Into<String>, extends: TypeDescription) -> Self {
        Self::new(name, TypeKind::Proxy, Some(extends))
    }

    pub fn extends(mut self, base: TypeDescription) -> Self {
        self.extends = Some(base);
        self
    }

    pub fn implements(mut self, iface: TypeDescription) -> Self {
        self.add_interface(iface);
        self
    }

    pub fn method(mut self, def: MethodDefinition) -> Self {
        self.add_method(def);
        self
    }

    pub fn method_with_body(mut self, def: MethodDefinition, body: impl Into<MethodBody>) -> Self {
        self.add_method_with_body(def, body);
        self
    }

    pub fn implement(mut self, decl: &MethodDescription, body: impl Into<MethodBody>) -> Self {
        self.add_implementation(decl, body);
        self
    }

    pub fn field(mut self, def: FieldDefinition) -> Self {
        self.add_field(def);
        self
    }

    pub(crate) fn add_interface(&mut self, iface: TypeDescription) {
        if !self.interfaces.contains(&iface) {
            self.interfaces.push(iface);
        }
    }

    pub(crate) fn add_method(&mut self, def: MethodDefinition) -> usize {
        self.methods.push(def);
        self.methods.len() - 1
    }

    pub(crate) fn add_method_with_body(
        &mut self,
        def: MethodDefinition,
        body: impl Into<MethodBody>,
    ) -> usize {
        let index = self.add_method(def);
        self.own_bodies.push((index, body.into()));
        index
    }

    pub(crate) fn add_implementation(&mut self, decl: &MethodDescription, body: impl Into<MethodBody>) {
        self.implementations.push((decl.open(), body.into()));
    }

    pub(crate) fn add_field(&mut self, def: FieldDefinition) {
        self.fields.push(def);
    }

    /// Inherited methods that are virtual and could be overridden here.
    fn inherited_virtuals(&self) -> Vec<MethodDescription> {
        let mut result = vec![];
        let mut current = self.extends;
        while let Some(td) = current {
            result.extend(td.methods().filter(|m| m.is_virtual()));
            current = td.definition.extends;
        }
        let mut interfaces = vec![];
        for &i in &self.interfaces {
            collect_interfaces(i, &mut interfaces);
        }
        if let Some(base) = self.extends {
            for i in base.all_interfaces() {
                if !interfaces.contains(&i) {
                    interfaces.push(i);
                }
            }
        }
        for i in interfaces {
            result.extend(i.methods());
        }
        result
    }

    pub fn finish(self) -> TypeDescription {
        let inherited = self.inherited_virtuals();
        let TypeBuilder {
            name,
            kind,
            extends,
            interfaces,
            methods,
            fields,
            own_bodies,
            implementations,
        } = self;

        let definition: &'static TypeDefinition = Box::leak(Box::new(TypeDefinition {
            name,
            kind,
            extends,
            interfaces,
            methods,
            fields,
            method_table: OnceLock::new(),
        }));
        let td = TypeDescription { definition };

        let mut table = HashMap::new();
        for (decl, body) in implementations {
            table.insert(decl, body);
        }
        for (index, body) in own_bodies {
            let own = MethodDescription::new(td, index);
            // an own method with a body implicitly implements matching inherited slots
            for slot in &inherited {
                if !table.contains_key(slot) && slot.method().signature_matches(own.method()) {
                    table.insert(slot.clone(), body.clone());
                }
            }
            table.insert(own, body);
        }

        // freshly leaked, so nobody else can have initialized it
        let _ = definition.method_table.set(table);
        td
    }
}

impl TypeDescription {
    /// Like [`TypeDescription::resolve_virtual`], but an error when the type
    /// has no body for the method.
    pub fn require_virtual(&self, method: &MethodDescription) -> Result<&'static MethodBody, ProxyError> {
        self.resolve_virtual(method).ok_or_else(|| {
            ProxyError::MethodNotFound(format!("{:?} on {}", method, self.type_name()))
        })
    }
}
