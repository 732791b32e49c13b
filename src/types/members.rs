use crate::{
    error::ProxyError,
    types::{generics::GenericLookup, runtime::RuntimeType, TypeDescription},
};
use std::{
    fmt::{Debug, Formatter},
    hash::{Hash, Hasher},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParameterDirection {
    In,
    Out,
    ByRef,
}

impl ParameterDirection {
    pub fn is_by_ref(self) -> bool {
        !matches!(self, ParameterDirection::In)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Parameter {
    pub name: String,
    pub ty: RuntimeType,
    pub direction: ParameterDirection,
}

impl Parameter {
    pub fn input(name: impl Into<String>, ty: RuntimeType) -> Self {
        Self {
            name: name.into(),
            ty,
            direction: ParameterDirection::In,
        }
    }

    pub fn out(name: impl Into<String>, ty: RuntimeType) -> Self {
        Self {
            name: name.into(),
            ty,
            direction: ParameterDirection::Out,
        }
    }

    pub fn by_ref(name: impl Into<String>, ty: RuntimeType) -> Self {
        Self {
            name: name.into(),
            ty,
            direction: ParameterDirection::ByRef,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CallingConvention {
    #[default]
    Default,
    VarArg,
}

/// A method as declared on a type. Methods are virtual unless marked otherwise.
#[derive(Clone, Debug, PartialEq)]
pub struct MethodDefinition {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub return_type: RuntimeType,
    pub generic_parameters: Vec<String>,
    pub calling_convention: CallingConvention,
    pub is_virtual: bool,
    pub is_special_name: bool,
}

impl MethodDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: vec![],
            return_type: RuntimeType::Void,
            generic_parameters: vec![],
            calling_convention: CallingConvention::Default,
            is_virtual: true,
            is_special_name: false,
        }
    }

    pub fn parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn returns(mut self, ty: RuntimeType) -> Self {
        self.return_type = ty;
        self
    }

    pub fn generic_parameter(mut self, name: impl Into<String>) -> Self {
        self.generic_parameters.push(name.into());
        self
    }

    pub fn vararg(mut self) -> Self {
        self.calling_convention = CallingConvention::VarArg;
        self
    }

    pub fn non_virtual(mut self) -> Self {
        self.is_virtual = false;
        self
    }

    pub fn special_name(mut self) -> Self {
        self.is_special_name = true;
        self
    }

    /// Same name and shape, so one can implement the other.
    pub fn signature_matches(&self, other: &MethodDefinition) -> bool {
        self.name == other.name
            && self.parameters == other.parameters
            && self.return_type == other.return_type
            && self.generic_parameters.len() == other.generic_parameters.len()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldDefinition {
    pub name: String,
    pub ty: RuntimeType,
    pub is_static: bool,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, ty: RuntimeType) -> Self {
        Self {
            name: name.into(),
            ty,
            is_static: false,
        }
    }

    pub fn static_member(mut self) -> Self {
        self.is_static = true;
        self
    }
}

#[derive(Clone)]
pub struct MethodDescription {
    pub(crate) parent: TypeDescription,
    pub(crate) index: usize,
    pub(crate) generics: GenericLookup,
}

impl MethodDescription {
    pub(crate) fn new(parent: TypeDescription, index: usize) -> Self {
        Self {
            parent,
            index,
            generics: GenericLookup::default(),
        }
    }

    /// The declaring type.
    pub fn parent(&self) -> TypeDescription {
        self.parent
    }

    /// Position in the declaring type's method list.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn method(&self) -> &'static MethodDefinition {
        &self.parent.definition().methods[self.index]
    }

    pub fn name(&self) -> &'static str {
        &self.method().name
    }

    pub fn parameters(&self) -> &'static [Parameter] {
        &self.method().parameters
    }

    pub fn parameter_count(&self) -> usize {
        self.parameters().len()
    }

    pub fn parameter_type(&self, index: usize) -> Option<RuntimeType> {
        self.parameters()
            .get(index)
            .map(|p| self.generics.make_concrete(&p.ty))
    }

    pub fn return_type(&self) -> RuntimeType {
        self.generics.make_concrete(&self.method().return_type)
    }

    pub fn calling_convention(&self) -> CallingConvention {
        self.method().calling_convention
    }

    pub fn is_virtual(&self) -> bool {
        self.method().is_virtual
    }

    pub fn is_special_name(&self) -> bool {
        self.method().is_special_name
    }

    pub fn generic_arity(&self) -> usize {
        self.method().generic_parameters.len()
    }

    pub fn is_generic(&self) -> bool {
        self.generic_arity() > 0
    }

    /// A generic method whose type arguments have not been supplied.
    pub fn is_generic_definition(&self) -> bool {
        self.is_generic() && self.generics.is_empty()
    }

    pub fn generics(&self) -> &GenericLookup {
        &self.generics
    }

    /// The generic method definition this descriptor was closed from.
    pub fn open(&self) -> MethodDescription {
        Self::new(self.parent, self.index)
    }

    pub fn make_generic(&self, type_arguments: &[RuntimeType]) -> Result<MethodDescription, ProxyError> {
        let expected = self.generic_arity();
        if expected == 0 || type_arguments.len() != expected {
            return Err(ProxyError::GenericArityMismatch {
                method: format!("{:?}", self),
                expected,
                actual: type_arguments.len(),
            });
        }
        Ok(MethodDescription {
            parent: self.parent,
            index: self.index,
            generics: GenericLookup::new(type_arguments.to_vec()),
        })
    }
}

impl Debug for MethodDescription {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let method = self.method();
        write!(
            f,
            "{:?} {}::{}",
            self.return_type(),
            self.parent.type_name(),
            method.name
        )?;

        if self.is_generic() {
            let names: Vec<String> = if self.generics.is_empty() {
                method.generic_parameters.clone()
            } else {
                self.generics
                    .method_generics
                    .iter()
                    .map(|t| t.get_name())
                    .collect()
            };
            write!(f, "<{}>", names.join(", "))?;
        }

        write!(f, "(")?;
        for (i, p) in method.parameters.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match p.direction {
                ParameterDirection::In => {}
                ParameterDirection::Out => write!(f, "out ")?,
                ParameterDirection::ByRef => write!(f, "ref ")?,
            }
            write!(f, "{:?} {}", self.generics.make_concrete(&p.ty), p.name)?;
        }
        write!(f, ")")
    }
}

impl PartialEq for MethodDescription {
    fn eq(&self, other: &Self) -> bool {
        self.parent == other.parent && self.index == other.index && self.generics == other.generics
    }
}

impl Eq for MethodDescription {}

impl Hash for MethodDescription {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.parent.hash(state);
        self.index.hash(state);
        self.generics.hash(state);
    }
}
