use crate::{types::TypeDescription, value::Value};
use std::fmt::{Debug, Display, Formatter};

runtime_type_impls! {
    simple_types: {
        Void => "Void", default: Value::Void,
        Boolean => "Boolean", default: Value::Boolean(false),
        Char => "Char", default: Value::Char('\0'),
        Int32 => "Int32", default: Value::Int32(0),
        Int64 => "Int64", default: Value::Int64(0),
        Float64 => "Double", default: Value::Float64(0.0),
        String => "String", default: Value::Null,
        Object => "Object", default: Value::Null,
    },
    complex_types: {
        Nullable(Box<RuntimeType>),
        Type(TypeDescription),
        MethodParameter(u16),
    },
    get_name: {
        Nullable(t) => format!("{}?", t.get_name()),
        Type(td) => td.type_name().to_string(),
        MethodParameter(index) => format!("!!{}", index),
    },
    default_value: {
        Nullable(_) | Type(_) | MethodParameter(_) => Value::Null,
    }
}

impl RuntimeType {
    pub fn nullable(inner: RuntimeType) -> Self {
        RuntimeType::Nullable(Box::new(inner))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, RuntimeType::Void)
    }

    /// Whether this type still mentions a generic parameter of its method.
    pub fn is_open(&self) -> bool {
        match self {
            RuntimeType::MethodParameter(_) => true,
            RuntimeType::Nullable(inner) => inner.is_open(),
            _ => false,
        }
    }

    /// `Object` and the universal base type are the same type.
    pub fn is_object(&self) -> bool {
        match self {
            RuntimeType::Object => true,
            RuntimeType::Type(td) => *td == TypeDescription::object(),
            _ => false,
        }
    }
}

impl From<TypeDescription> for RuntimeType {
    fn from(td: TypeDescription) -> Self {
        RuntimeType::Type(td)
    }
}

impl Debug for RuntimeType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.get_name())
    }
}

impl Display for RuntimeType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.get_name())
    }
}
