use crate::{
    error::ProxyError,
    types::runtime::RuntimeType,
};
use std::sync::Arc;

pub mod object;

pub use object::{Instance, Object, ObjectRef};

/// A method argument, return value or storage cell.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Result of a method that returns nothing.
    Void,
    Null,
    Boolean(bool),
    Char(char),
    Int32(i32),
    Int64(i64),
    Float64(f64),
    String(Arc<str>),
    Object(ObjectRef),
}

macro_rules! value_conversions {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::$variant(v)
                }
            }

            impl TryFrom<Value> for $t {
                type Error = ProxyError;

                fn try_from(v: Value) -> Result<Self, Self::Error> {
                    match v {
                        Value::$variant(inner) => Ok(inner),
                        other => Err(ProxyError::type_mismatch(stringify!($variant), other.type_name())),
                    }
                }
            }
        )*
    };
}

value_conversions! {
    bool => Boolean,
    char => Char,
    i32 => Int32,
    i64 => Int64,
    f64 => Float64,
    Arc<str> => String,
    ObjectRef => Object,
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s.into())
    }
}

impl TryFrom<Value> for String {
    type Error = ProxyError;

    fn try_from(v: Value) -> Result<Self, Self::Error> {
        match v {
            Value::String(s) => Ok(s.to_string()),
            other => Err(ProxyError::type_mismatch("String", other.type_name())),
        }
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl Value {
    pub fn type_name(&self) -> String {
        match self {
            Value::Void => "Void".to_string(),
            Value::Null => "null".to_string(),
            Value::Boolean(_) => "Boolean".to_string(),
            Value::Char(_) => "Char".to_string(),
            Value::Int32(_) => "Int32".to_string(),
            Value::Int64(_) => "Int64".to_string(),
            Value::Float64(_) => "Double".to_string(),
            Value::String(_) => "String".to_string(),
            Value::Object(o) => o.object_type().type_name().to_string(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Checks that this value may be stored in a location of type `ty`.
    pub fn narrow(&self, ty: &RuntimeType) -> Result<Value, ProxyError> {
        if self.fits(ty) {
            Ok(self.clone())
        } else {
            Err(ProxyError::type_mismatch(ty.get_name(), self.type_name()))
        }
    }

    fn fits(&self, ty: &RuntimeType) -> bool {
        use RuntimeType as T;
        match (ty, self) {
            (T::Void, Value::Void) => true,
            (T::Boolean, Value::Boolean(_))
            | (T::Char, Value::Char(_))
            | (T::Int32, Value::Int32(_))
            | (T::Int64, Value::Int64(_))
            | (T::Float64, Value::Float64(_)) => true,
            (t, v) if t.is_object() => !matches!(v, Value::Void),
            (T::String | T::Nullable(_) | T::Type(_), v) if v.is_null() => true,
            (T::String, Value::String(_)) => true,
            (T::Nullable(inner), v) => v.fits(inner),
            (T::Type(td), Value::Object(o)) => o.object_type().is_assignable_to(*td),
            _ => false,
        }
    }
}
