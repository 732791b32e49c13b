use crate::types::runtime::RuntimeType;
use std::{
    fmt::{Debug, Formatter},
    sync::Arc,
};

/// Method type arguments of a closed generic method, in declaration order.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct GenericLookup {
    pub method_generics: Arc<[RuntimeType]>,
}

impl GenericLookup {
    pub fn new(method_generics: Vec<RuntimeType>) -> Self {
        Self {
            method_generics: method_generics.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.method_generics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.method_generics.len()
    }

    /// Substitutes method generic parameters. Parameters this lookup has no
    /// argument for are left open.
    pub fn make_concrete(&self, t: &RuntimeType) -> RuntimeType {
        match t {
            RuntimeType::MethodParameter(i) => self
                .method_generics
                .get(*i as usize)
                .cloned()
                .unwrap_or_else(|| t.clone()),
            RuntimeType::Nullable(inner) => RuntimeType::nullable(self.make_concrete(inner)),
            other => other.clone(),
        }
    }
}

impl Debug for GenericLookup {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        struct GenericIndexFormatter(char, usize);
        impl Debug for GenericIndexFormatter {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}{}", self.0, self.1)
            }
        }

        f.debug_map()
            .entries(
                self.method_generics
                    .iter()
                    .enumerate()
                    .map(|(i, t)| (GenericIndexFormatter('M', i), t)),
            )
            .finish()
    }
}
