use crate::{
    error::ProxyError,
    types::generics::GenericLookup,
    utils::LocalIndex,
    value::Value,
};

/// How a single argument reaches the callee.
#[derive(Clone, Debug, PartialEq)]
pub enum Argument {
    Value(Value),
    /// Address of a storage cell in the frame, for out and by-ref parameters.
    Address(LocalIndex),
}

/// Arguments and scratch storage of one call.
#[derive(Clone, Debug, Default)]
pub struct CallFrame {
    arguments: Vec<Argument>,
    locals: Vec<Value>,
    generics: GenericLookup,
}

impl CallFrame {
    pub fn new(generics: GenericLookup) -> Self {
        Self {
            arguments: vec![],
            locals: vec![],
            generics,
        }
    }

    /// A frame passing every value by value.
    pub fn from_values(values: Vec<Value>) -> Self {
        Self {
            arguments: values.into_iter().map(Argument::Value).collect(),
            ..Self::default()
        }
    }

    pub fn generics(&self) -> &GenericLookup {
        &self.generics
    }

    pub fn argument_count(&self) -> usize {
        self.arguments.len()
    }

    pub fn push_argument(&mut self, value: Value) {
        self.arguments.push(Argument::Value(value));
    }

    pub fn declare_local(&mut self, value: Value) -> LocalIndex {
        self.locals.push(value);
        LocalIndex(self.locals.len() - 1)
    }

    pub fn push_address(&mut self, local: LocalIndex) {
        self.arguments.push(Argument::Address(local));
    }

    pub fn local(&self, local: LocalIndex) -> Result<&Value, ProxyError> {
        self.locals
            .get(local.as_usize())
            .ok_or(ProxyError::ArgumentOutOfRange {
                index: local.as_usize(),
                count: self.locals.len(),
            })
    }

    fn slot(&self, index: usize) -> Result<&Argument, ProxyError> {
        self.arguments
            .get(index)
            .ok_or(ProxyError::ArgumentOutOfRange {
                index,
                count: self.arguments.len(),
            })
    }

    pub fn is_by_ref(&self, index: usize) -> bool {
        matches!(self.arguments.get(index), Some(Argument::Address(_)))
    }

    /// The current value of an argument, read through its address if it has one.
    pub fn argument(&self, index: usize) -> Result<Value, ProxyError> {
        match self.slot(index)? {
            Argument::Value(v) => Ok(v.clone()),
            Argument::Address(local) => self.local(*local).cloned(),
        }
    }

    pub fn get<T>(&self, index: usize) -> Result<T, ProxyError>
    where
        T: TryFrom<Value, Error = ProxyError>,
    {
        T::try_from(self.argument(index)?)
    }

    /// Writes through an out or by-ref argument.
    pub fn store(&mut self, index: usize, value: impl Into<Value>) -> Result<(), ProxyError> {
        match self.slot(index)? {
            Argument::Address(local) => {
                let local = local.as_usize();
                let count = self.locals.len();
                let cell = self
                    .locals
                    .get_mut(local)
                    .ok_or(ProxyError::ArgumentOutOfRange { index: local, count })?;
                *cell = value.into();
                Ok(())
            }
            Argument::Value(_) => Err(ProxyError::NotByRef(index)),
        }
    }
}
