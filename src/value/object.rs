use crate::types::TypeDescription;
use std::{
    any::Any,
    fmt::{Debug, Formatter},
    sync::Arc,
};

/// Anything that can be the receiver of a virtual call.
pub trait Object: Any + Send + Sync {
    fn object_type(&self) -> TypeDescription;

    fn as_any(&self) -> &dyn Any;
}

/// A shared reference to an object. Equality is reference identity.
#[derive(Clone)]
pub struct ObjectRef(Arc<dyn Object>);

impl ObjectRef {
    pub fn new<T: Object>(object: T) -> Self {
        Self(Arc::new(object))
    }

    pub fn object_type(&self) -> TypeDescription {
        self.0.object_type()
    }

    pub fn instance_of(&self, ty: TypeDescription) -> bool {
        self.object_type().is_assignable_to(ty)
    }

    pub fn downcast_ref<T: Object>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref()
    }

    /// The Rust state of an [`Instance`].
    pub fn state<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.downcast_ref::<Instance<T>>().map(|i| &i.state)
    }

    pub fn address(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.address() == other.address()
    }
}

impl Debug for ObjectRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{:#x}", self.object_type().type_name(), self.address())
    }
}

/// Binds Rust state to a class defined with [`crate::types::TypeBuilder`].
pub struct Instance<T> {
    ty: TypeDescription,
    pub state: T,
}

impl<T> Instance<T> {
    pub fn new(ty: TypeDescription, state: T) -> Self {
        Self { ty, state }
    }
}

impl<T: Send + Sync + 'static> Object for Instance<T> {
    fn object_type(&self) -> TypeDescription {
        self.ty
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
