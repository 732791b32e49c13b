/// Position of a formal parameter in a call frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArgumentIndex(pub usize);

impl ArgumentIndex {
    pub fn as_usize(self) -> usize {
        self.0
    }
}

/// Scratch storage cell declared by a thunk for out/by-ref parameters.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocalIndex(pub usize);

impl LocalIndex {
    pub fn as_usize(self) -> usize {
        self.0
    }
}
