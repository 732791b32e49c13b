//! Utility types used throughout the codebase.

mod newtypes;
pub mod sync;

pub use newtypes::{ArgumentIndex, LocalIndex};
