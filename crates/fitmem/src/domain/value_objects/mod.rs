//! Value Objects
//!
//! Immutable objects defined by their attributes rather than identity.

mod legacy_field;
mod memory_kind;
mod memory_source;

pub use legacy_field::*;
pub use memory_kind::*;
pub use memory_source::*;
