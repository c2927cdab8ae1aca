//! Fitmem Data Models
//!
//! - Memory: personalization records and observation requests

mod memory;

pub use memory::*;
