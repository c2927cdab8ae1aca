//! Domain Entities
//!
//! - MemoryRecord: An observed preference or aversion with confidence

mod memory_record;

pub use memory_record::*;
