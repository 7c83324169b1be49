// soundcoin-core/src/test_utils/mod.rs

pub mod helpers;
pub mod memory;

pub use memory::MemoryStore;
