//! Backend implementations of the state-table and object-store traits.
//!
//! - `memory`: in-memory storage for tests and local runs

pub mod memory;

pub use memory::{
    MemoryCrawlStateStore, MemoryObjectStore, MemoryProcessedUrlStore, MemoryTaskStore,
};
