//! Queue provider adapters. Production deployments implement [`crate::QueueClient`]
//! against the concrete provider (SQS or equivalent) outside this workspace;
//! `memory` is a test double used by the consumer's own test suite.

pub mod memory;

pub use memory::MemoryQueueClient;
