//! Unique identifier generation for rule ids and delivery ids.

use std::sync::atomic::{AtomicU64, Ordering};

/// Source of opaque unique identifiers.
///
/// The bus asks for a fresh id every time a rule is registered and every
/// time an event entry is delivered. Implementations must never hand out the
/// same id twice within a process.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Random UUID v4 ids. The default generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Monotonic ids with a fixed prefix (`rule-1`, `rule-2`, ...).
///
/// Handy in tests where deterministic ids make assertions readable.
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    seq: AtomicU64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            seq: AtomicU64::new(1),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        let n = self.seq.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", self.prefix, n)
    }
}
