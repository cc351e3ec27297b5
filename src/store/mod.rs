//! Replacement rule persistence.

pub mod kv;
pub mod replacements;

pub use kv::KvStore;
pub use replacements::{ReplacementStore, RuleSet};
