//! Student Record Registry
//!
//! Student records are validated on the way in, kept in insertion order, and
//! saved as a single JSON snapshot after every change.

pub mod domain;
pub use domain::{
    Config, Field, FieldError, RecordId, StudentDraft, StudentRecord, UniqueCheck,
    ValidationErrors,
};

/// Record storage, persistence adapters and the registry itself.
pub mod storage;
pub use storage::{
    Change, Command, FileStore, JsonSnapshot, MemoryStore, Outcome, Persistence, Registry,
    RegistryError,
};
