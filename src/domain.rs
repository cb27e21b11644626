//! Domain models for student record management.
//!
//! This module contains the student record types, the field validators, and
//! the registry configuration.

mod config;
pub use config::Config;

mod student;
pub use student::{RecordId, StudentDraft, StudentRecord};

pub mod validation;
pub use validation::{Field, FieldError, UniqueCheck, ValidationErrors};
