use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Synthetic identifier assigned by the registry when a record is added.
///
/// Unlike the user-supplied student ID, this never changes for the lifetime
/// of a record and is never shown as an editable field.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RecordId(u64);

impl RecordId {
    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// The identifier that follows this one, or `None` once the id space
    /// is used up.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(raw) => Some(Self(raw)),
            None => None,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The user-entered fields of a student, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentDraft {
    /// Full name.
    pub name: String,
    /// Institution-issued student number.
    pub student_id: String,
    /// Contact email address.
    pub email: String,
    /// Contact phone number.
    pub contact: String,
}

impl StudentDraft {
    /// Builds a draft from raw input, trimming surrounding whitespace from
    /// every field.
    #[must_use]
    pub fn new(
        name: impl AsRef<str>,
        student_id: impl AsRef<str>,
        email: impl AsRef<str>,
        contact: impl AsRef<str>,
    ) -> Self {
        Self {
            name: name.as_ref().trim().to_string(),
            student_id: student_id.as_ref().trim().to_string(),
            email: email.as_ref().trim().to_string(),
            contact: contact.as_ref().trim().to_string(),
        }
    }
}

impl From<&StudentRecord> for StudentDraft {
    fn from(record: &StudentRecord) -> Self {
        Self {
            name: record.name.clone(),
            student_id: record.student_id.clone(),
            email: record.email.clone(),
            contact: record.contact.clone(),
        }
    }
}

/// A committed student record.
///
/// Records are only created and modified through the
/// [`Registry`](crate::Registry), which guarantees every record passed
/// validation at the time it was committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub(crate) name: String,
    pub(crate) student_id: String,
    pub(crate) email: String,
    pub(crate) contact: String,
    pub(crate) id: RecordId,
    pub(crate) created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) updated_at: Option<DateTime<Utc>>,
}

impl StudentRecord {
    pub(crate) fn new(id: RecordId, draft: StudentDraft) -> Self {
        Self {
            name: draft.name,
            student_id: draft.student_id,
            email: draft.email,
            contact: draft.contact,
            id,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// Replaces the user-entered fields and stamps the update time.
    ///
    /// The synthetic id and creation time are left untouched.
    pub(crate) fn apply(&mut self, draft: StudentDraft) {
        self.name = draft.name;
        self.student_id = draft.student_id;
        self.email = draft.email;
        self.contact = draft.contact;
        self.updated_at = Some(Utc::now());
    }

    /// The student's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The user-facing student number.
    #[must_use]
    pub fn student_id(&self) -> &str {
        &self.student_id
    }

    /// The student's email address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// The student's contact number.
    #[must_use]
    pub fn contact(&self) -> &str {
        &self.contact
    }

    /// The synthetic identifier
    #[must_use]
    pub const fn id(&self) -> RecordId {
        self.id
    }

    /// When the record was first added.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// When the record was last updated, if ever.
    #[must_use]
    pub const fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}
