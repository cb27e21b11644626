//! The command interface a presentation layer binds its events to.
//!
//! Each user action maps to one [`Command`]. Dispatching it against a
//! [`Registry`] yields an [`Outcome`] describing what happened, so the caller
//! can decide what to show without reaching into the registry itself.

use crate::{
    domain::{RecordId, StudentDraft, StudentRecord},
    storage::{
        registry::{Registry, RegistryError},
        snapshot::Persistence,
    },
};

/// A user action against the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// The registration form was submitted.
    Submit(StudentDraft),
    /// The edit form for the record at `index` was submitted.
    Edit {
        /// Position of the record being edited.
        index: usize,
        /// The new field values.
        draft: StudentDraft,
    },
    /// Deletion of the record at `index` was requested.
    Delete {
        /// Position of the record to delete.
        index: usize,
    },
    /// The search box changed.
    Search(String),
}

/// The result of a successfully dispatched [`Command`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A new record was stored.
    Added {
        /// Position of the new record.
        index: usize,
        /// Synthetic id of the new record.
        id: RecordId,
    },
    /// The record at `index` was updated.
    Updated {
        /// Position of the updated record.
        index: usize,
    },
    /// The record was removed.
    Deleted(StudentRecord),
    /// The user declined to delete the record.
    Declined,
    /// Positions of the records matching a search, in order.
    Matches(Vec<usize>),
}

impl<P: Persistence> Registry<P> {
    /// Runs a command.
    ///
    /// `confirm` is consulted only for [`Command::Delete`], with the record
    /// about to be removed.
    ///
    /// # Errors
    ///
    /// Returns the error of the underlying operation. Failed commands leave
    /// the registry unchanged.
    pub fn dispatch<F>(&mut self, command: Command, confirm: F) -> Result<Outcome, RegistryError>
    where
        F: FnOnce(&StudentRecord) -> bool,
    {
        match command {
            Command::Submit(draft) => {
                let id = self.add(draft)?.id();
                let index = self.count() - 1;
                Ok(Outcome::Added { index, id })
            }
            Command::Edit { index, draft } => {
                self.update(index, draft)?;
                Ok(Outcome::Updated { index })
            }
            Command::Delete { index } => Ok(self
                .delete(index, confirm)?
                .map_or(Outcome::Declined, Outcome::Deleted)),
            Command::Search(query) => Ok(Outcome::Matches(
                self.search(&query).iter().map(|hit| hit.index).collect(),
            )),
        }
    }
}
