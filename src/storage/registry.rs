//! The student record store
//!
//! The [`Registry`] owns the in-memory [`Roster`], validates every change
//! before applying it, saves the full list after every mutation, and tells
//! any registered listeners what changed.

use std::fmt;

use crate::{
    domain::{
        validation::{self, InvalidRecord},
        RecordId, StudentDraft, StudentRecord, UniqueCheck, ValidationErrors,
    },
    storage::{
        roster::{Roster, SearchHit},
        snapshot::{Persistence, SaveError},
    },
};

/// A mutation that has just been applied to the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// A record was appended at `index`.
    Added {
        /// Position of the new record.
        index: usize,
        /// Synthetic id of the new record.
        id: RecordId,
    },
    /// The record at `index` was updated in place.
    Updated {
        /// Position of the updated record.
        index: usize,
        /// Synthetic id of the updated record.
        id: RecordId,
    },
    /// The record at `index` was removed.
    ///
    /// Records after it have moved down by one.
    Deleted {
        /// Former position of the record.
        index: usize,
        /// The removed record.
        record: StudentRecord,
    },
}

/// Errors returned by registry mutations.
///
/// None of these leave the registry modified.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// The submitted fields did not pass validation.
    #[error("invalid student record: {0}")]
    Invalid(#[from] ValidationErrors),

    /// The index does not address a record.
    #[error("no record at position {index} (there are {len} records)")]
    IndexOutOfRange {
        /// The requested position.
        index: usize,
        /// The number of records at the time.
        len: usize,
    },

    /// Every synthetic id has already been handed out.
    #[error("no unused record ids are left")]
    IdsExhausted,
}

type Listener = Box<dyn FnMut(&Change, &[StudentRecord])>;

/// An ordered, validated, persisted collection of student records.
pub struct Registry<P> {
    roster: Roster,
    persistence: P,
    listeners: Vec<Listener>,
    unsaved: bool,
}

impl<P> fmt::Debug for Registry<P>
where
    P: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("roster", &self.roster)
            .field("persistence", &self.persistence)
            .field("listeners", &self.listeners.len())
            .field("unsaved", &self.unsaved)
            .finish()
    }
}

impl<P: Persistence> Registry<P> {
    /// Opens a registry, loading any previously persisted records.
    ///
    /// If the records cannot be loaded the registry starts empty; the failure
    /// is logged and otherwise ignored.
    pub fn open(persistence: P) -> Self {
        let records = persistence.load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load student records, starting empty: {e}");
            Vec::new()
        });
        tracing::debug!("Loaded {} student records", records.len());

        Self {
            roster: Roster::from_records(records),
            persistence,
            listeners: Vec::new(),
            unsaved: false,
        }
    }

    /// Registers a callback invoked after every successful mutation, with
    /// the change and the full record list as it now stands.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&Change, &[StudentRecord]) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Validates and appends a new record.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Invalid`] if any field fails validation,
    /// including a student ID already used by another record, or
    /// [`RegistryError::IdsExhausted`] if no synthetic id is left.
    pub fn add(&mut self, draft: StudentDraft) -> Result<&StudentRecord, RegistryError> {
        self.check(&draft, UniqueCheck::New)?;

        let index = self.roster.push(draft).ok_or_else(|| {
            tracing::error!("Cannot add a student record, every record id is in use");
            RegistryError::IdsExhausted
        })?;
        let id = self.roster[index].id();
        tracing::info!("Added student record {id} at position {index}");
        self.commit(Change::Added { index, id });

        Ok(&self.roster[index])
    }

    /// Validates and applies new field values to the record at `index`.
    ///
    /// The record keeps its synthetic id and creation time and gains an
    /// update time.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::IndexOutOfRange`] if there is no record at
    /// `index`, or [`RegistryError::Invalid`] if any field fails validation.
    /// The student ID is not compared against the record being edited.
    pub fn update(
        &mut self,
        index: usize,
        draft: StudentDraft,
    ) -> Result<&StudentRecord, RegistryError> {
        let len = self.roster.len();
        if index >= len {
            return Err(Self::out_of_range(index, len));
        }
        self.check(&draft, UniqueCheck::Edit(index))?;

        let record = &mut self.roster[index];
        record.apply(draft);
        let id = record.id();
        tracing::info!("Updated student record {id} at position {index}");
        self.commit(Change::Updated { index, id });

        Ok(&self.roster[index])
    }

    /// Removes the record at `index` if `confirm` approves it.
    ///
    /// `confirm` receives the record about to be removed. Returns the removed
    /// record, or `None` if `confirm` declined.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::IndexOutOfRange`] if there is no record at
    /// `index`. `confirm` is not called in that case.
    pub fn delete<F>(
        &mut self,
        index: usize,
        confirm: F,
    ) -> Result<Option<StudentRecord>, RegistryError>
    where
        F: FnOnce(&StudentRecord) -> bool,
    {
        let Some(candidate) = self.roster.get(index) else {
            return Err(Self::out_of_range(index, self.roster.len()));
        };
        if !confirm(candidate) {
            tracing::debug!("Deletion of record at position {index} was declined");
            return Ok(None);
        }

        let removed = self.roster.remove(index);
        if let Some(record) = &removed {
            tracing::info!("Deleted student record {} from position {index}", record.id());
            self.commit(Change::Deleted {
                index,
                record: record.clone(),
            });
        }

        Ok(removed)
    }

    /// Retries saving after an earlier save failed.
    ///
    /// Does nothing if there are no unsaved changes.
    ///
    /// # Errors
    ///
    /// Returns the save error if it fails again.
    pub fn flush(&mut self) -> Result<(), SaveError> {
        if !self.unsaved {
            return Ok(());
        }
        self.persistence.save(self.roster.records())?;
        self.unsaved = false;
        Ok(())
    }

    fn commit(&mut self, change: Change) {
        match self.persistence.save(self.roster.records()) {
            Ok(()) => self.unsaved = false,
            Err(e) => {
                tracing::error!("Failed to save student records, keeping changes in memory: {e}");
                self.unsaved = true;
            }
        }

        for listener in &mut self.listeners {
            listener(&change, self.roster.records());
        }
    }
}

impl<P> Registry<P> {
    /// Runs every field validator against `draft`.
    ///
    /// # Errors
    ///
    /// Returns all failing fields.
    pub fn check(&self, draft: &StudentDraft, check: UniqueCheck) -> Result<(), ValidationErrors> {
        validation::validate_record(draft, self.roster.records(), check)
    }

    /// Checks a student ID against the format rules and the current records.
    ///
    /// # Errors
    ///
    /// Returns the first rule the ID breaks.
    pub fn check_student_id(
        &self,
        student_id: &str,
        check: UniqueCheck,
    ) -> Result<(), validation::FieldError> {
        validation::validate_student_id(student_id, self.roster.records(), check)
    }

    /// Stored records that no longer pass validation.
    #[must_use]
    pub fn audit(&self) -> Vec<InvalidRecord> {
        validation::audit(self.roster.records())
    }

    /// All records satisfying `predicate`, with their current positions.
    pub fn find<F>(&self, predicate: F) -> Vec<SearchHit<'_>>
    where
        F: FnMut(&StudentRecord) -> bool,
    {
        self.roster.find(predicate)
    }

    /// All records matching a free-text query, with their current positions.
    ///
    /// See [`Roster::search`] for the matching rules.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<SearchHit<'_>> {
        self.roster.search(query)
    }

    /// The number of records.
    #[must_use]
    pub fn count(&self) -> usize {
        self.roster.len()
    }

    /// The record at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&StudentRecord> {
        self.roster.get(index)
    }

    /// All records, in order.
    #[must_use]
    pub fn records(&self) -> &[StudentRecord] {
        self.roster.records()
    }

    /// The current position of the record with synthetic id `id`.
    #[must_use]
    pub fn position_of(&self, id: RecordId) -> Option<usize> {
        self.roster.position_of(id)
    }

    /// Whether the most recent save failed, leaving changes only in memory.
    #[must_use]
    pub const fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    /// The persistence adapter.
    #[must_use]
    pub const fn persistence(&self) -> &P {
        &self.persistence
    }

    fn out_of_range(index: usize, len: usize) -> RegistryError {
        tracing::debug!("Ignoring request for position {index}, only {len} records");
        RegistryError::IndexOutOfRange { index, len }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::{
        domain::{Field, FieldError},
        storage::{
            key_value::{MemoryStore, StoreError},
            snapshot::{JsonSnapshot, LoadError},
        },
    };

    const KEY: &str = "studentRecords";

    fn draft(name: &str, student_id: &str) -> StudentDraft {
        let email = format!("{}@uni.edu", name.to_lowercase().replace(' ', "."));
        StudentDraft::new(name, student_id, email, "0123456789")
    }

    fn registry() -> Registry<JsonSnapshot<MemoryStore>> {
        Registry::open(JsonSnapshot::new(MemoryStore::new(), KEY))
    }

    fn seeded() -> Registry<JsonSnapshot<MemoryStore>> {
        let mut registry = registry();
        registry.add(draft("John Smith", "1001")).unwrap();
        registry.add(draft("Mary Jones", "1002")).unwrap();
        registry.add(draft("Alan Turing", "1003")).unwrap();
        registry
    }

    /// A persistence adapter whose writes can be switched off.
    #[derive(Debug, Default)]
    struct Flaky {
        saved: Vec<StudentRecord>,
        failing: bool,
        saves: usize,
    }

    impl Persistence for Flaky {
        fn load(&self) -> Result<Vec<StudentRecord>, LoadError> {
            Ok(self.saved.clone())
        }

        fn save(&mut self, records: &[StudentRecord]) -> Result<(), SaveError> {
            self.saves += 1;
            if self.failing {
                return Err(SaveError::Store(StoreError::InvalidKey("offline".into())));
            }
            self.saved = records.to_vec();
            Ok(())
        }
    }

    #[test]
    fn add_increments_count_and_assigns_identity() {
        let mut registry = registry();
        let before = chrono::Utc::now();

        let record = registry.add(draft("John Smith", "1001")).unwrap().clone();

        assert_eq!(registry.count(), 1);
        assert_eq!(record.name(), "John Smith");
        assert_eq!(record.student_id(), "1001");
        assert_eq!(record.id(), RecordId::new(1));
        assert!(record.created_at() >= before);
        assert_eq!(record.updated_at(), None);
        assert_eq!(registry.search("john")[0].record, &record);
    }

    #[test]
    fn add_persists_the_full_list() {
        let registry = seeded();

        let reloaded = Registry::open(JsonSnapshot::new(
            registry.persistence().store().clone(),
            KEY,
        ));

        assert_eq!(reloaded.records(), registry.records());
    }

    #[test]
    fn duplicate_student_id_is_rejected() {
        let mut registry = seeded();

        let error = registry.add(draft("Someone Else", "1001")).unwrap_err();

        let RegistryError::Invalid(errors) = error else {
            panic!("expected validation failure, got {error:?}");
        };
        assert_eq!(
            errors.get(Field::StudentId),
            Some(&FieldError::DuplicateStudentId)
        );
        assert_eq!(registry.count(), 3);
    }

    #[test]
    fn invalid_add_reports_all_fields() {
        let mut registry = registry();

        let error = registry
            .add(StudentDraft::new("", "", "", ""))
            .unwrap_err();

        let RegistryError::Invalid(errors) = error else {
            panic!("expected validation failure, got {error:?}");
        };
        assert_eq!(errors.len(), 4);
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn update_preserves_identity() {
        let mut registry = seeded();
        let original = registry.get(1).unwrap().clone();

        let updated = registry
            .update(1, draft("Mary Jane Jones", "2002"))
            .unwrap()
            .clone();

        assert_eq!(updated.id(), original.id());
        assert_eq!(updated.created_at(), original.created_at());
        assert_eq!(updated.name(), "Mary Jane Jones");
        assert_eq!(updated.student_id(), "2002");
        assert!(updated.updated_at().is_some());
        assert_eq!(registry.get(1), Some(&updated));
    }

    #[test]
    fn update_may_keep_its_own_student_id() {
        let mut registry = seeded();
        assert!(registry.update(0, draft("Johnny Smith", "1001")).is_ok());
    }

    #[test]
    fn update_cannot_take_another_records_student_id() {
        let mut registry = seeded();

        let error = registry.update(0, draft("John Smith", "1002")).unwrap_err();

        assert!(matches!(error, RegistryError::Invalid(_)));
        assert_eq!(registry.get(0).unwrap().student_id(), "1001");
    }

    #[test]
    fn update_out_of_range_is_a_no_op() {
        let mut registry = seeded();
        let before = registry.records().to_vec();

        let error = registry.update(3, draft("Nobody Here", "9999")).unwrap_err();

        assert_eq!(error, RegistryError::IndexOutOfRange { index: 3, len: 3 });
        assert_eq!(registry.records(), before.as_slice());
    }

    #[test]
    fn delete_shifts_indices() {
        let mut registry = seeded();
        let second = registry.get(1).unwrap().clone();

        let removed = registry.delete(0, |_| true).unwrap();

        assert_eq!(removed.map(|r| r.student_id().to_string()), Some("1001".to_string()));
        assert_eq!(registry.count(), 2);
        assert_eq!(registry.get(0), Some(&second));
    }

    #[test]
    fn declined_delete_changes_nothing() {
        let mut registry = seeded();
        let mut asked_about = None;

        let removed = registry
            .delete(2, |record| {
                asked_about = Some(record.name().to_string());
                false
            })
            .unwrap();

        assert_eq!(removed, None);
        assert_eq!(asked_about.as_deref(), Some("Alan Turing"));
        assert_eq!(registry.count(), 3);
    }

    #[test]
    fn delete_out_of_range_does_not_ask() {
        let mut registry = seeded();

        let error = registry
            .delete(7, |_| panic!("confirmation should not be requested"))
            .unwrap_err();

        assert_eq!(error, RegistryError::IndexOutOfRange { index: 7, len: 3 });
    }

    #[test]
    fn position_of_tracks_records_across_deletes() {
        let mut registry = seeded();
        let id = registry.get(2).unwrap().id();

        registry.delete(0, |_| true).unwrap();

        assert_eq!(registry.position_of(id), Some(1));
    }

    #[test]
    fn corrupt_snapshot_opens_empty() {
        let store = MemoryStore::new().with_entry(KEY, "[{\"name\": 5}]");
        let mut registry = Registry::open(JsonSnapshot::new(store, KEY));

        assert_eq!(registry.count(), 0);
        registry.add(draft("John Smith", "1001")).unwrap();
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn failed_save_keeps_changes_in_memory() {
        let mut registry = Registry::open(Flaky {
            failing: true,
            ..Flaky::default()
        });

        registry.add(draft("John Smith", "1001")).unwrap();

        assert_eq!(registry.count(), 1);
        assert!(registry.has_unsaved_changes());
        assert!(registry.persistence().saved.is_empty());
        assert!(registry.flush().is_err());
    }

    #[test]
    fn flush_retries_failed_save() {
        let mut registry = Registry::open(Flaky {
            failing: true,
            ..Flaky::default()
        });
        registry.add(draft("John Smith", "1001")).unwrap();

        registry.persistence.failing = false;
        registry.flush().unwrap();

        assert!(!registry.has_unsaved_changes());
        assert_eq!(registry.persistence().saved, registry.records());
    }

    #[test]
    fn flush_without_pending_changes_does_not_save() {
        let mut registry = Registry::open(Flaky::default());
        registry.add(draft("John Smith", "1001")).unwrap();
        let saves = registry.persistence().saves;

        registry.flush().unwrap();

        assert_eq!(registry.persistence().saves, saves);
    }

    #[test]
    fn listeners_see_each_successful_change() {
        let mut registry = registry();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        registry.subscribe(move |change, records| {
            sink.borrow_mut().push((change.clone(), records.len()));
        });

        registry.add(draft("John Smith", "1001")).unwrap();
        registry.add(draft("John Smith", "1001")).unwrap_err();
        registry.update(0, draft("John Smyth", "1001")).unwrap();
        registry.update(5, draft("John Smyth", "1001")).unwrap_err();
        assert_eq!(registry.delete(0, |_| false).unwrap(), None);
        registry.delete(9, |_| true).unwrap_err();
        assert_eq!(seen.borrow().len(), 2);
        let removed = registry.delete(0, |_| true).unwrap().unwrap();

        let id = removed.id();
        assert_eq!(
            *seen.borrow(),
            vec![
                (Change::Added { index: 0, id }, 1),
                (Change::Updated { index: 0, id }, 1),
                (
                    Change::Deleted {
                        index: 0,
                        record: removed
                    },
                    0
                ),
            ]
        );
    }

    #[test]
    fn ids_resume_after_reopen() {
        let registry = seeded();
        let store = registry.persistence().store().clone();
        let mut reopened = Registry::open(JsonSnapshot::new(store, KEY));

        let record = reopened.add(draft("Grace Hopper", "1004")).unwrap();

        assert_eq!(record.id(), RecordId::new(4));
    }

    #[test]
    fn snapshot_holding_the_last_id_opens_but_refuses_adds() {
        let mut registry = registry();
        registry.add(draft("John Smith", "1001")).unwrap();
        let mut records = registry.records().to_vec();
        records[0].id = RecordId::new(u64::MAX);
        let mut snapshot = JsonSnapshot::new(MemoryStore::new(), KEY);
        snapshot.save(&records).unwrap();

        let mut reopened = Registry::open(snapshot);

        assert_eq!(reopened.records(), records.as_slice());
        assert_eq!(
            reopened.add(draft("Grace Hopper", "1004")).unwrap_err(),
            RegistryError::IdsExhausted
        );
        assert_eq!(reopened.count(), 1);
        assert!(reopened.update(0, draft("John Smyth", "1001")).is_ok());
    }

    #[test]
    fn update_out_of_range_is_reported_before_validation() {
        let mut registry = seeded();

        let error = registry.update(3, StudentDraft::default()).unwrap_err();

        assert_eq!(error, RegistryError::IndexOutOfRange { index: 3, len: 3 });
    }

    #[test]
    fn audit_finds_records_edited_outside_the_registry() {
        let mut registry = registry();
        registry.add(draft("John Smith", "1001")).unwrap();
        let mut records = registry.records().to_vec();
        records[0].contact = "123".to_string();
        let mut snapshot = JsonSnapshot::new(MemoryStore::new(), KEY);
        snapshot.save(&records).unwrap();

        let reopened = Registry::open(snapshot);
        let problems = reopened.audit();

        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].index, 0);
        assert_eq!(
            problems[0].errors.get(Field::Contact),
            Some(&FieldError::TooShort {
                field: Field::Contact,
                min: 10
            })
        );
    }
}
