//! An in-memory, ordered list of student records
//!
//! The [`Roster`] knows nothing about validation or persistence. It owns the
//! records in insertion order and hands out synthetic ids.

use std::ops::{Index, IndexMut};

use crate::domain::{RecordId, StudentDraft, StudentRecord};

/// A record matched by a search, together with its current position.
///
/// Positions go stale after any add or delete, so resolve them again before
/// holding on to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchHit<'a> {
    /// Position of the record in the full list.
    pub index: usize,
    /// The matching record.
    pub record: &'a StudentRecord,
}

/// The ordered record list and the synthetic id counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    /// The records, in insertion order.
    records: Vec<StudentRecord>,

    /// The id the next added record receives. `None` once every id has
    /// been handed out.
    next_id: Option<RecordId>,
}

impl Default for Roster {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            next_id: Some(RecordId::new(1)),
        }
    }
}

impl Roster {
    /// Builds a roster from previously persisted records.
    ///
    /// The id counter resumes after the largest id present.
    #[must_use]
    pub fn from_records(records: Vec<StudentRecord>) -> Self {
        let next_id = records
            .iter()
            .map(StudentRecord::id)
            .max()
            .map_or(Some(RecordId::new(1)), RecordId::next);
        Self { records, next_id }
    }

    /// Appends a new record built from `draft`, returning its position.
    ///
    /// Returns `None`, leaving the roster untouched, when no unused id is
    /// left.
    pub fn push(&mut self, draft: StudentDraft) -> Option<usize> {
        let id = self.next_id?;
        self.next_id = id.next();
        self.records.push(StudentRecord::new(id, draft));
        Some(self.records.len() - 1)
    }

    /// Retrieves a record by position.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&StudentRecord> {
        self.records.get(index)
    }

    /// Removes the record at `index`, shifting later records down by one.
    pub fn remove(&mut self, index: usize) -> Option<StudentRecord> {
        (index < self.records.len()).then(|| self.records.remove(index))
    }

    /// The records, in order.
    #[must_use]
    pub fn records(&self) -> &[StudentRecord] {
        &self.records
    }

    /// The number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The current position of the record with the given synthetic id.
    #[must_use]
    pub fn position_of(&self, id: RecordId) -> Option<usize> {
        self.records.iter().position(|record| record.id() == id)
    }

    /// All records satisfying `predicate`, in order.
    pub fn find<F>(&self, mut predicate: F) -> Vec<SearchHit<'_>>
    where
        F: FnMut(&StudentRecord) -> bool,
    {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, record)| predicate(record))
            .map(|(index, record)| SearchHit { index, record })
            .collect()
    }

    /// All records matching a free-text query.
    ///
    /// Name, student ID and email are matched case-insensitively; the contact
    /// number is matched as typed. A blank query matches everything.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<SearchHit<'_>> {
        if query.trim().is_empty() {
            return self.find(|_| true);
        }
        let needle = query.to_lowercase();
        self.find(|record| {
            record.name.to_lowercase().contains(&needle)
                || record.student_id.to_lowercase().contains(&needle)
                || record.email.to_lowercase().contains(&needle)
                || record.contact.contains(query)
        })
    }
}

impl Index<usize> for Roster {
    type Output = StudentRecord;

    fn index(&self, index: usize) -> &Self::Output {
        &self.records[index]
    }
}

impl IndexMut<usize> for Roster {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.records[index]
    }
}
