//! In-memory record sequence with linear-scan lookup on a key field.
//!
//! Insertion order is preserved and keys are not required to be unique; every
//! lookup returns the first match.

/// A record the store can hold: something with a key field and a way to
/// apply a partial edit.
pub trait Record: Clone + PartialEq {
    type Key: ?Sized;
    type Patch;

    fn matches_key(&self, key: &Self::Key) -> bool;

    /// Overwrites each field the patch supplies with a non-empty value.
    fn apply_patch(&mut self, patch: &Self::Patch);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordStore<R> {
    records: Vec<R>,
}

impl<R> Default for RecordStore<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<R: Record> RecordStore<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<R>) -> Self {
        Self { records }
    }

    pub fn add(&mut self, record: R) {
        self.records.push(record);
    }

    /// Removes the first structurally-equal record. Returns `false` when no
    /// such record exists.
    pub fn remove(&mut self, record: &R) -> bool {
        match self.records.iter().position(|candidate| candidate == record) {
            Some(index) => {
                self.records.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn remove_by_key(&mut self, key: &R::Key) -> Option<R> {
        let index = self.position(key)?;
        Some(self.records.remove(index))
    }

    pub fn search(&self, key: &R::Key) -> Option<&R> {
        self.records.iter().find(|record| record.matches_key(key))
    }

    /// Applies `patch` to the first record matching `key` and returns the
    /// updated record. The store is untouched when nothing matches.
    pub fn edit(&mut self, key: &R::Key, patch: &R::Patch) -> Option<R> {
        let index = self.position(key)?;
        let record = &mut self.records[index];
        record.apply_patch(patch);
        Some(record.clone())
    }

    pub fn list(&self) -> &[R] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<R> {
        self.records
    }

    fn position(&self, key: &R::Key) -> Option<usize> {
        self.records.iter().position(|record| record.matches_key(key))
    }
}

/// Replaces `slot` with `value` unless the supplied value is empty.
pub fn overwrite_if_present(slot: &mut String, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        *slot = value.to_string();
    }
}
