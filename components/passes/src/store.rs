/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! # Pass record store
//!
//! The full ordered list of saved passes lives under a single named slot,
//! serialized as a versioned JSON envelope. Every mutation is a
//! read-modify-write of the whole list: last writer wins, no partial-write
//! recovery. That matches the storage-slot semantics of the original; a
//! failed write propagates (so the caller can retry) and the previously
//! stored value is assumed retained.
//!
//! A missing slot is an empty list. So is an unparsable one: corrupt data is
//! logged and treated as empty rather than surfaced as an error.

use crate::db::{self, PassDb};
use crate::error::*;
use crate::pass::PassRecord;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The slot the original web form used in its origin-scoped storage.
const PASSES_SLOT: &str = "savedPasses";

/// Version tag for the serialized envelope. The original stored a bare JSON
/// array with no version information; the tag lets the format evolve without
/// guessing.
const ENVELOPE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct StoredPasses {
    version: u32,
    passes: Vec<PassRecord>,
}

pub struct PassStore {
    db: Mutex<PassDb>,
}

impl PassStore {
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            db: Mutex::new(PassDb::open(db_path)?),
        })
    }

    /// Creates a store backed by an in-memory database.
    pub fn new_in_memory() -> Result<Self> {
        Ok(Self {
            db: Mutex::new(PassDb::open_in_memory()?),
        })
    }

    /// The full current list, in insertion order.
    pub fn list(&self) -> Result<Vec<PassRecord>> {
        let db = self.db.lock();
        read_passes(&db)
    }

    pub fn count(&self) -> Result<usize> {
        Ok(self.list()?.len())
    }

    /// Append one record. Records are immutable once appended; there is no
    /// edit-in-place.
    pub fn append(&self, record: &PassRecord) -> Result<()> {
        let db = self.db.lock();
        let mut passes = read_passes(&db)?;
        passes.push(record.clone());
        write_passes(&db, &passes)
    }

    /// Remove the record at `index`, shifting all later records. Out-of-range
    /// indices are a no-op, never an error.
    pub fn delete(&self, index: usize) -> Result<()> {
        let db = self.db.lock();
        let mut passes = read_passes(&db)?;
        if index >= passes.len() {
            log::warn!(
                "ignoring delete of pass {} (only {} stored)",
                index,
                passes.len()
            );
            return Ok(());
        }
        passes.remove(index);
        write_passes(&db, &passes)
    }

    /// Delete everything in the slot.
    pub fn wipe(&self) -> Result<()> {
        let db = self.db.lock();
        write_passes(&db, &[])
    }

    #[cfg(test)]
    pub(crate) fn corrupt_slot_for_test(&self, raw: &str) {
        let db = self.db.lock();
        db::put_slot(&db, PASSES_SLOT, raw).unwrap();
    }
}

fn read_passes(db: &PassDb) -> Result<Vec<PassRecord>> {
    let raw = match db::get_slot(db, PASSES_SLOT)? {
        Some(raw) => raw,
        None => return Ok(Vec::new()),
    };
    match serde_json::from_str::<StoredPasses>(&raw) {
        Ok(stored) if stored.version == ENVELOPE_VERSION => Ok(stored.passes),
        Ok(stored) => {
            log::warn!(
                "stored passes have unknown envelope version {}; treating as empty",
                stored.version
            );
            Ok(Vec::new())
        }
        Err(e) => {
            log::warn!("stored passes are unparsable ({}); treating as empty", e);
            Ok(Vec::new())
        }
    }
}

fn write_passes(db: &PassDb, passes: &[PassRecord]) -> Result<()> {
    let envelope = StoredPasses {
        version: ENVELOPE_VERSION,
        passes: passes.to_vec(),
    };
    db::put_slot(db, PASSES_SLOT, &serde_json::to_string(&envelope)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pass::PassFields;

    fn sample_record(title: &str) -> PassRecord {
        PassRecord::new(
            &PassFields {
                title: title.into(),
                issuer_name: "Acme".into(),
                ..PassFields::default()
            },
            format!("payload-{}", title),
            None,
        )
    }

    #[test]
    fn test_empty_store_lists_nothing() {
        let store = PassStore::new_in_memory().unwrap();
        assert_eq!(store.list().unwrap(), vec![]);
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_append_then_list_roundtrips() {
        let store = PassStore::new_in_memory().unwrap();
        let record = sample_record("Gold Card");
        store.append(&record).unwrap();
        assert_eq!(store.list().unwrap(), vec![record]);
    }

    #[test]
    fn test_out_of_range_delete_is_noop() {
        let store = PassStore::new_in_memory().unwrap();
        let record = sample_record("Gold Card");
        store.append(&record).unwrap();
        store.delete(1).unwrap();
        store.delete(usize::MAX).unwrap();
        assert_eq!(store.list().unwrap(), vec![record]);
        // Deleting from an empty store is also fine.
        store.delete(0).unwrap();
        store.delete(0).unwrap();
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_delete_shifts_later_records() {
        let store = PassStore::new_in_memory().unwrap();
        let first = sample_record("First");
        let second = sample_record("Second");
        store.append(&first).unwrap();
        store.append(&second).unwrap();
        store.delete(0).unwrap();
        assert_eq!(store.list().unwrap(), vec![second]);
    }

    #[test]
    fn test_unparsable_slot_is_empty_list() {
        let store = PassStore::new_in_memory().unwrap();
        store.append(&sample_record("Gold Card")).unwrap();
        store.corrupt_slot_for_test("{not json");
        assert_eq!(store.list().unwrap(), vec![]);
        // And the store keeps working afterwards.
        let record = sample_record("Fresh");
        store.append(&record).unwrap();
        assert_eq!(store.list().unwrap(), vec![record]);
    }

    #[test]
    fn test_unknown_envelope_version_is_empty_list() {
        let store = PassStore::new_in_memory().unwrap();
        store.corrupt_slot_for_test(r#"{"version":99,"passes":[]}"#);
        assert_eq!(store.list().unwrap(), vec![]);
    }

    #[test]
    fn test_wipe() {
        let store = PassStore::new_in_memory().unwrap();
        store.append(&sample_record("One")).unwrap();
        store.append(&sample_record("Two")).unwrap();
        store.wipe().unwrap();
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("passes.db");
        let record = sample_record("Durable");
        {
            let store = PassStore::new(&path).unwrap();
            store.append(&record).unwrap();
        }
        let store = PassStore::new(&path).unwrap();
        assert_eq!(store.list().unwrap(), vec![record]);
    }
}
