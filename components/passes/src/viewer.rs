/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! Read-mostly view over the saved pass list, for the "saved passes" screen.
//! Records are loaded once and held in memory; deletion forwards to the
//! store first and only mirrors the change locally once the write succeeded.

use crate::error::*;
use crate::pass::PassRecord;
use crate::store::PassStore;

#[derive(Debug, Default)]
pub struct SavedPasses {
    passes: Vec<PassRecord>,
}

impl SavedPasses {
    pub fn load(store: &PassStore) -> Result<Self> {
        Ok(Self {
            passes: store.list()?,
        })
    }

    pub fn passes(&self) -> &[PassRecord] {
        &self.passes
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Delete by position. Out-of-range indices are a no-op, matching the
    /// store's behavior, so a stale view can't remove the wrong record.
    pub fn delete(&mut self, store: &PassStore, index: usize) -> Result<()> {
        store.delete(index)?;
        if index < self.passes.len() {
            self.passes.remove(index);
        }
        Ok(())
    }
}
