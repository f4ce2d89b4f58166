/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! Passes schema v1
//! ================
//!
//! A single key-value table, `passes_data`, mirroring the origin-scoped
//! storage slot the original web form used: one named key (`savedPasses`)
//! whose value is the JSON envelope holding the full ordered list of records.
//! The envelope carries its own format version (see `store.rs`), so the SQL
//! schema itself should rarely need to change.

use crate::error::*;
use rusqlite::Connection;

/// Current schema version.
const VERSION: i64 = 1;

const CREATE_PASSES_DATA_SQL: &str = "
    CREATE TABLE IF NOT EXISTS passes_data (
        key  TEXT PRIMARY KEY,
        data TEXT NOT NULL
    )";

pub fn init(conn: &Connection) -> Result<()> {
    let user_version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if user_version == 0 {
        create(conn)?;
    } else if user_version != VERSION {
        // A future (or corrupt) schema version. The envelope format is
        // versioned separately, so there's nothing to migrate here; start
        // fresh and let the slot read back as an empty list.
        log::warn!(
            "passes db has unexpected schema version {}; recreating",
            user_version
        );
        conn.execute("DROP TABLE IF EXISTS passes_data", [])?;
        create(conn)?;
    }
    Ok(())
}

fn create(conn: &Connection) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute(CREATE_PASSES_DATA_SQL, [])?;
    tx.pragma_update(None, "user_version", VERSION)?;
    tx.commit()?;
    Ok(())
}
