/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! Database handling.
//!
//! [PassDb] wraps a single writable SQLite connection; serialization of
//! access is handled one level up by the store's mutex. The slot accessors
//! here are the only SQL in the component.

use crate::error::*;
use crate::schema;
use rusqlite::{Connection, OpenFlags, OptionalExtension};
use std::{
    ops::Deref,
    path::{Path, PathBuf},
};

pub struct PassDb {
    writer: Connection,
}

impl PassDb {
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        Self::open_named(db_path.as_ref().to_owned())
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::init(&conn)?;
        Ok(Self { writer: conn })
    }

    fn open_named(db_path: PathBuf) -> Result<Self> {
        let flags = OpenFlags::SQLITE_OPEN_NO_MUTEX
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_READ_WRITE;
        let conn = Connection::open_with_flags(db_path, flags)?;
        schema::init(&conn)?;
        Ok(Self { writer: conn })
    }
}

impl Deref for PassDb {
    type Target = Connection;

    fn deref(&self) -> &Self::Target {
        &self.writer
    }
}

/// Fetch the raw serialized value stored under `key`, if any.
pub(crate) fn get_slot(conn: &Connection, key: &str) -> Result<Option<String>> {
    Ok(conn
        .query_row(
            "SELECT data FROM passes_data WHERE key = ?1",
            [key],
            |row| row.get(0),
        )
        .optional()?)
}

/// Overwrite the value stored under `key`. Last writer wins, matching the
/// storage slot semantics of the original.
pub(crate) fn put_slot(conn: &Connection, key: &str, data: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO passes_data (key, data) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET data=excluded.data",
        [key, data],
    )?;
    Ok(())
}
