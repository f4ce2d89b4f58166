/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! # NFC scanner adapter
//!
//! NFC reading is an optional host capability, modeled as the [NfcReader]
//! trait so the embedding shell can inject whatever it has (or nothing).
//! A scan is best-effort, fire-and-forget hardware I/O: it either yields one
//! [NfcReadResult] or one error, with no retry policy. Another manual scan
//! attempt is the only recovery path.
//!
//! The read result is ephemeral: the form copies the serial number into
//! `cardNumber` and a pretty-printed dump of the records into
//! `additionalInfo`, and nothing else.

use serde::Serialize;

/// One NDEF-style record from a scanned tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NfcRecord {
    pub record_type: String,
    pub media_type: String,
    pub data: String,
}

/// The outcome of a successful scan. Not persisted as its own entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NfcReadResult {
    pub serial_number: String,
    pub records: Vec<NfcRecord>,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum NfcError {
    #[error("NFC reading is not supported on this device")]
    Unsupported,

    #[error("A scan is already in progress")]
    ScanInProgress,

    #[error("NFC permission was denied")]
    PermissionDenied,

    #[error("NFC read failed: {0}")]
    ReadFailed(String),
}

/// Scanner state as seen by the form. `Failed` keeps the last error message
/// around for display; the next scan attempt resets it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ScanState {
    #[default]
    Idle,
    Scanning,
    Failed {
        message: String,
    },
}

/// Host NFC capability. `is_available` must be checked (and must not panic)
/// before any scan attempt; `scan` blocks until one read completes or fails.
pub trait NfcReader {
    fn is_available(&self) -> bool;
    fn scan(&mut self) -> Result<NfcReadResult, NfcError>;
}

/// Human-readable dump of all scanned records, for the `additionalInfo`
/// prefill.
pub(crate) fn records_dump(result: &NfcReadResult) -> String {
    serde_json::to_string_pretty(&result.records).unwrap_or_else(|e| {
        log::warn!("NFC record dump failed to serialize: {}", e);
        String::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_dump_is_pretty_printed() {
        let result = NfcReadResult {
            serial_number: "04:a2:55:01".into(),
            records: vec![NfcRecord {
                record_type: "text".into(),
                media_type: "text/plain".into(),
                data: "hello".into(),
            }],
        };
        let dump = records_dump(&result);
        assert!(dump.contains("\"recordType\": \"text\""));
        assert!(dump.contains("\"data\": \"hello\""));
        // Multi-line, i.e. actually pretty-printed.
        assert!(dump.contains('\n'));
    }
}
