/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! # Digital pass wallet component
//!
//! Builds payment-card style passes from user-entered fields, derives a QR
//! code for each pass, and keeps the accumulated list in a local SQLite
//! database.
//!
//! The main entry points are:
//! * [PassForm] - one in-progress pass: field editing, card image uploads,
//!   NFC prefill and submit.
//! * [PassStore] - the persisted, append-ordered pass list.
//! * [SavedPasses] - a snapshot view of the list for display and deletion.
//! * [qr_render] - the QR pipeline, usable without a form for re-rendering
//!   saved payloads.

mod db;
mod error;
mod form;
mod nfc;
mod pass;
mod qr;
mod schema;
mod store;
mod viewer;

pub use crate::error::{Error, InvalidPass, Result};
pub use crate::form::{FormConfig, FormState, PassForm};
pub use crate::nfc::{NfcError, NfcReadResult, NfcRecord, NfcReader, ScanState};
pub use crate::pass::{
    CardSide, PassFields, PassRecord, QrCodeType, QrField, SelectedQrFields,
    DEFAULT_BACKGROUND_COLOR, DEFAULT_TEXT_COLOR,
};
pub use crate::qr::QrPayloadMode;
pub use crate::store::PassStore;
pub use crate::viewer::SavedPasses;

pub mod qr_render {
    //! Re-renders for saved payloads, e.g. exporting a stored pass as SVG.
    pub use crate::qr::{build_payload, render_pretty, render_standard};
}
