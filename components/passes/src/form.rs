/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! # Pass form controller
//!
//! [PassForm] owns one in-progress pass. The original app had several
//! near-duplicate page variants that differed only in which fields existed
//! and whether the QR payload was field-selectable; those collapse into
//! [FormConfig] options here.
//!
//! State machine: `Editing -> (submit) -> {rejected: Editing | accepted:
//! Submitted}`. Rejection never mutates anything; acceptance derives the QR
//! payload, renders the pretty image when requested, appends the assembled
//! record to the store and parks the form in `Submitted`. A store write
//! failure keeps the form in `Editing` so the submit can be retried.

use crate::error::*;
use crate::nfc::{self, NfcError, NfcReader, ScanState};
use crate::pass::{CardSide, PassFields, PassRecord, QrCodeType, QrField, SelectedQrFields};
use crate::qr::{self, QrPayloadMode};
use crate::store::PassStore;
use std::io::Cursor;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Minimum width and height for an accepted card scan image.
const MIN_CARD_IMAGE_DIMENSION: u32 = 300;

/// How long an image decode may take before the upload is rejected. The
/// original waited on a load event with no timeout, so a malformed image
/// could stall validation forever.
const DEFAULT_IMAGE_DECODE_DEADLINE: Duration = Duration::from_secs(5);

/// Per-variant form behavior.
#[derive(Debug, Clone)]
pub struct FormConfig {
    /// Fields that must be non-empty at submit.
    pub required_fields: Vec<QrField>,
    /// Whether the privacy agreement checkbox must be ticked.
    pub privacy_agreement_required: bool,
    /// How the QR payload is derived (see [QrPayloadMode]).
    pub qr_payload_mode: QrPayloadMode,
    pub image_decode_deadline: Duration,
}

impl Default for FormConfig {
    // The richest of the original page variants.
    fn default() -> Self {
        Self {
            required_fields: vec![QrField::Title, QrField::IssuerName],
            privacy_agreement_required: true,
            qr_payload_mode: QrPayloadMode::FixedSubset,
            image_decode_deadline: DEFAULT_IMAGE_DECODE_DEADLINE,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormState {
    #[default]
    Editing,
    Submitted,
}

#[derive(Default)]
pub struct PassForm {
    config: FormConfig,
    pub fields: PassFields,
    pub selected_qr_fields: SelectedQrFields,
    pub qr_code_type: QrCodeType,
    pub privacy_agreed: bool,
    state: FormState,
    scan_state: ScanState,
}

impl PassForm {
    pub fn new(config: FormConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn scan_state(&self) -> &ScanState {
        &self.scan_state
    }

    /// Accept a card scan image, or reject it at input time (not at submit)
    /// if it can't be decoded or is smaller than 300x300 in either dimension.
    /// Rejected bytes are not stored.
    pub fn set_card_image(
        &mut self,
        side: CardSide,
        bytes: Vec<u8>,
    ) -> std::result::Result<(), InvalidPass> {
        let field = side.field_name();
        let (width, height) = decode_dimensions(bytes.clone(), self.config.image_decode_deadline)
            .map_err(|e| match e {
                DecodeFailure::Undecodable(reason) => InvalidPass::ImageUndecodable {
                    field,
                    reason,
                },
                DecodeFailure::TimedOut => InvalidPass::ImageDecodeTimeout { field },
            })?;
        if width < MIN_CARD_IMAGE_DIMENSION || height < MIN_CARD_IMAGE_DIMENSION {
            return Err(InvalidPass::ImageTooSmall {
                field,
                width,
                height,
            });
        }
        match side {
            CardSide::Front => self.fields.front_image = Some(bytes),
            CardSide::Back => self.fields.back_image = Some(bytes),
        }
        Ok(())
    }

    /// Run one NFC scan against the injected reader.
    ///
    /// `Idle -> Scanning -> Idle` on success, `-> Failed` on error. A success
    /// copies the serial number into `cardNumber` and a record dump into
    /// `additionalInfo`; an error leaves the fields untouched. Re-entry while
    /// a scan is in flight is rejected.
    pub fn scan_nfc(
        &mut self,
        reader: &mut dyn NfcReader,
    ) -> std::result::Result<(), NfcError> {
        if self.scan_state == ScanState::Scanning {
            return Err(NfcError::ScanInProgress);
        }
        if !reader.is_available() {
            let err = NfcError::Unsupported;
            self.scan_state = ScanState::Failed {
                message: err.to_string(),
            };
            return Err(err);
        }
        self.scan_state = ScanState::Scanning;
        match reader.scan() {
            Ok(read) => {
                self.fields.card_number = read.serial_number.clone();
                self.fields.additional_info = nfc::records_dump(&read);
                self.scan_state = ScanState::Idle;
                Ok(())
            }
            Err(e) => {
                self.scan_state = ScanState::Failed {
                    message: e.to_string(),
                };
                Err(e)
            }
        }
    }

    fn check_valid(&self) -> std::result::Result<(), InvalidPass> {
        for field in &self.config.required_fields {
            if field.value_in(&self.fields).is_empty() {
                return Err(InvalidPass::EmptyRequiredField { field: field.key() });
            }
        }
        if self.config.privacy_agreement_required && !self.privacy_agreed {
            return Err(InvalidPass::PrivacyNotAccepted);
        }
        Ok(())
    }

    /// Validate, derive the QR payload, assemble the final immutable record
    /// and append it to the store.
    ///
    /// On rejection the [InvalidPass] is returned, nothing is appended and
    /// the form stays in `Editing` with all state intact. The pretty image is
    /// only rendered when `qr_code_type` asks for it, and its failure
    /// downgrades to `pretty_qr_code_data = None` rather than an error.
    pub fn submit(&mut self, store: &PassStore) -> Result<PassRecord> {
        if self.state == FormState::Submitted {
            return Err(Error::AlreadySubmitted);
        }
        self.check_valid()?;

        let payload = qr::build_payload(
            &self.fields,
            self.config.qr_payload_mode,
            &self.selected_qr_fields,
        )?;
        // An oversized payload should fail the submit, not the later preview.
        qr::render_standard(
            &payload,
            &self.fields.text_color,
            &self.fields.background_color,
        )?;
        let pretty = match self.qr_code_type {
            QrCodeType::Pretty => qr::render_pretty(
                &payload,
                &self.fields.text_color,
                &self.fields.background_color,
            ),
            QrCodeType::Standard => None,
        };

        let record = PassRecord::new(&self.fields, payload, pretty);
        store.append(&record)?;
        self.state = FormState::Submitted;
        Ok(record)
    }

    #[cfg(test)]
    pub(crate) fn force_scanning_for_test(&mut self) {
        self.scan_state = ScanState::Scanning;
    }
}

enum DecodeFailure {
    Undecodable(String),
    TimedOut,
}

/// Decode just the dimensions of an uploaded image, bounded by a deadline.
/// The decode runs on a helper thread so a pathological input can't stall
/// the form; on expiry the thread is abandoned and the upload rejected.
fn decode_dimensions(
    bytes: Vec<u8>,
    deadline: Duration,
) -> std::result::Result<(u32, u32), DecodeFailure> {
    let (tx, rx) = mpsc::channel();
    let spawned = thread::Builder::new()
        .name("pass-image-decode".into())
        .spawn(move || {
            let result = image::ImageReader::new(Cursor::new(bytes))
                .with_guessed_format()
                .map_err(|e| e.to_string())
                .and_then(|reader| reader.into_dimensions().map_err(|e| e.to_string()));
            let _ = tx.send(result);
        });
    if let Err(e) = spawned {
        return Err(DecodeFailure::Undecodable(e.to_string()));
    }
    match rx.recv_timeout(deadline) {
        Ok(Ok(dimensions)) => Ok(dimensions),
        Ok(Err(reason)) => Err(DecodeFailure::Undecodable(reason)),
        Err(_) => Err(DecodeFailure::TimedOut),
    }
}
