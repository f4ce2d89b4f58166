/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! # Pass data model
//!
//! Two closely related types are managed here:
//!
//! - [PassFields] is the in-progress, mutable field bag owned by the form
//!   controller. It also carries the front/back card image bytes, which are
//!   client-side only and never serialized.
//! - [PassRecord] is the unit of persistence: an immutable snapshot assembled
//!   at submit time. Once appended to the store a record is never edited, only
//!   deleted whole.
//!
//! The serialized shape of [PassRecord] uses camelCase names, matching the
//! objects the original web form wrote to its storage slot.

use serde::{Deserialize, Serialize};

pub const DEFAULT_BACKGROUND_COLOR: &str = "#FFFFFF";
pub const DEFAULT_TEXT_COLOR: &str = "#000000";

/// The fields of a pass while it is being edited. All free text, no format
/// validation; required-field presence is only checked at submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassFields {
    pub title: String,
    pub issuer_name: String,
    pub card_number: String,
    pub expiration_date: String,
    pub cardholder_name: String,
    pub cvv: String,
    pub logo: String,
    pub hero_image: String,
    pub description: String,
    pub additional_info: String,
    pub background_color: String,
    pub text_color: String,
    /// Raw url payload used by the simplest form variant
    /// ([crate::QrPayloadMode::RawUrl]).
    pub qr_code_url: String,
    /// Accepted card scan images. Only populated after the resolution check
    /// passes; never uploaded and never serialized.
    pub front_image: Option<Vec<u8>>,
    pub back_image: Option<Vec<u8>>,
}

impl Default for PassFields {
    fn default() -> Self {
        Self {
            title: String::new(),
            issuer_name: String::new(),
            card_number: String::new(),
            expiration_date: String::new(),
            cardholder_name: String::new(),
            cvv: String::new(),
            logo: String::new(),
            hero_image: String::new(),
            description: String::new(),
            additional_info: String::new(),
            background_color: DEFAULT_BACKGROUND_COLOR.to_string(),
            text_color: DEFAULT_TEXT_COLOR.to_string(),
            qr_code_url: String::new(),
            front_image: None,
            back_image: None,
        }
    }
}

/// This is what you get when reading from the store. `qr_code_data` is always
/// derived from the field values at submit time; there is deliberately no way
/// to set it directly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PassRecord {
    pub guid: String,
    pub title: String,
    pub issuer_name: String,
    pub card_number: String,
    pub expiration_date: String,
    pub cardholder_name: String,
    pub cvv: String,
    pub logo: String,
    pub hero_image: String,
    pub description: String,
    pub additional_info: String,
    pub background_color: String,
    pub text_color: String,
    /// The serialized payload actually encoded into the QR code.
    pub qr_code_data: String,
    /// PNG data URL of the styled QR image, or None if pretty rendering was
    /// not requested or failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pretty_qr_code_data: Option<String>,
    /// Milliseconds since the epoch.
    pub time_created: i64,
}

impl PassRecord {
    /// Snapshot the given fields into a new record, stamping a fresh guid and
    /// creation time. The image bytes are intentionally left behind.
    pub(crate) fn new(
        fields: &PassFields,
        qr_code_data: String,
        pretty_qr_code_data: Option<String>,
    ) -> Self {
        Self {
            guid: uuid::Uuid::new_v4().to_string(),
            title: fields.title.clone(),
            issuer_name: fields.issuer_name.clone(),
            card_number: fields.card_number.clone(),
            expiration_date: fields.expiration_date.clone(),
            cardholder_name: fields.cardholder_name.clone(),
            cvv: fields.cvv.clone(),
            logo: fields.logo.clone(),
            hero_image: fields.hero_image.clone(),
            description: fields.description.clone(),
            additional_info: fields.additional_info.clone(),
            background_color: fields.background_color.clone(),
            text_color: fields.text_color.clone(),
            qr_code_data,
            pretty_qr_code_data,
            time_created: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// The fixed set of fields that can be included in a QR payload.
///
/// [QrField::ALL] defines the canonical enumeration order; payload building
/// always iterates this order, never the order in which flags were toggled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QrField {
    Title,
    IssuerName,
    CardNumber,
    ExpirationDate,
    CardholderName,
    Cvv,
}

impl QrField {
    pub const ALL: [QrField; 6] = [
        QrField::Title,
        QrField::IssuerName,
        QrField::CardNumber,
        QrField::ExpirationDate,
        QrField::CardholderName,
        QrField::Cvv,
    ];

    /// The serialized (camelCase) key for this field.
    pub fn key(self) -> &'static str {
        match self {
            QrField::Title => "title",
            QrField::IssuerName => "issuerName",
            QrField::CardNumber => "cardNumber",
            QrField::ExpirationDate => "expirationDate",
            QrField::CardholderName => "cardholderName",
            QrField::Cvv => "cvv",
        }
    }

    /// The live value of this field in the given field bag.
    pub fn value_in(self, fields: &PassFields) -> &str {
        match self {
            QrField::Title => &fields.title,
            QrField::IssuerName => &fields.issuer_name,
            QrField::CardNumber => &fields.card_number,
            QrField::ExpirationDate => &fields.expiration_date,
            QrField::CardholderName => &fields.cardholder_name,
            QrField::Cvv => &fields.cvv,
        }
    }
}

/// Per-field "include in QR payload" flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectedQrFields {
    pub title: bool,
    pub issuer_name: bool,
    pub card_number: bool,
    pub expiration_date: bool,
    pub cardholder_name: bool,
    pub cvv: bool,
}

impl SelectedQrFields {
    pub fn is_selected(&self, field: QrField) -> bool {
        match field {
            QrField::Title => self.title,
            QrField::IssuerName => self.issuer_name,
            QrField::CardNumber => self.card_number,
            QrField::ExpirationDate => self.expiration_date,
            QrField::CardholderName => self.cardholder_name,
            QrField::Cvv => self.cvv,
        }
    }

    pub fn set(&mut self, field: QrField, selected: bool) {
        match field {
            QrField::Title => self.title = selected,
            QrField::IssuerName => self.issuer_name = selected,
            QrField::CardNumber => self.card_number = selected,
            QrField::ExpirationDate => self.expiration_date = selected,
            QrField::CardholderName => self.cardholder_name = selected,
            QrField::Cvv => self.cvv = selected,
        }
    }
}

/// Which rendering the preview should use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QrCodeType {
    #[default]
    Standard,
    Pretty,
}

/// Which side of the card an uploaded scan image belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardSide {
    Front,
    Back,
}

impl CardSide {
    pub(crate) fn field_name(self) -> &'static str {
        match self {
            CardSide::Front => "frontImage",
            CardSide::Back => "backImage",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_defaults() {
        let fields = PassFields::default();
        assert_eq!(fields.background_color, "#FFFFFF");
        assert_eq!(fields.text_color, "#000000");
        assert!(fields.front_image.is_none());
    }

    #[test]
    fn test_record_serialized_shape() {
        let record = PassRecord::new(
            &PassFields {
                title: "Gold Card".into(),
                issuer_name: "Acme".into(),
                ..PassFields::default()
            },
            "payload".into(),
            None,
        );
        let json = serde_json::to_value(&record).unwrap();
        // camelCase keys, matching the original storage slot shape.
        assert_eq!(json["issuerName"], "Acme");
        assert_eq!(json["qrCodeData"], "payload");
        // Absent pretty image serializes as a missing key, not null.
        assert!(json.get("prettyQrCodeData").is_none());
        assert!(!record.guid.is_empty());
    }

    #[test]
    fn test_record_roundtrip() {
        let record = PassRecord::new(&PassFields::default(), "data".into(), Some("url".into()));
        let json = serde_json::to_string(&record).unwrap();
        let back: PassRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_qr_field_order_is_fixed() {
        let keys: Vec<&str> = QrField::ALL.iter().map(|f| f.key()).collect();
        assert_eq!(
            keys,
            [
                "title",
                "issuerName",
                "cardNumber",
                "expirationDate",
                "cardholderName",
                "cvv"
            ]
        );
    }
}
