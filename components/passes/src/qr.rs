/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! # QR payload building and rendering
//!
//! The payload is the string actually encoded into the QR code. Which fields
//! contribute is decided by [QrPayloadMode]; key order is always the fixed
//! [QrField](crate::pass::QrField) enumeration order, which we get for free by
//! serializing fixed-shape structs (struct fields serialize in declaration
//! order) rather than a map.
//!
//! Rendering comes in two flavors:
//! - [render_standard]: deterministic SVG markup, suitable for an inline
//!   preview. Same payload and colors produce byte-identical output.
//! - [render_pretty]: a high error-correction PNG returned as a base64 data
//!   URL. This path is best-effort: any failure logs a warning and resolves
//!   to `None` so a missing image is all the caller ever sees.

use crate::error::*;
use crate::pass::{PassFields, SelectedQrFields};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use qrcode::render::svg;
use qrcode::{EcLevel, QrCode};
use serde::Serialize;
use std::io::Cursor;

/// How the QR payload is derived from the form fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QrPayloadMode {
    /// JSON-encode exactly {title, cardNumber, expirationDate,
    /// cardholderName}, in that key order.
    #[default]
    FixedSubset,
    /// JSON-encode only the fields whose selection flag is set, in
    /// enumeration order.
    Selected,
    /// The raw `qrCodeUrl` field, no JSON wrapping.
    RawUrl,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FixedPayload<'a> {
    title: &'a str,
    card_number: &'a str,
    expiration_date: &'a str,
    cardholder_name: &'a str,
}

// Declaration order here is the canonical QrField enumeration order; absent
// fields are skipped, so the emitted keys are exactly the selected subset.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SelectedPayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    issuer_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    card_number: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expiration_date: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cardholder_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cvv: Option<&'a str>,
}

/// Derive the payload string from the live field values. An empty payload
/// (nothing selected, empty url) is legal.
pub fn build_payload(
    fields: &PassFields,
    mode: QrPayloadMode,
    selected: &SelectedQrFields,
) -> Result<String> {
    let payload = match mode {
        QrPayloadMode::FixedSubset => serde_json::to_string(&FixedPayload {
            title: &fields.title,
            card_number: &fields.card_number,
            expiration_date: &fields.expiration_date,
            cardholder_name: &fields.cardholder_name,
        })?,
        QrPayloadMode::Selected => serde_json::to_string(&SelectedPayload {
            title: selected.title.then_some(fields.title.as_str()),
            issuer_name: selected.issuer_name.then_some(fields.issuer_name.as_str()),
            card_number: selected.card_number.then_some(fields.card_number.as_str()),
            expiration_date: selected
                .expiration_date
                .then_some(fields.expiration_date.as_str()),
            cardholder_name: selected
                .cardholder_name
                .then_some(fields.cardholder_name.as_str()),
            cvv: selected.cvv.then_some(fields.cvv.as_str()),
        })?,
        QrPayloadMode::RawUrl => fields.qr_code_url.clone(),
    };
    Ok(payload)
}

/// Render the payload as SVG markup at 128x128 minimum dimensions with the
/// pass's colors. Deterministic: repeated calls with the same inputs return
/// byte-identical markup.
pub fn render_standard(payload: &str, text_color: &str, background_color: &str) -> Result<String> {
    let code = QrCode::new(payload)?;
    Ok(code
        .render::<svg::Color<'_>>()
        .min_dimensions(128, 128)
        .dark_color(svg::Color(text_color))
        .light_color(svg::Color(background_color))
        .build())
}

/// Render the payload as a high error-correction PNG data URL. Failure never
/// propagates; the caller gets `None` and shows no image.
pub fn render_pretty(payload: &str, text_color: &str, background_color: &str) -> Option<String> {
    match pretty_data_url(payload, text_color, background_color) {
        Ok(url) => Some(url),
        Err(e) => {
            log::warn!("pretty QR rendering failed: {}", e);
            None
        }
    }
}

fn pretty_data_url(payload: &str, text_color: &str, background_color: &str) -> Result<String> {
    let dark = parse_hex_color(text_color)?;
    let light = parse_hex_color(background_color)?;
    let code = QrCode::with_error_correction_level(payload, EcLevel::H)?;
    let image = code
        .render::<image::Rgba<u8>>()
        .quiet_zone(true)
        .dark_color(image::Rgba([dark[0], dark[1], dark[2], 255]))
        .light_color(image::Rgba([light[0], light[1], light[2], 255]))
        .build();

    let mut buffer: Vec<u8> = Vec::new();
    image.write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)?;
    Ok(format!(
        "data:image/png;base64,{}",
        BASE64.encode(&buffer)
    ))
}

/// Parse a `#RRGGBB` (or shorthand `#RGB`) color string.
fn parse_hex_color(color: &str) -> Result<[u8; 3]> {
    let hex = color.strip_prefix('#').unwrap_or(color);
    let invalid = || Error::InvalidColor(color.to_string());
    if !hex.is_ascii() {
        return Err(invalid());
    }
    match hex.len() {
        6 => {
            let mut rgb = [0u8; 3];
            for (i, chunk) in rgb.iter_mut().enumerate() {
                *chunk =
                    u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).map_err(|_| invalid())?;
            }
            Ok(rgb)
        }
        3 => {
            let mut rgb = [0u8; 3];
            for (i, chunk) in rgb.iter_mut().enumerate() {
                let nibble =
                    u8::from_str_radix(&hex[i..i + 1], 16).map_err(|_| invalid())?;
                *chunk = nibble << 4 | nibble;
            }
            Ok(rgb)
        }
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pass::QrField;

    fn sample_fields() -> PassFields {
        PassFields {
            title: "Gold Card".into(),
            issuer_name: "Acme".into(),
            card_number: "4111 1111 1111 1111".into(),
            expiration_date: "12/30".into(),
            cardholder_name: "J. Doe".into(),
            cvv: "123".into(),
            ..PassFields::default()
        }
    }

    #[test]
    fn test_fixed_subset_payload() {
        let payload =
            build_payload(&sample_fields(), QrPayloadMode::FixedSubset, &Default::default())
                .unwrap();
        assert_eq!(
            payload,
            r#"{"title":"Gold Card","cardNumber":"4111 1111 1111 1111","expirationDate":"12/30","cardholderName":"J. Doe"}"#
        );
    }

    #[test]
    fn test_selected_payload_follows_enumeration_order() {
        let fields = sample_fields();
        // Toggle in reverse order; output order must not change.
        let mut selected = SelectedQrFields::default();
        selected.set(QrField::Cvv, true);
        selected.set(QrField::Title, true);
        let payload = build_payload(&fields, QrPayloadMode::Selected, &selected).unwrap();
        assert_eq!(payload, r#"{"title":"Gold Card","cvv":"123"}"#);

        let mut other_order = SelectedQrFields::default();
        other_order.set(QrField::Title, true);
        other_order.set(QrField::Cvv, true);
        assert_eq!(
            payload,
            build_payload(&fields, QrPayloadMode::Selected, &other_order).unwrap()
        );
    }

    #[test]
    fn test_empty_selection_payload() {
        let payload =
            build_payload(&sample_fields(), QrPayloadMode::Selected, &Default::default()).unwrap();
        assert_eq!(payload, "{}");
        // The near-empty payload must still encode.
        assert!(render_standard(&payload, "#000000", "#FFFFFF").is_ok());
    }

    #[test]
    fn test_raw_url_payload() {
        let fields = PassFields {
            qr_code_url: "https://example.com/pass".into(),
            ..PassFields::default()
        };
        let payload = build_payload(&fields, QrPayloadMode::RawUrl, &Default::default()).unwrap();
        assert_eq!(payload, "https://example.com/pass");
    }

    #[test]
    fn test_standard_render_is_deterministic() {
        let a = render_standard("hello", "#112233", "#FFFFFF").unwrap();
        let b = render_standard("hello", "#112233", "#FFFFFF").unwrap();
        assert_eq!(a, b);
        assert!(a.contains("svg"));
    }

    #[test]
    fn test_standard_render_empty_payload() {
        assert!(render_standard("", "#000000", "#FFFFFF").is_ok());
    }

    #[test]
    fn test_pretty_render_produces_data_url() {
        let url = render_pretty("hello", "#000000", "#FFFFFF").unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_pretty_render_bad_color_resolves_to_none() {
        assert_eq!(render_pretty("hello", "not-a-color", "#FFFFFF"), None);
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#FFFFFF").unwrap(), [255, 255, 255]);
        assert_eq!(parse_hex_color("#000000").unwrap(), [0, 0, 0]);
        assert_eq!(parse_hex_color("#4ECDC4").unwrap(), [0x4e, 0xcd, 0xc4]);
        assert_eq!(parse_hex_color("#abc").unwrap(), [0xaa, 0xbb, 0xcc]);
        assert!(parse_hex_color("").is_err());
        assert!(parse_hex_color("#12345").is_err());
    }
}
