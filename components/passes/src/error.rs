/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

pub type Result<T> = std::result::Result<T, Error>;

/// Passes error type.
///
/// Nothing here is fatal to the embedding application: validation errors are
/// recoverable (the form keeps its state), and storage errors leave the
/// previously stored list intact so the operation can be retried.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid pass: {0}")]
    InvalidPass(#[from] InvalidPass),

    #[error("Error executing SQL: {0}")]
    SqlError(#[from] rusqlite::Error),

    #[error("Error parsing JSON data: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Error encoding QR payload: {0}")]
    QrEncodeError(#[from] qrcode::types::QrError),

    #[error("Error rendering QR image: {0}")]
    QrImageError(#[from] image::ImageError),

    // Colors come straight from the form's color inputs, so this mostly
    // guards against hand-assembled records.
    #[error("Invalid hex color: {0:?}")]
    InvalidColor(String),

    #[error("The form has already been submitted")]
    AlreadySubmitted,
}

/// `Error::InvalidPass` subtypes.
///
/// These are the user-visible rejections: the message is meant to be shown
/// next to the offending field (or as the submit-time alert) and the form
/// state is preserved whenever one of these is returned.
#[derive(Debug, thiserror::Error)]
pub enum InvalidPass {
    #[error("`{field}` is required")]
    EmptyRequiredField { field: &'static str },

    #[error("The privacy agreement must be accepted before submitting")]
    PrivacyNotAccepted,

    #[error("`{field}` is too small: {width}x{height} (minimum is 300x300)")]
    ImageTooSmall {
        field: &'static str,
        width: u32,
        height: u32,
    },

    #[error("`{field}` could not be decoded: {reason}")]
    ImageUndecodable {
        field: &'static str,
        reason: String,
    },

    #[error("`{field}` took too long to decode")]
    ImageDecodeTimeout { field: &'static str },
}
