//! Bundled bootstrap assets: the neutral page and the capability detection script.
//!
//! Both ship base64 encoded inside the player configuration and are decoded when negotiation
//! starts.

use base64::Engine as _;
use thiserror::Error;

#[derive(Debug, Error)]
/// Bundled asset decoding failures.
pub enum AssetError {
    /// The blob is not valid base64.
    #[error("bundled {asset} is not valid base64: {source}")]
    Base64 {
        /// Asset label.
        asset: &'static str,
        /// Decoder error.
        source: base64::DecodeError,
    },
    /// The decoded bytes are not UTF-8 text.
    #[error("bundled {asset} is not utf-8: {source}")]
    Utf8 {
        /// Asset label.
        asset: &'static str,
        /// Conversion error.
        source: std::string::FromUtf8Error,
    },
}

/// Decodes a base64 asset into text. ASCII whitespace inside the blob (line wrapping) is ignored.
///
/// # Errors
///
/// Returns [`AssetError`] when the blob is not base64 or not UTF-8.
pub fn decode_bundled_text(asset: &'static str, blob: &str) -> Result<String, AssetError> {
    let compact: String = blob.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(compact)
        .map_err(|source| AssetError::Base64 { asset, source })?;
    String::from_utf8(bytes).map_err(|source| AssetError::Utf8 { asset, source })
}

/// Builds the script injected into the neutral page: the detection source followed by a call
/// reporting its results to the negotiator's `prepare` entry point.
pub fn detection_call(detection_source: &str, boundary_name: &str) -> String {
    format!("{detection_source}{boundary_name}.prepare( webgl(), webaudio(), false );")
}
