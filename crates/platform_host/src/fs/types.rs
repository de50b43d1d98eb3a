//! File-bridge data types shared across host contracts and implementations.

use serde::{Deserialize, Serialize};

/// Encoding used when `readFileSync` callers ask for the default.
pub const DEFAULT_READ_ENCODING: &str = "utf-8";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Text decoding requested by a `read_file` caller.
pub enum TextEncoding {
    /// Explicit `utf-8` / `utf8` request.
    Utf8,
    /// Any other label; decoded with the host platform default charset.
    PlatformDefault,
}

impl TextEncoding {
    /// Parses a caller-supplied encoding label.
    ///
    /// Only `utf-8` and `utf8` are recognized (ASCII case-insensitive, surrounding whitespace
    /// ignored); every other label maps to [`TextEncoding::PlatformDefault`].
    pub fn parse(label: &str) -> Self {
        let label = label.trim();
        if label.eq_ignore_ascii_case("utf-8") || label.eq_ignore_ascii_case("utf8") {
            Self::Utf8
        } else {
            Self::PlatformDefault
        }
    }

    /// Decodes raw file bytes.
    ///
    /// Every supported host uses UTF-8 as its platform default, so both variants decode as UTF-8
    /// and replace malformed sequences with U+FFFD rather than failing.
    pub fn decode(self, bytes: Vec<u8>) -> String {
        match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Stat result for a resolved path. Produced on demand and never cached.
pub struct FileRecord {
    /// Whether the path is a regular file.
    #[serde(rename = "_isFile")]
    pub is_file: bool,
    /// Whether the path is a directory.
    #[serde(rename = "_isDirectory")]
    pub is_directory: bool,
    /// Length in bytes as reported by the file system.
    pub size: u64,
    /// Last-modified time in signed unix milliseconds, `0` when unavailable.
    #[serde(rename = "mtime")]
    pub mtime_ms: i64,
}

impl FileRecord {
    /// Encodes the record as the JSON object literal returned by `statSync`.
    pub fn to_json(&self) -> String {
        format!(
            "{{\"_isFile\":{},\"_isDirectory\":{},\"size\":{},\"mtime\":{}}}",
            self.is_file, self.is_directory, self.size, self.mtime_ms
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn text_encoding_parse_is_case_insensitive_for_utf8_labels() {
        let cases = [
            ("utf-8", TextEncoding::Utf8),
            ("UTF-8", TextEncoding::Utf8),
            ("Utf8", TextEncoding::Utf8),
            (" utf8 ", TextEncoding::Utf8),
            ("latin1", TextEncoding::PlatformDefault),
            ("", TextEncoding::PlatformDefault),
            ("base64", TextEncoding::PlatformDefault),
        ];
        for (label, expected) in cases {
            assert_eq!(TextEncoding::parse(label), expected, "label={label:?}");
        }
    }

    #[test]
    fn decode_replaces_malformed_sequences() {
        assert_eq!(TextEncoding::Utf8.decode("héllo".as_bytes().to_vec()), "héllo");
        assert_eq!(
            TextEncoding::PlatformDefault.decode(vec![b'a', 0xff, b'b']),
            "a\u{fffd}b"
        );
    }

    #[test]
    fn file_record_json_matches_boundary_shape() {
        let record = FileRecord {
            is_file: true,
            is_directory: false,
            size: 42,
            mtime_ms: 1_700_000_000_123,
        };
        assert_eq!(
            record.to_json(),
            r#"{"_isFile":true,"_isDirectory":false,"size":42,"mtime":1700000000123}"#
        );

        let parsed: FileRecord = serde_json::from_str(&record.to_json()).expect("parse record");
        assert_eq!(parsed, record);
    }
}
