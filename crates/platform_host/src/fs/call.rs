//! Boundary call envelopes for hosts whose content boundary carries one serialized request per
//! invocation instead of one native method per operation.

use serde::{Deserialize, Serialize};

use super::service::FileBridgeService;
use super::types::DEFAULT_READ_ENCODING;

fn default_read_encoding() -> String {
    DEFAULT_READ_ENCODING.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op")]
/// One file-bridge call, tagged with the fixed boundary name embedded content uses.
pub enum FileBridgeCall {
    /// `readFileSync(path, encoding)`.
    #[serde(rename = "readFileSync")]
    ReadFile {
        /// Untrusted request path.
        path: String,
        /// Encoding label, `utf-8` when omitted.
        #[serde(default = "default_read_encoding")]
        encoding: String,
    },
    /// `writeFileSync(path, data)`.
    #[serde(rename = "writeFileSync")]
    WriteFile {
        /// Untrusted request path.
        path: String,
        /// Text written as UTF-8.
        data: String,
    },
    /// `existsSync(path)`.
    #[serde(rename = "existsSync")]
    Exists {
        /// Untrusted request path.
        path: String,
    },
    /// `readdirSync(path)`.
    #[serde(rename = "readdirSync")]
    ReadDir {
        /// Untrusted request path.
        path: String,
    },
    /// `mkdirSync(path)`.
    #[serde(rename = "mkdirSync")]
    Mkdir {
        /// Untrusted request path.
        path: String,
    },
    /// `unlinkSync(path)`.
    #[serde(rename = "unlinkSync")]
    RemoveFile {
        /// Untrusted request path.
        path: String,
    },
    /// `rmdirSync(path)`.
    #[serde(rename = "rmdirSync")]
    RemoveDir {
        /// Untrusted request path.
        path: String,
    },
    /// `statSync(path)`.
    #[serde(rename = "statSync")]
    Stat {
        /// Untrusted request path.
        path: String,
    },
    /// `getAppDataPath()`.
    #[serde(rename = "getAppDataPath")]
    RootPath,
    /// `getFullPath(path)`.
    #[serde(rename = "getFullPath")]
    FullPath {
        /// Untrusted request path.
        path: String,
    },
}

impl FileBridgeCall {
    /// Returns the boundary name of this call.
    pub const fn op_name(&self) -> &'static str {
        match self {
            Self::ReadFile { .. } => "readFileSync",
            Self::WriteFile { .. } => "writeFileSync",
            Self::Exists { .. } => "existsSync",
            Self::ReadDir { .. } => "readdirSync",
            Self::Mkdir { .. } => "mkdirSync",
            Self::RemoveFile { .. } => "unlinkSync",
            Self::RemoveDir { .. } => "rmdirSync",
            Self::Stat { .. } => "statSync",
            Self::RootPath => "getAppDataPath",
            Self::FullPath { .. } => "getFullPath",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
/// Primitive result shapes that can cross the content boundary.
pub enum BoundaryValue {
    /// The "no value" sentinel (`null` on the content side).
    Null,
    /// Boolean result.
    Bool(bool),
    /// String result, including JSON literals produced by the bridge.
    Text(String),
}

impl From<bool> for BoundaryValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<String> for BoundaryValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Option<String>> for BoundaryValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::Null, Self::Text)
    }
}

/// Routes a decoded boundary call to the matching [`FileBridgeService`] method.
pub fn dispatch_file_bridge_call<S>(service: &S, call: FileBridgeCall) -> BoundaryValue
where
    S: FileBridgeService + ?Sized,
{
    match call {
        FileBridgeCall::ReadFile { path, encoding } => service.read_file(&path, &encoding).into(),
        FileBridgeCall::WriteFile { path, data } => service.write_file(&path, &data).into(),
        FileBridgeCall::Exists { path } => service.exists(&path).into(),
        FileBridgeCall::ReadDir { path } => service.read_dir(&path).into(),
        FileBridgeCall::Mkdir { path } => service.mkdir(&path).into(),
        FileBridgeCall::RemoveFile { path } => service.remove_file(&path).into(),
        FileBridgeCall::RemoveDir { path } => service.remove_dir(&path).into(),
        FileBridgeCall::Stat { path } => service.stat(&path).into(),
        FileBridgeCall::RootPath => service.root_path().into(),
        FileBridgeCall::FullPath { path } => service.full_path(&path).into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::service::NoopFileBridgeService;
    use pretty_assertions::assert_eq;

    #[test]
    fn calls_decode_from_boundary_names() {
        let cases = [
            (
                r#"{"op":"readFileSync","path":"save/global.rpgsave"}"#,
                FileBridgeCall::ReadFile {
                    path: "save/global.rpgsave".to_string(),
                    encoding: "utf-8".to_string(),
                },
            ),
            (
                r#"{"op":"writeFileSync","path":"a.txt","data":"x"}"#,
                FileBridgeCall::WriteFile {
                    path: "a.txt".to_string(),
                    data: "x".to_string(),
                },
            ),
            (r#"{"op":"getAppDataPath"}"#, FileBridgeCall::RootPath),
            (
                r#"{"op":"rmdirSync","path":"save"}"#,
                FileBridgeCall::RemoveDir {
                    path: "save".to_string(),
                },
            ),
        ];

        for (raw, expected) in cases {
            let call: FileBridgeCall = serde_json::from_str(raw).expect("decode call");
            assert_eq!(call, expected, "raw={raw}");
            let encoded = serde_json::to_value(&call).expect("encode call");
            assert_eq!(encoded["op"], call.op_name());
        }
    }

    #[test]
    fn unknown_operations_are_rejected() {
        let err = serde_json::from_str::<FileBridgeCall>(r#"{"op":"chmodSync","path":"a"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn boundary_values_serialize_as_primitives() {
        assert_eq!(serde_json::to_string(&BoundaryValue::Null).unwrap(), "null");
        assert_eq!(
            serde_json::to_string(&BoundaryValue::from(true)).unwrap(),
            "true"
        );
        assert_eq!(
            serde_json::to_string(&BoundaryValue::from(Some("[]".to_string()))).unwrap(),
            r#""[]""#
        );
    }

    #[test]
    fn dispatch_routes_to_service_sentinels() {
        let fs = NoopFileBridgeService;
        assert_eq!(
            dispatch_file_bridge_call(
                &fs,
                FileBridgeCall::Stat {
                    path: "missing".to_string()
                }
            ),
            BoundaryValue::Null
        );
        assert_eq!(
            dispatch_file_bridge_call(
                &fs,
                FileBridgeCall::Mkdir {
                    path: "save".to_string()
                }
            ),
            BoundaryValue::Bool(false)
        );
        assert_eq!(
            dispatch_file_bridge_call(&fs, FileBridgeCall::RootPath),
            BoundaryValue::Text(String::new())
        );
    }
}
