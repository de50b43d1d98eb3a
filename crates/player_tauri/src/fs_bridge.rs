//! Synchronous file bridge transport and storage-root resolution for the Tauri host.
//!
//! Content reaches the bridge with a blocking `XMLHttpRequest` to the `hostfs` URI scheme, so the
//! Node-style `*Sync` wrappers can return plain values. Each request body is one JSON
//! [`FileBridgeCall`]; the response body is the JSON [`platform_host::BoundaryValue`].

use platform_host::{
    dispatch_file_bridge_call, escape_json_string, FileBridgeCall, FileBridgeService,
    PreferredStorageRoot,
};
use platform_host_native::{NativeFileBridge, SandboxError};
use tauri::http::{header, HeaderValue, Method, Response, StatusCode};
use tauri::Manager;

/// Directory under the application data directories that content is confined to.
const STORAGE_DIR: &str = "files";

/// URI scheme serving file bridge calls.
pub const FILE_BRIDGE_SCHEME: &str = "hostfs";

/// Endpoint the wrapper script posts calls to.
#[cfg(any(windows, target_os = "android"))]
pub const FILE_BRIDGE_URL: &str = "http://hostfs.localhost/";
/// Endpoint the wrapper script posts calls to.
#[cfg(not(any(windows, target_os = "android")))]
pub const FILE_BRIDGE_URL: &str = "hostfs://localhost/";

fn storage_roots(app: &tauri::AppHandle) -> Result<PreferredStorageRoot, String> {
    let paths = app.path();
    let internal = paths
        .app_data_dir()
        .map_err(|err| format!("failed to resolve app data dir: {err}"))?
        .join(STORAGE_DIR);
    let external = paths
        .app_local_data_dir()
        .ok()
        .map(|dir| dir.join(STORAGE_DIR));
    Ok(PreferredStorageRoot { external, internal })
}

/// Opens the file bridge rooted in the application's private storage.
pub(crate) fn open_bridge(app: &tauri::AppHandle) -> Result<NativeFileBridge, SandboxError> {
    let roots = storage_roots(app).map_err(SandboxError::Provider)?;
    NativeFileBridge::from_storage_roots(&roots)
}

/// Prefixes the wrapper source with the endpoint it must call.
pub(crate) fn wrapper_script(wrappers: &str) -> String {
    format!(
        "window.__HOST_FS_ENDPOINT__ = {};\n{wrappers}",
        escape_json_string(FILE_BRIDGE_URL)
    )
}

fn response(status: StatusCode, content_type: &'static str, body: Vec<u8>) -> Response<Vec<u8>> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    response
}

fn text_response(status: StatusCode, message: String) -> Response<Vec<u8>> {
    response(status, "text/plain; charset=utf-8", message.into_bytes())
}

/// Serves one `hostfs` request against `bridge`.
pub fn handle_request<S>(bridge: &S, method: &Method, body: &[u8]) -> Response<Vec<u8>>
where
    S: FileBridgeService + ?Sized,
{
    if *method == Method::OPTIONS {
        return response(StatusCode::NO_CONTENT, "text/plain", Vec::new());
    }
    if *method != Method::POST {
        return text_response(
            StatusCode::METHOD_NOT_ALLOWED,
            format!("method {method} is not supported"),
        );
    }

    let call: FileBridgeCall = match serde_json::from_slice(body) {
        Ok(call) => call,
        Err(err) => {
            tracing::warn!(error = %err, "rejecting malformed file bridge call");
            return text_response(
                StatusCode::BAD_REQUEST,
                format!("invalid file bridge call: {err}"),
            );
        }
    };
    tracing::trace!(op = call.op_name(), "file bridge call");

    match serde_json::to_vec(&dispatch_file_bridge_call(bridge, call)) {
        Ok(encoded) => response(StatusCode::OK, "application/json", encoded),
        Err(err) => text_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("failed to encode file bridge result: {err}"),
        ),
    }
}

/// Response used when the bridge is not set up yet.
pub fn unavailable_response() -> Response<Vec<u8>> {
    text_response(
        StatusCode::SERVICE_UNAVAILABLE,
        "file bridge is not ready".to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform_host::NoopFileBridgeService;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::path::PathBuf;
    use std::process;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let path = std::env::temp_dir().join(format!("{prefix}_{}_{}", process::id(), nanos));
        fs::create_dir_all(&path).expect("create temp dir");
        path
    }

    fn post(bridge: &NativeFileBridge, body: &str) -> (StatusCode, String) {
        let response = handle_request(bridge, &Method::POST, body.as_bytes());
        let text = String::from_utf8(response.body().clone()).expect("utf-8 body");
        (response.status(), text)
    }

    #[test]
    fn calls_answer_with_plain_boundary_values() {
        let bridge = NativeFileBridge::from_root(temp_dir("hostfs_calls")).expect("bridge");

        let cases = [
            (
                r#"{"op":"writeFileSync","path":"save/file1.rpgsave","data":"abc"}"#,
                "true",
            ),
            (
                r#"{"op":"readFileSync","path":"/save/file1.rpgsave"}"#,
                "\"abc\"",
            ),
            (r#"{"op":"existsSync","path":"save"}"#, "true"),
            (r#"{"op":"readdirSync","path":"save"}"#, "\"[\\\"file1.rpgsave\\\"]\""),
            (r#"{"op":"readFileSync","path":"missing.txt"}"#, "null"),
            (r#"{"op":"statSync","path":"missing.txt"}"#, "null"),
            (r#"{"op":"unlinkSync","path":"save/file1.rpgsave"}"#, "true"),
        ];

        for (body, expected) in cases {
            assert_eq!(
                post(&bridge, body),
                (StatusCode::OK, expected.to_string()),
                "body={body:?}"
            );
        }
    }

    #[test]
    fn responses_allow_cross_origin_content() {
        let response = handle_request(
            &NoopFileBridgeService,
            &Method::POST,
            br#"{"op":"getAppDataPath"}"#,
        );
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body().as_slice(), b"\"\"");
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN),
            Some(&HeaderValue::from_static("*"))
        );

        let preflight = handle_request(&NoopFileBridgeService, &Method::OPTIONS, b"");
        assert_eq!(preflight.status(), StatusCode::NO_CONTENT);
    }

    #[test]
    fn malformed_requests_are_rejected() {
        let bridge = NoopFileBridgeService;
        let cases = [
            (Method::POST, &b"not json"[..], StatusCode::BAD_REQUEST),
            (Method::POST, &br#"{"op":"chmodSync","path":"a"}"#[..], StatusCode::BAD_REQUEST),
            (Method::GET, &b""[..], StatusCode::METHOD_NOT_ALLOWED),
        ];

        for (method, body, expected) in cases {
            assert_eq!(
                handle_request(&bridge, &method, body).status(),
                expected,
                "method={method} body={body:?}"
            );
        }
    }

    #[test]
    fn wrappers_block_on_the_bridge_scheme() {
        let source = crate::HOST_WRAPPERS;
        assert!(source.contains("xhr.open('POST', endpoint, false)"));
        assert!(source.contains("window.__HOST_FS_ENDPOINT__"));
        assert!(!source.contains("__TAURI__"));
    }

    #[test]
    fn wrappers_cover_node_style_surface() {
        let source = crate::HOST_WRAPPERS;
        let expected = [
            "readFileSync:",
            "writeFileSync:",
            "appendFileSync:",
            "renameSync:",
            "existsSync:",
            "readdirSync:",
            "mkdirSync:",
            "rmdirSync:",
            "unlinkSync:",
            "statSync:",
            "isSymbolicLink:",
            "readFile: 'readFileSync'",
            "stat: 'statSync'",
            "fs.exists = function",
            "fs.promises = {}",
            "S_IFDIR: 16384",
            "'ENOENT', -2",
            "normalize: function",
            "resolve: function",
            "relative: function",
            "parse: function",
            "format: function",
            "extname: function",
            "path.posix = path",
            "path.win32 = {",
            "tmpdir: function",
            "var moduleCache = {}",
            "'MODULE_NOT_FOUND'",
            "path.join(baseDir, name)",
        ];
        for needle in expected {
            assert!(source.contains(needle), "missing {needle:?}");
        }
    }

    #[test]
    fn wrapper_script_declares_endpoint_first() {
        let script = wrapper_script("window.require = null;");
        assert_eq!(
            script,
            format!(
                "window.__HOST_FS_ENDPOINT__ = \"{FILE_BRIDGE_URL}\";\nwindow.require = null;"
            )
        );
    }
}
