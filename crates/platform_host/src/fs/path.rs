//! Request-path helpers shared by file-bridge implementations.

/// Returns the part of an untrusted request path that remains after stripping every leading `.`
/// and `/` character.
///
/// This defangs `../../etc/passwd` and `/abs/path` style prefixes before the remainder is joined
/// onto a storage root. It is not a containment check on its own: `..` segments further into the
/// path survive and must still be handled by canonicalization.
pub fn request_path_remainder(path: &str) -> &str {
    path.trim_start_matches(['.', '/'])
}
