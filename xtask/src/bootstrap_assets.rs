//! Keeps the base64 bootstrap assets in `player.toml` in sync with their sources.

use std::fs;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Player host configuration, relative to the workspace root.
pub const PLAYER_CONFIG: &str = "crates/player_tauri/player.toml";
const ASSET_DIR: &str = "crates/player_runtime/assets/bootstrap";
const DEFAULT_PAGE_FILE: &str = "default_page.html";
const DETECTION_FILE: &str = "detection.js";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Base64-encoded bootstrap assets.
pub struct BootstrapAssets {
    default_page: String,
    detection_source: String,
}

impl BootstrapAssets {
    /// Reads and encodes the asset sources under `root`.
    pub fn read(root: &Path) -> Result<Self, String> {
        let dir = root.join(ASSET_DIR);
        let read = |name: &str| {
            let path = dir.join(name);
            fs::read(&path).map_err(|err| format!("failed to read {}: {err}", path.display()))
        };
        Ok(Self::from_sources(
            &read(DEFAULT_PAGE_FILE)?,
            &read(DETECTION_FILE)?,
        ))
    }

    /// Encodes raw asset bytes.
    pub fn from_sources(default_page: &[u8], detection_source: &[u8]) -> Self {
        Self {
            default_page: STANDARD.encode(default_page),
            detection_source: STANDARD.encode(detection_source),
        }
    }

    /// Rewrites the `[bootstrap]` asset keys of `config`, leaving every other line untouched.
    pub fn apply_to_config(&self, config: &str) -> Result<String, String> {
        let mut in_bootstrap = false;
        let mut page_seen = false;
        let mut detection_seen = false;
        let mut lines = Vec::new();

        for line in config.lines() {
            let trimmed = line.trim();
            if trimmed.starts_with('[') {
                in_bootstrap = trimmed == "[bootstrap]";
            } else if in_bootstrap {
                match assignment_key(trimmed) {
                    Some("default_page") => {
                        page_seen = true;
                        lines.push(format!("default_page = \"{}\"", self.default_page));
                        continue;
                    }
                    Some("detection_source") => {
                        detection_seen = true;
                        lines.push(format!("detection_source = \"{}\"", self.detection_source));
                        continue;
                    }
                    _ => {}
                }
            }
            lines.push(line.to_string());
        }

        if !page_seen || !detection_seen {
            return Err(format!(
                "{PLAYER_CONFIG} must define bootstrap.default_page and bootstrap.detection_source"
            ));
        }

        let mut updated = lines.join("\n");
        if config.ends_with('\n') {
            updated.push('\n');
        }
        self.ensure_applied(&updated)?;
        Ok(updated)
    }

    fn ensure_applied(&self, config: &str) -> Result<(), String> {
        let table: toml::Table = config
            .parse()
            .map_err(|err| format!("rewritten {PLAYER_CONFIG} is not valid TOML: {err}"))?;
        let bootstrap = table
            .get("bootstrap")
            .and_then(toml::Value::as_table)
            .ok_or_else(|| format!("{PLAYER_CONFIG} has no [bootstrap] table"))?;
        let matches = |key: &str, expected: &str| {
            bootstrap.get(key).and_then(toml::Value::as_str) == Some(expected)
        };
        if matches("default_page", &self.default_page)
            && matches("detection_source", &self.detection_source)
        {
            Ok(())
        } else {
            Err(format!("failed to rewrite bootstrap assets in {PLAYER_CONFIG}"))
        }
    }
}

fn assignment_key(line: &str) -> Option<&str> {
    let (key, _) = line.split_once('=')?;
    Some(key.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = "# header comment\n\
                          [content]\n\
                          default_page = \"not-bootstrap\"\n\
                          \n\
                          [bootstrap]\n\
                          enabled = true\n\
                          default_page = \"old\"\n\
                          detection_source = \"old\"\n";

    #[test]
    fn rewrites_only_bootstrap_asset_keys() {
        let assets = BootstrapAssets::from_sources(b"<html></html>", b"function webgl() {}");
        let updated = assets.apply_to_config(CONFIG).expect("rewrite");

        assert!(updated.starts_with("# header comment\n[content]\ndefault_page = \"not-bootstrap\"\n"));
        assert!(updated.contains("default_page = \"PGh0bWw+PC9odG1sPg==\"\n"));
        assert!(updated.contains("enabled = true\n"));
        assert!(updated.ends_with('\n'));
    }

    #[test]
    fn up_to_date_config_is_unchanged() {
        let assets = BootstrapAssets::from_sources(b"page", b"script");
        let once = assets.apply_to_config(CONFIG).expect("first rewrite");
        assert_eq!(assets.apply_to_config(&once).expect("second rewrite"), once);
    }

    #[test]
    fn missing_asset_keys_are_reported() {
        let assets = BootstrapAssets::from_sources(b"page", b"script");
        let err = assets
            .apply_to_config("[bootstrap]\nenabled = true\n")
            .expect_err("missing keys");
        assert!(err.contains("bootstrap.default_page"));
    }

    #[test]
    fn checked_in_config_matches_asset_sources() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR"))
            .parent()
            .expect("workspace root")
            .to_path_buf();
        let assets = BootstrapAssets::read(&root).expect("read assets");
        let config = fs::read_to_string(root.join(PLAYER_CONFIG)).expect("read config");
        assert_eq!(assets.apply_to_config(&config).expect("rewrite"), config);
    }
}
