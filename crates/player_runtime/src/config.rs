//! Player configuration loaded from TOML.
//!
//! Replaces compile-time build flags with one explicit value handed to the launch plan and the
//! capability negotiator.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::content_url::ContentUrl;

/// Default content entry point served by the host shell.
pub const DEFAULT_ENTRY_URL: &str = "tauri://localhost/index.html";
/// Default boundary name the negotiator registers under.
pub const DEFAULT_BOUNDARY_NAME: &str = "boot";
/// Neutral page shown while capabilities are detected.
pub const DEFAULT_PAGE_HTML: &str = include_str!("../assets/bootstrap/default_page.html");
/// Detection script defining `webgl()` and `webaudio()`.
pub const DEFAULT_DETECTION_SOURCE: &str = include_str!("../assets/bootstrap/detection.js");

#[derive(Debug, Error)]
/// Configuration loading failures.
pub enum ConfigError {
    /// The TOML document is malformed or has unknown keys.
    #[error("failed to parse player config: {0}")]
    Parse(#[from] toml::de::Error),
    /// `content.entry_url` is not an absolute URL.
    #[error("invalid content entry url `{url}`: {source}")]
    EntryUrl {
        /// Rejected value.
        url: String,
        /// Parser error.
        source: url::ParseError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
/// Real content location and identity.
pub struct ContentConfig {
    /// Absolute URL of the content entry page.
    pub entry_url: String,
    /// Application package identifier exposed to content as `window.packageName`.
    pub package_name: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            entry_url: DEFAULT_ENTRY_URL.to_string(),
            package_name: "player".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
/// Capability-negotiation bootstrap settings.
pub struct BootstrapConfig {
    /// Negotiate capabilities before loading content. When off, content loads directly.
    pub enabled: bool,
    /// Boundary name the negotiator is reachable under while it is live.
    pub boundary_name: String,
    /// Base64-encoded HTML of the neutral detection page.
    pub default_page: String,
    /// Base64-encoded detection script.
    pub detection_source: String,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            boundary_name: DEFAULT_BOUNDARY_NAME.to_string(),
            default_page: STANDARD.encode(DEFAULT_PAGE_HTML),
            detection_source: STANDARD.encode(DEFAULT_DETECTION_SOURCE),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
/// Build-time overrides applied on top of detected capabilities.
pub struct NegotiationFlags {
    /// Always select the canvas renderer.
    pub force_canvas: bool,
    /// Always disable audio.
    pub force_no_audio: bool,
    /// Always show the fps overlay.
    pub show_fps: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
/// Query-string tokens understood by the content.
pub struct QueryVocabulary {
    /// WebGL renderer selector.
    pub webgl: String,
    /// Canvas renderer selector.
    pub canvas: String,
    /// Audio-disable flag.
    pub noaudio: String,
    /// Fps overlay flag.
    pub showfps: String,
}

impl Default for QueryVocabulary {
    fn default() -> Self {
        Self {
            webgl: "webgl".to_string(),
            canvas: "canvas".to_string(),
            noaudio: "noaudio".to_string(),
            showfps: "showfps".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
/// Complete player host configuration.
pub struct PlayerConfig {
    /// `[content]` table.
    pub content: ContentConfig,
    /// `[bootstrap]` table.
    pub bootstrap: BootstrapConfig,
    /// `[build]` table.
    pub build: NegotiationFlags,
    /// `[query]` table.
    pub query: QueryVocabulary,
}

impl PlayerConfig {
    /// Parses and validates a TOML configuration document. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the document is malformed or the entry URL is invalid.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.entry_url()?;
        Ok(config)
    }

    /// Parses `content.entry_url` into a fresh query builder.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EntryUrl`] when the URL is not absolute.
    pub fn entry_url(&self) -> Result<ContentUrl, ConfigError> {
        ContentUrl::parse(&self.content.entry_url).map_err(|source| ConfigError::EntryUrl {
            url: self.content.entry_url.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_document_uses_defaults() {
        let config = PlayerConfig::from_toml_str("").expect("parse empty config");
        assert_eq!(config, PlayerConfig::default());
        assert!(config.bootstrap.enabled);
        assert_eq!(config.bootstrap.boundary_name, "boot");
        assert_eq!(config.query.canvas, "canvas");
        assert_eq!(config.build, NegotiationFlags::default());
    }

    #[test]
    fn partial_tables_override_only_given_keys() {
        let raw = r#"
[content]
entry_url = "file:///android_asset/www/index.html"

[build]
force_canvas = true

[query]
noaudio = "noaudio=1"
"#;
        let config = PlayerConfig::from_toml_str(raw).expect("parse config");
        assert_eq!(
            config.content.entry_url,
            "file:///android_asset/www/index.html"
        );
        assert_eq!(config.content.package_name, "player");
        assert_eq!(
            config.build,
            NegotiationFlags {
                force_canvas: true,
                force_no_audio: false,
                show_fps: false,
            }
        );
        assert_eq!(config.query.noaudio, "noaudio=1");
        assert_eq!(config.query.webgl, "webgl");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = PlayerConfig::from_toml_str("[build]\nforce_webgl = true\n")
            .expect_err("unknown key should fail");
        assert!(matches!(err, ConfigError::Parse(_)), "unexpected: {err}");
    }

    #[test]
    fn relative_entry_url_is_rejected() {
        let err = PlayerConfig::from_toml_str("[content]\nentry_url = \"www/index.html\"\n")
            .expect_err("relative url should fail");
        assert!(
            err.to_string()
                .starts_with("invalid content entry url `www/index.html`"),
            "unexpected: {err}"
        );
    }
}
