//! Content URL builder with append-only query handling.

use std::fmt;

use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
/// URL of the real content entry point, built up one query token at a time.
pub struct ContentUrl {
    url: Url,
}

impl ContentUrl {
    /// Parses an absolute URL.
    ///
    /// # Errors
    ///
    /// Returns [`url::ParseError`] when `raw` is not an absolute URL.
    pub fn parse(raw: &str) -> Result<Self, url::ParseError> {
        Url::parse(raw).map(Self::from)
    }

    /// Appends one encoded query token.
    ///
    /// Existing query content is kept verbatim and the token follows it after `&`; an empty or
    /// missing query is replaced by the token alone.
    pub fn append_query(&mut self, token: &str) -> &mut Self {
        let next = match self.url.query() {
            Some(existing) if !existing.is_empty() => format!("{existing}&{token}"),
            _ => token.to_string(),
        };
        self.url.set_query(Some(&next));
        self
    }

    /// Encoded query string without the leading `?`, empty when there is none.
    pub fn query(&self) -> &str {
        self.url.query().unwrap_or_default()
    }

    /// Full URL text.
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// Underlying parsed URL.
    pub fn as_url(&self) -> &Url {
        &self.url
    }
}

impl From<Url> for ContentUrl {
    fn from(url: Url) -> Self {
        Self { url }
    }
}

impl fmt::Display for ContentUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn append_query_starts_fresh_query() {
        let mut url = ContentUrl::parse("file:///android_asset/www/index.html").expect("parse");
        url.append_query("webgl");
        assert_eq!(url.query(), "webgl");
        assert_eq!(url.as_str(), "file:///android_asset/www/index.html?webgl");
    }

    #[test]
    fn append_query_preserves_existing_order() {
        let mut url = ContentUrl::parse("tauri://localhost/index.html?lang=ja").expect("parse");
        url.append_query("canvas").append_query("noaudio");
        assert_eq!(url.query(), "lang=ja&canvas&noaudio");
        assert_eq!(
            url.to_string(),
            "tauri://localhost/index.html?lang=ja&canvas&noaudio"
        );
    }

    #[test]
    fn empty_existing_query_is_replaced() {
        let mut url = ContentUrl::parse("http://tauri.localhost/index.html?").expect("parse");
        assert_eq!(url.query(), "");
        url.append_query("showfps");
        assert_eq!(url.query(), "showfps");
    }
}
