//! Startup selection between capability negotiation and a direct content load.

use platform_host::{BoundaryRegistry, ContentView};

use crate::config::{ConfigError, PlayerConfig};
use crate::negotiator::{CapabilityNegotiator, NegotiationError};
use crate::content_url::ContentUrl;

#[derive(Debug, Clone, PartialEq, Eq)]
/// How the host reaches the real content at startup.
pub enum LaunchPlan {
    /// Run a [`CapabilityNegotiator`] first.
    Negotiate,
    /// Load this URL immediately.
    Direct(ContentUrl),
}

impl LaunchPlan {
    /// Chooses the plan for `config`.
    ///
    /// Without negotiation the content cannot report its audio support, so the direct URL always
    /// carries the audio-disable token, plus the fps token when the overlay is forced on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EntryUrl`] when the entry URL is invalid.
    pub fn from_config(config: &PlayerConfig) -> Result<Self, ConfigError> {
        if config.bootstrap.enabled {
            return Ok(Self::Negotiate);
        }
        let mut url = config.entry_url()?;
        url.append_query(&config.query.noaudio);
        if config.build.show_fps {
            url.append_query(&config.query.showfps);
        }
        Ok(Self::Direct(url))
    }
}

/// Starts the content session: either begins negotiation or loads the content directly.
///
/// Returns the live negotiator when one was started; the host keeps it until it completes.
///
/// # Errors
///
/// Returns [`NegotiationError`] when the configuration is invalid or negotiation cannot start.
pub fn launch(
    view: &dyn ContentView,
    boundary: &dyn BoundaryRegistry,
    config: &PlayerConfig,
) -> Result<Option<CapabilityNegotiator>, NegotiationError> {
    match LaunchPlan::from_config(config)? {
        LaunchPlan::Negotiate => CapabilityNegotiator::start(view, boundary, config).map(Some),
        LaunchPlan::Direct(url) => {
            tracing::info!(url = url.as_str(), "bootstrap disabled; loading content directly");
            view.load_url(url.as_str());
            Ok(None)
        }
    }
}
