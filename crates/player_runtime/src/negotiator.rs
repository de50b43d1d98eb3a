//! One-shot capability negotiation between embedded content and the host.
//!
//! The negotiator registers itself on the content boundary, shows a neutral page, injects a
//! detection script once that page starts, and receives a single `prepare` callback describing
//! the detected renderer/audio support. It then rewrites the real content URL's query, removes
//! itself from the boundary and navigates to the content.
//!
//! Work that must run later on the host's UI queue is handed back as a [`BootstrapTask`]; the host
//! posts it and passes it back through [`CapabilityNegotiator::run_task`].

use platform_host::{BoundaryError, BoundaryRegistry, BoundaryToken, ContentView};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{ConfigError, NegotiationFlags, PlayerConfig, QueryVocabulary};
use crate::detection::{decode_bundled_text, detection_call, AssetError};
use crate::content_url::ContentUrl;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Negotiation lifecycle.
pub enum NegotiationPhase {
    /// Neutral page loading; waiting for its start signal.
    AwaitingDetection,
    /// Detection injected; waiting for (or finalizing after) `prepare`.
    Negotiating,
    /// Boundary removed and content navigation issued. Terminal.
    Complete,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Capabilities reported by the detection script through `prepare(webgl, webaudio, showfps)`.
pub struct CapabilityRequest {
    /// WebGL rendering is available.
    pub webgl: bool,
    /// Web Audio is available.
    pub webaudio: bool,
    /// The fps overlay was requested.
    pub showfps: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Deferred negotiator work the host runs on its UI queue.
pub enum BootstrapTask {
    /// Evaluate the detection script and `prepare` call in the neutral page.
    InjectDetection(String),
    /// Deregister the negotiator and navigate to the final content URL.
    Finalize,
}

#[derive(Debug, Error)]
/// Negotiation failures.
pub enum NegotiationError {
    /// The configured content entry URL is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A bundled bootstrap asset could not be decoded.
    #[error(transparent)]
    Asset(#[from] AssetError),
    /// Registering or deregistering the boundary failed.
    #[error(transparent)]
    Boundary(#[from] BoundaryError),
    /// An event arrived in a phase that does not accept it.
    #[error("{event} is not accepted while negotiation is {phase:?}")]
    UnexpectedEvent {
        /// Event label.
        event: &'static str,
        /// Phase at the time of the event.
        phase: NegotiationPhase,
    },
    /// `prepare` arrived after capabilities were already applied.
    #[error("prepare was already handled; repeated capability reports are rejected")]
    AlreadyPrepared,
}

/// Query tokens selected for a capability report, in append order.
///
/// Exactly one renderer token is chosen (`webgl` unless unavailable or forced off), followed by the
/// audio-disable token when audio is unavailable or forced off, then the fps token when requested
/// or forced.
pub fn capability_query_tokens<'a>(
    request: CapabilityRequest,
    flags: NegotiationFlags,
    vocabulary: &'a QueryVocabulary,
) -> Vec<&'a str> {
    let mut tokens = Vec::with_capacity(3);
    if request.webgl && !flags.force_canvas {
        tokens.push(vocabulary.webgl.as_str());
    } else {
        tokens.push(vocabulary.canvas.as_str());
    }
    if !request.webaudio || flags.force_no_audio {
        tokens.push(vocabulary.noaudio.as_str());
    }
    if request.showfps || flags.show_fps {
        tokens.push(vocabulary.showfps.as_str());
    }
    tokens
}

#[derive(Debug)]
/// Short-lived bootstrap object driving one capability negotiation.
pub struct CapabilityNegotiator {
    phase: NegotiationPhase,
    finalize_pending: bool,
    url: ContentUrl,
    token: Option<BoundaryToken>,
    detection_script: String,
    flags: NegotiationFlags,
    vocabulary: QueryVocabulary,
}

impl CapabilityNegotiator {
    /// Registers the negotiator boundary, loads the neutral page and prepares the content URL.
    ///
    /// Bundled assets and the entry URL are validated before anything is registered.
    ///
    /// # Errors
    ///
    /// Returns [`NegotiationError`] when an asset or the entry URL is invalid, or the boundary
    /// name is already taken.
    pub fn start(
        view: &dyn ContentView,
        boundary: &dyn BoundaryRegistry,
        config: &PlayerConfig,
    ) -> Result<Self, NegotiationError> {
        let bootstrap = &config.bootstrap;
        let url = config.entry_url()?;
        let detection = decode_bundled_text("detection script", &bootstrap.detection_source)?;
        let page = decode_bundled_text("default page", &bootstrap.default_page)?;

        let token = boundary.register(&bootstrap.boundary_name)?;
        view.load_data(&page);
        tracing::info!(
            boundary = bootstrap.boundary_name.as_str(),
            entry = url.as_str(),
            "capability negotiation started"
        );

        Ok(Self {
            phase: NegotiationPhase::AwaitingDetection,
            finalize_pending: false,
            url,
            token: Some(token),
            detection_script: detection_call(&detection, &bootstrap.boundary_name),
            flags: config.build,
            vocabulary: config.query.clone(),
        })
    }

    /// Current phase.
    pub fn phase(&self) -> NegotiationPhase {
        self.phase
    }

    /// Content URL as assembled so far.
    pub fn content_url(&self) -> &ContentUrl {
        &self.url
    }

    /// Handles the neutral page's start signal.
    ///
    /// # Errors
    ///
    /// Returns [`NegotiationError::UnexpectedEvent`] outside
    /// [`NegotiationPhase::AwaitingDetection`].
    pub fn on_page_started(&mut self) -> Result<BootstrapTask, NegotiationError> {
        self.expect_phase("page start", NegotiationPhase::AwaitingDetection)?;
        self.phase = NegotiationPhase::Negotiating;
        tracing::info!("neutral page started; injecting capability detection");
        Ok(BootstrapTask::InjectDetection(self.detection_script.clone()))
    }

    /// Applies the capability report delivered through the boundary's `prepare` entry point.
    ///
    /// # Errors
    ///
    /// Returns [`NegotiationError::AlreadyPrepared`] for repeated reports and
    /// [`NegotiationError::UnexpectedEvent`] before detection was injected. Neither changes the
    /// content URL.
    pub fn prepare(&mut self, request: CapabilityRequest) -> Result<BootstrapTask, NegotiationError> {
        if self.finalize_pending || self.phase == NegotiationPhase::Complete {
            tracing::warn!(?request, "rejecting repeated capability report");
            return Err(NegotiationError::AlreadyPrepared);
        }
        self.expect_phase("prepare", NegotiationPhase::Negotiating)?;

        for token in capability_query_tokens(request, self.flags, &self.vocabulary) {
            self.url.append_query(token);
        }
        self.finalize_pending = true;
        tracing::info!(?request, query = self.url.query(), "capabilities negotiated");
        Ok(BootstrapTask::Finalize)
    }

    /// Runs a task previously returned by this negotiator.
    ///
    /// [`BootstrapTask::Finalize`] consumes the boundary token, so the real content can never
    /// reach the negotiator, and then navigates to the final URL.
    ///
    /// # Errors
    ///
    /// Returns [`NegotiationError::UnexpectedEvent`] for a task that does not match the current
    /// phase, or [`NegotiationError::Boundary`] when deregistration fails. A failed finalize keeps
    /// the token and skips navigation, so running it again retries the deregistration.
    pub fn run_task(
        &mut self,
        task: BootstrapTask,
        view: &dyn ContentView,
        boundary: &dyn BoundaryRegistry,
    ) -> Result<(), NegotiationError> {
        match task {
            BootstrapTask::InjectDetection(script) => {
                self.expect_phase("detection injection", NegotiationPhase::Negotiating)?;
                view.evaluate_script(&script);
                Ok(())
            }
            BootstrapTask::Finalize => {
                if !self.finalize_pending {
                    return Err(self.unexpected("finalize"));
                }
                if let Some(token) = self.token.take() {
                    if let Err(err) = boundary.deregister(token) {
                        let (token, error) = err.into_parts();
                        self.token = Some(token);
                        tracing::warn!(
                            error = %error,
                            "boundary deregistration failed; finalize can be retried"
                        );
                        return Err(error.into());
                    }
                }
                self.finalize_pending = false;
                self.phase = NegotiationPhase::Complete;
                view.load_url(self.url.as_str());
                tracing::info!(url = self.url.as_str(), "negotiation complete; loading content");
                Ok(())
            }
        }
    }

    fn expect_phase(
        &self,
        event: &'static str,
        expected: NegotiationPhase,
    ) -> Result<(), NegotiationError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(self.unexpected(event))
        }
    }

    fn unexpected(&self, event: &'static str) -> NegotiationError {
        tracing::warn!(event, phase = ?self.phase, "rejecting out-of-order negotiation event");
        NegotiationError::UnexpectedEvent {
            event,
            phase: self.phase,
        }
    }
}
