//! Bootstrap runtime for the embedded player.
//!
//! This crate turns a [`PlayerConfig`] into a content session: it decides between capability
//! negotiation and a direct load ([`launch`]), runs the one-shot [`CapabilityNegotiator`]
//! handshake against the host's [`platform_host::ContentView`] and
//! [`platform_host::BoundaryRegistry`], and plans the scripts injected at every page start.
//! It performs no I/O of its own; hosts supply the collaborators.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod config;
pub mod content_url;
pub mod detection;
pub mod launch;
pub mod negotiator;
pub mod page_start;

pub use config::{
    BootstrapConfig, ConfigError, ContentConfig, NegotiationFlags, PlayerConfig, QueryVocabulary,
};
pub use content_url::ContentUrl;
pub use detection::{decode_bundled_text, detection_call, AssetError};
pub use launch::{launch, LaunchPlan};
pub use negotiator::{
    capability_query_tokens, BootstrapTask, CapabilityNegotiator, CapabilityRequest,
    NegotiationError, NegotiationPhase,
};
pub use page_start::{PageStartScripts, POLYFILL_LOADED_HOOK};
