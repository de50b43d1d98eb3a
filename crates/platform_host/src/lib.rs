//! Typed host-domain contracts shared by the embedded player bridge and its adapters.
//!
//! This crate is the API-first boundary between embedded game content and the native host. It
//! exposes the synchronous file-bridge contract and its boundary-call envelopes, the minimal JSON
//! encoder the bridge answers with, and the collaborator traits (content view, boundary registry,
//! storage root) the bootstrap runtime drives. Concrete `std::fs` adapters live in
//! `platform_host_native` and webview transport stays behind `player_tauri`.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod boundary;
pub mod content_view;
pub mod fs;
pub mod json;
pub mod storage_root;

pub use boundary::{
    BoundaryError, BoundaryLedger, BoundaryRegistry, BoundaryToken, DeregisterError,
    MemoryBoundaryRegistry,
};
pub use content_view::{ContentView, ContentViewOp, MemoryContentView};
pub use fs::call::{dispatch_file_bridge_call, BoundaryValue, FileBridgeCall};
pub use fs::path::request_path_remainder;
pub use fs::service::{FileBridgeService, NoopFileBridgeService};
pub use fs::types::{FileRecord, TextEncoding, DEFAULT_READ_ENCODING};
pub use json::{escape_json_string, json_string_array};
pub use storage_root::{FixedStorageRoot, PreferredStorageRoot, StorageRootProvider};
