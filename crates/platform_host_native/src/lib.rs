//! Native `std::fs` adapters for the embedded player host contracts.
//!
//! [`NativeFileBridge`] implements [`platform_host::FileBridgeService`] on top of a
//! [`PathSandbox`] that keeps every request inside one application-private storage root.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

mod bridge;
mod sandbox;

pub use bridge::NativeFileBridge;
pub use sandbox::{Containment, PathSandbox, ResolvedPath, SandboxDiagnostics, SandboxError};
