//! File-bridge contracts: the synchronous persistence surface exposed to embedded content.

pub mod call;
pub mod path;
pub mod service;
pub mod types;
