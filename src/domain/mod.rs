//! Domain modules organized as vertical slices.
//!
//! Each sub-module contains:
//! - `mod.rs` — Rich domain types
//! - `wire.rs` — Raw serde structs matching feed payloads
//! - `convert.rs` — Wire → domain conversion
//! - `state.rs` — State containers with update methods (for WS-driven data)

pub mod asset;
