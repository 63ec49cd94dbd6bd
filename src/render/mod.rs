//! Capability interface of the rendering backend.
//!
//! The engine consumes these traits; it never creates surfaces, decodes
//! frames, or polls events itself. [`HeadlessBackend`] is an in-memory
//! implementation for tests, benches, and host-side dry runs.

mod core;
mod headless;

pub use core::{ElementHandle, RenderBackend, TextHandle};
pub use headless::{HandleState, HeadlessBackend};
