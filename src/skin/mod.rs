//! Skin state: the element registry and its reload/re-fit lifecycle.

mod core;

pub use core::{SkinGlobals, SkinState};
