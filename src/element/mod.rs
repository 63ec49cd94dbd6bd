//! Live visual elements: typed attribute bags over renderer handles.

mod core;

pub use core::ElementInstance;
