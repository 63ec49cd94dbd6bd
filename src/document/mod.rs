//! Skin definition document model.
//!
//! Parses the ini-style section/key grammar and exposes typed readers.
//! The readers return `Option`: `None` means "leave the target attribute
//! at whatever value it already has".

mod core;

pub use core::{Document, ParseError, parse_size, parse_vector3};
