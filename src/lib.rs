//! Declarative skin layout and fitting engine.
//!
//! A skin is a set of named 2D elements (images and text labels) whose
//! placement is described by an ini-style definition document with
//! per-breakpoint overrides. This crate owns the document model, the
//! breakpoint selection rule, the box-alignment/aspect-fit calculus, and
//! the reload protocol that keeps the element registry consistent when the
//! document changes on disk or the output surface is resized. Rendering
//! backends and file watching stay behind capability interfaces.

pub mod breakpoint;
pub mod color;
pub mod document;
pub mod element;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod logging;
pub mod metrics;
pub mod render;
pub mod runtime;
pub mod skin;

pub use breakpoint::{Breakpoint, select_breakpoint};
pub use color::Argb;
pub use document::{Document, ParseError};
pub use element::ElementInstance;
pub use error::{Result, SkinError};
pub use geometry::{Size, Vector3};
pub use layout::{
    AlignmentError, AspectCorrection, BoxAlignment, alignment_translate, position_transform,
};
pub use logging::{
    FileSink, LogEvent, LogFields, LogLevel, LogSink, Logger, LoggingError, LoggingResult,
    StderrSink, event_with_fields, json_kv,
};
pub use metrics::{MetricSnapshot, SkinMetrics};
pub use render::{ElementHandle, HandleState, HeadlessBackend, RenderBackend, TextHandle};
pub use runtime::{
    DocumentSource, FileSource, ReloadSignals, RuntimeConfig, RuntimeEvent, SkinRuntime,
};
pub use skin::{SkinGlobals, SkinState};
