//! The fit/alignment calculus: box alignment, aspect policies, and the
//! normalized-to-device position transform.

mod core;

pub use core::{
    AlignmentError, AspectCorrection, BoxAlignment, UnknownAspectMode, alignment_translate,
    position_transform,
};
