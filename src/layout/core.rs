use std::str::FromStr;

use bitflags::bitflags;
use thiserror::Error;

use crate::geometry::Vector3;

bitflags! {
    /// Box alignment as independent horizontal and vertical anchor flags.
    ///
    /// Empty bits on an axis anchor the element to the center of that axis,
    /// so `BoxAlignment::empty()` is center/center. Setting both flags of
    /// one axis makes the value undecidable; the translate step reports it.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BoxAlignment: u8 {
        const LEFT = 1;
        const RIGHT = 1 << 1;
        const TOP = 1 << 2;
        const BOTTOM = 1 << 3;
        const X_MASK = Self::LEFT.bits() | Self::RIGHT.bits();
        const Y_MASK = Self::TOP.bits() | Self::BOTTOM.bits();
    }
}

impl Default for BoxAlignment {
    fn default() -> Self {
        Self::empty()
    }
}

/// Failures of the alignment calculus.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AlignmentError {
    #[error("unknown alignment name `{0}`")]
    UnknownName(String),
    #[error("alignment {0:?} does not resolve to a single anchor per axis")]
    Conflicting(BoxAlignment),
}

impl FromStr for BoxAlignment {
    type Err = AlignmentError;

    /// Accepts the nine anchor names (`Center`, `Left`, `TopRight`, ...)
    /// and `,`/`|`-separated flag lists, ASCII case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut flags = Self::empty();
        for token in s.split([',', '|']) {
            flags |= match token.trim().to_ascii_lowercase().as_str() {
                "center" => Self::empty(),
                "left" => Self::LEFT,
                "right" => Self::RIGHT,
                "top" => Self::TOP,
                "bottom" => Self::BOTTOM,
                "topleft" => Self::TOP.union(Self::LEFT),
                "topright" => Self::TOP.union(Self::RIGHT),
                "bottomleft" => Self::BOTTOM.union(Self::LEFT),
                "bottomright" => Self::BOTTOM.union(Self::RIGHT),
                _ => return Err(AlignmentError::UnknownName(s.to_string())),
            };
        }
        Ok(flags)
    }
}

/// Policy for fitting natural content size into a normalized bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AspectCorrection {
    /// Stretch to fill the box.
    #[default]
    None,
    /// Preserve aspect, touch the box from inside (contain).
    TouchFromInside,
    /// Preserve aspect, touch the box from outside (cover).
    TouchFromOutside,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown aspect correction mode `{0}`")]
pub struct UnknownAspectMode(String);

impl FromStr for AspectCorrection {
    type Err = UnknownAspectMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "touchfrominside" => Ok(Self::TouchFromInside),
            "touchfromoutside" => Ok(Self::TouchFromOutside),
            _ => Err(UnknownAspectMode(s.to_string())),
        }
    }
}

/// Translation that anchors a scaled element inside its bounding box,
/// computed independently per axis.
pub fn alignment_translate(
    alignment: BoxAlignment,
    scale: Vector3,
    max_size: Vector3,
) -> Result<Vector3, AlignmentError> {
    let x = match alignment & BoxAlignment::X_MASK {
        a if a.is_empty() => 0.0,
        a if a == BoxAlignment::LEFT => (scale.x - max_size.x) / 2.0,
        a if a == BoxAlignment::RIGHT => (max_size.x - scale.x) / 2.0,
        _ => return Err(AlignmentError::Conflicting(alignment)),
    };
    let y = match alignment & BoxAlignment::Y_MASK {
        a if a.is_empty() => 0.0,
        a if a == BoxAlignment::TOP => (scale.y - max_size.y) / 2.0,
        a if a == BoxAlignment::BOTTOM => (max_size.y - scale.y) / 2.0,
        _ => return Err(AlignmentError::Conflicting(alignment)),
    };
    Ok(Vector3::new(x, y, 0.0))
}

/// Map the normalized top-left-origin unit square (x right, y down) into
/// the centered, y-flipped device space (x right, y up, -1..1).
pub fn position_transform(v: Vector3) -> Vector3 {
    Vector3::new(v.x * 2.0 - 1.0, 1.0 - v.y * 2.0, v.z)
}
