//! ARGB colors and the color-from-string routine.

/// Alpha used for placeholder tag colors.
const TAG_ALPHA: u8 = 100;

/// An 8-bit-per-channel color with straight alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argb {
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Argb {
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    pub const BLACK: Self = Self::new(255, 0, 0, 0);

    pub const fn new(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self { a, r, g, b }
    }

    /// Parse a CSS-style color string (named colors, `#RGB`, `#RRGGBB`,
    /// `#RRGGBBAA`, `rgb()`/`rgba()` forms). Returns `None` on malformed
    /// input so callers can leave the target attribute untouched.
    pub fn from_css(value: &str) -> Option<Self> {
        let parsed = csscolorparser::parse(value.trim()).ok()?;
        let [r, g, b, a] = parsed.to_rgba8();
        Some(Self { a, r, g, b })
    }

    /// A stable per-element debugging color: random RGB with a fixed,
    /// partially transparent alpha. Assigned once at element creation and
    /// used only in placeholder mode.
    pub fn random_tag() -> Self {
        let (r, g, b) = rand::random::<(u8, u8, u8)>();
        Self { a: TAG_ALPHA, r, g, b }
    }
}

impl Default for Argb {
    fn default() -> Self {
        Self::TRANSPARENT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_and_hex_colors() {
        assert_eq!(Argb::from_css("red"), Some(Argb::new(255, 255, 0, 0)));
        assert_eq!(Argb::from_css("#102030"), Some(Argb::new(255, 16, 32, 48)));
        assert_eq!(
            Argb::from_css("#10203040"),
            Some(Argb::new(64, 16, 32, 48))
        );
    }

    #[test]
    fn malformed_color_is_none() {
        assert_eq!(Argb::from_css("not-a-color"), None);
        assert_eq!(Argb::from_css(""), None);
    }

    #[test]
    fn tag_colors_carry_fixed_alpha() {
        for _ in 0..8 {
            assert_eq!(Argb::random_tag().a, TAG_ALPHA);
        }
    }
}
