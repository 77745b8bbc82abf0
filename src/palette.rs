//! Fixed placeholder palette.
//! Every template pulls its colors from here so the asset set stays visually consistent.

use image::{Rgb, Rgba};

/// Bright green highlight used for stripes, suits, scattered marks and logos.
pub const ACCENT: Rgb<u8> = Rgb([78, 255, 0]);
/// Default canvas fill for photos, helmets and the driver.
pub const DARK: Rgb<u8> = Rgb([26, 26, 26]);
pub const NEAR_BLACK: Rgb<u8> = Rgb([10, 10, 10]);
/// Helmet shell and driver head.
pub const SHELL: Rgb<u8> = Rgb([200, 200, 200]);
pub const TRACK: Rgb<u8> = Rgb([50, 50, 50]);
pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Opaque RGBA variant of an RGB palette entry (logos draw on a transparent canvas).
#[inline]
pub fn opaque(c: Rgb<u8>) -> Rgba<u8> {
    Rgba([c[0], c[1], c[2], 255])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opaque_keeps_channels() {
        assert_eq!(opaque(ACCENT), Rgba([78, 255, 0, 255]));
        assert_eq!(TRANSPARENT[3], 0);
    }

    #[test]
    fn text_contrasts_with_backdrop() {
        // White label text on the black backdrop; accent must differ from both backgrounds.
        assert_ne!(WHITE, BLACK);
        for bg in [DARK, NEAR_BLACK, TRACK] {
            assert_ne!(ACCENT, bg, "accent collides with background {bg:?}");
        }
    }
}
