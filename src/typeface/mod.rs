//! Font resolution, text measurement and text rasterization.
//!
//! Resolution is an explicit step: walk the candidate list and keep the first file that reads
//! and parses as a scalable font, otherwise settle on the built-in bitmap face. Drawing code
//! receives a resolved [`Typeface`] and never sees a font error.

pub mod bitmap;

use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use ab_glyph::{point, Font, FontVec, GlyphId, PxScale, ScaleFont};
use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::canvas::{blend, Canvas, Paint};

/// Conventional font locations tried when configuration names none.
pub const DEFAULT_CANDIDATES: &[&str] = &[
    "arial.ttf",
    "assets/fonts/arial.ttf",
    "/usr/share/fonts/truetype/msttcorefonts/Arial.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextExtent {
    pub width: u32,
    pub height: u32,
}

impl TextExtent {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

pub enum Typeface {
    Scalable { font: FontVec, source: PathBuf },
    Builtin,
}

impl fmt::Debug for Typeface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Typeface::Scalable { source, .. } => f.debug_struct("Scalable").field("source", source).finish(),
            Typeface::Builtin => f.write_str("Builtin"),
        }
    }
}

impl Typeface {
    /// First candidate that loads wins; a missing or broken file just moves on to the next.
    pub fn resolve<I, P>(candidates: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        for candidate in candidates {
            let path = candidate.as_ref();
            match load_scalable(path) {
                Ok(font) => {
                    info!("using font {}", path.display());
                    return Typeface::Scalable { font, source: path.to_path_buf() };
                }
                Err(e) => debug!("font candidate rejected: {e:#}"),
            }
        }
        info!("no scalable font available; falling back to built-in bitmap font");
        Typeface::Builtin
    }

    pub fn builtin() -> Self {
        Typeface::Builtin
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, Typeface::Builtin)
    }

    pub fn source(&self) -> Option<&Path> {
        match self {
            Typeface::Scalable { source, .. } => Some(source),
            Typeface::Builtin => None,
        }
    }

    /// True rendered extent. May be empty (e.g. a face without advances for these chars).
    pub fn measure(&self, text: &str, size: f32) -> TextExtent {
        match self {
            Typeface::Scalable { font, .. } => measure_scalable(font, text, size),
            Typeface::Builtin => {
                let (width, height) = bitmap::extent(text, size);
                TextExtent { width, height }
            }
        }
    }

    /// Draw `text` with its top-left extent corner at `origin`.
    pub fn draw<P: Paint>(&self, canvas: &mut Canvas<P>, text: &str, origin: (i32, i32), size: f32, color: P) {
        match self {
            Typeface::Scalable { font, .. } => draw_scalable(font, canvas, text, origin, size, color),
            Typeface::Builtin => bitmap::draw(canvas, text, origin, size, color),
        }
    }
}

pub fn load_scalable(path: &Path) -> Result<FontVec> {
    let bytes = fs::read(path).with_context(|| format!("read font {}", path.display()))?;
    FontVec::try_from_vec(bytes).map_err(|e| anyhow::anyhow!("decode font {}: {e}", path.display()))
}

/// Rough `chars * size / 2` by `size` box. Only meaningful as a last resort.
pub fn estimate_extent(text: &str, size: u32) -> TextExtent {
    let chars = text.chars().count() as u32;
    TextExtent { width: chars * size / 2, height: size }
}

/// Measured extent, or the estimate when measurement comes back empty for non-empty text.
pub fn measure_or_estimate(face: &Typeface, text: &str, size: u32) -> TextExtent {
    let measured = face.measure(text, size as f32);
    if measured.is_empty() && !text.is_empty() {
        debug!("measurement empty for {text:?} at {size}px; estimating");
        estimate_extent(text, size)
    } else {
        measured
    }
}

/// Walk `text` glyph by glyph, handing each id and its pen x to `visit`. Returns the final pen x.
fn layout<F: Font>(font: &F, text: &str, size: f32, mut visit: impl FnMut(GlyphId, f32)) -> f32 {
    let scaled = font.as_scaled(PxScale::from(size));
    let mut caret = 0.0f32;
    let mut prev: Option<GlyphId> = None;
    for ch in text.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(p) = prev {
            caret += scaled.kern(p, id);
        }
        visit(id, caret);
        caret += scaled.h_advance(id);
        prev = Some(id);
    }
    caret
}

fn measure_scalable(font: &FontVec, text: &str, size: f32) -> TextExtent {
    if text.is_empty() || size.is_nan() || size <= 0.0 {
        return TextExtent::default();
    }
    let width = layout(font, text, size, |_, _| {});
    let scaled = font.as_scaled(PxScale::from(size));
    let height = scaled.ascent() - scaled.descent();
    TextExtent {
        width: width.max(0.0).ceil() as u32,
        height: height.max(0.0).ceil() as u32,
    }
}

fn draw_scalable<P: Paint>(font: &FontVec, canvas: &mut Canvas<P>, text: &str, origin: (i32, i32), size: f32, color: P) {
    if size.is_nan() || size <= 0.0 {
        return;
    }
    let scale = PxScale::from(size);
    let baseline = origin.1 as f32 + font.as_scaled(scale).ascent();
    layout(font, text, size, |id, pen_x| {
        let glyph = id.with_scale_and_position(scale, point(origin.0 as f32 + pen_x, baseline));
        if let Some(outlined) = font.outline_glyph(glyph) {
            let b = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                blend(canvas, b.min.x as i32 + gx as i32, b.min.y as i32 + gy as i32, color, coverage);
            });
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use std::io::Write;

    #[test]
    fn missing_candidates_fall_back_to_builtin() {
        let face = Typeface::resolve(["/definitely/not/here.ttf", "also-missing.otf"]);
        assert!(face.is_builtin());
        assert!(face.source().is_none());
        let none: [&str; 0] = [];
        assert!(Typeface::resolve(none).is_builtin());
    }

    #[test]
    fn corrupt_font_file_falls_back() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"this is not a truetype font").unwrap();
        assert!(load_scalable(f.path()).is_err());
        assert!(Typeface::resolve([f.path()]).is_builtin());
    }

    #[test]
    fn estimate_is_half_size_per_char() {
        assert_eq!(estimate_extent("Racing Photo 1", 40), TextExtent { width: 14 * 40 / 2, height: 40 });
        assert_eq!(estimate_extent("", 40).width, 0);
    }

    #[test]
    fn builtin_measurement_is_exact_not_estimated() {
        let face = Typeface::builtin();
        let m = measure_or_estimate(&face, "MRAD RACING", 30);
        let (w, h) = bitmap::extent("MRAD RACING", 30.0);
        assert_eq!(m, TextExtent { width: w, height: h });
        assert_eq!(measure_or_estimate(&face, "", 30), TextExtent::default());
    }

    #[test]
    fn builtin_draw_inks_canvas() {
        let face = Typeface::builtin();
        let mut c = Canvas::from_pixel(100, 30, Rgb([0u8, 0, 0]));
        face.draw(&mut c, "MRAD", (2, 2), 16.0, Rgb([255, 255, 255]));
        assert!(c.pixels().any(|p| p[0] == 255));
    }
}
