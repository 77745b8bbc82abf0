//! Asset-category templates.
//!
//! Each category has a pure `render_*` that builds the canvas and a `create_*` that renders,
//! encodes, writes and reports the file. Coordinates are integer fractions of the canvas size,
//! so any size keeps the same composition. None of these create the output directory.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use anyhow::{ensure, Context, Result};
use image::{codecs::jpeg::JpegEncoder, Rgb, RgbImage, RgbaImage};
use rand::Rng;

use crate::canvas::{fill_ellipse, fill_polygon, fill_rect, stroke_ellipse, PixelRect};
use crate::palette::{self, ACCENT, BLACK, DARK, NEAR_BLACK, SHELL, TRACK, WHITE};
use crate::typeface::{measure_or_estimate, TextExtent, Typeface};

/// Padding between a label and the edge of its backdrop.
pub const LABEL_MARGIN: i32 = 10;
pub const DRIVER_CAPTION: &str = "MRAD RACING";
pub const WORDMARK_TEXT: &str = "MRAD";
/// Side length the logo coordinates below are authored at; other sizes scale linearly.
pub const LOGO_REFERENCE_SIDE: u32 = 200;
const MARK_OUTLINE: [(i32, i32); 8] = [(40, 160), (70, 40), (100, 100), (130, 40), (160, 160), (130, 160), (100, 80), (70, 160)];
const WORDMARK_ORIGIN: (i32, i32) = (10, 70);
const WORDMARK_FONT_PX: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Scattered accent squares on the background art.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkScatter {
    pub count: u32,
    pub min_side: u32,
    pub max_side: u32,
}

impl Default for MarkScatter {
    fn default() -> Self {
        Self { count: 20, min_side: 5, max_side: 20 }
    }
}

/// Where a centered label and its backdrop land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelLayout {
    pub text: PixelRect,
    pub backdrop: PixelRect,
}

pub fn label_layout(canvas: Size, extent: TextExtent) -> LabelLayout {
    let (tw, th) = (extent.width as i32, extent.height as i32);
    let x = (canvas.width as i32 - tw).div_euclid(2);
    let y = (canvas.height as i32 - th).div_euclid(2);
    let text = PixelRect::from_origin(x, y, tw, th);
    LabelLayout { text, backdrop: text.inflate(LABEL_MARGIN) }
}

pub fn render_labeled(label: &str, size: Size, base: Rgb<u8>, face: &Typeface) -> RgbImage {
    let (w, h) = (size.width, size.height);
    let mut img = RgbImage::from_pixel(w, h, base);

    let stripe = (w / 10).max(1);
    for x in (0..w).step_by(2 * stripe as usize) {
        fill_rect(&mut img, PixelRect::new(x as i32, 0, (x + stripe) as i32, h as i32), ACCENT);
    }

    let font_px = w / 20;
    let extent = measure_or_estimate(face, label, font_px);
    let layout = label_layout(size, extent);
    fill_rect(&mut img, layout.backdrop, BLACK);
    face.draw(&mut img, label, (layout.text.x0, layout.text.y0), font_px as f32, WHITE);
    img
}

pub fn render_helmet(size: Size) -> RgbImage {
    let (w, h) = (size.width as i32, size.height as i32);
    let mut img = RgbImage::from_pixel(size.width, size.height, DARK);
    fill_ellipse(&mut img, PixelRect::new(w / 4, h / 4, 3 * w / 4, 3 * h / 4), SHELL);
    // visor
    fill_rect(&mut img, PixelRect::new(w / 3, h / 3, 2 * w / 3, h / 2), BLACK);
    fill_rect(&mut img, PixelRect::new(w / 4, 2 * h / 5, 3 * w / 4, 2 * h / 5 + h / 20), ACCENT);
    img
}

pub fn render_driver(size: Size, face: &Typeface) -> RgbImage {
    let (w, h) = (size.width as i32, size.height as i32);
    let mut img = RgbImage::from_pixel(size.width, size.height, DARK);
    fill_ellipse(&mut img, PixelRect::new(w / 3, h / 8, 2 * w / 3, h / 3), SHELL);
    fill_rect(&mut img, PixelRect::new(w / 3, h / 3, 2 * w / 3, 3 * h / 4), ACCENT);
    // team logo placeholder
    fill_rect(&mut img, PixelRect::new(w / 2 - w / 10, h / 2 - h / 10, w / 2 + w / 10, h / 2 + h / 10), WHITE);

    let font_px = size.width / 20;
    let extent = measure_or_estimate(face, DRIVER_CAPTION, font_px);
    let x = (w - extent.width as i32).div_euclid(2);
    face.draw(&mut img, DRIVER_CAPTION, (x, 3 * h / 4), font_px as f32, WHITE);
    img
}

/// Random accent squares, each `[x, y, x + side, y + side]` with the corner anywhere on the
/// canvas (edges inclusive) and the side within the scatter range.
pub fn scatter_marks<R: Rng + ?Sized>(rng: &mut R, size: Size, scatter: MarkScatter) -> Vec<PixelRect> {
    let (lo, hi) = if scatter.min_side <= scatter.max_side {
        (scatter.min_side, scatter.max_side)
    } else {
        (scatter.max_side, scatter.min_side)
    };
    (0..scatter.count)
        .map(|_| {
            let x = rng.gen_range(0..=size.width) as i32;
            let y = rng.gen_range(0..=size.height) as i32;
            let side = rng.gen_range(lo..=hi) as i32;
            PixelRect::from_origin(x, y, side, side)
        })
        .collect()
}

pub fn render_background<R: Rng + ?Sized>(size: Size, rng: &mut R, scatter: MarkScatter) -> RgbImage {
    let (w, h) = (size.width as i32, size.height as i32);
    let mut img = RgbImage::from_pixel(size.width, size.height, NEAR_BLACK);
    stroke_ellipse(&mut img, PixelRect::new(w / 10, h / 4, 9 * w / 10, 3 * h / 4), size.height / 10, TRACK);
    for mark in scatter_marks(rng, size, scatter) {
        fill_rect(&mut img, mark, ACCENT);
    }
    img
}

#[inline]
fn logo_px(v: i32, side: u32) -> i32 {
    (v as i64 * side as i64 / LOGO_REFERENCE_SIDE as i64) as i32
}

pub fn render_mark_logo(side: u32) -> RgbaImage {
    let mut img = RgbaImage::from_pixel(side, side, palette::TRANSPARENT);
    let outline: Vec<(i32, i32)> = MARK_OUTLINE.iter().map(|&(x, y)| (logo_px(x, side), logo_px(y, side))).collect();
    fill_polygon(&mut img, &outline, palette::opaque(ACCENT));
    img
}

pub fn render_wordmark(side: u32, face: &Typeface) -> RgbaImage {
    let mut img = RgbaImage::from_pixel(side, side, palette::TRANSPARENT);
    let origin = (logo_px(WORDMARK_ORIGIN.0, side), logo_px(WORDMARK_ORIGIN.1, side));
    let font_px = logo_px(WORDMARK_FONT_PX as i32, side).max(1) as f32;
    face.draw(&mut img, WORDMARK_TEXT, origin, font_px, palette::opaque(ACCENT));
    img
}

fn ensure_size(path: &Path, size: Size) -> Result<()> {
    ensure!(
        size.width > 0 && size.height > 0,
        "{}: image dimensions must be positive, got {}x{}",
        path.display(),
        size.width,
        size.height
    );
    Ok(())
}

fn is_jpeg_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"))
}

/// Encode an opaque image. `.jpg`/`.jpeg` go through the JPEG encoder at `quality`;
/// anything else picks its format from the extension.
pub fn save_rgb(img: &RgbImage, path: &Path, quality: u8) -> Result<()> {
    if is_jpeg_path(path) {
        let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
        let mut out = BufWriter::new(file);
        JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100))
            .encode_image(img)
            .with_context(|| format!("encode {}", path.display()))?;
        out.flush().with_context(|| format!("write {}", path.display()))?;
    } else {
        img.save(path).with_context(|| format!("write {}", path.display()))?;
    }
    Ok(())
}

pub fn save_rgba(img: &RgbaImage, path: &Path) -> Result<()> {
    img.save(path).with_context(|| format!("write {}", path.display()))
}

fn report(path: &Path) {
    println!("Created {}", path.display());
}

pub fn create_labeled_image(path: &Path, label: &str, size: Size, base: Rgb<u8>, face: &Typeface, quality: u8) -> Result<()> {
    ensure_size(path, size)?;
    save_rgb(&render_labeled(label, size, base, face), path, quality)?;
    report(path);
    Ok(())
}

pub fn create_helmet_image(path: &Path, size: Size, quality: u8) -> Result<()> {
    ensure_size(path, size)?;
    save_rgb(&render_helmet(size), path, quality)?;
    report(path);
    Ok(())
}

pub fn create_driver_image(path: &Path, size: Size, face: &Typeface, quality: u8) -> Result<()> {
    ensure_size(path, size)?;
    save_rgb(&render_driver(size, face), path, quality)?;
    report(path);
    Ok(())
}

pub fn create_background_image<R: Rng + ?Sized>(path: &Path, size: Size, rng: &mut R, scatter: MarkScatter, quality: u8) -> Result<()> {
    ensure_size(path, size)?;
    save_rgb(&render_background(size, rng, scatter), path, quality)?;
    report(path);
    Ok(())
}

pub fn create_mark_logo(path: &Path, side: u32) -> Result<()> {
    ensure_size(path, Size::new(side, side))?;
    save_rgba(&render_mark_logo(side), path)?;
    report(path);
    Ok(())
}

pub fn create_wordmark_logo(path: &Path, side: u32, face: &Typeface) -> Result<()> {
    ensure_size(path, Size::new(side, side))?;
    save_rgba(&render_wordmark(side, face), path)?;
    report(path);
    Ok(())
}
