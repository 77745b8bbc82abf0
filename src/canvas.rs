//! In-memory canvas and the handful of raster primitives the templates need.
//!
//! Bounds follow the usual drawing-library convention: a rectangle or ellipse box
//! `[x0, y0, x1, y1]` is inclusive on both corners, so column `x1` and row `y1` are painted.
//! All primitives clip to the canvas; callers may pass coordinates running off any edge.

use image::{ImageBuffer, Pixel, Rgb, Rgba};

pub type Canvas<P> = ImageBuffer<P, Vec<u8>>;

/// Pixel types the primitives can paint with partial coverage (anti-aliased glyph edges).
pub trait Paint: Pixel<Subpixel = u8> + 'static {
    /// Mix `src` over `self`; `coverage` is clamped to 0..=1.
    fn cover(&mut self, src: Self, coverage: f32);
}

impl Paint for Rgb<u8> {
    fn cover(&mut self, src: Self, coverage: f32) {
        let t = coverage.clamp(0.0, 1.0);
        for i in 0..3 {
            self[i] = lerp_u8(self[i], src[i], t);
        }
    }
}

impl Paint for Rgba<u8> {
    // Straight-alpha "over" compositing.
    fn cover(&mut self, src: Self, coverage: f32) {
        let sa = (src[3] as f32 / 255.0) * coverage.clamp(0.0, 1.0);
        if sa <= 0.0 {
            return;
        }
        let da = self[3] as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        for i in 0..3 {
            let v = (src[i] as f32 * sa + self[i] as f32 * da * (1.0 - sa)) / out_a;
            self[i] = v.round().clamp(0.0, 255.0) as u8;
        }
        self[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    }
}

#[inline]
fn lerp_u8(a: u8, b: u8, t: f32) -> u8 {
    (a as f32 + (b as f32 - a as f32) * t).round().clamp(0.0, 255.0) as u8
}

/// Inclusive integer rectangle `[x0, y0, x1, y1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl PixelRect {
    pub const fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// `[x, y, x + w, y + h]`, the way the templates spell boxes anchored at a corner.
    pub const fn from_origin(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self::new(x, y, x + w, y + h)
    }

    pub const fn inflate(self, margin: i32) -> Self {
        Self::new(self.x0 - margin, self.y0 - margin, self.x1 + margin, self.y1 + margin)
    }

    pub fn contains(&self, other: &PixelRect) -> bool {
        self.x0 <= other.x0 && self.y0 <= other.y0 && self.x1 >= other.x1 && self.y1 >= other.y1
    }

    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        (self.x0..=self.x1).contains(&x) && (self.y0..=self.y1).contains(&y)
    }

    pub fn width(&self) -> i32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> i32 {
        self.y1 - self.y0
    }
}

/// Intersect `r` with the canvas. `None` when nothing is visible (or the rect is inverted).
fn clip<P: Paint>(canvas: &Canvas<P>, r: PixelRect) -> Option<(u32, u32, u32, u32)> {
    let (w, h) = (canvas.width() as i64, canvas.height() as i64);
    if w == 0 || h == 0 || r.x1 < r.x0 || r.y1 < r.y0 {
        return None;
    }
    let x0 = (r.x0 as i64).max(0);
    let y0 = (r.y0 as i64).max(0);
    let x1 = (r.x1 as i64).min(w - 1);
    let y1 = (r.y1 as i64).min(h - 1);
    if x0 > x1 || y0 > y1 {
        return None;
    }
    Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
}

/// Blend one pixel; out-of-bounds coordinates are ignored.
#[inline]
pub fn blend<P: Paint>(canvas: &mut Canvas<P>, x: i32, y: i32, color: P, coverage: f32) {
    if x < 0 || y < 0 || x as u32 >= canvas.width() || y as u32 >= canvas.height() {
        return;
    }
    canvas.get_pixel_mut(x as u32, y as u32).cover(color, coverage);
}

pub fn fill_rect<P: Paint>(canvas: &mut Canvas<P>, r: PixelRect, color: P) {
    let Some((x0, y0, x1, y1)) = clip(canvas, r) else { return };
    for y in y0..=y1 {
        for x in x0..=x1 {
            canvas.put_pixel(x, y, color);
        }
    }
}

/// Center and radii of the ellipse inscribed in an inclusive box.
fn ellipse_frame(b: PixelRect) -> (f32, f32, f32, f32) {
    let cx = (b.x0 + b.x1 + 1) as f32 * 0.5;
    let cy = (b.y0 + b.y1 + 1) as f32 * 0.5;
    let rx = (b.x1 - b.x0 + 1) as f32 * 0.5;
    let ry = (b.y1 - b.y0 + 1) as f32 * 0.5;
    (cx, cy, rx, ry)
}

#[inline]
fn inside_ellipse(px: f32, py: f32, cx: f32, cy: f32, rx: f32, ry: f32) -> bool {
    if rx <= 0.0 || ry <= 0.0 {
        return false;
    }
    let dx = (px - cx) / rx;
    let dy = (py - cy) / ry;
    dx * dx + dy * dy <= 1.0
}

pub fn fill_ellipse<P: Paint>(canvas: &mut Canvas<P>, bounds: PixelRect, color: P) {
    stroke_ellipse(canvas, bounds, u32::MAX, color);
}

/// Ellipse outline `stroke` pixels thick, growing inward from the bounding box.
/// A stroke at least as thick as the smaller radius degenerates into a filled ellipse.
pub fn stroke_ellipse<P: Paint>(canvas: &mut Canvas<P>, bounds: PixelRect, stroke: u32, color: P) {
    if stroke == 0 {
        return;
    }
    let Some((x0, y0, x1, y1)) = clip(canvas, bounds) else { return };
    let (cx, cy, rx, ry) = ellipse_frame(bounds);
    let s = stroke.min(i32::MAX as u32) as f32;
    let (irx, iry) = (rx - s, ry - s);
    for y in y0..=y1 {
        for x in x0..=x1 {
            let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
            if inside_ellipse(px, py, cx, cy, rx, ry) && !inside_ellipse(px, py, cx, cy, irx, iry) {
                canvas.put_pixel(x, y, color);
            }
        }
    }
}

/// Even-odd fill sampled at pixel centers.
pub fn fill_polygon<P: Paint>(canvas: &mut Canvas<P>, points: &[(i32, i32)], color: P) {
    if points.len() < 3 {
        return;
    }
    let bbox = points.iter().fold(
        PixelRect::new(i32::MAX, i32::MAX, i32::MIN, i32::MIN),
        |b, &(x, y)| PixelRect::new(b.x0.min(x), b.y0.min(y), b.x1.max(x), b.y1.max(y)),
    );
    let Some((x0, y0, x1, y1)) = clip(canvas, bbox) else { return };
    let edges: Vec<((f32, f32), (f32, f32))> = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(&(ax, ay), &(bx, by))| ((ax as f32, ay as f32), (bx as f32, by as f32)))
        .collect();
    for y in y0..=y1 {
        let fy = y as f32 + 0.5;
        for x in x0..=x1 {
            let fx = x as f32 + 0.5;
            let mut parity = false;
            for &((ax, ay), (bx, by)) in &edges {
                if (ay > fy) != (by > fy) && fx < (bx - ax) * (fy - ay) / (by - ay) + ax {
                    parity = !parity;
                }
            }
            if parity {
                canvas.put_pixel(x, y, color);
            }
        }
    }
}
