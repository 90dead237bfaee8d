//! CPU frame buffer and raster primitives.
//!
//! [`Canvas`] is a plain RGBA8 pixel buffer with the small set of raster
//! operations the device renderers need: rects, vertical/radial gradients,
//! circles, rings, sectors, lines, trapezoids and soft glow discs. All
//! geometry arrives as `f32`; any call with a non-finite coordinate or a
//! non-positive extent is skipped outright, and every pixel write is
//! bounds-checked, so a bad frame degrades to missing shapes rather than a
//! panic.
//!
//! The buffer is presented by the viewer as a wgpu texture
//! ([`crate::window`]) or written to disk via [`Canvas::save_png`].

use std::path::Path;

use glam::Vec2;

use crate::error::ExportError;
use crate::visuals::Color;

/// RGBA8 drawing surface.
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Canvas {
            width,
            height,
            pixels: vec![Color::TRANSPARENT; width as usize * height as usize],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The pixel buffer, row-major from the top-left.
    #[inline]
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// The pixel buffer as raw RGBA bytes (for texture upload / encoding).
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Read a single pixel, if inside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x < self.width && y < self.height {
            Some(self.pixels[y as usize * self.width as usize + x as usize])
        } else {
            None
        }
    }

    /// Reallocate to a new size. No-op when the size is unchanged; contents
    /// are discarded otherwise.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.width != width || self.height != height {
            log::debug!("frame resized to {}x{}", width, height);
            self.width = width;
            self.height = height;
            self.pixels = vec![Color::TRANSPARENT; width as usize * height as usize];
        }
    }

    pub fn clear(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            None
        } else {
            Some(y as usize * self.width as usize + x as usize)
        }
    }

    /// Source-over blend of `color` into `(x, y)`. Out-of-bounds writes are
    /// dropped.
    #[inline]
    pub fn blend(&mut self, x: i32, y: i32, color: Color) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = blend_over(self.pixels[i], color);
        }
    }

    /// Axis-aligned filled rectangle.
    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        if !all_finite(&[x, y, w, h]) || w <= 0.0 || h <= 0.0 {
            return;
        }
        let (x0, x1) = span(x, w, self.width);
        let (y0, y1) = span(y, h, self.height);
        for py in y0..y1 {
            for px in x0..x1 {
                self.blend(px, py, color);
            }
        }
    }

    /// One-pixel rectangle outline.
    pub fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        if !all_finite(&[x, y, w, h]) || w <= 0.0 || h <= 0.0 {
            return;
        }
        self.fill_rect(x, y, w, 1.0, color);
        self.fill_rect(x, y + h - 1.0, w, 1.0, color);
        self.fill_rect(x, y + 1.0, 1.0, (h - 2.0).max(0.0), color);
        self.fill_rect(x + w - 1.0, y + 1.0, 1.0, (h - 2.0).max(0.0), color);
    }

    /// Filled rectangle with a three-stop vertical gradient (top, middle,
    /// bottom stop).
    pub fn fill_vgradient(&mut self, x: f32, y: f32, w: f32, h: f32, stops: [Color; 3]) {
        if !all_finite(&[x, y, w, h]) || w <= 0.0 || h <= 0.0 {
            return;
        }
        let (x0, x1) = span(x, w, self.width);
        let (y0, y1) = span(y, h, self.height);
        for py in y0..y1 {
            let t = ((py as f32 + 0.5 - y) / h).clamp(0.0, 1.0);
            let color = if t < 0.5 {
                stops[0].lerp(stops[1], t * 2.0)
            } else {
                stops[1].lerp(stops[2], (t - 0.5) * 2.0)
            };
            for px in x0..x1 {
                self.blend(px, py, color);
            }
        }
    }

    /// Filled disc with a two-stop radial gradient from the center out.
    pub fn fill_radial(&mut self, cx: f32, cy: f32, r: f32, inner: Color, outer: Color) {
        if !all_finite(&[cx, cy, r]) || r <= 0.0 {
            return;
        }
        let (x0, x1) = span(cx - r, r * 2.0, self.width);
        let (y0, y1) = span(cy - r, r * 2.0, self.height);
        for py in y0..y1 {
            for px in x0..x1 {
                let d = Vec2::new(px as f32 + 0.5 - cx, py as f32 + 0.5 - cy).length();
                if d <= r {
                    self.blend(px, py, inner.lerp(outer, d / r));
                }
            }
        }
    }

    /// Filled disc.
    pub fn fill_circle(&mut self, cx: f32, cy: f32, r: f32, color: Color) {
        if !all_finite(&[cx, cy, r]) || r <= 0.0 {
            return;
        }
        let r2 = r * r;
        let (x0, x1) = span(cx - r, r * 2.0, self.width);
        let (y0, y1) = span(cy - r, r * 2.0, self.height);
        for py in y0..y1 {
            for px in x0..x1 {
                let dx = px as f32 + 0.5 - cx;
                let dy = py as f32 + 0.5 - cy;
                if dx * dx + dy * dy <= r2 {
                    self.blend(px, py, color);
                }
            }
        }
    }

    /// Circle outline of the given stroke width, centered on radius `r`.
    pub fn stroke_circle(&mut self, cx: f32, cy: f32, r: f32, width: f32, color: Color) {
        if !all_finite(&[cx, cy, r, width]) || r <= 0.0 || width <= 0.0 {
            return;
        }
        let half = width * 0.5;
        self.fill_ring(cx, cy, (r - half).max(0.0), r + half, color);
    }

    /// Filled annulus between radii `r0` (inner) and `r1` (outer).
    pub fn fill_ring(&mut self, cx: f32, cy: f32, r0: f32, r1: f32, color: Color) {
        if !all_finite(&[cx, cy, r0, r1]) || r1 <= 0.0 || r1 <= r0 {
            return;
        }
        let (inner2, outer2) = (r0 * r0, r1 * r1);
        let (x0, x1) = span(cx - r1, r1 * 2.0, self.width);
        let (y0, y1) = span(cy - r1, r1 * 2.0, self.height);
        for py in y0..y1 {
            for px in x0..x1 {
                let dx = px as f32 + 0.5 - cx;
                let dy = py as f32 + 0.5 - cy;
                let d2 = dx * dx + dy * dy;
                if d2 >= inner2 && d2 <= outer2 {
                    self.blend(px, py, color);
                }
            }
        }
    }

    /// Filled circular sector from angle `a0` to `a1` (radians,
    /// counter-clockwise, any span up to a full turn).
    pub fn fill_sector(&mut self, cx: f32, cy: f32, r: f32, a0: f32, a1: f32, color: Color) {
        if !all_finite(&[cx, cy, r, a0, a1]) || r <= 0.0 {
            return;
        }
        let tau = std::f32::consts::TAU;
        let span_angle = (a1 - a0).rem_euclid(tau);
        if span_angle == 0.0 {
            if (a1 - a0).abs() >= tau {
                self.fill_circle(cx, cy, r, color);
            }
            return;
        }
        let r2 = r * r;
        let (x0, x1) = span(cx - r, r * 2.0, self.width);
        let (y0, y1) = span(cy - r, r * 2.0, self.height);
        for py in y0..y1 {
            for px in x0..x1 {
                let dx = px as f32 + 0.5 - cx;
                let dy = py as f32 + 0.5 - cy;
                if dx * dx + dy * dy > r2 {
                    continue;
                }
                let ang = dy.atan2(dx);
                if (ang - a0).rem_euclid(tau) <= span_angle {
                    self.blend(px, py, color);
                }
            }
        }
    }

    /// One-pixel line (Bresenham). Each covered pixel is blended exactly
    /// once, so translucent strokes stay uniform.
    pub fn line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: Color) {
        if !all_finite(&[x0, y0, x1, y1]) {
            return;
        }
        let (mut x, mut y) = (x0.round() as i32, y0.round() as i32);
        let (ex, ey) = (x1.round() as i32, y1.round() as i32);
        let dx = (ex - x).abs();
        let dy = -(ey - y).abs();
        let sx = if x < ex { 1 } else { -1 };
        let sy = if y < ey { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.blend(x, y, color);
            if x == ex && y == ey {
                break;
            }
            let e2 = err * 2;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Thick line stamped from discs. Intended for opaque strokes; with a
    /// translucent color the overlapping stamps will compound.
    pub fn thick_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, width: f32, color: Color) {
        if !all_finite(&[x0, y0, x1, y1, width]) || width <= 0.0 {
            return;
        }
        if width <= 1.5 {
            self.line(x0, y0, x1, y1, color);
            return;
        }
        let a = Vec2::new(x0, y0);
        let b = Vec2::new(x1, y1);
        let len = (b - a).length();
        let steps = (len / (width * 0.25)).ceil().max(1.0) as i32;
        for i in 0..=steps {
            let p = a.lerp(b, i as f32 / steps as f32);
            self.fill_circle(p.x, p.y, width * 0.5, color);
        }
    }

    /// Vertical dashed line (`dash` pixels on, `gap` pixels off).
    pub fn dashed_vline(&mut self, x: f32, y0: f32, y1: f32, dash: f32, gap: f32, width: f32, color: Color) {
        if !all_finite(&[x, y0, y1, dash, gap, width]) || dash <= 0.0 || gap < 0.0 {
            return;
        }
        let (top, bottom) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };
        let mut y = top;
        while y < bottom {
            let seg = dash.min(bottom - y);
            self.fill_rect(x - width * 0.5, y, width.max(1.0), seg, color);
            y += dash + gap;
        }
    }

    /// Filled triangle (either winding).
    pub fn fill_triangle(&mut self, a: Vec2, b: Vec2, c: Vec2, color: Color) {
        if !all_finite(&[a.x, a.y, b.x, b.y, c.x, c.y]) {
            return;
        }
        let min_x = a.x.min(b.x).min(c.x);
        let max_x = a.x.max(b.x).max(c.x);
        let min_y = a.y.min(b.y).min(c.y);
        let max_y = a.y.max(b.y).max(c.y);
        let (x0, x1) = span(min_x, max_x - min_x, self.width);
        let (y0, y1) = span(min_y, max_y - min_y, self.height);
        let edge = |p: Vec2, q: Vec2, r: Vec2| (q.x - p.x) * (r.y - p.y) - (q.y - p.y) * (r.x - p.x);
        for py in y0..y1 {
            for px in x0..x1 {
                let p = Vec2::new(px as f32 + 0.5, py as f32 + 0.5);
                let d0 = edge(a, b, p);
                let d1 = edge(b, c, p);
                let d2 = edge(c, a, p);
                let has_neg = d0 < 0.0 || d1 < 0.0 || d2 < 0.0;
                let has_pos = d0 > 0.0 || d1 > 0.0 || d2 > 0.0;
                if !(has_neg && has_pos) {
                    self.blend(px, py, color);
                }
            }
        }
    }

    /// Filled isosceles trapezoid: bottom edge of width `bottom_w` starting
    /// at `(x, y + h)`, top edge of width `top_w` centered above it.
    pub fn fill_trapezoid(&mut self, x: f32, y: f32, top_w: f32, bottom_w: f32, h: f32, color: Color) {
        if !all_finite(&[x, y, top_w, bottom_w, h]) || h <= 0.0 || bottom_w <= 0.0 || top_w < 0.0 {
            return;
        }
        let top_left = x + (bottom_w - top_w) * 0.5;
        let top_right = top_left + top_w;
        let (y0, y1) = span(y, h, self.height);
        for py in y0..y1 {
            let t = ((py as f32 + 0.5 - y) / h).clamp(0.0, 1.0);
            let left = top_left + (x - top_left) * t;
            let right = top_right + (x + bottom_w - top_right) * t;
            let (px0, px1) = span(left, right - left, self.width);
            for px in px0..px1 {
                self.blend(px, py, color);
            }
        }
    }

    /// Disc with a soft halo out to `glow_r`. Approximates a canvas
    /// shadow-blur highlight: solid core, quadratic alpha falloff outside it.
    pub fn glow_disc(&mut self, cx: f32, cy: f32, r: f32, glow_r: f32, color: Color) {
        if !all_finite(&[cx, cy, r, glow_r]) || r <= 0.0 {
            return;
        }
        if glow_r <= r {
            self.fill_circle(cx, cy, r, color);
            return;
        }
        let (x0, x1) = span(cx - glow_r, glow_r * 2.0, self.width);
        let (y0, y1) = span(cy - glow_r, glow_r * 2.0, self.height);
        for py in y0..y1 {
            for px in x0..x1 {
                let dx = px as f32 + 0.5 - cx;
                let dy = py as f32 + 0.5 - cy;
                let d = (dx * dx + dy * dy).sqrt();
                if d <= r {
                    self.blend(px, py, color);
                } else if d <= glow_r {
                    let t = 1.0 - (d - r) / (glow_r - r);
                    self.blend(px, py, color.fade(t * t * 0.6));
                }
            }
        }
    }

    /// Encode the frame as a PNG.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<(), ExportError> {
        image::save_buffer(
            path.as_ref(),
            self.bytes(),
            self.width,
            self.height,
            image::ExtendedColorType::Rgba8,
        )?;
        Ok(())
    }
}

#[inline]
fn all_finite(vals: &[f32]) -> bool {
    vals.iter().all(|v| v.is_finite())
}

/// Clip the half-open pixel span covered by `[start, start + extent)` to the
/// buffer dimension.
#[inline]
fn span(start: f32, extent: f32, limit: u32) -> (i32, i32) {
    let lo = start.floor().max(0.0) as i32;
    let hi = (start + extent).ceil().min(limit as f32) as i32;
    (lo.min(hi), hi)
}

#[inline]
fn blend_over(dst: Color, src: Color) -> Color {
    match src.a {
        0 => dst,
        255 => src,
        a => {
            let t = a as f32 / 255.0;
            let mix = |d: u8, s: u8| (s as f32 * t + d as f32 * (1.0 - t)).round() as u8;
            Color {
                r: mix(dst.r, src.r),
                g: mix(dst.g, src.g),
                b: mix(dst.b, src.b),
                a: ((a as f32) + dst.a as f32 * (1.0 - t)).round().min(255.0) as u8,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visuals::palette;

    fn canvas() -> Canvas {
        let mut c = Canvas::new(64, 48);
        c.clear(Color::BLACK);
        c
    }

    #[test]
    fn fill_rect_stays_inside_bounds() {
        let mut c = canvas();
        c.fill_rect(60.0, 44.0, 20.0, 20.0, Color::WHITE);
        assert_eq!(c.pixel(63, 47), Some(Color::WHITE));
        assert_eq!(c.pixel(59, 43), Some(Color::BLACK));
    }

    #[test]
    fn non_finite_geometry_is_skipped() {
        let mut c = canvas();
        c.fill_rect(f32::NAN, 0.0, 10.0, 10.0, Color::WHITE);
        c.fill_circle(10.0, 10.0, f32::INFINITY, Color::WHITE);
        c.line(0.0, f32::NAN, 20.0, 20.0, Color::WHITE);
        c.glow_disc(5.0, 5.0, f32::NAN, 10.0, Color::WHITE);
        assert!(c.pixels().iter().all(|p| *p == Color::BLACK));
    }

    #[test]
    fn degenerate_extents_are_skipped() {
        let mut c = canvas();
        c.fill_rect(5.0, 5.0, -3.0, 10.0, Color::WHITE);
        c.fill_rect(5.0, 5.0, 10.0, 0.0, Color::WHITE);
        c.fill_circle(5.0, 5.0, 0.0, Color::WHITE);
        assert!(c.pixels().iter().all(|p| *p == Color::BLACK));
    }

    #[test]
    fn blend_half_alpha_over_black() {
        let mut c = canvas();
        c.fill_rect(0.0, 0.0, 1.0, 1.0, Color::rgba(200, 100, 50, 128));
        let p = c.pixel(0, 0).unwrap();
        assert!((p.r as i32 - 100).abs() <= 1);
        assert!((p.g as i32 - 50).abs() <= 1);
        assert!((p.b as i32 - 25).abs() <= 1);
        assert_eq!(p.a, 255);
    }

    #[test]
    fn circle_covers_center_not_corner() {
        let mut c = canvas();
        c.fill_circle(32.0, 24.0, 10.0, palette::BEAM);
        assert_eq!(c.pixel(32, 24), Some(palette::BEAM));
        assert_eq!(c.pixel(0, 0), Some(Color::BLACK));
        assert_eq!(c.pixel(32 + 12, 24), Some(Color::BLACK));
    }

    #[test]
    fn trapezoid_narrows_toward_top() {
        let mut c = canvas();
        c.fill_trapezoid(12.0, 10.0, 10.0, 40.0, 20.0, Color::WHITE);
        // Bottom row spans the full width, top row only the centered part.
        assert_eq!(c.pixel(13, 28), Some(Color::WHITE));
        assert_eq!(c.pixel(13, 11), Some(Color::BLACK));
        assert_eq!(c.pixel(32, 11), Some(Color::WHITE));
    }

    #[test]
    fn resize_reallocates() {
        let mut c = canvas();
        c.resize(16, 16);
        assert_eq!(c.pixels().len(), 256);
        assert_eq!(c.pixel(20, 2), None);
        c.resize(16, 16);
        assert_eq!(c.width(), 16);
    }

    #[test]
    fn sector_respects_angle_range() {
        let mut c = canvas();
        // Right-facing quarter sector around angle 0.
        c.fill_sector(32.0, 24.0, 12.0, -0.5, 0.5, Color::WHITE);
        assert_eq!(c.pixel(40, 24), Some(Color::WHITE));
        assert_eq!(c.pixel(24, 24), Some(Color::BLACK));
    }
}
