//! Device-level drawing helpers.
//!
//! Shared geometry idioms of the device renderers: gradient metal bars,
//! resonant cavity pairs with a dashed gap marker, labeled semiconductor
//! layers, mesa trapezoids and glowing electron markers. Pure functions over
//! [`Canvas`]; everything they know arrives as arguments.

use glam::Vec2;

use crate::canvas::Canvas;
use crate::font;
use crate::visuals::{palette, Color, Metal};

/// Gradient metal bar with a faint outline.
pub fn metal(canvas: &mut Canvas, x: f32, y: f32, w: f32, h: f32, finish: Metal) {
    if !x.is_finite() || w <= 0.0 || h <= 0.0 {
        return;
    }
    canvas.fill_vgradient(x, y, w, h, finish.stops());
    canvas.stroke_rect(x, y, w, h, Color::rgba(255, 255, 255, 26));
}

/// Resonant cavity: two copper blocks flanking the beam axis at `cy`, a
/// dashed gap marker between them, an optional excitation halo and a label
/// above the top block.
pub fn cavity(
    canvas: &mut Canvas,
    x: f32,
    cy: f32,
    w: f32,
    h: f32,
    label: &str,
    glow: f32,
    glow_color: Color,
) {
    if !x.is_finite() {
        return;
    }
    if glow > 0.0 {
        canvas.glow_disc(x, cy, 22.0, 22.0 + glow, glow_color.fade(0.5));
    }
    metal(canvas, x - w / 2.0, cy - h - 20.0, w, h, Metal::Copper);
    metal(canvas, x - w / 2.0, cy + 20.0, w, h, Metal::Copper);
    canvas.dashed_vline(x, cy - 20.0, cy + 20.0, 4.0, 4.0, 2.0, palette::BEAM);
    if !label.is_empty() {
        font::draw_text_centered(canvas, label, x, cy - h - 37.0, palette::LABEL);
    }
}

/// Labeled semiconductor layer block.
pub fn layer(
    canvas: &mut Canvas,
    x: f32,
    y: f32,
    w: f32,
    h: f32,
    color: Color,
    label: &str,
    sub_label: &str,
) {
    canvas.fill_rect(x, y, w, h, color);
    canvas.stroke_rect(x, y, w, h, Color::rgba(255, 255, 255, 38));
    if !label.is_empty() {
        font::draw_text_centered(canvas, label, x + w / 2.0, y + 8.0, Color::rgba(255, 255, 255, 230));
    }
    if !sub_label.is_empty() {
        font::draw_text_centered(canvas, sub_label, x + w / 2.0, y + h - 16.0, Color::rgba(255, 255, 255, 153));
    }
}

/// Mesa trapezoid with a faint outline. `(x, y)` is the top-left of the
/// bottom edge's bounding box, matching [`Canvas::fill_trapezoid`].
pub fn mesa(canvas: &mut Canvas, x: f32, y: f32, top_w: f32, bottom_w: f32, h: f32, color: Color) {
    if !x.is_finite() || h <= 0.0 {
        return;
    }
    canvas.fill_trapezoid(x, y, top_w, bottom_w, h, color);
    let outline = Color::rgba(255, 255, 255, 51);
    let tl = Vec2::new(x + (bottom_w - top_w) / 2.0, y);
    let tr = Vec2::new(tl.x + top_w, y);
    let br = Vec2::new(x + bottom_w, y + h);
    let bl = Vec2::new(x, y + h);
    canvas.line(tl.x, tl.y, tr.x, tr.y, outline);
    canvas.line(tr.x, tr.y, br.x, br.y, outline);
    canvas.line(br.x, br.y, bl.x, bl.y, outline);
    canvas.line(bl.x, bl.y, tl.x, tl.y, outline);
}

/// Glowing electron marker. `glow` is the halo extent in pixels beyond the
/// core radius.
pub fn electron(canvas: &mut Canvas, x: f32, y: f32, radius: f32, color: Color, glow: f32) {
    if !x.is_finite() || !y.is_finite() {
        return;
    }
    canvas.glow_disc(x, y, radius, radius + glow * 0.5, color);
}
