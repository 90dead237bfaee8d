//! Tiny 5x7 bitmap font for in-frame labels.
//!
//! Covers the printable ASCII range space..`Z`; lowercase input is folded to
//! uppercase and anything outside the range renders as a blank cell (the pen
//! still advances). Rows are 5-bit masks, bit 4 being the leftmost pixel.

use crate::canvas::Canvas;
use crate::visuals::Color;

pub const GLYPH_WIDTH: i32 = 5;
pub const GLYPH_HEIGHT: i32 = 7;
/// Horizontal pen advance per character (glyph plus one pixel of spacing).
pub const ADVANCE: i32 = 6;

#[rustfmt::skip]
const FONT: [[u8; 7]; 59] = [
    [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000], // ' '
    [0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00000, 0b00100], // '!'
    [0b01010, 0b01010, 0b01010, 0b00000, 0b00000, 0b00000, 0b00000], // '"'
    [0b01010, 0b01010, 0b11111, 0b01010, 0b11111, 0b01010, 0b01010], // '#'
    [0b00100, 0b01111, 0b10100, 0b01110, 0b00101, 0b11110, 0b00100], // '$'
    [0b11000, 0b11001, 0b00010, 0b00100, 0b01000, 0b10011, 0b00011], // '%'
    [0b01100, 0b10010, 0b10100, 0b01000, 0b10101, 0b10010, 0b01101], // '&'
    [0b00100, 0b00100, 0b01000, 0b00000, 0b00000, 0b00000, 0b00000], // '\''
    [0b00010, 0b00100, 0b01000, 0b01000, 0b01000, 0b00100, 0b00010], // '('
    [0b01000, 0b00100, 0b00010, 0b00010, 0b00010, 0b00100, 0b01000], // ')'
    [0b00000, 0b00100, 0b10101, 0b01110, 0b10101, 0b00100, 0b00000], // '*'
    [0b00000, 0b00100, 0b00100, 0b11111, 0b00100, 0b00100, 0b00000], // '+'
    [0b00000, 0b00000, 0b00000, 0b00000, 0b00110, 0b00100, 0b01000], // ','
    [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000], // '-'
    [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100], // '.'
    [0b00000, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b00000], // '/'
    [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110], // '0'
    [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110], // '1'
    [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111], // '2'
    [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110], // '3'
    [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010], // '4'
    [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110], // '5'
    [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110], // '6'
    [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000], // '7'
    [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110], // '8'
    [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100], // '9'
    [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b01100, 0b00000], // ':'
    [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b00100, 0b01000], // ';'
    [0b00010, 0b00100, 0b01000, 0b10000, 0b01000, 0b00100, 0b00010], // '<'
    [0b00000, 0b00000, 0b11111, 0b00000, 0b11111, 0b00000, 0b00000], // '='
    [0b01000, 0b00100, 0b00010, 0b00001, 0b00010, 0b00100, 0b01000], // '>'
    [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b00000, 0b00100], // '?'
    [0b01110, 0b10001, 0b00001, 0b01101, 0b10101, 0b10101, 0b01110], // '@'
    [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001], // 'A'
    [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110], // 'B'
    [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110], // 'C'
    [0b11100, 0b10010, 0b10001, 0b10001, 0b10001, 0b10010, 0b11100], // 'D'
    [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111], // 'E'
    [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000], // 'F'
    [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111], // 'G'
    [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001], // 'H'
    [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110], // 'I'
    [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100], // 'J'
    [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001], // 'K'
    [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111], // 'L'
    [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001], // 'M'
    [0b10001, 0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001], // 'N'
    [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110], // 'O'
    [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000], // 'P'
    [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101], // 'Q'
    [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001], // 'R'
    [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110], // 'S'
    [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100], // 'T'
    [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110], // 'U'
    [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100], // 'V'
    [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010], // 'W'
    [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001], // 'X'
    [0b10001, 0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100], // 'Y'
    [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111], // 'Z'
];

/// Pixel width of `text` at scale 1 (trailing spacing excluded).
pub fn text_width(text: &str) -> f32 {
    let n = text.chars().count() as i32;
    if n == 0 {
        0.0
    } else {
        (n * ADVANCE - 1) as f32
    }
}

/// Draw `text` with its top-left corner at `(x, y)`.
pub fn draw_text(canvas: &mut Canvas, text: &str, x: f32, y: f32, color: Color) {
    if !x.is_finite() || !y.is_finite() {
        return;
    }
    let mut pen_x = x.round() as i32;
    let pen_y = y.round() as i32;
    for ch in text.chars() {
        if let Some(glyph) = glyph_for(ch) {
            for (row, bits) in glyph.iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if bits & (0b10000 >> col) != 0 {
                        canvas.blend(pen_x + col, pen_y + row as i32, color);
                    }
                }
            }
        }
        pen_x += ADVANCE;
    }
}

/// Draw `text` horizontally centered on `cx`.
pub fn draw_text_centered(canvas: &mut Canvas, text: &str, cx: f32, y: f32, color: Color) {
    draw_text(canvas, text, cx - text_width(text) * 0.5, y, color);
}

fn glyph_for(ch: char) -> Option<&'static [u8; 7]> {
    let folded = ch.to_ascii_uppercase();
    let idx = (folded as usize).checked_sub(32)?;
    FONT.get(idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visuals::Color;

    #[test]
    fn width_counts_advance() {
        assert_eq!(text_width(""), 0.0);
        assert_eq!(text_width("A"), 5.0);
        assert_eq!(text_width("AB"), 11.0);
    }

    #[test]
    fn draws_glyph_pixels() {
        let mut c = Canvas::new(16, 16);
        c.clear(Color::BLACK);
        draw_text(&mut c, "I", 0.0, 0.0, Color::WHITE);
        // Stem of 'I' runs down the middle column.
        assert_eq!(c.pixel(2, 3), Some(Color::WHITE));
        assert_eq!(c.pixel(0, 3), Some(Color::BLACK));
    }

    #[test]
    fn lowercase_folds_to_uppercase() {
        let mut upper = Canvas::new(16, 16);
        let mut lower = Canvas::new(16, 16);
        upper.clear(Color::BLACK);
        lower.clear(Color::BLACK);
        draw_text(&mut upper, "G", 0.0, 0.0, Color::WHITE);
        draw_text(&mut lower, "g", 0.0, 0.0, Color::WHITE);
        assert_eq!(upper.pixels(), lower.pixels());
    }

    #[test]
    fn unknown_chars_advance_blank() {
        let mut c = Canvas::new(32, 16);
        c.clear(Color::BLACK);
        draw_text(&mut c, "\u{3bc}A", 0.0, 0.0, Color::WHITE);
        // The unknown glyph cell stays blank; 'A' lands one advance later.
        assert!(c.pixel(2, 3) == Some(Color::BLACK));
        assert_eq!(c.pixel(ADVANCE as u32, 3), Some(Color::WHITE));
    }
}
