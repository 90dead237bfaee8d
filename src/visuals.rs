//! Colors and the shared device palette.
//!
//! Everything the renderer paints is expressed as an 8-bit RGBA [`Color`].
//! The palette constants are the fixed color language of the device
//! visualizations (beam blue, fast red, slow white, metal finishes); device
//! modules pick from them rather than inventing their own tones.
//!
//! # Usage
//!
//! ```ignore
//! use mwpe::visuals::{palette, Color, Metal};
//!
//! let halo = palette::BEAM.fade(0.4);
//! let stops = Metal::Copper.stops();
//! ```

use bytemuck::{Pod, Zeroable};

/// 8-bit RGBA color, laid out to match the frame buffer byte order.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    /// Opaque color from RGB components.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 255 }
    }

    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color { r, g, b, a }
    }

    /// Opaque gray.
    #[inline]
    pub const fn gray(v: u8) -> Self {
        Color::rgb(v, v, v)
    }

    /// Same color with a replaced alpha.
    #[inline]
    pub const fn with_alpha(self, a: u8) -> Self {
        Color { a, ..self }
    }

    /// Scale the alpha channel by `t` (clamped to `[0, 1]`).
    #[inline]
    pub fn fade(self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Color {
            a: (self.a as f32 * t).round() as u8,
            ..self
        }
    }

    /// Component-wise linear interpolation toward `other`.
    pub fn lerp(self, other: Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Color {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }
}

/// Metal finishes for electrode and housing blocks.
///
/// Each finish is a three-stop vertical gradient (dark edge, bright band,
/// dark edge) that reads as a lit metal bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metal {
    /// Dark slate steel - drift tubes and outer walls.
    Steel,
    /// Warm copper - cavity blocks and collectors.
    Copper,
    /// Bright gold - contacts and high-visibility electrodes.
    Gold,
    /// Translucent blue glass - vacuum envelope hints.
    Glass,
}

impl Metal {
    /// Gradient stops, top to bottom.
    pub fn stops(&self) -> [Color; 3] {
        match self {
            Metal::Steel => [
                Color::rgb(30, 41, 59),
                Color::rgb(71, 85, 105),
                Color::rgb(30, 41, 59),
            ],
            Metal::Copper => [
                Color::rgb(93, 46, 24),
                Color::rgb(214, 136, 90),
                Color::rgb(93, 46, 24),
            ],
            Metal::Gold => [
                Color::rgb(138, 110, 47),
                Color::rgb(252, 211, 77),
                Color::rgb(138, 110, 47),
            ],
            Metal::Glass => [
                Color::rgba(100, 149, 237, 26),
                Color::rgba(100, 149, 237, 51),
                Color::rgba(100, 149, 237, 26),
            ],
        }
    }
}

/// The fixed color language shared across device visualizations.
pub mod palette {
    use super::Color;

    /// Frame background.
    pub const BACKGROUND: Color = Color::BLACK;

    /// Unmodulated beam electrons.
    pub const BEAM: Color = Color::rgb(96, 165, 250);
    /// Accelerated electrons.
    pub const FAST: Color = Color::rgb(239, 68, 68);
    /// Decelerated / bunched electrons.
    pub const SLOW: Color = Color::rgb(226, 232, 240);
    /// Softer variants used by the reflex klystron.
    pub const SOFT_FAST: Color = Color::rgb(248, 113, 113);
    pub const SOFT_SLOW: Color = Color::rgb(147, 197, 253);
    /// Electrons on a return pass.
    pub const RETURNING: Color = Color::rgb(251, 191, 36);

    /// Pulsing cavity accent.
    pub const ACCENT: Color = Color::rgb(59, 130, 246);
    /// RF output markers.
    pub const RF_OUT: Color = Color::rgb(236, 72, 153);
    /// Repeller / danger electrodes.
    pub const DANGER: Color = Color::rgb(239, 68, 68);

    /// Label text.
    pub const LABEL: Color = Color::rgb(148, 163, 184);
    pub const LABEL_BRIGHT: Color = Color::rgb(203, 213, 225);
    pub const LABEL_DIM: Color = Color::rgb(100, 116, 139);

    /// Slate structure tones.
    pub const SLATE_900: Color = Color::rgb(15, 23, 42);
    pub const SLATE_800: Color = Color::rgb(30, 41, 59);
    pub const SLATE_700: Color = Color::rgb(51, 65, 85);
    pub const SLATE_600: Color = Color::rgb(71, 85, 105);
    pub const SLATE_400: Color = Color::rgb(148, 163, 184);

    /// Amber highlights (helix wire, cathode glow).
    pub const AMBER: Color = Color::rgb(251, 191, 36);
    pub const AMBER_DEEP: Color = Color::rgb(245, 158, 11);
    /// Darker amber ladder for slow-wave vanes and anode blocks.
    pub const AMBER_DARK: Color = Color::rgb(217, 119, 6);
    pub const BRONZE: Color = Color::rgb(180, 83, 9);
    pub const BRONZE_DARK: Color = Color::rgb(120, 53, 15);

    /// Status text.
    pub const GOOD: Color = Color::rgb(74, 222, 128);
    pub const WARN: Color = Color::rgb(250, 204, 21);

    /// Cavity output glow.
    pub const ROSE: Color = Color::rgb(244, 63, 94);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_endpoints() {
        let a = Color::rgb(10, 20, 30);
        let b = Color::rgb(210, 120, 90);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), Color::rgb(110, 70, 60));
    }

    #[test]
    fn fade_clamps() {
        let c = Color::rgb(255, 255, 255);
        assert_eq!(c.fade(2.0).a, 255);
        assert_eq!(c.fade(-1.0).a, 0);
        assert_eq!(c.fade(0.5).a, 128);
    }

    #[test]
    fn metal_stops_are_symmetric() {
        for metal in [Metal::Steel, Metal::Copper, Metal::Gold, Metal::Glass] {
            let stops = metal.stops();
            assert_eq!(stops[0], stops[2]);
            assert_ne!(stops[0], stops[1]);
        }
    }
}
