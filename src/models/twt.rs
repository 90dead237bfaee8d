//! Traveling wave tube: continuous interaction with a growing wave along
//! a helix, with a mid-tube attenuator killing reflections.
//!
//! The force on a particle follows an exponential envelope along the tube,
//! zeroed inside the attenuator and restarted after it, which is what makes
//! bunches visibly re-form downstream of the severed section.

use rand::rngs::SmallRng;
use rand::Rng;

use super::{DeviceModel, StepCtx};
use crate::draw;
use crate::font;
use crate::particle::{Particle, ParticleState};
use crate::visuals::{palette, Color};

// Screen mapping.
const EDGE_MARGIN: f32 = 80.0;
const ATTEN_FRACTION: f32 = 0.45;
const ATTEN_LENGTH: f32 = 40.0;
const WAVE_K: f32 = 0.15;
const WAVE_OMEGA: f32 = 0.25;
const MAX_PARTICLES: usize = 4500;
const INJECT_PER_FRAME: usize = 8;
const MAGNET_PITCH: f32 = 25.0;

pub struct TravelingWaveTube;

/// Helix geometry for the current canvas width.
struct Helix {
    start: f32,
    end: f32,
    atten_start: f32,
    atten_end: f32,
}

impl Helix {
    fn for_width(width: f32) -> Helix {
        let start = EDGE_MARGIN;
        let end = width - EDGE_MARGIN;
        let atten_start = start + (end - start) * ATTEN_FRACTION;
        Helix {
            start,
            end,
            atten_start,
            atten_end: atten_start + ATTEN_LENGTH,
        }
    }

    fn in_attenuator(&self, x: f32) -> bool {
        x >= self.atten_start && x <= self.atten_end
    }
}

/// Force envelope felt by a particle at `x`.
fn force_envelope(helix: &Helix, x: f32, atten_on: bool) -> f32 {
    if atten_on && helix.in_attenuator(x) {
        return 0.0;
    }
    if atten_on && x > helix.atten_end {
        let progress = (x - helix.atten_end) / (helix.end - helix.atten_end);
        2.0 + (progress * 2.5).exp()
    } else {
        let progress = (x - helix.start) / (helix.end - helix.start);
        1.0 + (progress * 3.0).exp()
    }
}

/// Drawn amplitude of the helix trace at `x`. Larger than the force
/// envelope so the growth reads clearly at a glance.
fn trace_envelope(helix: &Helix, x: f32, atten_on: bool) -> f32 {
    if atten_on && helix.in_attenuator(x) {
        return 0.0;
    }
    if atten_on && x > helix.atten_end {
        let progress = (x - helix.atten_end) / (helix.end - helix.atten_end);
        5.0 + (progress * 2.5).exp() * 2.0
    } else {
        let progress = (x - helix.start) / (helix.end - helix.start);
        5.0 + (progress * 2.8).exp() * 3.0
    }
}

fn launch(rng: &mut SmallRng, cy: f32, speed: f32) -> Particle {
    Particle::at(
        20.0 - rng.gen::<f32>(),
        cy + (rng.gen::<f32>() - 0.5) * 4.0,
        speed,
    )
}

impl DeviceModel for TravelingWaveTube {
    fn step(&self, ctx: &mut StepCtx<'_>) {
        let StepCtx {
            canvas,
            pool,
            inputs,
            frame,
            dt,
            running,
            rng,
            ..
        } = ctx;
        let (frame, dt, running) = (*frame, *dt, *running);
        let inputs = *inputs;

        let width = canvas.width() as f32;
        let cy = canvas.height() as f32 / 2.0;
        let helix = Helix::for_width(width);

        let base_speed = (inputs.get("Vo") as f32).sqrt() * 2.5;
        let atten_on = inputs.get("atten") > 0.5;
        let tightness = inputs.get("Vi") as f32 / 20.0;

        if running {
            pool.inject(INJECT_PER_FRAME, MAX_PARTICLES, |_| {
                launch(rng, cy, base_speed)
            });

            for p in pool.iter_mut() {
                if p.x < helix.start {
                    p.vx = base_speed;
                    p.state = ParticleState::Neutral;
                } else if p.x < helix.end {
                    let amplitude = force_envelope(&helix, p.x, atten_on);
                    let rf = (p.x * WAVE_K - frame * WAVE_OMEGA).sin();
                    if amplitude > 0.0 {
                        let mut force = rf * amplitude * tightness;
                        // Accelerating half-cycles bite harder than
                        // decelerating ones, which is what drags the bunch
                        // slightly ahead of the wave crest.
                        force *= if force > 0.0 { 2.0 } else { 1.2 };
                        p.vx = base_speed + force * 2.0;
                    }
                    let ratio = p.vx / base_speed;
                    p.state = if ratio < 0.96 {
                        ParticleState::Slow
                    } else if ratio > 1.05 {
                        ParticleState::Fast
                    } else {
                        ParticleState::Neutral
                    };
                }

                p.x += p.vx * dt;
                if p.x > width + 50.0 {
                    *p = launch(rng, cy, base_speed);
                    p.x = 20.0;
                }
            }
        }

        canvas.fill_rect(10.0, cy - 15.0, 30.0, 30.0, palette::BEAM);
        font::draw_text(canvas, "GUN", 15.0, cy - 27.0, Color::WHITE);

        // Alternating focusing magnets above and below the tube.
        let mut m = helix.start - 10.0;
        while m < helix.end + 10.0 {
            let north = ((m / MAGNET_PITCH) % 2.0).floor() == 0.0;
            let color = if north { palette::FAST } else { palette::ACCENT };
            canvas.fill_rect(m, cy - 45.0, MAGNET_PITCH - 2.0, 10.0, color);
            canvas.fill_rect(m, cy + 35.0, MAGNET_PITCH - 2.0, 10.0, color);
            m += MAGNET_PITCH;
        }

        // Helix trace, with the pen lifted through the attenuator edges.
        let mut prev: Option<(f32, f32)> = None;
        let mut x = helix.start;
        while x <= helix.end {
            let amp = trace_envelope(&helix, x, atten_on);
            let y = cy + (x * WAVE_K - frame * WAVE_OMEGA).sin() * amp;
            let lift = atten_on
                && ((x - helix.atten_start).abs() < 2.0 || (x - helix.atten_end).abs() < 2.0);
            if let Some((px, py)) = prev {
                if !lift {
                    canvas.thick_line(px, py, x, y, 2.0, palette::AMBER_DEEP);
                }
            }
            prev = Some((x, y));
            x += 2.0;
        }

        if atten_on {
            canvas.fill_rect(
                helix.atten_start,
                cy - 12.0,
                ATTEN_LENGTH,
                24.0,
                Color::rgba(50, 50, 50, 230),
            );
            font::draw_text(canvas, "ATTEN", helix.atten_start + 2.0, cy - 22.0, Color::WHITE);
        }

        canvas.fill_rect(width - 60.0, cy - 25.0, 40.0, 50.0, palette::SLATE_700);

        for p in pool.iter() {
            if p.x <= 0.0 || p.x >= width {
                continue;
            }
            match p.state {
                ParticleState::Slow => {
                    draw::electron(canvas, p.x, p.y, 3.5, Color::WHITE, 8.0)
                }
                ParticleState::Fast => draw::electron(canvas, p.x, p.y, 2.2, palette::FAST, 0.0),
                _ => draw::electron(canvas, p.x, p.y, 2.0, palette::ACCENT, 0.0),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_is_dead_inside_the_attenuator() {
        let helix = Helix::for_width(1280.0);
        let mid = (helix.atten_start + helix.atten_end) / 2.0;
        assert_eq!(force_envelope(&helix, mid, true), 0.0);
        // With the attenuator switched off the same spot carries force.
        assert!(force_envelope(&helix, mid, false) > 1.0);
    }

    #[test]
    fn envelope_restarts_small_after_the_attenuator() {
        let helix = Helix::for_width(1280.0);
        let before = force_envelope(&helix, helix.atten_start - 5.0, true);
        let after = force_envelope(&helix, helix.atten_end + 5.0, true);
        assert!(after < before);
        // And grows back toward the collector.
        let late = force_envelope(&helix, helix.end - 5.0, true);
        assert!(late > after);
    }

    #[test]
    fn envelope_grows_monotonically_without_attenuator() {
        let helix = Helix::for_width(1280.0);
        let mut last = 0.0;
        let mut x = helix.start;
        while x <= helix.end {
            let amp = force_envelope(&helix, x, false);
            assert!(amp > last);
            last = amp;
            x += 50.0;
        }
    }
}
