//! O-type backward wave oscillator: the beam feeds a wave whose group
//! velocity points back toward the gun, so RF is taken off at the gun end.
//!
//! The interaction strength tapers toward the collector, which is the
//! visual cue that energy accumulates backward.

use rand::rngs::SmallRng;
use rand::Rng;

use super::{DeviceModel, StepCtx};
use crate::draw;
use crate::font;
use crate::particle::{Particle, ParticleState};
use crate::visuals::{palette, Color};

// Screen mapping.
const EDGE_MARGIN: f32 = 100.0;
const WAVE_K: f32 = 0.15;
const WAVE_OMEGA: f32 = 0.2;
const TAPER: f32 = 0.6;
const THRESHOLD: f32 = 0.15;
const CAP_BASE: f32 = 3500.0;
const PIN_PITCH: f32 = 30.0;
const PIN_HEIGHT: f32 = 40.0;

pub struct BackwardWaveOscillator;

fn launch(rng: &mut SmallRng, cy: f32, speed: f32) -> Particle {
    Particle::at(50.0, cy + (rng.gen::<f32>() - 0.5) * 10.0, speed)
}

impl DeviceModel for BackwardWaveOscillator {
    fn step(&self, ctx: &mut StepCtx<'_>) {
        let StepCtx {
            canvas,
            pool,
            inputs,
            frame,
            dt,
            density,
            running,
            rng,
            ..
        } = ctx;
        let (frame, dt, density, running) = (*frame, *dt, *density, *running);
        let inputs = *inputs;

        let width = canvas.width() as f32;
        let cy = canvas.height() as f32 / 2.0;
        let struct_start = EDGE_MARGIN;
        let struct_end = width - EDGE_MARGIN;

        let base_speed = (inputs.get("Vo") as f32).sqrt() * 2.5;

        if running {
            let cap = (CAP_BASE * density) as usize;
            let inject = (density * 4.0).ceil() as usize;
            pool.inject(inject, cap, |_| launch(rng, cy, base_speed));

            for p in pool.iter_mut() {
                if p.x > struct_start && p.x < struct_end {
                    let rf = (p.x * WAVE_K - frame * WAVE_OMEGA).sin();
                    let progress = (p.x - struct_start) / (struct_end - struct_start);
                    let wave_amp = 1.0 - progress * TAPER;
                    let field = rf * wave_amp;

                    if field > THRESHOLD {
                        p.vx = p.base_vx * 0.7;
                        p.state = ParticleState::Slow;
                    } else if field < -THRESHOLD {
                        p.vx = p.base_vx * 1.8;
                        p.state = ParticleState::Fast;
                    } else {
                        p.vx = p.base_vx;
                        p.state = ParticleState::Neutral;
                    }
                } else {
                    p.vx = p.base_vx;
                    p.state = ParticleState::Neutral;
                }

                p.x += p.vx * dt;
                if p.x > width + 50.0 {
                    *p = launch(rng, cy, base_speed);
                }
            }
        }

        // Interdigital slow-wave pins, staggered top and bottom.
        let mut x = struct_start;
        while x <= struct_end {
            canvas.thick_line(x, cy - PIN_HEIGHT, x, cy - 10.0, 4.0, palette::AMBER_DARK);
            canvas.thick_line(
                x + PIN_PITCH / 2.0,
                cy + PIN_HEIGHT,
                x + PIN_PITCH / 2.0,
                cy + 10.0,
                4.0,
                palette::AMBER_DARK,
            );
            x += PIN_PITCH;
        }

        canvas.line(0.0, cy, width, cy, Color::rgba(255, 255, 255, 26));

        canvas.fill_rect(20.0, cy - 20.0, 30.0, 40.0, palette::BEAM);
        font::draw_text(canvas, "GUN", 25.0, cy - 32.0, Color::WHITE);

        canvas.fill_rect(width - 50.0, cy - 30.0, 40.0, 60.0, palette::SLATE_700);
        font::draw_text(canvas, "COLLECTOR", width - 100.0, cy - 42.0, palette::LABEL);

        canvas.thick_line(
            struct_start,
            cy - PIN_HEIGHT,
            struct_start - 20.0,
            cy - PIN_HEIGHT - 30.0,
            4.0,
            palette::RF_OUT,
        );
        font::draw_text(
            canvas,
            "RF OUT",
            struct_start - 40.0,
            cy - PIN_HEIGHT - 42.0,
            palette::RF_OUT,
        );

        for p in pool.iter() {
            match p.state {
                ParticleState::Slow => {
                    draw::electron(canvas, p.x, p.y, 3.5, Color::WHITE, 5.0)
                }
                ParticleState::Fast => draw::electron(canvas, p.x, p.y, 2.0, palette::FAST, 0.0),
                _ => draw::electron(canvas, p.x, p.y, 2.5, palette::BEAM, 0.0),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;
    use crate::carriers::CarrierField;
    use crate::descriptor::{DeviceId, Inputs};
    use crate::particle::ParticlePool;
    use rand::SeedableRng;

    #[test]
    fn wave_phase_sorts_the_beam_into_speed_classes() {
        let spec = DeviceId::BackwardWaveOscillator.spec();
        let values = spec.defaults();
        let mut canvas = Canvas::new(800, 450);
        let mut pool = ParticlePool::new();
        let mut carriers = CarrierField::new();
        let mut rng = SmallRng::seed_from_u64(23);

        for frame in 0..300 {
            let mut ctx = StepCtx {
                canvas: &mut canvas,
                pool: &mut pool,
                carriers: &mut carriers,
                inputs: Inputs::new(spec, &values),
                frame: frame as f32,
                dt: 1.0,
                density: 6.0,
                running: true,
                rng: &mut rng,
            };
            BackwardWaveOscillator.step(&mut ctx);

            for p in pool.iter() {
                assert!(p.x <= 800.0 + 50.0);
                // Inside or outside the structure, speed is one of the
                // three wave classes.
                assert!(
                    p.vx == p.base_vx || p.vx == p.base_vx * 0.7 || p.vx == p.base_vx * 1.8,
                    "unexpected speed {} for base {}",
                    p.vx,
                    p.base_vx
                );
            }
        }

        let slow = pool.iter().any(|p| p.state == ParticleState::Slow);
        let fast = pool.iter().any(|p| p.state == ParticleState::Fast);
        assert!(slow && fast);
    }
}
