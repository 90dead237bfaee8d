//! Reflex klystron: one cavity does both bunching and extraction, with the
//! repeller folding the drift space back onto it.
//!
//! Oscillation only happens when the repeller round trip lands on an
//! n + 3/4 cycle boundary; [`crate::physics::reflex_resonance`] supplies
//! the mode number and a strength in `[0, 1]` that drives both the
//! modulation amplitude and the cavity glow.

use rand::rngs::SmallRng;
use rand::Rng;

use super::{DeviceModel, StepCtx};
use crate::draw;
use crate::font;
use crate::particle::{Particle, ParticleState};
use crate::physics;
use crate::visuals::{palette, Color, Metal};

// Screen mapping.
const PHASE_RATE: f32 = 0.25;
const CAVITY_FRACTION: f32 = 0.2;
const REPELLER_FRACTION: f32 = 0.9;
const FIELD_DIVISOR: f32 = 14000.0;
const BEAM_CURRENT_MA: f64 = 20.0;
const GAP_HALF_WIDTH: f32 = 15.0;
const SPAWN_X: f32 = 20.0;
const SPAWN_SPREAD: f32 = 15.0;

pub struct ReflexKlystron;

fn launch(rng: &mut SmallRng, cy: f32, speed: f32) -> Particle {
    Particle::at(
        SPAWN_X,
        cy + (rng.gen::<f32>() - 0.5) * SPAWN_SPREAD,
        speed,
    )
}

impl DeviceModel for ReflexKlystron {
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

        let vo = inputs.get("Vo");
        let vr = inputs.get("Vr");
        let resonance = physics::reflex_resonance(
            vo,
            vr,
            inputs.get("L") / 1000.0,
            inputs.get("f") * 1e9,
        );
        let strength = resonance.strength as f32;

        let base_speed = 5.0 * (vo as f32 / 300.0).sqrt();
        // Retarding force between cavity and repeller, scaled for the screen.
        let rep_field = (vo as f32 + vr as f32) / FIELD_DIVISOR;

        let cavity_x = width * CAVITY_FRACTION;
        let repeller_x = width * REPELLER_FRACTION;
        let drift_length = repeller_x - cavity_x;

        if running {
            let density_factor = (BEAM_CURRENT_MA / 20.0).min(6.0);
            let cap = (800.0 * density_factor) as usize;
            let inject = (2.0 * density_factor).ceil() as usize;
            pool.inject(inject, cap, |_| launch(rng, cy, base_speed));

            let phase = (frame * PHASE_RATE).sin();
            for p in pool.iter_mut() {
                // Forward pass through the gap, once per excursion.
                if p.vx > 0.0 && (p.x - cavity_x).abs() < GAP_HALF_WIDTH && p.gap_index < 0 {
                    let rf_amp = 0.2 + 0.3 * strength;
                    p.vx *= 1.0 + rf_amp * phase;
                    p.gap_index = 0;
                    p.state = if phase > 0.1 {
                        ParticleState::Fast
                    } else if phase < -0.1 {
                        ParticleState::Slow
                    } else {
                        ParticleState::Neutral
                    };
                }

                if p.x > cavity_x {
                    p.vx -= rep_field * dt;
                }
                p.x += p.vx * dt;

                // Hit the repeller, or made it back past the gun.
                if p.x > repeller_x || (p.x < SPAWN_X && p.vx < 0.0) {
                    *p = launch(rng, cy, base_speed);
                }
            }
        }

        draw::metal(canvas, 0.0, cy - 50.0, repeller_x, 15.0, Metal::Steel);
        draw::metal(canvas, 0.0, cy + 35.0, repeller_x, 15.0, Metal::Steel);

        let arc = std::f32::consts::PI;
        canvas.fill_sector(repeller_x, cy, 60.0, 0.7 * arc, 1.3 * arc, palette::DANGER);

        font::draw_text_centered(
            canvas,
            &format!("REPELLER (-{vr:.0}V)"),
            repeller_x - 15.0,
            cy - 7.0,
            Color::WHITE,
        );

        // Theoretical stopping distance against the available drift.
        let stop_ratio = base_speed * base_speed / (2.0 * rep_field * drift_length);
        let drift_status = if stop_ratio > 0.95 {
            "TOO LONG (Hit Repeller)"
        } else if stop_ratio > 0.7 {
            "LONG DRIFT (Low Vr)"
        } else if stop_ratio < 0.4 {
            "SHORT DRIFT (High Vr)"
        } else {
            "NORMAL DRIFT"
        };
        font::draw_text_centered(
            canvas,
            drift_status,
            repeller_x - 15.0,
            cy + 8.0,
            Color::rgb(252, 165, 165),
        );

        let (cavity_color, glow_size) = if strength > 0.6 {
            (palette::ROSE, 25.0 * strength)
        } else if strength > 0.2 {
            (palette::WARN, 10.0)
        } else {
            (palette::SLATE_600, 0.0)
        };
        let glow = if glow_size > 0.0 { 10.0 + glow_size } else { 0.0 };
        draw::cavity(canvas, cavity_x, cy, 50.0, 80.0, "RESONATOR", glow, cavity_color);

        if resonance.strength > 0.8 {
            font::draw_text(
                canvas,
                &format!("OSCILLATING (Mode {})", resonance.mode),
                20.0,
                23.0,
                palette::GOOD,
            );
        } else {
            font::draw_text(canvas, "NO OSCILLATION", 20.0, 23.0, palette::SOFT_FAST);
        }

        for p in pool.iter() {
            let mut color = palette::BEAM;
            let mut radius = 3.0;
            if p.x > cavity_x {
                if p.vx.abs() < 0.5 {
                    // Turn-around flash.
                    color = Color::WHITE;
                    radius = 5.0;
                } else if p.vx < 0.0 {
                    color = palette::RETURNING;
                } else if p.state == ParticleState::Fast {
                    color = palette::SOFT_FAST;
                } else if p.state == ParticleState::Slow {
                    color = palette::SOFT_SLOW;
                }
            }
            draw::electron(canvas, p.x, p.y, radius, color, 15.0);
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
    fn repeller_turns_the_beam_around() {
        let spec = DeviceId::ReflexKlystron.spec();
        let values = spec.defaults();
        let mut canvas = Canvas::new(800, 450);
        let mut pool = ParticlePool::new();
        let mut carriers = CarrierField::new();
        let mut rng = SmallRng::seed_from_u64(13);

        let cavity_x = 800.0 * CAVITY_FRACTION;
        let repeller_x = 800.0 * REPELLER_FRACTION;
        let mut saw_returning = false;
        for frame in 0..800 {
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
            ReflexKlystron.step(&mut ctx);

            for p in pool.iter() {
                assert!(p.x <= repeller_x, "x {} past the repeller", p.x);
            }
            saw_returning |= pool.iter().any(|p| p.x > cavity_x && p.vx < 0.0);
        }

        // Defaults stop the beam well short of the repeller, so the
        // retarding field must send electrons back through the gap.
        assert!(saw_returning);
        assert!(!pool.is_empty());
    }

    #[test]
    fn gap_passage_is_modulated_exactly_once() {
        let spec = DeviceId::ReflexKlystron.spec();
        let values = spec.defaults();
        let mut canvas = Canvas::new(800, 450);
        let mut pool = ParticlePool::new();
        let mut carriers = CarrierField::new();
        let mut rng = SmallRng::seed_from_u64(17);

        for frame in 0..400 {
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
            ReflexKlystron.step(&mut ctx);
        }

        let marked = pool
            .iter()
            .filter(|p| p.gap_index == 0)
            .count();
        let pristine = pool.iter().filter(|p| p.gap_index < 0).count();
        assert_eq!(marked + pristine, pool.len());
        assert!(marked > 0);
    }
}
