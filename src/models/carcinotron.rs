//! Carcinotron (M-type BWO): a sheet beam drifts between sole and anode
//! under crossed fields, bunching against a backward wave and getting
//! absorbed by the anode vanes.
//!
//! Favorable electrons climb toward the anode and unfavorable ones sink
//! back toward the sole, so the phase sorting is vertical here rather than
//! longitudinal.

use glam::Vec2;
use rand::rngs::SmallRng;
use rand::Rng;

use super::{DeviceModel, StepCtx};
use crate::font;
use crate::particle::{Particle, ParticleState};
use crate::visuals::{palette, Color};

// Screen mapping.
const EDGE_MARGIN: f32 = 100.0;
const LANE_OFFSET: f32 = 60.0;
const WAVE_K: f32 = 0.1;
const WAVE_OMEGA: f32 = 0.3;
const BUNCHING: f32 = 2.5;
const DRIFT_GAIN: f32 = 180.0;
const MIN_DRIFT: f32 = 2.0;
const CLIMB: f32 = 0.6;
const SINK: f32 = 0.3;
const SETTLE: f32 = 0.2;
const MAX_PARTICLES: usize = 7000;
const INJECT_PER_FRAME: usize = 30;
const VANE_PITCH: f32 = 20.0;

pub struct Carcinotron;

fn launch(rng: &mut SmallRng, sole_y: f32) -> Particle {
    let mut p = Particle::at(50.0 + rng.gen::<f32>() * 15.0, sole_y - 15.0 - rng.gen::<f32>() * 25.0, 0.0);
    p.base_y = sole_y - 25.0;
    p
}

impl DeviceModel for Carcinotron {
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
        let start_x = EDGE_MARGIN;
        let end_x = width - EDGE_MARGIN;
        let sole_y = cy + LANE_OFFSET;
        let anode_y = cy - LANE_OFFSET;

        // E/B drift velocity in screen units.
        let e_field = inputs.get("Vo") as f32 / inputs.get("d") as f32;
        let drift = (e_field / inputs.get("Bo") as f32 * DRIFT_GAIN).max(MIN_DRIFT);

        if running {
            pool.inject(INJECT_PER_FRAME, MAX_PARTICLES, |_| launch(rng, sole_y));

            for p in pool.iter_mut() {
                let phase = p.x * WAVE_K - frame * WAVE_OMEGA;
                let rf = phase.sin();
                p.x += (drift + rf * BUNCHING) * dt;

                let target_y = p.base_y + (phase + std::f32::consts::FRAC_PI_2).sin() * 20.0;
                if p.x > start_x {
                    if rf < -0.1 {
                        p.base_y -= CLIMB * dt;
                        p.state = ParticleState::Slow;
                    } else {
                        p.base_y += SINK * dt;
                        p.state = ParticleState::Fast;
                    }
                }
                p.y += (target_y - p.y) * SETTLE;

                if p.y <= anode_y + 5.0 {
                    p.y = anode_y + 5.0;
                    p.state = ParticleState::Absorbed;
                }
                if p.y >= sole_y - 5.0 {
                    p.y = sole_y - 5.0;
                }

                if p.x > width + 20.0 || p.state == ParticleState::Absorbed {
                    *p = launch(rng, sole_y);
                }
            }
        }

        canvas.fill_rect(start_x, sole_y, end_x - start_x, 15.0, palette::SLATE_800);
        font::draw_text_centered(canvas, "SOLE (-)", width / 2.0, sole_y + 23.0, palette::LABEL);

        canvas.fill_rect(start_x, anode_y - 20.0, end_x - start_x, 20.0, palette::BRONZE);
        let mut x = start_x;
        while x < end_x {
            canvas.fill_rect(x, anode_y, 10.0, 20.0, palette::AMBER_DARK);
            x += VANE_PITCH;
        }
        font::draw_text_centered(canvas, "ANODE (+)", width / 2.0, anode_y - 37.0, palette::AMBER);

        canvas.fill_triangle(
            Vec2::new(30.0, sole_y),
            Vec2::new(start_x, sole_y - 10.0),
            Vec2::new(start_x, sole_y),
            palette::BEAM,
        );

        canvas.thick_line(start_x, anode_y, start_x - 30.0, anode_y - 30.0, 4.0, palette::RF_OUT);
        font::draw_text(canvas, "RF OUT", start_x - 60.0, anode_y - 47.0, palette::RF_OUT);

        canvas.fill_rect(end_x, sole_y - 60.0, 30.0, 70.0, palette::SLATE_600);

        for p in pool.iter() {
            let (color, r) = match p.state {
                ParticleState::Slow => (Color::WHITE, 2.5),
                ParticleState::Fast => (palette::FAST, 2.0),
                _ => (palette::ACCENT, 2.0),
            };
            canvas.fill_circle(p.x, p.y, r, color);
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
    fn sheet_beam_stays_between_sole_and_anode() {
        let spec = DeviceId::Carcinotron.spec();
        let values = spec.defaults();
        let mut canvas = Canvas::new(800, 450);
        let mut pool = ParticlePool::new();
        let mut carriers = CarrierField::new();
        let mut rng = SmallRng::seed_from_u64(29);

        let cy = 225.0;
        let sole_y = cy + LANE_OFFSET;
        let anode_y = cy - LANE_OFFSET;
        for frame in 0..500 {
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
            Carcinotron.step(&mut ctx);

            for p in pool.iter() {
                // Anode hits recycle immediately, sole hits just clamp.
                assert_ne!(p.state, ParticleState::Absorbed);
                assert!(p.y >= anode_y + 5.0 && p.y <= sole_y - 5.0, "y = {}", p.y);
                assert!(p.x <= 800.0 + 20.0);
            }
        }

        assert!(!pool.is_empty());
        assert!(pool.len() <= MAX_PARTICLES);
    }
}
