//! Two-cavity klystron: velocity modulation at the buncher grid, ballistic
//! bunching across the drift space, extraction at the catcher.
//!
//! The modulation depth, bunching parameter and catcher glow all come from
//! the closed-form gap physics in [`crate::physics`]; the constants below
//! only map those quantities onto the screen.

use rand::rngs::SmallRng;
use rand::Rng;

use super::{DeviceModel, StepCtx};
use crate::draw;
use crate::font;
use crate::particle::{Particle, ParticleState};
use crate::physics;
use crate::visuals::{palette, Color, Metal};

// Screen mapping, kept apart from the beam physics.
const BUNCHER_FRACTION: f32 = 0.2;
const PX_PER_CM: f32 = 50.0;
const PHASE_RATE_PER_GHZ: f32 = 0.15;
const SPEED_GAIN: f32 = 3.0;
const SPEED_EXPONENT: f32 = 0.4;
const DEPTH_TO_SWING: f32 = 150.0;
const MIN_SPEED_FRACTION: f32 = 0.3;
const CATCHER_DAMPING: f32 = 0.8;
const SPAWN_SPREAD: f32 = 25.0;
const PARTICLE_RADIUS: f32 = 3.0;

pub struct TwoCavityKlystron;

fn launch(rng: &mut SmallRng, cy: f32, speed: f32) -> Particle {
    Particle::at(
        -rng.gen::<f32>() * 10.0,
        cy + (rng.gen::<f32>() - 0.5) * SPAWN_SPREAD,
        speed,
    )
}

impl DeviceModel for TwoCavityKlystron {
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

        let vo_kv = inputs.get("Vo");
        let v1 = inputs.get("Vi");
        let gap = physics::GapPhysics::new(
            vo_kv * 1000.0,
            inputs.get("f") * 1e9,
            inputs.get("d") / 1000.0,
        );
        let drift_cm = inputs.get("L");
        let bunching = gap.bunching(v1, drift_cm / 100.0);
        let glow = (physics::bessel_j1(bunching).abs() * 1.7).min(1.0) as f32;
        let depth = gap.depth(v1) as f32;

        let buncher_x = width * BUNCHER_FRACTION;
        let catcher_x = buncher_x + drift_cm as f32 * PX_PER_CM;
        let base_speed = SPEED_GAIN * (vo_kv as f32).powf(SPEED_EXPONENT);
        let phase = (frame * PHASE_RATE_PER_GHZ * inputs.get("f") as f32).sin();

        if running {
            let cap = (400.0 * inputs.get("Io") / 200.0) as usize;
            let inject = (inputs.get("Io") / 100.0).ceil() as usize;
            pool.inject(inject, cap, |_| launch(rng, cy, base_speed));

            let recycle_at = width.max(catcher_x + 150.0) + 50.0;
            for p in pool.iter_mut() {
                // One kick at the buncher, one damping hit at the catcher.
                if p.gap_index < 0 && p.x >= buncher_x {
                    p.vx = (p.base_vx * (1.0 + depth * DEPTH_TO_SWING * phase))
                        .max(p.base_vx * MIN_SPEED_FRACTION);
                    p.state = if phase > 0.1 {
                        ParticleState::Fast
                    } else if phase < -0.1 {
                        ParticleState::Slow
                    } else {
                        ParticleState::Neutral
                    };
                    p.gap_index = 0;
                }
                if p.gap_index < 1 && p.x >= catcher_x {
                    p.vx *= CATCHER_DAMPING;
                    p.gap_index = 1;
                }
                p.x += p.vx * dt;
                if p.x > recycle_at {
                    *p = launch(rng, cy, base_speed);
                }
            }
        }

        let wall_len = width.max(catcher_x + 100.0);
        draw::metal(canvas, 0.0, cy - 60.0, wall_len, 20.0, Metal::Steel);
        draw::metal(canvas, 0.0, cy + 40.0, wall_len, 20.0, Metal::Steel);

        draw::cavity(canvas, buncher_x, cy, 60.0, 90.0, "RF IN", 0.0, palette::BEAM);
        if glow > 0.3 {
            let halo = palette::ROSE.with_alpha((glow * 0.3 * 255.0) as u8);
            canvas.fill_circle(catcher_x + 25.0, cy, 60.0 * glow, halo);
        }
        draw::cavity(canvas, catcher_x, cy, 60.0, 90.0, "RF OUT", 0.0, palette::ROSE);

        let collector_x = (width - 60.0).max(catcher_x + 100.0);
        draw::metal(canvas, collector_x, cy - 50.0, 60.0, 100.0, Metal::Steel);
        font::draw_text(canvas, "COLLECTOR", collector_x + 5.0, cy - 2.0, palette::LABEL);

        font::draw_text(
            canvas,
            &format!("Bunching Param (X): {bunching:.3}"),
            20.0,
            23.0,
            Color::WHITE,
        );
        let (status, status_color) = if bunching < 1.0 {
            ("Under-Bunched (Increase L or Vi)", palette::WARN)
        } else if (1.8..=1.9).contains(&bunching) {
            ("Optimal Bunching (Max Power!)", palette::GOOD)
        } else if bunching > 2.0 {
            ("Over-Bunched (Crossover)", palette::SOFT_FAST)
        } else {
            ("Good Bunching", palette::BEAM)
        };
        font::draw_text(canvas, status, 20.0, 43.0, status_color);

        for p in pool.iter() {
            let color = match p.state {
                ParticleState::Fast => palette::FAST,
                ParticleState::Slow => palette::SLOW,
                _ => palette::BEAM,
            };
            draw::electron(canvas, p.x, p.y, PARTICLE_RADIUS, color, 15.0);
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
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn run(values: &HashMap<String, f64>, frames: u32) -> ParticlePool {
        let spec = DeviceId::TwoCavityKlystron.spec();
        let mut canvas = Canvas::new(800, 450);
        let mut pool = ParticlePool::new();
        let mut carriers = CarrierField::new();
        let mut rng = SmallRng::seed_from_u64(21);

        for frame in 0..frames {
            let mut ctx = StepCtx {
                canvas: &mut canvas,
                pool: &mut pool,
                carriers: &mut carriers,
                inputs: Inputs::new(spec, values),
                frame: frame as f32,
                dt: 1.0,
                density: 6.0,
                running: true,
                rng: &mut rng,
            };
            TwoCavityKlystron.step(&mut ctx);
        }
        pool
    }

    #[test]
    fn unmodulated_beam_keeps_its_launch_speed() {
        let mut values = DeviceId::TwoCavityKlystron.spec().defaults();
        values.insert("Vi".to_string(), 0.0);
        let pool = run(&values, 400);

        assert!(!pool.is_empty());
        assert!(pool.len() <= 400);
        for p in pool.iter() {
            // Only the catcher damping may touch the speed when Vi = 0.
            assert!(
                p.vx == p.base_vx || p.vx == p.base_vx * CATCHER_DAMPING,
                "vx {} vs base {}",
                p.vx,
                p.base_vx
            );
        }
    }

    #[test]
    fn gap_drive_spreads_the_velocity_distribution() {
        let values = DeviceId::TwoCavityKlystron.spec().defaults();
        let pool = run(&values, 300);

        let accelerated = pool.iter().any(|p| p.vx > p.base_vx * 1.05);
        let retarded = pool.iter().any(|p| p.vx < p.base_vx * 0.95);
        assert!(accelerated && retarded);
    }

    #[test]
    fn spent_electrons_recycle_to_the_gun() {
        let values = DeviceId::TwoCavityKlystron.spec().defaults();
        let pool = run(&values, 1000);

        // drift 5 cm at 50 px/cm from the buncher at x = 160.
        let recycle_at = 800.0_f32.max(160.0 + 250.0 + 150.0) + 50.0;
        for p in pool.iter() {
            assert!(p.x <= recycle_at);
            if p.gap_index < 0 {
                // Not yet through the buncher: still pristine.
                assert_eq!(p.vx, p.base_vx);
            }
        }
    }
}
