//! TRAPATT diode: slow plasma fill of the drift region, then rapid
//! extraction of the trapped plasma once the avalanche front has crossed.
//!
//! Particles alternate between a slow filling march and a fast extraction
//! sprint, wrapping back into the fill phase at the far contact.

use rand::rngs::SmallRng;
use rand::Rng;

use super::{DeviceModel, StepCtx};
use crate::descriptor::DeviceId;
use crate::draw;
use crate::particle::{Particle, ParticleState};
use crate::visuals::{palette, Color};

// Screen mapping.
const W_P: f32 = 50.0;
const W_N: f32 = 200.0;
const W_N_PLUS: f32 = 50.0;
const TOTAL_WIDTH: f32 = W_P + W_N + W_N_PLUS;
const FILL_SPEED: f32 = 1.0;
const EXTRACT_SPEED: f32 = 8.0;
const MAX_PARTICLES: usize = 100;

pub struct TrapattDiode;

fn plasma_spawn(rng: &mut SmallRng, start_x: f32, cy: f32) -> Particle {
    let mut p = Particle::at(
        start_x + W_P + rng.gen::<f32>() * 20.0,
        cy + (rng.gen::<f32>() - 0.5) * 60.0,
        FILL_SPEED,
    );
    p.state = ParticleState::Filling;
    p
}

impl DeviceModel for TrapattDiode {
    fn step(&self, ctx: &mut StepCtx<'_>) {
        let StepCtx {
            canvas,
            pool,
            carriers,
            inputs,
            frame,
            dt,
            running,
            rng,
            ..
        } = ctx;
        let (frame, dt, running) = (*frame, *dt, *running);
        let inputs = *inputs;

        let cx = canvas.width() as f32 / 2.0;
        let cy = canvas.height() as f32 / 2.0;
        let start_x = cx - TOTAL_WIDTH / 2.0;

        carriers.ensure(DeviceId::TrapattDiode, TOTAL_WIDTH, rng);
        if running {
            carriers.step(&inputs, dt, TOTAL_WIDTH, frame, rng);

            pool.inject(1, MAX_PARTICLES, |_| plasma_spawn(rng, start_x, cy));

            for p in pool.iter_mut() {
                if p.state == ParticleState::Filling {
                    p.x += p.vx * dt;
                    if p.x > start_x + W_P + W_N - 10.0 {
                        p.state = ParticleState::Extracting;
                        p.vx = EXTRACT_SPEED;
                    }
                } else {
                    p.x += p.vx * dt;
                }
                // Wrap keeps the lane: only x and phase reset.
                if p.x > start_x + TOTAL_WIDTH {
                    p.x = start_x + W_P;
                    p.vx = FILL_SPEED;
                    p.state = ParticleState::Filling;
                }
            }
        }

        draw::layer(canvas, start_x, cy - 50.0, W_P, 100.0, Color::rgb(127, 29, 29), "p+", "");
        draw::layer(
            canvas,
            start_x + W_P,
            cy - 50.0,
            W_N,
            100.0,
            Color::rgb(194, 65, 12),
            "n (Drift)",
            "Plasma Zone",
        );
        draw::layer(
            canvas,
            start_x + W_P + W_N,
            cy - 50.0,
            W_N_PLUS,
            100.0,
            Color::rgb(23, 37, 84),
            "n+",
            "",
        );

        carriers.draw(canvas, start_x, cy - 45.0, 90.0);

        for p in pool.iter() {
            let filling = p.state == ParticleState::Filling;
            let glow = if filling { 10.0 } else { 2.0 };
            let color = if filling { Color::WHITE } else { palette::BEAM };
            // Amber halo around the plasma, whatever the core color.
            canvas.glow_disc(p.x, p.y, 4.0, 4.0 + glow * 0.5, palette::AMBER.fade(0.6));
            canvas.fill_circle(p.x, p.y, 4.0, color);
        }
    }
}
