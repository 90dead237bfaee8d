//! Tunnel diode: mesa-structure junction with carriers tunneling through
//! the thin depletion region under forward bias.
//!
//! The falling particles are decoration for the tunneling current; the
//! carrier layer underneath shows electrons and holes meeting at the
//! junction line.

use rand::rngs::SmallRng;
use rand::Rng;

use super::{DeviceModel, StepCtx};
use crate::descriptor::DeviceId;
use crate::draw;
use crate::font;
use crate::particle::Particle;
use crate::visuals::{palette, Color, Metal};

// Screen mapping.
const MAX_PARTICLES: usize = 300;
const SPAWN_CHANCE: f32 = 0.2;
const LIFE_DECAY: f32 = 0.02;
const MESA_TRACK: f32 = 120.0;

pub struct TunnelDiode;

fn tunnel_spawn(rng: &mut SmallRng, cx: f32, cy: f32) -> Particle {
    let mut p = Particle::at(cx + (rng.gen::<f32>() - 0.5) * 20.0, cy - 5.0, rng.gen::<f32>() - 0.5);
    p.vy = 2.0 + rng.gen::<f32>();
    p
}

impl DeviceModel for TunnelDiode {
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

        let conducting = inputs.get("Vbias") > 0.0;

        carriers.ensure(DeviceId::TunnelDiode, MESA_TRACK, rng);
        if running {
            carriers.step(&inputs, dt, MESA_TRACK, frame, rng);

            if conducting && rng.gen::<f32>() < SPAWN_CHANCE {
                pool.inject(1, MAX_PARTICLES, |_| tunnel_spawn(rng, cx, cy));
            }
            for p in pool.iter_mut() {
                p.y += p.vy * dt;
                p.x += p.vx * dt;
                // Lifetime burns in real frames, independent of time scale.
                p.life -= LIFE_DECAY;
            }
            let floor = cy + 60.0;
            pool.retain(|p| p.life > 0.0 && p.y <= floor);
        }

        draw::metal(canvas, cx - 80.0, cy + 60.0, 160.0, 20.0, Metal::Gold);
        font::draw_text_centered(canvas, "Anode", cx, cy + 68.0, Color::BLACK);
        draw::metal(canvas, cx - 90.0, cy - 60.0, 20.0, 140.0, Metal::Steel);
        draw::metal(canvas, cx + 70.0, cy - 60.0, 20.0, 140.0, Metal::Steel);

        draw::mesa(canvas, cx - 60.0, cy, 60.0, 120.0, 60.0, Color::rgb(153, 27, 27));
        font::draw_text_centered(
            canvas,
            "p++ Ge/GaAs",
            cx,
            cy + 33.0,
            Color::rgba(255, 255, 255, 204),
        );

        carriers.draw(canvas, cx - 60.0, cy + 8.0, 44.0);

        let pi = std::f32::consts::PI;
        canvas.fill_sector(cx, cy, 15.0, pi, 2.0 * pi, palette::LABEL_BRIGHT);
        font::draw_text_centered(canvas, "n++ Dot", cx, cy - 12.0, Color::BLACK);

        canvas.thick_line(cx - 30.0, cy, cx + 30.0, cy, 2.0, palette::AMBER);
        canvas.line(cx, cy - 15.0, cx, cy - 60.0, Color::rgb(209, 213, 219));

        draw::metal(canvas, cx - 80.0, cy - 80.0, 160.0, 20.0, Metal::Gold);
        font::draw_text_centered(canvas, "Cathode", cx, cy - 72.0, Color::BLACK);

        for p in pool.iter() {
            draw::electron(canvas, p.x, p.y, 2.0, palette::BEAM.fade(p.life), 15.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;
    use crate::carriers::CarrierField;
    use crate::descriptor::Inputs;
    use crate::particle::ParticlePool;
    use rand::SeedableRng;

    fn run_frames(bias: f64, frames: u32) -> usize {
        let spec = DeviceId::TunnelDiode.spec();
        let mut values = spec.defaults();
        values.insert("Vbias".to_string(), bias);
        let mut canvas = Canvas::new(640, 480);
        let mut pool = ParticlePool::new();
        let mut carriers = CarrierField::new();
        let mut rng = SmallRng::seed_from_u64(3);

        let mut peak = 0;
        for frame in 0..frames {
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
            TunnelDiode.step(&mut ctx);
            peak = peak.max(pool.len());
        }
        peak
    }

    #[test]
    fn forward_bias_sustains_a_trickle() {
        assert!(run_frames(150.0, 200) > 0);
    }

    #[test]
    fn zero_bias_blocks_conduction() {
        assert_eq!(run_frames(0.0, 200), 0);
    }
}
