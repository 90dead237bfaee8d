//! Gunn diode: a bar of n-type GaAs with ohmic contacts. Above the
//! threshold field a high-field dipole domain nucleates at the cathode and
//! sweeps to the anode, over and over.
//!
//! Two things move here: a single bright domain streak in the particle
//! pool, and the individual carriers of the [`crate::carriers`] layer
//! drifting through the bar underneath it.

use rand::Rng;

use super::{DeviceModel, StepCtx};
use crate::descriptor::DeviceId;
use crate::draw;
use crate::font;
use crate::particle::{Particle, ParticleState};
use crate::visuals::{palette, Color, Metal};

// Screen mapping.
const BAR_LENGTH: f32 = 300.0;
const BAR_HEIGHT: f32 = 80.0;
const DOMAIN_SPEED: f32 = 3.0;
const DOMAIN_HALF_WIDTH: f32 = 20.0;
const NUCLEATION_RATE: f32 = 0.03;
// Bulk threshold field for the transferred-electron effect, in V/cm.
const THRESHOLD_FIELD: f64 = 3000.0;

pub struct GunnDiode;

impl DeviceModel for GunnDiode {
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
        let start_x = cx - BAR_LENGTH / 2.0;

        let field = inputs.get("V") / (inputs.get("L") * 1e-4);
        let above_threshold = field > THRESHOLD_FIELD;

        carriers.ensure(DeviceId::GunnDiode, BAR_LENGTH, rng);
        if running {
            carriers.step(&inputs, dt, BAR_LENGTH, frame, rng);

            let has_domain = pool.iter().any(|p| p.state == ParticleState::Domain);
            if above_threshold && !has_domain && rng.gen::<f32>() < NUCLEATION_RATE * dt {
                pool.inject(1, 4, |_| {
                    let mut p = Particle::at(start_x + 10.0, cy, DOMAIN_SPEED);
                    p.state = ParticleState::Domain;
                    p
                });
            }
            for p in pool.iter_mut() {
                p.x += p.vx * dt;
            }
            let anode_edge = start_x + BAR_LENGTH - 10.0;
            pool.retain(|p| p.x <= anode_edge);
        }

        draw::metal(canvas, start_x - 30.0, cy - 40.0, 30.0, BAR_HEIGHT, Metal::Gold);
        let region_color = if above_threshold {
            Color::rgb(5, 150, 105)
        } else {
            Color::rgb(4, 120, 87)
        };
        draw::layer(
            canvas,
            start_x,
            cy - 40.0,
            BAR_LENGTH,
            BAR_HEIGHT,
            region_color,
            "n- GaAs",
            "Active Region",
        );
        draw::metal(canvas, start_x + BAR_LENGTH, cy - 40.0, 30.0, BAR_HEIGHT, Metal::Gold);
        draw::metal(canvas, start_x - 30.0, cy + 45.0, BAR_LENGTH + 60.0, 20.0, Metal::Copper);
        font::draw_text_centered(canvas, "Heat Sink", cx, cy + 53.0, palette::AMBER);

        carriers.draw(canvas, start_x, cy - 40.0, BAR_HEIGHT);

        for p in pool.iter() {
            // Soft-edged vertical streak across the bar.
            let mut off = -DOMAIN_HALF_WIDTH;
            while off < DOMAIN_HALF_WIDTH {
                let t = 1.0 - off.abs() / DOMAIN_HALF_WIDTH;
                let alpha = (t * 0.8 * 255.0) as u8;
                canvas.fill_rect(p.x + off, cy - 38.0, 1.0, 76.0, Color::rgba(255, 255, 255, alpha));
                off += 1.0;
            }
            font::draw_text_centered(canvas, "High E-Field", p.x, cy - 57.0, Color::WHITE);
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
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn at_most_one_domain_sweeps_the_bar() {
        let spec = DeviceId::GunnDiode.spec();
        let values = spec.defaults();
        let mut canvas = Canvas::new(800, 400);
        let mut pool = ParticlePool::new();
        let mut carriers = CarrierField::new();
        let mut rng = SmallRng::seed_from_u64(11);

        let mut saw_domain = false;
        for frame in 0..2000 {
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
            GunnDiode.step(&mut ctx);

            let domains = pool
                .iter()
                .filter(|p| p.state == ParticleState::Domain)
                .count();
            assert!(domains <= 1);
            saw_domain |= domains == 1;

            let start_x = 800.0 / 2.0 - BAR_LENGTH / 2.0;
            for p in pool.iter() {
                assert!(p.x <= start_x + BAR_LENGTH - 10.0);
            }
        }
        // Defaults sit far above threshold, so nucleation must happen.
        assert!(saw_domain);
    }

    #[test]
    fn below_threshold_no_domain_forms() {
        let spec = DeviceId::GunnDiode.spec();
        let mut values = spec.defaults();
        values.insert("V".to_string(), 2.0);
        let mut canvas = Canvas::new(800, 400);
        let mut pool = ParticlePool::new();
        let mut carriers = CarrierField::new();
        let mut rng = SmallRng::seed_from_u64(5);

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
            GunnDiode.step(&mut ctx);
        }
        assert!(pool.is_empty());
    }
}
