//! Cylindrical magnetron: crossed-field cloud between cathode and anode,
//! with spokes reaching the anode once the voltage beats the magnetic
//! confinement.
//!
//! Particles live in polar coordinates around the canvas center. The hub
//! radius stands in for the Brillouin cloud edge; spokes grow out of it in
//! the pi-mode sectors when the anode voltage is high enough.

use rand::rngs::SmallRng;
use rand::Rng;

use super::{DeviceModel, StepCtx};
use crate::font;
use crate::particle::Particle;
use crate::visuals::{palette, Color};

// Screen mapping.
const SCALE: f32 = 3.5;
const ROTATION_PER_MT: f32 = 0.25 / 800.0;
const SPOKE_FRACTION: f32 = 0.3;
const SPOKE_GROWTH: f32 = 1.2;
const INFALL: f32 = 2.5;
const WALK_BIAS: f32 = 0.4;
const CAP_BASE: f32 = 3500.0;
const HOLE_RADIUS: f32 = 18.0;
const HOLE_DISTANCE: f32 = 22.0;

pub struct Magnetron;

/// Edge of the electron hub for the given drive point, kept inside the
/// interaction space no matter how extreme the inputs get.
fn hub_radius(ra: f32, rb: f32, vo_kv: f32, bo_mt: f32) -> f32 {
    let mut hub = ra + vo_kv * 2.5 - bo_mt * 0.12;
    if hub > rb - 15.0 {
        hub = rb - 15.0;
    }
    if hub < ra + 5.0 {
        hub = ra + 5.0;
    }
    hub
}

/// Whether `theta` falls inside the leading edge of its pi-mode sector.
fn in_spoke(theta: f32, cavities: f32) -> bool {
    let sector = std::f32::consts::TAU / cavities;
    theta.rem_euclid(sector) < sector * SPOKE_FRACTION
}

fn emit(rng: &mut SmallRng, ra: f32, spread: f32) -> Particle {
    Particle::polar(
        rng.gen::<f32>() * std::f32::consts::TAU,
        ra + rng.gen::<f32>() * spread,
    )
}

impl DeviceModel for Magnetron {
    fn step(&self, ctx: &mut StepCtx<'_>) {
        let StepCtx {
            canvas,
            pool,
            inputs,
            dt,
            density,
            running,
            rng,
            ..
        } = ctx;
        let (dt, density, running) = (*dt, *density, *running);
        let inputs = *inputs;

        let cx = canvas.width() as f32 / 2.0;
        let cy = canvas.height() as f32 / 2.0;

        let ra = inputs.get("ra") as f32 * SCALE;
        let rb = inputs.get("rb") as f32 * SCALE;
        let cavities = inputs.get("N");
        let tune = inputs.get("tune");
        let vo_kv = inputs.get("Vo") as f32;
        let bo_mt = inputs.get("Bo") as f32;

        let omega = bo_mt * ROTATION_PER_MT;
        let hub = hub_radius(ra, rb, vo_kv, bo_mt);
        let extend_spokes = vo_kv > 12.0;

        if running {
            let cap = (CAP_BASE * density) as usize;
            let inject = (density * 6.0).ceil() as usize;
            pool.inject(inject, cap, |_| emit(rng, ra, 4.0));

            for p in pool.iter_mut() {
                p.theta += omega * dt;

                if in_spoke(p.theta, cavities as f32) && extend_spokes {
                    p.radius += SPOKE_GROWTH * dt * (vo_kv / 30.0);
                } else if p.radius > hub {
                    p.radius -= INFALL * dt;
                } else {
                    p.radius += (rng.gen::<f32>() - WALK_BIAS) * dt;
                }

                if p.radius < ra {
                    p.radius = ra;
                }
                if p.radius > rb {
                    *p = emit(rng, ra, 1.0);
                }
            }
        }

        // Anode block and interaction space.
        let shell = rb + 50.0;
        canvas.fill_circle(cx, cy, shell, palette::BRONZE);
        canvas.stroke_circle(cx, cy, shell, 4.0, palette::BRONZE_DARK);
        canvas.fill_circle(cx, cy, rb, Color::BLACK);

        // Resonator holes and their coupling slots, plus the tuning pins.
        let hole_color = Color::gray(30);
        let n = cavities as usize;
        for i in 0..n {
            let ang = i as f32 / n as f32 * std::f32::consts::TAU;
            let (sin, cos) = ang.sin_cos();
            let hole_x = cx + cos * (rb + HOLE_DISTANCE);
            let hole_y = cy + sin * (rb + HOLE_DISTANCE);
            canvas.fill_circle(hole_x, hole_y, HOLE_RADIUS, hole_color);
            canvas.thick_line(
                cx + cos * (rb - 2.0),
                cy + sin * (rb - 2.0),
                hole_x,
                hole_y,
                10.0,
                hole_color,
            );

            if tune > 0.0 {
                let pin_r = (HOLE_RADIUS - 2.0) * tune as f32 / 100.0;
                canvas.fill_radial(
                    hole_x,
                    hole_y,
                    pin_r,
                    Color::rgb(252, 211, 77),
                    palette::BRONZE,
                );
                canvas.stroke_circle(hole_x, hole_y, pin_r, 1.0, palette::BRONZE_DARK);
            }
        }

        canvas.glow_disc(cx, cy, ra, ra + 20.0, palette::AMBER);
        canvas.fill_circle(cx, cy, ra * 0.3, Color::WHITE);

        for p in pool.iter() {
            let (sin, cos) = p.theta.sin_cos();
            canvas.fill_circle(cx + cos * p.radius, cy + sin * p.radius, 2.0, palette::BEAM);
        }

        if tune > 0.0 {
            font::draw_text_centered(
                canvas,
                &format!("TUNING INSERTION: {tune:.0}%"),
                cx,
                cy + rb + 73.0,
                palette::AMBER,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hub_stays_inside_the_interaction_space() {
        let (ra, rb) = (10.0 * SCALE, 30.0 * SCALE);
        // Huge voltage pushes the hub to the anode-side limit.
        assert_eq!(hub_radius(ra, rb, 1000.0, 336.0), rb - 15.0);
        // Huge field pulls it back onto the cathode-side limit.
        assert_eq!(hub_radius(ra, rb, 1.0, 600.0), ra + 5.0);
    }

    #[test]
    fn hub_degenerate_geometry_prefers_the_cathode_limit() {
        // With ra close to rb both limits conflict; the cathode-side
        // clamp is applied last so the hub never goes below ra.
        let (ra, rb) = (20.0 * SCALE, 20.0 * SCALE);
        assert_eq!(hub_radius(ra, rb, 26.0, 336.0), ra + 5.0);
    }

    #[test]
    fn spoke_sectors_cover_a_fixed_fraction() {
        let sector = std::f32::consts::TAU / 8.0;
        assert!(in_spoke(0.1 * sector, 8.0));
        assert!(!in_spoke(0.5 * sector, 8.0));
        // Angles wrap: one full sector later is the same position.
        assert!(in_spoke(8.0 * sector + 0.1 * sector, 8.0));
        // Negative angles wrap too.
        assert!(in_spoke(-8.0 * sector + 0.1 * sector, 8.0));
    }
}
