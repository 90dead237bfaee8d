//! Multi-cavity klystron: cascaded bunching with per-stage gain.
//!
//! Each intermediate cavity re-modulates the beam with the RF voltage the
//! previous stages built up, saturating near the beam voltage. The kick a
//! particle receives is a tanh-compressed version of the physical
//! modulation depth so that realistic (tiny) depths stay visible.

use rand::rngs::SmallRng;
use rand::Rng;

use super::{DeviceModel, StepCtx};
use crate::draw;
use crate::font;
use crate::particle::{Particle, ParticleState};
use crate::physics;
use crate::visuals::{palette, Color, Metal};

// Screen mapping.
const STAGE_SPACING_CM: f32 = 5.0;
const PX_PER_CM: f32 = 50.0;
const MIN_PX_PER_CM: f32 = 20.0;
const START_FRACTION: f32 = 0.15;
const PHASE_RATE_PER_GHZ: f32 = 0.15;
const GAP_ZONE: f32 = 20.0;
const SENSITIVITY: f64 = 800.0;
const MAX_KICK: f32 = 0.4;
const DEBUNCH: f32 = 0.9;
const CATCHER_DAMPING: f32 = 0.95;
const SPAWN_SPREAD: f32 = 20.0;
const PARTICLE_RADIUS: f32 = 2.5;

pub struct MultiCavityKlystron;

/// Cavity x positions for `stages` cavities, shrunk to fit the canvas.
fn stage_layout(width: f32, stages: usize) -> Vec<f32> {
    let start = width * START_FRACTION;
    let total_cm = (stages.saturating_sub(1)) as f32 * STAGE_SPACING_CM;
    let mut px_per_cm = PX_PER_CM;
    let available = width - start - 100.0;
    if total_cm * px_per_cm > available {
        px_per_cm = available / total_cm;
    }
    if px_per_cm < MIN_PX_PER_CM {
        px_per_cm = MIN_PX_PER_CM;
    }
    (0..stages)
        .map(|i| start + i as f32 * STAGE_SPACING_CM * px_per_cm)
        .collect()
}

fn launch(rng: &mut SmallRng, cy: f32, speed: f32) -> Particle {
    Particle::at(
        -rng.gen::<f32>() * 10.0,
        cy + (rng.gen::<f32>() - 0.5) * SPAWN_SPREAD,
        speed,
    )
}

impl DeviceModel for MultiCavityKlystron {
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

        let vo_real = inputs.get("Vo") * 1000.0;
        let v0 = physics::beam_velocity(vo_real);
        let theta_g = physics::transit_angle(
            std::f64::consts::TAU * inputs.get("f") * 1e9,
            inputs.get("d") / 1000.0,
            v0,
        );
        let beta = physics::coupling_coefficient(theta_g);
        let gain_db = inputs.get("G");
        let gain_linear = 10f64.powf(gain_db / 20.0);
        let vi = inputs.get("Vi");

        let stages = inputs.get("N").floor() as usize;
        let positions = stage_layout(width, stages);
        let catcher_x = positions[positions.len() - 1];
        let collector_x = catcher_x + 80.0;
        let total_length = collector_x + 60.0;

        let base_speed = 4.0 * (inputs.get("Vo") as f32 / 10.0).powf(0.4);
        let omega = PHASE_RATE_PER_GHZ * inputs.get("f") as f32;

        // Saturated RF voltage at each stage, shared by the kick and the glow.
        let stage_voltage: Vec<f64> = (0..stages)
            .map(|idx| (vi * gain_linear.powi(idx as i32)).min(1.2 * vo_real))
            .collect();

        if running {
            let density_factor = (inputs.get("Io") / 50.0).min(8.0);
            let cap = (1000.0 * density_factor) as usize;
            let inject = (2.0 * density_factor).ceil() as usize;
            pool.inject(inject, cap, |_| launch(rng, cy, base_speed));

            for p in pool.iter_mut() {
                for (idx, &cav_x) in positions.iter().enumerate() {
                    if p.x >= cav_x && p.x < cav_x + GAP_ZONE && p.gap_index < idx as i32 {
                        let local_phase =
                            frame * omega - idx as f32 * std::f32::consts::FRAC_PI_2;
                        let sin = local_phase.sin();

                        let depth = beta * stage_voltage[idx] / (2.0 * vo_real);
                        let impact = (depth * SENSITIVITY).tanh() as f32;
                        let mut delta = impact * sin * MAX_KICK;
                        // Space-charge debunching between reinforcing kicks.
                        if idx > 0 && sin.abs() < 0.1 {
                            delta *= DEBUNCH;
                        }
                        p.vx = (p.vx + p.base_vx * delta)
                            .clamp(p.base_vx * 0.2, p.base_vx * 3.0);
                        p.gap_index = idx as i32;

                        let ratio = p.vx / p.base_vx;
                        p.state = if ratio > 1.05 {
                            ParticleState::Fast
                        } else if ratio < 0.95 {
                            ParticleState::Slow
                        } else {
                            ParticleState::Neutral
                        };
                    }
                }

                if p.x > catcher_x + 10.0 && p.x < catcher_x + 30.0 {
                    p.vx *= CATCHER_DAMPING;
                }
                p.x += p.vx * dt;
                if p.x > total_length + 50.0 {
                    *p = launch(rng, cy, base_speed);
                }
            }
        }

        draw::metal(canvas, 0.0, cy - 60.0, total_length, 20.0, Metal::Steel);
        draw::metal(canvas, 0.0, cy + 40.0, total_length, 20.0, Metal::Steel);

        let mut stage_label = String::new();
        for (idx, &cav_x) in positions.iter().enumerate() {
            let label = if idx == 0 {
                "IN"
            } else if idx == stages - 1 {
                "OUT"
            } else {
                stage_label.clear();
                stage_label.push_str(&idx.to_string());
                stage_label.as_str()
            };
            let color = if idx == 0 {
                palette::BEAM
            } else if idx == stages - 1 {
                palette::ROSE
            } else {
                palette::LABEL
            };
            let glow_intensity = (stage_voltage[idx] / (vo_real * 0.1)).tanh() as f32;
            let glow = if glow_intensity > 0.1 {
                15.0 * glow_intensity
            } else {
                0.0
            };
            draw::cavity(canvas, cav_x, cy, 40.0, 70.0, label, glow, color);
        }

        canvas.fill_rect(collector_x, cy - 50.0, 50.0, 100.0, palette::SLATE_800);
        font::draw_text(canvas, "COLLECTOR", collector_x, cy - 7.0, Color::WHITE);

        let total_gain = (stages - 1) as f64 * gain_db;
        font::draw_text(
            canvas,
            &format!("Gain: {total_gain:.1} dB"),
            20.0,
            23.0,
            Color::WHITE,
        );
        font::draw_text(
            canvas,
            "(Visuals Enhanced for Visibility)",
            20.0,
            38.0,
            palette::LABEL,
        );

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

    #[test]
    fn layout_uses_full_scale_when_it_fits() {
        let positions = stage_layout(2000.0, 4);
        assert_eq!(positions[0], 2000.0 * START_FRACTION);
        assert_eq!(positions[1] - positions[0], STAGE_SPACING_CM * PX_PER_CM);
    }

    #[test]
    fn layout_shrinks_to_fit_narrow_canvases() {
        let positions = stage_layout(800.0, 6);
        let pitch = positions[1] - positions[0];
        assert!(pitch < STAGE_SPACING_CM * PX_PER_CM);
        assert!(pitch >= STAGE_SPACING_CM * MIN_PX_PER_CM);
        let last = positions[positions.len() - 1];
        // The shrunken train still leaves room for collector and margin.
        assert!(last <= 800.0 - 100.0 + 1.0);
    }

    #[test]
    fn layout_never_collapses_below_minimum_pitch() {
        let positions = stage_layout(300.0, 12);
        let pitch = positions[1] - positions[0];
        assert_eq!(pitch, STAGE_SPACING_CM * MIN_PX_PER_CM);
    }
}
