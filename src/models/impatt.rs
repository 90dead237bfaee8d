//! IMPATT diode: avalanche generation at the p-n junction once per RF
//! cycle, then transit of the generated pairs across the drift region.
//!
//! The 90 degree avalanche lag plus the 90 degree transit lag is the whole
//! point of the device, so generation is gated to the crest of an internal
//! RF cycle rather than spread uniformly in time.

use rand::rngs::SmallRng;
use rand::Rng;

use super::{DeviceModel, StepCtx};
use crate::descriptor::DeviceId;
use crate::draw;
use crate::font;
use crate::particle::{Particle, ParticleState};
use crate::visuals::{palette, Color};

// Screen mapping.
const TOTAL_WIDTH: f32 = 320.0;
const W_P_PLUS: f32 = 40.0;
const W_P: f32 = 60.0;
const W_N: f32 = 160.0;
const W_N_PLUS: f32 = 60.0;
const RF_RATE: f32 = 0.05;
const PAIRS_PER_BURST: usize = 3;
const HOLE_SPEED: f32 = -2.5;
const ELECTRON_SPEED: f32 = 3.5;
const MAX_PARTICLES: usize = 512;
const BREAKDOWN_VOLTS: f64 = 80.0;

pub struct ImpattDiode;

/// Crest of the internal RF cycle, when impact ionization fires.
fn generation_peak(frame: f32) -> bool {
    (frame * RF_RATE).sin() > 0.8
}

impl DeviceModel for ImpattDiode {
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
        let junction_x = start_x + W_P_PLUS + W_P;

        let breakdown = inputs.get("Vd") > BREAKDOWN_VOLTS;
        let peak = generation_peak(frame);

        carriers.ensure(DeviceId::ImpattDiode, TOTAL_WIDTH, rng);
        if running {
            carriers.step(&inputs, dt, TOTAL_WIDTH, frame, rng);

            if breakdown && peak {
                for _ in 0..PAIRS_PER_BURST {
                    pool.inject(1, MAX_PARTICLES, |_| {
                        let mut p = Particle::at(
                            junction_x - rng.gen::<f32>() * 10.0,
                            cy + (rng.gen::<f32>() - 0.5) * 40.0,
                            HOLE_SPEED,
                        );
                        p.state = ParticleState::Hole;
                        p
                    });
                    pool.inject(1, MAX_PARTICLES, |_| {
                        let mut p = Particle::at(
                            junction_x + rng.gen::<f32>() * 10.0,
                            cy + (rng.gen::<f32>() - 0.5) * 40.0,
                            ELECTRON_SPEED,
                        );
                        p.state = ParticleState::Electron;
                        p
                    });
                }
            }

            for p in pool.iter_mut() {
                p.x += p.vx * dt;
            }
            let right_edge = start_x + TOTAL_WIDTH;
            pool.retain(|p| match p.state {
                ParticleState::Hole => p.x >= start_x,
                _ => p.x <= right_edge,
            });
        }

        draw::layer(canvas, start_x, cy - 60.0, W_P_PLUS, 120.0, Color::rgb(127, 29, 29), "p+", "Contact");
        draw::layer(
            canvas,
            start_x + W_P_PLUS,
            cy - 60.0,
            W_P,
            120.0,
            Color::rgb(185, 28, 28),
            "p",
            "Avalanche",
        );
        draw::layer(
            canvas,
            start_x + W_P_PLUS + W_P,
            cy - 60.0,
            W_N,
            120.0,
            palette::AMBER_DARK,
            "n",
            "Drift Region",
        );
        draw::layer(
            canvas,
            start_x + W_P_PLUS + W_P + W_N,
            cy - 60.0,
            W_N_PLUS,
            120.0,
            Color::rgb(30, 58, 138),
            "n+",
            "Contact",
        );
        canvas.fill_rect(start_x + W_P_PLUS, cy - 60.0, W_P, 120.0, Color::rgba(255, 255, 0, 26));
        font::draw_text_centered(
            canvas,
            "High E-Field",
            start_x + W_P_PLUS + W_P / 2.0,
            cy - 82.0,
            palette::AMBER,
        );

        carriers.draw(canvas, start_x, cy - 55.0, 110.0);

        for p in pool.iter() {
            let color = if p.state == ParticleState::Electron {
                palette::BEAM
            } else {
                palette::FAST
            };
            draw::electron(canvas, p.x, p.y, 3.0, color, 15.0);
        }

        let indicator = if peak { palette::GOOD } else { palette::SLATE_700 };
        canvas.fill_circle(cx, cy + 80.0, 5.0, indicator);
        let (text, color) = if peak {
            ("GENERATION", palette::GOOD)
        } else {
            ("WAITING", palette::LABEL)
        };
        font::draw_text_centered(canvas, text, cx, cy + 88.0, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_fires_once_per_cycle() {
        let period = std::f32::consts::TAU / RF_RATE;
        let mut bursts = 0;
        let mut firing = false;
        let mut frame = 0.0;
        while frame < period * 3.0 {
            let peak = generation_peak(frame);
            if peak && !firing {
                bursts += 1;
            }
            firing = peak;
            frame += 1.0;
        }
        assert_eq!(bursts, 3);
    }

    #[test]
    fn crest_window_is_narrow() {
        let period = std::f32::consts::TAU / RF_RATE;
        let mut on = 0;
        let mut frame = 0.0;
        while frame < period {
            if generation_peak(frame) {
                on += 1;
            }
            frame += 1.0;
        }
        // asin(0.8) leaves roughly a fifth of the cycle above threshold.
        assert!(on > 0 && (on as f32) < period / 4.0);
    }
}
