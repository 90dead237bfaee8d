//! Simulation driver: owns the particle pool, the carrier layer, the
//! frame canvas and the animation clock, and advances one device model
//! per tick.
//!
//! The driver is headless. A host (the viewer window, a demo loop, a
//! test) calls [`Simulation::tick`] at whatever cadence it likes; pausing
//! just stops the clock while every tick keeps re-rendering the current
//! state.
//!
//! # Example
//!
//! ```ignore
//! let mut sim = Simulation::new(DeviceId::ReflexKlystron)
//!     .with_fidelity(Fidelity::High)
//!     .with_time_scale(2.0);
//! sim.tick(1280, 720);
//! sim.canvas().save_png("reflex.png")?;
//! ```

use std::collections::HashMap;

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::canvas::Canvas;
use crate::carriers::CarrierField;
use crate::descriptor::{DeviceId, Fidelity, Inputs};
use crate::models::{model_for, StepCtx};
use crate::particle::{ParticlePool, GLOBAL_MAX};
use crate::readouts::{self, Readout};
use crate::visuals::palette;

const DEFAULT_WIDTH: u32 = 1280;
const DEFAULT_HEIGHT: u32 = 720;
const MIN_TIME_SCALE: f32 = 0.05;
const MAX_TIME_SCALE: f32 = 8.0;

/// The engine: one device animated into an owned RGBA frame.
pub struct Simulation {
    device: DeviceId,
    inputs: HashMap<String, f64>,
    fidelity: Fidelity,
    time_scale: f32,
    running: bool,
    frame: f32,
    pool: ParticlePool,
    carriers: CarrierField,
    canvas: Canvas,
    rng: SmallRng,
}

impl Simulation {
    /// Create an engine showing `device` with its descriptor defaults,
    /// running at normal speed.
    pub fn new(device: DeviceId) -> Self {
        Self {
            device,
            inputs: device.spec().defaults(),
            fidelity: Fidelity::default(),
            time_scale: 1.0,
            running: true,
            frame: 0.0,
            pool: ParticlePool::new(),
            carriers: CarrierField::new(),
            canvas: Canvas::new(DEFAULT_WIDTH, DEFAULT_HEIGHT),
            rng: SmallRng::from_entropy(),
        }
    }

    /// Set the particle fidelity tier.
    pub fn with_fidelity(mut self, fidelity: Fidelity) -> Self {
        self.fidelity = fidelity;
        self
    }

    /// Set the animation speed multiplier.
    pub fn with_time_scale(mut self, scale: f32) -> Self {
        self.set_time_scale(scale);
        self
    }

    /// Override one input parameter.
    pub fn with_input(mut self, id: &str, value: f64) -> Self {
        self.set_input(id, value);
        self
    }

    /// Start paused.
    pub fn with_paused(mut self) -> Self {
        self.running = false;
        self
    }

    /// Seed the generator, making injection jitter reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }

    /// Advance and render one frame at the given size.
    ///
    /// Always redraws, so a paused engine still shows the device with its
    /// particles frozen in place. The physics only runs while `running`.
    pub fn tick(&mut self, width: u32, height: u32) {
        self.canvas.resize(width, height);
        self.canvas.clear(palette::BACKGROUND);

        if self.running {
            self.frame += self.time_scale;
            self.pool.cap_at(GLOBAL_MAX);
        }

        let mut ctx = StepCtx {
            canvas: &mut self.canvas,
            pool: &mut self.pool,
            carriers: &mut self.carriers,
            inputs: Inputs::new(self.device.spec(), &self.inputs),
            frame: self.frame,
            dt: self.time_scale,
            density: self.fidelity.particle_density(),
            running: self.running,
            rng: &mut self.rng,
        };
        model_for(self.device).step(&mut ctx);
    }

    /// Switch device. One atomic reset: particles, carriers and the
    /// clock all go, inputs return to the new device's defaults and the
    /// engine resumes running.
    pub fn set_device(&mut self, device: DeviceId) {
        log::debug!("switching to {}", device.as_str());
        self.device = device;
        self.inputs = device.spec().defaults();
        self.pool.clear();
        self.carriers.clear();
        self.frame = 0.0;
        self.running = true;
    }

    /// Set one input parameter, clamped to its descriptor range when the
    /// device declares it. Takes effect on the next tick.
    pub fn set_input(&mut self, id: &str, value: f64) {
        let value = match self.device.spec().param(id) {
            Some(param) => param.clamp(value),
            None => value,
        };
        self.inputs.insert(id.to_string(), value);
    }

    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    pub fn toggle_running(&mut self) {
        self.running = !self.running;
    }

    pub fn set_fidelity(&mut self, fidelity: Fidelity) {
        self.fidelity = fidelity;
    }

    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.clamp(MIN_TIME_SCALE, MAX_TIME_SCALE);
    }

    /// Numeric read-outs for the current device and inputs.
    pub fn readouts(&self) -> Vec<Readout> {
        readouts::for_device(&Inputs::new(self.device.spec(), &self.inputs))
    }

    /// Resolved value of one input (descriptor default when unset).
    pub fn input(&self, id: &str) -> f64 {
        Inputs::new(self.device.spec(), &self.inputs).get(id)
    }

    #[inline]
    pub fn device(&self) -> DeviceId {
        self.device
    }

    #[inline]
    pub fn fidelity(&self) -> Fidelity {
        self.fidelity
    }

    #[inline]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[inline]
    pub fn frame_count(&self) -> f32 {
        self.frame
    }

    #[inline]
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    #[inline]
    pub fn particles(&self) -> &ParticlePool {
        &self.pool
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(DeviceId::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_populates_the_pool() {
        let mut sim = Simulation::new(DeviceId::TwoCavityKlystron).with_seed(1);
        for _ in 0..10 {
            sim.tick(800, 450);
        }
        assert!(!sim.particles().is_empty());
        assert_eq!(sim.frame_count(), 10.0);
    }

    #[test]
    fn pausing_freezes_clock_and_particles() {
        let mut sim = Simulation::new(DeviceId::TwoCavityKlystron).with_seed(1);
        for _ in 0..20 {
            sim.tick(800, 450);
        }
        sim.set_running(false);
        let frame = sim.frame_count();
        let snapshot: Vec<_> = sim.particles().iter().copied().collect();
        for _ in 0..5 {
            sim.tick(800, 450);
        }
        assert_eq!(sim.frame_count(), frame);
        let after: Vec<_> = sim.particles().iter().copied().collect();
        assert_eq!(snapshot, after);
    }

    #[test]
    fn device_switch_is_one_atomic_reset() {
        let mut sim = Simulation::new(DeviceId::TwoCavityKlystron).with_seed(1);
        sim.set_input("Vo", 50.0);
        sim.set_running(false);
        for _ in 0..20 {
            sim.tick(800, 450);
        }
        sim.set_device(DeviceId::Magnetron);
        assert!(sim.particles().is_empty());
        assert_eq!(sim.frame_count(), 0.0);
        assert!(sim.is_running());
        // Inputs returned to the new device's defaults.
        assert_eq!(sim.input("Vo"), 26.0);
    }

    #[test]
    fn set_input_clamps_to_descriptor_range() {
        let mut sim = Simulation::new(DeviceId::TwoCavityKlystron);
        sim.set_input("Vo", 1e9);
        assert_eq!(sim.input("Vo"), 200.0);
        sim.set_input("Vo", -5.0);
        assert_eq!(sim.input("Vo"), 0.5);
    }

    #[test]
    fn time_scale_never_reaches_zero() {
        let mut sim = Simulation::new(DeviceId::TwoCavityKlystron);
        sim.set_time_scale(0.0);
        assert!(sim.time_scale() > 0.0);
        sim.set_time_scale(100.0);
        assert!(sim.time_scale() <= MAX_TIME_SCALE);
    }

    #[test]
    fn every_device_renders_without_particles_when_paused() {
        for id in DeviceId::ALL {
            let mut sim = Simulation::new(id).with_seed(7).with_paused();
            sim.tick(640, 360);
            assert!(sim.particles().is_empty(), "{id:?} injected while paused");
        }
    }
}
