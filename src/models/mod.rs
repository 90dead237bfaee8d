//! Per-device animation behaviors.
//!
//! Each model owns the whole frame pass for its device: it derives the
//! screen layout from the current inputs, injects and advances particles
//! while the engine is running, and draws the structure and the beam into
//! the frame's canvas. A paused engine still gets the full drawing pass,
//! so the anatomy stays visible with the motion frozen.
//!
//! Models are stateless unit structs. Everything mutable arrives through
//! [`StepCtx`], which makes a model drivable headless in tests: hand it a
//! canvas, a pool and a seeded generator, step it, then inspect the pool.
//!
//! # Example
//!
//! ```ignore
//! let model = model_for(DeviceId::TwoCavityKlystron);
//! model.step(&mut ctx);
//! assert!(!ctx.pool.is_empty());
//! ```

use rand::rngs::SmallRng;

use crate::canvas::Canvas;
use crate::carriers::CarrierField;
use crate::descriptor::{DeviceId, Inputs};
use crate::particle::ParticlePool;

mod bwo;
mod carcinotron;
mod gunn;
mod impatt;
mod magnetron;
mod multi_cavity;
mod reflex;
mod trapatt;
mod tunnel;
mod twt;
mod two_cavity;

pub use bwo::BackwardWaveOscillator;
pub use carcinotron::Carcinotron;
pub use gunn::GunnDiode;
pub use impatt::ImpattDiode;
pub use magnetron::Magnetron;
pub use multi_cavity::MultiCavityKlystron;
pub use reflex::ReflexKlystron;
pub use trapatt::TrapattDiode;
pub use tunnel::TunnelDiode;
pub use twt::TravelingWaveTube;
pub use two_cavity::TwoCavityKlystron;

/// Mutable world a model acts on for one tick.
pub struct StepCtx<'a> {
    pub canvas: &'a mut Canvas,
    pub pool: &'a mut ParticlePool,
    pub carriers: &'a mut CarrierField,
    pub inputs: Inputs<'a>,
    /// Animation clock, in frames.
    pub frame: f32,
    /// Frames advanced by this tick (the time scale).
    pub dt: f32,
    /// Particle-density multiplier from the fidelity setting.
    pub density: f32,
    pub running: bool,
    pub rng: &'a mut SmallRng,
}

/// One device's animation behavior.
///
/// `step` runs physics and drawing for a single tick. Implementations
/// never retain state between calls; anything that must persist lives in
/// the pool or the carrier field.
pub trait DeviceModel: Sync {
    fn step(&self, ctx: &mut StepCtx<'_>);
}

/// Behavior lookup for a catalog identifier.
pub fn model_for(id: DeviceId) -> &'static dyn DeviceModel {
    match id {
        DeviceId::TwoCavityKlystron => &TwoCavityKlystron,
        DeviceId::MultiCavityKlystron => &MultiCavityKlystron,
        DeviceId::ReflexKlystron => &ReflexKlystron,
        DeviceId::TravelingWaveTube => &TravelingWaveTube,
        DeviceId::BackwardWaveOscillator => &BackwardWaveOscillator,
        DeviceId::Magnetron => &Magnetron,
        DeviceId::Carcinotron => &Carcinotron,
        DeviceId::GunnDiode => &GunnDiode,
        DeviceId::TunnelDiode => &TunnelDiode,
        DeviceId::ImpattDiode => &ImpattDiode,
        DeviceId::TrapattDiode => &TrapattDiode,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_device_has_a_model() {
        for id in DeviceId::ALL {
            // A panic here would mean a catalog entry without a behavior.
            let _ = model_for(id);
        }
    }
}
