//! # MWPE - Microwave Device Particle Engine
//!
//! Animated particle visualizations of how microwave tubes and
//! solid-state microwave devices work: electron bunching in klystrons,
//! slow-wave interaction in TWTs and BWOs, spoke formation in
//! magnetrons, and domain or avalanche transport in Gunn, tunnel,
//! IMPATT and TRAPATT diodes.
//!
//! The physics and rasterization run on the CPU; each tick renders one
//! RGBA frame into a [`Canvas`]. The frame can be shown live in a
//! window, saved as a PNG, or inspected directly in tests.
//!
//! ## Quick Start
//!
//! ```ignore
//! use mwpe::{DeviceId, Simulation};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Headless: render 120 frames and export the last one.
//!     let mut sim = Simulation::new(DeviceId::TwoCavityKlystron)
//!         .with_input("Vi", 1200.0)
//!         .with_seed(7);
//!     for _ in 0..120 {
//!         sim.tick(1280, 720);
//!     }
//!     sim.canvas().save_png("klystron.png")?;
//!
//!     // Interactive: open the viewer instead.
//!     mwpe::window::run(Simulation::new(DeviceId::Magnetron))?;
//!     Ok(())
//! }
//! ```
//!
//! ## Device Catalog
//!
//! | Family | Devices |
//! |--------|---------|
//! | Linear-beam (O-type) | Two-cavity klystron, multi-cavity klystron, reflex klystron, TWT, backward-wave oscillator |
//! | Crossed-field (M-type) | Magnetron, carcinotron |
//! | Solid-state | Gunn, tunnel, IMPATT, TRAPATT diodes |
//!
//! Every device is described by a [`descriptor::DeviceSpec`]: its
//! adjustable inputs with units and ranges, plus derived readouts
//! ([`readouts`]) such as bunching parameter, transit time or Hull
//! cutoff. [`Simulation`] owns the particle pool, clamps inputs to
//! their declared ranges, and drives one [`models::DeviceModel`] per
//! tick.
//!
//! ## Module Map
//!
//! - [`descriptor`] - device catalog, input parameters, fidelity tiers
//! - [`physics`] - closed-form microwave relations (bunching, Hull cutoff, ...)
//! - [`particle`] / [`carriers`] - discrete particles and the ambient carrier field
//! - [`models`] - per-device animation passes
//! - [`canvas`] / [`draw`] / [`visuals`] - software rasterizer, drawing helpers, palette
//! - [`readouts`] - derived quantities for display
//! - [`simulation`] - the engine driver
//! - [`window`] - wgpu/winit viewer blitting the canvas to screen
//! - [`time`] - wall-clock FPS measurement for the viewer

pub mod canvas;
pub mod carriers;
pub mod descriptor;
pub mod draw;
pub mod error;
mod font;
pub mod models;
pub mod particle;
pub mod physics;
pub mod readouts;
pub mod simulation;
pub mod time;
pub mod visuals;
pub mod window;

pub use canvas::Canvas;
pub use descriptor::{DeviceId, Fidelity};
pub use error::{ExportError, ViewerError};
pub use glam::Vec2;
pub use particle::{Particle, ParticlePool, ParticleState};
pub use simulation::Simulation;
pub use visuals::Color;
