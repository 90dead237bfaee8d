//! Bulk drift-diffusion carrier layer for the solid-state devices.
//!
//! Separate from the particle pool: the pool animates device events
//! (traveling domains, avalanche pairs, trapped plasma) while this layer
//! shows the semiconductor background population drifting in a piecewise
//! field with thermal jitter. Positions live on a 1-D track spanning the
//! device's active region; `lane` is a fixed transverse fraction used only
//! when drawing.

use rand::rngs::SmallRng;
use rand::Rng;

use crate::canvas::Canvas;
use crate::descriptor::{DeviceId, Inputs};
use crate::visuals::{palette, Color};

/// Electron mobility for the drift layer, cm^2/Vs.
const ELECTRON_MOBILITY: f64 = 1000.0;
/// Hole mobility, cm^2/Vs.
const HOLE_MOBILITY: f64 = 400.0;
/// Thermal jitter amplitude, screen units.
const DIFFUSION_SCALE: f32 = 15.0;
/// Seeded population per species.
const POPULATION: usize = 80;
/// Drift speed clamp in track units per second.
const DRIFT_CLAMP: f64 = 200.0;
/// Avalanche stops feeding above this electron count.
const AVALANCHE_FEED_LIMIT: usize = 200;
/// Hard trim threshold for the avalanche population.
const AVALANCHE_TRIM_LIMIT: usize = 250;

/// One bulk carrier.
#[derive(Debug, Clone, Copy)]
pub struct Carrier {
    /// Position along the track, px.
    pub x: f32,
    /// Transverse fraction in `[0, 1)`, fixed at seed time.
    pub lane: f32,
}

/// Piecewise field across the track: two junction positions and the field
/// in each of the three regions, V/cm.
struct FieldProfile {
    junctions: [f32; 2],
    field: [f64; 3],
    domain: Option<TravelingDomain>,
}

/// High-field domain sweeping the track (Gunn above threshold).
struct TravelingDomain {
    center: f32,
    half_width: f32,
    field: f64,
}

impl FieldProfile {
    fn at(&self, x: f32) -> f64 {
        if let Some(d) = &self.domain {
            if (x - d.center).abs() < d.half_width {
                return d.field;
            }
            return self.field[0];
        }
        if x < self.junctions[0] {
            self.field[0]
        } else if x < self.junctions[1] {
            self.field[1]
        } else {
            self.field[2]
        }
    }

    /// Holes never see the traveling domain, only the static regions.
    fn at_static(&self, x: f32) -> f64 {
        if x < self.junctions[0] {
            self.field[0]
        } else if x < self.junctions[1] {
            self.field[1]
        } else {
            self.field[2]
        }
    }
}

fn profile(device: DeviceId, inputs: &Inputs<'_>, track: f32, frame: f32) -> FieldProfile {
    match device {
        DeviceId::GunnDiode => {
            let field = inputs.get("V") / (inputs.get("L") * 1e-4);
            let domain = if field > inputs.get("Vth") * 1000.0 {
                // The domain sweeps the track about once a second.
                Some(TravelingDomain {
                    center: (frame / 60.0).fract() * track,
                    half_width: track * 0.1,
                    field: field * 3.0,
                })
            } else {
                None
            };
            FieldProfile {
                junctions: [0.0, track],
                field: [field; 3],
                domain,
            }
        }
        DeviceId::ImpattDiode => FieldProfile {
            junctions: [track * 0.2, track * 0.4],
            field: [1000.0, 200_000.0, 5000.0],
            domain: None,
        },
        DeviceId::TrapattDiode => FieldProfile {
            junctions: [track * 0.1, track * 0.9],
            field: [500.0, 1000.0, 500.0],
            domain: None,
        },
        DeviceId::TunnelDiode => FieldProfile {
            junctions: [track * 0.48, track * 0.52],
            field: [100.0, 100_000.0, 100.0],
            domain: None,
        },
        _ => FieldProfile {
            junctions: [track * 0.5, track * 0.5],
            field: [0.0; 3],
            domain: None,
        },
    }
}

/// Background carrier population for the active device.
#[derive(Debug, Default)]
pub struct CarrierField {
    device: Option<DeviceId>,
    pub electrons: Vec<Carrier>,
    pub holes: Vec<Carrier>,
}

impl CarrierField {
    pub fn new() -> Self {
        CarrierField::default()
    }

    /// Whether a device carries a bulk population at all.
    pub fn supports(device: DeviceId) -> bool {
        matches!(
            device,
            DeviceId::GunnDiode
                | DeviceId::TunnelDiode
                | DeviceId::ImpattDiode
                | DeviceId::TrapattDiode
        )
    }

    /// Seed the population for `device` if it is not already active.
    pub fn ensure(&mut self, device: DeviceId, track: f32, rng: &mut SmallRng) {
        if self.device == Some(device) {
            return;
        }
        self.electrons.clear();
        self.holes.clear();
        self.device = Some(device);
        let mut spawn = |range_start: f32, range_len: f32| Carrier {
            x: range_start + rng.gen::<f32>() * range_len,
            lane: rng.gen::<f32>(),
        };
        match device {
            DeviceId::GunnDiode => {
                for _ in 0..POPULATION {
                    let c = spawn(0.0, track);
                    self.electrons.push(c);
                }
            }
            DeviceId::ImpattDiode | DeviceId::TrapattDiode => {
                for _ in 0..POPULATION / 2 {
                    let e = spawn(0.0, track);
                    self.electrons.push(e);
                    let h = spawn(0.0, track);
                    self.holes.push(h);
                }
            }
            DeviceId::TunnelDiode => {
                for _ in 0..POPULATION {
                    let e = spawn(0.0, track / 2.0);
                    self.electrons.push(e);
                    let h = spawn(track / 2.0, track / 2.0);
                    self.holes.push(h);
                }
            }
            _ => {}
        }
    }

    /// Advance the population by `dt` frames over a `track` pixels wide
    /// active region.
    pub fn step(
        &mut self,
        inputs: &Inputs<'_>,
        dt: f32,
        track: f32,
        frame: f32,
        rng: &mut SmallRng,
    ) {
        let Some(device) = self.device else {
            return;
        };
        let profile = profile(device, inputs, track, frame);
        // A frame is nominally 1/60 s of drift.
        let secs = dt / 60.0;
        let tunnel_bias = device == DeviceId::TunnelDiode && inputs.get("Vbias") > 0.0;

        for e in &mut self.electrons {
            let field = profile.at(e.x);
            let mut mobility = ELECTRON_MOBILITY;
            if device == DeviceId::GunnDiode && field.abs() > 3500.0 {
                // Upper-valley transfer: mobility collapses.
                mobility /= 5.0;
            }
            let v = (-mobility * field * 1e-4).clamp(-DRIFT_CLAMP, DRIFT_CLAMP);
            let jitter = (rng.gen::<f32>() - 0.5) * DIFFUSION_SCALE * secs * 100.0;
            e.x += v as f32 * secs + jitter;
            if e.x > track {
                e.x = 0.0;
            } else if e.x < 0.0 {
                e.x = track;
            }
            if tunnel_bias && (e.x - track / 2.0).abs() < 5.0 && rng.gen::<f32>() < 0.1 {
                // Quantum hop through the junction.
                e.x = track / 2.0 + 10.0;
            }
        }

        for h in &mut self.holes {
            let field = profile.at_static(h.x);
            let v = (HOLE_MOBILITY * field * 1e-4).clamp(-DRIFT_CLAMP, DRIFT_CLAMP);
            let jitter = (rng.gen::<f32>() - 0.5) * DIFFUSION_SCALE * secs * 100.0;
            h.x += v as f32 * secs + jitter;
            if h.x > track {
                h.x = 0.0;
            } else if h.x < 0.0 {
                h.x = track;
            }
        }

        if matches!(device, DeviceId::ImpattDiode | DeviceId::TrapattDiode) {
            self.avalanche(device, inputs, &profile, rng);
        }
    }

    /// Impact ionization inside the high-field region: each electron there
    /// has a small chance per frame of creating an electron-hole pair.
    fn avalanche(
        &mut self,
        device: DeviceId,
        inputs: &Inputs<'_>,
        profile: &FieldProfile,
        rng: &mut SmallRng,
    ) {
        let voltage = match device {
            DeviceId::ImpattDiode => inputs.get("Vd"),
            _ => inputs.get("V"),
        };
        if voltage <= 50.0 {
            return;
        }
        let mut new_electrons = Vec::new();
        let mut new_holes = Vec::new();
        for e in &self.electrons {
            if e.x > profile.junctions[0] && e.x < profile.junctions[1] && rng.gen::<f32>() < 0.02 {
                let offset = (rng.gen::<f32>() - 0.5) * 10.0;
                new_electrons.push(Carrier {
                    x: e.x + offset,
                    lane: rng.gen::<f32>(),
                });
                new_holes.push(Carrier {
                    x: e.x + offset,
                    lane: rng.gen::<f32>(),
                });
            }
        }
        if self.electrons.len() < AVALANCHE_FEED_LIMIT {
            self.electrons.extend(new_electrons);
            self.holes.extend(new_holes);
        }
        if self.electrons.len() > AVALANCHE_TRIM_LIMIT {
            self.electrons.drain(0..10);
            if self.holes.len() >= 10 {
                self.holes.drain(0..10);
            }
        }
    }

    /// Draw the population into a region of the canvas. The track maps onto
    /// `region_w`; lanes spread across `region_h`.
    pub fn draw(&self, canvas: &mut Canvas, region_x: f32, region_y: f32, region_h: f32) {
        let electron = palette::BEAM.with_alpha(200);
        let hole: Color = Color::rgba(239, 68, 68, 200);
        for e in &self.electrons {
            canvas.fill_circle(region_x + e.x, region_y + e.lane * region_h, 1.5, electron);
        }
        for h in &self.holes {
            canvas.fill_circle(region_x + h.x, region_y + h.lane * region_h, 1.5, hole);
        }
    }

    pub fn clear(&mut self) {
        self.device = None;
        self.electrons.clear();
        self.holes.clear();
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.electrons.is_empty() && self.holes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(7)
    }

    #[test]
    fn seeding_matches_device_layout() {
        let mut field = CarrierField::new();
        let mut rng = rng();

        field.ensure(DeviceId::GunnDiode, 300.0, &mut rng);
        assert_eq!(field.electrons.len(), POPULATION);
        assert!(field.holes.is_empty());

        field.clear();
        field.ensure(DeviceId::ImpattDiode, 320.0, &mut rng);
        assert_eq!(field.electrons.len(), POPULATION / 2);
        assert_eq!(field.holes.len(), POPULATION / 2);

        field.clear();
        field.ensure(DeviceId::TunnelDiode, 200.0, &mut rng);
        assert_eq!(field.electrons.len(), POPULATION);
        assert!(field.electrons.iter().all(|c| c.x <= 100.0));
        assert!(field.holes.iter().all(|c| c.x >= 100.0));
    }

    #[test]
    fn ensure_is_idempotent_per_device() {
        let mut field = CarrierField::new();
        let mut rng = rng();
        field.ensure(DeviceId::GunnDiode, 300.0, &mut rng);
        field.electrons.truncate(3);
        field.ensure(DeviceId::GunnDiode, 300.0, &mut rng);
        assert_eq!(field.electrons.len(), 3);
        // A different device reseeds.
        field.ensure(DeviceId::TunnelDiode, 300.0, &mut rng);
        assert_eq!(field.electrons.len(), POPULATION);
    }

    #[test]
    fn beam_devices_have_no_population() {
        let mut field = CarrierField::new();
        let mut rng = rng();
        field.ensure(DeviceId::TwoCavityKlystron, 500.0, &mut rng);
        assert!(field.is_empty());
        assert!(!CarrierField::supports(DeviceId::TwoCavityKlystron));
    }

    #[test]
    fn positions_stay_on_track() {
        let mut field = CarrierField::new();
        let mut rng = rng();
        let track = 320.0;
        field.ensure(DeviceId::ImpattDiode, track, &mut rng);
        let values: HashMap<String, f64> = DeviceId::ImpattDiode.spec().defaults();
        let inputs = Inputs::new(DeviceId::ImpattDiode.spec(), &values);
        for frame in 0..240 {
            field.step(&inputs, 1.0, track, frame as f32, &mut rng);
        }
        for c in field.electrons.iter().chain(field.holes.iter()) {
            assert!(c.x.is_finite());
            assert!((-1.0..=track + 1.0).contains(&c.x), "x = {}", c.x);
        }
    }

    #[test]
    fn avalanche_population_is_bounded() {
        let mut field = CarrierField::new();
        let mut rng = rng();
        let track = 320.0;
        field.ensure(DeviceId::TrapattDiode, track, &mut rng);
        let values: HashMap<String, f64> = DeviceId::TrapattDiode.spec().defaults();
        let inputs = Inputs::new(DeviceId::TrapattDiode.spec(), &values);
        for frame in 0..1200 {
            field.step(&inputs, 1.0, track, frame as f32, &mut rng);
            assert!(field.electrons.len() <= AVALANCHE_TRIM_LIMIT + POPULATION);
        }
        // Pair production happened at some point.
        assert!(field.electrons.len() > POPULATION / 2);
    }
}
