//! Static device catalog: identities, families, and tunable parameters.
//!
//! The catalog is data only; nothing here knows how a device animates or
//! which read-outs it derives. Animation lives in [`crate::models`] and the
//! derived quantities in [`crate::readouts`], both keyed by [`DeviceId`].
//!
//! # Example
//!
//! ```ignore
//! use mwpe::descriptor::DeviceId;
//!
//! let spec = DeviceId::TwoCavityKlystron.spec();
//! assert_eq!(spec.param("Vo").unwrap().default, 10.0);
//! ```

use std::collections::HashMap;
use std::fmt;

/// Identifies one visualized device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeviceId {
    #[default]
    TwoCavityKlystron,
    MultiCavityKlystron,
    ReflexKlystron,
    TravelingWaveTube,
    BackwardWaveOscillator,
    Magnetron,
    Carcinotron,
    GunnDiode,
    TunnelDiode,
    ImpattDiode,
    TrapattDiode,
}

impl DeviceId {
    /// Every device, in sidebar order.
    pub const ALL: [DeviceId; 11] = [
        DeviceId::TwoCavityKlystron,
        DeviceId::MultiCavityKlystron,
        DeviceId::ReflexKlystron,
        DeviceId::TravelingWaveTube,
        DeviceId::BackwardWaveOscillator,
        DeviceId::Magnetron,
        DeviceId::Carcinotron,
        DeviceId::GunnDiode,
        DeviceId::TunnelDiode,
        DeviceId::ImpattDiode,
        DeviceId::TrapattDiode,
    ];

    /// Parse a catalog identifier, e.g. `"klystron2"` or `"magnetron"`.
    pub fn parse(s: &str) -> Option<DeviceId> {
        DeviceId::ALL.iter().copied().find(|id| id.as_str() == s)
    }

    /// Stable catalog identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            DeviceId::TwoCavityKlystron => "klystron2",
            DeviceId::MultiCavityKlystron => "klystronMulti",
            DeviceId::ReflexKlystron => "reflex",
            DeviceId::TravelingWaveTube => "twt",
            DeviceId::BackwardWaveOscillator => "obwo",
            DeviceId::Magnetron => "magnetron",
            DeviceId::Carcinotron => "carcinotron",
            DeviceId::GunnDiode => "gunn",
            DeviceId::TunnelDiode => "tunnel",
            DeviceId::ImpattDiode => "impatt",
            DeviceId::TrapattDiode => "trapatt",
        }
    }

    /// Full descriptor for this device.
    pub fn spec(self) -> &'static DeviceSpec {
        match self {
            DeviceId::TwoCavityKlystron => &TWO_CAVITY,
            DeviceId::MultiCavityKlystron => &MULTI_CAVITY,
            DeviceId::ReflexKlystron => &REFLEX,
            DeviceId::TravelingWaveTube => &TWT,
            DeviceId::BackwardWaveOscillator => &OBWO,
            DeviceId::Magnetron => &MAGNETRON,
            DeviceId::Carcinotron => &CARCINOTRON,
            DeviceId::GunnDiode => &GUNN,
            DeviceId::TunnelDiode => &TUNNEL,
            DeviceId::ImpattDiode => &IMPATT,
            DeviceId::TrapattDiode => &TRAPATT,
        }
    }

    /// Display name, e.g. `"Two-Cavity Klystron"`.
    #[inline]
    pub fn name(self) -> &'static str {
        self.spec().name
    }

    /// Next device in sidebar order, wrapping.
    pub fn next(self) -> DeviceId {
        let i = DeviceId::ALL.iter().position(|d| *d == self).unwrap_or(0);
        DeviceId::ALL[(i + 1) % DeviceId::ALL.len()]
    }

    /// Previous device in sidebar order, wrapping.
    pub fn prev(self) -> DeviceId {
        let i = DeviceId::ALL.iter().position(|d| *d == self).unwrap_or(0);
        DeviceId::ALL[(i + DeviceId::ALL.len() - 1) % DeviceId::ALL.len()]
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Broad operating principle, used for HUD grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceFamily {
    OType,
    CrossedField,
    SolidState,
    QuantumEffect,
    AvalancheTransit,
}

impl DeviceFamily {
    pub fn label(self) -> &'static str {
        match self {
            DeviceFamily::OType => "O-TYPE",
            DeviceFamily::CrossedField => "CROSSED-FIELD (M-TYPE)",
            DeviceFamily::SolidState => "SOLID-STATE",
            DeviceFamily::QuantumEffect => "QUANTUM EFFECT",
            DeviceFamily::AvalancheTransit => "AVALANCHE TRANSIT",
        }
    }
}

/// One tunable parameter of a device.
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub id: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub step: f64,
}

impl ParamSpec {
    /// Clamp a candidate value into this parameter's range.
    #[inline]
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// Everything the UI and the engine need to know about a device, minus its
/// behavior.
#[derive(Debug)]
pub struct DeviceSpec {
    pub id: DeviceId,
    pub name: &'static str,
    pub family: DeviceFamily,
    pub blurb: &'static str,
    pub params: &'static [ParamSpec],
}

impl DeviceSpec {
    pub fn param(&self, id: &str) -> Option<&'static ParamSpec> {
        self.params.iter().find(|p| p.id == id)
    }

    /// Fresh value map holding every parameter's default.
    pub fn defaults(&self) -> HashMap<String, f64> {
        self.params
            .iter()
            .map(|p| (p.id.to_owned(), p.default))
            .collect()
    }
}

/// Live parameter values for the active device. Anything unset resolves to
/// the descriptor default; an identifier the device does not declare
/// resolves to zero.
#[derive(Clone, Copy)]
pub struct Inputs<'a> {
    spec: &'static DeviceSpec,
    values: &'a HashMap<String, f64>,
}

impl<'a> Inputs<'a> {
    pub fn new(spec: &'static DeviceSpec, values: &'a HashMap<String, f64>) -> Self {
        Inputs { spec, values }
    }

    /// Resolved value for a parameter identifier.
    pub fn get(&self, id: &str) -> f64 {
        if let Some(v) = self.values.get(id) {
            return *v;
        }
        self.spec.param(id).map(|p| p.default).unwrap_or(0.0)
    }

    #[inline]
    pub fn device(&self) -> DeviceId {
        self.spec.id
    }
}

/// Render quality preset; scales particle counts only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Fidelity {
    Low,
    #[default]
    Medium,
    High,
}

impl Fidelity {
    /// Density multiplier applied to per-device particle budgets.
    pub fn particle_density(self) -> f32 {
        match self {
            Fidelity::Low => 2.0,
            Fidelity::Medium => 6.0,
            Fidelity::High => 12.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Fidelity::Low => "low",
            Fidelity::Medium => "medium",
            Fidelity::High => "high",
        }
    }

    /// Cycle low -> medium -> high -> low.
    pub fn next(self) -> Fidelity {
        match self {
            Fidelity::Low => Fidelity::Medium,
            Fidelity::Medium => Fidelity::High,
            Fidelity::High => Fidelity::Low,
        }
    }
}

static TWO_CAVITY: DeviceSpec = DeviceSpec {
    id: DeviceId::TwoCavityKlystron,
    name: "Two-Cavity Klystron",
    family: DeviceFamily::OType,
    blurb: "Fundamental velocity modulation device. Separates beam acceleration from interaction.",
    params: &[
        ParamSpec { id: "Vo", label: "Beam Voltage (V₀)", unit: "kV", min: 0.5, max: 200.0, default: 10.0, step: 0.5 },
        ParamSpec { id: "Io", label: "Beam Current (I₀)", unit: "mA", min: 1.0, max: 5000.0, default: 200.0, step: 10.0 },
        ParamSpec { id: "Vi", label: "RF Input (V₁)", unit: "V", min: 0.0, max: 10000.0, default: 800.0, step: 50.0 },
        ParamSpec { id: "f", label: "Frequency", unit: "GHz", min: 0.1, max: 100.0, default: 3.0, step: 0.1 },
        ParamSpec { id: "L", label: "Drift Length", unit: "cm", min: 0.1, max: 50.0, default: 5.0, step: 0.1 },
        ParamSpec { id: "d", label: "Gap Spacing", unit: "mm", min: 0.1, max: 20.0, default: 3.0, step: 0.1 },
    ],
};

static MULTI_CAVITY: DeviceSpec = DeviceSpec {
    id: DeviceId::MultiCavityKlystron,
    name: "Multi-Cavity Klystron",
    family: DeviceFamily::OType,
    blurb: "Cascaded bunching for high gain amplification. Used in radar and broadcast.",
    params: &[
        ParamSpec { id: "Vo", label: "Beam Voltage", unit: "kV", min: 1.0, max: 800.0, default: 15.0, step: 0.5 },
        ParamSpec { id: "Io", label: "Beam Current", unit: "mA", min: 10.0, max: 5000.0, default: 500.0, step: 50.0 },
        ParamSpec { id: "Vi", label: "Input RF", unit: "V", min: 0.0, max: 5000.0, default: 500.0, step: 50.0 },
        ParamSpec { id: "f", label: "Frequency", unit: "GHz", min: 0.1, max: 50.0, default: 3.0, step: 0.1 },
        ParamSpec { id: "N", label: "Number of Cavities", unit: "", min: 2.0, max: 12.0, default: 4.0, step: 1.0 },
        ParamSpec { id: "d", label: "Gap Spacing", unit: "mm", min: 0.1, max: 20.0, default: 3.0, step: 0.1 },
        ParamSpec { id: "G", label: "Gain/Stage", unit: "dB", min: 1.0, max: 30.0, default: 8.0, step: 0.5 },
    ],
};

static REFLEX: DeviceSpec = DeviceSpec {
    id: DeviceId::ReflexKlystron,
    name: "Reflex Klystron",
    family: DeviceFamily::OType,
    blurb: "Single-cavity oscillator using a repeller electrode to fold the drift space.",
    params: &[
        ParamSpec { id: "Vo", label: "Beam Voltage", unit: "V", min: 200.0, max: 1000.0, default: 600.0, step: 10.0 },
        ParamSpec { id: "Vr", label: "Repeller Voltage", unit: "V", min: 0.0, max: 800.0, default: 350.0, step: 10.0 },
        ParamSpec { id: "L", label: "Repeller Spacing", unit: "mm", min: 1.0, max: 10.0, default: 3.0, step: 0.1 },
        ParamSpec { id: "f", label: "Frequency", unit: "GHz", min: 1.0, max: 40.0, default: 9.0, step: 0.1 },
    ],
};

static TWT: DeviceSpec = DeviceSpec {
    id: DeviceId::TravelingWaveTube,
    name: "Traveling Wave Tube",
    family: DeviceFamily::OType,
    blurb: "Broadband amplifier using slow-wave structures for continuous interaction.",
    params: &[
        ParamSpec { id: "Vo", label: "Beam Voltage", unit: "kV", min: 1.0, max: 10.0, default: 3.0, step: 0.1 },
        ParamSpec { id: "Io", label: "Beam Current", unit: "mA", min: 10.0, max: 500.0, default: 100.0, step: 10.0 },
        ParamSpec { id: "atten", label: "Attenuator (0=OFF, 1=ON)", unit: "", min: 0.0, max: 1.0, default: 1.0, step: 1.0 },
        ParamSpec { id: "Vi", label: "Input Signal", unit: "V", min: 0.0, max: 100.0, default: 20.0, step: 1.0 },
        ParamSpec { id: "N", label: "Helix Length", unit: "λ", min: 10.0, max: 100.0, default: 40.0, step: 1.0 },
        ParamSpec { id: "C", label: "Pierce Parameter", unit: "", min: 0.01, max: 0.5, default: 0.1, step: 0.01 },
    ],
};

static OBWO: DeviceSpec = DeviceSpec {
    id: DeviceId::BackwardWaveOscillator,
    name: "O-Type BWO",
    family: DeviceFamily::OType,
    blurb: "O-Type Backward Wave Oscillator. Kinetic energy conversion with continuous bunching along the tube axis.",
    params: &[
        ParamSpec { id: "Vo", label: "Beam Voltage", unit: "kV", min: 1.0, max: 20.0, default: 5.0, step: 0.1 },
        ParamSpec { id: "Io", label: "Beam Current", unit: "mA", min: 10.0, max: 500.0, default: 100.0, step: 10.0 },
        ParamSpec { id: "f", label: "Frequency", unit: "GHz", min: 1.0, max: 100.0, default: 10.0, step: 0.5 },
        ParamSpec { id: "L", label: "Structure Length", unit: "cm", min: 5.0, max: 30.0, default: 15.0, step: 0.5 },
    ],
};

static MAGNETRON: DeviceSpec = DeviceSpec {
    id: DeviceId::Magnetron,
    name: "Cylindrical Magnetron",
    family: DeviceFamily::CrossedField,
    blurb: "High-power crossed-field oscillator. Ubiquitous in radar and microwave ovens.",
    params: &[
        ParamSpec { id: "Vo", label: "Anode Voltage", unit: "kV", min: 1.0, max: 1000.0, default: 26.0, step: 0.5 },
        ParamSpec { id: "Bo", label: "Magnetic Field", unit: "mT", min: 10.0, max: 600.0, default: 336.0, step: 5.0 },
        ParamSpec { id: "N", label: "Number of Cavities", unit: "", min: 6.0, max: 16.0, default: 8.0, step: 2.0 },
        ParamSpec { id: "ra", label: "Cathode Radius", unit: "mm", min: 5.0, max: 20.0, default: 10.0, step: 0.5 },
        ParamSpec { id: "rb", label: "Anode Radius", unit: "mm", min: 20.0, max: 50.0, default: 30.0, step: 1.0 },
        ParamSpec { id: "tune", label: "Mech. Tuning", unit: "%", min: 0.0, max: 100.0, default: 0.0, step: 5.0 },
    ],
};

static CARCINOTRON: DeviceSpec = DeviceSpec {
    id: DeviceId::Carcinotron,
    name: "Carcinotron (M-BWO)",
    family: DeviceFamily::CrossedField,
    blurb: "M-Type Backward Wave Oscillator. Uses crossed E and B fields. Electrons drift perpendicular to both fields.",
    params: &[
        ParamSpec { id: "Vo", label: "Anode Voltage", unit: "kV", min: 1.0, max: 50.0, default: 20.0, step: 0.5 },
        ParamSpec { id: "Bo", label: "Magnetic Field", unit: "mT", min: 50.0, max: 800.0, default: 350.0, step: 5.0 },
        ParamSpec { id: "d", label: "Sole-Anode Gap", unit: "mm", min: 1.0, max: 15.0, default: 8.0, step: 0.5 },
    ],
};

static GUNN: DeviceSpec = DeviceSpec {
    id: DeviceId::GunnDiode,
    name: "Gunn Diode",
    family: DeviceFamily::SolidState,
    blurb: "Transferred Electron Device (TED). Relies on bulk material properties rather than PN junctions. Uses n-type GaAs or InP.",
    params: &[
        ParamSpec { id: "V", label: "Bias Voltage", unit: "V", min: 0.0, max: 30.0, default: 12.0, step: 0.5 },
        ParamSpec { id: "L", label: "Active Length", unit: "µm", min: 5.0, max: 20.0, default: 10.0, step: 0.5 },
        ParamSpec { id: "A", label: "Active Area", unit: "mm²", min: 0.01, max: 1.0, default: 0.1, step: 0.01 },
        ParamSpec { id: "T", label: "Temperature", unit: "°C", min: 20.0, max: 150.0, default: 50.0, step: 5.0 },
        ParamSpec { id: "Nd", label: "Doping Density", unit: "cm⁻³", min: 1e14, max: 1e17, default: 1e16, step: 1e15 },
        ParamSpec { id: "vd", label: "Domain Velocity", unit: "cm/s", min: 5e6, max: 2e7, default: 1e7, step: 5e5 },
        ParamSpec { id: "Vth", label: "Threshold Field", unit: "kV/cm", min: 2.0, max: 5.0, default: 3.2, step: 0.1 },
    ],
};

static TUNNEL: DeviceSpec = DeviceSpec {
    id: DeviceId::TunnelDiode,
    name: "Tunnel Diode",
    family: DeviceFamily::QuantumEffect,
    blurb: "Heavily doped PN junction using quantum mechanical tunneling. Very high speed.",
    params: &[
        ParamSpec { id: "Vbias", label: "Bias Voltage", unit: "mV", min: 0.0, max: 600.0, default: 150.0, step: 10.0 },
        ParamSpec { id: "Ip", label: "Peak Current", unit: "mA", min: 1.0, max: 100.0, default: 10.0, step: 1.0 },
        ParamSpec { id: "Vp", label: "Peak Voltage", unit: "mV", min: 50.0, max: 150.0, default: 100.0, step: 5.0 },
        ParamSpec { id: "Vv", label: "Valley Voltage", unit: "mV", min: 200.0, max: 600.0, default: 350.0, step: 20.0 },
        ParamSpec { id: "Iv", label: "Valley Current", unit: "mA", min: 0.1, max: 5.0, default: 1.0, step: 0.1 },
        ParamSpec { id: "Cj", label: "Junction Capacitance", unit: "pF", min: 0.5, max: 20.0, default: 5.0, step: 0.5 },
        ParamSpec { id: "Rs", label: "Series Resistance", unit: "Ω", min: 1.0, max: 20.0, default: 5.0, step: 1.0 },
    ],
};

static IMPATT: DeviceSpec = DeviceSpec {
    id: DeviceId::ImpattDiode,
    name: "IMPATT Diode",
    family: DeviceFamily::AvalancheTransit,
    blurb: "IMPact ionisation Avalanche Transit Time. Read Diode structure (n+-p-i-p+).",
    params: &[
        ParamSpec { id: "Vd", label: "Breakdown Voltage", unit: "V", min: 50.0, max: 150.0, default: 90.0, step: 1.0 },
        ParamSpec { id: "I", label: "Current", unit: "mA", min: 10.0, max: 500.0, default: 200.0, step: 10.0 },
        ParamSpec { id: "W", label: "Drift Width", unit: "µm", min: 0.5, max: 5.0, default: 2.0, step: 0.1 },
        ParamSpec { id: "eps", label: "Permittivity", unit: "F/m", min: 8e-12, max: 13e-12, default: 12e-12, step: 1e-12 },
        ParamSpec { id: "vs", label: "Saturation Velocity", unit: "cm/s", min: 5e6, max: 2e7, default: 1e7, step: 5e5 },
    ],
};

static TRAPATT: DeviceSpec = DeviceSpec {
    id: DeviceId::TrapattDiode,
    name: "TRAPATT Diode",
    family: DeviceFamily::AvalancheTransit,
    blurb: "Trapped Plasma Avalanche Triggered Transit. High efficiency microwave generator derived from IMPATT.",
    params: &[
        ParamSpec { id: "V", label: "Pulse Voltage", unit: "V", min: 50.0, max: 200.0, default: 100.0, step: 5.0 },
        ParamSpec { id: "I", label: "Peak Current", unit: "A", min: 10.0, max: 100.0, default: 40.0, step: 5.0 },
        ParamSpec { id: "W", label: "Drift Width", unit: "µm", min: 2.0, max: 10.0, default: 5.0, step: 0.5 },
        ParamSpec { id: "alpha", label: "Ionization Rate", unit: "cm⁻¹", min: 5e3, max: 2e4, default: 1e4, step: 5e2 },
        ParamSpec { id: "rho", label: "Plasma Density", unit: "cm⁻³", min: 1e13, max: 1e17, default: 1e15, step: 1e14 },
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_round_trip() {
        for id in DeviceId::ALL {
            assert_eq!(DeviceId::parse(id.as_str()), Some(id));
            assert_eq!(id.spec().id, id);
        }
        assert_eq!(DeviceId::parse("maser"), None);
    }

    #[test]
    fn catalog_tables_are_sane() {
        for id in DeviceId::ALL {
            let spec = id.spec();
            assert!(!spec.params.is_empty(), "{id} has no parameters");
            for p in spec.params {
                assert!(p.min <= p.default && p.default <= p.max, "{id}.{}", p.id);
                assert!(p.step > 0.0, "{id}.{}", p.id);
            }
        }
    }

    #[test]
    fn unset_inputs_resolve_to_defaults() {
        let values = HashMap::new();
        let inputs = Inputs::new(DeviceId::TwoCavityKlystron.spec(), &values);
        assert_eq!(inputs.get("Vo"), 10.0);
        assert_eq!(inputs.get("Vi"), 800.0);
        // Unknown identifiers resolve to zero rather than stopping the frame.
        assert_eq!(inputs.get("Qx"), 0.0);
    }

    #[test]
    fn set_values_win_over_defaults() {
        let mut values = HashMap::new();
        values.insert("Vo".to_owned(), 25.0);
        let inputs = Inputs::new(DeviceId::TwoCavityKlystron.spec(), &values);
        assert_eq!(inputs.get("Vo"), 25.0);
        assert_eq!(inputs.get("Io"), 200.0);
    }

    #[test]
    fn cycling_wraps_both_ways() {
        assert_eq!(DeviceId::TrapattDiode.next(), DeviceId::TwoCavityKlystron);
        assert_eq!(DeviceId::TwoCavityKlystron.prev(), DeviceId::TrapattDiode);
        let mut id = DeviceId::TwoCavityKlystron;
        for _ in 0..DeviceId::ALL.len() {
            id = id.next();
        }
        assert_eq!(id, DeviceId::TwoCavityKlystron);
    }

    #[test]
    fn fidelity_density_scale() {
        assert_eq!(Fidelity::Low.particle_density(), 2.0);
        assert_eq!(Fidelity::Medium.particle_density(), 6.0);
        assert_eq!(Fidelity::High.particle_density(), 12.0);
        assert_eq!(Fidelity::default(), Fidelity::Medium);
    }
}
