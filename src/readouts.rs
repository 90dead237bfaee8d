//! Derived read-outs: the numeric quantities shown beside each animation.
//!
//! Read-outs are recomputed from the live inputs on demand; they never feed
//! back into the animation. Formulas shared with the device models (beam
//! velocity, bunching, cutoff voltages) come from [`crate::physics`].

use crate::descriptor::{DeviceId, Inputs};
use crate::physics;

/// One labeled quantity for the HUD or a report.
#[derive(Debug, Clone)]
pub struct Readout {
    pub label: &'static str,
    pub value: String,
    pub unit: &'static str,
}

impl Readout {
    fn new(label: &'static str, value: String, unit: &'static str) -> Self {
        Readout { label, value, unit }
    }
}

fn sci(v: f64) -> String {
    format!("{v:.2e}")
}

/// Derived quantities for the device the inputs belong to.
pub fn for_device(inputs: &Inputs<'_>) -> Vec<Readout> {
    match inputs.device() {
        DeviceId::TwoCavityKlystron => two_cavity(inputs),
        DeviceId::MultiCavityKlystron => multi_cavity(inputs),
        DeviceId::ReflexKlystron => reflex(inputs),
        DeviceId::TravelingWaveTube => twt(inputs),
        DeviceId::BackwardWaveOscillator => obwo(inputs),
        DeviceId::Magnetron => magnetron(inputs),
        DeviceId::Carcinotron => carcinotron(inputs),
        DeviceId::GunnDiode => gunn(inputs),
        DeviceId::TunnelDiode => tunnel(inputs),
        DeviceId::ImpattDiode => impatt(inputs),
        DeviceId::TrapattDiode => trapatt(inputs),
    }
}

fn two_cavity(inputs: &Inputs<'_>) -> Vec<Readout> {
    let vo = inputs.get("Vo") * 1000.0;
    let io = inputs.get("Io") / 1000.0;
    let v1 = inputs.get("Vi");
    let gap = physics::GapPhysics::new(vo, inputs.get("f") * 1e9, inputs.get("d") / 1000.0);
    let theta_0 = gap.drift_angle(inputs.get("L") / 100.0);
    let x = physics::bunching_parameter(gap.beta, v1, vo, theta_0);
    let i2 = 2.0 * io * physics::bessel_j1(x);
    let g0 = io / vo;
    let gb = (g0 / 2.0) * (gap.beta * gap.beta - gap.beta * (gap.theta_g / 2.0).cos());
    let l_opt_cm = (3.682 * vo * gap.v0) / (gap.omega * gap.beta * v1) * 100.0;
    vec![
        Readout::new("Beam Velocity (v₀)", sci(gap.v0), "m/s"),
        Readout::new("Gap Transit Angle (θg)", format!("{:.2}", gap.theta_g), "rad"),
        Readout::new("Coupling Coeff (β)", format!("{:.3}", gap.beta), ""),
        Readout::new("DC Transit Angle (θ₀)", format!("{theta_0:.1}"), "rad"),
        Readout::new("Bunching Param (X)", format!("{x:.3}"), ""),
        Readout::new("RF Current (I₂)", format!("{:.2}", i2 * 1000.0), "mA"),
        Readout::new("Beam Loading (G_B)", sci(gb), "S"),
        Readout::new("Optimum Drift (L_opt)", format!("{l_opt_cm:.2}"), "cm"),
    ]
}

fn multi_cavity(inputs: &Inputs<'_>) -> Vec<Readout> {
    let total_gain = inputs.get("N") * inputs.get("G");
    let pin = inputs.get("Vi").powi(2) / 50.0;
    let pout = pin * 10.0_f64.powf(total_gain / 10.0);
    let dc_power = inputs.get("Vo") * 1000.0 * (inputs.get("Io") / 1000.0);
    let eff = (pout / dc_power).min(0.6) * 100.0;
    vec![
        Readout::new("Total Gain", format!("{total_gain:.1}"), "dB"),
        Readout::new("Power Gain", sci(10.0_f64.powf(total_gain / 10.0)), "x"),
        Readout::new("Est. Efficiency", format!("{eff:.1}"), "%"),
    ]
}

fn reflex(inputs: &Inputs<'_>) -> Vec<Readout> {
    let vo = inputs.get("Vo");
    let spacing = inputs.get("L") * 1e-3;
    let f = inputs.get("f") * 1e9;
    // Field-free transit across the folded drift space, there and back.
    let v0 = (2.0 * physics::ELECTRON_CHARGE * vo / physics::ELECTRON_MASS).sqrt();
    let transit = 2.0 * spacing / v0;
    let mode = (transit * f - 0.75).round();
    let field = inputs.get("Vr") / spacing;
    vec![
        Readout::new("Mode Number", format!("{mode:.0}"), ""),
        Readout::new("Transit Time", format!("{:.3}", transit * 1e9), "ns"),
        Readout::new("Repeller Field", format!("{field:.0}"), "V/m"),
    ]
}

fn twt(inputs: &Inputs<'_>) -> Vec<Readout> {
    let gain_db = 47.3 * inputs.get("C") * inputs.get("N");
    let v0 = (2.0 * physics::CHARGE_MASS_RATIO * inputs.get("Vo") * 1000.0).sqrt();
    let pout = inputs.get("Vi") * 10.0_f64.powf(gain_db / 20.0);
    vec![
        Readout::new("Small-Signal Gain", format!("{gain_db:.1}"), "dB"),
        Readout::new("Pierce Parameter", format!("{:.3}", inputs.get("C")), ""),
        Readout::new("Beam Velocity", format!("{:.2}", v0 * 1e-6), "10⁶ m/s"),
        Readout::new("Output Power", format!("{pout:.2}"), "W"),
    ]
}

fn obwo(inputs: &Inputs<'_>) -> Vec<Readout> {
    let ve_km_s = 0.593 * (inputs.get("Vo") * 1000.0).sqrt();
    let pout = inputs.get("Vo") * inputs.get("Io") * 0.15;
    vec![
        Readout::new("Beam Velocity", format!("{ve_km_s:.2}"), "km/s"),
        Readout::new("Approx Output Power", format!("{pout:.1}"), "W"),
    ]
}

fn magnetron(inputs: &Inputs<'_>) -> Vec<Readout> {
    let b = inputs.get("Bo") * 1e-3;
    let ra = inputs.get("ra") * 1e-3;
    let rb = inputs.get("rb") * 1e-3;
    let vo = inputs.get("Vo") * 1000.0;
    let hull = physics::hull_cutoff(b, ra, rb);
    let hartree = physics::hartree_voltage(hull, ra, rb, inputs.get("N"));
    let drift = physics::drift_velocity(vo / rb, b);
    let freq_ghz =
        (vo / (b * std::f64::consts::PI * rb * rb)) * 1e-9 * (1.0 + inputs.get("tune") / 100.0);
    vec![
        Readout::new("Hull Cutoff", format!("{:.2}", hull / 1000.0), "kV"),
        Readout::new("Hartree Voltage", format!("{:.2}", hartree / 1000.0), "kV"),
        Readout::new("Drift Velocity", format!("{drift:.0}"), "m/s"),
        Readout::new("Frequency", format!("{freq_ghz:.2}"), "GHz"),
    ]
}

fn carcinotron(inputs: &Inputs<'_>) -> Vec<Readout> {
    let e = inputs.get("Vo") * 1e3 / (inputs.get("d") * 1e-3);
    let v = physics::drift_velocity(e, inputs.get("Bo") * 1e-3);
    vec![
        Readout::new("Electric Field (E)", format!("{:.2}", e / 1e6), "MV/m"),
        Readout::new("Drift Velocity (ve)", sci(v), "m/s"),
        Readout::new("Approx Frequency", format!("{:.2}", v / 1e7 * 2.5), "GHz"),
    ]
}

fn gunn(inputs: &Inputs<'_>) -> Vec<Readout> {
    let l = inputs.get("L");
    let e = inputs.get("V") / (l * 1e-4);
    let freq_ghz = inputs.get("vd") / (l * 1e-4) / 1e9;
    let n0l = inputs.get("Nd") * l * 1e-4;
    vec![
        Readout::new("Electric Field", format!("{:.2}", e / 1000.0), "kV/cm"),
        Readout::new("Threshold Field", format!("{}", inputs.get("Vth")), "kV/cm"),
        Readout::new("Frequency", format!("{freq_ghz:.3}"), "GHz"),
        Readout::new("Mode Criterion (n₀L)", sci(n0l), "cm⁻²"),
    ]
}

fn tunnel(inputs: &Inputs<'_>) -> Vec<Readout> {
    let v = inputs.get("Vbias");
    let vp = inputs.get("Vp");
    let ip = inputs.get("Ip");
    let current = ip * (-((v - vp) / 100.0).powi(2)).exp();
    vec![
        Readout::new("Tunnel Current", format!("{current:.3}"), "mA"),
        Readout::new("Peak-Valley Ratio", format!("{:.2}", ip / inputs.get("Iv")), ""),
        Readout::new("Operating Point", format!("{v}"), "mV"),
    ]
}

fn impatt(inputs: &Inputs<'_>) -> Vec<Readout> {
    let w = inputs.get("W");
    let vs = inputs.get("vs");
    let field = inputs.get("Vd") / (w * 1e-4);
    let transit_ps = w * 1e-6 / vs * 1e12;
    let freq_ghz = vs / (2.0 * w * 1e-4) / 1e9;
    vec![
        Readout::new("Avalanche Field", format!("{field:.0}"), "V/cm"),
        Readout::new("Transit Time", format!("{transit_ps:.2}"), "ps"),
        Readout::new("Approx Frequency", format!("{freq_ghz:.1}"), "GHz"),
    ]
}

fn trapatt(inputs: &Inputs<'_>) -> Vec<Readout> {
    let peak = inputs.get("V") * inputs.get("I");
    vec![
        Readout::new("Peak Power", format!("{peak:.0}"), "W"),
        Readout::new("Efficiency", "15-60".to_owned(), "%"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn defaults(id: DeviceId) -> HashMap<String, f64> {
        id.spec().defaults()
    }

    fn value_of(readouts: &[Readout], label: &str) -> f64 {
        readouts
            .iter()
            .find(|r| r.label == label)
            .unwrap_or_else(|| panic!("missing read-out {label}"))
            .value
            .parse()
            .unwrap()
    }

    #[test]
    fn every_device_has_readouts() {
        for id in DeviceId::ALL {
            let values = defaults(id);
            let inputs = Inputs::new(id.spec(), &values);
            assert!(!for_device(&inputs).is_empty(), "{id}");
        }
    }

    #[test]
    fn two_cavity_bunching_matches_physics() {
        let values = defaults(DeviceId::TwoCavityKlystron);
        let inputs = Inputs::new(DeviceId::TwoCavityKlystron.spec(), &values);
        let rows = for_device(&inputs);
        let gap = physics::GapPhysics::new(10_000.0, 3.0e9, 3.0e-3);
        let x = gap.bunching(800.0, 0.05);
        assert!((value_of(&rows, "Bunching Param (X)") - x).abs() < 5e-4);
        assert!(value_of(&rows, "Coupling Coeff (β)") < 1.0);
    }

    #[test]
    fn magnetron_thresholds_ordered() {
        let values = defaults(DeviceId::Magnetron);
        let inputs = Inputs::new(DeviceId::Magnetron.spec(), &values);
        let rows = for_device(&inputs);
        let hull = value_of(&rows, "Hull Cutoff");
        let hartree = value_of(&rows, "Hartree Voltage");
        assert!(hull > hartree && hartree > 0.0);
    }

    #[test]
    fn tunnel_current_at_defaults() {
        let values = defaults(DeviceId::TunnelDiode);
        let inputs = Inputs::new(DeviceId::TunnelDiode.spec(), &values);
        let rows = for_device(&inputs);
        // Ip = 10 mA, Vbias = 150 mV, Vp = 100 mV: 10 * exp(-0.25).
        let expected = 10.0 * (-0.25_f64).exp();
        assert!((value_of(&rows, "Tunnel Current") - expected).abs() < 5e-4);
    }

    #[test]
    fn gunn_transit_frequency() {
        let values = defaults(DeviceId::GunnDiode);
        let inputs = Inputs::new(DeviceId::GunnDiode.spec(), &values);
        let rows = for_device(&inputs);
        // vd = 1e7 cm/s across 10 um is exactly 10 GHz.
        assert_eq!(value_of(&rows, "Frequency"), 10.0);
    }
}
