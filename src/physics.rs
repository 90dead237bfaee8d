//! Closed-form beam physics shared by the device models and read-outs.
//!
//! Everything here is physically derived (SI units unless noted) and free of
//! screen-space scaling; the per-device visual mapping lives next to each
//! model. Computations are `f64` so the read-outs and the property tests can
//! hold tight tolerances.

/// Electron charge, C.
pub const ELECTRON_CHARGE: f64 = 1.6e-19;
/// Electron rest mass, kg.
pub const ELECTRON_MASS: f64 = 9.11e-31;
/// e/m, C/kg, as used for crossed-field thresholds.
pub const CHARGE_MASS_RATIO: f64 = 1.759e11;

/// Truncated-series Bessel function of the first kind, order one.
///
/// `J1(x) ~= x/2 - x^3/16 + x^5/384`; below `x = 0.1` the linear term alone
/// is inside display precision. Odd symmetry is preserved for negative
/// arguments. Accurate to a few parts in 1e4 over the bunching range the
/// models drive (|x| < 3).
pub fn bessel_j1(x: f64) -> f64 {
    if x < 0.0 {
        return -bessel_j1(-x);
    }
    if x < 0.1 {
        x / 2.0
    } else {
        x / 2.0 - x.powi(3) / 16.0 + x.powi(5) / 384.0
    }
}

/// Nonrelativistic beam velocity for an accelerating potential, m/s.
///
/// `v0 = sqrt(2eV/m) ~= 5.93e5 * sqrt(V)`.
#[inline]
pub fn beam_velocity(volts: f64) -> f64 {
    5.93e5 * volts.sqrt()
}

/// Phase accumulated crossing `dist` meters at `velocity` m/s under angular
/// frequency `omega`.
#[inline]
pub fn transit_angle(omega: f64, dist: f64, velocity: f64) -> f64 {
    omega * dist / velocity
}

/// Gap coupling coefficient `beta = sin(theta_g/2) / (theta_g/2)`.
///
/// The zero-angle limit is guarded: below a half-angle of 1e-4 rad the
/// coefficient is exactly 1.
pub fn coupling_coefficient(theta_g: f64) -> f64 {
    let half = theta_g / 2.0;
    if half.abs() <= 1e-4 {
        1.0
    } else {
        half.sin() / half
    }
}

/// Bunching parameter `X = (beta * V1 / (2 * V0)) * theta_0`.
#[inline]
pub fn bunching_parameter(beta: f64, v1: f64, v0_volts: f64, theta_0: f64) -> f64 {
    (beta * v1 / (2.0 * v0_volts)) * theta_0
}

/// Velocity-modulation quantities for one klystron gap.
#[derive(Debug, Clone, Copy)]
pub struct GapPhysics {
    /// Accelerating potential, V.
    pub vo: f64,
    /// DC beam velocity, m/s.
    pub v0: f64,
    /// Drive angular frequency, rad/s.
    pub omega: f64,
    /// Gap transit angle, rad.
    pub theta_g: f64,
    /// Coupling coefficient.
    pub beta: f64,
}

impl GapPhysics {
    /// `vo_volts` beam potential (V), `f_hz` drive frequency (Hz), `gap_m`
    /// gap width (m).
    pub fn new(vo_volts: f64, f_hz: f64, gap_m: f64) -> Self {
        let v0 = beam_velocity(vo_volts);
        let omega = std::f64::consts::TAU * f_hz;
        let theta_g = transit_angle(omega, gap_m, v0);
        let beta = coupling_coefficient(theta_g);
        GapPhysics {
            vo: vo_volts,
            v0,
            omega,
            theta_g,
            beta,
        }
    }

    /// DC transit angle across a drift space of `drift_m` meters.
    #[inline]
    pub fn drift_angle(&self, drift_m: f64) -> f64 {
        transit_angle(self.omega, drift_m, self.v0)
    }

    /// Modulation depth `beta * V1 / (2 * V0)` for a gap voltage `v1`.
    #[inline]
    pub fn depth(&self, v1: f64) -> f64 {
        self.beta * v1 / (2.0 * self.vo)
    }

    /// Bunching parameter after a drift of `drift_m` meters.
    #[inline]
    pub fn bunching(&self, v1: f64, drift_m: f64) -> f64 {
        self.depth(v1) * self.drift_angle(drift_m)
    }
}

/// Round-trip resonance quantities for the reflex klystron.
#[derive(Debug, Clone, Copy)]
pub struct ReflexResonance {
    /// Launch velocity, m/s.
    pub v0: f64,
    /// Repeller-space round-trip time, s.
    pub round_trip: f64,
    /// Round trip measured in RF cycles.
    pub cycles: f64,
    /// Mode number n of the nearest `(n + 3/4)` condition.
    pub mode: i32,
    /// Distance from the nearest mode, cycles.
    pub detuning: f64,
    /// Gaussian oscillation strength in `[0, 1]`, floored to 0 below 0.05.
    pub strength: f64,
}

/// Resonance against the `(n + 3/4)`-cycle condition. `spacing_m` is the
/// cavity-to-repeller distance.
pub fn reflex_resonance(vo_volts: f64, vr_volts: f64, spacing_m: f64, f_hz: f64) -> ReflexResonance {
    let e_m = ELECTRON_CHARGE / ELECTRON_MASS;
    let v0 = (2.0 * e_m * vo_volts).sqrt();
    let round_trip = 4.0 * spacing_m * v0 / (e_m * (vo_volts + vr_volts));
    let cycles = round_trip * f_hz;
    let ideal = (cycles - 0.75).round() + 0.75;
    let detuning = (cycles - ideal).abs();
    let mut strength = (-(detuning / 0.15) * (detuning / 0.15)).exp();
    if strength < 0.05 {
        strength = 0.0;
    }
    ReflexResonance {
        v0,
        round_trip,
        cycles,
        mode: (ideal - 0.75) as i32,
        detuning,
        strength,
    }
}

/// Hull cutoff voltage for a cylindrical crossed-field gap, V.
///
/// `V_H = (e/8m) * B^2 * rb^2 * (1 - ra^2/rb^2)^2`.
pub fn hull_cutoff(b_tesla: f64, ra_m: f64, rb_m: f64) -> f64 {
    (CHARGE_MASS_RATIO / 8.0)
        * b_tesla
        * b_tesla
        * rb_m
        * rb_m
        * (1.0 - (ra_m * ra_m) / (rb_m * rb_m)).powi(2)
}

/// Hartree threshold for the pi-mode of an `n`-cavity anode, V.
pub fn hartree_voltage(hull_v: f64, ra_m: f64, rb_m: f64, n_cavities: f64) -> f64 {
    hull_v * (1.0 - (ra_m / rb_m).powf(2.0 / n_cavities))
}

/// E cross B drift speed, m/s.
#[inline]
pub fn drift_velocity(e_field: f64, b_tesla: f64) -> f64 {
    e_field / b_tesla
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bessel_series_values() {
        // Linear region.
        assert_eq!(bessel_j1(0.05), 0.025);
        // Series value at 1.0: 1/2 - 1/16 + 1/384.
        let expected = 0.5 - 1.0 / 16.0 + 1.0 / 384.0;
        assert!((bessel_j1(1.0) - expected).abs() < 1e-12);
        // Odd symmetry.
        assert_eq!(bessel_j1(-1.0), -bessel_j1(1.0));
    }

    #[test]
    fn coupling_guards_zero_angle() {
        assert_eq!(coupling_coefficient(0.0), 1.0);
        assert_eq!(coupling_coefficient(1e-4), 1.0);
        // Just past the guard the series limit still holds tightly.
        assert!((coupling_coefficient(4e-4) - 1.0).abs() < 1e-7);
        // A real gap angle couples below unity.
        assert!(coupling_coefficient(1.0) < 1.0);
    }

    #[test]
    fn gap_physics_matches_closed_form() {
        let gap = GapPhysics::new(10_000.0, 3.0e9, 3.0e-3);
        let omega = std::f64::consts::TAU * 3.0e9;
        let v0 = 5.93e5 * 10_000.0_f64.sqrt();
        let theta_g = omega * 3.0e-3 / v0;
        let beta = (theta_g / 2.0).sin() / (theta_g / 2.0);
        let theta_0 = omega * 0.05 / v0;
        let x = (beta * 800.0 / (2.0 * 10_000.0)) * theta_0;
        let got = gap.bunching(800.0, 0.05);
        assert!(((got - x) / x).abs() < 1e-12);
        // Ballpark for the canonical inputs.
        assert!(got > 0.5 && got < 0.7, "X = {got}");
    }

    #[test]
    fn reflex_strength_peaks_on_mode() {
        let res = reflex_resonance(600.0, 350.0, 3.0e-3, 9.0e9);
        // Retune the frequency so the round trip is exactly (n + 3/4) cycles.
        let n = res.mode.max(1) as f64;
        let f_exact = (n + 0.75) / res.round_trip;
        let tuned = reflex_resonance(600.0, 350.0, 3.0e-3, f_exact);
        assert!(tuned.strength > 0.999, "strength = {}", tuned.strength);
        assert!(tuned.detuning < 1e-9);

        // Half a cycle off the mode the Gaussian is under the floor.
        let f_off = (n + 0.75 + 0.5) / res.round_trip;
        let detuned = reflex_resonance(600.0, 350.0, 3.0e-3, f_off);
        assert_eq!(detuned.strength, 0.0);
    }

    #[test]
    fn hull_and_hartree_ordering() {
        let hull = hull_cutoff(0.336, 0.010, 0.030);
        let hartree = hartree_voltage(hull, 0.010, 0.030, 8.0);
        assert!(hull > 0.0);
        assert!(hartree > 0.0 && hartree < hull);
        // Stronger field raises the cutoff quadratically.
        assert!(hull_cutoff(0.672, 0.010, 0.030) > 3.9 * hull);
    }
}
