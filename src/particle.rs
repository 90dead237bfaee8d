//! Flat particle storage shared by every device model.
//!
//! A [`Particle`] is a plain record; which fields matter depends on the
//! device that owns the pool (linear-beam tubes use `x`/`vx`, the magnetron
//! uses `theta`/`radius`, diodes use `life`). The [`ParticlePool`] is a
//! grow-only arena: models inject up to a device cap, mutate in place, and
//! recycle exhausted slots by overwriting the whole record, so a steady-state
//! frame allocates nothing.

/// Hard ceiling on live particles across all devices and fidelity levels.
pub const GLOBAL_MAX: usize = 35_000;

/// Role a particle currently plays in its device's animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParticleState {
    /// Unmodulated beam.
    #[default]
    Neutral,
    /// Accelerated by the RF phase.
    Fast,
    /// Decelerated by the RF phase.
    Slow,
    /// Traveling high-field domain (Gunn).
    Domain,
    /// Positive carrier (IMPATT, TRAPATT).
    Hole,
    /// Negative carrier (IMPATT, TRAPATT).
    Electron,
    /// Collected; skipped until recycled (carcinotron).
    Absorbed,
    /// Plasma filling phase (TRAPATT).
    Filling,
    /// Plasma extraction phase (TRAPATT).
    Extracting,
}

/// One animated charge carrier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    /// Unmodulated axial speed, kept so modulation clamps have a reference.
    pub base_vx: f32,
    /// Rest transverse position for devices that oscillate around a rail.
    pub base_y: f32,
    /// Polar angle, rad (cylindrical devices).
    pub theta: f32,
    /// Polar radius, px (cylindrical devices).
    pub radius: f32,
    /// Remaining life in `[0, 1]` for short-lived carriers.
    pub life: f32,
    /// Index of the last interaction gap crossed; -1 before any.
    pub gap_index: i32,
    pub state: ParticleState,
}

impl Particle {
    /// Particle launched at `(x, y)` with axial speed `vx`.
    pub fn at(x: f32, y: f32, vx: f32) -> Self {
        Particle {
            x,
            y,
            vx,
            base_vx: vx,
            base_y: y,
            ..Particle::default()
        }
    }

    /// Particle at polar coordinates, for cylindrical devices.
    pub fn polar(theta: f32, radius: f32) -> Self {
        Particle {
            theta,
            radius,
            ..Particle::default()
        }
    }
}

impl Default for Particle {
    fn default() -> Self {
        Particle {
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            base_vx: 0.0,
            base_y: 0.0,
            theta: 0.0,
            radius: 0.0,
            life: 1.0,
            gap_index: -1,
            state: ParticleState::Neutral,
        }
    }
}

/// Grow-only arena of particles with a global ceiling.
#[derive(Debug, Default)]
pub struct ParticlePool {
    particles: Vec<Particle>,
}

impl ParticlePool {
    pub fn new() -> Self {
        ParticlePool {
            particles: Vec::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Push up to `count` new particles while the pool is under both the
    /// device `cap` and [`GLOBAL_MAX`]. `template` receives the index the
    /// new particle will occupy.
    pub fn inject<F>(&mut self, count: usize, cap: usize, mut template: F)
    where
        F: FnMut(usize) -> Particle,
    {
        let limit = cap.min(GLOBAL_MAX);
        for _ in 0..count {
            if self.particles.len() >= limit {
                break;
            }
            let idx = self.particles.len();
            self.particles.push(template(idx));
        }
    }

    /// Overwrite slot `idx` with a fresh record. The slot keeps its position
    /// so iteration order is stable across recycles.
    #[inline]
    pub fn recycle(&mut self, idx: usize, particle: Particle) {
        self.particles[idx] = particle;
    }

    /// Silently drop particles beyond `cap` (or [`GLOBAL_MAX`], whichever is
    /// lower), newest first.
    pub fn cap_at(&mut self, cap: usize) {
        self.particles.truncate(cap.min(GLOBAL_MAX));
    }

    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&Particle) -> bool,
    {
        self.particles.retain(keep);
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.particles.iter()
    }

    #[inline]
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Particle> {
        self.particles.iter_mut()
    }

    #[inline]
    pub fn get(&self, idx: usize) -> Option<&Particle> {
        self.particles.get(idx)
    }

    #[inline]
    pub fn as_slice(&self) -> &[Particle] {
        &self.particles
    }
}

impl<'a> IntoIterator for &'a ParticlePool {
    type Item = &'a Particle;
    type IntoIter = std::slice::Iter<'a, Particle>;

    fn into_iter(self) -> Self::IntoIter {
        self.particles.iter()
    }
}

impl<'a> IntoIterator for &'a mut ParticlePool {
    type Item = &'a mut Particle;
    type IntoIter = std::slice::IterMut<'a, Particle>;

    fn into_iter(self) -> Self::IntoIter {
        self.particles.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inject_respects_device_cap() {
        let mut pool = ParticlePool::new();
        pool.inject(100, 10, |i| Particle::at(i as f32, 0.0, 1.0));
        assert_eq!(pool.len(), 10);
        // Further injection is a no-op at the cap.
        pool.inject(5, 10, |_| Particle::default());
        assert_eq!(pool.len(), 10);
    }

    #[test]
    fn inject_respects_global_max() {
        let mut pool = ParticlePool::new();
        pool.inject(GLOBAL_MAX + 500, usize::MAX, |_| Particle::default());
        assert_eq!(pool.len(), GLOBAL_MAX);
    }

    #[test]
    fn cap_at_truncates_newest_first() {
        let mut pool = ParticlePool::new();
        pool.inject(20, 20, |i| Particle::at(i as f32, 0.0, 0.0));
        pool.cap_at(5);
        assert_eq!(pool.len(), 5);
        assert_eq!(pool.get(4).map(|p| p.x), Some(4.0));
    }

    #[test]
    fn recycle_overwrites_every_field() {
        let mut pool = ParticlePool::new();
        pool.inject(1, 1, |_| Particle {
            x: 9.0,
            y: 9.0,
            vx: 9.0,
            vy: 9.0,
            life: 0.1,
            gap_index: 3,
            state: ParticleState::Fast,
            ..Particle::default()
        });
        pool.recycle(0, Particle::at(1.0, 2.0, 3.0));
        let p = pool.get(0).copied().unwrap();
        assert_eq!(p.x, 1.0);
        assert_eq!(p.vx, 3.0);
        assert_eq!(p.base_vx, 3.0);
        assert_eq!(p.vy, 0.0);
        assert_eq!(p.life, 1.0);
        assert_eq!(p.gap_index, -1);
        assert_eq!(p.state, ParticleState::Neutral);
    }

    #[test]
    fn launch_keeps_reference_speed() {
        let p = Particle::at(10.0, 20.0, 2.5);
        assert_eq!(p.base_vx, 2.5);
        assert_eq!(p.base_y, 20.0);
    }
}
