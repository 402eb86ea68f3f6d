use glam::DVec3;

use super::vector::checked_normalize;

/// Inverse-square pull toward a fixed point.
///
/// The returned force is added straight onto a body's velocity every
/// tick; there is no timestep, one tick is one unit of simulated time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttractorField {
    center: DVec3,
    strength: f64,
    min_distance: f64,
}

impl AttractorField {
    pub const fn new(center: DVec3, strength: f64, min_distance: f64) -> Self {
        Self {
            center,
            strength,
            min_distance,
        }
    }

    #[inline]
    pub const fn center(&self) -> DVec3 {
        self.center
    }

    /// The gravitational strength `G`.
    #[inline]
    pub const fn strength(&self) -> f64 {
        self.strength
    }

    /// Bodies this close to the center (or closer) feel no force.
    #[inline]
    pub const fn min_distance(&self) -> f64 {
        self.min_distance
    }

    pub fn distance_to(&self, position: DVec3) -> f64 {
        self.center.distance(position)
    }

    /// The force felt by a body at `position`.
    ///
    /// Zero inside the `min_distance` sphere. A too-small `min_distance`
    /// lets bodies pick up arbitrarily large velocities near the center;
    /// choosing a sane value is up to the caller.
    pub fn force_at(&self, position: DVec3) -> DVec3 {
        let offset = self.center - position;
        let distance = offset.length();

        if distance <= self.min_distance {
            return DVec3::ZERO;
        }

        match checked_normalize(offset) {
            Ok(direction) => direction * (self.strength / (distance * distance)),
            Err(_) => DVec3::ZERO,
        }
    }
}
