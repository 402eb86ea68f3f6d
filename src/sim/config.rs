use std::{
    error::Error,
    fmt::{self, Display},
    ops::RangeInclusive,
};

use serde::{Deserialize, Serialize};
use strum_macros::EnumIter;

use super::{SPAWN_SAFETY_MARGIN, trail::TrailBuffer};

/// Range of the "size" knob (body radius).
pub const BODY_RADIUS_RANGE: RangeInclusive<f64> = 0.1..=3.0;
/// Range of the "speed" knob (initial velocity spread).
pub const SPEED_RANGE: RangeInclusive<f64> = 0.01..=1.0;
/// Range of the "G" knob.
pub const GRAVITY_RANGE: RangeInclusive<f64> = 1e-4..=6.0;

pub const DEFAULT_BODY_RADIUS: f64 = 0.5;
pub const DEFAULT_SPEED: f64 = 0.1;
pub const DEFAULT_GRAVITY: f64 = 0.5;
pub const DEFAULT_SHOW_TRAILS: bool = true;

/// Tunables for a [`Simulation`](super::Simulation).
///
/// Changes apply prospectively: existing bodies keep the values they were
/// spawned with.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Outer radius of the spawn annulus.
    pub spawn_radius: f64,
    /// Radius given to newly spawned bodies.
    pub body_radius: f64,
    /// Width of the uniform distribution each initial velocity component
    /// is drawn from, centered on zero.
    pub speed: f64,
    /// Gravitational strength `G`. Dimensionless.
    pub gravity: f64,
    /// Radius of the no-force zone around the attractor.
    pub min_distance: f64,
    pub show_trails: bool,
    pub max_trail_length: usize,
    /// `None` lets the body collection grow without limit.
    pub max_bodies: Option<usize>,
    pub capacity_policy: CapacityPolicy,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            spawn_radius: 10.0,
            body_radius: DEFAULT_BODY_RADIUS,
            speed: DEFAULT_SPEED,
            gravity: DEFAULT_GRAVITY,
            min_distance: 6.0,
            show_trails: DEFAULT_SHOW_TRAILS,
            max_trail_length: TrailBuffer::DEFAULT_CAPACITY,
            max_bodies: Some(256),
            capacity_policy: CapacityPolicy::default(),
        }
    }
}

fn clamp_knob(target: &mut f64, value: f64, range: &RangeInclusive<f64>) {
    if value.is_finite() {
        *target = value.clamp(*range.start(), *range.end());
    }
}

impl SimulationConfig {
    pub fn set_body_radius(&mut self, value: f64) {
        clamp_knob(&mut self.body_radius, value, &BODY_RADIUS_RANGE);
    }

    pub fn set_speed(&mut self, value: f64) {
        clamp_knob(&mut self.speed, value, &SPEED_RANGE);
    }

    pub fn set_gravity(&mut self, value: f64) {
        clamp_knob(&mut self.gravity, value, &GRAVITY_RANGE);
    }

    /// Inner radius of the spawn annulus, just outside the no-force zone.
    #[inline]
    pub fn inner_spawn_radius(&self) -> f64 {
        self.min_distance + SPAWN_SAFETY_MARGIN
    }

    /// Checks the invariants spawning relies on.
    ///
    /// Knob values outside their UI range are accepted here as long as they
    /// are physically meaningful: a `speed` of zero spawns bodies at rest.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            ("spawn_radius", self.spawn_radius),
            ("body_radius", self.body_radius),
            ("speed", self.speed),
            ("gravity", self.gravity),
            ("min_distance", self.min_distance),
        ];
        if let Some(&(field, value)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::NonFinite { field, value });
        }
        if self.body_radius <= 0.0 {
            return Err(ConfigError::NonPositiveBodyRadius(self.body_radius));
        }
        if self.min_distance < 0.0 {
            return Err(ConfigError::NegativeMinDistance(self.min_distance));
        }
        if self.speed < 0.0 {
            return Err(ConfigError::NegativeSpeed(self.speed));
        }
        let inner = self.inner_spawn_radius();
        if self.spawn_radius < inner {
            return Err(ConfigError::EmptySpawnAnnulus {
                inner,
                outer: self.spawn_radius,
            });
        }
        if self.max_bodies == Some(0) {
            return Err(ConfigError::ZeroBodyCap);
        }
        Ok(())
    }
}

/// What to do when spawning into a full simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, EnumIter, Serialize, Deserialize)]
pub enum CapacityPolicy {
    /// Refuse the new body.
    Reject,
    /// Remove the oldest body to make room.
    #[default]
    EvictOldest,
}

impl CapacityPolicy {
    pub const fn name(self) -> &'static str {
        match self {
            CapacityPolicy::Reject => "Reject new",
            CapacityPolicy::EvictOldest => "Evict oldest",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            CapacityPolicy::Reject => {
                "When the body limit is reached, new spawns are refused\n\
                until bodies are removed or the simulation is reset."
            }
            CapacityPolicy::EvictOldest => {
                "When the body limit is reached, the oldest body is removed\n\
                to make room for the new one."
            }
        }
    }
}

impl Display for CapacityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    NonFinite { field: &'static str, value: f64 },
    NonPositiveBodyRadius(f64),
    NegativeMinDistance(f64),
    NegativeSpeed(f64),
    EmptySpawnAnnulus { inner: f64, outer: f64 },
    ZeroBodyCap,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NonFinite { field, value } => {
                write!(f, "`{field}` must be finite, got {value}")
            }
            ConfigError::NonPositiveBodyRadius(r) => {
                write!(f, "body radius must be positive, got {r}")
            }
            ConfigError::NegativeMinDistance(d) => {
                write!(f, "min distance must not be negative, got {d}")
            }
            ConfigError::NegativeSpeed(s) => write!(f, "speed must not be negative, got {s}"),
            ConfigError::EmptySpawnAnnulus { inner, outer } => write!(
                f,
                "spawn radius {outer} is inside the safe radius {inner}; there is nowhere to spawn"
            ),
            ConfigError::ZeroBodyCap => write!(f, "a body limit of zero would reject every spawn"),
        }
    }
}

impl Error for ConfigError {}
