//! The physics core: bodies falling toward a single fixed attractor.
//!
//! One [`Simulation`] owns every [`Body`]. An external driver calls
//! [`Simulation::step`] once per rendered frame and reads the result back
//! through [`Simulation::snapshot`] or [`Simulation::bodies`].

pub(crate) mod attractor;
pub(crate) mod body;
pub(crate) mod config;
pub(crate) mod queue;
pub(crate) mod simulation;
pub(crate) mod trail;
pub(crate) mod vector;

pub use attractor::AttractorField;
pub use body::{Body, BodyId, BodyView, NonFiniteStateError};
pub use config::{
    BODY_RADIUS_RANGE, CapacityPolicy, ConfigError, DEFAULT_BODY_RADIUS, DEFAULT_GRAVITY,
    DEFAULT_SHOW_TRAILS, DEFAULT_SPEED, GRAVITY_RANGE, SPEED_RANGE, SimulationConfig,
};
pub use queue::{SpawnQueue, SpawnQueueClosed, SpawnRequest};
pub use simulation::{RunState, SimError, Simulation, StepReport};
pub use trail::TrailBuffer;
pub use vector::{ZeroLengthError, checked_normalize};

/// Radius the attractor is drawn with. It has no effect on the physics.
pub const ATTRACTOR_DISPLAY_RADIUS: f64 = 5.0;

/// Distance between the no-force zone and the inner edge of the spawn annulus.
pub const SPAWN_SAFETY_MARGIN: f64 = 1.0;
