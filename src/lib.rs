//! Bodies spawned around a fixed point mass, each leaving a fading trail.
//!
//! The [`sim`] module holds the physics and can be driven without any
//! window. [`input`] turns raw press events into spawns and [`cfg`]
//! remembers the user's knob settings between runs.

pub mod cfg;
pub mod input;
pub mod sim;

pub use input::{SpawnTrigger, TapDetector, TriggerEvent, TriggerSource};
pub use sim::{Simulation, SimulationConfig};
