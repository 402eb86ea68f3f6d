use super::Program;
use gravity_trails_demo::sim::{ATTRACTOR_DISPLAY_RADIUS, Body, Simulation};

mod object_conversion;
