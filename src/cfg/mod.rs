//! User preferences that outlive the process: the control-panel knobs and
//! whether the welcome window is shown.

use std::{path::Path, sync::Mutex};

pub(crate) mod saved_cell;
mod storage;

pub use saved_cell::SavedCell;
pub use storage::{LoadError, ResetError, SaveError, default_path};

use crate::sim::{
    DEFAULT_BODY_RADIUS, DEFAULT_GRAVITY, DEFAULT_SHOW_TRAILS, DEFAULT_SPEED, SimulationConfig,
};

pub struct Config<'a> {
    pub show_welcome_window: SavedCell<'a, bool>,
    pub body_radius: SavedCell<'a, f64>,
    pub speed: SavedCell<'a, f64>,
    pub gravity: SavedCell<'a, f64>,
    pub show_trails: SavedCell<'a, bool>,
    path: Option<&'a Path>,
}

impl<'a> Config<'a> {
    pub const fn new() -> Self {
        Self {
            show_welcome_window: SavedCell::new("gravity_trails::show_welcome_window", true),
            body_radius: SavedCell::new("gravity_trails::body_radius", DEFAULT_BODY_RADIUS),
            speed: SavedCell::new("gravity_trails::speed", DEFAULT_SPEED),
            gravity: SavedCell::new("gravity_trails::gravity", DEFAULT_GRAVITY),
            show_trails: SavedCell::new("gravity_trails::show_trails", DEFAULT_SHOW_TRAILS),
            path: None,
        }
    }

    /// Preferences kept in the file at `path` instead of the platform location.
    pub const fn at(path: &'a Path) -> Self {
        Self {
            show_welcome_window: SavedCell::at("gravity_trails::show_welcome_window", true, path),
            body_radius: SavedCell::at("gravity_trails::body_radius", DEFAULT_BODY_RADIUS, path),
            speed: SavedCell::at("gravity_trails::speed", DEFAULT_SPEED, path),
            gravity: SavedCell::at("gravity_trails::gravity", DEFAULT_GRAVITY, path),
            show_trails: SavedCell::at("gravity_trails::show_trails", DEFAULT_SHOW_TRAILS, path),
            path: Some(path),
        }
    }

    /// Copies the stored knob values into `config`.
    ///
    /// Values are clamped to their knob range, so a hand-edited file can't
    /// push the simulation outside what the controls allow.
    pub fn apply_to(&self, config: &mut SimulationConfig) {
        config.set_body_radius(self.body_radius.get());
        config.set_speed(self.speed.get());
        config.set_gravity(self.gravity.get());
        config.show_trails = self.show_trails.get();
    }

    /// Stores the knob values of `config`.
    pub fn remember(&self, config: &SimulationConfig) -> Result<(), SaveError> {
        self.body_radius.set(config.body_radius)?;
        self.speed.set(config.speed)?;
        self.gravity.set(config.gravity)?;
        self.show_trails.set(config.show_trails)
    }

    /// Deletes the preferences file and returns every value to its default.
    pub fn reset(&mut self) -> Result<(), ResetError> {
        storage::reset(self.path)?;
        *self = match self.path {
            Some(path) => Self::at(path),
            None => Self::new(),
        };
        log::info!("preferences reset to defaults");
        Ok(())
    }
}

impl Default for Config<'_> {
    fn default() -> Self {
        Self::new()
    }
}

pub static CONFIG: Mutex<Config<'static>> = Mutex::new(Config::new());
