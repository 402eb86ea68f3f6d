use std::ops::RangeInclusive;

use gravity_trails_demo::{
    cfg::CONFIG,
    sim::{BODY_RADIUS_RANGE, CapacityPolicy, GRAVITY_RANGE, SPEED_RANGE, SimulationConfig},
};
use log::warn;
use strum::IntoEnumIterator;
use three_d::egui::{Checkbox, ComboBox, Context, DragValue, Slider, Ui, Window};

use super::{SimState, declare_id};

declare_id!(salt_only, CAPACITY_POLICY_COMBO_BOX, b"EvictOld");

const BODY_CAP_RANGE: RangeInclusive<usize> = 1..=4096;
const DEFAULT_BODY_CAP: usize = 256;

pub(super) struct WindowState {
    /// Cap restored when the limit is switched back on.
    last_cap: usize,
}

impl Default for WindowState {
    fn default() -> Self {
        Self {
            last_cap: DEFAULT_BODY_CAP,
        }
    }
}

pub(super) fn draw(ctx: &Context, sim_state: &mut SimState) {
    Window::new("Controls")
        .default_pos((12.0, 96.0))
        .resizable(false)
        .show(ctx, |ui| draw_window_contents(ui, sim_state));
}

fn draw_window_contents(ui: &mut Ui, sim_state: &mut SimState) {
    let config = sim_state.simulation.config_mut();
    if knobs(ui, config) {
        remember(config);
    }

    ui.separator();
    capacity(ui, config, &mut sim_state.ui.controls_window_state);

    ui.separator();
    ui.horizontal(|ui| {
        if ui.button("Spawn").clicked() {
            sim_state.spawn();
        }
        let pause_label = if sim_state.simulation.is_paused() {
            "Resume"
        } else {
            "Pause"
        };
        if ui.button(pause_label).clicked() {
            sim_state.simulation.toggle_paused();
        }
        if ui.button("Reset").clicked() {
            sim_state.reset();
        }
    });

    if ui
        .button("Restore default settings")
        .on_hover_text("Forgets the saved knob values and shows the welcome window again")
        .clicked()
    {
        restore_defaults(sim_state.simulation.config_mut());
    }
}

/// Returns whether any knob changed.
fn knobs(ui: &mut Ui, config: &mut SimulationConfig) -> bool {
    let mut changed = false;

    let mut radius = config.body_radius;
    if ui
        .add(Slider::new(&mut radius, BODY_RADIUS_RANGE).text("Size"))
        .on_hover_text("Radius of newly spawned bodies")
        .changed()
    {
        config.set_body_radius(radius);
        changed = true;
    }

    let mut speed = config.speed;
    if ui
        .add(Slider::new(&mut speed, SPEED_RANGE).text("Speed"))
        .on_hover_text("Spread of the random initial velocity")
        .changed()
    {
        config.set_speed(speed);
        changed = true;
    }

    let mut gravity = config.gravity;
    if ui
        .add(
            Slider::new(&mut gravity, GRAVITY_RANGE)
                .logarithmic(true)
                .text("G"),
        )
        .on_hover_text("Strength of the attractor for newly spawned bodies")
        .changed()
    {
        config.set_gravity(gravity);
        changed = true;
    }

    changed |= ui
        .checkbox(&mut config.show_trails, "Show trails")
        .on_hover_text("Whether newly spawned bodies leave a trail")
        .changed();

    changed
}

fn capacity(ui: &mut Ui, config: &mut SimulationConfig, state: &mut WindowState) {
    let mut limited = config.max_bodies.is_some();
    ui.horizontal(|ui| {
        if ui.add(Checkbox::new(&mut limited, "Limit bodies")).changed() {
            config.max_bodies = limited.then_some(state.last_cap);
        }
        if let Some(max) = &mut config.max_bodies
            && ui.add(DragValue::new(max).range(BODY_CAP_RANGE)).changed()
        {
            state.last_cap = *max;
        }
    });

    ui.add_enabled_ui(limited, |ui| {
        ComboBox::from_id_salt(CAPACITY_POLICY_COMBO_BOX_SALT)
            .selected_text(config.capacity_policy.name())
            .show_ui(ui, |ui| {
                for policy in CapacityPolicy::iter() {
                    ui.selectable_value(&mut config.capacity_policy, policy, policy.name())
                        .on_hover_text(policy.description());
                }
            });
    });
}

fn remember(config: &SimulationConfig) {
    let Ok(cfg) = CONFIG.try_lock() else {
        return;
    };
    if let Err(e) = cfg.remember(config) {
        warn!("could not save settings: {e}");
    }
}

fn restore_defaults(config: &mut SimulationConfig) {
    let Ok(mut cfg) = CONFIG.try_lock() else {
        return;
    };
    if let Err(e) = cfg.reset() {
        warn!("could not delete saved settings: {e}");
    }
    cfg.apply_to(config);
}
