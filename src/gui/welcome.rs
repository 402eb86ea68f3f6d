use gravity_trails_demo::cfg::CONFIG;
use log::warn;
use three_d::egui::{Color32, Ui, Window};

use super::{EguiContext, MIN_TOUCH_TARGET_VEC};

pub(super) struct WindowState {
    open: bool,
    dont_show_again: bool,
}

impl Default for WindowState {
    fn default() -> Self {
        Self {
            open: CONFIG
                .try_lock()
                .map(|c| c.show_welcome_window.get())
                .unwrap_or(true),
            dont_show_again: false,
        }
    }
}

pub(super) fn draw(ctx: &EguiContext, state: &mut WindowState) {
    let mut open = state.open;
    Window::new("Welcome")
        .open(&mut open)
        .vscroll(true)
        .default_height(360.0)
        .show(ctx, |ui| draw_window_contents(ui, state));
    state.open &= open;
}

fn draw_window_contents(ui: &mut Ui, state: &mut WindowState) {
    ui.spacing_mut().interact_size = MIN_TOUCH_TARGET_VEC;
    ui.visuals_mut().override_text_color = Some(Color32::WHITE);
    ui.heading("Gravity Trails");
    ui.label(
        "Every body you spawn falls toward the orange attractor in the middle, \
            tracing a red trail behind it.\n\n\
            Press Space, or tap or click the scene without dragging, to spawn a body. \
            Holding the key down spawns only one.\n\
            Drag to orbit the camera and scroll to zoom.\n\
            Press P to pause or resume.\n\n\
            The Controls window changes size, speed, gravity and trails for bodies \
            spawned from then on; bodies already in flight keep their settings.",
    );
    ui.separator();
    let cb = ui.checkbox(&mut state.dont_show_again, "Don't show this window again");
    if cb.changed()
        && let Ok(cfg) = CONFIG.try_lock()
        && let Err(e) = cfg.show_welcome_window.set(!state.dont_show_again)
    {
        warn!("could not save welcome window preference: {e}");
    }
}
