use float_pretty_print::PrettyPrintFloat;
use three_d::egui::{
    Button, Color32, Context, CornerRadius, Frame, Margin, RichText, ScrollArea, Stroke,
    TopBottomPanel, Ui,
};

use super::{MIN_TOUCH_TARGET_LEN, MIN_TOUCH_TARGET_VEC, SimState, declare_id};

declare_id!(BOTTOM_PANEL, b"BluRigel");

pub(super) fn draw(ctx: &Context, sim_state: &mut SimState) {
    let height = 64.0;
    TopBottomPanel::bottom(*BOTTOM_PANEL_ID)
        .show_separator_line(false)
        .exact_height(height)
        .frame(Frame {
            inner_margin: Margin {
                top: 8,
                ..Default::default()
            },
            fill: Color32::from_black_alpha(192),
            ..Default::default()
        })
        .show(ctx, |ui| {
            ScrollArea::horizontal()
                .auto_shrink([false, false])
                .show(ui, |ui| ui.horizontal(|ui| bottom_panel_contents(ui, sim_state)))
        });
}

fn bottom_panel_contents(ui: &mut Ui, sim_state: &mut SimState) {
    ui.set_height(MIN_TOUCH_TARGET_LEN);
    ui.add_space(16.0);
    round_button(ui, sim_state, "+", "Spawn a body", SimState::spawn);

    let (glyph, hover) = if sim_state.simulation.is_paused() {
        ("▶", "Currently paused\nClick/tap to resume")
    } else {
        ("⏸", "Currently running\nClick/tap to pause")
    };
    round_button(ui, sim_state, glyph, hover, |s| s.simulation.toggle_paused());

    ui.add_space(12.0);
    ui.separator();
    ui.add_space(12.0);
    status(ui, sim_state);
}

fn round_button(
    ui: &mut Ui,
    sim_state: &mut SimState,
    glyph: &str,
    hover: &str,
    on_click: impl FnOnce(&mut SimState),
) {
    let hover_text = RichText::new(hover).color(Color32::WHITE).size(16.0);

    ui.scope(|ui| {
        let widget_styles = &mut ui.visuals_mut().widgets;
        widget_styles.inactive.weak_bg_fill = Color32::TRANSPARENT;
        widget_styles.inactive.bg_stroke = Stroke::NONE;
        widget_styles.hovered.weak_bg_fill = Color32::from_white_alpha(16);
        widget_styles.hovered.bg_stroke = Stroke::NONE;
        widget_styles.active.weak_bg_fill = Color32::from_white_alpha(64);

        let button = Button::new(RichText::new(glyph).size(24.0).color(Color32::WHITE))
            .min_size(MIN_TOUCH_TARGET_VEC)
            .corner_radius(CornerRadius::same(MIN_TOUCH_TARGET_LEN as u8));

        if ui.add(button).on_hover_text(hover_text).clicked() {
            on_click(sim_state);
        }
    });
}

fn status(ui: &mut Ui, sim_state: &SimState) {
    let simulation = &sim_state.simulation;
    let bodies = match simulation.config().max_bodies {
        Some(max) => format!("{}/{max}", simulation.len()),
        None => simulation.len().to_string(),
    };
    let gravity = PrettyPrintFloat(simulation.config().gravity);

    let mut string = format!(
        "Bodies: {bodies}   Tick: {}   G: {gravity:1.6}",
        simulation.tick_count()
    );
    if sim_state.dropped_total > 0 {
        string.push_str(&format!("   Lost: {}", sim_state.dropped_total));
    }

    ui.label(RichText::new(string).monospace().size(16.0).color(Color32::WHITE));
}
