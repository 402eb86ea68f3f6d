use std::collections::VecDeque;

use gravity_trails_demo::sim::Simulation;
use ordered_float::NotNan;
use three_d::egui::{Area, Color32, Context, FontId, Label, RichText, TextWrapMode, Ui};

use super::declare_id;

declare_id!(FPS_AREA, b"PerfArea");

pub(super) struct FrameData {
    frame_len_secs: VecDeque<NotNan<f64>>,
}

impl FrameData {
    const WINDOW_SIZE: usize = 600;

    pub(super) fn new() -> Self {
        Self {
            frame_len_secs: VecDeque::with_capacity(Self::WINDOW_SIZE),
        }
    }

    /// Returns NaN if no frames recorded yet
    fn get_average_fps(&self) -> f64 {
        let total: NotNan<f64> = self.frame_len_secs.iter().copied().sum();
        self.frame_len_secs.len() as f64 / *total
    }

    /// FPS over the slowest 1% of frames in the window.
    /// Returns NaN with fewer than 100 frames recorded.
    fn get_low_average(&self) -> f64 {
        let count = self.frame_len_secs.len() / 100;
        if count == 0 {
            return f64::NAN;
        }

        let mut sorted: Vec<NotNan<f64>> = self.frame_len_secs.iter().copied().collect();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        let slowest: NotNan<f64> = sorted[..count].iter().copied().sum();

        count as f64 / *slowest
    }

    pub(super) fn insert_frame_data(&mut self, frame_duration: NotNan<f64>) {
        if self.frame_len_secs.len() >= Self::WINDOW_SIZE {
            self.frame_len_secs.pop_front();
        }

        self.frame_len_secs.push_back(frame_duration);
    }
}

pub(super) fn fps_area(ctx: &Context, frame_data: &FrameData, simulation: &Simulation) {
    let pos = 12.0;
    Area::new(*FPS_AREA_ID)
        .constrain_to(ctx.screen_rect())
        .fixed_pos((pos, pos))
        .default_width(1000.0)
        .show(ctx, |ui| fps_inner(ui, frame_data, simulation));
}

fn fps_inner(ui: &mut Ui, frame_data: &FrameData, simulation: &Simulation) {
    let fps = frame_data.get_average_fps();
    let low = frame_data.get_low_average();
    let segments: usize = simulation
        .bodies()
        .filter(|b| b.shows_trail())
        .map(|b| b.trail().len().saturating_sub(1))
        .sum();

    let mut string = format!("FPS: {fps:.0}");
    if !low.is_nan() {
        string.push_str(&format!("\n1%L: {low:.0}"));
    }
    string.push_str(&format!("\nSeg: {segments}"));

    const BACKGROUND_COLOR: Color32 = Color32::from_rgba_premultiplied(0, 0, 0, 128);
    let font = FontId::monospace(11.0);
    let text = RichText::new(string)
        .background_color(BACKGROUND_COLOR)
        .color(Color32::WHITE)
        .font(font);
    let label = Label::new(text)
        .wrap_mode(TextWrapMode::Extend)
        .selectable(false);
    ui.add(label);
}
