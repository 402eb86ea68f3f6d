use gravity_trails_demo::{
    input::{SpawnTrigger, TapDetector},
    sim::{Simulation, StepReport},
};
use log::warn;
use ordered_float::NotNan;
use three_d::{
    Context as ThreeDContext, Event as ThreeDEvent, GUI, Viewport,
    egui::{Context as EguiContext, Vec2},
};

mod bottom_bar;
mod controls;
mod fps;
mod welcome;

macro_rules! declare_id {
    (salt_only, $name:ident, $val:expr) => {
        ::pastey::paste! {
            const [<$name _SALT>]: ::core::num::NonZeroU64 =
                ::core::num::NonZeroU64::new(u64::from_be_bytes(*$val)).unwrap();
        }
    };
    ($name:ident, $val:expr) => {
        ::pastey::paste! {
            const [<$name _SALT>]: ::core::num::NonZeroU64 =
                ::core::num::NonZeroU64::new(u64::from_be_bytes(*$val)).unwrap();
            const [<$name _ID>]: ::std::sync::LazyLock<::three_d::egui::Id> =
                ::std::sync::LazyLock::new(|| ::three_d::egui::Id::new([<$name _SALT>]));
        }
    };
}
use declare_id;

const MIN_TOUCH_TARGET_LEN: f32 = 48.0;
const MIN_TOUCH_TARGET_VEC: Vec2 = Vec2::splat(MIN_TOUCH_TARGET_LEN);

struct UiState {
    frame_data: fps::FrameData,
    welcome_window_state: welcome::WindowState,
    controls_window_state: controls::WindowState,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            frame_data: fps::FrameData::new(),
            welcome_window_state: welcome::WindowState::default(),
            controls_window_state: controls::WindowState::default(),
        }
    }
}

pub(crate) struct SimState {
    pub simulation: Simulation,
    pub trigger: SpawnTrigger,
    pub tap: TapDetector,
    /// Bodies lost to numeric overflow since the last reset.
    pub dropped_total: usize,
    ui: UiState,
}

impl SimState {
    pub(crate) fn new(simulation: Simulation) -> Self {
        Self {
            simulation,
            trigger: SpawnTrigger::new(),
            tap: TapDetector::new(),
            dropped_total: 0,
            ui: UiState::default(),
        }
    }

    pub(crate) fn record(&mut self, report: StepReport) {
        self.dropped_total += report.dropped.len();
    }

    pub(crate) fn spawn(&mut self) {
        if let Err(e) = self.simulation.spawn() {
            warn!("spawn refused: {e}");
        }
    }

    pub(crate) fn reset(&mut self) {
        self.simulation.reset();
        self.dropped_total = 0;
    }
}

pub(super) fn create(context: &ThreeDContext) -> GUI {
    GUI::new(context)
}

pub(super) fn update(
    gui: &mut GUI,
    sim_state: &mut SimState,
    events: &mut Vec<ThreeDEvent>,
    accumulated_time_ms: f64,
    viewport: Viewport,
    device_pixel_ratio: f32,
    elapsed_time: f64,
) -> bool {
    if let Ok(frame_duration) = NotNan::new(elapsed_time / 1000.0)
        && frame_duration.is_finite()
    {
        sim_state.ui.frame_data.insert_frame_data(frame_duration);
    }
    gui.update(
        events,
        accumulated_time_ms,
        viewport,
        device_pixel_ratio,
        |ctx| handle_ui(ctx, sim_state),
    )
}

fn handle_ui(ctx: &EguiContext, sim_state: &mut SimState) {
    fps::fps_area(ctx, &sim_state.ui.frame_data, &sim_state.simulation);
    welcome::draw(ctx, &mut sim_state.ui.welcome_window_state);
    bottom_bar::draw(ctx, sim_state);
    controls::draw(ctx, sim_state);
}
