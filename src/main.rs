use gravity_trails_demo::{
    cfg::CONFIG,
    sim::{Simulation, SimulationConfig},
};
use log::{error, info, warn};
use three_d::{
    AmbientLight, Attenuation, Camera, ClearState, Context, Degrees, FrameInput, FrameOutput, GUI,
    OrbitControl, PointLight, Srgba, Vec3, Viewport,
    window::{Window, WindowSettings},
};

use self::gui::SimState;

mod gfx;
mod gui;
mod keybinds;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    Program::new().run();
}

pub(crate) struct Program {
    window: Option<Window>,
    context: Context,
    camera: Camera,
    control: OrbitControl,
    gui: GUI,

    attractor_light: PointLight,
    ambient_light: AmbientLight,

    sim_state: SimState,
}

impl Program {
    const CAMERA_START: Vec3 = Vec3::new(15.0, 15.0, 15.0);

    const LIGHT_COLOR: Srgba = Srgba::new_opaque(255, 165, 0);
    const LIGHT_INTENSITY: f32 = 10.0;
    /// Full strength at 10 units from the attractor, under 5% past 50.
    const LIGHT_ATTENUATION: Attenuation = Attenuation {
        constant: 1.0,
        linear: 0.0,
        quadratic: 0.09,
    };
    const AMBIENT_INTENSITY: f32 = 0.3;

    fn new_window() -> Window {
        let res = Window::new(WindowSettings {
            title: "Gravity Trails".into(),
            min_size: (64, 64),
            ..Default::default()
        });
        match res {
            Ok(w) => w,
            Err(e) => {
                error!("Error when creating window: {e}");
                std::process::exit(1);
            }
        }
    }
    fn new_camera(viewport: Viewport) -> Camera {
        Camera::new_perspective(
            viewport,
            Self::CAMERA_START,
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Degrees { 0: 75.0 },
            0.1,
            1000.0,
        )
    }
    fn new_control() -> OrbitControl {
        OrbitControl::new(Vec3::new(0.0, 0.0, 0.0), 6.0, 400.0)
    }
    /// Orange light sitting inside the attractor.
    fn new_attractor_light(context: &Context, simulation: &Simulation) -> PointLight {
        let center = simulation.center();
        PointLight::new(
            context,
            Self::LIGHT_INTENSITY,
            Self::LIGHT_COLOR,
            Vec3::new(center.x as f32, center.y as f32, center.z as f32),
            Self::LIGHT_ATTENUATION,
        )
    }
    fn new_ambient_light(context: &Context) -> AmbientLight {
        AmbientLight::new(context, Self::AMBIENT_INTENSITY, Srgba::WHITE)
    }

    fn new_simulation() -> Simulation {
        let mut config = SimulationConfig::default();
        match CONFIG.lock() {
            Ok(cfg) => cfg.apply_to(&mut config),
            Err(e) => warn!("preferences unavailable, using defaults: {e}"),
        }
        info!(
            "starting with size {}, speed {}, G {}, trails {}",
            config.body_radius, config.speed, config.gravity, config.show_trails
        );
        Simulation::new(config)
    }

    pub(crate) fn new() -> Self {
        let window = Self::new_window();
        let context = window.gl();
        let camera = Self::new_camera(window.viewport());
        let control = Self::new_control();
        let gui = gui::create(&context);

        let simulation = Self::new_simulation();
        let attractor_light = Self::new_attractor_light(&context, &simulation);
        let ambient_light = Self::new_ambient_light(&context);

        Self {
            window: Some(window),
            context,
            camera,
            control,
            gui,
            attractor_light,
            ambient_light,
            sim_state: SimState::new(simulation),
        }
    }

    pub(crate) fn run(mut self) {
        if let Some(window) = self.window.take() {
            window.render_loop(move |frame_input| self.tick(frame_input));
        }
    }

    fn tick(&mut self, mut frame_input: FrameInput) -> FrameOutput {
        gui::update(
            &mut self.gui,
            &mut self.sim_state,
            &mut frame_input.events,
            frame_input.accumulated_time,
            frame_input.viewport,
            frame_input.device_pixel_ratio,
            frame_input.elapsed_time,
        );

        keybinds::handle_keybinds(&mut self.sim_state, &mut frame_input.events);

        self.camera.set_viewport(frame_input.viewport);
        self.control
            .handle_events(&mut self.camera, &mut frame_input.events);

        let report = self.sim_state.simulation.step();
        self.sim_state.record(report);

        let scene = self.to_objects();

        let res = frame_input
            .screen()
            .clear(ClearState::color_and_depth(0.0, 0.0, 0.0, 1.0, 1.0))
            .render(
                &self.camera,
                scene.objects(),
                &[&self.attractor_light, &self.ambient_light],
            )
            .write(|| self.gui.render());

        if let Err(e) = res {
            error!("failed to draw the interface: {e}");
        }

        FrameOutput::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn light_at(distance: f32) -> f32 {
        let Attenuation {
            constant,
            linear,
            quadratic,
        } = Program::LIGHT_ATTENUATION;
        Program::LIGHT_INTENSITY / (constant + linear * distance + quadratic * distance * distance)
    }

    #[test]
    fn test_attractor_light_fades_by_fifty_units() {
        assert!(light_at(0.0) >= Program::LIGHT_INTENSITY);
        assert!((light_at(10.0) - 1.0).abs() < 1e-5);
        assert!(light_at(50.0) < 0.05 * Program::LIGHT_INTENSITY);
        assert!(light_at(50.0) < Program::AMBIENT_INTENSITY);
    }
}
