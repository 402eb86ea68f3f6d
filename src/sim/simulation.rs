use std::{collections::VecDeque, error::Error, f64::consts::TAU, fmt};

use glam::DVec3;
use log::{debug, info, warn};
use rand::{Rng, SeedableRng, rngs::StdRng};
use rayon::prelude::*;

use super::{
    attractor::AttractorField,
    body::{Body, BodyId, BodyView, NonFiniteStateError},
    config::{CapacityPolicy, ConfigError, SimulationConfig},
    queue::{SpawnInbox, SpawnQueue, SpawnRequest},
};

/// Owns every live body and advances them one tick at a time.
#[derive(Debug)]
pub struct Simulation {
    /// Live bodies, in spawn order.
    bodies: VecDeque<Body>,

    /// Tunables applied to the next spawn.
    config: SimulationConfig,

    /// Where the attractor sits.
    center: DVec3,

    /// The next ID to assign to a body.
    next_id: BodyId,

    /// Ticks advanced since creation or the last reset.
    tick_count: u64,

    state: RunState,
    rng: StdRng,
    inbox: SpawnInbox,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunState {
    #[default]
    Running,
    Paused,
}

/// What happened during one [`Simulation::step`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepReport {
    /// Bodies created from queued requests this tick.
    pub spawned: Vec<BodyId>,
    /// Queued requests that could not be honored.
    pub rejected: usize,
    /// Bodies removed because their state stopped being finite.
    pub dropped: Vec<NonFiniteStateError>,
}

#[non_exhaustive]
#[derive(Clone, Debug, PartialEq)]
pub enum SimError {
    InvalidConfig(ConfigError),
    CapacityExceeded { max: usize },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::InvalidConfig(e) => write!(f, "invalid simulation config: {e}"),
            SimError::CapacityExceeded { max } => {
                write!(f, "the simulation already holds its maximum of {max} bodies")
            }
        }
    }
}

impl Error for SimError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SimError::InvalidConfig(e) => Some(e),
            SimError::CapacityExceeded { .. } => None,
        }
    }
}

impl From<ConfigError> for SimError {
    fn from(value: ConfigError) -> Self {
        SimError::InvalidConfig(value)
    }
}

impl Simulation {
    /// Creates an empty simulation with an entropy-seeded random source.
    pub fn new(config: SimulationConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Creates an empty simulation whose spawns are reproducible.
    pub fn with_seed(config: SimulationConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: SimulationConfig, rng: StdRng) -> Self {
        Self {
            bodies: VecDeque::new(),
            config,
            center: DVec3::ZERO,
            next_id: 0,
            tick_count: 0,
            state: RunState::Running,
            rng,
            inbox: SpawnInbox::new(),
        }
    }

    /// Moves the attractor. Only affects bodies spawned afterwards.
    pub fn with_center(mut self, center: DVec3) -> Self {
        self.center = center;
        self
    }

    fn get_and_inc_id(&mut self) -> BodyId {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Spawns one body using the current config.
    pub fn spawn(&mut self) -> Result<BodyId, SimError> {
        let config = self.config.clone();
        self.spawn_with(&config)
    }

    /// Spawns one body using `config` instead of the current config.
    ///
    /// The body lands uniformly at random on the annulus between
    /// `min_distance + 1` and `spawn_radius` around the attractor, in the
    /// attractor's `z` plane. Each velocity component is drawn uniformly
    /// from `[-speed / 2, speed / 2]`.
    pub fn spawn_with(&mut self, config: &SimulationConfig) -> Result<BodyId, SimError> {
        config.validate()?;
        self.make_room(config)?;

        let position = self.random_spawn_position(config);
        let velocity = self.random_velocity(config.speed);
        let id = self.get_and_inc_id();

        self.bodies.push_back(Body::new(
            id,
            position,
            velocity,
            config.body_radius,
            AttractorField::new(self.center, config.gravity, config.min_distance),
            config.show_trails,
            config.max_trail_length,
        ));

        debug!("spawned body {id} at {position} with velocity {velocity}");

        Ok(id)
    }

    fn make_room(&mut self, config: &SimulationConfig) -> Result<(), SimError> {
        let Some(max) = config.max_bodies else {
            return Ok(());
        };

        if self.bodies.len() < max {
            return Ok(());
        }

        match config.capacity_policy {
            CapacityPolicy::Reject => Err(SimError::CapacityExceeded { max }),
            CapacityPolicy::EvictOldest => {
                while self.bodies.len() >= max
                    && let Some(evicted) = self.bodies.pop_front()
                {
                    info!("body limit of {max} reached, evicted body {}", evicted.id());
                }
                Ok(())
            }
        }
    }

    fn random_spawn_position(&mut self, config: &SimulationConfig) -> DVec3 {
        let angle = self.rng.gen_range(0.0..TAU);
        // Scaled by hand: `gen_range` panics once the width of the range
        // overflows, which any finite outer radius near `f64::MAX` does.
        let inner = config.inner_spawn_radius();
        let radius = inner + self.rng.r#gen::<f64>() * (config.spawn_radius - inner);

        self.center + DVec3::new(radius * angle.cos(), radius * angle.sin(), 0.0)
    }

    fn random_velocity(&mut self, speed: f64) -> DVec3 {
        let unit = DVec3::new(
            self.rng.gen_range(-0.5..=0.5),
            self.rng.gen_range(-0.5..=0.5),
            self.rng.gen_range(-0.5..=0.5),
        );
        unit * speed
    }

    /// Advances every body by one tick.
    ///
    /// Spawn requests queued through a [`SpawnQueue`] are applied first, so
    /// their bodies take part in this tick. Bodies are independent of each
    /// other and integrated in parallel; the call returns once all of them
    /// are done. Does nothing while paused, queued requests included: they
    /// stay buffered and meet the body cap at the first step after resuming.
    pub fn step(&mut self) -> StepReport {
        let mut report = StepReport::default();

        if self.state == RunState::Paused {
            return report;
        }

        self.apply_spawn_requests(&mut report);

        let dropped: Vec<NonFiniteStateError> = self
            .bodies
            .par_iter_mut()
            .filter_map(|body| {
                let force = body.current_force();
                body.integrate(force).err()
            })
            .collect();

        if !dropped.is_empty() {
            self.bodies
                .retain(|body| !dropped.iter().any(|e| e.id == body.id()));
            for error in &dropped {
                warn!("removed from the simulation: {error}");
            }
        }
        report.dropped = dropped;

        self.tick_count += 1;

        report
    }

    fn apply_spawn_requests(&mut self, report: &mut StepReport) {
        let requests: Vec<SpawnRequest> = self.inbox.drain().collect();

        for request in requests {
            let result = match request.config {
                Some(config) => self.spawn_with(&config),
                None => self.spawn(),
            };
            match result {
                Ok(id) => report.spawned.push(id),
                Err(e) => {
                    warn!("queued spawn refused: {e}");
                    report.rejected += 1;
                }
            }
        }
    }

    /// One rendered frame: a [`step`](Self::step) followed by a
    /// [`snapshot`](Self::snapshot).
    pub fn frame_tick(&mut self) -> Vec<BodyView> {
        self.step();
        self.snapshot()
    }

    /// Copies out the state of every body, in spawn order.
    pub fn snapshot(&self) -> Vec<BodyView> {
        self.bodies.iter().map(Body::view).collect()
    }

    /// Removes every body and drops pending spawn requests.
    ///
    /// IDs keep counting up from where they were.
    pub fn reset(&mut self) {
        let discarded = self.inbox.discard();
        info!(
            "simulation reset, removed {} bodies and {discarded} pending spawns",
            self.bodies.len()
        );
        self.bodies.clear();
        self.tick_count = 0;
    }

    pub fn remove_body(&mut self, id: BodyId) -> Option<Body> {
        let index = self.bodies.iter().position(|b| b.id() == id)?;
        self.bodies.remove(index)
    }

    /// A handle other threads can use to request spawns.
    pub fn spawn_queue(&self) -> SpawnQueue {
        self.inbox.handle()
    }

    /// Number of queued spawn requests not applied yet.
    pub fn pending_spawns(&self) -> usize {
        self.inbox.pending()
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.iter().find(|b| b.id() == id)
    }

    /// Live bodies, in spawn order.
    pub fn bodies(&self) -> impl ExactSizeIterator<Item = &Body> {
        self.bodies.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    #[inline]
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    #[inline]
    pub fn center(&self) -> DVec3 {
        self.center
    }

    #[inline]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Direct access to the config. It is validated on every spawn.
    #[inline]
    pub fn config_mut(&mut self) -> &mut SimulationConfig {
        &mut self.config
    }

    pub fn set_config(&mut self, config: SimulationConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    #[inline]
    pub fn run_state(&self) -> RunState {
        self.state
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.state == RunState::Paused
    }

    pub fn pause(&mut self) {
        self.state = RunState::Paused;
    }

    pub fn resume(&mut self) {
        self.state = RunState::Running;
    }

    pub fn toggle_paused(&mut self) {
        self.state = match self.state {
            RunState::Running => RunState::Paused,
            RunState::Paused => RunState::Running,
        };
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use std::thread;

    fn seeded(config: SimulationConfig) -> Simulation {
        Simulation::with_seed(config, 0x5EED)
    }

    /// Puts a body at an exact spot, bypassing the random spawn.
    fn place(sim: &mut Simulation, position: DVec3, velocity: DVec3) -> BodyId {
        let id = sim.get_and_inc_id();
        let config = &sim.config;
        let body = Body::new(
            id,
            position,
            velocity,
            config.body_radius,
            AttractorField::new(sim.center, config.gravity, config.min_distance),
            config.show_trails,
            config.max_trail_length,
        );
        sim.bodies.push_back(body);
        id
    }

    #[test]
    fn test_single_step_from_rest() {
        let mut sim = seeded(SimulationConfig {
            gravity: 0.5,
            min_distance: 6.0,
            ..Default::default()
        });
        let start = DVec3::new(0.0, 8.0, 0.0);
        let id = place(&mut sim, start, DVec3::ZERO);

        sim.step();

        let body = sim.body(id).unwrap();
        assert_relative_eq!(body.velocity().length(), 0.5 / 64.0, epsilon = 1e-15);
        assert_relative_eq!(body.velocity().length(), 0.0078125, epsilon = 1e-15);
        assert_relative_eq!(body.velocity().normalize().dot(-start.normalize()), 1.0);
        assert_eq!(body.position(), start + body.velocity());
        assert_eq!(body.trail().newest(), Some(body.position()));
    }

    #[test]
    fn test_no_force_inside_min_distance() {
        let mut sim = seeded(SimulationConfig::default());
        let velocity = DVec3::new(0.01, 0.02, -0.03);
        let id = place(&mut sim, DVec3::new(3.0, 0.0, 1.0), velocity);

        sim.step();

        let body = sim.body(id).unwrap();
        assert_eq!(body.velocity(), velocity);
        assert_eq!(body.position(), DVec3::new(3.0, 0.0, 1.0) + velocity);
    }

    #[test]
    fn test_attraction_is_monotonic() {
        let mut sim = seeded(SimulationConfig {
            speed: 1.0,
            max_bodies: None,
            ..Default::default()
        });
        for _ in 0..64 {
            sim.spawn().unwrap();
        }

        let before: Vec<(DVec3, DVec3)> =
            sim.bodies().map(|b| (b.position(), b.velocity())).collect();

        sim.step();

        for ((position, velocity), body) in before.into_iter().zip(sim.bodies()) {
            let toward_center = (sim.center() - position).normalize();
            let gain = (body.velocity() - velocity).dot(toward_center);
            assert!(gain > 0.0, "body {} did not accelerate inward", body.id());
        }
    }

    #[test]
    fn test_spawn_lands_on_annulus() {
        for seed in 0..32 {
            let center = DVec3::new(2.0, -3.0, 4.5);
            let config = SimulationConfig::default();
            let mut sim = Simulation::with_seed(config.clone(), seed).with_center(center);

            for _ in 0..16 {
                let id = sim.spawn().unwrap();
                let body = sim.body(id).unwrap();
                let distance = body.position().distance(center);

                assert!(distance >= config.min_distance + 1.0 - 1e-9, "{distance}");
                assert!(distance <= config.spawn_radius + 1e-9, "{distance}");
                assert_eq!(body.position().z, center.z);
                assert_eq!(body.field().center(), center);
            }
        }
    }

    #[test]
    fn test_spawn_with_huge_spawn_radius() {
        let config = SimulationConfig {
            spawn_radius: f64::MAX,
            ..Default::default()
        };
        assert_eq!(config.validate(), Ok(()));

        let mut sim = seeded(config.clone());
        for _ in 0..8 {
            let id = sim.spawn().unwrap();
            let position = sim.body(id).unwrap().position();
            assert!(position.is_finite());
            assert!(position.length() >= config.inner_spawn_radius() - 1e-9);
        }
        sim.step();
    }

    #[test]
    fn test_spawn_velocity_within_speed() {
        let mut sim = seeded(SimulationConfig {
            speed: 0.8,
            ..Default::default()
        });
        for _ in 0..100 {
            let id = sim.spawn().unwrap();
            let v = sim.body(id).unwrap().velocity();
            for component in v.to_array() {
                assert!((-0.4..=0.4).contains(&component), "{component}");
            }
        }
    }

    #[test]
    fn test_spawn_freezes_config() {
        let mut sim = seeded(SimulationConfig {
            body_radius: 1.0,
            speed: 0.0,
            ..Default::default()
        });
        let id = sim.spawn().unwrap();

        sim.config_mut().set_body_radius(2.5);
        sim.config_mut().set_gravity(6.0);
        sim.config_mut().show_trails = false;

        let body = sim.body(id).unwrap();
        assert_eq!(body.velocity(), DVec3::ZERO);
        assert_eq!(body.radius(), 1.0);
        assert_eq!(body.field().strength(), 0.5);
        assert!(body.shows_trail());

        let start = body.position();
        sim.step();

        let body = sim.body(id).unwrap();
        let distance = start.length();
        assert_relative_eq!(body.velocity().length(), 0.5 / (distance * distance), epsilon = 1e-12);
        assert_eq!(body.trail().len(), 1);

        let newer = sim.spawn().unwrap();
        let newer = sim.body(newer).unwrap();
        assert_eq!(newer.radius(), 2.5);
        assert_eq!(newer.field().strength(), 6.0);
        assert!(!newer.shows_trail());
    }

    #[test]
    fn test_same_seed_same_spawns() {
        let mut a = seeded(SimulationConfig::default());
        let mut b = seeded(SimulationConfig::default());
        for _ in 0..10 {
            a.spawn().unwrap();
            b.spawn().unwrap();
        }
        for _ in 0..50 {
            a.step();
            b.step();
        }
        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn test_iteration_order_does_not_matter() {
        let mut sim = seeded(SimulationConfig {
            speed: 0.5,
            ..Default::default()
        });
        for _ in 0..20 {
            sim.spawn().unwrap();
        }

        let mut reversed: Vec<Body> = sim.bodies().cloned().collect();
        for _ in 0..100 {
            sim.step();
            for body in reversed.iter_mut().rev() {
                let force = body.current_force();
                body.integrate(force).unwrap();
            }
        }

        for (expected, actual) in reversed.iter().zip(sim.bodies()) {
            assert_eq!(expected, actual);
        }
    }

    #[test]
    fn test_reject_when_full() {
        let mut sim = seeded(SimulationConfig {
            max_bodies: Some(2),
            capacity_policy: CapacityPolicy::Reject,
            ..Default::default()
        });
        sim.spawn().unwrap();
        sim.spawn().unwrap();

        assert_eq!(sim.spawn(), Err(SimError::CapacityExceeded { max: 2 }));
        assert_eq!(sim.len(), 2);
    }

    #[test]
    fn test_evict_oldest_when_full() {
        let mut sim = seeded(SimulationConfig {
            max_bodies: Some(2),
            capacity_policy: CapacityPolicy::EvictOldest,
            ..Default::default()
        });
        let first = sim.spawn().unwrap();
        let second = sim.spawn().unwrap();
        let third = sim.spawn().unwrap();

        let ids: Vec<BodyId> = sim.bodies().map(Body::id).collect();
        assert_eq!(ids, vec![second, third]);
        assert!(sim.body(first).is_none());
    }

    #[test]
    fn test_lowering_cap_evicts_down_to_it() {
        let mut sim = seeded(SimulationConfig {
            max_bodies: None,
            ..Default::default()
        });
        for _ in 0..5 {
            sim.spawn().unwrap();
        }
        sim.config_mut().max_bodies = Some(2);
        let newest = sim.spawn().unwrap();

        assert_eq!(sim.len(), 2);
        assert_eq!(sim.bodies().last().map(Body::id), Some(newest));
    }

    #[test]
    fn test_invalid_config_refused() {
        let mut sim = seeded(SimulationConfig::default());
        let config = SimulationConfig {
            body_radius: -1.0,
            ..Default::default()
        };
        assert_eq!(
            sim.spawn_with(&config),
            Err(SimError::InvalidConfig(ConfigError::NonPositiveBodyRadius(-1.0)))
        );
        assert!(sim.is_empty());
        assert!(sim.set_config(config).is_err());
    }

    #[test]
    fn test_non_finite_body_is_dropped() {
        let mut sim = seeded(SimulationConfig::default());
        let healthy = place(&mut sim, DVec3::new(9.0, 0.0, 0.0), DVec3::ZERO);
        let doomed = place(
            &mut sim,
            DVec3::new(f64::MAX, 0.0, 0.0),
            DVec3::new(f64::MAX, 0.0, 0.0),
        );

        let report = sim.step();

        assert_eq!(report.dropped.len(), 1);
        assert_eq!(report.dropped[0].id, doomed);
        assert!(sim.body(doomed).is_none());
        assert!(sim.body(healthy).is_some());
        for view in sim.snapshot() {
            assert!(view.position.is_finite());
        }
    }

    #[test]
    fn test_paused_step_is_noop() {
        let mut sim = seeded(SimulationConfig::default());
        sim.spawn().unwrap();
        sim.step();
        let before = sim.snapshot();

        sim.pause();
        sim.spawn_queue().request().unwrap();
        let report = sim.step();

        assert_eq!(report, StepReport::default());
        assert_eq!(sim.snapshot(), before);
        assert_eq!(sim.tick_count(), 1);
        assert_eq!(sim.pending_spawns(), 1);

        sim.toggle_paused();
        assert!(!sim.is_paused());
        let report = sim.step();
        assert_eq!(report.spawned.len(), 1);
        assert_eq!(sim.len(), 2);
    }

    #[test]
    fn test_queued_spawns_apply_at_next_step() {
        let mut sim = seeded(SimulationConfig {
            max_bodies: None,
            ..Default::default()
        });
        let queue = sim.spawn_queue();

        let producers: Vec<_> = (0..4)
            .map(|_| {
                let queue = queue.clone();
                thread::spawn(move || {
                    for _ in 0..5 {
                        queue.request().unwrap();
                    }
                })
            })
            .collect();
        for producer in producers {
            producer.join().unwrap();
        }

        assert!(sim.is_empty());
        assert_eq!(sim.pending_spawns(), 20);

        let report = sim.step();

        assert_eq!(report.spawned.len(), 20);
        assert_eq!(sim.len(), 20);
        assert_eq!(sim.pending_spawns(), 0);
        // integrated in the same tick they were created
        for body in sim.bodies() {
            assert_eq!(body.trail().len(), 1);
        }
    }

    #[test]
    fn test_queued_spawn_with_own_config() {
        let mut sim = seeded(SimulationConfig::default());
        let config = SimulationConfig {
            gravity: 3.0,
            body_radius: 2.0,
            ..Default::default()
        };
        sim.spawn_queue().request_with(config).unwrap();
        sim.spawn_queue().request().unwrap();

        let report = sim.step();

        let first = sim.body(report.spawned[0]).unwrap();
        assert_eq!(first.field().strength(), 3.0);
        assert_eq!(first.radius(), 2.0);
        let second = sim.body(report.spawned[1]).unwrap();
        assert_eq!(second.field().strength(), 0.5);
    }

    #[test]
    fn test_queued_spawn_rejected_when_full() {
        let mut sim = seeded(SimulationConfig {
            max_bodies: Some(1),
            capacity_policy: CapacityPolicy::Reject,
            ..Default::default()
        });
        let queue = sim.spawn_queue();
        queue.request().unwrap();
        queue.request().unwrap();

        let report = sim.step();
        assert_eq!(report.spawned.len(), 1);
        assert_eq!(report.rejected, 1);
    }

    #[test]
    fn test_requests_pile_up_while_paused() {
        let mut sim = seeded(SimulationConfig {
            max_bodies: Some(256),
            capacity_policy: CapacityPolicy::EvictOldest,
            ..Default::default()
        });
        let queue = sim.spawn_queue();
        sim.pause();
        for _ in 0..1000 {
            queue.request().unwrap();
        }

        sim.step();
        assert_eq!(sim.pending_spawns(), 1000);
        assert!(sim.is_empty());

        sim.resume();
        let report = sim.step();
        assert_eq!(report.spawned.len(), 1000);
        assert_eq!(report.rejected, 0);
        assert_eq!(sim.pending_spawns(), 0);
        assert_eq!(sim.len(), 256);
        let ids: Vec<BodyId> = sim.bodies().map(Body::id).collect();
        assert_eq!(ids, report.spawned[1000 - 256..]);
    }

    #[test]
    fn test_reset() {
        let mut sim = seeded(SimulationConfig::default());
        let first = sim.spawn().unwrap();
        sim.step();
        sim.spawn_queue().request().unwrap();

        sim.reset();

        assert!(sim.is_empty());
        assert_eq!(sim.tick_count(), 0);
        assert_eq!(sim.pending_spawns(), 0);

        let next = sim.spawn().unwrap();
        assert!(next > first);
    }

    #[test]
    fn test_remove_body() {
        let mut sim = seeded(SimulationConfig::default());
        let a = sim.spawn().unwrap();
        let b = sim.spawn().unwrap();

        let removed = sim.remove_body(a).unwrap();
        assert_eq!(removed.id(), a);
        assert!(sim.remove_body(a).is_none());
        assert_eq!(sim.bodies().map(Body::id).collect::<Vec<_>>(), vec![b]);
    }

    #[test]
    fn test_frame_tick_returns_post_step_state() {
        let mut sim = seeded(SimulationConfig::default());
        let id = sim.spawn().unwrap();
        let start = sim.body(id).unwrap().position();

        let views = sim.frame_tick();

        assert_eq!(views.len(), 1);
        assert_eq!(views[0].id, id);
        assert_ne!(views[0].position, start);
        assert_eq!(views[0].trail.len(), 1);
        assert_abs_diff_eq!(views[0].radius, 0.5);
    }

    #[test]
    fn test_trail_capped_over_long_run() {
        let mut sim = seeded(SimulationConfig {
            max_trail_length: 50,
            ..Default::default()
        });
        let id = sim.spawn().unwrap();
        for _ in 0..200 {
            sim.step();
        }
        let body = sim.body(id).unwrap();
        assert_eq!(body.trail().len(), 50);
        assert_eq!(body.trail().newest(), Some(body.position()));
    }
}
