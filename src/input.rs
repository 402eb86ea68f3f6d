//! Turns raw press/release events into discrete spawn requests.

/// Where a trigger event came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerSource {
    /// The designated spawn key.
    Key,
    /// A touch, or the pointer button standing in for one.
    Touch,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerEvent {
    Press(TriggerSource),
    Release(TriggerSource),
}

/// One physical press, one spawn.
///
/// Windowing layers keep reporting presses while a key is held down. Each
/// source is latched on its first press and has to be released before it
/// can fire again.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpawnTrigger {
    key_held: bool,
    touch_held: bool,
}

impl SpawnTrigger {
    pub const fn new() -> Self {
        Self {
            key_held: false,
            touch_held: false,
        }
    }

    fn held_mut(&mut self, source: TriggerSource) -> &mut bool {
        match source {
            TriggerSource::Key => &mut self.key_held,
            TriggerSource::Touch => &mut self.touch_held,
        }
    }

    /// Returns `true` when `event` should spawn a body.
    pub fn handle(&mut self, event: TriggerEvent) -> bool {
        match event {
            TriggerEvent::Press(source) => {
                let held = self.held_mut(source);
                let fire = !*held;
                *held = true;
                fire
            }
            TriggerEvent::Release(source) => {
                *self.held_mut(source) = false;
                false
            }
        }
    }

    /// Forgets every held source, e.g. when the window loses focus and the
    /// matching releases will never arrive.
    pub fn release_all(&mut self) {
        *self = Self::new();
    }

    pub fn is_held(&self, source: TriggerSource) -> bool {
        match source {
            TriggerSource::Key => self.key_held,
            TriggerSource::Touch => self.touch_held,
        }
    }
}

/// Tells a tap apart from a drag on the primary pointer.
///
/// Touch screens report a tap as a primary button press and release, the
/// same as the start and end of a camera drag. A release counts as a tap
/// only if the pointer travelled at most [`TapDetector::SLOP`] pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TapDetector {
    down: bool,
    travel: f32,
}

impl TapDetector {
    /// Pointer travel, in pixels, that still counts as a tap.
    pub const SLOP: f32 = 8.0;

    pub const fn new() -> Self {
        Self {
            down: false,
            travel: 0.0,
        }
    }

    pub fn press(&mut self) {
        self.down = true;
        self.travel = 0.0;
    }

    pub fn motion(&mut self, dx: f32, dy: f32) {
        if self.down {
            self.travel += dx.hypot(dy);
        }
    }

    /// Returns the trigger events for the gesture that just ended: a
    /// press and release of [`TriggerSource::Touch`] for a tap, nothing
    /// for a drag or a release without a matching press.
    pub fn release(&mut self) -> &'static [TriggerEvent] {
        static TAP: [TriggerEvent; 2] = [
            TriggerEvent::Press(TriggerSource::Touch),
            TriggerEvent::Release(TriggerSource::Touch),
        ];

        let tap = self.down && self.travel <= Self::SLOP;
        self.cancel();
        if tap { &TAP } else { &[] }
    }

    /// Forgets the gesture in progress.
    pub fn cancel(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Simulation, SimulationConfig};

    use super::TriggerEvent::{Press, Release};
    use super::TriggerSource::{Key, Touch};

    #[test]
    fn test_repeat_while_held_fires_once() {
        let mut trigger = SpawnTrigger::new();

        assert!(trigger.handle(Press(Key)));
        assert!(!trigger.handle(Press(Key)));
        assert!(!trigger.handle(Press(Key)));
        assert!(!trigger.handle(Release(Key)));
        assert!(trigger.handle(Press(Key)));
    }

    #[test]
    fn test_sources_are_independent() {
        let mut trigger = SpawnTrigger::new();

        assert!(trigger.handle(Press(Key)));
        assert!(trigger.handle(Press(Touch)));
        assert!(trigger.is_held(Key));
        trigger.handle(Release(Touch));
        assert!(!trigger.is_held(Touch));
        assert!(trigger.is_held(Key));
    }

    #[test]
    fn test_release_without_press() {
        let mut trigger = SpawnTrigger::new();
        assert!(!trigger.handle(Release(Touch)));
        assert!(trigger.handle(Press(Touch)));
    }

    #[test]
    fn test_release_all() {
        let mut trigger = SpawnTrigger::new();
        trigger.handle(Press(Key));
        trigger.release_all();
        assert!(trigger.handle(Press(Key)));
    }

    #[test]
    fn test_one_press_one_body() {
        let mut sim = Simulation::with_seed(SimulationConfig::default(), 1);
        let mut trigger = SpawnTrigger::new();

        let events = [Press(Key), Press(Key), Press(Key), Release(Key), Press(Touch)];
        for event in events {
            if trigger.handle(event) {
                sim.spawn().unwrap();
            }
        }

        assert_eq!(sim.len(), 2);
    }

    fn taps_to_spawns(sim: &mut Simulation, trigger: &mut SpawnTrigger, events: &[TriggerEvent]) {
        for &event in events {
            if trigger.handle(event) {
                sim.spawn().unwrap();
            }
        }
    }

    #[test]
    fn test_tap_fires_touch_trigger() {
        let mut tap = TapDetector::new();

        tap.press();
        tap.motion(1.0, 2.0);
        assert_eq!(tap.release(), &[Press(Touch), Release(Touch)]);
    }

    #[test]
    fn test_drag_does_not_fire() {
        let mut tap = TapDetector::new();

        tap.press();
        tap.motion(5.0, 0.0);
        tap.motion(0.0, 5.0);
        assert!(tap.release().is_empty());
    }

    #[test]
    fn test_release_without_press_does_not_fire() {
        let mut tap = TapDetector::new();
        assert!(tap.release().is_empty());

        tap.press();
        tap.cancel();
        assert!(tap.release().is_empty());
    }

    #[test]
    fn test_each_tap_spawns_one_body() {
        let mut sim = Simulation::with_seed(SimulationConfig::default(), 2);
        let mut trigger = SpawnTrigger::new();
        let mut tap = TapDetector::new();

        for _ in 0..3 {
            tap.press();
            let events = tap.release();
            taps_to_spawns(&mut sim, &mut trigger, events);
        }
        tap.press();
        tap.motion(40.0, 0.0);
        let events = tap.release();
        taps_to_spawns(&mut sim, &mut trigger, events);

        assert_eq!(sim.len(), 3);
        assert!(!trigger.is_held(Touch));
    }
}
