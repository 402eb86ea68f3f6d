use gravity_trails_demo::input::{TriggerEvent, TriggerSource};
use three_d::{Event, Key, MouseButton};

use super::SimState;

/// Trigger event for a key going down or up, if the key spawns bodies.
fn key_trigger(key: Key, pressed: bool) -> Option<TriggerEvent> {
    match (key, pressed) {
        (Key::Space, true) => Some(TriggerEvent::Press(TriggerSource::Key)),
        (Key::Space, false) => Some(TriggerEvent::Release(TriggerSource::Key)),
        _ => None,
    }
}

pub(super) fn handle_keybinds(sim_state: &mut SimState, events: &mut [Event]) {
    for event in events {
        match event {
            Event::KeyPress { kind, handled, .. } => {
                if *kind == Key::P {
                    handle_pause(sim_state, handled);
                } else if let Some(trigger) = key_trigger(*kind, true)
                    && !*handled
                {
                    fire(sim_state, trigger, handled);
                }
            }
            // Releases always reach the trigger, even ones the GUI consumed,
            // so a press that started over the scene is never left latched.
            Event::KeyRelease { kind, handled, .. } => {
                if let Some(trigger) = key_trigger(*kind, false) {
                    fire(sim_state, trigger, handled);
                }
            }
            Event::MousePress {
                button: MouseButton::Left,
                handled,
                ..
            } => {
                if !*handled {
                    sim_state.tap.press();
                }
            }
            Event::MouseMotion { delta, .. } => sim_state.tap.motion(delta.0, delta.1),
            Event::MouseRelease {
                button: MouseButton::Left,
                handled,
                ..
            } => {
                for &trigger in sim_state.tap.release() {
                    fire(sim_state, trigger, handled);
                }
            }
            Event::MouseLeave => {
                sim_state.tap.cancel();
                sim_state
                    .trigger
                    .handle(TriggerEvent::Release(TriggerSource::Touch));
            }
            _ => (),
        }
    }
}

fn fire(sim_state: &mut SimState, trigger: TriggerEvent, handled: &mut bool) {
    if sim_state.trigger.handle(trigger) {
        sim_state.spawn();
        *handled = true;
    }
}

fn handle_pause(sim_state: &mut SimState, handled: &mut bool) {
    if *handled {
        return;
    }
    sim_state.simulation.toggle_paused();
    *handled = true;
}
