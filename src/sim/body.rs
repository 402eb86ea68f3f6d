use std::{error::Error, fmt};

use glam::DVec3;

use super::{attractor::AttractorField, trail::TrailBuffer};

pub type BodyId = u64;

/// A point mass falling toward the attractor.
///
/// Everything that tunes a body's motion (its field strength, no-force
/// radius, size and whether it leaves a trail) is frozen when it is
/// spawned. Later config changes only affect bodies spawned afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Body {
    id: BodyId,
    position: DVec3,
    velocity: DVec3,
    radius: f64,
    field: AttractorField,
    show_trail: bool,
    trail: TrailBuffer,
}

/// A read-only copy of a body's state, handed to the renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct BodyView {
    pub id: BodyId,
    pub position: DVec3,
    pub radius: f64,
    pub trail: Box<[DVec3]>,
}

/// The body would have left the representable range this tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NonFiniteStateError {
    pub id: BodyId,
    pub velocity: DVec3,
    pub position: DVec3,
}

impl fmt::Display for NonFiniteStateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "body {} went non-finite (velocity {}, position {})",
            self.id, self.velocity, self.position
        )
    }
}

impl Error for NonFiniteStateError {}

impl Body {
    pub(crate) fn new(
        id: BodyId,
        position: DVec3,
        velocity: DVec3,
        radius: f64,
        field: AttractorField,
        show_trail: bool,
        trail_capacity: usize,
    ) -> Self {
        Self {
            id,
            position,
            velocity,
            radius,
            field,
            show_trail,
            trail: TrailBuffer::new(trail_capacity),
        }
    }

    /// Advances the body by one tick under `force`.
    ///
    /// Velocity is updated first, then position from the new velocity.
    /// If either would stop being finite, nothing is changed and an error
    /// is returned so the owner can decide what to do with the body.
    pub fn integrate(&mut self, force: DVec3) -> Result<(), NonFiniteStateError> {
        let velocity = self.velocity + force;
        let position = self.position + velocity;

        if !velocity.is_finite() || !position.is_finite() {
            return Err(NonFiniteStateError {
                id: self.id,
                velocity,
                position,
            });
        }

        self.velocity = velocity;
        self.position = position;

        if self.show_trail {
            self.trail.push(position);
        }

        Ok(())
    }

    /// Evaluates this body's own field at its current position.
    #[inline]
    pub fn current_force(&self) -> DVec3 {
        self.field.force_at(self.position)
    }

    pub fn view(&self) -> BodyView {
        BodyView {
            id: self.id,
            position: self.position,
            radius: self.radius,
            trail: self.trail.snapshot(),
        }
    }

    #[inline]
    pub fn id(&self) -> BodyId {
        self.id
    }

    #[inline]
    pub fn position(&self) -> DVec3 {
        self.position
    }

    #[inline]
    pub fn velocity(&self) -> DVec3 {
        self.velocity
    }

    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// The field this body was spawned under.
    #[inline]
    pub fn field(&self) -> &AttractorField {
        &self.field
    }

    #[inline]
    pub fn shows_trail(&self) -> bool {
        self.show_trail
    }

    #[inline]
    pub fn trail(&self) -> &TrailBuffer {
        &self.trail
    }
}
