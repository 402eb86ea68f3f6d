use std::{error::Error, fmt};

use glam::DVec3;

/// Returned when a vector has no direction to normalize to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZeroLengthError {
    pub vector: DVec3,
}

impl fmt::Display for ZeroLengthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cannot normalize {} as it has zero or non-finite length",
            self.vector
        )
    }
}

impl Error for ZeroLengthError {}

/// Normalizes `vector`, refusing zero-length and non-finite inputs
/// instead of producing NaN components.
pub fn checked_normalize(vector: DVec3) -> Result<DVec3, ZeroLengthError> {
    vector.try_normalize().ok_or(ZeroLengthError { vector })
}
