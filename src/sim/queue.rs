use std::{error::Error, fmt};

use crossbeam_channel::{Receiver, Sender, TryIter};

use super::config::SimulationConfig;

/// A spawn asked for from outside the thread that drives the simulation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpawnRequest {
    /// Parameters to spawn with. `None` uses the simulation's config at the
    /// time the request is drained.
    pub config: Option<SimulationConfig>,
}

/// Cloneable handle for requesting spawns from any thread.
///
/// Requests are buffered and applied at the start of the next
/// [`Simulation::step`](super::Simulation::step). The buffer is unbounded
/// and keeps growing while the simulation is paused; the body cap and its
/// [`CapacityPolicy`](super::CapacityPolicy) only apply once the requests
/// are drained.
#[derive(Clone, Debug)]
pub struct SpawnQueue {
    sender: Sender<SpawnRequest>,
}

/// The simulation the queue fed has been dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpawnQueueClosed;

impl fmt::Display for SpawnQueueClosed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "the simulation behind this spawn queue no longer exists")
    }
}

impl Error for SpawnQueueClosed {}

impl SpawnQueue {
    /// Requests one spawn with whatever config is current when it is applied.
    pub fn request(&self) -> Result<(), SpawnQueueClosed> {
        self.send(SpawnRequest::default())
    }

    /// Requests one spawn with a fixed config.
    pub fn request_with(&self, config: SimulationConfig) -> Result<(), SpawnQueueClosed> {
        self.send(SpawnRequest {
            config: Some(config),
        })
    }

    pub fn send(&self, request: SpawnRequest) -> Result<(), SpawnQueueClosed> {
        self.sender.send(request).map_err(|_| SpawnQueueClosed)
    }
}

/// Receiving end, owned by the simulation.
#[derive(Debug)]
pub(crate) struct SpawnInbox {
    sender: Sender<SpawnRequest>,
    receiver: Receiver<SpawnRequest>,
}

impl SpawnInbox {
    pub(crate) fn new() -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self { sender, receiver }
    }

    pub(crate) fn handle(&self) -> SpawnQueue {
        SpawnQueue {
            sender: self.sender.clone(),
        }
    }

    pub(crate) fn pending(&self) -> usize {
        self.receiver.len()
    }

    /// Yields every request sent so far without blocking.
    pub(crate) fn drain(&self) -> TryIter<'_, SpawnRequest> {
        self.receiver.try_iter()
    }

    pub(crate) fn discard(&self) -> usize {
        self.drain().count()
    }
}
