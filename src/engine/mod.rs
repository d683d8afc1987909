//! Boundary to the simulation. The loop only ever talks to [`SimulationEngine`].

pub mod local;

pub use local::LocalEngine;

use crate::config::MatchConfig;
use crate::error::EngineError;
use crate::model::{FrameSnapshot, InputIntent};
use crate::state::SessionDescriptor;

pub trait SimulationEngine: Sized {
    /// Entry point; reached only through `EngineToken::launch`.
    fn init(session: &SessionDescriptor, config: &MatchConfig) -> Result<Self, EngineError>;

    /// Advance one frame with the intents of every local player, own player first.
    fn step(&mut self, intents: &[InputIntent]) -> Result<(), EngineError>;

    /// Offered every frame on the host; the engine picks its own cadence.
    fn maybe_broadcast_state(&mut self) -> Result<(), EngineError>;

    fn check_reset_timer(&mut self) -> Result<(), EngineError>;

    fn snapshot(&self) -> Result<FrameSnapshot, EngineError>;
}
