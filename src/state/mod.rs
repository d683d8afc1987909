pub mod input;
pub mod scheduler;
pub mod session;

pub use input::LocalControls;
pub use scheduler::{FrameOutcome, FrameRequester, GameLoopScheduler};
pub use session::{
    Bootstrap, EngineToken, LaunchParams, SessionBootstrap, SessionChooser, SessionDescriptor,
};
