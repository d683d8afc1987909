use thiserror::Error;

/// Rejections of a session id typed into the join field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BootstrapError {
    #[error("session id is empty")]
    EmptySessionId,
    #[error("session id {0:?} contains whitespace or control characters")]
    MalformedSessionId(String),
    #[error("this tab already chose its session")]
    AlreadyBootstrapped,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("expected 1 or 2 player intents, got {0}")]
    PlayerCount(usize),
    #[error("failed to encode state update: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("2d canvas context is unavailable")]
    ContextUnavailable,
    #[error("canvas call failed: {0}")]
    Canvas(String),
}

impl From<wasm_bindgen::JsValue> for RenderError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        RenderError::Canvas(format!("{value:?}"))
    }
}

/// A frame that could not be completed. The loop stops on the first one.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("simulation engine failed: {0}")]
    Engine(#[from] EngineError),
    #[error("renderer failed: {0}")]
    Render(#[from] RenderError),
    #[error("next frame could not be scheduled: {0}")]
    Schedule(String),
}

/// The game screen could not get a match going.
#[derive(Debug, Error)]
pub enum StartError {
    #[error("this tab already started its engine")]
    TokenSpent,
    #[error("browser window is unavailable")]
    NoWindow,
    #[error("canvas element is not mounted")]
    NoCanvas,
    #[error("could not listen for keyboard input: {0}")]
    Listener(String),
    #[error("simulation engine failed to start: {0}")]
    Engine(#[from] EngineError),
    #[error("renderer failed to start: {0}")]
    Render(#[from] RenderError),
    #[error("game loop failed to start: {0}")]
    Loop(#[from] FrameError),
}
