//! Session bootstrap: picks the tab's role and hands the engine its session
//! exactly once.

use std::cell::Cell;
use std::collections::HashMap;

use crate::config::MatchConfig;
use crate::engine::SimulationEngine;
use crate::error::{BootstrapError, EngineError};

pub const SESSION_ID_PARAM: &str = "session_id";
pub const IS_HOST_PARAM: &str = "is_host";

/// Query parameters the page was opened with.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LaunchParams {
    values: HashMap<String, String>,
}

impl LaunchParams {
    /// Later duplicates win, matching `URLSearchParams` iteration order.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Everything but the session choice, for opening a fresh chooser with
    /// the same settings.
    pub fn without_session(&self) -> Self {
        Self {
            values: self
                .values
                .iter()
                .filter(|(k, _)| *k != SESSION_ID_PARAM && *k != IS_HOST_PARAM)
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionDescriptor {
    session_id: String,
    is_host: bool,
}

impl SessionDescriptor {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn is_host(&self) -> bool {
        self.is_host
    }

    /// Query pairs that make a page open as a joiner of this session.
    pub fn join_query(&self) -> [(&'static str, &str); 2] {
        [
            (SESSION_ID_PARAM, self.session_id.as_str()),
            (IS_HOST_PARAM, "false"),
        ]
    }
}

fn generate_session_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

pub enum Bootstrap {
    /// The URL carried a session; no user interaction needed.
    Ready(EngineToken),
    /// Waiting for the user to host or join.
    Chooser(SessionChooser),
}

thread_local! {
    // wasm runs the page on one thread, so this is per tab
    static BOOTSTRAPPED: Cell<bool> = const { Cell::new(false) };
}

pub struct SessionBootstrap;

impl SessionBootstrap {
    /// Decides the tab's session. Only the first call in a tab succeeds.
    pub fn begin(params: &LaunchParams) -> Result<Bootstrap, BootstrapError> {
        if BOOTSTRAPPED.with(|b| b.replace(true)) {
            log::error!("session bootstrap attempted twice");
            return Err(BootstrapError::AlreadyBootstrapped);
        }
        Ok(match params.get(SESSION_ID_PARAM) {
            Some(id) if !id.trim().is_empty() => {
                let is_host = params.get(IS_HOST_PARAM) == Some("true");
                log::info!("session {id} taken from url, host: {is_host}");
                Bootstrap::Ready(EngineToken::new(SessionDescriptor {
                    session_id: id.to_string(),
                    is_host,
                }))
            }
            _ => Bootstrap::Chooser(SessionChooser { _private: () }),
        })
    }

    /// A bootstrap as if the tab had just been opened.
    #[cfg(test)]
    pub(crate) fn begin_fresh(params: &LaunchParams) -> Bootstrap {
        BOOTSTRAPPED.with(|b| b.set(false));
        Self::begin(params).unwrap()
    }
}

/// The host/join choice. Either action consumes it, so only one session can
/// ever come out of a tab.
#[derive(Debug)]
pub struct SessionChooser {
    _private: (),
}

impl SessionChooser {
    pub fn host(self) -> EngineToken {
        let session_id = generate_session_id();
        log::info!("hosting new session {session_id}");
        EngineToken::new(SessionDescriptor {
            session_id,
            is_host: true,
        })
    }

    /// On rejection the chooser comes back so the user can try again.
    pub fn join(self, input: &str) -> Result<EngineToken, (Self, BootstrapError)> {
        let id = input.trim();
        if id.is_empty() {
            return Err((self, BootstrapError::EmptySessionId));
        }
        if id.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err((self, BootstrapError::MalformedSessionId(id.to_string())));
        }
        log::info!("joining session {id}");
        Ok(EngineToken::new(SessionDescriptor {
            session_id: id.to_string(),
            is_host: false,
        }))
    }
}

/// One-shot capability to call the engine entry point.
#[derive(Debug)]
pub struct EngineToken {
    descriptor: SessionDescriptor,
}

impl EngineToken {
    fn new(descriptor: SessionDescriptor) -> Self {
        Self { descriptor }
    }

    pub fn descriptor(&self) -> &SessionDescriptor {
        &self.descriptor
    }

    pub fn launch<E: SimulationEngine>(self, config: &MatchConfig) -> Result<Launched<E>, EngineError> {
        let engine = E::init(&self.descriptor, config)?;
        log::info!(
            "engine started for session {} (host: {})",
            self.descriptor.session_id,
            self.descriptor.is_host
        );
        Ok(Launched {
            session: self.descriptor,
            engine,
        })
    }
}

/// An initialised engine together with the session it was started for. Only
/// [`EngineToken::launch`] builds one.
pub struct Launched<E> {
    session: SessionDescriptor,
    engine: E,
}

impl<E> Launched<E> {
    pub fn into_parts(self) -> (SessionDescriptor, E) {
        (self.session, self.engine)
    }
}
