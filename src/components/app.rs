use std::cell::RefCell;
use std::rc::Rc;

use super::{failure_overlay::FailureOverlay, game_view::GameView, home::Home};
use crate::config::AppConfig;
use crate::model::ControlScheme;
use crate::state::{
    Bootstrap, EngineToken, LaunchParams, SessionBootstrap, SessionChooser, SessionDescriptor,
};
use crate::util::restart_without_session;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct AppProps {
    pub params: LaunchParams,
    pub config: AppConfig,
}

#[derive(PartialEq, Clone)]
enum View {
    Home,
    Game {
        session: SessionDescriptor,
        scheme: ControlScheme,
    },
    Refused(String),
}

/// Holds the engine token until the game screen consumes it.
#[derive(Clone)]
pub struct TokenSlot(Rc<RefCell<Option<EngineToken>>>);

impl TokenSlot {
    pub fn take(&self) -> Option<EngineToken> {
        self.0.borrow_mut().take()
    }
}

impl PartialEq for TokenSlot {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

#[function_component(App)]
pub fn app(props: &AppProps) -> Html {
    let token = use_mut_ref(|| None::<EngineToken>);
    let chooser = use_mut_ref(|| None::<SessionChooser>);
    let join_error = use_state(|| None::<String>);

    // The bootstrap runs once per tab; the initializer is never called again.
    let view = {
        let params = props.params.clone();
        let token = token.clone();
        let chooser = chooser.clone();
        use_state(move || match SessionBootstrap::begin(&params) {
            Ok(Bootstrap::Ready(t)) => {
                let session = t.descriptor().clone();
                *token.borrow_mut() = Some(t);
                View::Game {
                    session,
                    scheme: ControlScheme::Single,
                }
            }
            Ok(Bootstrap::Chooser(c)) => {
                *chooser.borrow_mut() = Some(c);
                View::Home
            }
            Err(e) => View::Refused(e.to_string()),
        })
    };

    let on_host = {
        let token = token.clone();
        let chooser = chooser.clone();
        let view = view.clone();
        Callback::from(move |scheme: ControlScheme| {
            let Some(c) = chooser.borrow_mut().take() else {
                log::warn!("host ignored, session already chosen");
                return;
            };
            let t = c.host();
            let session = t.descriptor().clone();
            *token.borrow_mut() = Some(t);
            view.set(View::Game { session, scheme });
        })
    };

    let on_join = {
        let token = token.clone();
        let chooser = chooser.clone();
        let view = view.clone();
        let join_error = join_error.clone();
        Callback::from(move |input: String| {
            let Some(c) = chooser.borrow_mut().take() else {
                log::warn!("join ignored, session already chosen");
                return;
            };
            match c.join(&input) {
                Ok(t) => {
                    let session = t.descriptor().clone();
                    *token.borrow_mut() = Some(t);
                    join_error.set(None);
                    view.set(View::Game {
                        session,
                        scheme: ControlScheme::Single,
                    });
                }
                Err((c, e)) => {
                    log::warn!("join rejected: {e}");
                    *chooser.borrow_mut() = Some(c);
                    join_error.set(Some(e.to_string()));
                }
            }
        })
    };

    match &*view {
        View::Home => html! { <Home
            on_host={on_host}
            on_join={on_join}
            join_error={(*join_error).clone()}
        /> },
        View::Game { session, scheme } => html! { <GameView
            session={session.clone()}
            scheme={*scheme}
            token={TokenSlot(token.clone())}
            match_config={props.config.match_config}
        /> },
        View::Refused(reason) => html! { <FailureOverlay
            reason={Some(reason.clone())}
            new_game={Callback::from(|_| restart_without_session())}
        /> },
    }
}
