use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{HtmlCanvasElement, KeyboardEvent, Window};
use yew::prelude::*;

use super::app::TokenSlot;
use super::{
    failure_overlay::FailureOverlay, game_over_overlay::GameOverOverlay,
    session_panel::SessionPanel,
};
use crate::config::MatchConfig;
use crate::engine::LocalEngine;
use crate::error::{FrameError, StartError};
use crate::model::{ControlScheme, Score};
use crate::render::CanvasRenderer;
use crate::state::{
    FrameOutcome, FrameRequester, GameLoopScheduler, LocalControls, SessionDescriptor,
};
use crate::util::restart_without_session;

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;
type KeyCallback = Closure<dyn FnMut(KeyboardEvent)>;
type Scheduler = GameLoopScheduler<Rc<RefCell<LocalControls>>, LocalEngine, CanvasRenderer>;

/// Schedules the loop on `requestAnimationFrame`.
struct AnimationFrameRequester {
    window: Window,
    callback: FrameCallback,
    pending: Option<i32>,
}

impl FrameRequester for AnimationFrameRequester {
    fn request_next_frame(&mut self) -> Result<(), FrameError> {
        let callback = self.callback.borrow();
        let cb = callback
            .as_ref()
            .ok_or_else(|| FrameError::Schedule("frame callback already dropped".into()))?;
        let id = self
            .window
            .request_animation_frame(cb.as_ref().unchecked_ref())
            .map_err(|e| FrameError::Schedule(format!("{e:?}")))?;
        self.pending = Some(id);
        Ok(())
    }

    fn cancel(&mut self) {
        if let Some(id) = self.pending.take() {
            let _ = self.window.cancel_animation_frame(id);
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Phase {
    Playing,
    Over(Score),
    Failed(String),
}

/// Everything a running match keeps alive until the screen unmounts.
struct RunningMatch {
    window: Window,
    scheduler: Rc<RefCell<Scheduler>>,
    frame_cb: FrameCallback,
    keydown_cb: KeyCallback,
    keyup_cb: KeyCallback,
}

impl RunningMatch {
    fn stop(self) {
        self.scheduler.borrow_mut().cancel();
        for (kind, cb) in [("keydown", &self.keydown_cb), ("keyup", &self.keyup_cb)] {
            let _ = self
                .window
                .remove_event_listener_with_callback(kind, cb.as_ref().unchecked_ref());
        }
        // breaks the scheduler -> requester -> closure -> scheduler cycle
        self.frame_cb.borrow_mut().take();
    }
}

fn key_listener(
    window: &Window,
    kind: &str,
    controls: Rc<RefCell<LocalControls>>,
    down: bool,
) -> Result<KeyCallback, StartError> {
    let cb = Closure::wrap(Box::new(move |e: KeyboardEvent| {
        let key = e.key();
        let bound = if down {
            controls.borrow_mut().on_key_down(&key)
        } else {
            controls.borrow_mut().on_key_up(&key)
        };
        if bound {
            e.prevent_default();
        }
    }) as Box<dyn FnMut(_)>);
    window
        .add_event_listener_with_callback(kind, cb.as_ref().unchecked_ref())
        .map_err(|e| StartError::Listener(format!("{e:?}")))?;
    Ok(cb)
}

fn start_match(
    canvas_ref: &NodeRef,
    token: &TokenSlot,
    scheme: ControlScheme,
    match_config: &MatchConfig,
    phase: UseStateHandle<Phase>,
) -> Result<RunningMatch, StartError> {
    let token = token.take().ok_or(StartError::TokenSpent)?;
    let window = web_sys::window().ok_or(StartError::NoWindow)?;
    let canvas = canvas_ref
        .cast::<HtmlCanvasElement>()
        .ok_or(StartError::NoCanvas)?;
    let renderer = CanvasRenderer::new(&canvas)?;
    let launched = token.launch::<LocalEngine>(match_config)?;

    let controls = Rc::new(RefCell::new(LocalControls::new(scheme)));
    let frame_cb: FrameCallback = Rc::new(RefCell::new(None));
    let requester = AnimationFrameRequester {
        window: window.clone(),
        callback: frame_cb.clone(),
        pending: None,
    };
    let scheduler = Rc::new(RefCell::new(GameLoopScheduler::new(
        launched,
        controls.clone(),
        renderer,
        Box::new(requester),
    )));

    {
        let scheduler = scheduler.clone();
        *frame_cb.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            let outcome = scheduler.borrow_mut().run_once();
            match outcome {
                Ok(FrameOutcome::Ended) => phase.set(Phase::Over(scheduler.borrow().score())),
                Ok(FrameOutcome::Continue | FrameOutcome::Stopped(_)) => {}
                Err(e) => phase.set(Phase::Failed(e.to_string())),
            }
        }) as Box<dyn FnMut()>));
    }

    let keydown_cb = key_listener(&window, "keydown", controls.clone(), true)?;
    let keyup_cb = match key_listener(&window, "keyup", controls, false) {
        Ok(cb) => cb,
        Err(e) => {
            let _ = window
                .remove_event_listener_with_callback("keydown", keydown_cb.as_ref().unchecked_ref());
            return Err(e);
        }
    };

    let running = RunningMatch {
        window,
        scheduler,
        frame_cb,
        keydown_cb,
        keyup_cb,
    };
    let started = running.scheduler.borrow_mut().start();
    if let Err(e) = started {
        running.stop();
        return Err(e.into());
    }
    Ok(running)
}

#[derive(Properties, PartialEq, Clone)]
pub struct GameViewProps {
    pub session: SessionDescriptor,
    pub scheme: ControlScheme,
    pub token: TokenSlot,
    pub match_config: MatchConfig,
}

#[function_component]
pub fn GameView(props: &GameViewProps) -> Html {
    let canvas_ref = use_node_ref();
    let phase = use_state(|| Phase::Playing);

    {
        let canvas_ref = canvas_ref.clone();
        let token = props.token.clone();
        let scheme = props.scheme;
        let match_config = props.match_config;
        let phase = phase.clone();
        use_effect_with((), move |_| {
            let started = start_match(&canvas_ref, &token, scheme, &match_config, phase.clone());
            let running = match started {
                Ok(running) => Some(running),
                Err(e) => {
                    log::error!("could not start the match: {e}");
                    phase.set(Phase::Failed(e.to_string()));
                    None
                }
            };
            move || {
                if let Some(running) = running {
                    running.stop();
                }
            }
        });
    }

    let new_game = Callback::from(|_| restart_without_session());
    let (over, score) = match &*phase {
        Phase::Over(score) => (true, *score),
        _ => (false, Score::default()),
    };
    let failure = match &*phase {
        Phase::Failed(reason) => Some(reason.clone()),
        _ => None,
    };
    let hint = match props.scheme {
        ControlScheme::Single => "Move: WASD / arrows · Shoot: Space",
        ControlScheme::SharedKeyboard => "Red: WASD + Space · Blue: arrows + Enter",
    };

    html! {<div style="position:relative; width:100vw; height:100vh; display:flex; flex-direction:column; align-items:center; justify-content:center;">
        <canvas ref={canvas_ref.clone()} id="game-canvas" style="display:block;"></canvas>
        <div style="margin-top:8px; font-size:12px; opacity:0.7;">{ hint }</div>
        { if props.scheme.is_joinable() {
            html!{ <SessionPanel session={props.session.clone()} /> }
        } else {
            html!{ <div style="position:absolute; top:12px; right:12px; background:rgba(22,27,34,0.9); border:1px solid #30363d; border-radius:8px; padding:8px; font-size:12px;">{"Local match"}</div> }
        } }
        <GameOverOverlay show={over} score={score} new_game={new_game.clone()} />
        <FailureOverlay reason={failure} new_game={new_game} />
    </div> }
}
