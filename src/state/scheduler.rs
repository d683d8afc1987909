//! Frame driver: one pass of sample → step → broadcast → timer → draw per
//! display refresh.

use crate::engine::SimulationEngine;
use crate::error::FrameError;
use crate::model::Score;
use crate::render::Renderer;
use crate::state::input::IntentSource;
use crate::state::session::{Launched, SessionDescriptor};

/// The "schedule the next frame" capability the loop is given.
pub trait FrameRequester {
    fn request_next_frame(&mut self) -> Result<(), FrameError>;
    /// Drop any frame requested but not yet run.
    fn cancel(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    /// The engine reported the end of the match.
    Ended,
    Cancelled,
    /// A collaborator failed; the match cannot continue.
    Failed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Frame ran and the next one is requested.
    Continue,
    /// Frame ran and ended the match.
    Ended,
    /// Nothing ran; the loop is not running.
    Stopped(LoopState),
}

pub struct GameLoopScheduler<S, E, R> {
    session: SessionDescriptor,
    state: LoopState,
    source: S,
    engine: E,
    renderer: R,
    requester: Box<dyn FrameRequester>,
    frames: u64,
    score: Score,
}

impl<S, E, R> GameLoopScheduler<S, E, R>
where
    S: IntentSource,
    E: SimulationEngine,
    R: Renderer,
{
    pub fn new(
        launched: Launched<E>,
        source: S,
        renderer: R,
        requester: Box<dyn FrameRequester>,
    ) -> Self {
        let (session, engine) = launched.into_parts();
        Self {
            session,
            state: LoopState::Idle,
            source,
            engine,
            renderer,
            requester,
            frames: 0,
            score: Score::default(),
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> LoopState {
        self.state
    }

    #[cfg(test)]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Score of the last frame drawn.
    pub fn score(&self) -> Score {
        self.score
    }

    /// Fails, and leaves the loop `Failed`, when the first frame cannot be
    /// scheduled.
    pub fn start(&mut self) -> Result<(), FrameError> {
        if self.state != LoopState::Idle {
            log::warn!("game loop start ignored in state {:?}", self.state);
            return Ok(());
        }
        self.state = LoopState::Running;
        log::debug!("game loop running");
        self.requester
            .request_next_frame()
            .map_err(|e| self.fail(e))
    }

    pub fn cancel(&mut self) {
        self.requester.cancel();
        if self.state == LoopState::Running || self.state == LoopState::Idle {
            self.state = LoopState::Cancelled;
            log::debug!("game loop cancelled after {} frames", self.frames);
        }
    }

    pub fn run_once(&mut self) -> Result<FrameOutcome, FrameError> {
        if self.state != LoopState::Running {
            return Ok(FrameOutcome::Stopped(self.state));
        }
        match self.frame() {
            Ok(true) => {
                self.state = LoopState::Ended;
                log::info!("match ended after {} frames", self.frames);
                Ok(FrameOutcome::Ended)
            }
            Ok(false) => match self.requester.request_next_frame() {
                Ok(()) => Ok(FrameOutcome::Continue),
                Err(e) => Err(self.fail(e)),
            },
            Err(e) => Err(self.fail(e)),
        }
    }

    fn fail(&mut self, e: FrameError) -> FrameError {
        self.state = LoopState::Failed;
        log::error!("game loop stopped on frame {}: {e}", self.frames);
        e
    }

    /// Returns whether this frame ended the match.
    fn frame(&mut self) -> Result<bool, FrameError> {
        self.frames += 1;
        let intents = self.source.sample();
        self.engine.step(&intents)?;
        if self.session.is_host() {
            self.engine.maybe_broadcast_state()?;
        }
        self.engine.check_reset_timer()?;
        let snapshot = self.engine.snapshot()?;
        self.score = snapshot.score;
        self.renderer.draw(&snapshot)?;
        Ok(snapshot.game_ended)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatchConfig;
    use crate::error::{EngineError, RenderError};
    use crate::model::{Circle, FrameSnapshot, InputIntent, Score};
    use crate::state::session::{Bootstrap, LaunchParams, SessionBootstrap};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum Call {
        Sample,
        Step,
        Broadcast,
        CheckTimer,
        Snapshot,
        Draw,
        Request,
        Cancel,
    }

    type Log = Rc<RefCell<Vec<Call>>>;

    thread_local! {
        static ENGINE_LOG: RefCell<Option<Log>> = const { RefCell::new(None) };
    }

    #[derive(Default, Clone, Copy)]
    struct Faults {
        fail_step_on: Option<usize>,
        end_on: Option<usize>,
        fail_request_on: Option<usize>,
    }

    thread_local! {
        static FAULTS: RefCell<Faults> = RefCell::new(Faults::default());
    }

    struct Source(Log);

    impl IntentSource for Source {
        fn sample(&self) -> Vec<InputIntent> {
            self.0.borrow_mut().push(Call::Sample);
            vec![InputIntent::default()]
        }
    }

    struct Engine {
        log: Log,
        steps: usize,
        faults: Faults,
    }

    impl SimulationEngine for Engine {
        fn init(_session: &SessionDescriptor, _config: &MatchConfig) -> Result<Self, EngineError> {
            let log = ENGINE_LOG.with(|l| l.borrow().clone()).unwrap_or_default();
            Ok(Engine {
                log,
                steps: 0,
                faults: FAULTS.with(|f| *f.borrow()),
            })
        }
        fn step(&mut self, _intents: &[InputIntent]) -> Result<(), EngineError> {
            self.log.borrow_mut().push(Call::Step);
            self.steps += 1;
            if self.faults.fail_step_on == Some(self.steps) {
                return Err(EngineError::PlayerCount(0));
            }
            Ok(())
        }
        fn maybe_broadcast_state(&mut self) -> Result<(), EngineError> {
            self.log.borrow_mut().push(Call::Broadcast);
            Ok(())
        }
        fn check_reset_timer(&mut self) -> Result<(), EngineError> {
            self.log.borrow_mut().push(Call::CheckTimer);
            Ok(())
        }
        fn snapshot(&self) -> Result<FrameSnapshot, EngineError> {
            self.log.borrow_mut().push(Call::Snapshot);
            Ok(FrameSnapshot {
                players: Vec::new(),
                ball: Circle {
                    x: 0.0,
                    y: 0.0,
                    radius: 1.0,
                    red: false,
                    player_number: 0,
                },
                goal_posts: Vec::new(),
                score: Score {
                    red: self.steps as u32,
                    blue: 0,
                },
                red_scored: false,
                blue_scored: false,
                game_ended: self.faults.end_on == Some(self.steps),
            })
        }
    }

    struct Canvas {
        log: Log,
        fail: bool,
    }

    impl Renderer for Canvas {
        fn draw(&mut self, _snapshot: &FrameSnapshot) -> Result<(), RenderError> {
            self.log.borrow_mut().push(Call::Draw);
            if self.fail {
                return Err(RenderError::ContextUnavailable);
            }
            Ok(())
        }
    }

    struct Requester {
        log: Log,
        requests: usize,
        fail_on: Option<usize>,
    }

    impl FrameRequester for Requester {
        fn request_next_frame(&mut self) -> Result<(), FrameError> {
            self.log.borrow_mut().push(Call::Request);
            self.requests += 1;
            if self.fail_on == Some(self.requests) {
                return Err(FrameError::Schedule("no animation frame".into()));
            }
            Ok(())
        }
        fn cancel(&mut self) {
            self.log.borrow_mut().push(Call::Cancel);
        }
    }

    fn scheduler(
        is_host: bool,
        faults: Faults,
        fail_draw: bool,
    ) -> (GameLoopScheduler<Source, Engine, Canvas>, Log) {
        let log: Log = Rc::default();
        ENGINE_LOG.with(|l| *l.borrow_mut() = Some(log.clone()));
        FAULTS.with(|f| *f.borrow_mut() = faults);
        let flag = if is_host { "true" } else { "false" };
        let params = LaunchParams::from_pairs([("session_id", "loop"), ("is_host", flag)]);
        let Bootstrap::Ready(token) = SessionBootstrap::begin_fresh(&params) else {
            panic!("expected immediate bootstrap");
        };
        let launched = token.launch::<Engine>(&MatchConfig::default()).unwrap();
        let s = GameLoopScheduler::new(
            launched,
            Source(log.clone()),
            Canvas {
                log: log.clone(),
                fail: fail_draw,
            },
            Box::new(Requester {
                log: log.clone(),
                requests: 0,
                fail_on: faults.fail_request_on,
            }),
        );
        (s, log)
    }

    fn frame_calls(is_host: bool) -> Vec<Call> {
        let mut calls = vec![Call::Sample, Call::Step];
        if is_host {
            calls.push(Call::Broadcast);
        }
        calls.extend([Call::CheckTimer, Call::Snapshot, Call::Draw, Call::Request]);
        calls
    }

    #[test]
    fn host_frames_run_in_order() {
        let (mut s, log) = scheduler(true, Faults::default(), false);
        assert_eq!(s.state(), LoopState::Idle);
        s.start().unwrap();
        assert_eq!(s.state(), LoopState::Running);
        assert_eq!(*log.borrow(), vec![Call::Request]);

        for _ in 0..5 {
            log.borrow_mut().clear();
            assert_eq!(s.run_once().unwrap(), FrameOutcome::Continue);
            assert_eq!(*log.borrow(), frame_calls(true));
        }
        assert_eq!(s.frames(), 5);
    }

    #[test]
    fn joiner_frames_skip_broadcast() {
        let (mut s, log) = scheduler(false, Faults::default(), false);
        s.start().unwrap();
        for _ in 0..3 {
            log.borrow_mut().clear();
            s.run_once().unwrap();
            assert_eq!(*log.borrow(), frame_calls(false));
        }
    }

    #[test]
    fn nothing_runs_before_start() {
        let (mut s, log) = scheduler(true, Faults::default(), false);
        assert_eq!(
            s.run_once().unwrap(),
            FrameOutcome::Stopped(LoopState::Idle)
        );
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn engine_failure_stops_the_loop() {
        let faults = Faults {
            fail_step_on: Some(2),
            ..Faults::default()
        };
        let (mut s, log) = scheduler(true, faults, false);
        s.start().unwrap();
        s.run_once().unwrap();
        log.borrow_mut().clear();

        let err = s.run_once().unwrap_err();
        assert!(matches!(err, FrameError::Engine(_)));
        assert_eq!(s.state(), LoopState::Failed);
        assert_eq!(*log.borrow(), vec![Call::Sample, Call::Step]);

        log.borrow_mut().clear();
        assert_eq!(
            s.run_once().unwrap(),
            FrameOutcome::Stopped(LoopState::Failed)
        );
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn render_failure_stops_the_loop() {
        let (mut s, log) = scheduler(false, Faults::default(), true);
        s.start().unwrap();
        log.borrow_mut().clear();
        let err = s.run_once().unwrap_err();
        assert!(matches!(err, FrameError::Render(RenderError::ContextUnavailable)));
        assert_eq!(s.state(), LoopState::Failed);
        assert!(!log.borrow().contains(&Call::Request));
    }

    #[test]
    fn match_end_stops_scheduling() {
        let faults = Faults {
            end_on: Some(3),
            ..Faults::default()
        };
        let (mut s, log) = scheduler(true, faults, false);
        s.start().unwrap();
        s.run_once().unwrap();
        s.run_once().unwrap();
        log.borrow_mut().clear();
        assert_eq!(s.run_once().unwrap(), FrameOutcome::Ended);
        assert_eq!(s.state(), LoopState::Ended);
        assert_eq!(s.score(), Score { red: 3, blue: 0 });
        assert_eq!(log.borrow().last(), Some(&Call::Draw));
        assert_eq!(
            s.run_once().unwrap(),
            FrameOutcome::Stopped(LoopState::Ended)
        );
    }

    #[test]
    fn cancel_stops_further_frames() {
        let (mut s, log) = scheduler(true, Faults::default(), false);
        s.start().unwrap();
        s.run_once().unwrap();
        s.cancel();
        assert_eq!(s.state(), LoopState::Cancelled);
        assert_eq!(log.borrow().last(), Some(&Call::Cancel));
        log.borrow_mut().clear();
        assert_eq!(
            s.run_once().unwrap(),
            FrameOutcome::Stopped(LoopState::Cancelled)
        );
        assert!(log.borrow().is_empty());

        s.start().unwrap();
        assert_eq!(s.state(), LoopState::Cancelled);
    }

    #[test]
    fn scheduling_failure_stops_the_loop() {
        let faults = Faults {
            fail_request_on: Some(3),
            ..Faults::default()
        };
        let (mut s, log) = scheduler(true, faults, false);
        s.start().unwrap();
        assert_eq!(s.run_once().unwrap(), FrameOutcome::Continue);
        let err = s.run_once().unwrap_err();
        assert!(matches!(err, FrameError::Schedule(_)));
        assert_eq!(s.state(), LoopState::Failed);

        log.borrow_mut().clear();
        assert_eq!(
            s.run_once().unwrap(),
            FrameOutcome::Stopped(LoopState::Failed)
        );
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn first_frame_that_cannot_be_scheduled_fails_start() {
        let faults = Faults {
            fail_request_on: Some(1),
            ..Faults::default()
        };
        let (mut s, _log) = scheduler(false, faults, false);
        assert!(matches!(s.start(), Err(FrameError::Schedule(_))));
        assert_eq!(s.state(), LoopState::Failed);
        assert_eq!(
            s.run_once().unwrap(),
            FrameOutcome::Stopped(LoopState::Failed)
        );
    }
}
