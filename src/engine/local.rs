//! Single-tab engine: kinematic players and ball on a fixed stadium, no network
//! transport. Good enough to drive the loop and the renderer end to end.

use serde::{Deserialize, Serialize};

use super::SimulationEngine;
use crate::config::MatchConfig;
use crate::error::EngineError;
use crate::model::{Circle, FrameSnapshot, InputIntent, Score, Team};
use crate::state::SessionDescriptor;

pub const PLAYER_RADIUS: f64 = 15.0;
pub const PLAYER_DIAMETER: f64 = 2.0 * PLAYER_RADIUS;
pub const BALL_RADIUS: f64 = 10.0;
pub const GOAL_POST_RADIUS: f64 = 8.0;
pub const PITCH_WIDTH: f64 = 500.0;
pub const PITCH_HEIGHT: f64 = 300.0;
pub const GOAL_BREADTH: f64 = 120.0;
pub const STADIUM_WIDTH: f64 = 2.0 * PLAYER_DIAMETER + PITCH_WIDTH + 2.0 * PLAYER_DIAMETER;
pub const STADIUM_HEIGHT: f64 = 2.0 * PLAYER_DIAMETER + PITCH_HEIGHT;
pub const PITCH_LEFT_LINE: f64 = 2.0 * PLAYER_DIAMETER;
pub const PITCH_RIGHT_LINE: f64 = PITCH_LEFT_LINE + PITCH_WIDTH;
pub const PITCH_TOP_LINE: f64 = PLAYER_DIAMETER;
pub const PITCH_BOTTOM_LINE: f64 = PITCH_TOP_LINE + PITCH_HEIGHT;
pub const PITCH_LINE_WIDTH: f64 = 3.0;

const PLAYER_ACCELERATION: f64 = 0.4;
const PLAYER_TOP_SPEED: f64 = 3.0;
const PLAYER_DAMPING: f64 = 0.92;
const BALL_TOP_SPEED: f64 = 7.0;
const BALL_DAMPING: f64 = 0.985;
const BALL_RESTITUTION: f64 = 0.5;
const SHOOTING_DISTANCE: f64 = PLAYER_RADIUS + BALL_RADIUS + 8.0;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Body {
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
}

impl Body {
    fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            ..Default::default()
        }
    }

    fn limit_speed(&mut self, top_speed: f64) {
        let speed = self.vx.hypot(self.vy);
        if speed > top_speed {
            self.vx *= top_speed / speed;
            self.vy *= top_speed / speed;
        }
    }
}

#[derive(Clone, Debug)]
struct Player {
    body: Body,
    team: Team,
    number: u32,
    last_tick_shot: bool,
}

impl Player {
    fn kickoff_spot(team: Team) -> Body {
        match team {
            Team::Red => Body::at(PITCH_LEFT_LINE + 2.0 * PLAYER_DIAMETER, STADIUM_HEIGHT / 2.0),
            Team::Blue => Body::at(PITCH_RIGHT_LINE - 2.0 * PLAYER_DIAMETER, STADIUM_HEIGHT / 2.0),
        }
    }

    fn circle(&self) -> Circle {
        Circle {
            x: self.body.x,
            y: self.body.y,
            radius: PLAYER_RADIUS,
            red: self.team == Team::Red,
            player_number: self.number,
        }
    }
}

/// What a host would send to its joiners.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateUpdate {
    pub frame: u64,
    pub players: Vec<Circle>,
    pub ball: Circle,
    pub score: Score,
    pub red_scored: bool,
    pub blue_scored: bool,
    pub game_ended: bool,
}

pub struct LocalEngine {
    is_host: bool,
    config: MatchConfig,
    players: Vec<Player>,
    ball: Body,
    score: Score,
    red_scored: bool,
    blue_scored: bool,
    game_ended: bool,
    reset_timer: u32,
    frame: u64,
    frames_since_broadcast: u32,
    broadcasts_sent: u64,
}

impl LocalEngine {
    fn kickoff(&mut self) {
        self.ball = Body::at(STADIUM_WIDTH / 2.0, STADIUM_HEIGHT / 2.0);
        for p in &mut self.players {
            p.body = Player::kickoff_spot(p.team);
            p.last_tick_shot = false;
        }
    }

    /// Player indices steered by the given intents, in intent order.
    fn controlled(&self, intents: usize) -> &'static [usize] {
        match (intents, self.is_host) {
            (2, _) => &[0, 1],
            (_, true) => &[0],
            (_, false) => &[1],
        }
    }

    fn apply_intent(&mut self, index: usize, intent: InputIntent) {
        let ball = self.ball;
        let player = &mut self.players[index];

        if intent.shoot && !player.last_tick_shot {
            let dx = ball.x - player.body.x;
            let dy = ball.y - player.body.y;
            let dist = dx.hypot(dy);
            if dist > 0.0 && dist <= SHOOTING_DISTANCE {
                self.ball.vx = BALL_TOP_SPEED * dx / dist;
                self.ball.vy = BALL_TOP_SPEED * dy / dist;
            }
        }
        player.last_tick_shot = intent.shoot;

        let (mut dx, mut dy) = intent.direction();
        if dx != 0.0 && dy != 0.0 {
            dx *= std::f64::consts::FRAC_1_SQRT_2;
            dy *= std::f64::consts::FRAC_1_SQRT_2;
        }
        let b = &mut player.body;
        b.vx = (b.vx + dx * PLAYER_ACCELERATION) * PLAYER_DAMPING;
        b.vy = (b.vy + dy * PLAYER_ACCELERATION) * PLAYER_DAMPING;
        b.limit_speed(PLAYER_TOP_SPEED);
        b.x = (b.x + b.vx).clamp(PLAYER_RADIUS, STADIUM_WIDTH - PLAYER_RADIUS);
        b.y = (b.y + b.vy).clamp(PLAYER_RADIUS, STADIUM_HEIGHT - PLAYER_RADIUS);
    }

    fn collide_with_ball(&mut self) {
        let touch = PLAYER_RADIUS + BALL_RADIUS;
        for p in &self.players {
            let dx = self.ball.x - p.body.x;
            let dy = self.ball.y - p.body.y;
            let dist = dx.hypot(dy);
            if dist >= touch || dist == 0.0 {
                continue;
            }
            let (nx, ny) = (dx / dist, dy / dist);
            self.ball.x = p.body.x + nx * touch;
            self.ball.y = p.body.y + ny * touch;
            let closing = (self.ball.vx - p.body.vx) * nx + (self.ball.vy - p.body.vy) * ny;
            if closing < 0.0 {
                self.ball.vx -= (1.0 + BALL_RESTITUTION) * closing * nx;
                self.ball.vy -= (1.0 + BALL_RESTITUTION) * closing * ny;
            }
        }
        self.ball.limit_speed(BALL_TOP_SPEED);
    }

    /// Moves the ball and returns the team that scored, if any.
    fn move_ball(&mut self) -> Option<Team> {
        let b = &mut self.ball;
        b.x += b.vx;
        b.y += b.vy;
        b.vx *= BALL_DAMPING;
        b.vy *= BALL_DAMPING;

        if b.y - BALL_RADIUS < PITCH_TOP_LINE {
            b.y = PITCH_TOP_LINE + BALL_RADIUS;
            b.vy = -b.vy;
        } else if b.y + BALL_RADIUS > PITCH_BOTTOM_LINE {
            b.y = PITCH_BOTTOM_LINE - BALL_RADIUS;
            b.vy = -b.vy;
        }

        let in_mouth = (b.y - STADIUM_HEIGHT / 2.0).abs() < GOAL_BREADTH / 2.0;
        if in_mouth {
            if b.x < PITCH_LEFT_LINE {
                return Some(Team::Blue);
            }
            if b.x > PITCH_RIGHT_LINE {
                return Some(Team::Red);
            }
        } else if b.x - BALL_RADIUS < PITCH_LEFT_LINE {
            b.x = PITCH_LEFT_LINE + BALL_RADIUS;
            b.vx = -b.vx;
        } else if b.x + BALL_RADIUS > PITCH_RIGHT_LINE {
            b.x = PITCH_RIGHT_LINE - BALL_RADIUS;
            b.vx = -b.vx;
        }
        None
    }

    fn goal(&mut self, team: Team) {
        match team {
            Team::Red => {
                self.score.red += 1;
                self.red_scored = true;
            }
            Team::Blue => {
                self.score.blue += 1;
                self.blue_scored = true;
            }
        }
        self.ball.vx = 0.0;
        self.ball.vy = 0.0;
        self.reset_timer = self.config.reset_time_frames;
        log::info!(
            "{team:?} scored, {} - {}",
            self.score.red,
            self.score.blue
        );
        if self.score.red >= self.config.max_goals || self.score.blue >= self.config.max_goals {
            self.game_ended = true;
            log::info!("match over at frame {}", self.frame);
        }
    }

    fn ball_circle(&self) -> Circle {
        Circle {
            x: self.ball.x,
            y: self.ball.y,
            radius: BALL_RADIUS,
            red: false,
            player_number: 0,
        }
    }

    fn goal_posts() -> Vec<Circle> {
        let top = (STADIUM_HEIGHT - GOAL_BREADTH) / 2.0;
        let bottom = (STADIUM_HEIGHT + GOAL_BREADTH) / 2.0;
        [
            (PITCH_LEFT_LINE, top, true),
            (PITCH_LEFT_LINE, bottom, true),
            (PITCH_RIGHT_LINE, top, false),
            (PITCH_RIGHT_LINE, bottom, false),
        ]
        .into_iter()
        .map(|(x, y, red)| Circle {
            x,
            y,
            radius: GOAL_POST_RADIUS,
            red,
            player_number: 0,
        })
        .collect()
    }

    #[cfg(test)]
    pub fn broadcasts_sent(&self) -> u64 {
        self.broadcasts_sent
    }
}

impl SimulationEngine for LocalEngine {
    fn init(session: &SessionDescriptor, config: &MatchConfig) -> Result<Self, EngineError> {
        let players = [Team::Red, Team::Blue]
            .into_iter()
            .map(|team| Player {
                body: Player::kickoff_spot(team),
                team,
                number: 1,
                last_tick_shot: false,
            })
            .collect();
        let mut engine = Self {
            is_host: session.is_host(),
            config: *config,
            players,
            ball: Body::default(),
            score: Score::default(),
            red_scored: false,
            blue_scored: false,
            game_ended: false,
            reset_timer: 0,
            frame: 0,
            frames_since_broadcast: 0,
            broadcasts_sent: 0,
        };
        engine.kickoff();
        Ok(engine)
    }

    fn step(&mut self, intents: &[InputIntent]) -> Result<(), EngineError> {
        if intents.is_empty() || intents.len() > 2 {
            return Err(EngineError::PlayerCount(intents.len()));
        }
        if self.game_ended {
            return Ok(());
        }
        self.frame += 1;
        if self.reset_timer > 0 {
            return Ok(());
        }

        let mut steering = vec![InputIntent::default(); self.players.len()];
        for (&index, intent) in self.controlled(intents.len()).iter().zip(intents) {
            steering[index] = *intent;
        }
        for (index, intent) in steering.into_iter().enumerate() {
            self.apply_intent(index, intent);
        }
        self.collide_with_ball();
        if let Some(team) = self.move_ball() {
            self.goal(team);
        }
        Ok(())
    }

    fn maybe_broadcast_state(&mut self) -> Result<(), EngineError> {
        if !self.is_host {
            return Ok(());
        }
        self.frames_since_broadcast += 1;
        if self.frames_since_broadcast < self.config.broadcast_interval_frames {
            return Ok(());
        }
        self.frames_since_broadcast = 0;
        let update = StateUpdate {
            frame: self.frame,
            players: self.players.iter().map(Player::circle).collect(),
            ball: self.ball_circle(),
            score: self.score,
            red_scored: self.red_scored,
            blue_scored: self.blue_scored,
            game_ended: self.game_ended,
        };
        let encoded = serde_json::to_string(&update)?;
        self.broadcasts_sent += 1;
        log::trace!("state update {} ({} bytes)", self.broadcasts_sent, encoded.len());
        Ok(())
    }

    fn check_reset_timer(&mut self) -> Result<(), EngineError> {
        if self.reset_timer == 0 || self.game_ended {
            return Ok(());
        }
        self.reset_timer -= 1;
        if self.reset_timer == 0 {
            self.red_scored = false;
            self.blue_scored = false;
            self.kickoff();
            log::debug!("kickoff at frame {}", self.frame);
        }
        Ok(())
    }

    fn snapshot(&self) -> Result<FrameSnapshot, EngineError> {
        Ok(FrameSnapshot {
            players: self.players.iter().map(Player::circle).collect(),
            ball: self.ball_circle(),
            goal_posts: Self::goal_posts(),
            score: self.score,
            red_scored: self.red_scored,
            blue_scored: self.blue_scored,
            game_ended: self.game_ended,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Bootstrap, LaunchParams, SessionBootstrap};

    fn engine(is_host: bool, config: MatchConfig) -> LocalEngine {
        let flag = if is_host { "true" } else { "false" };
        let params = LaunchParams::from_pairs([("session_id", "test"), ("is_host", flag)]);
        let Bootstrap::Ready(token) = SessionBootstrap::begin_fresh(&params) else {
            panic!("expected immediate bootstrap");
        };
        let (_, engine) = token.launch::<LocalEngine>(&config).unwrap().into_parts();
        engine
    }

    fn up() -> InputIntent {
        InputIntent {
            up: true,
            ..Default::default()
        }
    }

    #[test]
    fn starts_at_kickoff() {
        let e = engine(true, MatchConfig::default());
        let snap = e.snapshot().unwrap();
        assert_eq!(snap.players.len(), 2);
        assert!(snap.players[0].red && snap.players[0].x < STADIUM_WIDTH / 2.0);
        assert!(!snap.players[1].red && snap.players[1].x > STADIUM_WIDTH / 2.0);
        assert_eq!(snap.ball.x, STADIUM_WIDTH / 2.0);
        assert_eq!(snap.goal_posts.len(), 4);
        assert_eq!(snap.score, Score::default());
        assert!(!snap.game_ended);
    }

    #[test]
    fn host_steers_red_and_joiner_steers_blue() {
        let mut host = engine(true, MatchConfig::default());
        let before = host.snapshot().unwrap();
        host.step(&[up()]).unwrap();
        let after = host.snapshot().unwrap();
        assert!(after.players[0].y < before.players[0].y);
        assert_eq!(after.players[1], before.players[1]);

        let mut joiner = engine(false, MatchConfig::default());
        let before = joiner.snapshot().unwrap();
        joiner.step(&[up()]).unwrap();
        let after = joiner.snapshot().unwrap();
        assert_eq!(after.players[0], before.players[0]);
        assert!(after.players[1].y < before.players[1].y);
    }

    #[test]
    fn shared_keyboard_steers_both() {
        let mut e = engine(true, MatchConfig::default());
        let before = e.snapshot().unwrap();
        e.step(&[up(), up()]).unwrap();
        let after = e.snapshot().unwrap();
        assert!(after.players[0].y < before.players[0].y);
        assert!(after.players[1].y < before.players[1].y);
    }

    #[test]
    fn rejects_wrong_player_count() {
        let mut e = engine(true, MatchConfig::default());
        assert!(matches!(e.step(&[]), Err(EngineError::PlayerCount(0))));
        assert!(matches!(
            e.step(&[up(), up(), up()]),
            Err(EngineError::PlayerCount(3))
        ));
    }

    #[test]
    fn shot_fires_once_per_press() {
        let mut e = engine(true, MatchConfig::default());
        e.players[0].body = Body::at(e.ball.x - 30.0, e.ball.y);
        let shoot = InputIntent {
            shoot: true,
            ..Default::default()
        };
        e.step(&[shoot]).unwrap();
        assert!(e.ball.vx > 0.0);

        e.ball.vx = 0.0;
        e.ball.vy = 0.0;
        e.players[0].body = Body::at(e.ball.x - 30.0, e.ball.y);
        e.step(&[shoot]).unwrap();
        assert_eq!(e.ball.vx, 0.0);
    }

    #[test]
    fn goal_then_kickoff_after_reset_time() {
        let config = MatchConfig {
            reset_time_frames: 5,
            ..MatchConfig::default()
        };
        let mut e = engine(true, config);
        e.ball = Body {
            x: PITCH_RIGHT_LINE - 1.0,
            y: STADIUM_HEIGHT / 2.0,
            vx: 5.0,
            vy: 0.0,
        };
        e.step(&[InputIntent::default()]).unwrap();
        let snap = e.snapshot().unwrap();
        assert_eq!(snap.score, Score { red: 1, blue: 0 });
        assert!(snap.red_scored && !snap.blue_scored);

        // frozen while the timer runs
        let frozen = e.snapshot().unwrap();
        e.step(&[up()]).unwrap();
        assert_eq!(e.snapshot().unwrap().players, frozen.players);

        for _ in 0..4 {
            e.check_reset_timer().unwrap();
        }
        assert!(e.snapshot().unwrap().red_scored);
        e.check_reset_timer().unwrap();
        let snap = e.snapshot().unwrap();
        assert!(!snap.red_scored);
        assert_eq!(snap.ball.x, STADIUM_WIDTH / 2.0);
        assert_eq!(snap.score.red, 1);
    }

    #[test]
    fn ball_bounces_off_line_outside_goal_mouth() {
        let mut e = engine(true, MatchConfig::default());
        e.ball = Body {
            x: PITCH_LEFT_LINE + BALL_RADIUS + 1.0,
            y: PITCH_TOP_LINE + 20.0,
            vx: -5.0,
            vy: 0.0,
        };
        e.step(&[InputIntent::default()]).unwrap();
        assert!(e.ball.vx > 0.0);
        assert_eq!(e.score, Score::default());
    }

    #[test]
    fn match_ends_at_goal_limit() {
        let config = MatchConfig {
            max_goals: 1,
            ..MatchConfig::default()
        };
        let mut e = engine(true, config);
        e.ball = Body {
            x: PITCH_LEFT_LINE + 1.0,
            y: STADIUM_HEIGHT / 2.0,
            vx: -5.0,
            vy: 0.0,
        };
        e.step(&[InputIntent::default()]).unwrap();
        let snap = e.snapshot().unwrap();
        assert!(snap.game_ended);
        assert_eq!(snap.score, Score { red: 0, blue: 1 });

        e.check_reset_timer().unwrap();
        e.step(&[up()]).unwrap();
        assert_eq!(e.snapshot().unwrap(), snap);
    }

    #[test]
    fn host_broadcasts_on_its_own_cadence() {
        let mut host = engine(true, MatchConfig::default());
        for _ in 0..9 {
            host.maybe_broadcast_state().unwrap();
        }
        assert_eq!(host.broadcasts_sent(), 3);

        let mut joiner = engine(false, MatchConfig::default());
        for _ in 0..9 {
            joiner.maybe_broadcast_state().unwrap();
        }
        assert_eq!(joiner.broadcasts_sent(), 0);
    }
}
