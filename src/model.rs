//! Data shapes shared between the input layer, the loop and its collaborators.

use serde::{Deserialize, Serialize};

/// Directional intent for one player and one frame.
///
/// Built only by [`crate::state::InputLatchTracker::snapshot`], which never sets
/// both halves of an axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputIntent {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub shoot: bool,
}

impl InputIntent {
    /// Unit direction in screen space (y grows downwards).
    pub fn direction(&self) -> (f64, f64) {
        let dx = match (self.left, self.right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        };
        let dy = match (self.up, self.down) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        };
        (dx, dy)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Team {
    Red,
    Blue,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub red: bool,
    /// Shirt number; `0` for the ball and goal posts.
    pub player_number: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub red: u32,
    pub blue: u32,
}

impl Score {
    pub fn leader(&self) -> Option<Team> {
        if self.red > self.blue {
            Some(Team::Red)
        } else if self.blue > self.red {
            Some(Team::Blue)
        } else {
            None
        }
    }
}

/// Read-only view of the match for one rendered frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub players: Vec<Circle>,
    pub ball: Circle,
    pub goal_posts: Vec<Circle>,
    pub score: Score,
    pub red_scored: bool,
    pub blue_scored: bool,
    /// Set on the frame that ends the match; the loop stops after drawing it.
    pub game_ended: bool,
}

/// How many local players share this keyboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlScheme {
    /// One player on WASD or arrows, Space to shoot.
    Single,
    /// Red on WASD + Space, blue on arrows + Enter.
    SharedKeyboard,
}

impl ControlScheme {
    /// Whether another tab can join this match through a shared link.
    pub fn is_joinable(self) -> bool {
        matches!(self, ControlScheme::Single)
    }
}
