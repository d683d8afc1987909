//! Keyboard latching: turns overlapping key presses into one direction per axis.

use crate::model::{ControlScheme, InputIntent};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
    Shoot,
}

/// Binds `KeyboardEvent.key` values to actions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyMap {
    bindings: Vec<(&'static str, Action)>,
}

const WASD: [(&str, Action); 4] = [
    ("w", Action::Up),
    ("s", Action::Down),
    ("a", Action::Left),
    ("d", Action::Right),
];

const ARROWS: [(&str, Action); 4] = [
    ("ArrowUp", Action::Up),
    ("ArrowDown", Action::Down),
    ("ArrowLeft", Action::Left),
    ("ArrowRight", Action::Right),
];

const SPACE: [(&str, Action); 2] = [(" ", Action::Shoot), ("Spacebar", Action::Shoot)];

impl KeyMap {
    /// WASD and arrows both steer, Space shoots.
    pub fn solo() -> Self {
        Self {
            bindings: WASD.iter().chain(&ARROWS).chain(&SPACE).copied().collect(),
        }
    }

    pub fn red() -> Self {
        Self {
            bindings: WASD.iter().chain(&SPACE).copied().collect(),
        }
    }

    pub fn blue() -> Self {
        Self {
            bindings: ARROWS
                .iter()
                .copied()
                .chain(std::iter::once(("Enter", Action::Shoot)))
                .collect(),
        }
    }

    /// The bound key name and its action. Letters match in either case, so a
    /// release after Shift changes still finds its press.
    fn binding(&self, key: &str) -> Option<(&'static str, Action)> {
        self.bindings
            .iter()
            .find(|(bound, _)| bound.eq_ignore_ascii_case(key))
            .copied()
    }
}

/// Which keys of one opposing pair are held.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AxisState {
    Neutral,
    /// Up or left.
    FirstHeld,
    /// Down or right.
    SecondHeld,
    BothHeld,
}

impl AxisState {
    fn of(first: bool, second: bool) -> Self {
        match (first, second) {
            (false, false) => AxisState::Neutral,
            (true, false) => AxisState::FirstHeld,
            (false, true) => AxisState::SecondHeld,
            (true, true) => AxisState::BothHeld,
        }
    }

    /// Active (first, second) direction; with both held the latch decides.
    fn resolve(self, first_latched: bool) -> (bool, bool) {
        match self {
            AxisState::Neutral => (false, false),
            AxisState::FirstHeld => (true, false),
            AxisState::SecondHeld => (false, true),
            AxisState::BothHeld => (first_latched, !first_latched),
        }
    }
}

/// Raw held flags plus the recency latches for both axes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyAxisState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub shoot: bool,
    pub vertical_last_was_up: bool,
    pub horizontal_last_was_left: bool,
}

#[derive(Clone, Debug)]
pub struct InputLatchTracker {
    keys: KeyMap,
    state: KeyAxisState,
    /// Bound keys currently down; several keys may drive one action.
    held: Vec<&'static str>,
}

impl InputLatchTracker {
    pub fn new(keys: KeyMap) -> Self {
        Self {
            keys,
            state: KeyAxisState::default(),
            held: Vec::new(),
        }
    }

    /// Returns whether `key` is bound for this player.
    pub fn on_key_down(&mut self, key: &str) -> bool {
        let Some((bound, action)) = self.keys.binding(key) else {
            return false;
        };
        if !self.held.contains(&bound) {
            self.held.push(bound);
        }
        let s = &mut self.state;
        match action {
            Action::Up => {
                s.up = true;
                s.vertical_last_was_up = true;
            }
            Action::Down => {
                s.down = true;
                s.vertical_last_was_up = false;
            }
            Action::Left => {
                s.left = true;
                s.horizontal_last_was_left = true;
            }
            Action::Right => {
                s.right = true;
                s.horizontal_last_was_left = false;
            }
            Action::Shoot => s.shoot = true,
        }
        true
    }

    /// Releasing one key of a pair hands the axis to the other key, so a key
    /// still held takes over without a fresh press. An action stays active
    /// while any other key bound to it is down.
    pub fn on_key_up(&mut self, key: &str) -> bool {
        let Some((bound, action)) = self.keys.binding(key) else {
            return false;
        };
        self.held.retain(|k| *k != bound);
        if self.holds(action) {
            return true;
        }
        let s = &mut self.state;
        match action {
            Action::Up => {
                s.up = false;
                s.vertical_last_was_up = false;
            }
            Action::Down => {
                s.down = false;
                s.vertical_last_was_up = true;
            }
            Action::Left => {
                s.left = false;
                s.horizontal_last_was_left = false;
            }
            Action::Right => {
                s.right = false;
                s.horizontal_last_was_left = true;
            }
            Action::Shoot => s.shoot = false,
        }
        true
    }

    fn holds(&self, action: Action) -> bool {
        self.held
            .iter()
            .any(|k| self.keys.binding(k).map(|(_, a)| a) == Some(action))
    }

    pub fn snapshot(&self) -> InputIntent {
        let s = &self.state;
        let (up, down) = self.vertical().resolve(s.vertical_last_was_up);
        let (left, right) = self.horizontal().resolve(s.horizontal_last_was_left);
        InputIntent {
            up,
            down,
            left,
            right,
            shoot: s.shoot,
        }
    }

    #[cfg(test)]
    pub fn raw(&self) -> &KeyAxisState {
        &self.state
    }

    pub fn vertical(&self) -> AxisState {
        AxisState::of(self.state.up, self.state.down)
    }

    pub fn horizontal(&self) -> AxisState {
        AxisState::of(self.state.left, self.state.right)
    }
}

/// Anything the loop can sample player intents from, once per frame.
pub trait IntentSource {
    fn sample(&self) -> Vec<InputIntent>;
}

impl<T: IntentSource> IntentSource for std::rc::Rc<std::cell::RefCell<T>> {
    fn sample(&self) -> Vec<InputIntent> {
        self.borrow().sample()
    }
}

/// The trackers of every player on this keyboard. Index 0 is the tab's own
/// player (red when hosting).
#[derive(Clone, Debug)]
pub struct LocalControls {
    players: Vec<InputLatchTracker>,
}

impl LocalControls {
    pub fn new(scheme: ControlScheme) -> Self {
        let players = match scheme {
            ControlScheme::Single => vec![InputLatchTracker::new(KeyMap::solo())],
            ControlScheme::SharedKeyboard => vec![
                InputLatchTracker::new(KeyMap::red()),
                InputLatchTracker::new(KeyMap::blue()),
            ],
        };
        Self { players }
    }

    pub fn on_key_down(&mut self, key: &str) -> bool {
        self.players
            .iter_mut()
            .fold(false, |handled, p| p.on_key_down(key) || handled)
    }

    pub fn on_key_up(&mut self, key: &str) -> bool {
        self.players
            .iter_mut()
            .fold(false, |handled, p| p.on_key_up(key) || handled)
    }
}

impl IntentSource for LocalControls {
    fn sample(&self) -> Vec<InputIntent> {
        self.players.iter().map(InputLatchTracker::snapshot).collect()
    }
}
