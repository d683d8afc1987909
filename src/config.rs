use serde::{Deserialize, Serialize};

use crate::state::LaunchParams;

pub const LOG_LEVEL_PARAM: &str = "log";
pub const MAX_GOALS_PARAM: &str = "max_goals";

/// Rules the engine is started with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// First team to reach this many goals wins.
    pub max_goals: u32,
    /// Frames the pitch stays frozen after a goal before kickoff.
    pub reset_time_frames: u32,
    /// Host sends a state update every this many frames.
    pub broadcast_interval_frames: u32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            max_goals: 3,
            reset_time_frames: 120,
            broadcast_interval_frames: 3,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(with = "level_name")]
    pub log_level: log::Level,
    pub match_config: MatchConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: log::Level::Info,
            match_config: MatchConfig::default(),
        }
    }
}

impl AppConfig {
    /// Unknown or unparsable values fall back to the defaults.
    pub fn from_launch_params(params: &LaunchParams) -> Self {
        let mut config = Self::default();
        if let Some(level) = params
            .get(LOG_LEVEL_PARAM)
            .and_then(|v| v.parse::<log::Level>().ok())
        {
            config.log_level = level;
        }
        if let Some(goals) = params
            .get(MAX_GOALS_PARAM)
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|g| *g > 0)
        {
            config.match_config.max_goals = goals;
        }
        config
    }
}

mod level_name {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(level: &log::Level, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(level.as_str())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<log::Level, D::Error> {
        let raw = String::deserialize(d)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_params() {
        let config = AppConfig::from_launch_params(&LaunchParams::default());
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.match_config.max_goals, 3);
    }

    #[test]
    fn reads_log_level_and_goal_limit() {
        let params = LaunchParams::from_pairs([("log", "debug"), ("max_goals", "5")]);
        let config = AppConfig::from_launch_params(&params);
        assert_eq!(config.log_level, log::Level::Debug);
        assert_eq!(config.match_config.max_goals, 5);
    }

    #[test]
    fn ignores_garbage() {
        let params = LaunchParams::from_pairs([("log", "loud"), ("max_goals", "0")]);
        assert_eq!(AppConfig::from_launch_params(&params), AppConfig::default());
    }

    #[test]
    fn serializes_level_by_name() {
        let json = serde_json::to_string(&AppConfig::default()).unwrap();
        assert!(json.contains("\"log_level\":\"INFO\""), "{json}");
        let back: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, AppConfig::default());
    }
}
