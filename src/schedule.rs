use nhl_api::Game;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Team → one opponent entry per game credited to that team.
pub type ScheduleMap = BTreeMap<String, Vec<String>>;

/// Which side of a game gets the opponent added to its schedule.
///
/// The same policy must build both schedules being compared, or the two
/// difficulty numbers are not on the same footing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchedulePolicy {
    /// Home and visitor each get the other.
    #[default]
    Symmetric,
    /// Only the home team gets the visitor.
    HomeOnly,
}

impl SchedulePolicy {
    /// Schedule entries one game contributes.
    pub fn entries_per_game(&self) -> usize {
        match self {
            SchedulePolicy::Symmetric => 2,
            SchedulePolicy::HomeOnly => 1,
        }
    }
}

impl FromStr for SchedulePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "symmetric" => Ok(SchedulePolicy::Symmetric),
            "home-only" | "home" => Ok(SchedulePolicy::HomeOnly),
            other => Err(format!("unknown schedule policy '{other}' (symmetric|home-only)")),
        }
    }
}

impl fmt::Display for SchedulePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulePolicy::Symmetric => f.write_str("symmetric"),
            SchedulePolicy::HomeOnly => f.write_str("home-only"),
        }
    }
}

pub fn extract_schedules<'a>(games: impl IntoIterator<Item = &'a Game>, policy: SchedulePolicy) -> ScheduleMap {
    let mut schedules = ScheduleMap::new();
    for game in games {
        schedules.entry(game.home.clone()).or_default().push(game.visitor.clone());
        if policy == SchedulePolicy::Symmetric {
            schedules.entry(game.visitor.clone()).or_default().push(game.home.clone());
        }
    }
    schedules
}

/// Games whose home team plays in `teams`.
pub fn home_games_within<'a>(games: &'a [Game], teams: &'a BTreeSet<String>) -> impl Iterator<Item = &'a Game> {
    games.iter().filter(|g| teams.contains(&g.home))
}

/// Number of schedule entries credited to each team.
pub fn games_per_team(schedules: &ScheduleMap) -> BTreeMap<&str, usize> {
    schedules.iter().map(|(team, opponents)| (team.as_str(), opponents.len())).collect()
}
