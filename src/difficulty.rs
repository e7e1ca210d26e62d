use crate::error::{SkedError, SkedResult};
use crate::schedule::ScheduleMap;
use crate::standings::PointsPct;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// How the actual and baseline difficulties are combined per team.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeltaMode {
    /// Actual schedule difficulty, no baseline.
    Raw,
    /// actual − baseline.
    Absolute,
    /// (actual − baseline) / baseline.
    #[default]
    Relative,
}

impl DeltaMode {
    pub fn needs_baseline(&self) -> bool {
        !matches!(self, DeltaMode::Raw)
    }

    pub fn combine(&self, team: &str, actual: f64, baseline: f64) -> SkedResult<f64> {
        match self {
            DeltaMode::Raw => Ok(actual),
            DeltaMode::Absolute => Ok(actual - baseline),
            DeltaMode::Relative if baseline == 0.0 => Err(SkedError::Arithmetic {
                team: team.to_owned(),
                message: "baseline difficulty is zero".into(),
            }),
            DeltaMode::Relative => Ok((actual - baseline) / baseline),
        }
    }
}

impl FromStr for DeltaMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" => Ok(DeltaMode::Raw),
            "absolute" => Ok(DeltaMode::Absolute),
            "relative" => Ok(DeltaMode::Relative),
            other => Err(format!("unknown mode '{other}' (raw|absolute|relative)")),
        }
    }
}

impl fmt::Display for DeltaMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeltaMode::Raw => f.write_str("raw"),
            DeltaMode::Absolute => f.write_str("absolute"),
            DeltaMode::Relative => f.write_str("relative"),
        }
    }
}

/// Mean opponent points percentage. A repeated opponent counts once per game.
pub fn mean_opponent_pct(team: &str, opponents: &[String], pct: &PointsPct) -> SkedResult<f64> {
    if opponents.is_empty() {
        return Err(SkedError::DataConsistency { team: team.to_owned(), missing_from: "schedule" });
    }

    let mut total: f64 = 0.0;
    for opponent in opponents {
        total += pct.get(opponent).ok_or_else(|| SkedError::DataConsistency {
            team: opponent.clone(),
            missing_from: "standings",
        })?;
    }
    Ok(total / opponents.len() as f64)
}

/// Per-team difficulty for one conference. Teams whose delta could not be
/// computed are kept aside instead of aborting the whole conference.
#[derive(Debug, Default)]
pub struct DifficultyMap {
    pub values: BTreeMap<String, f64>,
    pub failures: BTreeMap<String, SkedError>,
}

impl DifficultyMap {
    /// Values from easiest to hardest.
    pub fn sorted(&self) -> Vec<(&str, f64)> {
        let mut rows: Vec<_> = self.values.iter().map(|(t, v)| (t.as_str(), *v)).collect();
        rows.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(b.0)));
        rows
    }
}

/// Difficulty of each team in `teams` under `mode`.
///
/// Missing teams or opponents are fatal; a zero baseline only drops that team.
pub fn conference_difficulty_delta(
    teams: &BTreeSet<String>,
    actual: &ScheduleMap,
    baseline: &ScheduleMap,
    pct: &PointsPct,
    mode: DeltaMode,
) -> SkedResult<DifficultyMap> {
    let mut result = DifficultyMap::default();

    for team in teams {
        let actual_difficulty = mean_opponent_pct(team, schedule_of(team, actual)?, pct)?;
        let baseline_difficulty = if mode.needs_baseline() {
            mean_opponent_pct(team, schedule_of(team, baseline)?, pct)?
        } else {
            0.0
        };

        match mode.combine(team, actual_difficulty, baseline_difficulty) {
            Ok(value) => {
                result.values.insert(team.clone(), value);
            }
            Err(e @ SkedError::Arithmetic { .. }) => {
                log::warn!("{e}");
                result.failures.insert(team.clone(), e);
            }
            Err(e) => return Err(e),
        }
    }

    Ok(result)
}

fn schedule_of<'a>(team: &str, schedules: &'a ScheduleMap) -> SkedResult<&'a [String]> {
    schedules
        .get(team)
        .map(Vec::as_slice)
        .ok_or_else(|| SkedError::DataConsistency { team: team.to_owned(), missing_from: "schedule" })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn pct(pairs: &[(&str, f64)]) -> PointsPct {
        pairs.iter().map(|(t, p)| (t.to_string(), *p)).collect()
    }

    /// One (team, opponent) entry per game.
    fn schedules(pairs: &[(&str, &str)]) -> ScheduleMap {
        let mut map = ScheduleMap::new();
        for (team, opponent) in pairs {
            map.entry(team.to_string()).or_default().push(opponent.to_string());
        }
        map
    }

    fn teams(v: &[&str]) -> BTreeSet<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn mean_of_opponents() {
        let p = pct(&[("B", 0.5), ("C", 0.7)]);
        let mean = mean_opponent_pct("A", &names(&["B", "C"]), &p).unwrap();
        assert!((mean - 0.6).abs() < 1e-12);
    }

    #[test]
    fn mean_ignores_order_but_weights_repeats() {
        let p = pct(&[("B", 0.5), ("C", 0.8)]);
        let forward = mean_opponent_pct("A", &names(&["B", "C", "C"]), &p).unwrap();
        let backward = mean_opponent_pct("A", &names(&["C", "B", "C"]), &p).unwrap();
        let once = mean_opponent_pct("A", &names(&["B", "C"]), &p).unwrap();
        assert!((forward - backward).abs() < 1e-12);
        assert!((forward - 0.7).abs() < 1e-12);
        assert!(forward > once);
    }

    #[test]
    fn opponent_missing_from_standings_is_an_error_not_zero() {
        let p = pct(&[("B", 0.5)]);
        let err = mean_opponent_pct("A", &names(&["B", "Quebec"]), &p).unwrap_err();
        assert!(matches!(
            err,
            SkedError::DataConsistency { ref team, missing_from: "standings" } if team == "Quebec"
        ));
    }

    #[test]
    fn empty_schedule_is_an_error() {
        assert!(mean_opponent_pct("A", &[], &PointsPct::new()).is_err());
    }

    #[test]
    fn relative_and_absolute_deltas() {
        let p = pct(&[("B", 0.5), ("C", 0.7)]);
        let actual = schedules(&[("A", "C")]);
        let baseline = schedules(&[("A", "B")]);

        let rel = conference_difficulty_delta(&teams(&["A"]), &actual, &baseline, &p, DeltaMode::Relative).unwrap();
        assert!((rel.values["A"] - 0.4).abs() < 1e-12);

        let abs = conference_difficulty_delta(&teams(&["A"]), &actual, &baseline, &p, DeltaMode::Absolute).unwrap();
        assert!((abs.values["A"] - 0.2).abs() < 1e-12);

        let raw = conference_difficulty_delta(&teams(&["A"]), &actual, &ScheduleMap::new(), &p, DeltaMode::Raw).unwrap();
        assert!((raw.values["A"] - 0.7).abs() < 1e-12);
    }

    #[test]
    fn zero_baseline_flags_only_that_team() {
        let p = pct(&[("Z", 0.0), ("B", 0.5), ("C", 0.6)]);
        let actual = schedules(&[("A", "B"), ("D", "C")]);
        let baseline = schedules(&[("A", "Z"), ("D", "B")]);

        let result =
            conference_difficulty_delta(&teams(&["A", "D"]), &actual, &baseline, &p, DeltaMode::Relative).unwrap();
        assert!(result.failures.contains_key("A"));
        assert!(!result.values.contains_key("A"));
        assert!((result.values["D"] - 0.2).abs() < 1e-12);
    }

    #[test]
    fn team_without_schedule_is_fatal() {
        let p = pct(&[("B", 0.5)]);
        let actual = schedules(&[("A", "B")]);
        let err = conference_difficulty_delta(&teams(&["A", "E"]), &actual, &actual, &p, DeltaMode::Absolute)
            .unwrap_err();
        assert!(matches!(err, SkedError::DataConsistency { ref team, missing_from: "schedule" } if team == "E"));
    }

    #[test]
    fn sorted_is_easiest_first() {
        let map = DifficultyMap {
            values: [("A".to_string(), 0.3), ("B".to_string(), -0.1), ("C".to_string(), 0.0)].into(),
            failures: BTreeMap::new(),
        };
        let order: Vec<_> = map.sorted().into_iter().map(|(t, _)| t).collect();
        assert_eq!(order, vec!["B", "C", "A"]);
    }

    #[test]
    fn mode_from_str() {
        assert_eq!("RELATIVE".parse::<DeltaMode>().unwrap(), DeltaMode::Relative);
        assert_eq!("raw".parse::<DeltaMode>().unwrap(), DeltaMode::Raw);
        assert!("sideways".parse::<DeltaMode>().is_err());
    }
}
