use crate::difficulty::DeltaMode;
use crate::error::{SkedError, SkedResult};
use crate::schedule::SchedulePolicy;
use crate::standings::Metric;
use chrono::{Datelike, NaiveDate};
use log::LevelFilter;
use nhl_api::cache::DEFAULT_CACHE_DIR;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const SCHEDULE_URL: &str = "http://www.nhl.com/ice/schedulebyseason.htm?season={season}&gameType=2&team=&network=&venue=";
const STANDINGS_URL: &str = "http://www.nhl.com/ice/standings.htm?season={season}&type=DIV";
const VS_EAST_URL: &str = "http://www.nhl.com/ice/standings.htm?season={season}&type=XVE";
const VS_WEST_URL: &str = "http://www.nhl.com/ice/standings.htm?season={season}&type=XVW";

/// Month in which a new season's numbering starts.
const SEASON_START_MONTH: u32 = 9;

// ---------------------------------------------------------------------------
// League shape and scoring
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeagueConfig {
    pub games_full_season: u32,
    pub games_in_conference: u32,
    pub points_per_win: u32,
    pub points_per_overtime_loss: u32,
    pub divisions_per_conference: usize,
    /// Times a team meets each division rival in the balanced schedule.
    pub division_rival_games: usize,
    /// Times a team meets each non-division conference opponent.
    pub conference_games: usize,
}

impl Default for LeagueConfig {
    fn default() -> Self {
        Self {
            games_full_season: 82,
            games_in_conference: 64,
            points_per_win: 2,
            points_per_overtime_loss: 1,
            divisions_per_conference: 3,
            division_rival_games: 3,
            conference_games: 2,
        }
    }
}

impl LeagueConfig {
    pub fn max_points(&self) -> f64 {
        f64::from(self.points_per_win * self.games_full_season)
    }

    pub fn max_in_conference_points(&self) -> f64 {
        f64::from(self.points_per_win * self.games_in_conference)
    }
}

// ---------------------------------------------------------------------------
// Seasons
// ---------------------------------------------------------------------------

/// A season, named by the calendar year it starts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Season {
    pub start_year: i32,
}

impl Season {
    pub fn new(start_year: i32) -> Self {
        Self { start_year }
    }

    /// The season in progress (or about to start) on `date`.
    pub fn containing(date: NaiveDate) -> Self {
        if date.month() >= SEASON_START_MONTH {
            Self::new(date.year())
        } else {
            Self::new(date.year() - 1)
        }
    }

    pub fn previous(self) -> Self {
        Self::new(self.start_year - 1)
    }

    /// nhl.com query parameter, e.g. "20122013".
    pub fn param(&self) -> String {
        format!("{}{}", self.start_year, self.start_year + 1)
    }

    /// Display form, e.g. "2012-2013".
    pub fn label(&self) -> String {
        format!("{}-{}", self.start_year, self.start_year + 1)
    }

    pub fn url(&self, template: &str) -> String {
        template.replace("{season}", &self.param())
    }
}

impl Default for Season {
    fn default() -> Self {
        Self::new(2012)
    }
}

// ---------------------------------------------------------------------------
// Run settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrlTemplates {
    pub schedule: String,
    pub standings: String,
    pub versus_east: String,
    pub versus_west: String,
}

impl Default for UrlTemplates {
    fn default() -> Self {
        Self {
            schedule: SCHEDULE_URL.into(),
            standings: STANDINGS_URL.into(),
            versus_east: VS_EAST_URL.into(),
            versus_west: VS_WEST_URL.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub league: LeagueConfig,
    /// Season whose schedule is rated.
    pub season: Season,
    /// Season whose standings rate the opponents. Defaults to the one before `season`.
    pub reference_season: Option<Season>,
    pub urls: UrlTemplates,
    pub cache_dir: PathBuf,
    pub mode: DeltaMode,
    pub policy: SchedulePolicy,
    pub metric: Metric,
    pub log_level: Option<LevelFilter>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            league: LeagueConfig::default(),
            season: Season::default(),
            reference_season: None,
            urls: UrlTemplates::default(),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            mode: DeltaMode::default(),
            policy: SchedulePolicy::default(),
            metric: Metric::default(),
            log_level: None,
        }
    }
}

impl Settings {
    /// Defaults, then the JSON file named by `NHLSKED_CONFIG`, then the
    /// individual `NHLSKED_*` variables.
    pub fn load() -> SkedResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok(), chrono::Local::now().date_naive())
    }

    pub fn from_lookup<F>(lookup: F, today: NaiveDate) -> SkedResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut settings = match var("NHLSKED_CONFIG") {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        if let Some(value) = var("NHLSKED_SEASON") {
            settings.season = parse_season("NHLSKED_SEASON", &value, today)?;
        }
        if let Some(value) = var("NHLSKED_REFERENCE_SEASON") {
            settings.reference_season = Some(parse_season("NHLSKED_REFERENCE_SEASON", &value, today)?);
        }
        if let Some(value) = var("NHLSKED_CACHE_DIR") {
            settings.cache_dir = PathBuf::from(value);
        }
        if let Some(value) = var("NHLSKED_MODE") {
            settings.mode = value.parse().map_err(|e| SkedError::config("NHLSKED_MODE", e))?;
        }
        if let Some(value) = var("NHLSKED_POLICY") {
            settings.policy = value.parse().map_err(|e| SkedError::config("NHLSKED_POLICY", e))?;
        }
        if let Some(value) = var("NHLSKED_METRIC") {
            settings.metric = value.parse().map_err(|e| SkedError::config("NHLSKED_METRIC", e))?;
        }
        if let Some(value) = var("NHLSKED_LOG") {
            let level = value
                .parse::<LevelFilter>()
                .map_err(|e| SkedError::config("NHLSKED_LOG", e.to_string()))?;
            settings.log_level = Some(level);
        }

        Ok(settings)
    }

    fn from_file(path: &str) -> SkedResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SkedError::config("NHLSKED_CONFIG", format!("could not read {path}: {e}")))?;
        serde_json::from_str(&content)
            .map_err(|e| SkedError::config("NHLSKED_CONFIG", format!("invalid settings json at {path}: {e}")))
    }

    pub fn reference_season(&self) -> Season {
        self.reference_season.unwrap_or_else(|| self.season.previous())
    }

    pub fn schedule_url(&self) -> String {
        self.season.url(&self.urls.schedule)
    }

    pub fn standings_url(&self) -> String {
        self.reference_season().url(&self.urls.standings)
    }

    pub fn versus_east_url(&self) -> String {
        self.reference_season().url(&self.urls.versus_east)
    }

    pub fn versus_west_url(&self) -> String {
        self.reference_season().url(&self.urls.versus_west)
    }
}

fn parse_season(key: &str, value: &str, today: NaiveDate) -> SkedResult<Season> {
    if value.eq_ignore_ascii_case("current") {
        return Ok(Season::containing(today));
    }
    // Accept "2012", "2012-2013" and "20122013".
    let start = value.get(..4).unwrap_or(value);
    start
        .parse::<i32>()
        .ok()
        .filter(|y| (1917..=2100).contains(y))
        .map(Season::new)
        .ok_or_else(|| SkedError::config(key, format!("'{value}' is not a season")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn settings_from(vars: &[(&str, &str)]) -> SkedResult<Settings> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Settings::from_lookup(|key| vars.get(key).cloned(), day(2026, 2, 1))
    }

    #[test]
    fn default_league_points() {
        let league = LeagueConfig::default();
        assert_eq!(league.max_points(), 164.0);
        assert_eq!(league.max_in_conference_points(), 128.0);
    }

    #[test]
    fn season_containing_rolls_over_in_september() {
        assert_eq!(Season::containing(day(2013, 3, 1)), Season::new(2012));
        assert_eq!(Season::containing(day(2013, 8, 31)), Season::new(2012));
        assert_eq!(Season::containing(day(2013, 9, 1)), Season::new(2013));
        assert_eq!(Season::containing(day(2013, 12, 31)), Season::new(2013));
    }

    #[test]
    fn season_formats() {
        let s = Season::new(2012);
        assert_eq!(s.param(), "20122013");
        assert_eq!(s.label(), "2012-2013");
        assert_eq!(s.previous().param(), "20112012");
        assert_eq!(s.url("x?season={season}&t=1"), "x?season=20122013&t=1");
    }

    #[test]
    fn default_urls_point_at_reference_season_standings() {
        let settings = Settings::default();
        assert!(settings.schedule_url().contains("season=20122013"));
        assert!(settings.standings_url().contains("season=20112012&type=DIV"));
        assert!(settings.versus_east_url().ends_with("type=XVE"));
        assert!(settings.versus_west_url().ends_with("type=XVW"));
    }

    #[test]
    fn env_overrides_apply() {
        let settings = settings_from(&[
            ("NHLSKED_SEASON", "2013-2014"),
            ("NHLSKED_MODE", "absolute"),
            ("NHLSKED_POLICY", "home-only"),
            ("NHLSKED_METRIC", "in-conference"),
            ("NHLSKED_CACHE_DIR", "/tmp/sked"),
            ("NHLSKED_LOG", "debug"),
        ])
        .unwrap();
        assert_eq!(settings.season, Season::new(2013));
        assert_eq!(settings.reference_season(), Season::new(2012));
        assert_eq!(settings.mode, DeltaMode::Absolute);
        assert_eq!(settings.policy, SchedulePolicy::HomeOnly);
        assert_eq!(settings.metric, Metric::InConference);
        assert_eq!(settings.cache_dir, PathBuf::from("/tmp/sked"));
        assert_eq!(settings.log_level, Some(LevelFilter::Debug));
    }

    #[test]
    fn current_season_comes_from_today() {
        let settings = settings_from(&[("NHLSKED_SEASON", "current")]).unwrap();
        assert_eq!(settings.season, Season::new(2025));
    }

    #[test]
    fn blank_variables_are_ignored() {
        let settings = settings_from(&[("NHLSKED_MODE", "  ")]).unwrap();
        assert_eq!(settings.mode, DeltaMode::default());
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = settings_from(&[("NHLSKED_MODE", "sideways")]).unwrap_err();
        assert!(err.to_string().contains("NHLSKED_MODE"));
        let err = settings_from(&[("NHLSKED_SEASON", "last year")]).unwrap_err();
        assert!(err.to_string().contains("NHLSKED_SEASON"));
    }

    #[test]
    fn settings_file_fills_in_missing_fields_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sked.json");
        std::fs::write(
            &path,
            r#"{ "season": 2011, "league": { "games_full_season": 48 }, "mode": "raw" }"#,
        )
        .unwrap();

        let settings = settings_from(&[("NHLSKED_CONFIG", path.to_str().unwrap())]).unwrap();
        assert_eq!(settings.season, Season::new(2011));
        assert_eq!(settings.league.games_full_season, 48);
        assert_eq!(settings.league.points_per_win, 2);
        assert_eq!(settings.mode, DeltaMode::Raw);
        assert_eq!(settings.urls, UrlTemplates::default());
    }

    #[test]
    fn missing_settings_file_is_a_config_error() {
        let err = settings_from(&[("NHLSKED_CONFIG", "/nonexistent/sked.json")]).unwrap_err();
        assert!(matches!(err, SkedError::Config { .. }));
    }
}
