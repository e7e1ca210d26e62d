use crate::balanced;
use crate::config::{Season, Settings};
use crate::difficulty::{DeltaMode, DifficultyMap, conference_difficulty_delta};
use crate::error::{SkedError, SkedResult};
use crate::league::ConferencePartition;
use crate::normalize::normalize_team_name;
use crate::schedule::{ScheduleMap, extract_schedules, games_per_team, home_games_within};
use crate::standings::{Metric, PointsPct, extract_entries, extract_versus_entries, metric_map};
use log::{debug, info};
use nhl_api::client::ApiError;
use nhl_api::{Conference, DataSource, DivisionTable, Game, StandingsTables};

#[derive(Debug)]
pub struct ConferenceReport {
    pub conference: Conference,
    pub difficulty: DifficultyMap,
}

#[derive(Debug)]
pub struct SeasonReport {
    pub season: Season,
    pub reference_season: Season,
    pub mode: DeltaMode,
    pub metric: Metric,
    pub conferences: Vec<ConferenceReport>,
}

impl SeasonReport {
    pub fn title(&self) -> String {
        format!("{} NHL Schedule Difficulty by Team (easiest to hardest)", self.season.label())
    }
}

/// Rate every team's schedule for `settings.season` against the reference
/// season's standings.
pub fn run(source: &dyn DataSource, settings: &Settings) -> SkedResult<SeasonReport> {
    let league = &settings.league;

    let standings_url = settings.standings_url();
    info!("reading {} standings", settings.reference_season().label());
    let tables = source
        .fetch_standings_tables(&standings_url)
        .map_err(|e| fetch_failed("standings", e))?;

    let partitions = Conference::ALL
        .iter()
        .map(|&conference| {
            let conf_tables = conference_tables(&tables, conference, league.divisions_per_conference)?;
            ConferencePartition::from_tables(conference, conf_tables)
        })
        .collect::<SkedResult<Vec<_>>>()?;

    let pct = opponent_ratings(source, settings, &tables)?;
    debug!("{} teams rated by {}", pct.len(), settings.metric);

    info!("reading {} schedule", settings.season.label());
    let games: Vec<Game> = source
        .fetch_schedule_rows(&settings.schedule_url())
        .map_err(|e| fetch_failed("schedule", e))?
        .into_iter()
        .map(|g| Game::new(normalize_team_name(&g.home), normalize_team_name(&g.visitor)))
        .collect();

    let conferences = partitions
        .iter()
        .map(|partition| conference_report(partition, &games, &pct, settings))
        .collect::<SkedResult<Vec<_>>>()?;

    Ok(SeasonReport {
        season: settings.season,
        reference_season: settings.reference_season(),
        mode: settings.mode,
        metric: settings.metric,
        conferences,
    })
}

/// Actual versus balanced difficulty for the teams of one conference.
pub fn conference_report(
    partition: &ConferencePartition,
    games: &[Game],
    pct: &PointsPct,
    settings: &Settings,
) -> SkedResult<ConferenceReport> {
    let teams = partition.teams();
    let policy = settings.policy;

    let home_games: Vec<&Game> = home_games_within(games, &teams).collect();
    let actual = extract_schedules(home_games.iter().copied(), policy);
    let baseline = if settings.mode.needs_baseline() {
        let balanced_games = balanced::conference_schedule(partition, &settings.league)?;
        extract_schedules(&balanced_games, policy)
    } else {
        ScheduleMap::new()
    };
    debug!(
        "{}: {} teams, {} home games, {} {policy} schedule entries",
        partition.conference.label(),
        teams.len(),
        home_games.len(),
        home_games.len() * policy.entries_per_game(),
    );
    for (team, count) in games_per_team(&actual) {
        debug!("  {team}: {count} games");
    }

    let difficulty = conference_difficulty_delta(&teams, &actual, &baseline, pct, settings.mode)?;
    Ok(ConferenceReport { conference: partition.conference, difficulty })
}

/// Team → rating for every team in the league, per the configured metric.
fn opponent_ratings(
    source: &dyn DataSource,
    settings: &Settings,
    tables: &StandingsTables,
) -> SkedResult<PointsPct> {
    let league = &settings.league;
    let mut pct = PointsPct::new();

    for conference in Conference::ALL {
        let entries = if settings.metric.uses_versus_pages() {
            // A conference's record against the other one is on the page
            // named after the other conference.
            let url = match conference {
                Conference::East => settings.versus_west_url(),
                Conference::West => settings.versus_east_url(),
            };
            let versus = source
                .fetch_standings_tables(&url)
                .map_err(|e| fetch_failed("versus standings", e))?;
            extract_versus_entries(conference_tables(&versus, conference, league.divisions_per_conference)?)?
        } else {
            extract_entries(conference_tables(tables, conference, league.divisions_per_conference)?)?
        };
        pct.extend(metric_map(&entries, settings.metric, league)?);
    }

    Ok(pct)
}

fn conference_tables(
    tables: &StandingsTables,
    conference: Conference,
    divisions_per_conference: usize,
) -> SkedResult<&[DivisionTable]> {
    tables
        .for_conference(conference, divisions_per_conference)
        .map_err(|e| SkedError::parse("standings", e.to_string()))
}

fn fetch_failed(stage: &'static str, source: ApiError) -> SkedError {
    SkedError::Fetch { stage, source }
}
