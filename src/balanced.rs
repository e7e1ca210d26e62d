//! Idealized in-conference schedule used as the comparison baseline: every
//! division rival met `division_rival_games` times, every other conference
//! team `conference_games` times, no games against the other conference.
use crate::config::LeagueConfig;
use crate::error::SkedResult;
use crate::league::ConferencePartition;
use nhl_api::Game;
use std::iter;

/// The balanced slate for `team`, as games with `team` at home.
pub fn full_home_schedule(team: &str, partition: &ConferencePartition, league: &LeagueConfig) -> SkedResult<Vec<Game>> {
    let own = partition.division_of(team)?;

    let rivals = own.iter().filter(|t| t.as_str() != team);
    let rest = partition
        .divisions
        .iter()
        .filter(|d| !std::ptr::eq(*d, own))
        .flatten();

    let division_games = rivals.flat_map(|t| iter::repeat_n(t, league.division_rival_games));
    let conference_games = rest.flat_map(|t| iter::repeat_n(t, league.conference_games));

    Ok(division_games
        .chain(conference_games)
        .map(|opponent| Game::new(team, opponent.as_str()))
        .collect())
}

/// Every team's balanced home slate, concatenated.
pub fn conference_schedule(partition: &ConferencePartition, league: &LeagueConfig) -> SkedResult<Vec<Game>> {
    let mut games = Vec::new();
    for team in partition.teams() {
        games.extend(full_home_schedule(&team, partition, league)?);
    }
    Ok(games)
}
