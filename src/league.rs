use crate::error::{SkedError, SkedResult};
use crate::normalize::normalize_team_name;
use nhl_api::{Conference, DivisionTable};
use std::collections::BTreeSet;

/// Standings column holding the team label.
pub const TEAM_COLUMN: usize = 1;
/// Rows shorter than this are header/footer noise.
pub const MIN_DATA_COLUMNS: usize = 8;

pub type Division = BTreeSet<String>;

/// A conference split into its divisions. Divisions are disjoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConferencePartition {
    pub conference: Conference,
    pub divisions: Vec<Division>,
}

impl ConferencePartition {
    pub fn new(conference: Conference, divisions: Vec<Division>) -> SkedResult<Self> {
        if let Some(team) = first_shared_team(&divisions) {
            let matches = divisions.iter().filter(|d| d.contains(&team)).count();
            return Err(SkedError::DivisionLookup { team, matches });
        }
        Ok(Self { conference, divisions })
    }

    /// Team names from the label column of each division's data rows.
    pub fn from_tables(conference: Conference, tables: &[DivisionTable]) -> SkedResult<Self> {
        let divisions = tables
            .iter()
            .map(|table| {
                table
                    .rows
                    .iter()
                    .filter(|row| row.len() >= MIN_DATA_COLUMNS)
                    .filter_map(|row| row.cell(TEAM_COLUMN))
                    .map(normalize_team_name)
                    .collect::<Division>()
            })
            .collect();
        Self::new(conference, divisions)
    }

    pub fn teams(&self) -> BTreeSet<String> {
        self.divisions.iter().flatten().cloned().collect()
    }

    /// The one division `team` plays in.
    pub fn division_of(&self, team: &str) -> SkedResult<&Division> {
        let mut matching = self.divisions.iter().filter(|d| d.contains(team));
        match (matching.next(), matching.next()) {
            (Some(division), None) => Ok(division),
            (None, _) => Err(SkedError::DivisionLookup { team: team.to_owned(), matches: 0 }),
            (Some(_), Some(_)) => Err(SkedError::DivisionLookup {
                team: team.to_owned(),
                matches: self.divisions.iter().filter(|d| d.contains(team)).count(),
            }),
        }
    }
}

fn first_shared_team(divisions: &[Division]) -> Option<String> {
    let mut seen = BTreeSet::new();
    divisions.iter().flatten().find(|team| !seen.insert(*team)).cloned()
}
