use crate::config::LeagueConfig;
use crate::error::{SkedError, SkedResult};
use crate::league::{MIN_DATA_COLUMNS, TEAM_COLUMN};
use crate::normalize::normalize_team_name;
use nhl_api::{DivisionTable, Row};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

const POINTS_COLUMN: usize = 6;
const RECORD_COLUMN: usize = 8;

/// Team → value fed to the difficulty calculator.
pub type PointsPct = HashMap<String, f64>;

/// Win-loss-overtime record as printed in a standings cell, e.g. "41-31-10".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Record {
    pub wins: u32,
    pub losses: u32,
    pub overtime_losses: u32,
}

impl FromStr for Record {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .trim()
            .split('-')
            .map(|p| p.trim().parse::<u32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("record '{s}': {e}"))?;
        match parts.as_slice() {
            [wins, losses, overtime_losses] => {
                Ok(Record { wins: *wins, losses: *losses, overtime_losses: *overtime_losses })
            }
            _ => Err(format!("record '{s}' is not W-L-OTL")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StandingsEntry {
    pub team: String,
    pub points: u32,
    /// Absent when the row stops short of the record column.
    pub record: Option<Record>,
}

impl StandingsEntry {
    /// Team and points from a division standings row. `None` for
    /// header/footer rows; an error for data rows that don't parse.
    pub fn from_row(row: &Row) -> SkedResult<Option<Self>> {
        if row.len() < MIN_DATA_COLUMNS {
            return Ok(None);
        }

        let team = row.cell(TEAM_COLUMN).map(normalize_team_name).unwrap_or_default();
        let points_text = row.cell(POINTS_COLUMN).unwrap_or_default();
        let points = points_text.trim().parse::<u32>().map_err(|e| {
            SkedError::parse("standings", format!("{team}: points '{points_text}': {e}"))
        })?;

        Ok(Some(Self { team, points, record: None }))
    }

    /// Like [`StandingsEntry::from_row`], plus the W-L-OTL record that only
    /// the versus-conference pages carry.
    pub fn from_versus_row(row: &Row) -> SkedResult<Option<Self>> {
        let Some(mut entry) = Self::from_row(row)? else {
            return Ok(None);
        };
        entry.record = row
            .cell(RECORD_COLUMN)
            .map(|cell| cell.parse::<Record>())
            .transpose()
            .map_err(|e| SkedError::parse("standings", format!("{}: {e}", entry.team)))?;
        Ok(Some(entry))
    }

    pub fn points_pct(&self, league: &LeagueConfig) -> f64 {
        f64::from(self.points) / league.max_points()
    }

    /// Points earned against the other conference, from the record on a
    /// versus page: every win and every overtime loss counts.
    pub fn points_vs_other_conference(&self, league: &LeagueConfig) -> SkedResult<u32> {
        let record = self.record.ok_or_else(|| {
            SkedError::parse("standings", format!("{}: row has no W-L-OTL record", self.team))
        })?;
        record
            .wins
            .checked_mul(league.points_per_win)
            .zip(record.overtime_losses.checked_mul(league.points_per_overtime_loss))
            .and_then(|(wins, otl)| wins.checked_add(otl))
            .ok_or_else(|| {
                SkedError::parse(
                    "standings",
                    format!(
                        "{}: record {}-{}-{} overflows a points total",
                        self.team, record.wins, record.losses, record.overtime_losses
                    ),
                )
            })
    }

    pub fn in_conference_pct(&self, league: &LeagueConfig) -> SkedResult<f64> {
        let versus = self.points_vs_other_conference(league)?;
        Ok((f64::from(self.points) - f64::from(versus)) / league.max_in_conference_points())
    }

    /// How much better (positive) or worse a team did inside its conference
    /// than overall, relative to its overall points percentage.
    pub fn versus_shift(&self, league: &LeagueConfig) -> SkedResult<f64> {
        let pct = self.points_pct(league);
        if pct == 0.0 {
            return Err(SkedError::Arithmetic {
                team: self.team.clone(),
                message: "zero points percentage".into(),
            });
        }
        Ok((self.in_conference_pct(league)? - pct) / pct)
    }
}

/// Every data row of every division table, in page order.
pub fn extract_entries(tables: &[DivisionTable]) -> SkedResult<Vec<StandingsEntry>> {
    collect_entries(tables, StandingsEntry::from_row)
}

/// Same as [`extract_entries`] for a versus-conference page, records included.
pub fn extract_versus_entries(tables: &[DivisionTable]) -> SkedResult<Vec<StandingsEntry>> {
    collect_entries(tables, StandingsEntry::from_versus_row)
}

fn collect_entries(
    tables: &[DivisionTable],
    parse_row: fn(&Row) -> SkedResult<Option<StandingsEntry>>,
) -> SkedResult<Vec<StandingsEntry>> {
    let mut entries = Vec::new();
    for row in tables.iter().flat_map(|t| &t.rows) {
        match parse_row(row)? {
            Some(entry) => entries.push(entry),
            None => log::debug!("skipping standings row with {} columns", row.len()),
        }
    }
    Ok(entries)
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Which standings-derived number rates an opponent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Metric {
    #[default]
    Points,
    InConference,
    VersusShift,
}

impl Metric {
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Points => "points percentage",
            Metric::InConference => "in-conference points percentage",
            Metric::VersusShift => "in-conference shift",
        }
    }

    /// Whether the metric needs the W-L-OTL records, which only the
    /// versus-other-conference standings pages carry.
    pub fn uses_versus_pages(&self) -> bool {
        matches!(self, Metric::InConference | Metric::VersusShift)
    }

    pub fn value(&self, entry: &StandingsEntry, league: &LeagueConfig) -> SkedResult<f64> {
        match self {
            Metric::Points => Ok(entry.points_pct(league)),
            Metric::InConference => entry.in_conference_pct(league),
            Metric::VersusShift => entry.versus_shift(league),
        }
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "points" => Ok(Metric::Points),
            "in-conference" => Ok(Metric::InConference),
            "versus-shift" => Ok(Metric::VersusShift),
            other => Err(format!("unknown metric '{other}' (points|in-conference|versus-shift)")),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Team → metric value for every entry.
pub fn metric_map(entries: &[StandingsEntry], metric: Metric, league: &LeagueConfig) -> SkedResult<PointsPct> {
    entries
        .iter()
        .map(|entry| metric.value(entry, league).map(|value| (entry.team.clone(), value)))
        .collect()
}
