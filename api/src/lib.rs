pub mod cache;
pub mod client;
pub mod nhl;

use crate::client::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Domain types — clean model, independent of the nhl.com markup
// ---------------------------------------------------------------------------

/// One regular-season game, team names exactly as the schedule page shows them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Game {
    pub home: String,
    pub visitor: String,
}

impl Game {
    pub fn new(home: impl Into<String>, visitor: impl Into<String>) -> Self {
        Self { home: home.into(), visitor: visitor.into() }
    }
}

/// The two halves of the league. The standings page lists East first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Conference {
    #[default]
    East,
    West,
}

impl Conference {
    pub const ALL: [Conference; 2] = [Conference::East, Conference::West];

    pub fn label(&self) -> &'static str {
        match self {
            Conference::East => "Eastern Conference",
            Conference::West => "Western Conference",
        }
    }

    /// Position of this conference's tables in page order.
    pub fn index(&self) -> usize {
        match self {
            Conference::East => 0,
            Conference::West => 1,
        }
    }

    pub fn other(&self) -> Conference {
        match self {
            Conference::East => Conference::West,
            Conference::West => Conference::East,
        }
    }
}

/// A single table row: the text of each `<td>`, in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    pub cells: Vec<String>,
}

impl Row {
    pub fn new<S: Into<String>>(cells: impl IntoIterator<Item = S>) -> Self {
        Self { cells: cells.into_iter().map(Into::into).collect() }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell(&self, index: usize) -> Option<&str> {
        self.cells.get(index).map(String::as_str)
    }
}

/// Raw rows of one division's standings table, header and footer rows included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DivisionTable {
    pub rows: Vec<Row>,
}

/// Every division table on a standings page, in page order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StandingsTables {
    pub divisions: Vec<DivisionTable>,
}

impl StandingsTables {
    /// The slice of division tables belonging to `conference`.
    ///
    /// The page lists every East division before any West division, so the
    /// split is positional.
    pub fn for_conference(
        &self,
        conference: Conference,
        divisions_per_conference: usize,
    ) -> ApiResult<&[DivisionTable]> {
        let expected = divisions_per_conference * Conference::ALL.len();
        if self.divisions.len() != expected {
            return Err(ApiError::Other(format!(
                "expected {expected} division tables, found {}",
                self.divisions.len()
            )));
        }
        let start = conference.index() * divisions_per_conference;
        Ok(&self.divisions[start..start + divisions_per_conference])
    }
}

/// Where schedule and standings rows come from. The difficulty pipeline only
/// ever sees rows and games, never markup.
pub trait DataSource {
    fn fetch_schedule_rows(&self, url: &str) -> ApiResult<Vec<Game>>;
    fn fetch_standings_tables(&self, url: &str) -> ApiResult<StandingsTables>;
}
