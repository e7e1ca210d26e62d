//! nhl.com page markup → rows.
//!
//! Schedule:  http://www.nhl.com/ice/schedulebyseason.htm?season={season}&gameType=2
//! Standings: http://www.nhl.com/ice/standings.htm?season={season}&type=DIV
use crate::{DivisionTable, Game, Row, StandingsTables};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

static SCHEDULE_ROW: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".schedTbl tbody tr").unwrap());
static TEAM_CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td.team").unwrap());
static DIVISION: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".Division").unwrap());
static BODY_ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tbody tr").unwrap());
static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());

/// Every (home, visitor) pair on a season schedule page.
///
/// Rows that don't carry two team cells (date headers, ads) are skipped.
pub fn parse_schedule(html: &str) -> Vec<Game> {
    let document = Html::parse_document(html);
    let mut games = Vec::new();

    for row in document.select(&SCHEDULE_ROW) {
        let teams: Vec<String> = row.select(&TEAM_CELL).map(cell_text).collect();
        match teams.as_slice() {
            [home, visitor, ..] if !home.is_empty() && !visitor.is_empty() => {
                games.push(Game::new(home.as_str(), visitor.as_str()));
            }
            _ => log::trace!("skipping schedule row with {} team cells", teams.len()),
        }
    }

    games
}

/// Every division table on a standings page, in page order.
pub fn parse_standings(html: &str) -> StandingsTables {
    let document = Html::parse_document(html);
    let divisions = document
        .select(&DIVISION)
        .map(|division| DivisionTable {
            rows: division
                .select(&BODY_ROW)
                .map(|row| Row { cells: row.select(&CELL).map(cell_text).collect() })
                .collect(),
        })
        .collect();

    StandingsTables { divisions }
}

/// Text content of an element with runs of whitespace collapsed to one space.
fn cell_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
