use crate::difficulty::{DeltaMode, DifficultyMap};
use crate::pipeline::SeasonReport;
use std::io::{self, Write};

const TEAM_WIDTH: usize = 20;
const RULE_WIDTH: usize = 62;

pub fn draw(out: &mut impl Write, report: &SeasonReport) -> io::Result<()> {
    writeln!(out, "{}", report.title())?;
    writeln!(out)?;
    writeln!(out, "{:<width$} Difficulty", "Team", width = TEAM_WIDTH)?;
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;

    for (i, conference) in report.conferences.iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        writeln!(out, "{}", conference.conference.label())?;
        draw_conference(out, &conference.difficulty, report.mode)?;
    }

    out.flush()
}

fn draw_conference(out: &mut impl Write, difficulty: &DifficultyMap, mode: DeltaMode) -> io::Result<()> {
    for (team, value) in difficulty.sorted() {
        writeln!(out, "{team:<width$} {}", format_value(value, mode), width = TEAM_WIDTH)?;
    }
    for team in difficulty.failures.keys() {
        writeln!(out, "{team:<width$} n/a (zero baseline)", width = TEAM_WIDTH)?;
    }
    Ok(())
}

/// Deltas print as signed percentages, raw difficulty as a plain fraction.
pub fn format_value(value: f64, mode: DeltaMode) -> String {
    match mode {
        DeltaMode::Raw => format!("{value:.4}"),
        DeltaMode::Absolute | DeltaMode::Relative => {
            let percent = value * 100.0;
            if value < 0.0 {
                format!("{percent:.3} %")
            } else {
                format!("+{:.3} %", percent.abs())
            }
        }
    }
}
