use regex::Regex;
use std::sync::LazyLock;

/// Standings pages mark playoff teams with a clinch letter, e.g. "y - Boston".
static CLINCH_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z] - ").unwrap());

/// Strip the leading clinch marker from a standings label.
///
/// Markers are removed until none is left so the result is a fixed point;
/// real pages only ever carry one.
pub fn normalize_team_name(raw: &str) -> String {
    let mut name = raw.trim();
    while let Some(marker) = CLINCH_PREFIX.find(name) {
        name = name[marker.end()..].trim();
    }
    name.to_owned()
}
