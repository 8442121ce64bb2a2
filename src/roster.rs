// Roster slot templates keyed by (sport, site).
//
// A template is data, not code: adding a sport or site means adding a lookup
// entry, never touching the solver. Each slot carries its own eligibility
// list, so a FLEX-style slot is just a slot whose list is the union of the
// real positions it accepts.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Sport / site enums
// ---------------------------------------------------------------------------

/// Supported sports for slate templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sport {
    Nfl,
    Nba,
}

impl Sport {
    /// Parse a sport label as it appears in settings files ("nfl", "NFL", ...).
    pub fn parse(s: &str) -> Option<Sport> {
        match s.trim().to_lowercase().as_str() {
            "nfl" => Some(Sport::Nfl),
            "nba" => Some(Sport::Nba),
            _ => None,
        }
    }
}

impl std::fmt::Display for Sport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sport::Nfl => write!(f, "nfl"),
            Sport::Nba => write!(f, "nba"),
        }
    }
}

/// Supported DFS sites. Only the classic DraftKings formats are wired up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Site {
    DraftKings,
}

// ---------------------------------------------------------------------------
// Template types
// ---------------------------------------------------------------------------

/// One roster slot: a display label and the position codes that may fill it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterSlot {
    /// Column label used in upload CSVs, e.g. "RB1" or "FLEX".
    pub label: String,
    /// Uppercase position codes eligible for this slot.
    pub eligible: Vec<String>,
}

impl RosterSlot {
    fn new(label: &str, eligible: &[&str]) -> Self {
        RosterSlot {
            label: label.to_string(),
            eligible: eligible.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Whether a player with the given position codes may fill this slot.
    pub fn accepts(&self, positions: &[String]) -> bool {
        positions.iter().any(|p| self.eligible.contains(p))
    }
}

/// The full slot layout and salary cap for one (sport, site) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterTemplate {
    pub sport: Sport,
    pub site: Site,
    pub salary_cap: u32,
    pub slots: Vec<RosterSlot>,
}

impl RosterTemplate {
    /// Look up the fixed template for a (sport, site) pair.
    pub fn lookup(sport: Sport, site: Site) -> RosterTemplate {
        match (sport, site) {
            (Sport::Nfl, Site::DraftKings) => RosterTemplate {
                sport,
                site,
                salary_cap: 50_000,
                slots: vec![
                    RosterSlot::new("QB", &["QB"]),
                    RosterSlot::new("RB1", &["RB"]),
                    RosterSlot::new("RB2", &["RB"]),
                    RosterSlot::new("WR1", &["WR"]),
                    RosterSlot::new("WR2", &["WR"]),
                    RosterSlot::new("WR3", &["WR"]),
                    RosterSlot::new("TE", &["TE"]),
                    RosterSlot::new("FLEX", &["RB", "WR", "TE"]),
                    RosterSlot::new("DST", &["DST"]),
                ],
            },
            (Sport::Nba, Site::DraftKings) => RosterTemplate {
                sport,
                site,
                salary_cap: 50_000,
                slots: vec![
                    RosterSlot::new("PG", &["PG"]),
                    RosterSlot::new("SG", &["SG"]),
                    RosterSlot::new("SF", &["SF"]),
                    RosterSlot::new("PF", &["PF"]),
                    RosterSlot::new("C", &["C"]),
                    RosterSlot::new("G", &["PG", "SG"]),
                    RosterSlot::new("F", &["SF", "PF"]),
                    RosterSlot::new("UTIL", &["PG", "SG", "SF", "PF", "C"]),
                ],
            },
        }
    }

    /// Number of roster slots (the lineup size N).
    pub fn roster_size(&self) -> usize {
        self.slots.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
