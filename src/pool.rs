// Player pool: the canonical draftable-player type and the salary CSV loader.
//
// All site-specific row shapes are converted to one `Player` type at this
// boundary; the optimizer and simulator never see raw CSV records. Reads
// DraftKings-style salary CSVs; header aliases cover the common projection
// export variants.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::Path;
use tracing::warn;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Availability flag carried through from the slate data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerStatus {
    Active,
    Questionable,
    Out,
}

impl PlayerStatus {
    fn parse(s: &str) -> PlayerStatus {
        match s.trim().to_uppercase().as_str() {
            "O" | "OUT" | "IR" | "SUSP" => PlayerStatus::Out,
            "Q" | "QUESTIONABLE" | "GTD" | "D" | "DOUBTFUL" => PlayerStatus::Questionable,
            _ => PlayerStatus::Active,
        }
    }
}

/// A draftable player. Immutable for the duration of one optimization run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    pub name: String,
    pub team: String,
    #[serde(default)]
    pub opponent: Option<String>,
    /// Uppercase position codes; never empty.
    pub positions: Vec<String>,
    /// Site salary in currency units; always positive.
    pub salary: u32,
    /// Projected fantasy points. Missing projections default to 0.
    #[serde(default)]
    pub projection: f64,
    #[serde(default)]
    pub ceiling: Option<f64>,
    #[serde(default)]
    pub floor: Option<f64>,
    /// Projected ownership fraction in [0, 1].
    #[serde(default)]
    pub ownership: Option<f64>,
    /// Score volatility as a fraction of the projection. The simulator
    /// defaults this to 0.4 when absent.
    #[serde(default)]
    pub volatility: Option<f64>,
    /// Weather penalty in [0, 1]; 0 = no impact.
    #[serde(default)]
    pub weather_impact: Option<f64>,
    /// Direct stadium scoring multiplier, ~1.0 for a neutral venue.
    #[serde(default)]
    pub stadium_factor: Option<f64>,
    /// Matchup difficulty penalty in [0, 1]; 0 = easiest matchup.
    #[serde(default)]
    pub matchup_difficulty: Option<f64>,
    #[serde(default = "default_status")]
    pub status: PlayerStatus,
}

fn default_status() -> PlayerStatus {
    PlayerStatus::Active
}

impl Player {
    /// Whether the player may be selected by the optimizer.
    pub fn is_active(&self) -> bool {
        self.status != PlayerStatus::Out
    }

    /// Whether the player carries the given position code.
    pub fn plays(&self, position: &str) -> bool {
        self.positions.iter().any(|p| p == position)
    }
}

/// A validated collection of players for one slate.
#[derive(Debug, Clone)]
pub struct PlayerPool {
    players: Vec<Player>,
    by_id: HashMap<String, usize>,
}

impl PlayerPool {
    /// Build a pool from already-normalized players, enforcing the pool
    /// invariants: positive salary, non-empty position set, unique ids, and
    /// finite non-negative projection fields. Malformed numbers are rejected
    /// here so the optimizer and simulator never have to mask a NaN.
    pub fn from_players(players: Vec<Player>) -> Result<PlayerPool, PoolError> {
        let mut by_id = HashMap::with_capacity(players.len());
        for (idx, p) in players.iter().enumerate() {
            if p.salary == 0 {
                return Err(PoolError::Validation(format!(
                    "player '{}' has zero salary",
                    p.name
                )));
            }
            if p.positions.is_empty() {
                return Err(PoolError::Validation(format!(
                    "player '{}' has no positions",
                    p.name
                )));
            }
            if !p.projection.is_finite() || p.projection < 0.0 {
                return Err(PoolError::Validation(format!(
                    "player '{}' has invalid projection {}",
                    p.name, p.projection
                )));
            }
            for (field, value) in [
                ("ceiling", p.ceiling),
                ("floor", p.floor),
                ("ownership", p.ownership),
                ("volatility", p.volatility),
                ("weather_impact", p.weather_impact),
                ("stadium_factor", p.stadium_factor),
                ("matchup_difficulty", p.matchup_difficulty),
            ] {
                if value.is_some_and(|v| !v.is_finite()) {
                    return Err(PoolError::Validation(format!(
                        "player '{}' has non-finite {}",
                        p.name, field
                    )));
                }
            }
            if p.volatility.is_some_and(|v| v < 0.0) {
                return Err(PoolError::Validation(format!(
                    "player '{}' has negative volatility",
                    p.name
                )));
            }
            if by_id.insert(p.id.clone(), idx).is_some() {
                return Err(PoolError::Validation(format!(
                    "duplicate player id '{}'",
                    p.id
                )));
            }
        }
        Ok(PlayerPool { players, by_id })
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    /// Players eligible for selection (status not Out).
    pub fn active(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_active())
    }

    pub fn get(&self, id: &str) -> Option<&Player> {
        self.by_id.get(id).map(|&idx| &self.players[idx])
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Raw CSV serde struct (private) — DraftKings salary export format
// ---------------------------------------------------------------------------

/// One salary CSV row. Aliases cover the DraftKings export headers and the
/// lowercase variants produced by projection tools. Extra columns are
/// absorbed via `#[serde(flatten)]`.
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct RawPlayerRow {
    #[serde(rename = "ID", alias = "Id", alias = "id")]
    id: String,
    #[serde(rename = "Name", alias = "name")]
    name: String,
    #[serde(rename = "TeamAbbrev", alias = "Team", alias = "team")]
    team: String,
    #[serde(default, rename = "Opponent", alias = "Opp", alias = "opponent")]
    opponent: Option<String>,
    /// Slash- or comma-separated slot eligibility, e.g. "RB/FLEX". DraftKings
    /// exports carry both this and a plain Position column; this one wins.
    #[serde(default, rename = "Roster Position")]
    roster_position: Option<String>,
    #[serde(default, rename = "Position", alias = "position")]
    position: Option<String>,
    #[serde(rename = "Salary", alias = "salary")]
    salary: f64,
    #[serde(default, rename = "Projection", alias = "projection")]
    projection: Option<f64>,
    #[serde(default, rename = "AvgPointsPerGame")]
    avg_points_per_game: Option<f64>,
    #[serde(default, rename = "Ceiling", alias = "ceiling")]
    ceiling: Option<f64>,
    #[serde(default, rename = "Floor", alias = "floor")]
    floor: Option<f64>,
    #[serde(default, rename = "Ownership", alias = "ownership")]
    ownership: Option<f64>,
    #[serde(default, rename = "Volatility", alias = "volatility")]
    volatility: Option<f64>,
    #[serde(default, rename = "Weather", alias = "weatherImpact", alias = "weather_impact")]
    weather_impact: Option<f64>,
    #[serde(default, rename = "Stadium", alias = "stadiumFactor", alias = "stadium_factor")]
    stadium_factor: Option<f64>,
    #[serde(
        default,
        rename = "Matchup",
        alias = "matchupDifficulty",
        alias = "matchup_difficulty"
    )]
    matchup_difficulty: Option<f64>,
    #[serde(default, rename = "Status", alias = "status")]
    status: Option<String>,
    /// Absorb any extra columns the site includes (Game Info, etc).
    #[serde(flatten)]
    _extra: HashMap<String, serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Split a position cell into uppercase codes. "D/ST" is one code (DST),
/// otherwise '/' and ',' separate multi-position eligibility.
fn parse_positions(raw: &str) -> Vec<String> {
    let normalized = raw.trim().to_uppercase().replace("D/ST", "DST");
    let mut out = Vec::new();
    for code in normalized.split(['/', ',']) {
        let code = code.trim();
        if !code.is_empty() && !out.iter().any(|c| c == code) {
            out.push(code.to_string());
        }
    }
    out
}

fn optional_finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

// ---------------------------------------------------------------------------
// Reader-based loader (private, enables testing without temp files)
// ---------------------------------------------------------------------------

fn load_players_from_reader<R: Read>(rdr: R) -> Result<Vec<Player>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut players: Vec<Player> = Vec::new();
    let mut seen_ids: HashSet<String> = HashSet::new();

    for result in reader.deserialize::<RawPlayerRow>() {
        match result {
            Ok(raw) => {
                let id = raw.id.trim().to_string();
                let name = raw.name.trim().to_string();

                if id.is_empty() {
                    warn!("skipping player '{}': empty id", name);
                    continue;
                }
                if !seen_ids.insert(id.clone()) {
                    warn!("skipping duplicate row for player id '{}'", id);
                    continue;
                }
                if !raw.salary.is_finite() || raw.salary < 1.0 {
                    warn!("skipping player '{}': invalid salary {}", name, raw.salary);
                    continue;
                }
                let position_cell = raw
                    .roster_position
                    .as_deref()
                    .filter(|s| !s.trim().is_empty())
                    .or(raw.position.as_deref())
                    .unwrap_or("");
                let positions = parse_positions(position_cell);
                if positions.is_empty() {
                    warn!("skipping player '{}': no position codes", name);
                    continue;
                }
                let projection = match raw.projection.or(raw.avg_points_per_game) {
                    Some(p) if p.is_finite() && p >= 0.0 => p,
                    Some(p) => {
                        warn!("skipping player '{}': invalid projection {}", name, p);
                        continue;
                    }
                    None => 0.0,
                };
                let volatility = match optional_finite(raw.volatility) {
                    Some(v) if v < 0.0 => {
                        warn!("player '{}': ignoring negative volatility {}", name, v);
                        None
                    }
                    other => other,
                };

                players.push(Player {
                    id,
                    name,
                    team: raw.team.trim().to_uppercase(),
                    opponent: raw
                        .opponent
                        .as_deref()
                        .map(|o| o.trim().to_uppercase())
                        .filter(|o| !o.is_empty()),
                    positions,
                    salary: raw.salary.round() as u32,
                    projection,
                    ceiling: optional_finite(raw.ceiling),
                    floor: optional_finite(raw.floor),
                    ownership: optional_finite(raw.ownership),
                    volatility,
                    weather_impact: optional_finite(raw.weather_impact),
                    stadium_factor: optional_finite(raw.stadium_factor),
                    matchup_difficulty: optional_finite(raw.matchup_difficulty),
                    status: raw
                        .status
                        .as_deref()
                        .map(PlayerStatus::parse)
                        .unwrap_or(PlayerStatus::Active),
                });
            }
            Err(e) => {
                warn!("skipping malformed player row: {}", e);
            }
        }
    }

    Ok(players)
}

// ---------------------------------------------------------------------------
// Public path-based loader
// ---------------------------------------------------------------------------

/// Load a player pool from a salary CSV file.
pub fn load_pool(path: &Path) -> Result<PlayerPool, PoolError> {
    let file = std::fs::File::open(path).map_err(|e| PoolError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let players = load_players_from_reader(file).map_err(|e| PoolError::Csv {
        path: path.display().to_string(),
        source: e,
    })?;

    if players.is_empty() {
        return Err(PoolError::Validation(
            "salary CSV produced zero valid players".into(),
        ));
    }

    PlayerPool::from_players(players)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- DraftKings header round-trip --

    #[test]
    fn draftkings_salary_csv_roundtrip() {
        let csv_data = "\
Position,Name,ID,Roster Position,Salary,Game Info,TeamAbbrev,AvgPointsPerGame
QB,Josh Allen,1111,QB,8200,BUF@MIA,BUF,24.5
RB,Christian McCaffrey,2222,RB/FLEX,9100,SF@SEA,SF,22.1";

        let players = load_players_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(players.len(), 2);

        assert_eq!(players[0].id, "1111");
        assert_eq!(players[0].name, "Josh Allen");
        assert_eq!(players[0].team, "BUF");
        assert_eq!(players[0].positions, vec!["QB"]);
        assert_eq!(players[0].salary, 8200);
        assert!((players[0].projection - 24.5).abs() < f64::EPSILON);

        assert_eq!(players[1].positions, vec!["RB", "FLEX"]);
        assert_eq!(players[1].salary, 9100);
    }

    // -- Lowercase projection-tool headers --

    #[test]
    fn lowercase_headers_accepted() {
        let csv_data = "\
id,name,team,position,salary,projection,volatility,status
p1,Some Guy,DAL,WR,5600,14.2,0.5,active";

        let players = load_players_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].team, "DAL");
        assert_eq!(players[0].volatility, Some(0.5));
        assert_eq!(players[0].status, PlayerStatus::Active);
    }

    // -- Position parsing --

    #[test]
    fn dst_slash_normalized() {
        assert_eq!(parse_positions("D/ST"), vec!["DST"]);
        assert_eq!(parse_positions("rb/wr"), vec!["RB", "WR"]);
        assert_eq!(parse_positions("PG, SG"), vec!["PG", "SG"]);
        assert_eq!(parse_positions("RB/RB"), vec!["RB"]);
    }

    // -- Status parsing --

    #[test]
    fn status_variants_parsed() {
        assert_eq!(PlayerStatus::parse("OUT"), PlayerStatus::Out);
        assert_eq!(PlayerStatus::parse("o"), PlayerStatus::Out);
        assert_eq!(PlayerStatus::parse("Q"), PlayerStatus::Questionable);
        assert_eq!(PlayerStatus::parse("GTD"), PlayerStatus::Questionable);
        assert_eq!(PlayerStatus::parse(""), PlayerStatus::Active);
        assert_eq!(PlayerStatus::parse("active"), PlayerStatus::Active);
    }

    #[test]
    fn out_players_excluded_from_active() {
        let csv_data = "\
id,name,team,position,salary,projection,status
p1,Healthy Guy,DAL,WR,5600,14.2,active
p2,Hurt Guy,DAL,WR,5400,13.0,OUT";

        let players = load_players_from_reader(csv_data.as_bytes()).unwrap();
        let pool = PlayerPool::from_players(players).unwrap();
        assert_eq!(pool.len(), 2);

        let active: Vec<&str> = pool.active().map(|p| p.name.as_str()).collect();
        assert_eq!(active, vec!["Healthy Guy"]);
    }

    // -- Row skipping --

    #[test]
    fn invalid_salary_rows_skipped() {
        let csv_data = "\
id,name,team,position,salary,projection
p1,Valid Guy,DAL,WR,5600,14.2
p2,Free Guy,DAL,WR,0,10.0
p3,NaN Guy,DAL,WR,NaN,10.0";

        let players = load_players_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].name, "Valid Guy");
    }

    #[test]
    fn negative_projection_rows_skipped() {
        let csv_data = "\
id,name,team,position,salary,projection
p1,Valid Guy,DAL,WR,5600,14.2
p2,Negative Guy,DAL,WR,5600,-3.0";

        let players = load_players_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].name, "Valid Guy");
    }

    #[test]
    fn negative_volatility_dropped_not_fatal() {
        let csv_data = "\
id,name,team,position,salary,projection,volatility
p1,Jumpy Guy,DAL,WR,5600,14.2,-0.3";

        let players = load_players_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].volatility, None);
        // The sanitized row still satisfies the pool invariants.
        PlayerPool::from_players(players).unwrap();
    }

    #[test]
    fn missing_projection_defaults_to_zero() {
        let csv_data = "\
id,name,team,position,salary
p1,Punt Play,DAL,DST,2500";

        let players = load_players_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].projection, 0.0);
    }

    #[test]
    fn duplicate_id_keeps_first_row() {
        let csv_data = "\
id,name,team,position,salary,projection
p1,First Row,DAL,WR,5600,14.2
p1,Second Row,DAL,WR,5400,12.0";

        let players = load_players_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].name, "First Row");
    }

    #[test]
    fn malformed_rows_skipped() {
        let csv_data = "\
id,name,team,position,salary,projection
p1,Valid Guy,DAL,WR,5600,14.2
p2,Broken Guy,DAL,WR,not_a_number,banana
p3,Other Valid,PHI,TE,4200,9.8";

        let players = load_players_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(players.len(), 2);
        assert_eq!(players[1].name, "Other Valid");
    }

    // -- Pool invariants --

    fn bare_player(id: &str) -> Player {
        Player {
            id: id.into(),
            name: format!("Player {id}"),
            team: "DAL".into(),
            opponent: None,
            positions: vec!["WR".into()],
            salary: 5000,
            projection: 10.0,
            ceiling: None,
            floor: None,
            ownership: None,
            volatility: None,
            weather_impact: None,
            stadium_factor: None,
            matchup_difficulty: None,
            status: PlayerStatus::Active,
        }
    }

    #[test]
    fn pool_rejects_duplicate_ids() {
        let player = bare_player("p1");
        let err = PlayerPool::from_players(vec![player.clone(), player]).unwrap_err();
        match err {
            PoolError::Validation(msg) => assert!(msg.contains("duplicate")),
            other => panic!("expected Validation, got: {other}"),
        }
    }

    #[test]
    fn pool_rejects_nan_projection() {
        let mut player = bare_player("p1");
        player.projection = f64::NAN;
        let err = PlayerPool::from_players(vec![player]).unwrap_err();
        match err {
            PoolError::Validation(msg) => assert!(msg.contains("projection")),
            other => panic!("expected Validation, got: {other}"),
        }
    }

    #[test]
    fn pool_rejects_negative_projection() {
        let mut player = bare_player("p1");
        player.projection = -4.2;
        let err = PlayerPool::from_players(vec![player]).unwrap_err();
        match err {
            PoolError::Validation(msg) => assert!(msg.contains("projection")),
            other => panic!("expected Validation, got: {other}"),
        }
    }

    #[test]
    fn pool_rejects_malformed_optional_fields() {
        let mut player = bare_player("p1");
        player.volatility = Some(-0.1);
        match PlayerPool::from_players(vec![player]).unwrap_err() {
            PoolError::Validation(msg) => assert!(msg.contains("volatility")),
            other => panic!("expected Validation, got: {other}"),
        }

        let mut player = bare_player("p2");
        player.ceiling = Some(f64::INFINITY);
        match PlayerPool::from_players(vec![player]).unwrap_err() {
            PoolError::Validation(msg) => assert!(msg.contains("ceiling")),
            other => panic!("expected Validation, got: {other}"),
        }
    }

    #[test]
    fn pool_lookup_by_id() {
        let csv_data = "\
id,name,team,position,salary,projection
p1,Lookup Guy,DAL,WR,5600,14.2";

        let players = load_players_from_reader(csv_data.as_bytes()).unwrap();
        let pool = PlayerPool::from_players(players).unwrap();
        assert_eq!(pool.get("p1").unwrap().name, "Lookup Guy");
        assert!(pool.get("missing").is_none());
    }

    // -- Name/team trimming --

    #[test]
    fn names_and_teams_trimmed() {
        let csv_data = "\
id,name,team,position,salary,projection
p1,  Spacey Guy  , dal ,WR,5600,14.2";

        let players = load_players_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(players[0].name, "Spacey Guy");
        assert_eq!(players[0].team, "DAL");
    }

    // -- Empty CSV --

    #[test]
    fn empty_csv_returns_empty_vec() {
        let csv_data = "id,name,team,position,salary,projection";
        let players = load_players_from_reader(csv_data.as_bytes()).unwrap();
        assert!(players.is_empty());
    }
}
