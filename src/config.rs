use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "BATTING_DASHBOARD_CONFIG";
/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "dashboard.json";

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

/// Everything that differs between deployments of the dashboard: where the
/// data lives, how the league is split up, and how things are labelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Remote season CSV.
    pub dataset_url: String,
    /// Local season file; when set it is used instead of `dataset_url`.
    pub dataset_path: Option<PathBuf>,
    /// Game type kept from the season dump (`R` = regular season).
    pub game_type: String,
    pub batter_ids: IdentitySource,
    pub pitcher_ids: IdentitySource,
    pub divisions: Vec<Division>,
    pub palette: PaletteConfig,
    pub detail_labels: DetailLabels,
    /// Base of the Baseball Savant search endpoint.
    pub savant_url: String,
    /// Answer per-game lookups from the season table instead of Savant.
    pub offline: bool,
    pub http: HttpConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            dataset_url: "https://drive.google.com/uc?export=download&id=1sWJCEA7MUrOCGfj61ES1JQHJGBfYVYN3"
                .to_string(),
            dataset_path: None,
            game_type: "R".to_string(),
            batter_ids: IdentitySource::new("Batter_ID(2025).xlsx", "batter", "batter_name"),
            pitcher_ids: IdentitySource::new("Pitcher_ID(2025).xlsx", "pitcher", "pitcher_name"),
            divisions: default_divisions(),
            palette: PaletteConfig::default(),
            detail_labels: DetailLabels::default(),
            savant_url: "https://baseballsavant.mlb.com/statcast_search/csv".to_string(),
            offline: false,
            http: HttpConfig::default(),
        }
    }
}

impl DashboardConfig {
    /// Resolve the config: `$BATTING_DASHBOARD_CONFIG`, then `./dashboard.json`,
    /// then built-in defaults.
    pub fn load() -> Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::from_path(Path::new(&path));
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.exists() {
            return Self::from_path(local);
        }
        log::info!("No {DEFAULT_CONFIG_FILE} found, using built-in defaults");
        Ok(Self::default())
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: DashboardConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.divisions.is_empty() {
            bail!("config lists no divisions");
        }
        if let Some(div) = self.divisions.iter().find(|d| d.teams.is_empty()) {
            bail!("division '{}' has no teams", div.name);
        }
        if self.game_type.trim().is_empty() {
            bail!("game_type must not be empty");
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// A reference table mapping a player id column to a display-name column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentitySource {
    pub path: PathBuf,
    pub id_column: String,
    pub name_column: String,
}

impl IdentitySource {
    pub fn new(path: impl Into<PathBuf>, id_column: &str, name_column: &str) -> Self {
        Self {
            path: path.into(),
            id_column: id_column.to_string(),
            name_column: name_column.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Division {
    pub name: String,
    pub teams: Vec<String>,
}

fn default_divisions() -> Vec<Division> {
    let table: [(&str, [&str; 5]); 6] = [
        ("NL East", ["PHI", "NYM", "MIA", "WSH", "ATL"]),
        ("NL Central", ["CHC", "MIL", "STL", "CIN", "PIT"]),
        ("NL West", ["LAD", "SD", "SF", "ARI", "COL"]),
        ("AL East", ["NYY", "BOS", "TOR", "TB", "BAL"]),
        ("AL Central", ["DET", "KC", "CLE", "MIN", "CWS"]),
        ("AL West", ["TEX", "LAA", "HOU", "OAK", "SEA"]),
    ];
    table
        .iter()
        .map(|(name, teams)| Division {
            name: name.to_string(),
            teams: teams.iter().map(|t| t.to_string()).collect(),
        })
        .collect()
}

/// Pitch-name colors for the location chart. Colors are hex (`#D22D49`) or
/// CSS names (`teal`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteConfig {
    pub pitches: Vec<PitchColor>,
    /// Color for pitch names not listed above.
    pub other: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitchColor {
    pub pitch: String,
    pub color: String,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        let pitches = [
            ("4-Seam Fastball", "#D22D49"),
            ("Sinker", "#FE9D00"),
            ("Cutter", "#933F2C"),
            ("Slider", "darkkhaki"),
            ("Curveball", "teal"),
            ("Changeup", "#1DBE3A"),
            ("Splitter", "#888888"),
        ];
        Self {
            pitches: pitches
                .iter()
                .map(|(pitch, color)| PitchColor {
                    pitch: pitch.to_string(),
                    color: color.to_string(),
                })
                .collect(),
            other: "black".to_string(),
        }
    }
}

/// Header labels of the nine-column pitch detail table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailLabels {
    pub number: String,
    pub pitch: String,
    pub outs: String,
    pub balls: String,
    pub strikes: String,
    pub velocity: String,
    pub spin: String,
    pub result: String,
    pub description: String,
}

impl Default for DetailLabels {
    fn default() -> Self {
        Self {
            number: "No".to_string(),
            pitch: "Type".to_string(),
            outs: "Out".to_string(),
            balls: "B".to_string(),
            strikes: "S".to_string(),
            velocity: "Velo(km/h)".to_string(),
            spin: "Spin(rpm)".to_string(),
            result: "Result".to_string(),
            description: "Desc".to_string(),
        }
    }
}

impl DetailLabels {
    /// Labels in display order.
    pub fn as_array(&self) -> [&str; 9] {
        [
            &self.number,
            &self.pitch,
            &self.outs,
            &self.balls,
            &self.strikes,
            &self.velocity,
            &self.spin,
            &self.result,
            &self.description,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 180,
            user_agent: concat!("batting-dashboard/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_thirty_teams() {
        let config = DashboardConfig::default();
        config.validate().unwrap();
        let teams: usize = config.divisions.iter().map(|d| d.teams.len()).sum();
        assert_eq!(teams, 30);
        assert_eq!(crate::data::filter::teams_for(&config.divisions, "AL East")[0], "NYY");
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let json = r#"{ "offline": true, "dataset_path": "season.parquet" }"#;
        let config: DashboardConfig = serde_json::from_str(json).unwrap();
        assert!(config.offline);
        assert_eq!(config.dataset_path, Some(PathBuf::from("season.parquet")));
        assert_eq!(config.game_type, "R");
        assert_eq!(config.detail_labels.velocity, "Velo(km/h)");
    }

    #[test]
    fn validate_rejects_empty_division() {
        let mut config = DashboardConfig::default();
        config.divisions.push(Division {
            name: "Nowhere".to_string(),
            teams: Vec::new(),
        });
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Nowhere"));
    }
}
