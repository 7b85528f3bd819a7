use anyhow::{Context, Result};
use chrono::NaiveDate;
use reqwest::Url;
use reqwest::blocking::Client;

use super::enrich::PitchSource;
use super::loader::{fetch_text, http_client, read_csv_events};
use super::model::PlayEvent;
use crate::config::DashboardConfig;

/// Baseball Savant's Statcast search, pitch-level CSV for one batter.
pub struct SavantClient {
    client: Client,
    base_url: String,
}

impl SavantClient {
    pub fn new(config: &DashboardConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(&config.http)?,
            base_url: config.savant_url.clone(),
        })
    }

    /// Search URL for a batter's regular-season pitches in `[start, end]`.
    pub fn search_url(&self, batter: u64, start: NaiveDate, end: NaiveDate) -> Result<Url> {
        let params = [
            ("all", "true".to_string()),
            ("type", "details".to_string()),
            ("player_type", "batter".to_string()),
            ("hfGT", "R|".to_string()),
            ("game_date_gt", start.format("%Y-%m-%d").to_string()),
            ("game_date_lt", end.format("%Y-%m-%d").to_string()),
            ("batters_lookup[]", batter.to_string()),
            ("min_pitches", "0".to_string()),
            ("min_results", "0".to_string()),
            ("group_by", "name".to_string()),
            ("sort_col", "pitches".to_string()),
            ("sort_order", "desc".to_string()),
        ];
        Url::parse_with_params(&self.base_url, &params)
            .with_context(|| format!("invalid Savant URL '{}'", self.base_url))
    }
}

impl PitchSource for SavantClient {
    fn fetch(&self, batter: u64, start: NaiveDate, end: NaiveDate) -> Result<Vec<PlayEvent>> {
        let url = self.search_url(batter, start, end)?;
        let text = fetch_text(&self.client, url.as_str())?;
        // Savant answers an empty body (or a lone header) when nothing matched.
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        let events = read_csv_events(text.as_bytes()).context("parsing Savant CSV")?;
        log::info!("Savant: {} pitches for batter {batter} ({start}..={end})", events.len());
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_url_encodes_batter_and_dates() {
        let client = SavantClient::new(&DashboardConfig::default()).unwrap();
        let day = NaiveDate::from_ymd_opt(2025, 4, 15).unwrap();
        let url = client.search_url(592450, day, day).unwrap();

        assert_eq!(url.host_str(), Some("baseballsavant.mlb.com"));
        let query = url.query().unwrap();
        assert!(query.contains("batters_lookup%5B%5D=592450"));
        assert!(query.contains("game_date_gt=2025-04-15"));
        assert!(query.contains("game_date_lt=2025-04-15"));
        assert!(query.contains("hfGT=R%7C"));
        assert!(query.contains("player_type=batter"));
    }
}
