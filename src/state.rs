use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use crate::color::PitchPalette;
use crate::config::DashboardConfig;
use crate::data::enrich::{GameDetail, PitchSource, SeasonSource, enrich};
use crate::data::error::PipelineError;
use crate::data::filter::{DateOption, Selection, SelectionOptions, options, resolve};
use crate::data::identity::{IdentityTable, with_batter_names};
use crate::data::loader::load_season;
use crate::data::model::Season;
use crate::data::projection::DescriptionFilter;
use crate::data::savant::SavantClient;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Which reference table a file dialog replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityKind {
    Batters,
    Pitchers,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Season rows with batter names (None until loaded). Shared, never mutated.
    pub season: Option<Arc<Season>>,
    pub pitchers: Arc<IdentityTable>,

    /// Current cascade choices and what each selector can offer.
    pub selection: Selection,
    pub options: SelectionOptions,

    /// The enriched game for a complete selection.
    pub detail: Option<GameDetail>,
    /// Description filter applied to the batting-info table and chart.
    pub description: DescriptionFilter,

    pub palette: PitchPalette,

    /// Prompt or warning for the current path (missing choice, empty result).
    pub notice: Option<PipelineError>,

    /// Fatal error shown in the UI.
    pub status_message: Option<String>,
    /// Whether `status_message` came from a failed lookup rather than a load.
    lookup_failed: bool,

    savant: Option<SavantClient>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DashboardConfig::default())
    }
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            palette: PitchPalette::from_config(&config.palette),
            config,
            season: None,
            pitchers: Arc::new(IdentityTable::default()),
            selection: Selection::default(),
            options: SelectionOptions::default(),
            detail: None,
            description: DescriptionFilter::All,
            notice: None,
            status_message: None,
            lookup_failed: false,
            savant: None,
        }
    }

    /// Load identity tables and the season as configured. Failures land in
    /// `status_message`; the previous data is dropped either way.
    pub fn load_all(&mut self) {
        self.season = None;
        self.detail = None;
        match self.try_load() {
            Ok((season, batters, pitchers)) => self.set_data(season, &batters, pitchers),
            Err(e) => {
                log::error!("Failed to load data: {e:#}");
                self.status_message = Some(PipelineError::unavailable(&e).to_string());
            }
        }
    }

    fn try_load(&self) -> Result<(Season, IdentityTable, IdentityTable)> {
        let batters = IdentityTable::load(&self.config.batter_ids)?;
        let pitchers = IdentityTable::load(&self.config.pitcher_ids)?;
        let season = load_season(&self.config)?;
        Ok((season, batters, pitchers))
    }

    /// Ingest freshly loaded data: attach batter names once and reset the
    /// selection.
    pub fn set_data(&mut self, season: Season, batters: &IdentityTable, pitchers: IdentityTable) {
        let named = with_batter_names(&season, batters);
        log::info!(
            "{} season rows, {} batters, {} pitchers",
            named.len(),
            batters.len(),
            pitchers.len()
        );
        self.season = Some(Arc::new(named));
        self.pitchers = Arc::new(pitchers);
        self.selection = Selection::default();
        self.detail = None;
        self.description = DescriptionFilter::All;
        self.status_message = None;
        self.refresh();

        if self.season.as_ref().is_some_and(|s| s.is_empty()) {
            self.status_message = Some(
                PipelineError::empty(
                    crate::data::error::Stage::Season,
                    format!("no '{}' games in the dataset", self.config.game_type),
                )
                .to_string(),
            );
        }
    }

    // -- selection changes ---------------------------------------------------

    pub fn select_division(&mut self, division: String) {
        self.selection.set_division(division);
        self.refresh();
    }

    pub fn select_team(&mut self, team: String) {
        self.selection.set_team(team);
        self.refresh();
    }

    pub fn select_batter(&mut self, batter: String) {
        self.selection.set_batter(batter);
        self.refresh();
    }

    pub fn select_date(&mut self, date: DateOption) {
        self.selection.set_date(date);
        self.refresh();
    }

    /// Only narrows what is displayed; nothing is recomputed.
    pub fn select_description(&mut self, filter: DescriptionFilter) {
        self.description = filter;
    }

    // -- recomputation -------------------------------------------------------

    /// Recompute options and, for a complete selection, the game detail,
    /// using the configured pitch source.
    pub fn refresh(&mut self) {
        let Some(season) = self.season.clone() else {
            return;
        };
        if self.config.offline {
            let source = SeasonSource::new(&season);
            self.refresh_with(&source);
            return;
        }
        let client = match self.savant.take() {
            Some(client) => client,
            None => match SavantClient::new(&self.config) {
                Ok(client) => client,
                Err(e) => {
                    self.report(PipelineError::unavailable(&e));
                    return;
                }
            },
        };
        self.refresh_with(&client);
        self.savant = Some(client);
    }

    /// Same as [`refresh`](Self::refresh) with an explicit pitch source.
    pub fn refresh_with(&mut self, source: &dyn PitchSource) {
        let Some(season) = self.season.clone() else {
            return;
        };
        let divisions = &self.config.divisions;
        self.options = options(&season, divisions, &self.selection);
        self.notice = None;

        let slice = match resolve(&season, divisions, &self.selection) {
            Ok(slice) => slice,
            Err(e) => {
                self.detail = None;
                self.report(e);
                return;
            }
        };

        let current = self.detail.as_ref().is_some_and(|d| {
            d.team == slice.team && d.batter == slice.batter && d.date == slice.date
        });
        if current {
            self.notice = self.detail.as_ref().and_then(GameDetail::lookup_notice);
            return;
        }

        match enrich(&slice, source, &self.pitchers) {
            Ok(detail) => {
                log::info!(
                    "{}: {} pitches, {} from lookup",
                    detail.headline(),
                    detail.pitches.len(),
                    detail.lookup.len()
                );
                if self.lookup_failed {
                    self.status_message = None;
                    self.lookup_failed = false;
                }
                self.notice = detail.lookup_notice();
                self.description = DescriptionFilter::All;
                self.detail = Some(detail);
            }
            Err(e) => {
                self.detail = None;
                self.lookup_failed = e.is_fatal();
                self.report(e);
            }
        }
    }

    fn report(&mut self, err: PipelineError) {
        match &err {
            PipelineError::DataUnavailable(_) => {
                log::error!("{err}");
                self.status_message = Some(err.to_string());
            }
            PipelineError::EmptyResult { .. } => {
                log::warn!("{err}");
                self.notice = Some(err);
            }
            _ => {
                log::debug!("{err}");
                self.notice = Some(err);
            }
        }
    }

    // -- file menu -----------------------------------------------------------

    /// Use a local season file from now on and reload.
    pub fn open_season_file(&mut self, path: PathBuf) {
        self.config.dataset_path = Some(path);
        self.load_all();
    }

    /// Replace one reference table and reload.
    pub fn open_identity_file(&mut self, kind: IdentityKind, path: PathBuf) {
        match kind {
            IdentityKind::Batters => self.config.batter_ids.path = path,
            IdentityKind::Pitchers => self.config.pitcher_ids.path = path,
        }
        self.load_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::error::Stage;
    use crate::data::model::{InningHalf, PlayEvent, normalize_date};

    fn pitch(home: &str, away: &str, half: InningHalf, batter: u64, speed: f64) -> PlayEvent {
        PlayEvent {
            game_date: normalize_date("2025-04-15"),
            game_type: Some("R".to_string()),
            home_team: home.to_string(),
            away_team: away.to_string(),
            inning_half: half,
            batter,
            pitcher: 50,
            release_speed: Some(speed),
            description: Some("ball".to_string()),
            ..Default::default()
        }
    }

    fn offline_state() -> AppState {
        let config = DashboardConfig {
            offline: true,
            ..Default::default()
        };
        let mut state = AppState::new(config);
        let season = Season::from_events(
            vec![
                pitch("NYY", "BOS", InningHalf::Bottom, 1, 95.0),
                pitch("NYY", "BOS", InningHalf::Bottom, 1, 88.0),
                pitch("NYY", "BOS", InningHalf::Top, 2, 97.0),
            ],
            "R",
        );
        let batters = IdentityTable::from_pairs([(1, "John Doe"), (2, "Red Sock")]);
        let pitchers = IdentityTable::from_pairs([(50, "Gerrit Cole")]);
        state.set_data(season, &batters, pitchers);
        state
    }

    #[test]
    fn walking_the_cascade_produces_detail() {
        let mut state = offline_state();
        assert_eq!(state.notice, Some(PipelineError::MissingSelection(Stage::Division)));

        state.select_division("AL East".to_string());
        state.select_team("NYY".to_string());
        assert_eq!(state.options.batters, vec!["John Doe".to_string()]);

        state.select_batter("John Doe".to_string());
        let date = state.options.dates[0].clone();
        assert_eq!(date.to_string(), "2025-04-15 vs BOS");

        state.select_date(date);
        let detail = state.detail.as_ref().unwrap();
        assert_eq!(detail.pitches.len(), 2);
        assert_eq!(detail.pitches.events()[0].release_speed, Some(152.9));
        assert_eq!(detail.lookup.len(), 2);
        assert_eq!(detail.lookup.events()[0].pitcher_name.as_deref(), Some("Gerrit Cole"));
        assert!(state.notice.is_none());
        assert!(state.status_message.is_none());
    }

    #[test]
    fn refresh_does_not_reconvert_current_game() {
        let mut state = offline_state();
        state.select_division("AL East".to_string());
        state.select_team("NYY".to_string());
        state.select_batter("John Doe".to_string());
        let date = state.options.dates[0].clone();
        state.select_date(date);
        state.refresh();
        state.refresh();
        let detail = state.detail.as_ref().unwrap();
        assert_eq!(detail.pitches.events()[0].release_speed, Some(152.9));
        // the shared season still holds mph
        let season = state.season.as_ref().unwrap();
        assert_eq!(season.events()[0].release_speed, Some(95.0));
    }

    struct Unreachable;

    impl PitchSource for Unreachable {
        fn fetch(
            &self,
            _: u64,
            _: chrono::NaiveDate,
            _: chrono::NaiveDate,
        ) -> anyhow::Result<Vec<PlayEvent>> {
            anyhow::bail!("connection refused")
        }
    }

    #[test]
    fn successful_lookup_clears_lookup_failure() {
        let mut state = offline_state();
        state.select_division("AL East".to_string());
        state.select_team("NYY".to_string());
        state.select_batter("John Doe".to_string());
        let date = state.options.dates[0].clone();
        state.select_date(date);

        state.detail = None;
        state.refresh_with(&Unreachable);
        assert!(state.detail.is_none());
        assert!(state.status_message.as_deref().is_some_and(|m| m.contains("connection refused")));

        let season = state.season.clone().unwrap();
        state.refresh_with(&SeasonSource::new(&season));
        assert!(state.detail.is_some());
        assert!(state.status_message.is_none());
    }

    #[test]
    fn team_without_batter_reports_empty_result() {
        let mut state = offline_state();
        state.select_division("AL East".to_string());
        state.select_team("BOS".to_string());
        assert_eq!(state.options.batters, vec!["Red Sock".to_string()]);
        state.select_batter("John Doe".to_string());
        assert!(matches!(
            state.notice,
            Some(PipelineError::EmptyResult { stage: Stage::Batter, .. })
        ));
        assert!(state.detail.is_none());
        assert!(state.status_message.is_none());
    }

    #[test]
    fn missing_files_surface_as_status() {
        let mut state = AppState::new(DashboardConfig {
            batter_ids: crate::config::IdentitySource::new(
                "does/not/exist.csv",
                "batter",
                "batter_name",
            ),
            ..Default::default()
        });
        state.load_all();
        assert!(state.season.is_none());
        let msg = state.status_message.unwrap();
        assert!(msg.starts_with("data unavailable"));
    }
}
