use chrono::NaiveDate;

use super::error::{PipelineError, PipelineResult, Stage};
use super::filter::GameSlice;
use super::identity::{IdentityTable, JoinKey, left_join};
use super::model::{PlayEvent, Season};

/// Multiplier from miles per hour to kilometres per hour.
pub const MPH_TO_KMH: f64 = 1.60934;

/// Convert and round to one decimal, the precision the tables show.
pub fn mph_to_kmh(mph: f64) -> f64 {
    (mph * MPH_TO_KMH * 10.0).round() / 10.0
}

// ---------------------------------------------------------------------------
// PitchSet – rows tagged with their speed unit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedUnit {
    Mph,
    Kmh,
}

/// A set of pitches that knows which unit its speeds are in, so a
/// conversion can never run twice on the same data.
#[derive(Debug, Clone, PartialEq)]
pub struct PitchSet {
    unit: SpeedUnit,
    events: Vec<PlayEvent>,
}

impl PitchSet {
    /// Rows as published upstream, speeds in mph.
    pub fn mph(events: Vec<PlayEvent>) -> Self {
        PitchSet {
            unit: SpeedUnit::Mph,
            events,
        }
    }

    pub fn unit(&self) -> SpeedUnit {
        self.unit
    }

    pub fn events(&self) -> &[PlayEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Convert release speed and launch speed to km/h.
    ///
    /// Fails with [`PipelineError::AlreadyConverted`] if the set is already
    /// in km/h.
    pub fn to_kmh(mut self) -> PipelineResult<PitchSet> {
        if self.unit == SpeedUnit::Kmh {
            return Err(PipelineError::AlreadyConverted);
        }
        for event in &mut self.events {
            event.release_speed = event.release_speed.map(mph_to_kmh);
            event.launch_speed = event.launch_speed.map(mph_to_kmh);
        }
        self.unit = SpeedUnit::Kmh;
        Ok(self)
    }

    /// Left-join pitcher names; row count is unchanged.
    pub fn with_pitcher_names(self, pitchers: &IdentityTable) -> PitchSet {
        PitchSet {
            unit: self.unit,
            events: left_join(&self.events, pitchers, JoinKey::Pitcher),
        }
    }
}

// ---------------------------------------------------------------------------
// PitchSource – per-game pitch lookup
// ---------------------------------------------------------------------------

/// Something that can list one batter's pitches over a date range.
pub trait PitchSource {
    fn fetch(
        &self,
        batter: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> anyhow::Result<Vec<PlayEvent>>;
}

/// Answers lookups from the cached season table (offline mode).
pub struct SeasonSource<'a> {
    season: &'a Season,
}

impl<'a> SeasonSource<'a> {
    pub fn new(season: &'a Season) -> Self {
        Self { season }
    }
}

impl PitchSource for SeasonSource<'_> {
    fn fetch(
        &self,
        batter: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> anyhow::Result<Vec<PlayEvent>> {
        Ok(self
            .season
            .events()
            .iter()
            .filter(|e| e.batter == batter)
            .filter(|e| e.game_date.is_some_and(|d| d >= start && d <= end))
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Enrichment
// ---------------------------------------------------------------------------

/// Everything the detail view needs for one game.
#[derive(Debug, Clone, PartialEq)]
pub struct GameDetail {
    pub team: String,
    pub batter: String,
    pub date: NaiveDate,
    pub opponent: String,
    /// The season rows of the game, km/h, pitcher names attached.
    pub pitches: PitchSet,
    /// Rows from the per-game lookup, km/h, pitcher names attached, in
    /// at-bat / pitch order. May be empty.
    pub lookup: PitchSet,
}

impl GameDetail {
    /// `Name — 2025-04-15 vs BOS`; the name comes from the lookup rows when
    /// they have one.
    pub fn headline(&self) -> String {
        let name = self
            .lookup
            .events()
            .iter()
            .find_map(|e| e.player_name.as_deref())
            .unwrap_or(&self.batter);
        format!("{name} — {} vs {}", self.date.format("%Y-%m-%d"), self.opponent)
    }

    /// The notice to show when the lookup came back empty.
    pub fn lookup_notice(&self) -> Option<PipelineError> {
        self.lookup.is_empty().then(|| {
            PipelineError::empty(
                Stage::Lookup,
                format!("no pitch data for {} on {}", self.batter, self.date),
            )
        })
    }
}

/// Convert units and attach pitcher names to the slice, then fetch and
/// prepare the per-game lookup rows the same way.
///
/// Each set is converted exactly once. A failed fetch is fatal for this
/// game; an empty one is not.
pub fn enrich(
    slice: &GameSlice,
    source: &dyn PitchSource,
    pitchers: &IdentityTable,
) -> PipelineResult<GameDetail> {
    let Some(batter_id) = slice.batter_id() else {
        return Err(PipelineError::empty(Stage::Date, "the selected game has no rows"));
    };

    let pitches = PitchSet::mph(slice.rows.clone())
        .to_kmh()?
        .with_pitcher_names(pitchers);

    let mut fetched = source
        .fetch(batter_id, slice.date, slice.date)
        .map_err(|e| {
            log::error!("Pitch lookup failed: {e:#}");
            PipelineError::unavailable(&e)
        })?;
    fetched.sort_by_key(|e| (e.at_bat_number, e.pitch_number));
    if fetched.is_empty() {
        log::warn!("Pitch lookup for {batter_id} on {} returned nothing", slice.date);
    }
    let lookup = PitchSet::mph(fetched).to_kmh()?.with_pitcher_names(pitchers);

    Ok(GameDetail {
        team: slice.team.clone(),
        batter: slice.batter.clone(),
        date: slice.date,
        opponent: slice.opponent.clone(),
        pitches,
        lookup,
    })
}
