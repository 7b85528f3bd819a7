use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;

use super::error::{PipelineError, PipelineResult, Stage};
use super::model::{InningHalf, PlayEvent, Season, normalize_date};
use crate::config::Division;

// ---------------------------------------------------------------------------
// Selection state
// ---------------------------------------------------------------------------

/// The user's choices so far, in cascade order. Later fields are only
/// meaningful when the earlier ones are set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub division: Option<String>,
    pub team: Option<String>,
    pub batter: Option<String>,
    pub date: Option<DateOption>,
}

impl Selection {
    /// Pick a division; clears everything downstream.
    pub fn with_division(division: impl Into<String>) -> Self {
        Selection {
            division: Some(division.into()),
            ..Default::default()
        }
    }

    pub fn set_division(&mut self, division: String) {
        *self = Selection::with_division(division);
    }

    pub fn set_team(&mut self, team: String) {
        self.team = Some(team);
        self.batter = None;
        self.date = None;
    }

    pub fn set_batter(&mut self, batter: String) {
        self.batter = Some(batter);
        self.date = None;
    }

    pub fn set_date(&mut self, date: DateOption) {
        self.date = Some(date);
    }
}

/// A game the batter played: the date plus the opposing team.
/// Rendered and parsed as `2025-04-15 vs BOS`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateOption {
    pub date: NaiveDate,
    pub opponent: String,
}

impl DateOption {
    /// Parse a composite label. Only the date part drives filtering; a bare
    /// date (with or without time of day) is accepted too.
    pub fn parse(label: &str) -> Option<Self> {
        let (date, opponent) = match label.split_once(" vs ") {
            Some((date, opponent)) => (date, opponent.trim()),
            None => (label, ""),
        };
        Some(DateOption {
            date: normalize_date(date)?,
            opponent: opponent.to_string(),
        })
    }
}

impl fmt::Display for DateOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} vs {}", self.date.format("%Y-%m-%d"), self.opponent)
    }
}

// ---------------------------------------------------------------------------
// Pipeline steps
// ---------------------------------------------------------------------------

/// Team codes offered for a division. The division never filters rows.
pub fn teams_for<'a>(divisions: &'a [Division], division: &str) -> &'a [String] {
    divisions
        .iter()
        .find(|d| d.name == division)
        .map(|d| d.teams.as_slice())
        .unwrap_or(&[])
}

/// Whether `team` is the side at the plate for this pitch: home teams bat in
/// the bottom half, away teams in the top half.
pub fn bats_for(event: &PlayEvent, team: &str) -> bool {
    (event.home_team == team && event.inning_half == InningHalf::Bottom)
        || (event.away_team == team && event.inning_half == InningHalf::Top)
}

/// Step 1: indices of the team's own plate appearances.
pub fn team_rows(season: &Season, team: &str) -> Vec<usize> {
    season
        .events()
        .iter()
        .enumerate()
        .filter(|(_, e)| bats_for(e, team))
        .map(|(i, _)| i)
        .collect()
}

/// Sorted distinct batter names among `rows`; rows without a name are skipped.
pub fn batter_options(season: &Season, rows: &[usize]) -> Vec<String> {
    rows.iter()
        .filter_map(|&i| season.get(i)?.batter_name.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Step 2: narrow to one batter.
pub fn batter_rows(season: &Season, rows: &[usize], batter: &str) -> Vec<usize> {
    rows.iter()
        .copied()
        .filter(|&i| {
            season
                .get(i)
                .is_some_and(|e| e.batter_name.as_deref() == Some(batter))
        })
        .collect()
}

/// Step 3: the other side of this row's game.
pub fn opponent<'a>(event: &'a PlayEvent, team: &str) -> &'a str {
    if event.home_team == team {
        &event.away_team
    } else {
        &event.home_team
    }
}

/// Step 4: distinct `(date, opponent)` games, sorted. Rows with a missing
/// date never produce an option.
pub fn date_options(season: &Season, rows: &[usize], team: &str) -> Vec<DateOption> {
    rows.iter()
        .filter_map(|&i| {
            let event = season.get(i)?;
            Some(DateOption {
                date: event.game_date?,
                opponent: opponent(event, team).to_string(),
            })
        })
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Step 5: rows played on `date`.
pub fn date_rows(season: &Season, rows: &[usize], date: NaiveDate) -> Vec<usize> {
    rows.iter()
        .copied()
        .filter(|&i| season.get(i).is_some_and(|e| e.game_date == Some(date)))
        .collect()
}

// ---------------------------------------------------------------------------
// Cascade
// ---------------------------------------------------------------------------

/// What each selector can offer given the choices made so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionOptions {
    pub divisions: Vec<String>,
    pub teams: Vec<String>,
    pub batters: Vec<String>,
    pub dates: Vec<DateOption>,
}

/// Recompute every option list downstream of the current selection.
pub fn options(season: &Season, divisions: &[Division], selection: &Selection) -> SelectionOptions {
    let mut out = SelectionOptions {
        divisions: divisions.iter().map(|d| d.name.clone()).collect(),
        ..Default::default()
    };
    let Some(division) = &selection.division else {
        return out;
    };
    out.teams = teams_for(divisions, division).to_vec();

    let Some(team) = selection
        .team
        .as_deref()
        .filter(|t| out.teams.iter().any(|o| o.as_str() == *t))
    else {
        return out;
    };
    let team_idx = team_rows(season, team);
    out.batters = batter_options(season, &team_idx);

    let Some(batter) = &selection.batter else {
        return out;
    };
    let batter_idx = batter_rows(season, &team_idx, batter);
    out.dates = date_options(season, &batter_idx, team);
    out
}

/// One batter's pitches on one date, with the matchup they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSlice {
    pub team: String,
    pub batter: String,
    pub date: NaiveDate,
    pub opponent: String,
    /// Copies of the season rows, in season order.
    pub rows: Vec<PlayEvent>,
}

impl GameSlice {
    pub fn batter_id(&self) -> Option<u64> {
        self.rows.first().map(|e| e.batter)
    }

    /// Opponent of a single row, from this slice's team's point of view.
    pub fn opponent_of<'a>(&self, event: &'a PlayEvent) -> &'a str {
        opponent(event, &self.team)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Run the five steps for a complete selection.
///
/// Stops at the first stage that is unset (`MissingSelection`) or empty
/// (`EmptyResult`); later stages are not attempted.
pub fn resolve(
    season: &Season,
    divisions: &[Division],
    selection: &Selection,
) -> PipelineResult<GameSlice> {
    if season.is_empty() {
        return Err(PipelineError::empty(Stage::Season, "the season table has no rows"));
    }
    let division = selection
        .division
        .as_deref()
        .ok_or(PipelineError::MissingSelection(Stage::Division))?;
    let team = selection
        .team
        .as_deref()
        .filter(|t| teams_for(divisions, division).iter().any(|o| o.as_str() == *t))
        .ok_or(PipelineError::MissingSelection(Stage::Team))?;

    let team_idx = team_rows(season, team);
    if team_idx.is_empty() {
        return Err(PipelineError::empty(
            Stage::Team,
            format!("no plate appearances for {team}"),
        ));
    }

    let batter = selection
        .batter
        .as_deref()
        .ok_or(PipelineError::MissingSelection(Stage::Batter))?;
    let batter_idx = batter_rows(season, &team_idx, batter);
    if batter_idx.is_empty() {
        return Err(PipelineError::empty(
            Stage::Batter,
            format!("{batter} has no plate appearances for {team}"),
        ));
    }

    let choice = selection
        .date
        .as_ref()
        .ok_or(PipelineError::MissingSelection(Stage::Date))?;
    let date_idx = date_rows(season, &batter_idx, choice.date);
    if date_idx.is_empty() {
        return Err(PipelineError::empty(
            Stage::Date,
            format!("{batter} did not bat on {}", choice.date),
        ));
    }

    log::debug!("{team} / {batter} / {choice}: {} rows", date_idx.len());
    let mut slice = GameSlice {
        team: team.to_string(),
        batter: batter.to_string(),
        date: choice.date,
        opponent: String::new(),
        rows: date_idx
            .iter()
            .filter_map(|&i| season.get(i).cloned())
            .collect(),
    };
    // The rows decide the matchup, a bare date carries no opponent.
    if let Some(first) = slice.rows.first() {
        slice.opponent = slice.opponent_of(first).to_string();
    }
    Ok(slice)
}
