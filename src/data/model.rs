use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

// ---------------------------------------------------------------------------
// InningHalf – which side is batting
// ---------------------------------------------------------------------------

/// Half of the inning. Statcast publishes `Top` / `Bot`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InningHalf {
    /// Away team bats.
    Top,
    /// Home team bats.
    Bottom,
    #[default]
    Unknown,
}

impl InningHalf {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" | "t" => InningHalf::Top,
            "bot" | "bottom" | "b" => InningHalf::Bottom,
            _ => InningHalf::Unknown,
        }
    }
}

impl<'de> Deserialize<'de> for InningHalf {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.map(|s| InningHalf::parse(&s)).unwrap_or_default())
    }
}

impl fmt::Display for InningHalf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InningHalf::Top => write!(f, "Top"),
            InningHalf::Bottom => write!(f, "Bot"),
            InningHalf::Unknown => write!(f, "?"),
        }
    }
}

// ---------------------------------------------------------------------------
// Lenient cell parsing
// ---------------------------------------------------------------------------

/// A raw cell as it arrives from CSV or JSON. Pandas round-trips integer
/// columns with gaps as floats (`"2.0"`), so numbers are accepted in any form.
/// Booleans and nested values land in `Other` and read as missing.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawCell {
    Int(i64),
    Float(f64),
    Text(String),
    Other(IgnoredAny),
}

impl RawCell {
    fn into_f64(self) -> Option<f64> {
        let v = match self {
            RawCell::Int(i) => i as f64,
            RawCell::Float(f) => f,
            RawCell::Other(_) => return None,
            RawCell::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        v.is_finite().then_some(v)
    }

    fn into_u64(self) -> Option<u64> {
        let v = self.into_f64()?;
        (v >= 0.0 && v.fract() == 0.0).then_some(v as u64)
    }
}

fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let cell: Option<RawCell> = Option::deserialize(d)?;
    Ok(cell.and_then(RawCell::into_f64))
}

fn lenient_u32<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
    let cell: Option<RawCell> = Option::deserialize(d)?;
    Ok(cell
        .and_then(RawCell::into_u64)
        .and_then(|v| u32::try_from(v).ok()))
}

fn lenient_u64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    let cell: Option<RawCell> = Option::deserialize(d)?;
    Ok(cell.and_then(RawCell::into_u64))
}

fn required_id<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    lenient_u64(d)?.ok_or_else(|| serde::de::Error::custom("missing or non-integer player id"))
}

fn lenient_date<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
    let cell: Option<RawCell> = Option::deserialize(d)?;
    // Numeric dates are epoch milliseconds, as `df.to_json()` writes them.
    Ok(match cell {
        Some(RawCell::Text(s)) => normalize_date(&s),
        Some(RawCell::Int(ms)) => epoch_millis_date(ms),
        Some(RawCell::Float(ms)) if ms.is_finite() => epoch_millis_date(ms as i64),
        _ => None,
    })
}

fn epoch_millis_date(ms: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp_millis(ms).map(|stamp| stamp.date_naive())
}

/// Normalize a date cell to a calendar day, ignoring any time-of-day part.
///
/// Accepts `2025-04-15`, `2025-04-15T00:00:00`, `2025-04-15 13:05:00.000`
/// and offset timestamps such as `2025-04-15T00:00:00+00:00`, which keep the
/// calendar day as written. Anything else coerces to `None` (the missing-date
/// sentinel).
pub fn normalize_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(stamp.date_naive());
    }
    const OFFSET_FORMATS: [&str; 3] = [
        "%Y-%m-%d %H:%M:%S%.f%:z",
        "%Y-%m-%d %H:%M:%S%.f%z",
        "%Y-%m-%dT%H:%M:%S%.f%z",
    ];
    for format in OFFSET_FORMATS {
        if let Ok(stamp) = DateTime::parse_from_str(raw, format) {
            return Some(stamp.date_naive());
        }
    }
    let (day, time) = match raw.split_once(|c: char| c == 'T' || c == ' ') {
        Some((d, t)) => (d, Some(t.trim_end_matches('Z'))),
        None => (raw, None),
    };
    let date = NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()?;
    match time {
        None => Some(date),
        Some(t) => {
            let valid = NaiveTime::parse_from_str(t, "%H:%M:%S%.f").is_ok()
                || NaiveTime::parse_from_str(t, "%H:%M").is_ok();
            valid.then_some(date)
        }
    }
}

// ---------------------------------------------------------------------------
// PlayEvent – one row of the season dump
// ---------------------------------------------------------------------------

/// One pitch (one row of the Statcast play-by-play export).
///
/// Field names follow the upstream CSV header so rows deserialize directly;
/// columns the dashboard does not use are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlayEvent {
    #[serde(deserialize_with = "lenient_date")]
    pub game_date: Option<NaiveDate>,
    pub game_type: Option<String>,
    #[serde(deserialize_with = "lenient_u64")]
    pub game_pk: Option<u64>,
    pub home_team: String,
    pub away_team: String,
    #[serde(deserialize_with = "lenient_u32")]
    pub inning: Option<u32>,
    #[serde(rename = "inning_topbot")]
    pub inning_half: InningHalf,

    #[serde(deserialize_with = "required_id")]
    pub batter: u64,
    #[serde(deserialize_with = "required_id")]
    pub pitcher: u64,
    /// Name as published upstream (the batter, for batter searches).
    pub player_name: Option<String>,
    /// Filled by the batter identity join.
    pub batter_name: Option<String>,
    /// Filled by the pitcher identity join.
    pub pitcher_name: Option<String>,

    pub pitch_type: Option<String>,
    pub pitch_name: Option<String>,
    #[serde(deserialize_with = "lenient_u32")]
    pub at_bat_number: Option<u32>,
    #[serde(deserialize_with = "lenient_u32")]
    pub pitch_number: Option<u32>,
    #[serde(deserialize_with = "lenient_u32")]
    pub balls: Option<u32>,
    #[serde(deserialize_with = "lenient_u32")]
    pub strikes: Option<u32>,
    #[serde(deserialize_with = "lenient_u32")]
    pub outs_when_up: Option<u32>,

    #[serde(deserialize_with = "lenient_f64")]
    pub release_speed: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub release_spin_rate: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub plate_x: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub plate_z: Option<f64>,

    pub description: Option<String>,
    pub events: Option<String>,
    /// Outcome category: `B` ball, `S` strike, `X` in play.
    #[serde(rename = "type")]
    pub result_code: Option<String>,
    pub bb_type: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub launch_speed: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub launch_angle: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub estimated_ba_using_speedangle: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub estimated_woba_using_speedangle: Option<f64>,
}

impl PlayEvent {
    /// Date rendered the way the date selector shows it.
    pub fn date_label(&self) -> Option<String> {
        self.game_date.map(|d| d.format("%Y-%m-%d").to_string())
    }
}

// ---------------------------------------------------------------------------
// Season – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The season table: one game type only, sorted by date ascending.
///
/// Read-only once built; anything derived from it is a new `Season` or a
/// separate row set.
#[derive(Debug, Clone, Default)]
pub struct Season {
    events: Vec<PlayEvent>,
}

impl Season {
    /// Keep rows of `game_type` and sort them by date. Rows without a date
    /// go last; the sort is stable so same-day rows keep file order.
    pub fn from_events(mut events: Vec<PlayEvent>, game_type: &str) -> Self {
        events.retain(|e| e.game_type.as_deref().map(str::trim) == Some(game_type));
        events.sort_by(|a, b| cmp_dates(a.game_date, b.game_date));
        Season { events }
    }

    /// Wrap rows that are already filtered and sorted.
    pub(crate) fn from_sorted(events: Vec<PlayEvent>) -> Self {
        Season { events }
    }

    pub fn events(&self) -> &[PlayEvent] {
        &self.events
    }

    pub fn get(&self, idx: usize) -> Option<&PlayEvent> {
        self.events.get(idx)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the season is empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// First and last game date present.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.events.iter().find_map(|e| e.game_date)?;
        let last = self.events.iter().rev().find_map(|e| e.game_date)?;
        Some((first, last))
    }
}

fn cmp_dates(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(date: Option<&str>, game_type: &str) -> PlayEvent {
        PlayEvent {
            game_date: date.and_then(normalize_date),
            game_type: Some(game_type.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn normalize_date_ignores_time_of_day() {
        let day = NaiveDate::from_ymd_opt(2025, 4, 15);
        assert_eq!(normalize_date("2025-04-15"), day);
        assert_eq!(normalize_date("2025-04-15T00:00:00"), day);
        assert_eq!(normalize_date("2025-04-15 13:05:00.000"), day);
        assert_eq!(normalize_date(" 2025-04-15 "), day);
        assert_eq!(normalize_date("2025-04-15T00:00:00Z"), day);
        assert_eq!(normalize_date("2025-04-15T00:00:00+00:00"), day);
        assert_eq!(normalize_date("2025-04-15 00:00:00-04:00"), day);
        assert_eq!(normalize_date("2025-04-15 23:30:00.250+0900"), day);
    }

    #[test]
    fn normalize_date_coerces_garbage_to_none() {
        assert_eq!(normalize_date(""), None);
        assert_eq!(normalize_date("April 15"), None);
        assert_eq!(normalize_date("2025-13-01"), None);
        assert_eq!(normalize_date("2025-04-15Tnoon"), None);
    }

    #[test]
    fn inning_half_accepts_statcast_spelling() {
        assert_eq!(InningHalf::parse("Bot"), InningHalf::Bottom);
        assert_eq!(InningHalf::parse("Bottom"), InningHalf::Bottom);
        assert_eq!(InningHalf::parse("top"), InningHalf::Top);
        assert_eq!(InningHalf::parse("middle"), InningHalf::Unknown);
    }

    #[test]
    fn season_keeps_game_type_and_sorts_missing_dates_last() {
        let season = Season::from_events(
            vec![
                event(Some("2025-05-01"), "R"),
                event(None, "R"),
                event(Some("2025-03-01"), "S"),
                event(Some("2025-04-01"), "R"),
            ],
            "R",
        );
        let dates: Vec<_> = season.events().iter().map(|e| e.date_label()).collect();
        assert_eq!(
            dates,
            vec![Some("2025-04-01".to_string()), Some("2025-05-01".to_string()), None]
        );
        assert_eq!(
            season.date_span(),
            Some((
                NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 5, 1).unwrap()
            ))
        );
    }

    #[test]
    fn csv_rows_parse_leniently() {
        let input = "game_date,game_type,home_team,away_team,inning_topbot,batter,pitcher,balls,release_speed,type\n\
                     2025-04-15,R,NYY,BOS,Bot,660271.0,543037,2.0,95.0,S\n\
                     bad-date,R,NYY,BOS,Top,660271,543037,,,B\n";
        let mut rdr = csv::Reader::from_reader(input.as_bytes());
        let rows: Vec<PlayEvent> = rdr.deserialize().collect::<Result<_, _>>().unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].batter, 660271);
        assert_eq!(rows[0].balls, Some(2));
        assert_eq!(rows[0].release_speed, Some(95.0));
        assert_eq!(rows[0].inning_half, InningHalf::Bottom);
        assert_eq!(rows[0].result_code.as_deref(), Some("S"));
        assert_eq!(rows[1].game_date, None);
        assert_eq!(rows[1].balls, None);
        assert_eq!(rows[1].release_speed, None);
    }
}
