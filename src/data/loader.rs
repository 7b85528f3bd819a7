use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use reqwest::blocking::Client;

use super::model::{InningHalf, PlayEvent, Season, normalize_date};
use crate::config::{DashboardConfig, HttpConfig};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load the season table described by the config.
///
/// A local `dataset_path` wins over the remote URL. The result only holds
/// rows of the configured game type, sorted by date.
pub fn load_season(config: &DashboardConfig) -> Result<Season> {
    let events = match &config.dataset_path {
        Some(path) => load_file(path)?,
        None => {
            let client = http_client(&config.http)?;
            let text = fetch_text(&client, &config.dataset_url)?;
            read_csv_events(text.as_bytes()).context("parsing season CSV")?
        }
    };
    let raw_rows = events.len();
    let season = Season::from_events(events, config.game_type.trim());
    log::info!(
        "Season loaded: {} of {raw_rows} rows are game type '{}'",
        season.len(),
        config.game_type
    );
    Ok(season)
}

/// Read season rows from a local file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – Statcast export with a header row
/// * `.json`    – `[{ "game_date": "...", "batter": 1, ... }, ...]`
/// * `.parquet` – one column per Statcast field (any numeric / string type)
pub fn load_file(path: &Path) -> Result<Vec<PlayEvent>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let events = match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening {}", path.display()))?;
            read_csv_events(file).with_context(|| format!("parsing {}", path.display()))?
        }
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };
    log::info!("Read {} rows from {}", events.len(), path.display());
    Ok(events)
}

// ---------------------------------------------------------------------------
// HTTP
// ---------------------------------------------------------------------------

pub fn http_client(http: &HttpConfig) -> Result<Client> {
    Client::builder()
        .user_agent(http.user_agent.as_str())
        .timeout(Duration::from_secs(http.timeout_secs))
        .build()
        .context("build http client")
}

/// GET `url` and decode the body as UTF-8. Any non-2xx status is an error.
pub fn fetch_text(client: &Client, url: &str) -> Result<String> {
    log::info!("GET {url}");
    let bytes = client
        .get(url)
        .send()
        .with_context(|| format!("request {url}"))?
        .error_for_status()
        .with_context(|| format!("status for {url}"))?
        .bytes()
        .with_context(|| format!("read body {url}"))?;
    String::from_utf8(bytes.to_vec()).with_context(|| format!("body of {url} is not UTF-8"))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Deserialize Statcast CSV rows. Unknown columns are ignored, missing
/// optional columns stay `None`.
pub fn read_csv_events<R: Read>(input: R) -> Result<Vec<PlayEvent>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);

    let mut headers = reader.headers().context("reading CSV headers")?.clone();
    if headers.get(0).is_some_and(|h| h.starts_with('\u{feff}')) {
        headers = headers
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}'))
            .collect();
        reader.set_headers(headers.clone());
    }
    for required in ["batter", "pitcher", "home_team", "away_team"] {
        if !headers.iter().any(|h| h == required) {
            bail!("CSV missing '{required}' column");
        }
    }

    reader
        .deserialize::<PlayEvent>()
        .enumerate()
        .map(|(row_no, result)| result.with_context(|| format!("CSV row {row_no}")))
        .collect()
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`.
fn load_json(path: &Path) -> Result<Vec<PlayEvent>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    read_json_events(&text)
}

pub fn read_json_events(text: &str) -> Result<Vec<PlayEvent>> {
    serde_json::from_str(text).context("parsing JSON records")
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

const TEXT_COLUMNS: &[&str] = &[
    "game_date",
    "game_type",
    "home_team",
    "away_team",
    "inning_topbot",
    "player_name",
    "batter_name",
    "pitcher_name",
    "pitch_type",
    "pitch_name",
    "description",
    "events",
    "type",
    "bb_type",
];

const NUMERIC_COLUMNS: &[&str] = &[
    "game_pk",
    "inning",
    "batter",
    "pitcher",
    "at_bat_number",
    "pitch_number",
    "balls",
    "strikes",
    "outs_when_up",
    "release_speed",
    "release_spin_rate",
    "plate_x",
    "plate_z",
    "launch_speed",
    "launch_angle",
    "estimated_ba_using_speedangle",
    "estimated_woba_using_speedangle",
];

/// Load a Parquet season dump.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`): dates may be strings, `Date32` or
/// timestamps, ids may be integers or floats.
fn load_parquet(path: &Path) -> Result<Vec<PlayEvent>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut events = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let columns = BatchColumns::new(&batch)?;
        for row in 0..batch.num_rows() {
            let event = columns
                .event(row)
                .with_context(|| format!("Row {row}: invalid play event"))?;
            events.push(event);
        }
    }
    Ok(events)
}

/// The columns of one record batch, cast to `Utf8` or `Float64`.
struct BatchColumns {
    columns: HashMap<&'static str, ArrayRef>,
}

impl BatchColumns {
    fn new(batch: &RecordBatch) -> Result<Self> {
        let schema = batch.schema();
        let mut columns = HashMap::new();
        let targets = [
            (TEXT_COLUMNS, DataType::Utf8),
            (NUMERIC_COLUMNS, DataType::Float64),
        ];
        for (names, target) in targets {
            for &name in names {
                let Ok(idx) = schema.index_of(name) else {
                    continue;
                };
                let casted = cast(batch.column(idx), &target)
                    .with_context(|| format!("column '{name}' cannot be read as {target}"))?;
                columns.insert(name, casted);
            }
        }
        if !columns.contains_key("batter") || !columns.contains_key("pitcher") {
            bail!("Parquet file missing 'batter' or 'pitcher' column");
        }
        Ok(Self { columns })
    }

    fn text(&self, name: &str, row: usize) -> Option<String> {
        let col = self.columns.get(name)?;
        if col.is_null(row) {
            return None;
        }
        let value = col.as_string_opt::<i32>()?.value(row);
        Some(value.to_string())
    }

    fn float(&self, name: &str, row: usize) -> Option<f64> {
        let col = self.columns.get(name)?;
        if col.is_null(row) {
            return None;
        }
        let value = col.as_primitive_opt::<Float64Type>()?.value(row);
        value.is_finite().then_some(value)
    }

    fn whole(&self, name: &str, row: usize) -> Option<u64> {
        self.float(name, row)
            .filter(|v| *v >= 0.0 && v.fract() == 0.0)
            .map(|v| v as u64)
    }

    fn count(&self, name: &str, row: usize) -> Option<u32> {
        self.whole(name, row).and_then(|v| u32::try_from(v).ok())
    }

    fn event(&self, row: usize) -> Result<PlayEvent> {
        let Some(batter) = self.whole("batter", row) else {
            bail!("missing batter id");
        };
        let Some(pitcher) = self.whole("pitcher", row) else {
            bail!("missing pitcher id");
        };
        Ok(PlayEvent {
            game_date: self.text("game_date", row).and_then(|s| normalize_date(&s)),
            game_type: self.text("game_type", row),
            game_pk: self.whole("game_pk", row),
            home_team: self.text("home_team", row).unwrap_or_default(),
            away_team: self.text("away_team", row).unwrap_or_default(),
            inning: self.count("inning", row),
            inning_half: self
                .text("inning_topbot", row)
                .map(|s| InningHalf::parse(&s))
                .unwrap_or_default(),
            batter,
            pitcher,
            player_name: self.text("player_name", row),
            batter_name: self.text("batter_name", row),
            pitcher_name: self.text("pitcher_name", row),
            pitch_type: self.text("pitch_type", row),
            pitch_name: self.text("pitch_name", row),
            at_bat_number: self.count("at_bat_number", row),
            pitch_number: self.count("pitch_number", row),
            balls: self.count("balls", row),
            strikes: self.count("strikes", row),
            outs_when_up: self.count("outs_when_up", row),
            release_speed: self.float("release_speed", row),
            release_spin_rate: self.float("release_spin_rate", row),
            plate_x: self.float("plate_x", row),
            plate_z: self.float("plate_z", row),
            description: self.text("description", row),
            events: self.text("events", row),
            result_code: self.text("type", row),
            bb_type: self.text("bb_type", row),
            launch_speed: self.float("launch_speed", row),
            launch_angle: self.float("launch_angle", row),
            estimated_ba_using_speedangle: self.float("estimated_ba_using_speedangle", row),
            estimated_woba_using_speedangle: self.float("estimated_woba_using_speedangle", row),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn csv_with_bom_and_extra_columns() {
        let input = "\u{feff}pitch_type,game_date,batter,pitcher,home_team,away_team,inning_topbot,zone\n\
                     FF,2025-04-15,1,2,NYY,BOS,Bot,5\n";
        let events = read_csv_events(input.as_bytes()).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].pitch_type.as_deref(), Some("FF"));
        assert_eq!(events[0].home_team, "NYY");
    }

    #[test]
    fn csv_without_player_ids_is_rejected() {
        let input = "game_date,home_team,away_team\n2025-04-15,NYY,BOS\n";
        let err = read_csv_events(input.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("'batter'"));
    }

    #[test]
    fn json_records_with_epoch_millisecond_dates() {
        let input = r#"[
            {"game_date": 1744675200000, "batter": 1, "pitcher": 2, "home_team": "NYY",
             "away_team": "BOS", "inning_topbot": "Bot", "release_speed": 95.0},
            {"game_date": "2025-04-16T00:00:00.000", "batter": 1, "pitcher": 2,
             "home_team": "NYY", "away_team": "BOS", "inning_topbot": "Bot", "launch_speed": true}
        ]"#;
        let events = read_json_events(input).unwrap();
        assert_eq!(events[0].game_date, NaiveDate::from_ymd_opt(2025, 4, 15));
        assert_eq!(events[1].game_date, NaiveDate::from_ymd_opt(2025, 4, 16));
        assert_eq!(events[0].release_speed, Some(95.0));
        assert_eq!(events[1].launch_speed, None);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load_file(Path::new("season.xlsx")).unwrap_err();
        assert!(err.to_string().contains("Unsupported file extension"));
    }
}
