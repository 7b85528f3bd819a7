use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use calamine::{Data, Reader, open_workbook_auto};

use super::model::{PlayEvent, Season};
use crate::config::IdentitySource;

// ---------------------------------------------------------------------------
// IdentityTable – player id → display name
// ---------------------------------------------------------------------------

/// Static reference data mapping MLBAM player ids to display names.
#[derive(Debug, Clone, Default)]
pub struct IdentityTable {
    names: HashMap<u64, String>,
}

impl IdentityTable {
    /// Build from `(id, name)` pairs. The first name seen for an id is kept.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (u64, S)>,
        S: Into<String>,
    {
        let mut names = HashMap::new();
        let mut duplicates = 0usize;
        for (id, name) in pairs {
            if names.contains_key(&id) {
                duplicates += 1;
                continue;
            }
            names.insert(id, name.into());
        }
        if duplicates > 0 {
            log::warn!("Identity table: ignored {duplicates} duplicate ids");
        }
        IdentityTable { names }
    }

    /// Load a reference table. Dispatch by extension: spreadsheets through
    /// calamine, anything ending in `.csv` through the CSV reader.
    pub fn load(source: &IdentitySource) -> Result<Self> {
        let path = source.path.as_path();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        let pairs = match ext.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_spreadsheet(path, source),
            "csv" => read_csv(path, source),
            other => bail!("Unsupported identity table extension: .{other}"),
        }
        .with_context(|| format!("loading identity table {}", path.display()))?;

        let table = Self::from_pairs(pairs);
        log::info!("Loaded {} names from {}", table.len(), path.display());
        Ok(table)
    }

    pub fn name_of(&self, id: u64) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Left joins
// ---------------------------------------------------------------------------

/// Which id of a row a join keys on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKey {
    Batter,
    Pitcher,
}

/// Left-outer join of names onto a copy of `events`.
///
/// Output has exactly one row per input row, in the same order. Rows whose id
/// is not in the table get `None` for the name.
pub fn left_join(events: &[PlayEvent], table: &IdentityTable, key: JoinKey) -> Vec<PlayEvent> {
    let mut unmatched = 0usize;
    let joined: Vec<PlayEvent> = events
        .iter()
        .map(|event| {
            let mut row = event.clone();
            match key {
                JoinKey::Batter => {
                    row.batter_name = table.name_of(event.batter).map(str::to_string);
                    unmatched += usize::from(row.batter_name.is_none());
                }
                JoinKey::Pitcher => {
                    row.pitcher_name = table.name_of(event.pitcher).map(str::to_string);
                    unmatched += usize::from(row.pitcher_name.is_none());
                }
            }
            row
        })
        .collect();
    if unmatched > 0 {
        log::debug!("{key:?} join: {unmatched} of {} rows without a name", events.len());
    }
    joined
}

/// The season with batter names attached. The input is left untouched.
pub fn with_batter_names(season: &Season, batters: &IdentityTable) -> Season {
    Season::from_sorted(left_join(season.events(), batters, JoinKey::Batter))
}

// ---------------------------------------------------------------------------
// Readers
// ---------------------------------------------------------------------------

fn read_spreadsheet(path: &Path, source: &IdentitySource) -> Result<Vec<(u64, String)>> {
    let mut workbook = open_workbook_auto(path).context("opening workbook")?;
    let Some(sheet) = workbook.sheet_names().first().cloned() else {
        bail!("workbook has no sheets");
    };
    let range = workbook
        .worksheet_range(&sheet)
        .with_context(|| format!("reading sheet '{sheet}'"))?;

    let mut rows = range
        .rows()
        .skip_while(|row| row.iter().all(|c| matches!(c, Data::Empty)));
    let Some(header) = rows.next() else {
        bail!("sheet '{sheet}' has no header row");
    };
    let header: Vec<String> = header.iter().map(|c| c.to_string().trim().to_string()).collect();
    let (id_idx, name_idx) = locate_columns(&header, source)?;

    let mut pairs = Vec::new();
    for row in rows {
        let id = row.get(id_idx).and_then(cell_to_id);
        let name = row
            .get(name_idx)
            .map(|c| c.to_string().trim().to_string())
            .filter(|s| !s.is_empty());
        if let (Some(id), Some(name)) = (id, name) {
            pairs.push((id, name));
        }
    }
    Ok(pairs)
}

fn read_csv(path: &Path, source: &IdentitySource) -> Result<Vec<(u64, String)>> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let header: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();
    let (id_idx, name_idx) = locate_columns(&header, source)?;

    let mut pairs = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let id = record.get(id_idx).and_then(parse_id);
        let name = record
            .get(name_idx)
            .map(str::trim)
            .filter(|s| !s.is_empty());
        if let (Some(id), Some(name)) = (id, name) {
            pairs.push((id, name.to_string()));
        }
    }
    Ok(pairs)
}

fn locate_columns(header: &[String], source: &IdentitySource) -> Result<(usize, usize)> {
    let find = |name: &str| {
        header
            .iter()
            .position(|h| h == name)
            .with_context(|| format!("missing '{name}' column (found {header:?})"))
    };
    Ok((find(&source.id_column)?, find(&source.name_column)?))
}

fn cell_to_id(cell: &Data) -> Option<u64> {
    match cell {
        Data::Int(i) => u64::try_from(*i).ok(),
        Data::Float(f) if *f >= 0.0 && f.fract() == 0.0 => Some(*f as u64),
        Data::String(s) => parse_id(s),
        _ => None,
    }
}

fn parse_id(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    raw.parse::<u64>().ok().or_else(|| {
        let f = raw.parse::<f64>().ok()?;
        (f >= 0.0 && f.fract() == 0.0).then_some(f as u64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(batter: u64, pitcher: u64) -> PlayEvent {
        PlayEvent {
            batter,
            pitcher,
            ..Default::default()
        }
    }

    #[test]
    fn left_join_keeps_unmatched_rows() {
        let table = IdentityTable::from_pairs([(1, "Aaron Judge")]);
        let events = vec![row(1, 10), row(2, 10), row(1, 11)];

        let joined = left_join(&events, &table, JoinKey::Batter);

        assert_eq!(joined.len(), events.len());
        assert_eq!(joined[0].batter_name.as_deref(), Some("Aaron Judge"));
        assert_eq!(joined[1].batter_name, None);
        assert_eq!(joined[2].batter_name.as_deref(), Some("Aaron Judge"));
        // input untouched
        assert!(events.iter().all(|e| e.batter_name.is_none()));
    }

    #[test]
    fn pitcher_join_keys_on_pitcher_id() {
        let table = IdentityTable::from_pairs([(10, "Gerrit Cole")]);
        let joined = left_join(&[row(10, 1), row(1, 10)], &table, JoinKey::Pitcher);
        assert_eq!(joined[0].pitcher_name, None);
        assert_eq!(joined[1].pitcher_name.as_deref(), Some("Gerrit Cole"));
    }

    #[test]
    fn first_name_wins_on_duplicate_ids() {
        let table = IdentityTable::from_pairs([(7, "First"), (7, "Second")]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.name_of(7), Some("First"));
    }

    #[test]
    fn ids_parse_from_float_text() {
        assert_eq!(parse_id("592450"), Some(592450));
        assert_eq!(parse_id("592450.0"), Some(592450));
        assert_eq!(parse_id("5.5"), None);
        assert_eq!(parse_id("n/a"), None);
        assert_eq!(cell_to_id(&Data::Float(660271.0)), Some(660271));
        assert_eq!(cell_to_id(&Data::Empty), None);
    }
}
