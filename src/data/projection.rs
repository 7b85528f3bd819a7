use std::collections::BTreeSet;
use std::fmt;

use super::enrich::PitchSet;
use super::model::PlayEvent;

// ---------------------------------------------------------------------------
// Strike zone
// ---------------------------------------------------------------------------

/// Rectangle in plate coordinates (feet): x across the plate, z height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrikeZone {
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub top: f64,
}

/// Half a plate width either side, 1.5 ft to 3.5 ft high.
pub const STRIKE_ZONE: StrikeZone = StrikeZone {
    left: -0.708333,
    right: 0.708333,
    bottom: 1.5,
    top: 3.5,
};

impl StrikeZone {
    /// Plot window: one foot either side, two feet above and below.
    pub fn view_bounds(&self) -> ([f64; 2], [f64; 2]) {
        (
            [self.left - 1.0, self.right + 1.0],
            [self.bottom - 2.0, self.top + 2.0],
        )
    }

    /// Closed outline, counter-clockwise from bottom-left.
    pub fn outline(&self) -> Vec<[f64; 2]> {
        vec![
            [self.left, self.bottom],
            [self.right, self.bottom],
            [self.right, self.top],
            [self.left, self.top],
            [self.left, self.bottom],
        ]
    }
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// One line of the nine-column pitch detail table.
pub type DetailRow = [String; 9];

fn opt<T: fmt::Display>(v: Option<T>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}

fn fixed(v: Option<f64>, decimals: usize) -> String {
    v.map(|v| format!("{v:.decimals$}")).unwrap_or_default()
}

/// Pitch number, pitch, outs, balls, strikes, velocity, spin, result code,
/// description.
pub fn detail_row(event: &PlayEvent) -> DetailRow {
    [
        opt(event.pitch_number),
        event.pitch_name.clone().unwrap_or_default(),
        opt(event.outs_when_up),
        opt(event.balls),
        opt(event.strikes),
        fixed(event.release_speed, 1),
        fixed(event.release_spin_rate, 0),
        event.result_code.clone().unwrap_or_default(),
        event.description.clone().unwrap_or_default(),
    ]
}

pub fn detail_rows(set: &PitchSet) -> Vec<DetailRow> {
    set.events().iter().map(detail_row).collect()
}

/// Headers of the batting-info table (the per-game lookup rows).
pub const LOOKUP_HEADERS: [&str; 12] = [
    "AB", "No", "Inn", "Pitcher", "Type", "Velo(km/h)", "Desc", "Event", "Exit(km/h)", "Angle",
    "xBA", "xwOBA",
];

pub fn lookup_row(event: &PlayEvent) -> [String; 12] {
    [
        opt(event.at_bat_number),
        opt(event.pitch_number),
        opt(event.inning),
        event.pitcher_name.clone().unwrap_or_default(),
        event.pitch_name.clone().unwrap_or_default(),
        fixed(event.release_speed, 1),
        event.description.clone().unwrap_or_default(),
        event.events.clone().unwrap_or_default(),
        fixed(event.launch_speed, 1),
        fixed(event.launch_angle, 0),
        fixed(event.estimated_ba_using_speedangle, 3),
        fixed(event.estimated_woba_using_speedangle, 3),
    ]
}

// ---------------------------------------------------------------------------
// Description filter
// ---------------------------------------------------------------------------

/// Label of the pass-through option.
pub const ALL_DESCRIPTIONS: &str = "All";

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum DescriptionFilter {
    #[default]
    All,
    Only(String),
}

impl fmt::Display for DescriptionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DescriptionFilter::All => f.write_str(ALL_DESCRIPTIONS),
            DescriptionFilter::Only(d) => f.write_str(d),
        }
    }
}

impl DescriptionFilter {
    pub fn accepts(&self, event: &PlayEvent) -> bool {
        match self {
            DescriptionFilter::All => true,
            DescriptionFilter::Only(d) => event.description.as_deref() == Some(d.as_str()),
        }
    }
}

/// `All` first, then the distinct descriptions in alphabetical order.
pub fn description_options(set: &PitchSet) -> Vec<DescriptionFilter> {
    let distinct: BTreeSet<&str> = set
        .events()
        .iter()
        .filter_map(|e| e.description.as_deref())
        .collect();
    std::iter::once(DescriptionFilter::All)
        .chain(distinct.into_iter().map(|d| DescriptionFilter::Only(d.to_string())))
        .collect()
}

pub fn filter_by_description<'a>(
    set: &'a PitchSet,
    filter: &DescriptionFilter,
) -> Vec<&'a PlayEvent> {
    set.events().iter().filter(|e| filter.accepts(e)).collect()
}

// ---------------------------------------------------------------------------
// Chart grouping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ZonePoint {
    pub x: f64,
    pub z: f64,
    /// Pitch number within the at-bat, drawn above the marker.
    pub label: String,
}

/// All located pitches of one pitch name.
#[derive(Debug, Clone, PartialEq)]
pub struct PitchGroup {
    pub pitch: String,
    pub points: Vec<ZonePoint>,
}

/// Group located pitches by pitch name, groups in first-seen order. Rows
/// without a pitch name or a plate location are not drawn.
pub fn group_by_pitch<'a, I>(events: I) -> Vec<PitchGroup>
where
    I: IntoIterator<Item = &'a PlayEvent>,
{
    let mut groups: Vec<PitchGroup> = Vec::new();
    for event in events {
        let (Some(pitch), Some(x), Some(z)) =
            (event.pitch_name.as_deref(), event.plate_x, event.plate_z)
        else {
            continue;
        };
        let point = ZonePoint {
            x,
            z,
            label: opt(event.pitch_number),
        };
        match groups.iter_mut().find(|g| g.pitch == pitch) {
            Some(group) => group.points.push(point),
            None => groups.push(PitchGroup {
                pitch: pitch.to_string(),
                points: vec![point],
            }),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pitch(name: Option<&str>, number: u32, desc: &str, loc: Option<(f64, f64)>) -> PlayEvent {
        PlayEvent {
            pitch_name: name.map(str::to_string),
            pitch_number: Some(number),
            description: Some(desc.to_string()),
            plate_x: loc.map(|l| l.0),
            plate_z: loc.map(|l| l.1),
            ..Default::default()
        }
    }

    fn sample() -> PitchSet {
        PitchSet::mph(vec![
            pitch(Some("Slider"), 1, "called_strike", Some((0.1, 2.0))),
            pitch(Some("4-Seam Fastball"), 2, "ball", Some((1.2, 3.9))),
            pitch(Some("Slider"), 3, "foul", Some((-0.4, 1.8))),
            pitch(None, 4, "ball", Some((0.0, 0.0))),
            pitch(Some("Sinker"), 5, "hit_into_play", None),
        ])
    }

    #[test]
    fn detail_row_has_nine_formatted_cells() {
        let event = PlayEvent {
            pitch_number: Some(3),
            pitch_name: Some("Sinker".to_string()),
            outs_when_up: Some(1),
            balls: Some(2),
            strikes: Some(1),
            release_speed: Some(152.9),
            release_spin_rate: Some(2231.0),
            result_code: Some("S".to_string()),
            description: Some("foul".to_string()),
            ..Default::default()
        };
        assert_eq!(
            detail_row(&event),
            ["3", "Sinker", "1", "2", "1", "152.9", "2231", "S", "foul"].map(String::from)
        );
        assert!(detail_row(&PlayEvent::default()).iter().all(String::is_empty));
    }

    #[test]
    fn description_options_start_with_all() {
        let labels: Vec<String> = description_options(&sample())
            .iter()
            .map(|d| d.to_string())
            .collect();
        assert_eq!(labels, vec!["All", "ball", "called_strike", "foul", "hit_into_play"]);
    }

    #[test]
    fn description_filter_all_passes_everything() {
        let set = sample();
        assert_eq!(filter_by_description(&set, &DescriptionFilter::All).len(), 5);
        let balls = filter_by_description(&set, &DescriptionFilter::Only("ball".to_string()));
        assert_eq!(balls.len(), 2);
    }

    #[test]
    fn grouping_skips_unlocated_and_unnamed_pitches() {
        let set = sample();
        let groups = group_by_pitch(set.events());
        let names: Vec<&str> = groups.iter().map(|g| g.pitch.as_str()).collect();
        assert_eq!(names, vec!["Slider", "4-Seam Fastball"]);
        assert_eq!(groups[0].points.len(), 2);
        assert_eq!(groups[0].points[1].label, "3");
    }

    #[test]
    fn strike_zone_window_and_outline() {
        let (x, z) = STRIKE_ZONE.view_bounds();
        assert!((x[0] + 1.708333).abs() < 1e-9);
        assert_eq!(z, [-0.5, 5.5]);
        assert_eq!(STRIKE_ZONE.outline().len(), 5);
    }
}
