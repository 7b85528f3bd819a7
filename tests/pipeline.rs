use std::path::Path;

use chrono::NaiveDate;

use batting_dashboard::config::{DashboardConfig, IdentitySource};
use batting_dashboard::data::enrich::{SeasonSource, SpeedUnit, enrich};
use batting_dashboard::data::error::{PipelineError, Stage};
use batting_dashboard::data::filter::{
    DateOption, Selection, batter_rows, date_options, date_rows, opponent, resolve, team_rows,
};
use batting_dashboard::data::identity::{IdentityTable, with_batter_names};
use batting_dashboard::data::loader::load_file;
use batting_dashboard::data::model::{InningHalf, Season};
use batting_dashboard::data::projection::{
    DescriptionFilter, description_options, detail_rows, filter_by_description, group_by_pitch,
};

fn fixture_season() -> Season {
    let events = load_file(Path::new("tests/fixtures/season.csv")).unwrap();
    let raw = Season::from_events(events, "R");
    let batters = IdentityTable::load(&IdentitySource::new(
        "tests/fixtures/batters.csv",
        "batter",
        "batter_name",
    ))
    .unwrap();
    with_batter_names(&raw, &batters)
}

fn fixture_pitchers() -> IdentityTable {
    IdentityTable::load(&IdentitySource::new(
        "tests/fixtures/pitchers.csv",
        "pitcher",
        "pitcher_name",
    ))
    .unwrap()
}

fn al_east(team: &str, batter: &str, date: &str) -> Selection {
    let mut selection = Selection::with_division("AL East");
    selection.set_team(team.to_string());
    selection.set_batter(batter.to_string());
    selection.set_date(DateOption::parse(date).unwrap());
    selection
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn season_keeps_regular_season_rows_sorted() {
    let season = fixture_season();
    assert_eq!(season.len(), 6);
    assert!(season.events().iter().all(|e| e.game_type.as_deref() == Some("R")));
    assert_eq!(season.events()[0].game_date, Some(day(2025, 4, 15)));
    assert_eq!(season.events()[5].game_date, None);
}

#[test]
fn batter_join_never_drops_rows() {
    let season = fixture_season();
    let unnamed: Vec<u64> = season
        .events()
        .iter()
        .filter(|e| e.batter_name.is_none())
        .map(|e| e.batter)
        .collect();
    assert_eq!(unnamed, vec![999]);
}

#[test]
fn team_rows_only_hold_the_team_at_bat() {
    let season = fixture_season();
    for team in ["NYY", "BOS", "TB"] {
        for i in team_rows(&season, team) {
            let e = &season.events()[i];
            let home = e.home_team == team && e.inning_half == InningHalf::Bottom;
            let away = e.away_team == team && e.inning_half == InningHalf::Top;
            assert!(home != away);
        }
    }
    assert!(team_rows(&season, "TB").is_empty());
}

#[test]
fn date_options_skip_unparsable_dates() {
    let season = fixture_season();
    let rows = batter_rows(&season, &team_rows(&season, "NYY"), "John Doe");
    assert_eq!(rows.len(), 4);
    let labels: Vec<String> = date_options(&season, &rows, "NYY")
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(labels, vec!["2025-04-15 vs BOS", "2025-04-16 vs BOS"]);

    assert_eq!(date_rows(&season, &rows, day(2025, 4, 15)).len(), 2);
    assert_eq!(date_rows(&season, &rows, day(2025, 4, 16)).len(), 1);
    assert!(date_rows(&season, &rows, day(2025, 4, 14)).is_empty());
}

#[test]
fn selecting_nyy_batter_and_date_yields_two_rows() {
    let season = fixture_season();
    let divisions = DashboardConfig::default().divisions;

    let selection = al_east("NYY", "John Doe", "2025-04-15 vs BOS");
    let slice = resolve(&season, &divisions, &selection).unwrap();

    assert_eq!(slice.len(), 2);
    assert_eq!(slice.opponent, "BOS");
    assert!(slice.rows.iter().all(|e| opponent(e, "NYY") == "BOS"));
    assert!(slice.rows.iter().all(|e| e.game_date == Some(day(2025, 4, 15))));
    assert_eq!(slice.batter_id(), Some(100));

    // a bare date, time of day included, selects the same game
    let selection = al_east("NYY", "John Doe", "2025-04-15T00:00:00");
    let bare = resolve(&season, &divisions, &selection).unwrap();
    assert_eq!(bare.rows, slice.rows);
    assert_eq!(bare.opponent, "BOS");
}

#[test]
fn selecting_bos_for_the_same_batter_is_an_empty_notice() {
    let season = fixture_season();
    let divisions = DashboardConfig::default().divisions;

    let selection = al_east("BOS", "John Doe", "2025-04-15 vs NYY");
    let err = resolve(&season, &divisions, &selection).unwrap_err();

    assert!(matches!(err, PipelineError::EmptyResult { stage: Stage::Batter, .. }));
    assert!(!err.is_fatal());
    assert!(err.to_string().contains("John Doe"));
}

#[test]
fn enrichment_converts_once_and_names_pitchers() {
    let season = fixture_season();
    let divisions = DashboardConfig::default().divisions;
    let pitchers = fixture_pitchers();
    let selection = al_east("NYY", "John Doe", "2025-04-15 vs BOS");
    let slice = resolve(&season, &divisions, &selection).unwrap();

    let detail = enrich(&slice, &SeasonSource::new(&season), &pitchers).unwrap();

    assert_eq!(detail.pitches.unit(), SpeedUnit::Kmh);
    assert_eq!(detail.pitches.len(), slice.len());
    let rows = detail_rows(&detail.pitches);
    assert_eq!(rows[0][5], "152.9");
    assert_eq!(rows[1][5], "137.1");
    assert_eq!(detail.pitches.events()[0].pitcher_name.as_deref(), Some("Gerrit Cole"));

    // lookup rows come back in at-bat / pitch order with exit velocity converted
    let lookup = detail.lookup.events();
    assert_eq!(lookup.len(), 2);
    assert_eq!(lookup[1].pitch_number, Some(2));
    assert_eq!(lookup[1].launch_speed, Some(163.0));
    assert_eq!(detail.headline(), "Doe, John — 2025-04-15 vs BOS");

    // the cached season is untouched
    assert_eq!(season.events()[0].release_speed, Some(95.0));
    assert_eq!(season.events()[0].pitcher_name, None);
}

#[test]
fn description_filter_and_chart_groups() {
    let season = fixture_season();
    let divisions = DashboardConfig::default().divisions;
    let selection = al_east("NYY", "John Doe", "2025-04-15 vs BOS");
    let slice = resolve(&season, &divisions, &selection).unwrap();
    let detail = enrich(&slice, &SeasonSource::new(&season), &fixture_pitchers()).unwrap();

    let options = description_options(&detail.lookup);
    assert_eq!(options[0], DescriptionFilter::All);
    assert_eq!(options.len(), 3);

    let in_play = DescriptionFilter::Only("hit_into_play".to_string());
    let hits = filter_by_description(&detail.lookup, &in_play);
    assert_eq!(hits.len(), 1);

    let groups = group_by_pitch(filter_by_description(&detail.lookup, &DescriptionFilter::All));
    let names: Vec<&str> = groups.iter().map(|g| g.pitch.as_str()).collect();
    assert_eq!(names, vec!["4-Seam Fastball", "Slider"]);
}
