use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Days, NaiveDate};
use parquet::arrow::ArrowWriter;

use batting_dashboard::config::{DashboardConfig, IdentitySource};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// (name, code, mean mph, mean spin)
const PITCHES: [(&str, &str, f64, f64); 6] = [
    ("4-Seam Fastball", "FF", 94.5, 2300.0),
    ("Sinker", "SI", 93.0, 2150.0),
    ("Slider", "SL", 85.5, 2450.0),
    ("Curveball", "CU", 79.0, 2600.0),
    ("Changeup", "CH", 85.0, 1750.0),
    ("Sweeper", "ST", 82.0, 2650.0),
];

const OUTCOMES: [(&str, &str); 6] = [
    ("ball", "B"),
    ("called_strike", "S"),
    ("swinging_strike", "S"),
    ("foul", "S"),
    ("hit_into_play", "X"),
    ("blocked_ball", "B"),
];

const TEAMS: [&str; 5] = ["NYY", "BOS", "TOR", "TB", "BAL"];

#[derive(Default)]
struct Columns {
    game_date: Vec<String>,
    game_type: Vec<String>,
    game_pk: Vec<i64>,
    home_team: Vec<String>,
    away_team: Vec<String>,
    inning: Vec<i64>,
    inning_topbot: Vec<String>,
    batter: Vec<i64>,
    pitcher: Vec<i64>,
    player_name: Vec<String>,
    pitch_type: Vec<String>,
    pitch_name: Vec<String>,
    at_bat_number: Vec<i64>,
    pitch_number: Vec<i64>,
    balls: Vec<i64>,
    strikes: Vec<i64>,
    outs_when_up: Vec<i64>,
    release_speed: Vec<f64>,
    release_spin_rate: Vec<f64>,
    plate_x: Vec<f64>,
    plate_z: Vec<f64>,
    description: Vec<String>,
    result_code: Vec<String>,
    launch_speed: Vec<Option<f64>>,
    launch_angle: Vec<Option<f64>>,
}

fn batter_id(team: usize, slot: usize) -> i64 {
    600_000 + (team * 100 + slot) as i64
}

fn pitcher_id(team: usize, slot: usize) -> i64 {
    500_000 + (team * 100 + slot) as i64
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let mut cols = Columns::default();
    let opening_day = NaiveDate::from_ymd_opt(2025, 3, 27).context("opening day")?;

    let mut game_pk: i64 = 778_000;
    for day in 0..20u64 {
        let date = opening_day
            .checked_add_days(Days::new(day))
            .context("date overflow")?;
        // Spring-training rows on the first day exercise the game-type filter.
        let game_type = if day == 0 { "S" } else { "R" };
        let home = (day as usize) % TEAMS.len();
        let away = (home + 1 + rng.below(TEAMS.len() - 1)) % TEAMS.len();
        game_pk += 1;

        let mut at_bat = 0;
        for inning in 1..=9i64 {
            for (half, batting, fielding) in [("Top", away, home), ("Bot", home, away)] {
                let mut outs = 0;
                while outs < 3 {
                    at_bat += 1;
                    let batter = rng.below(9);
                    let pitcher = rng.below(3);
                    let (mut balls, mut strikes) = (0, 0);
                    for pitch_no in 1..=12i64 {
                        let (name, code, mph, spin) = PITCHES[rng.below(PITCHES.len())];
                        let (desc, result) = OUTCOMES[rng.below(OUTCOMES.len())];
                        let in_play = result == "X";

                        cols.game_date.push(date.format("%Y-%m-%d").to_string());
                        cols.game_type.push(game_type.to_string());
                        cols.game_pk.push(game_pk);
                        cols.home_team.push(TEAMS[home].to_string());
                        cols.away_team.push(TEAMS[away].to_string());
                        cols.inning.push(inning);
                        cols.inning_topbot.push(half.to_string());
                        cols.batter.push(batter_id(batting, batter));
                        cols.pitcher.push(pitcher_id(fielding, pitcher));
                        cols.player_name.push(format!("Batter {}-{}", TEAMS[batting], batter + 1));
                        cols.pitch_type.push(code.to_string());
                        cols.pitch_name.push(name.to_string());
                        cols.at_bat_number.push(at_bat);
                        cols.pitch_number.push(pitch_no);
                        cols.balls.push(balls);
                        cols.strikes.push(strikes);
                        cols.outs_when_up.push(outs);
                        cols.release_speed.push((rng.gauss(mph, 1.2) * 10.0).round() / 10.0);
                        cols.release_spin_rate.push(rng.gauss(spin, 80.0).round());
                        cols.plate_x.push(rng.gauss(0.0, 0.65));
                        cols.plate_z.push(rng.gauss(2.5, 0.7));
                        cols.description.push(desc.to_string());
                        cols.result_code.push(result.to_string());
                        cols.launch_speed.push(in_play.then(|| rng.gauss(89.0, 12.0)));
                        cols.launch_angle.push(in_play.then(|| rng.gauss(12.0, 20.0)));

                        match result {
                            "B" => balls += 1,
                            "S" if strikes < 2 || desc != "foul" => strikes += 1,
                            _ => {}
                        }
                        if in_play || strikes >= 3 || balls >= 4 {
                            break;
                        }
                    }
                    if strikes >= 3 || rng.next_f64() < 0.6 {
                        outs += 1;
                    }
                }
            }
        }
    }

    let rows = cols.game_date.len();
    write_season("sample_season.parquet", cols)?;
    write_identities()?;
    write_config()?;

    println!("Wrote {rows} pitches to sample_season.parquet, ID tables and dashboard.json");
    Ok(())
}

fn strings(values: Vec<String>) -> ArrayRef {
    Arc::new(StringArray::from(values))
}

fn write_season(path: &str, cols: Columns) -> Result<()> {
    let utf8 = |name: &str| Field::new(name, DataType::Utf8, false);
    let int = |name: &str| Field::new(name, DataType::Int64, false);
    let float = |name: &str, nullable: bool| Field::new(name, DataType::Float64, nullable);

    let schema = Arc::new(Schema::new(vec![
        utf8("game_date"),
        utf8("game_type"),
        int("game_pk"),
        utf8("home_team"),
        utf8("away_team"),
        int("inning"),
        utf8("inning_topbot"),
        int("batter"),
        int("pitcher"),
        utf8("player_name"),
        utf8("pitch_type"),
        utf8("pitch_name"),
        int("at_bat_number"),
        int("pitch_number"),
        int("balls"),
        int("strikes"),
        int("outs_when_up"),
        float("release_speed", false),
        float("release_spin_rate", false),
        float("plate_x", false),
        float("plate_z", false),
        utf8("description"),
        utf8("type"),
        float("launch_speed", true),
        float("launch_angle", true),
    ]));

    let columns: Vec<ArrayRef> = vec![
        strings(cols.game_date),
        strings(cols.game_type),
        Arc::new(Int64Array::from(cols.game_pk)),
        strings(cols.home_team),
        strings(cols.away_team),
        Arc::new(Int64Array::from(cols.inning)),
        strings(cols.inning_topbot),
        Arc::new(Int64Array::from(cols.batter)),
        Arc::new(Int64Array::from(cols.pitcher)),
        strings(cols.player_name),
        strings(cols.pitch_type),
        strings(cols.pitch_name),
        Arc::new(Int64Array::from(cols.at_bat_number)),
        Arc::new(Int64Array::from(cols.pitch_number)),
        Arc::new(Int64Array::from(cols.balls)),
        Arc::new(Int64Array::from(cols.strikes)),
        Arc::new(Int64Array::from(cols.outs_when_up)),
        Arc::new(Float64Array::from(cols.release_speed)),
        Arc::new(Float64Array::from(cols.release_spin_rate)),
        Arc::new(Float64Array::from(cols.plate_x)),
        Arc::new(Float64Array::from(cols.plate_z)),
        strings(cols.description),
        strings(cols.result_code),
        Arc::new(Float64Array::from(cols.launch_speed)),
        Arc::new(Float64Array::from(cols.launch_angle)),
    ];

    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;
    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

/// Batter and pitcher ID tables. One batter per team is left out so the
/// dashboard shows an unnamed row being kept.
fn write_identities() -> Result<()> {
    let mut batters =
        csv::Writer::from_path("sample_batters.csv").context("creating sample_batters.csv")?;
    batters.write_record(["batter", "batter_name"])?;
    let mut pitchers =
        csv::Writer::from_path("sample_pitchers.csv").context("creating sample_pitchers.csv")?;
    pitchers.write_record(["pitcher", "pitcher_name"])?;

    for (t, team) in TEAMS.iter().enumerate() {
        for slot in 0..8 {
            batters.write_record([
                batter_id(t, slot).to_string(),
                format!("Batter {team}-{}", slot + 1),
            ])?;
        }
        for slot in 0..3 {
            pitchers.write_record([
                pitcher_id(t, slot).to_string(),
                format!("Pitcher {team}-{}", slot + 1),
            ])?;
        }
    }
    batters.flush()?;
    pitchers.flush()?;
    Ok(())
}

fn write_config() -> Result<()> {
    let config = DashboardConfig {
        dataset_path: Some("sample_season.parquet".into()),
        batter_ids: IdentitySource::new("sample_batters.csv", "batter", "batter_name"),
        pitcher_ids: IdentitySource::new("sample_pitchers.csv", "pitcher", "pitcher_name"),
        offline: true,
        ..Default::default()
    };
    let json = serde_json::to_string_pretty(&config).context("serializing config")?;
    std::fs::write("dashboard.json", json).context("writing dashboard.json")?;
    Ok(())
}
