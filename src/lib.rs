//! MLB batting dashboard: season play-by-play in, one batter's game out.
//!
//! The binary (`src/main.rs`) is a thin egui shell over [`state::AppState`];
//! everything here runs without a window.

pub mod color;
pub mod config;
pub mod data;
pub mod state;
