/// Data layer: rows, loading, the selection pipeline and enrichment.
///
/// Architecture:
/// ```text
///  season .csv (remote) / .csv .json .parquet (local)     Batter_ID / Pitcher_ID
///        │                                                  │
///        ▼                                                  ▼
///   ┌──────────┐                                      ┌──────────┐
///   │  loader  │  parse → Season (game type R,        │ identity │  id → name
///   └──────────┘          sorted by date)             └──────────┘
///        │                                                  │
///        ▼                                                  │
///   ┌──────────┐  team → batter → opponent → date           │
///   │  filter  │  (index lists over the shared Season)  ◄───┘ batter names
///   └──────────┘
///        │  GameSlice
///        ▼
///   ┌──────────┐  mph → km/h once, pitcher names,      ┌──────────┐
///   │  enrich  │ ◄──────────────────────────────────── │  savant  │ per-game lookup
///   └──────────┘                                       └──────────┘
///        │  GameDetail
///        ▼
///   ┌────────────┐
///   │ projection │  table rows, description filter, chart groups
///   └────────────┘
/// ```

pub mod enrich;
pub mod error;
pub mod filter;
pub mod identity;
pub mod loader;
pub mod model;
pub mod projection;
pub mod savant;
