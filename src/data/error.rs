use std::fmt;

use thiserror::Error;

/// The step of the selection cascade an outcome belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Season,
    Division,
    Team,
    Batter,
    Date,
    Lookup,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Season => "season",
            Stage::Division => "division",
            Stage::Team => "team",
            Stage::Batter => "batter",
            Stage::Date => "date",
            Stage::Lookup => "pitch lookup",
        };
        f.write_str(name)
    }
}

/// Everything the pipeline can report back to the UI.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    /// A load or fetch failed. The session has nothing to show until reload.
    #[error("data unavailable: {0}")]
    DataUnavailable(String),

    /// A stage produced no rows. Shown as a notice, never a crash.
    #[error("no {stage} data: {detail}")]
    EmptyResult { stage: Stage, detail: String },

    /// An upstream choice has not been made yet.
    #[error("select a {0}")]
    MissingSelection(Stage),

    /// The pitch set is already expressed in km/h.
    #[error("speeds are already converted to km/h")]
    AlreadyConverted,
}

impl PipelineError {
    pub fn unavailable(err: &anyhow::Error) -> Self {
        PipelineError::DataUnavailable(format!("{err:#}"))
    }

    pub fn empty(stage: Stage, detail: impl Into<String>) -> Self {
        PipelineError::EmptyResult {
            stage,
            detail: detail.into(),
        }
    }

    /// Fatal errors block the whole session; the rest only stop one path.
    pub fn is_fatal(&self) -> bool {
        matches!(self, PipelineError::DataUnavailable(_))
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
