use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading, analysing, and exporting power traces.
#[derive(Debug, Error)]
pub enum PowerError {
    #[error("could not access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error in {path:?}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{path:?} has {found} columns, 4 are needed (time, voltage, current, power)")]
    MissingColumns { path: PathBuf, found: usize },

    #[error("no valid samples left in {0:?} after cleaning")]
    EmptyTrace(PathBuf),

    #[error("invalid time range: {0}")]
    InvalidRange(String),

    #[error("invalid battery settings: {0}")]
    InvalidBattery(String),

    #[error("plotting failed: {0}")]
    Plot(String),

    #[error("no valid csv file to analyse")]
    NoInput,
}

impl PowerError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PowerError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        PowerError::Csv {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PowerError>;
