use thiserror::Error;

/// Everything that can abort a ranking run. There is no partial output: the first error wins.
#[derive(Error, Debug)]
pub enum RankingError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid game at row {row}: {reason}")]
    InvalidGame { row: usize, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown schedule format for {0} (expected .csv or .json)")]
    UnknownFormat(String),

    #[error("Schedule contains no games")]
    EmptySchedule,

    #[error("No rankings for week {0}")]
    UnknownWeek(u32),
}

pub type Result<T> = std::result::Result<T, RankingError>;
