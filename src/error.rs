use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    /// Configuration that cannot produce meaningful numbers (crushing against
    /// defense 0, rosters that can never be eliminated, runaway battles).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The acting combatant has no living opponent. Handled by skipping the turn.
    #[error("no valid target")]
    NoValidTarget,

    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
