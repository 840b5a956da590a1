use thiserror::Error;

pub type Result<T> = std::result::Result<T, BetaBinomialError>;

#[derive(Debug, Error)]
pub enum BetaBinomialError {
    #[error("Invalid hyper-parameter {name} = {value}: must be positive and finite")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("Success probability {0} outside [0, 1]")]
    InvalidProbability(f64),

    /// The moment estimator divides by the first moment and by a moment
    /// expression that vanishes on degenerate samples.
    #[error("Degenerate estimator input: {0}")]
    DegenerateEstimatorInput(String),

    #[error("Shape mismatch in row {row}: expected {expected} trials, got {actual}")]
    ShapeMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Non-binary trial outcome {value} at row {row}, column {col}")]
    NonBinaryCell { row: usize, col: usize, value: u32 },

    #[error("Could not parse trial outcome '{field}' at row {row}, column {col}")]
    Parse { row: usize, col: usize, field: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl BetaBinomialError {
    pub fn is_degenerate(&self) -> bool {
        matches!(self, BetaBinomialError::DegenerateEstimatorInput(_))
    }
}
