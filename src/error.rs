//! Error taxonomy shared by every estimation stage.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, AlaamError>;

/// Every failure is terminal for the current run.
#[derive(Error, Debug)]
pub enum AlaamError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Dimension mismatch for {what}: expected {expected}, found {found}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Outcome value {value} at node {node} is outside the binary domain {{0, 1}}")]
    InvalidOutcome { node: usize, value: u8 },

    #[error(
        "Covariance matrix is singular (reciprocal condition number {rcond:.3e}): degenerate model"
    )]
    DegenerateModel { rcond: f64 },

    #[error(
        "Non-finite value {value} in {context} at iteration {iteration}, parameter {parameter}"
    )]
    Numerical {
        context: &'static str,
        iteration: usize,
        parameter: usize,
        value: f64,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Trace writer error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Could not parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl AlaamError {
    /// True for the failures that are detected before any sampling begins.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            AlaamError::Configuration(_)
                | AlaamError::DimensionMismatch { .. }
                | AlaamError::InvalidOutcome { .. }
                | AlaamError::ConfigParse(_)
        )
    }

    /// Replaces the iteration of a numerical error with the caller's own
    /// iteration counter. Other errors are returned unchanged.
    pub(crate) fn at_iteration(self, iteration: usize) -> Self {
        match self {
            AlaamError::Numerical {
                context,
                parameter,
                value,
                ..
            } => AlaamError::Numerical {
                context,
                iteration,
                parameter,
                value,
            },
            other => other,
        }
    }
}

/// Returns a [`AlaamError::Numerical`] for the first non-finite entry of `values`.
pub(crate) fn ensure_finite<'a, I>(values: I, context: &'static str, iteration: usize) -> Result<()>
where
    I: IntoIterator<Item = &'a f64>,
{
    match values.into_iter().enumerate().find(|(_, v)| !v.is_finite()) {
        Some((parameter, &value)) => Err(AlaamError::Numerical {
            context,
            iteration,
            parameter,
            value,
        }),
        None => Ok(()),
    }
}
