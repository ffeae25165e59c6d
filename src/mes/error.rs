use thiserror::Error;

/// Errors surfaced by the MES collaborator.
///
/// Validation failures (wrong part, wrong operation, inactive container) are
/// not in here; those are workflow rejections, not MES errors. Everything in
/// this enum is converted to a single log entry at the scan/command boundary
/// and never propagates past the station controller.
#[derive(Debug, Clone, Error)]
pub enum MesError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("MES API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected MES response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for MesError {
    fn from(err: reqwest::Error) -> Self {
        MesError::Network(err.to_string())
    }
}
