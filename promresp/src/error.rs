use thiserror::Error;

use crate::convert::ConvertError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// The server answered with `"status": "error"`.
    #[error("error {error_type}: {message}")]
    Upstream { error_type: String, message: String },

    #[error("unknown result type: {0}")]
    UnknownResultType(String),

    /// A single value was requested from a vector that does not hold exactly
    /// one series.
    #[error("series count incorrect: {0}")]
    SeriesCount(usize),

    #[error(transparent)]
    Conversion(#[from] ConvertError),

    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl Error {
    /// Reported by the queried server.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Error::Upstream { .. })
    }

    pub fn is_conversion(&self) -> bool {
        matches!(self, Error::Conversion(_))
    }

    /// The response does not have the shape of a query result: a client bug
    /// or API drift rather than a problem with the query.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Error::UnknownResultType(_) | Error::SeriesCount(_) | Error::Malformed(_)
        )
    }
}
