//! Errors raised while loading frequency tables and building cost models.

use std::io;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// The cost policy name or its parameters are not recognized
    #[error("invalid cost policy: {0}")]
    InvalidPolicy(String),
    /// The table is empty or holds frequencies the policy cannot use
    #[error("invalid frequency table: {0}")]
    InvalidFrequencyTable(String),
    /// The penalty for unknown words must be finite and positive
    #[error("invalid max cost: {0}")]
    InvalidMaxCost(f64),
    /// A line of a tab-separated frequency file could not be parsed
    #[error("parse error at line {line}: {msg}")]
    Parse { line: usize, msg: String },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[cfg(feature = "gzip-json")]
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid_table<S: Into<String>>(msg: S) -> Self {
        Self::InvalidFrequencyTable(msg.into())
    }

    pub(crate) fn invalid_policy<S: Into<String>>(msg: S) -> Self {
        Self::InvalidPolicy(msg.into())
    }
}
