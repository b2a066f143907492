//! Error types for Runway

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Import error: {0}")]
    Import(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// True for errors caused by the caller's input rather than the system
    pub fn is_user_error(&self) -> bool {
        matches!(self, Error::Import(_) | Error::InvalidData(_) | Error::Csv(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
