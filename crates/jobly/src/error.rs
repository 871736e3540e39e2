//! Error types for jobly

use thiserror::Error;

use crate::validate::ValidationErrors;

/// Result type alias for jobly operations
pub type JobResult<T> = Result<T, JobError>;

/// Closed set of error kinds callers branch on.
///
/// A boundary layer (HTTP handler, CLI) maps these to user-visible statuses via
/// [`ErrorKind::status_code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or empty payload.
    InvalidInput,
    /// Title collision on create.
    DuplicateEntry,
    /// No row for the given id.
    NotFound,
    /// Caller lacks the capability an operation requires.
    Unauthorized,
    /// Anything unclassified: store, pool, decode, configuration.
    Internal,
}

impl ErrorKind {
    /// HTTP-style status code for this kind.
    pub fn status_code(self) -> u16 {
        match self {
            Self::InvalidInput | Self::DuplicateEntry => 400,
            Self::Unauthorized => 401,
            Self::NotFound => 404,
            Self::Internal => 500,
        }
    }
}

/// Error types for job-board operations
#[derive(Debug, Error)]
pub enum JobError {
    /// Malformed or empty input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Field-level validation failures
    #[error("Invalid input: {0}")]
    Validation(ValidationErrors),

    /// Title already taken
    #[error("{0}")]
    DuplicateEntry(String),

    /// Row not found
    #[error("{0}")]
    NotFound(String),

    /// Missing capability
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),

    /// Migration error
    #[cfg(feature = "migrate")]
    #[error("Migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),
}

impl JobError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a duplicate entry error
    pub fn duplicate(message: impl Into<String>) -> Self {
        Self::DuplicateEntry(message.into())
    }

    /// The closed kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) | Self::Validation(_) => ErrorKind::InvalidInput,
            Self::DuplicateEntry(_) => ErrorKind::DuplicateEntry,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            _ => ErrorKind::Internal,
        }
    }

    /// Shorthand for `self.kind().status_code()`.
    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Check if this is a duplicate entry error
    pub fn is_duplicate(&self) -> bool {
        self.kind() == ErrorKind::DuplicateEntry
    }

    /// Check if this is an invalid input error
    pub fn is_invalid_input(&self) -> bool {
        self.kind() == ErrorKind::InvalidInput
    }

    /// Parse a tokio_postgres error into a more specific JobError
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        if let Some(db_err) = err.as_db_error() {
            let constraint = db_err.constraint().unwrap_or("unknown");
            let message = db_err.message();

            match db_err.code().code() {
                "23505" => return Self::DuplicateEntry(format!("{}: {}", constraint, message)),
                // Unknown company handle on insert/update.
                "23503" => return Self::InvalidInput(format!("{}: {}", constraint, message)),
                _ => {}
            }
        }
        Self::Query(err)
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for JobError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}

#[cfg(feature = "migrate")]
impl From<refinery::Error> for JobError {
    fn from(err: refinery::Error) -> Self {
        Self::Migration(err.to_string())
    }
}

impl From<ValidationErrors> for JobError {
    fn from(errs: ValidationErrors) -> Self {
        Self::Validation(errs)
    }
}
