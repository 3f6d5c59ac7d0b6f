use sqlx::error::ErrorKind;

#[derive(Debug, thiserror::Error)]
#[error("{info}")]
pub struct QueryError {
    info: String,
}

impl QueryError {
    pub fn new(info: String) -> Self {
        Self { info }
    }
}

impl From<sqlx::Error> for QueryError {
    fn from(value: sqlx::Error) -> Self {
        match value {
            sqlx::Error::Configuration(e) => Self::new(format!("{e}")),
            sqlx::Error::Database(e) => Self::new(format!("{e}")),
            sqlx::Error::Io(e) => Self::new(format!("{e}")),
            sqlx::Error::Tls(e) => Self::new(format!("{e}")),
            sqlx::Error::Protocol(e) => Self::new(e),
            sqlx::Error::RowNotFound => Self::new(format!("RowNotFound")),
            sqlx::Error::TypeNotFound { type_name } => {
                Self::new(format!("Type not found: {type_name}"))
            }
            sqlx::Error::ColumnIndexOutOfBounds { index, len } => {
                Self::new(format!("Column index out of bounds {index} ({len})"))
            }
            sqlx::Error::ColumnNotFound(e) => Self::new(format!("Column not found: {e}")),
            sqlx::Error::ColumnDecode { index, source } => {
                Self::new(format!("Column decode {index} ({source})"))
            }
            sqlx::Error::Decode(e) => Self::new(format!("{e}")),
            sqlx::Error::PoolTimedOut => Self::new(format!("Pool timed out")),
            sqlx::Error::PoolClosed => Self::new(format!("Pool closed")),
            sqlx::Error::WorkerCrashed => Self::new(format!("Worker crashed")),
            sqlx::Error::Migrate(e) => Self::new(format!("{e}")),
            e => Self::new(format!("{e}")),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for QueryError {
    fn from(value: sqlx::migrate::MigrateError) -> Self {
        Self::new(format!("{value}"))
    }
}

/// Failures surfaced by the relation engine.
///
/// Everything except `TokenExhaustion`, `Internal` and `Query` is a
/// user-correctable state and maps to a 4xx status.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Validation failed: {0}")]
    ValidationFailure(String),
    #[error("{0} already exists")]
    AlreadyExists(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("Referenced {0} does not exist")]
    NotFoundEndpoint(String),
    #[error("{0} cannot reference itself")]
    SelfReference(String),
    #[error("Could not allocate a unique short link after {attempts} attempts")]
    TokenExhaustion { attempts: usize },
    #[error("Internal error: {0}")]
    Internal(String),
    #[error(transparent)]
    Query(#[from] QueryError),
}

impl Error {
    pub fn status_code(&self) -> u16 {
        match self {
            Error::ValidationFailure(_)
            | Error::AlreadyExists(_)
            | Error::NotFound(_)
            | Error::SelfReference(_) => 400,
            Error::NotFoundEndpoint(_) => 404,
            Error::TokenExhaustion { .. } | Error::Internal(_) | Error::Query(_) => 500,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

impl From<sqlx::Error> for Error {
    fn from(value: sqlx::Error) -> Self {
        Error::Query(QueryError::from(value))
    }
}

impl From<sqlx::migrate::MigrateError> for Error {
    fn from(value: sqlx::migrate::MigrateError) -> Self {
        Error::Query(QueryError::from(value))
    }
}

/// How a storage-level constraint violation should be reported for a
/// particular write.
#[derive(Debug, Clone, Copy)]
pub struct Violations<'a> {
    pub subject: &'a str,
    pub check: CheckViolation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckViolation {
    SelfReference,
    Validation,
}

impl<'a> Violations<'a> {
    pub fn relation(subject: &'a str) -> Self {
        Self {
            subject,
            check: CheckViolation::SelfReference,
        }
    }

    pub fn entity(subject: &'a str) -> Self {
        Self {
            subject,
            check: CheckViolation::Validation,
        }
    }

    /// Translates constraint failures into the error taxonomy; anything else
    /// stays a raw query error.
    pub fn translate(&self, value: sqlx::Error) -> Error {
        let kind = match &value {
            sqlx::Error::Database(e) => Some(e.kind()),
            _ => None,
        };
        let Some(kind) = kind else {
            return Error::from(value);
        };

        match kind {
            ErrorKind::UniqueViolation => Error::AlreadyExists(self.subject.to_owned()),
            ErrorKind::ForeignKeyViolation => Error::NotFoundEndpoint(self.subject.to_owned()),
            ErrorKind::CheckViolation => match self.check {
                CheckViolation::SelfReference => Error::SelfReference(self.subject.to_owned()),
                CheckViolation::Validation => {
                    Error::ValidationFailure(format!("{} violates a constraint", self.subject))
                }
            },
            ErrorKind::NotNullViolation => {
                Error::ValidationFailure(format!("{} is missing a required field", self.subject))
            }
            _ => Error::from(value),
        }
    }
}
