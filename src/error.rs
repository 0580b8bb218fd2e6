//! Typed error taxonomy shared by the core operations.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrmError {
    #[error("not authenticated: {0}")]
    NotAuthenticated(String),
    #[error("business {0} not found")]
    NotFound(i64),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("invalid input: {0}")]
    Validation(&'static str),
    #[error("SMTP not configured")]
    MailNotConfigured,
    #[error("failed to send email: {0}")]
    Delivery(String),
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, CrmError>;

impl CrmError {
    /// Stable machine-readable tag, used by the CLI when reporting failures.
    pub fn kind(&self) -> &'static str {
        match self {
            CrmError::NotAuthenticated(_) => "not_authenticated",
            CrmError::NotFound(_) => "not_found",
            CrmError::Conflict(_) => "conflict",
            CrmError::Validation(_) => "validation",
            CrmError::MailNotConfigured | CrmError::Delivery(_) => "delivery",
            CrmError::Db(_) => "db",
        }
    }
}
