use sea_orm::{DbErr, TransactionError};

/// Failure of a band-archive operation.
///
/// `Validation` and `NotFound` carry a message meant for the client.
/// `Internal` wraps everything else and is never shown verbatim.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Internal(#[from] color_eyre::Report),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        Self::Internal(color_eyre::Report::new(err).wrap_err("Database operation failed"))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(color_eyre::Report::new(err).wrap_err("File operation failed"))
    }
}

impl From<TransactionError<AppError>> for AppError {
    fn from(err: TransactionError<AppError>) -> Self {
        match err {
            TransactionError::Connection(db_err) => db_err.into(),
            TransactionError::Transaction(app_err) => app_err,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_error_keeps_inner_error() {
        let err: AppError =
            TransactionError::Transaction(AppError::not_found("Song not found")).into();
        assert!(matches!(err, AppError::NotFound(ref msg) if msg == "Song not found"));
    }

    #[test]
    fn test_db_error_is_internal() {
        let err: AppError = DbErr::Custom("boom".to_string()).into();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
