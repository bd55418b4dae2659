//! Shared Diesel and pool error classification for the repositories.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

/// Coarse category of a Diesel failure, for repositories to map onto their
/// port error variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DbFailure {
    /// The connection dropped or could not be used.
    Connection(String),
    /// A unique constraint rejected the write.
    UniqueViolation { constraint: Option<String> },
    /// Any other failure.
    Query(String),
}

/// Classify a Diesel error and emit debug context.
pub(crate) fn classify(error: DieselError) -> DbFailure {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                constraint = info.constraint_name(),
                "diesel operation failed"
            );
        }
        _ => debug!(error = %error, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            DbFailure::UniqueViolation {
                constraint: info.constraint_name().map(str::to_owned),
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            DbFailure::Connection(info.message().to_owned())
        }
        DieselError::BrokenTransactionManager => {
            DbFailure::Connection("transaction manager is broken".to_owned())
        }
        DieselError::DatabaseError(_, info) => DbFailure::Query(info.message().to_owned()),
        other => DbFailure::Query(other.to_string()),
    }
}

/// Error carried out of a Diesel transaction closure: either a database
/// failure or a domain outcome that must roll the transaction back.
#[derive(Debug)]
pub(crate) enum TxError<E> {
    Db(DieselError),
    Domain(E),
}

impl<E> From<DieselError> for TxError<E> {
    fn from(value: DieselError) -> Self {
        Self::Db(value)
    }
}

impl<E> TxError<E> {
    /// Resolve into the port error, classifying database failures with `db`.
    pub(crate) fn resolve(self, db: impl FnOnce(DbFailure) -> E) -> E {
        match self {
            Self::Db(error) => db(classify(error)),
            Self::Domain(error) => error,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn not_found_is_a_query_failure() {
        assert!(matches!(classify(DieselError::NotFound), DbFailure::Query(_)));
    }

    #[rstest]
    fn broken_transactions_are_connection_failures() {
        assert!(matches!(
            classify(DieselError::BrokenTransactionManager),
            DbFailure::Connection(_)
        ));
    }

    #[rstest]
    fn domain_outcomes_pass_through() {
        let err: TxError<&str> = TxError::Domain("course full");
        assert_eq!(err.resolve(|_| "db"), "course full");
    }

    #[rstest]
    fn diesel_errors_convert_into_tx_errors() {
        let err: TxError<&str> = DieselError::RollbackTransaction.into();
        assert_eq!(err.resolve(|_| "db"), "db");
    }
}
