use thiserror::Error;

/// Errors surfaced by the persistence layer
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    RecordNotFound,

    #[error("refusing to run a mutating statement without a filter")]
    MissingWhereClause,

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Well-known persistence failures that get a fixed HTTP mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentinel {
    RecordNotFound,
    MissingWhereClause,
    InvalidTransaction,
    InvalidValue,
}

impl StoreError {
    /// The sentinel this error corresponds to, if any
    pub fn sentinel(&self) -> Option<Sentinel> {
        match self {
            StoreError::RecordNotFound => Some(Sentinel::RecordNotFound),
            StoreError::MissingWhereClause => Some(Sentinel::MissingWhereClause),
            StoreError::Sqlx(e) => sqlx_sentinel(e),
        }
    }
}

/// Map driver errors onto the sentinel table
pub fn sqlx_sentinel(err: &sqlx::Error) -> Option<Sentinel> {
    match err {
        sqlx::Error::RowNotFound => Some(Sentinel::RecordNotFound),
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => Some(Sentinel::InvalidValue),
        sqlx::Error::Database(db) => match db.code().as_deref() {
            // invalid_text_representation, invalid_datetime_format, numeric_value_out_of_range
            Some("22P02") | Some("22007") | Some("22003") => Some(Sentinel::InvalidValue),
            // invalid_transaction_state, in_failed_sql_transaction
            Some("25000") | Some("25P02") => Some(Sentinel::InvalidTransaction),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_variants_are_sentinels() {
        assert_eq!(StoreError::RecordNotFound.sentinel(), Some(Sentinel::RecordNotFound));
        assert_eq!(StoreError::MissingWhereClause.sentinel(), Some(Sentinel::MissingWhereClause));
    }

    #[test]
    fn sqlx_row_not_found_is_record_not_found() {
        assert_eq!(StoreError::from(sqlx::Error::RowNotFound).sentinel(), Some(Sentinel::RecordNotFound));
        assert_eq!(StoreError::from(sqlx::Error::PoolTimedOut).sentinel(), None);
    }

    #[test]
    fn decode_failures_are_invalid_values() {
        let err = sqlx::Error::ColumnDecode {
            index: "amount".into(),
            source: "not a number".into(),
        };
        assert_eq!(sqlx_sentinel(&err), Some(Sentinel::InvalidValue));
        assert_eq!(sqlx_sentinel(&sqlx::Error::Decode("bad utf-8".into())), Some(Sentinel::InvalidValue));
    }
}
