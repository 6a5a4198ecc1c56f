//! Order storage errors.

use std::num::TryFromIntError;

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::errors::CheckoutError;

/// Failure persisting an order.
#[derive(Debug, Error)]
pub enum OrderStoreError {
    /// An order with the same uuid was already stored.
    #[error("order already exists")]
    AlreadyExists,

    /// Referenced related row does not exist.
    #[error("related resource not found")]
    InvalidReference,

    /// A required column was left empty.
    #[error("missing required data")]
    MissingRequiredData,

    /// A column check rejected the order.
    #[error("invalid data")]
    InvalidData,

    /// Underlying SQL/storage error.
    #[error("storage error")]
    Sql(#[source] Error),

    /// A count does not fit its column.
    #[error("invalid numeric value")]
    InvalidNumber(#[from] TryFromIntError),

    /// A profile snapshot could not be serialized.
    #[error("failed to serialize order snapshot")]
    Serialization(#[from] serde_json::Error),
}

impl From<Error> for OrderStoreError {
    fn from(error: Error) -> Self {
        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}

/// Failure placing an order.
#[derive(Debug, Error)]
pub enum PlaceOrderError {
    /// The order could not be priced.
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// The priced order could not be stored.
    #[error("failed to store order")]
    Store(#[source] OrderStoreError),
}
