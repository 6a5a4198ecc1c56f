//! Orders

pub mod errors;
pub mod placement;
pub(crate) mod repository;
pub mod store;

pub use errors::{OrderStoreError, PlaceOrderError};
pub use placement::OrderPlacement;
pub use store::{MockOrderStore, OrderStore, PgOrderStore};
