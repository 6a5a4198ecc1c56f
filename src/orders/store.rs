//! Order store.

use async_trait::async_trait;
use mockall::automock;
use tracing::debug;

use crate::{
    checkout::order::Order,
    database::Db,
    orders::{errors::OrderStoreError, repository::PgOrdersRepository},
};

/// Persists placed orders.
#[automock]
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Inserts a new order.
    async fn create_order(&self, order: &Order) -> Result<(), OrderStoreError>;
}

/// Postgres-backed [`OrderStore`].
#[derive(Debug, Clone)]
pub struct PgOrderStore {
    db: Db,
    repository: PgOrdersRepository,
}

impl PgOrderStore {
    /// Creates a store writing through `db`.
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgOrdersRepository::new(),
        }
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn create_order(&self, order: &Order) -> Result<(), OrderStoreError> {
        let mut tx = self.db.begin().await?;

        let rows_affected = self.repository.create_order(&mut tx, order).await?;

        tx.commit().await?;

        debug!(order = %order.uuid(), rows_affected, "inserted order");

        Ok(())
    }
}
