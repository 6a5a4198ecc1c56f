//! Order placement

use std::sync::Arc;

use jiff::Timestamp;
use tracing::info;

use crate::{
    checkout::{
        engine::{Checkout, CheckoutEngine},
        order::UserId,
        request::CheckoutRequest,
    },
    orders::{errors::PlaceOrderError, store::OrderStore},
};

/// Prices a request for an authenticated customer and stores the order.
#[derive(Clone)]
pub struct OrderPlacement {
    engine: CheckoutEngine,
    store: Arc<dyn OrderStore>,
}

impl std::fmt::Debug for OrderPlacement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderPlacement")
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

impl OrderPlacement {
    /// Creates a placement service.
    pub fn new(engine: CheckoutEngine, store: Arc<dyn OrderStore>) -> Self {
        Self { engine, store }
    }

    /// Prices `request`, attaches `user` and stores the order once.
    ///
    /// # Errors
    ///
    /// Returns [`PlaceOrderError::Checkout`] if pricing fails, in which case
    /// nothing is stored, or [`PlaceOrderError::Store`] if the insert fails.
    #[tracing::instrument(
        name = "orders.placement.place",
        skip(self, request, user),
        fields(user = %user),
        err
    )]
    pub async fn place(
        &self,
        request: &CheckoutRequest,
        user: UserId,
        now: Timestamp,
    ) -> Result<Checkout, PlaceOrderError> {
        let Checkout { order, view } = self.engine.checkout(request, now).await?;
        let order = order.with_user(user);

        self.store
            .create_order(&order)
            .await
            .map_err(PlaceOrderError::Store)?;

        info!(order = %order.uuid(), total = %order.total(), "placed order");

        Ok(Checkout { order, view })
    }
}
