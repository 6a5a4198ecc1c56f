//! Orders Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{Postgres, Transaction, query};

use crate::{checkout::order::Order, orders::errors::OrderStoreError};

const CREATE_ORDER_SQL: &str = include_str!("sql/create_order.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrdersRepository;

impl PgOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: &Order,
    ) -> Result<u64, OrderStoreError> {
        let totals = order.totals();

        let billing = order.billing().map(serde_json::to_string).transpose()?;
        let shipping = order.shipping().map(serde_json::to_string).transpose()?;
        let transport = order.transport().map(i64::try_from).transpose()?;

        let rows_affected = query(CREATE_ORDER_SQL)
            .bind(order.uuid().into_uuid())
            .bind(order.user())
            .bind(SqlxTimestamp::from(order.created_at()))
            .bind(order.currency())
            .bind(i64::try_from(totals.quantity)?)
            .bind(totals.volume)
            .bind(totals.weight)
            .bind(totals.sum)
            .bind(totals.discount)
            .bind(totals.delivery)
            .bind(totals.discount2)
            .bind(totals.vat)
            .bind(totals.total)
            .bind(order.comment())
            .bind(billing)
            .bind(order.vat_id())
            .bind(shipping)
            .bind(transport)
            .bind(order.payment().map(i64::from))
            .bind(order.payment_suffix())
            .bind(order.coupons())
            .bind(order.description())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}
