//! Analytics service

use shared::models::{Actor, OrderAnalyticsQuery, OrderAnalyticsResult, Role};
use std::sync::Arc;

use super::aggregator;
use crate::db::{OrderFilter, OrderRepository};
use crate::error::{OrderError, OrderResult};
use crate::orders::service::require_role;

const ANALYTICS_ROLES: &[Role] = &[Role::Admin];

pub struct AnalyticsService {
    orders: Arc<dyn OrderRepository>,
}

impl AnalyticsService {
    pub fn new(orders: Arc<dyn OrderRepository>) -> Self {
        Self { orders }
    }

    /// Group the tenant's orders per `query`
    ///
    /// Only the tenant and the date window are pushed down to the repository;
    /// id-list filters are applied during attribution.
    pub async fn order_analytics(
        &self,
        actor: &Actor,
        query: &OrderAnalyticsQuery,
    ) -> OrderResult<Vec<OrderAnalyticsResult>> {
        require_role(actor, ANALYTICS_ROLES, "read analytics")?;
        if matches!((query.from, query.to), (Some(from), Some(to)) if from > to) {
            return Err(OrderError::validation("`from` must not be after `to`"));
        }

        let mut filter = OrderFilter::for_company(actor.company_id);
        filter.from = query.from;
        filter.to = query.to;
        let orders = self.orders.find_many(&filter).await?;

        let results = aggregator::aggregate(&orders, query);
        tracing::debug!(
            company_id = actor.company_id,
            group_by = %query.group_by,
            metric = %query.metric,
            orders = orders.len(),
            groups = results.len(),
            "Order analytics computed"
        );
        Ok(results)
    }
}
