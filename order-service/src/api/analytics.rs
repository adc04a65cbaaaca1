//! Analytics endpoint

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use shared::error::AppError;
use shared::models::{GroupBy, OrderAnalyticsQuery, OrderAnalyticsResult};

use super::auth::CurrentActor;
use super::query::{Bound, parse_ids, parse_instant, parse_opt};
use super::ApiResult;
use crate::state::AppState;

/// GET /api/analytics/orders?groupBy=dish&metric=revenue&from=2024-01-01&dishIds=1,2
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsParams {
    pub group_by: Option<String>,
    pub metric: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub dish_ids: Option<String>,
    pub category_ids: Option<String>,
    pub waiter_ids: Option<String>,
    pub cook_ids: Option<String>,
    pub table_ids: Option<String>,
}

impl TryFrom<AnalyticsParams> for OrderAnalyticsQuery {
    type Error = AppError;

    fn try_from(p: AnalyticsParams) -> Result<Self, Self::Error> {
        let group_by: GroupBy = parse_opt(p.group_by.as_deref(), "groupBy")?
            .ok_or_else(|| AppError::validation("groupBy is required").with_detail("field", "groupBy"))?;
        Ok(OrderAnalyticsQuery {
            group_by,
            metric: parse_opt(p.metric.as_deref(), "metric")?.unwrap_or_default(),
            from: parse_instant(p.from.as_deref(), "from", Bound::Start)?,
            to: parse_instant(p.to.as_deref(), "to", Bound::End)?,
            dish_ids: parse_ids(p.dish_ids.as_deref(), "dishIds")?,
            category_ids: parse_ids(p.category_ids.as_deref(), "categoryIds")?,
            waiter_ids: parse_ids(p.waiter_ids.as_deref(), "waiterIds")?,
            cook_ids: parse_ids(p.cook_ids.as_deref(), "cookIds")?,
            table_ids: parse_ids(p.table_ids.as_deref(), "tableIds")?,
        })
    }
}

pub async fn order_analytics(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Query(params): Query<AnalyticsParams>,
) -> ApiResult<Vec<OrderAnalyticsResult>> {
    let query = OrderAnalyticsQuery::try_from(params)?;
    Ok(Json(state.analytics.order_analytics(&actor, &query).await?))
}
