//! Order endpoints

use axum::{
    Json,
    extract::{Path, Query, State},
};
use http::StatusCode;
use serde::Deserialize;
use shared::PaginatedResponse;
use shared::error::AppError;
use shared::models::{
    AdvanceStatusRequest, CreateOrderRequest, Order, OrderDetail, OrderSummary, OrdersQuery,
};

use super::auth::CurrentActor;
use super::query::{Bound, parse_instant, parse_opt};
use super::ApiResult;
use crate::state::AppState;

/// Raw `GET /api/orders` query string
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOrdersParams {
    pub status: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub waiter_id: Option<String>,
    pub cook_id: Option<String>,
    pub table_id: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl TryFrom<ListOrdersParams> for OrdersQuery {
    type Error = AppError;

    fn try_from(p: ListOrdersParams) -> Result<Self, Self::Error> {
        let defaults = OrdersQuery::default();
        Ok(OrdersQuery {
            status: parse_opt(p.status.as_deref(), "status")?,
            from: parse_instant(p.from.as_deref(), "from", Bound::Start)?,
            to: parse_instant(p.to.as_deref(), "to", Bound::End)?,
            waiter_id: parse_opt(p.waiter_id.as_deref(), "waiterId")?,
            cook_id: parse_opt(p.cook_id.as_deref(), "cookId")?,
            table_id: parse_opt(p.table_id.as_deref(), "tableId")?,
            page: parse_opt(p.page.as_deref(), "page")?.unwrap_or(defaults.page),
            limit: parse_opt(p.limit.as_deref(), "limit")?.unwrap_or(defaults.limit),
            sort_by: parse_opt(p.sort_by.as_deref(), "sortBy")?.unwrap_or(defaults.sort_by),
            sort_order: parse_opt(p.sort_order.as_deref(), "sortOrder")?
                .unwrap_or(defaults.sort_order),
        })
    }
}

/// Raw paging query string
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// POST /api/orders
pub async fn create(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    let order = state.orders.create(&actor, request).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /api/orders
pub async fn list(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Query(params): Query<ListOrdersParams>,
) -> ApiResult<PaginatedResponse<OrderSummary>> {
    let query = OrdersQuery::try_from(params)?;
    Ok(Json(state.orders.list_orders(&actor, query).await?))
}

/// GET /api/orders/free
pub async fn list_free(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Query(params): Query<PageParams>,
) -> ApiResult<PaginatedResponse<OrderSummary>> {
    let page = parse_opt(params.page.as_deref(), "page")?;
    let limit = parse_opt(params.limit.as_deref(), "limit")?;
    Ok(Json(state.orders.list_free(&actor, page, limit).await?))
}

/// GET /api/orders/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i64>,
) -> ApiResult<OrderDetail> {
    Ok(Json(state.orders.get_by_id(&actor, id).await?))
}

/// POST /api/orders/{id}/assign
pub async fn assign(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i64>,
) -> ApiResult<Order> {
    Ok(Json(state.orders.assign(&actor, id).await?))
}

/// POST /api/orders/{id}/cancel
pub async fn cancel(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i64>,
) -> ApiResult<Order> {
    Ok(Json(state.orders.cancel(&actor, id).await?))
}

/// PATCH /api/orders/{id}/status
pub async fn advance_status(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i64>,
    Json(request): Json<AdvanceStatusRequest>,
) -> ApiResult<Order> {
    Ok(Json(
        state
            .orders
            .advance_status(&actor, id, request.status)
            .await?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{OrderSortField, OrderStatus, SortOrder};

    #[test]
    fn test_params_default_to_query_defaults() {
        let query = OrdersQuery::try_from(ListOrdersParams::default()).unwrap();
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, 10);
        assert_eq!(query.sort_by, OrderSortField::CreatedAt);
        assert_eq!(query.sort_order, SortOrder::Desc);
    }

    #[test]
    fn test_params_are_parsed() {
        let query = OrdersQuery::try_from(ListOrdersParams {
            status: Some("pending".into()),
            table_id: Some("4".into()),
            sort_by: Some("updatedAt".into()),
            sort_order: Some("asc".into()),
            page: Some("3".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(query.status, Some(OrderStatus::Pending));
        assert_eq!(query.table_id, Some(4));
        assert_eq!(query.sort_by, OrderSortField::UpdatedAt);
        assert_eq!(query.sort_order, SortOrder::Asc);
        assert_eq!(query.page, 3);
    }

    #[test]
    fn test_unknown_sort_field_is_validation_error() {
        let err = OrdersQuery::try_from(ListOrdersParams {
            sort_by: Some("total".into()),
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(err.code, shared::error::ErrorCode::ValidationFailed);
    }
}
