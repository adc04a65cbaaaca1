//! Order lifecycle service
//!
//! Orchestrates creation, assignment, cancellation and status advancement.
//! Every call is scoped to `actor.company_id`; an order of another tenant is
//! reported exactly like a missing one.

use rust_decimal::Decimal;
use serde::Serialize;
use shared::models::{
    Actor, CreateOrderRequest, Order, OrderDetail, OrderItem, OrderSortField, OrderStatus,
    OrderSummary, OrdersQuery, Role, SortOrder, DEFAULT_LIMIT, DEFAULT_PAGE, MAX_LIMIT,
};
use shared::PaginatedResponse;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use super::money;
use super::notifier::{NotificationSink, OrderEvent};
use super::state_machine::{self, SideEffect, TransitionRule};
use crate::db::{
    DishRepository, NewOrder, OrderFilter, OrderRepository, OrderSort, Page, StatusUpdate,
    TableRepository,
};
use crate::error::{Conflict, Entity, OrderError, OrderResult};

const CREATE_ROLES: &[Role] = &[Role::Waiter, Role::Admin];
const KITCHEN_ROLES: &[Role] = &[Role::Cook, Role::Admin];
const CANCEL_ROLES: &[Role] = &[Role::Waiter, Role::Admin];

/// Payload attached to lifecycle notifications
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OrderNotice<'a> {
    order_id: i64,
    table_id: i64,
    waiter_id: i64,
    cook_id: Option<i64>,
    status: OrderStatus,
    total: Decimal,
    items: &'a [OrderItem],
}

impl<'a> From<&'a Order> for OrderNotice<'a> {
    fn from(order: &'a Order) -> Self {
        Self {
            order_id: order.id,
            table_id: order.table_id,
            waiter_id: order.waiter_id,
            cook_id: order.cook_id,
            status: order.status,
            total: order.total(),
            items: &order.order_items,
        }
    }
}

pub(crate) fn require_role(actor: &Actor, roles: &[Role], action: &str) -> OrderResult<()> {
    if actor.has_any_role(roles) {
        Ok(())
    } else {
        tracing::warn!(actor_id = actor.id, role = %actor.role, action, "Role not permitted");
        Err(OrderError::forbidden(format!("{} may not {action}", actor.role)))
    }
}

/// Clamp paging input to `page >= 1`, `1 <= limit <= MAX_LIMIT`
pub fn clamp_page(page: u32, limit: u32) -> Page {
    Page {
        page: page.max(1),
        limit: limit.clamp(1, MAX_LIMIT),
    }
}

pub struct OrderLifecycleService {
    orders: Arc<dyn OrderRepository>,
    tables: Arc<dyn TableRepository>,
    dishes: Arc<dyn DishRepository>,
    notifier: Arc<dyn NotificationSink>,
}

impl OrderLifecycleService {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        tables: Arc<dyn TableRepository>,
        dishes: Arc<dyn DishRepository>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            orders,
            tables,
            dishes,
            notifier,
        }
    }

    // ========== Commands ==========

    /// Open a `PENDING` order on a free table with snapshotted prices
    pub async fn create(&self, actor: &Actor, request: CreateOrderRequest) -> OrderResult<Order> {
        require_role(actor, CREATE_ROLES, "create orders")?;
        money::validate_order_request(&request)?;

        let company_id = actor.company_id;
        if self
            .tables
            .find_by_id(company_id, request.table_id)
            .await?
            .is_none()
        {
            return Err(OrderError::NotFound(Entity::Table, request.table_id));
        }

        // One batched price lookup
        let ids: Vec<i64> = request
            .items
            .iter()
            .map(|i| i.dish_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let prices: HashMap<i64, Decimal> = self
            .dishes
            .find_many_by_ids(company_id, &ids)
            .await?
            .into_iter()
            .map(|d| (d.id, d.price))
            .collect();

        let items = request
            .items
            .into_iter()
            .map(|item| -> OrderResult<OrderItem> {
                let price = prices
                    .get(&item.dish_id)
                    .copied()
                    .ok_or(OrderError::DishNotFound(item.dish_id))?;
                Ok(OrderItem {
                    dish_id: item.dish_id,
                    quantity: item.quantity,
                    unit_price: price,
                    notes: item.notes,
                })
            })
            .collect::<OrderResult<Vec<_>>>()?;

        let table_id = request.table_id;
        let order = self
            .orders
            .create(NewOrder {
                company_id,
                table_id,
                waiter_id: actor.id,
                items,
            })
            .await
            .map_err(|e| {
                OrderError::from_write(
                    e,
                    OrderError::NotFound(Entity::Table, table_id),
                    Conflict::TableOccupied { table_id },
                )
            })
            .inspect_err(|e| {
                tracing::warn!(company_id, table_id, error = %e, "Order creation rejected");
            })?;

        tracing::info!(
            order_id = order.id,
            company_id,
            table_id,
            actor_id = actor.id,
            total = %order.total(),
            "Order created"
        );
        self.notify(OrderEvent::OrderCreated, &order).await;
        Ok(order)
    }

    /// Take a `PENDING` order into the kitchen; the assigning cook becomes `cook_id`
    pub async fn assign(&self, actor: &Actor, order_id: i64) -> OrderResult<Order> {
        require_role(actor, KITCHEN_ROLES, "assign orders")?;
        let order = self.load(actor, order_id).await?;

        if order.status != OrderStatus::Pending || order.cook_id.is_some() {
            tracing::warn!(
                order_id,
                status = %order.status,
                cook_id = ?order.cook_id,
                "Order already assigned"
            );
            return Err(OrderError::Conflict(Conflict::AlreadyAssigned { order_id }));
        }

        let rule = state_machine::validate(&order, actor, OrderStatus::InProgress)?;
        self.apply(actor, &order, rule).await
    }

    pub async fn cancel(&self, actor: &Actor, order_id: i64) -> OrderResult<Order> {
        require_role(actor, CANCEL_ROLES, "cancel orders")?;
        self.advance_status(actor, order_id, OrderStatus::Canceled).await
    }

    /// Move an order along the status graph
    pub async fn advance_status(
        &self,
        actor: &Actor,
        order_id: i64,
        target: OrderStatus,
    ) -> OrderResult<Order> {
        let order = self.load(actor, order_id).await?;

        let rule = state_machine::validate(&order, actor, target).inspect_err(|e| {
            tracing::warn!(
                order_id,
                from = %order.status,
                to = %target,
                actor_id = actor.id,
                expected = ?state_machine::next_status(order.status, actor.role),
                error = %e,
                "Status transition rejected"
            );
        })?;
        self.apply(actor, &order, rule).await
    }

    // ========== Queries ==========

    pub async fn list_orders(
        &self,
        actor: &Actor,
        mut query: OrdersQuery,
    ) -> OrderResult<PaginatedResponse<OrderSummary>> {
        if matches!((query.from, query.to), (Some(from), Some(to)) if from > to) {
            return Err(OrderError::validation("`from` must not be after `to`"));
        }
        let page = clamp_page(query.page, query.limit);
        query.page = page.page;
        query.limit = page.limit;

        let filter = OrderFilter::from_query(actor.company_id, &query);
        self.page(&filter, page).await
    }

    /// Unassigned `PENDING` orders, oldest first
    pub async fn list_free(
        &self,
        actor: &Actor,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> OrderResult<PaginatedResponse<OrderSummary>> {
        require_role(actor, KITCHEN_ROLES, "list free orders")?;
        let page = clamp_page(page.unwrap_or(DEFAULT_PAGE), limit.unwrap_or(DEFAULT_LIMIT));

        let mut filter = OrderFilter::for_company(actor.company_id);
        filter.status = Some(OrderStatus::Pending);
        filter.unassigned_only = true;
        filter.sort = OrderSort {
            field: OrderSortField::CreatedAt,
            direction: SortOrder::Asc,
        };
        filter.page = Some(page);
        self.page(&filter, page).await
    }

    pub async fn get_by_id(&self, actor: &Actor, order_id: i64) -> OrderResult<OrderDetail> {
        self.orders
            .find_view(actor.company_id, order_id)
            .await?
            .map(OrderDetail::from)
            .ok_or(OrderError::NotFound(Entity::Order, order_id))
    }

    // ========== Internals ==========

    async fn load(&self, actor: &Actor, order_id: i64) -> OrderResult<Order> {
        self.orders
            .find_by_id(actor.company_id, order_id)
            .await?
            .ok_or(OrderError::NotFound(Entity::Order, order_id))
    }

    async fn page(
        &self,
        filter: &OrderFilter,
        page: Page,
    ) -> OrderResult<PaginatedResponse<OrderSummary>> {
        let total = self.orders.count(filter).await?;
        let views = self.orders.find_many(filter).await?;
        let data = views.iter().map(OrderSummary::from).collect();
        Ok(PaginatedResponse::new(data, total, page.page, page.limit))
    }

    /// Persist a validated transition as one conditional write
    async fn apply(
        &self,
        actor: &Actor,
        order: &Order,
        rule: &TransitionRule,
    ) -> OrderResult<Order> {
        let not_found = OrderError::NotFound(Entity::Order, order.id);
        let updated = match rule.effect {
            SideEffect::AssignCook => self
                .orders
                .assign(actor.company_id, order.id, actor.id)
                .await
                .map_err(|e| {
                    OrderError::from_write(
                        e,
                        not_found,
                        Conflict::AlreadyAssigned { order_id: order.id },
                    )
                }),
            SideEffect::None | SideEffect::ReleaseTable => self
                .orders
                .update_status(StatusUpdate {
                    company_id: actor.company_id,
                    order_id: order.id,
                    from: rule.from,
                    to: rule.to,
                    release_table: rule.effect == SideEffect::ReleaseTable,
                })
                .await
                .map_err(|e| {
                    OrderError::from_write(
                        e,
                        not_found,
                        Conflict::StaleStatus {
                            order_id: order.id,
                            expected: rule.from,
                        },
                    )
                }),
        }
        .inspect_err(|e| {
            tracing::warn!(
                order_id = order.id,
                from = %rule.from,
                to = %rule.to,
                error = %e,
                "Status write lost a race"
            );
        })?;

        tracing::info!(
            order_id = updated.id,
            company_id = updated.company_id,
            table_id = updated.table_id,
            actor_id = actor.id,
            from = %rule.from,
            to = %rule.to,
            released_table = rule.effect == SideEffect::ReleaseTable,
            "Order status changed"
        );

        let event = match rule.to {
            OrderStatus::InProgress => OrderEvent::OrderAssigned,
            OrderStatus::Complete => OrderEvent::OrderReady,
            OrderStatus::Canceled => OrderEvent::OrderCanceled,
            _ => OrderEvent::OrderStatusChanged,
        };
        self.notify(event, &updated).await;
        Ok(updated)
    }

    /// Best-effort delivery; failures are logged and never undo the change
    async fn notify(&self, event: OrderEvent, order: &Order) {
        let payload = match serde_json::to_value(OrderNotice::from(order)) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(order_id = order.id, %event, error = %e, "Failed to encode notification");
                return;
            }
        };

        let result = match event {
            OrderEvent::OrderCreated | OrderEvent::OrderCanceled => {
                self.notifier.notify_kitchen(event, payload).await
            }
            _ => {
                self.notifier
                    .notify_waiter(event, payload, order.waiter_id)
                    .await
            }
        };
        if let Err(e) = result {
            tracing::error!(order_id = order.id, %event, error = %e, "Notification delivery failed");
        }
    }
}
