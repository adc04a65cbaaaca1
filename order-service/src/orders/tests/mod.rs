use super::*;
use crate::db::{MemoryStore, TableRepository};
use crate::error::{Conflict, Entity, OrderError};
use async_trait::async_trait;
use notifier::NotifyError;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde_json::Value;
use shared::models::{
    Actor, Category, CreateOrderRequest, DiningTable, Dish, Employee, NewOrderItem, Order,
    OrderStatus, OrdersQuery, Role,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

const COMPANY: i64 = 1;
const OTHER_COMPANY: i64 = 2;

const WAITER: i64 = 10;
const OTHER_WAITER: i64 = 11;
const COOK: i64 = 20;
const OTHER_COOK: i64 = 21;
const ADMIN: i64 = 30;
const FOREIGN_WAITER: i64 = 40;

/// Tables 1..=8 belong to COMPANY, table 9 to OTHER_COMPANY
const FOREIGN_TABLE: i64 = 9;

const PIZZA: i64 = 100;
const SALAD: i64 = 101;
const FOREIGN_DISH: i64 = 200;

// ========================================================================
// Notification recorder
// ========================================================================

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
    fail: AtomicBool,
}

impl RecordingNotifier {
    fn events(&self) -> Vec<(Channel, OrderEvent)> {
        self.sent
            .lock()
            .iter()
            .map(|n| (n.channel, n.event))
            .collect()
    }

    fn record(&self, channel: Channel, event: OrderEvent, payload: Value) -> Result<(), NotifyError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(NotifyError::Delivery("kitchen display offline".into()));
        }
        self.sent.lock().push(Notification {
            channel,
            event,
            payload,
        });
        Ok(())
    }
}

#[async_trait]
impl NotificationSink for RecordingNotifier {
    async fn notify_kitchen(&self, event: OrderEvent, payload: Value) -> Result<(), NotifyError> {
        self.record(Channel::Kitchen, event, payload)
    }

    async fn notify_waiter(
        &self,
        event: OrderEvent,
        payload: Value,
        waiter_id: i64,
    ) -> Result<(), NotifyError> {
        self.record(Channel::Waiter(waiter_id), event, payload)
    }
}

// ========================================================================
// Harness
// ========================================================================

struct Harness {
    store: Arc<MemoryStore>,
    notifier: Arc<RecordingNotifier>,
    service: Arc<OrderLifecycleService>,
}

fn seed(store: &MemoryStore) {
    for id in 1..=8 {
        store.insert_table(DiningTable {
            id,
            company_id: COMPANY,
            number: id as i32,
            seats: 4,
            active: true,
        });
    }
    store.insert_table(DiningTable {
        id: FOREIGN_TABLE,
        company_id: OTHER_COMPANY,
        number: 1,
        seats: 2,
        active: true,
    });

    for (id, name, role, company_id) in [
        (WAITER, "Wanda", Role::Waiter, COMPANY),
        (OTHER_WAITER, "Walt", Role::Waiter, COMPANY),
        (COOK, "Carla", Role::Cook, COMPANY),
        (OTHER_COOK, "Colin", Role::Cook, COMPANY),
        (ADMIN, "Ada", Role::Admin, COMPANY),
        (FOREIGN_WAITER, "Fred", Role::Waiter, OTHER_COMPANY),
    ] {
        store.insert_employee(Employee {
            id,
            company_id,
            name: name.to_string(),
            role,
        });
    }

    store.insert_category(Category {
        id: 5,
        company_id: COMPANY,
        name: "Mains".into(),
    });
    store.insert_category(Category {
        id: 6,
        company_id: COMPANY,
        name: "Starters".into(),
    });
    store.insert_dish(Dish {
        id: PIZZA,
        company_id: COMPANY,
        name: "Pizza".into(),
        price: Decimal::new(1000, 2),
        category_id: Some(5),
    });
    store.insert_dish(Dish {
        id: SALAD,
        company_id: COMPANY,
        name: "Salad".into(),
        price: Decimal::new(500, 2),
        category_id: Some(6),
    });
    store.insert_dish(Dish {
        id: FOREIGN_DISH,
        company_id: OTHER_COMPANY,
        name: "Ramen".into(),
        price: Decimal::new(1200, 2),
        category_id: None,
    });
}

fn create_test_service() -> Harness {
    let store = Arc::new(MemoryStore::new());
    seed(&store);
    let notifier = Arc::new(RecordingNotifier::default());
    let service = Arc::new(OrderLifecycleService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        notifier.clone(),
    ));
    Harness {
        store,
        notifier,
        service,
    }
}

fn waiter() -> Actor {
    Actor::new(WAITER, Role::Waiter, COMPANY)
}

fn other_waiter() -> Actor {
    Actor::new(OTHER_WAITER, Role::Waiter, COMPANY)
}

fn cook() -> Actor {
    Actor::new(COOK, Role::Cook, COMPANY)
}

fn other_cook() -> Actor {
    Actor::new(OTHER_COOK, Role::Cook, COMPANY)
}

fn admin() -> Actor {
    Actor::new(ADMIN, Role::Admin, COMPANY)
}

fn foreign_waiter() -> Actor {
    Actor::new(FOREIGN_WAITER, Role::Waiter, OTHER_COMPANY)
}

fn order_request(table_id: i64, items: &[(i64, i32)]) -> CreateOrderRequest {
    CreateOrderRequest {
        table_id,
        items: items
            .iter()
            .map(|&(dish_id, quantity)| NewOrderItem {
                dish_id,
                quantity,
                notes: None,
            })
            .collect(),
    }
}

/// Open an order with one pizza on `table_id`
async fn open_order(h: &Harness, table_id: i64) -> Order {
    h.service
        .create(&waiter(), order_request(table_id, &[(PIZZA, 1)]))
        .await
        .expect("Failed to open order")
}

/// Drive a fresh order on `table_id` to `status` along the normal path
async fn order_in_status(h: &Harness, table_id: i64, status: OrderStatus) -> Order {
    let mut order = open_order(h, table_id).await;
    let path: Vec<(OrderStatus, Actor)> = match status {
        OrderStatus::Pending => vec![],
        OrderStatus::Canceled => vec![(OrderStatus::Canceled, waiter())],
        OrderStatus::InProgress => vec![(OrderStatus::InProgress, cook())],
        OrderStatus::Complete => vec![
            (OrderStatus::InProgress, cook()),
            (OrderStatus::Complete, cook()),
        ],
        OrderStatus::Delivered => vec![
            (OrderStatus::InProgress, cook()),
            (OrderStatus::Complete, cook()),
            (OrderStatus::Delivered, waiter()),
        ],
        OrderStatus::Finished => vec![
            (OrderStatus::InProgress, cook()),
            (OrderStatus::Complete, cook()),
            (OrderStatus::Delivered, waiter()),
            (OrderStatus::Finished, waiter()),
        ],
    };
    for (target, actor) in path {
        order = h
            .service
            .advance_status(&actor, order.id, target)
            .await
            .expect("Failed to advance order");
    }
    assert_eq!(order.status, status);
    order
}

async fn table_active(h: &Harness, table_id: i64) -> bool {
    TableRepository::find_by_id(h.store.as_ref(), COMPANY, table_id)
        .await
        .unwrap()
        .unwrap()
        .active
}

mod test_core;
mod test_races;
