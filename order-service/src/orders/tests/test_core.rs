use super::*;

#[tokio::test]
async fn test_create_snapshots_prices() {
    let h = create_test_service();
    let order = h
        .service
        .create(&waiter(), order_request(1, &[(PIZZA, 2), (SALAD, 1)]))
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.waiter_id, WAITER);
    assert_eq!(order.cook_id, None);
    assert_eq!(order.order_items.len(), 2);
    assert_eq!(order.order_items[0].unit_price, Decimal::new(1000, 2));
    assert_eq!(order.order_items[1].unit_price, Decimal::new(500, 2));
    assert_eq!(order.total(), Decimal::new(2500, 2));
    assert!(!table_active(&h, 1).await);
    assert_eq!(
        h.notifier.events(),
        vec![(Channel::Kitchen, OrderEvent::OrderCreated)]
    );
}

#[tokio::test]
async fn test_price_change_does_not_touch_existing_order() {
    let h = create_test_service();
    let order = open_order(&h, 1).await;
    assert_eq!(order.total(), Decimal::new(1000, 2));

    h.store
        .update_dish_price(PIZZA, Decimal::new(2000, 2))
        .unwrap();

    let detail = h.service.get_by_id(&waiter(), order.id).await.unwrap();
    assert_eq!(detail.total, Decimal::new(1000, 2));
    assert_eq!(detail.items[0].unit_price_snapshot, Decimal::new(1000, 2));

    // New orders pick up the new price
    let next = open_order(&h, 2).await;
    assert_eq!(next.total(), Decimal::new(2000, 2));
}

#[tokio::test]
async fn test_duplicate_dish_lines_are_kept() {
    let h = create_test_service();
    let order = h
        .service
        .create(&waiter(), order_request(1, &[(PIZZA, 1), (PIZZA, 3)]))
        .await
        .unwrap();
    assert_eq!(order.order_items.len(), 2);
    assert_eq!(order.total(), Decimal::new(4000, 2));
}

#[tokio::test]
async fn test_admin_can_create() {
    let h = create_test_service();
    let order = h
        .service
        .create(&admin(), order_request(3, &[(SALAD, 1)]))
        .await
        .unwrap();
    assert_eq!(order.waiter_id, ADMIN);
}

#[tokio::test]
async fn test_cook_cannot_create() {
    let h = create_test_service();
    let err = h
        .service
        .create(&cook(), order_request(1, &[(PIZZA, 1)]))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::Forbidden(_)));
    assert!(table_active(&h, 1).await);
}

#[tokio::test]
async fn test_create_with_unknown_dish() {
    let h = create_test_service();
    let err = h
        .service
        .create(&waiter(), order_request(1, &[(PIZZA, 1), (999, 1)]))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::DishNotFound(999)));
    assert!(table_active(&h, 1).await);
}

#[tokio::test]
async fn test_create_with_foreign_dish() {
    let h = create_test_service();
    let err = h
        .service
        .create(&waiter(), order_request(1, &[(FOREIGN_DISH, 1)]))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::DishNotFound(FOREIGN_DISH)));
}

#[tokio::test]
async fn test_create_on_foreign_table() {
    let h = create_test_service();
    let err = h
        .service
        .create(&waiter(), order_request(FOREIGN_TABLE, &[(PIZZA, 1)]))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::NotFound(Entity::Table, FOREIGN_TABLE)));
}

#[tokio::test]
async fn test_create_validates_items() {
    let h = create_test_service();

    let empty = h.service.create(&waiter(), order_request(1, &[])).await;
    assert!(matches!(empty, Err(OrderError::EmptyOrder)));

    let zero = h
        .service
        .create(&waiter(), order_request(1, &[(PIZZA, 0)]))
        .await;
    assert!(matches!(
        zero,
        Err(OrderError::InvalidQuantity { dish_id: PIZZA, quantity: 0 })
    ));

    let huge = h
        .service
        .create(&waiter(), order_request(1, &[(PIZZA, 10_000)]))
        .await;
    assert!(matches!(
        huge,
        Err(OrderError::InvalidQuantity { quantity: 10_000, .. })
    ));
    assert!(h.notifier.events().is_empty());
    assert!(table_active(&h, 1).await);
}

// ========================================================================
// Table exclusivity
// ========================================================================

#[tokio::test]
async fn test_second_order_on_table_conflicts() {
    let h = create_test_service();
    open_order(&h, 1).await;

    let err = h
        .service
        .create(&other_waiter(), order_request(1, &[(SALAD, 1)]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        OrderError::Conflict(Conflict::TableOccupied { table_id: 1 })
    ));
}

#[tokio::test]
async fn test_table_reusable_after_finish() {
    let h = create_test_service();
    order_in_status(&h, 1, OrderStatus::Finished).await;
    assert!(table_active(&h, 1).await);

    let next = open_order(&h, 1).await;
    assert_eq!(next.status, OrderStatus::Pending);
}

#[tokio::test]
async fn test_table_reusable_after_cancel() {
    let h = create_test_service();
    order_in_status(&h, 1, OrderStatus::Canceled).await;
    assert!(table_active(&h, 1).await);

    open_order(&h, 1).await;
    assert!(!table_active(&h, 1).await);
}

#[tokio::test]
async fn test_table_stays_occupied_until_terminal() {
    let h = create_test_service();
    order_in_status(&h, 1, OrderStatus::Delivered).await;
    assert!(!table_active(&h, 1).await);

    let err = h
        .service
        .create(&waiter(), order_request(1, &[(PIZZA, 1)]))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::Conflict(_)));
}

// ========================================================================
// Reads
// ========================================================================

#[tokio::test]
async fn test_get_by_id_detail() {
    let h = create_test_service();
    let order = h
        .service
        .create(&waiter(), order_request(4, &[(PIZZA, 2), (SALAD, 1)]))
        .await
        .unwrap();

    let detail = h.service.get_by_id(&cook(), order.id).await.unwrap();
    assert_eq!(detail.id, order.id);
    assert_eq!(detail.table.number, 4);
    assert_eq!(detail.waiter.name, "Wanda");
    assert!(detail.cook.is_none());
    assert_eq!(detail.total, Decimal::new(2500, 2));
    assert_eq!(detail.items[0].dish.name, "Pizza");
    assert_eq!(detail.items[0].dish.category_name.as_deref(), Some("Mains"));
    assert_eq!(detail.items[0].line_total, Decimal::new(2000, 2));
}

#[tokio::test]
async fn test_get_by_id_across_tenants_is_not_found() {
    let h = create_test_service();
    let order = open_order(&h, 1).await;

    let err = h
        .service
        .get_by_id(&foreign_waiter(), order.id)
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::NotFound(Entity::Order, id) if id == order.id));

    let missing = h.service.get_by_id(&waiter(), 4242).await.unwrap_err();
    assert!(matches!(missing, OrderError::NotFound(Entity::Order, 4242)));
}

#[tokio::test]
async fn test_list_orders_filters_and_paginates() {
    let h = create_test_service();
    for table in 1..=5 {
        open_order(&h, table).await;
    }
    order_in_status(&h, 6, OrderStatus::InProgress).await;

    let all = h
        .service
        .list_orders(&waiter(), OrdersQuery::default())
        .await
        .unwrap();
    assert_eq!(all.total, 6);
    assert_eq!(all.page, 1);
    assert_eq!(all.limit, 10);
    assert_eq!(all.total_pages, 1);

    let pending = h
        .service
        .list_orders(
            &waiter(),
            OrdersQuery {
                status: Some(OrderStatus::Pending),
                page: 2,
                limit: 2,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(pending.total, 5);
    assert_eq!(pending.total_pages, 3);
    assert_eq!(pending.data.len(), 2);
    assert!(pending.data.iter().all(|o| o.status == OrderStatus::Pending));

    let cooking = h
        .service
        .list_orders(
            &waiter(),
            OrdersQuery {
                cook_id: Some(COOK),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cooking.total, 1);
    assert_eq!(cooking.data[0].cook.as_ref().unwrap().name, "Carla");
}

#[tokio::test]
async fn test_list_orders_default_sort_newest_first() {
    let h = create_test_service();
    let first = open_order(&h, 1).await;
    let second = open_order(&h, 2).await;

    let page = h
        .service
        .list_orders(&waiter(), OrdersQuery::default())
        .await
        .unwrap();
    let ids: Vec<i64> = page.data.iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);

    let asc = h
        .service
        .list_orders(
            &waiter(),
            OrdersQuery {
                sort_by: shared::models::OrderSortField::Id,
                sort_order: shared::models::SortOrder::Asc,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(asc.data[0].id, first.id);
}

#[tokio::test]
async fn test_list_orders_clamps_limit() {
    let h = create_test_service();
    open_order(&h, 1).await;

    let page = h
        .service
        .list_orders(
            &waiter(),
            OrdersQuery {
                page: 0,
                limit: 500,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(page.page, 1);
    assert_eq!(page.limit, shared::models::MAX_LIMIT);
}

#[tokio::test]
async fn test_list_orders_is_tenant_scoped() {
    let h = create_test_service();
    open_order(&h, 1).await;

    let foreign = h
        .service
        .list_orders(&foreign_waiter(), OrdersQuery::default())
        .await
        .unwrap();
    assert_eq!(foreign.total, 0);
    assert!(foreign.data.is_empty());
}

#[tokio::test]
async fn test_list_orders_rejects_inverted_range() {
    let h = create_test_service();
    let now = chrono::Utc::now();
    let err = h
        .service
        .list_orders(
            &waiter(),
            OrdersQuery {
                from: Some(now),
                to: Some(now - chrono::Duration::days(1)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::Validation(_)));
}

#[tokio::test]
async fn test_list_free_only_unassigned_pending() {
    let h = create_test_service();
    let free = open_order(&h, 1).await;
    order_in_status(&h, 2, OrderStatus::InProgress).await;
    order_in_status(&h, 3, OrderStatus::Canceled).await;

    let page = h.service.list_free(&cook(), None, None).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.data[0].id, free.id);

    let err = h.service.list_free(&waiter(), None, None).await.unwrap_err();
    assert!(matches!(err, OrderError::Forbidden(_)));

    assert!(h.service.list_free(&admin(), Some(1), Some(5)).await.is_ok());
}

// ========================================================================
// Notifications
// ========================================================================

#[tokio::test]
async fn test_notification_failure_keeps_state_change() {
    let h = create_test_service();
    h.notifier.fail.store(true, Ordering::SeqCst);

    let order = open_order(&h, 1).await;
    assert!(!table_active(&h, 1).await);

    let assigned = h.service.assign(&cook(), order.id).await.unwrap();
    assert_eq!(assigned.status, OrderStatus::InProgress);

    let stored = h.service.get_by_id(&waiter(), order.id).await.unwrap();
    assert_eq!(stored.status, OrderStatus::InProgress);
    assert!(h.notifier.events().is_empty());
}

#[tokio::test]
async fn test_notification_payload() {
    let h = create_test_service();
    let order = open_order(&h, 1).await;

    let sent = h.notifier.sent.lock();
    let payload = &sent[0].payload;
    assert_eq!(payload["orderId"], order.id);
    assert_eq!(payload["tableId"], 1);
    assert_eq!(payload["status"], "PENDING");
    assert_eq!(payload["total"], 10.0);
}
