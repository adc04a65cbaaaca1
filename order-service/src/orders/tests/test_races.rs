use super::*;
use futures::future::join_all;

const CONTENDERS: usize = 8;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_on_one_table() {
    let h = create_test_service();

    let tasks = (0..CONTENDERS).map(|_| {
        let service = h.service.clone();
        tokio::spawn(async move {
            service
                .create(&waiter(), order_request(1, &[(PIZZA, 1)]))
                .await
        })
    });
    let results: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let created = results.iter().filter(|r| r.is_ok()).count();
    let occupied = results
        .iter()
        .filter(|r| matches!(r, Err(OrderError::Conflict(Conflict::TableOccupied { table_id: 1 }))))
        .count();
    assert_eq!(created, 1);
    assert_eq!(occupied, CONTENDERS - 1);

    let open = h
        .service
        .list_orders(
            &waiter(),
            OrdersQuery {
                table_id: Some(1),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(open.total, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_assigns_single_winner() {
    let h = create_test_service();
    let order_id = open_order(&h, 1).await.id;

    let tasks = (0..CONTENDERS).map(|i| {
        let service = h.service.clone();
        let actor = Actor::new(COOK + i as i64, Role::Cook, COMPANY);
        tokio::spawn(async move { (actor.id, service.assign(&actor, order_id).await) })
    });
    let results: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let winners: Vec<i64> = results
        .iter()
        .filter(|(_, r)| r.is_ok())
        .map(|(id, _)| *id)
        .collect();
    assert_eq!(winners.len(), 1);
    assert!(
        results
            .iter()
            .filter(|(_, r)| r.is_err())
            .all(|(_, r)| matches!(r, Err(OrderError::Conflict(_))))
    );

    let detail = h.service.get_by_id(&admin(), order_id).await.unwrap();
    assert_eq!(detail.status, OrderStatus::InProgress);
    assert_eq!(detail.cook.map(|c| c.id), Some(winners[0]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_advance_single_winner() {
    let h = create_test_service();
    let order_id = order_in_status(&h, 1, OrderStatus::Complete).await.id;

    let tasks = (0..CONTENDERS).map(|i| {
        let service = h.service.clone();
        let actor = if i % 2 == 0 { waiter() } else { other_waiter() };
        tokio::spawn(async move {
            service
                .advance_status(&actor, order_id, OrderStatus::Delivered)
                .await
        })
    });
    let results: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    // Losers either lost the conditional write or read the new status
    assert!(results.iter().filter_map(|r| r.as_ref().err()).all(|e| matches!(
        e,
        OrderError::Conflict(Conflict::StaleStatus { .. }) | OrderError::InvalidTransition { .. }
    )));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_cancel_and_assign_race() {
    let h = create_test_service();
    let order_id = open_order(&h, 1).await.id;

    let cancel = {
        let service = h.service.clone();
        tokio::spawn(async move { service.cancel(&waiter(), order_id).await })
    };
    let assign = {
        let service = h.service.clone();
        tokio::spawn(async move { service.assign(&cook(), order_id).await })
    };
    let (cancel, assign) = (cancel.await.unwrap(), assign.await.unwrap());

    // Exactly one of the two transitions out of PENDING commits
    assert!(cancel.is_ok() ^ assign.is_ok());

    let detail = h.service.get_by_id(&admin(), order_id).await.unwrap();
    if cancel.is_ok() {
        assert_eq!(detail.status, OrderStatus::Canceled);
        assert!(detail.cook.is_none());
        assert!(table_active(&h, 1).await);
    } else {
        assert_eq!(detail.status, OrderStatus::InProgress);
        assert!(!table_active(&h, 1).await);
    }
}
