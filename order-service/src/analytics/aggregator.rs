//! Order analytics aggregation
//!
//! Pure functions over an already loaded, tenant-scoped order set:
//!
//! 1. drop canceled orders, filter orders and items by the query
//! 2. fan out into `(order, item)` attributions
//! 3. fold attributions into per-group accumulators
//! 4. derive averages, shares, the sparse daily trend and its extremes
//! 5. sort by `value` desc, then group key asc

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use shared::models::{
    DishRef, GroupBy, GroupInfo, Metric, OrderAnalyticsQuery, OrderAnalyticsResult, OrderItem,
    OrderStatus, OrderView, TrendPoint,
};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use crate::orders::money::{percentage, ratio, round_money};

/// Typed group key; ordering is the tie-break order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum GroupKey {
    Day(NaiveDate),
    /// First day of the month
    Month(NaiveDate),
    Entity(i64),
}

impl GroupKey {
    pub fn label(&self) -> String {
        match self {
            GroupKey::Day(date) => date.format("%Y-%m-%d").to_string(),
            GroupKey::Month(date) => date.format("%Y-%m").to_string(),
            GroupKey::Entity(id) => id.to_string(),
        }
    }
}

/// One order line attributed to a group
#[derive(Debug, Clone, Copy)]
pub struct Attribution<'a> {
    pub order: &'a OrderView,
    pub item: &'a OrderItem,
    pub dish: &'a DishRef,
}

impl Attribution<'_> {
    fn revenue(&self) -> Decimal {
        self.item.line_total()
    }

    fn day(&self) -> NaiveDate {
        self.order.order.created_at.date_naive()
    }
}

fn contains(filter: &Option<Vec<i64>>, id: i64) -> bool {
    match filter {
        Some(ids) if !ids.is_empty() => ids.contains(&id),
        _ => true,
    }
}

fn contains_opt(filter: &Option<Vec<i64>>, id: Option<i64>) -> bool {
    match filter {
        Some(ids) if !ids.is_empty() => id.is_some_and(|id| ids.contains(&id)),
        _ => true,
    }
}

fn order_matches(view: &OrderView, query: &OrderAnalyticsQuery) -> bool {
    let order = &view.order;
    // Canceled orders never produced revenue
    order.status != OrderStatus::Canceled
        && query.from.is_none_or(|from| order.created_at >= from)
        && query.to.is_none_or(|to| order.created_at <= to)
        && contains(&query.waiter_ids, order.waiter_id)
        && contains_opt(&query.cook_ids, order.cook_id)
        && contains(&query.table_ids, order.table_id)
}

fn item_matches(dish: &DishRef, query: &OrderAnalyticsQuery) -> bool {
    contains(&query.dish_ids, dish.id) && contains_opt(&query.category_ids, dish.category_id)
}

/// Fan the order set out into attributed lines.
///
/// Order-level filters drop whole orders; item-level filters (dishes,
/// categories) keep an order when any line matches and attribute only the
/// matching lines.
pub fn attribute<'a>(
    orders: &'a [OrderView],
    query: &OrderAnalyticsQuery,
) -> Vec<Attribution<'a>> {
    orders
        .iter()
        .filter(|view| order_matches(view, query))
        .flat_map(|view| {
            view.lines()
                .filter(move |(_, dish)| item_matches(dish, query))
                .map(move |(item, dish)| Attribution {
                    order: view,
                    item,
                    dish,
                })
        })
        .collect()
}

/// Group key and display info of an attribution; `None` skips it
fn classify(a: &Attribution<'_>, group_by: GroupBy) -> Option<(GroupKey, GroupInfo)> {
    let view = a.order;
    let key = match group_by {
        GroupBy::Day => GroupKey::Day(a.day()),
        GroupBy::Month => {
            let day = a.day();
            GroupKey::Month(NaiveDate::from_ymd_opt(day.year(), day.month(), 1)?)
        }
        GroupBy::Dish => GroupKey::Entity(a.dish.id),
        GroupBy::Category => GroupKey::Entity(a.dish.category_id?),
        GroupBy::Waiter => GroupKey::Entity(view.waiter.id),
        GroupBy::Cook => GroupKey::Entity(view.cook.as_ref()?.id),
        GroupBy::Table => GroupKey::Entity(view.table.id),
    };

    let label = key.label();
    let info = match group_by {
        GroupBy::Day | GroupBy::Month => GroupInfo {
            label,
            ..Default::default()
        },
        GroupBy::Dish => GroupInfo {
            label: a.dish.name.clone(),
            name: Some(a.dish.name.clone()),
            category_id: a.dish.category_id,
            category_name: a.dish.category_name.clone(),
            ..Default::default()
        },
        GroupBy::Category => {
            let name = a.dish.category_name.clone().unwrap_or(label);
            GroupInfo {
                label: name.clone(),
                name: Some(name),
                category_id: a.dish.category_id,
                ..Default::default()
            }
        }
        GroupBy::Waiter => GroupInfo {
            label: view.waiter.name.clone(),
            name: Some(view.waiter.name.clone()),
            ..Default::default()
        },
        GroupBy::Cook => {
            let name = view.cook.as_ref().map(|c| c.name.clone()).unwrap_or(label);
            GroupInfo {
                label: name.clone(),
                name: Some(name),
                ..Default::default()
            }
        }
        GroupBy::Table => GroupInfo {
            label: format!("Table {}", view.table.number),
            table_number: Some(view.table.number),
            ..Default::default()
        },
    };
    Some((key, info))
}

/// Counters for one group or one day of a group
#[derive(Debug, Default, Clone)]
struct Tally {
    orders: BTreeSet<i64>,
    quantity: i64,
    revenue: Decimal,
}

impl Tally {
    fn add(&mut self, a: &Attribution<'_>) {
        self.orders.insert(a.order.order.id);
        self.quantity += i64::from(a.item.quantity);
        self.revenue += a.revenue();
    }

    fn count(&self) -> i64 {
        self.orders.len() as i64
    }

    fn metric(&self, metric: Metric) -> Decimal {
        match metric {
            Metric::Revenue => self.revenue,
            Metric::Count => Decimal::from(self.count()),
            Metric::Quantity => Decimal::from(self.quantity),
        }
    }
}

#[derive(Debug)]
struct GroupAcc {
    info: GroupInfo,
    total: Tally,
    daily: BTreeMap<NaiveDate, Tally>,
}

/// Highest and lowest trend point; earliest day wins ties
fn extremes(trend: &[TrendPoint]) -> Option<(&TrendPoint, &TrendPoint)> {
    let first = trend.first()?;
    let (mut peak, mut trough) = (first, first);
    for point in &trend[1..] {
        if point.value > peak.value {
            peak = point;
        }
        if point.value < trough.value {
            trough = point;
        }
    }
    Some((peak, trough))
}

/// Aggregate `orders` per `query`; an empty match yields an empty list
pub fn aggregate(orders: &[OrderView], query: &OrderAnalyticsQuery) -> Vec<OrderAnalyticsResult> {
    let mut groups: BTreeMap<GroupKey, GroupAcc> = BTreeMap::new();
    for a in attribute(orders, query) {
        let Some((key, info)) = classify(&a, query.group_by) else {
            continue;
        };
        let acc = groups.entry(key).or_insert_with(|| GroupAcc {
            info,
            total: Tally::default(),
            daily: BTreeMap::new(),
        });
        acc.total.add(&a);
        acc.daily.entry(a.day()).or_default().add(&a);
    }

    let total_revenue: Decimal = groups.values().map(|g| g.total.revenue).sum();
    let total_value: Decimal = groups
        .values()
        .map(|g| g.total.metric(query.metric))
        .sum();

    let mut results: Vec<(GroupKey, OrderAnalyticsResult)> = groups
        .into_iter()
        .map(|(key, acc)| {
            let count = acc.total.count();
            let value = acc.total.metric(query.metric);
            let trend: Vec<TrendPoint> = acc
                .daily
                .iter()
                .map(|(date, tally)| TrendPoint {
                    date: *date,
                    value: round_money(tally.metric(query.metric)),
                })
                .collect();
            let (max_day, min_day, peak_day, trough_day) = match extremes(&trend) {
                Some((peak, trough)) => {
                    (peak.value, trough.value, Some(peak.date), Some(trough.date))
                }
                None => (Decimal::ZERO, Decimal::ZERO, None, None),
            };

            let result = OrderAnalyticsResult {
                group_key: key.label(),
                group_info: acc.info,
                count,
                quantity: acc.total.quantity,
                revenue: round_money(acc.total.revenue),
                value: round_money(value),
                avg_revenue_per_order: ratio(acc.total.revenue, Decimal::from(count)),
                avg_items_per_order: ratio(Decimal::from(acc.total.quantity), Decimal::from(count)),
                percentage_of_total_revenue: percentage(acc.total.revenue, total_revenue),
                percentage_of_total: percentage(value, total_value),
                trend,
                max_revenue_in_day: max_day,
                min_revenue_in_day: min_day,
                peak_day,
                trough_day,
            };
            (key, result)
        })
        .collect();

    results.sort_by(|(ka, a), (kb, b)| match b.value.cmp(&a.value) {
        Ordering::Equal => ka.cmp(kb),
        other => other,
    });
    results.into_iter().map(|(_, r)| r).collect()
}
