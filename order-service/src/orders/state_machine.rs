//! Order status state machine
//!
//! The allowed graph is the `TRANSITIONS` table; nothing else in the crate
//! decides whether a status change is legal.
//!
//! ```text
//! PENDING ──► IN_PROGRESS ──► COMPLETE ──► DELIVERED ──► FINISHED
//!    │
//!    └──► CANCELED
//! ```

use shared::models::{Actor, Order, OrderStatus, Role};

use crate::error::{OrderError, OrderResult};

/// Extra check beyond the role list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    None,
    /// Only the cook assigned to the order may act
    AssignedCook,
}

/// Write performed together with the status change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideEffect {
    None,
    /// `cook_id = actor.id`, only while unassigned
    AssignCook,
    /// `table.active = true`
    ReleaseTable,
}

/// One edge of the status graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRule {
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub roles: &'static [Role],
    pub guard: Guard,
    pub effect: SideEffect,
}

pub const TRANSITIONS: &[TransitionRule] = &[
    TransitionRule {
        from: OrderStatus::Pending,
        to: OrderStatus::InProgress,
        roles: &[Role::Cook, Role::Admin],
        guard: Guard::None,
        effect: SideEffect::AssignCook,
    },
    TransitionRule {
        from: OrderStatus::Pending,
        to: OrderStatus::Canceled,
        roles: &[Role::Waiter, Role::Admin],
        guard: Guard::None,
        effect: SideEffect::ReleaseTable,
    },
    TransitionRule {
        from: OrderStatus::InProgress,
        to: OrderStatus::Complete,
        roles: &[Role::Cook],
        guard: Guard::AssignedCook,
        effect: SideEffect::None,
    },
    TransitionRule {
        from: OrderStatus::Complete,
        to: OrderStatus::Delivered,
        roles: &[Role::Waiter, Role::Admin],
        guard: Guard::None,
        effect: SideEffect::None,
    },
    TransitionRule {
        from: OrderStatus::Delivered,
        to: OrderStatus::Finished,
        roles: &[Role::Waiter, Role::Admin],
        guard: Guard::None,
        effect: SideEffect::ReleaseTable,
    },
];

/// Rule for `(from, to)`, if the edge exists
pub fn rule_for(from: OrderStatus, to: OrderStatus) -> Option<&'static TransitionRule> {
    TRANSITIONS.iter().find(|r| r.from == from && r.to == to)
}

/// The forward step a `role` may take from `from` (cancel excluded)
pub fn next_status(from: OrderStatus, role: Role) -> Option<OrderStatus> {
    TRANSITIONS
        .iter()
        .find(|r| r.from == from && r.to != OrderStatus::Canceled && r.roles.contains(&role))
        .map(|r| r.to)
}

/// Check that `actor` may move `order` to `to`.
///
/// Edge checks come first: an unknown edge is `InvalidTransition` whatever the
/// actor, a known edge with the wrong role or identity is `Forbidden`.
pub fn validate(
    order: &Order,
    actor: &Actor,
    to: OrderStatus,
) -> OrderResult<&'static TransitionRule> {
    let rule = rule_for(order.status, to).ok_or(OrderError::InvalidTransition {
        from: order.status,
        to,
    })?;

    if !actor.has_any_role(rule.roles) {
        return Err(OrderError::forbidden(format!(
            "{} may not move an order from {} to {}",
            actor.role, rule.from, rule.to
        )));
    }

    match rule.guard {
        Guard::AssignedCook if order.cook_id != Some(actor.id) => {
            Err(OrderError::forbidden(format!(
                "order {} is assigned to another cook",
                order.id
            )))
        }
        _ => Ok(rule),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    const ROLES: [Role; 3] = [Role::Admin, Role::Waiter, Role::Cook];

    fn order(status: OrderStatus, cook_id: Option<i64>) -> Order {
        let now = Utc::now();
        Order {
            id: 1,
            company_id: 1,
            table_id: 1,
            waiter_id: 2,
            cook_id,
            status,
            created_at: now,
            updated_at: now,
            order_items: vec![],
        }
    }

    #[test]
    fn test_every_pair_outside_table_is_invalid() {
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                if rule_for(from, to).is_some() {
                    continue;
                }
                for role in ROLES {
                    let actor = Actor::new(3, role, 1);
                    let err = validate(&order(from, Some(3)), &actor, to).unwrap_err();
                    assert!(
                        matches!(err, OrderError::InvalidTransition { from: f, to: t } if f == from && t == to),
                        "{from} -> {to} as {role} gave {err:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_table_has_five_edges() {
        assert_eq!(TRANSITIONS.len(), 5);
        for rule in TRANSITIONS {
            assert!(!rule.from.is_terminal());
            assert_ne!(rule.from, rule.to);
        }
    }

    #[test]
    fn test_wrong_role_is_forbidden_on_valid_edges() {
        for rule in TRANSITIONS {
            for role in ROLES.into_iter().filter(|r| !rule.roles.contains(r)) {
                let actor = Actor::new(3, role, 1);
                let err = validate(&order(rule.from, Some(3)), &actor, rule.to).unwrap_err();
                assert!(matches!(err, OrderError::Forbidden(_)), "{role} on {} -> {}", rule.from, rule.to);
            }
        }
    }

    #[test]
    fn test_only_assigned_cook_completes() {
        let cooking = order(OrderStatus::InProgress, Some(7));

        let other_cook = Actor::new(8, Role::Cook, 1);
        assert!(matches!(
            validate(&cooking, &other_cook, OrderStatus::Complete),
            Err(OrderError::Forbidden(_))
        ));

        let assigned = Actor::new(7, Role::Cook, 1);
        let rule = validate(&cooking, &assigned, OrderStatus::Complete).unwrap();
        assert_eq!(rule.effect, SideEffect::None);

        let admin = Actor::new(1, Role::Admin, 1);
        assert!(matches!(
            validate(&cooking, &admin, OrderStatus::Complete),
            Err(OrderError::Forbidden(_))
        ));
    }

    #[test]
    fn test_table_release_edges() {
        let releasing: Vec<_> = TRANSITIONS
            .iter()
            .filter(|r| r.effect == SideEffect::ReleaseTable)
            .map(|r| r.to)
            .collect();
        assert_eq!(releasing, vec![OrderStatus::Canceled, OrderStatus::Finished]);
    }

    #[test]
    fn test_next_status_per_role() {
        assert_eq!(
            next_status(OrderStatus::Pending, Role::Cook),
            Some(OrderStatus::InProgress)
        );
        assert_eq!(next_status(OrderStatus::Pending, Role::Waiter), None);
        assert_eq!(
            next_status(OrderStatus::Complete, Role::Waiter),
            Some(OrderStatus::Delivered)
        );
        assert_eq!(next_status(OrderStatus::Complete, Role::Cook), None);
        assert_eq!(next_status(OrderStatus::Finished, Role::Admin), None);
    }
}
