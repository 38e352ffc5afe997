//! Order status transition table.
//!
//! Strict policy edges:
//! - Pending → InProgress | Completed | Cancelled | Rejected
//! - InProgress → Pending | Completed | Cancelled
//! - Completed, Cancelled, Rejected are terminal
//!
//! The permissive policy allows any status to follow any status.

use serde::Serialize;

use inventra_shared::TransitionPolicy;

use super::error::LedgerError;
use super::order::OrderStatus;

/// Outcome of a requested status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StatusChange {
    /// The order already has the requested status.
    Unchanged(OrderStatus),
    /// The order moves to a new status.
    Changed {
        /// Status before the change.
        from: OrderStatus,
        /// Status after the change.
        to: OrderStatus,
    },
}

impl StatusChange {
    /// The status the order has after the change.
    #[must_use]
    pub fn resulting_status(&self) -> OrderStatus {
        match self {
            Self::Unchanged(status) => *status,
            Self::Changed { to, .. } => *to,
        }
    }

    /// Returns true if something must be written.
    #[must_use]
    pub fn is_change(&self) -> bool {
        matches!(self, Self::Changed { .. })
    }
}

/// Stateless transition checks for order statuses.
pub struct OrderTransitions;

impl OrderTransitions {
    /// Check if a transition is valid under the given policy.
    ///
    /// Staying in the same status is not a transition and is never listed.
    #[must_use]
    pub fn is_valid_transition(policy: TransitionPolicy, from: OrderStatus, to: OrderStatus) -> bool {
        if from == to {
            return false;
        }
        match policy {
            TransitionPolicy::Permissive => true,
            TransitionPolicy::Strict => matches!(
                (from, to),
                (
                    OrderStatus::Pending,
                    OrderStatus::InProgress
                        | OrderStatus::Completed
                        | OrderStatus::Cancelled
                        | OrderStatus::Rejected
                ) | (
                    OrderStatus::InProgress,
                    OrderStatus::Pending | OrderStatus::Completed | OrderStatus::Cancelled
                )
            ),
        }
    }

    /// Statuses reachable from `from` in one step.
    #[must_use]
    pub fn allowed_targets(policy: TransitionPolicy, from: OrderStatus) -> Vec<OrderStatus> {
        OrderStatus::ALL
            .into_iter()
            .filter(|to| Self::is_valid_transition(policy, from, *to))
            .collect()
    }

    /// Returns true if no status may follow `status` under the policy.
    #[must_use]
    pub fn is_terminal(policy: TransitionPolicy, status: OrderStatus) -> bool {
        Self::allowed_targets(policy, status).is_empty()
    }

    /// Resolves a requested status change.
    ///
    /// Requesting the current status is a no-op success.
    ///
    /// # Errors
    ///
    /// Returns `IllegalTransition` if the table forbids the edge.
    pub fn check(
        policy: TransitionPolicy,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<StatusChange, LedgerError> {
        if from == to {
            return Ok(StatusChange::Unchanged(from));
        }
        if Self::is_valid_transition(policy, from, to) {
            Ok(StatusChange::Changed { from, to })
        } else {
            Err(LedgerError::IllegalTransition { from, to })
        }
    }
}
