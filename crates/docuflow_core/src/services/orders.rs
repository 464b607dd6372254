//! crates/docuflow_core/src/services/orders.rs
//!
//! Owns the order lifecycle: creation, ownership-checked reads and the
//! status-update call.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Order, OrderStatus};
use crate::ports::{EntityStore, ServiceError, ServiceResult};
use crate::services::fetch_owned_order;

#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn EntityStore>,
}

impl OrderService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Creates a new pending order for an existing user.
    pub async fn create(&self, user_id: Uuid) -> ServiceResult<Order> {
        // Resolving the user first turns a dangling id into NotFound
        // instead of a foreign-key error.
        self.store.get_user(user_id).await?;
        self.store.create_order(user_id).await
    }

    pub async fn get(&self, order_id: Uuid, caller: Uuid) -> ServiceResult<Order> {
        fetch_owned_order(self.store.as_ref(), order_id, caller).await
    }

    /// Lists all orders owned by the caller. No pagination.
    pub async fn list(&self, caller: Uuid) -> ServiceResult<Vec<Order>> {
        self.store.list_orders(caller).await
    }

    /// Sets an order's status to any value in the settable set.
    ///
    /// Deliberately permissive: no transition graph is enforced, so
    /// `completed -> pending` is accepted. `paid` is excluded here; it is
    /// only reachable through payment confirmation.
    pub async fn update_status(
        &self,
        order_id: Uuid,
        raw_status: &str,
        caller: Uuid,
    ) -> ServiceResult<Order> {
        fetch_owned_order(self.store.as_ref(), order_id, caller).await?;

        let status = OrderStatus::parse(raw_status)
            .filter(|s| OrderStatus::SETTABLE.contains(s))
            .ok_or_else(|| {
                let valid: Vec<&str> = OrderStatus::SETTABLE.iter().map(|s| s.as_str()).collect();
                ServiceError::BadRequest(format!(
                    "invalid status: {}. valid statuses are: {}",
                    raw_status,
                    valid.join(", ")
                ))
            })?;

        self.store.update_order_status(order_id, status).await
    }
}
