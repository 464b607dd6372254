//! crates/docuflow_core/src/services/mod.rs
//!
//! The service layer: one component per aggregate, each constructed with
//! explicit references to the ports it needs. No ambient state.

mod analyses;
mod documents;
mod orders;
mod payments;

pub use analyses::AnalysisService;
pub use documents::{sanitize_filename, DocumentService};
pub use orders::OrderService;
pub use payments::{CreatedIntent, PaymentService};

use uuid::Uuid;

use crate::domain::Order;
use crate::ports::{EntityStore, ServiceError, ServiceResult};

/// Resolves an order and verifies the caller owns it.
///
/// Every read/mutation path on owned resources funnels through this check:
/// a missing order is NotFound, an order owned by someone else is Forbidden
/// (never a silent empty result).
pub(crate) async fn fetch_owned_order(
    store: &dyn EntityStore,
    order_id: Uuid,
    caller: Uuid,
) -> ServiceResult<Order> {
    let order = store.get_order(order_id).await?;
    if order.user_id != caller {
        return Err(ServiceError::Forbidden(
            "you do not have permission to access this order".to_string(),
        ));
    }
    Ok(order)
}
