//! crates/docuflow_core/src/services/payments.rs
//!
//! The payment orchestrator: creates intents against the external
//! processor and reconciles local payment state with what the processor
//! reports on confirmation.
//!
//! Two invariants live here. At most one pending payment may exist per
//! order (the store's insert enforces this even under concurrent requests),
//! and a succeeded payment is terminal: re-confirmation is a Conflict, and
//! the payment-succeeded/order-paid pair is written in a single transaction
//! so neither is ever observed without the other.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{minor_to_major, Payment, PaymentStatus};
use crate::ports::{EntityStore, PaymentProcessor, ServiceError, ServiceResult};
use crate::services::fetch_owned_order;

/// What `create_intent` hands back to the transport layer.
#[derive(Debug, Clone)]
pub struct CreatedIntent {
    /// The client-facing secret for the caller's payment collection step.
    pub client_secret: String,
    pub intent_id: String,
}

#[derive(Clone)]
pub struct PaymentService {
    store: Arc<dyn EntityStore>,
    processor: Arc<dyn PaymentProcessor>,
    /// Single fixed currency code for this deployment.
    currency: String,
}

impl PaymentService {
    pub fn new(
        store: Arc<dyn EntityStore>,
        processor: Arc<dyn PaymentProcessor>,
        currency: String,
    ) -> Self {
        Self {
            store,
            processor,
            currency,
        }
    }

    /// Creates a payment intent for `amount_minor` minor currency units.
    ///
    /// No local row is written until the processor call has returned, so a
    /// processor timeout or failure leaves nothing to reconcile. Processor
    /// errors are surfaced, never retried: charge creation must not be
    /// silently duplicated.
    pub async fn create_intent(
        &self,
        order_id: Uuid,
        amount_minor: i64,
        caller: Uuid,
    ) -> ServiceResult<CreatedIntent> {
        let order = fetch_owned_order(self.store.as_ref(), order_id, caller).await?;

        if amount_minor <= 0 {
            return Err(ServiceError::BadRequest(
                "amount must be a positive number of minor currency units".to_string(),
            ));
        }

        if self.store.find_pending_payment(order.id).await?.is_some() {
            return Err(ServiceError::Conflict(
                "a pending payment intent already exists for this order".to_string(),
            ));
        }

        let handle = self
            .processor
            .create_intent(amount_minor, &self.currency, order.id, caller)
            .await?;

        // The insert re-asserts the no-pending-payment invariant at the
        // store level; a concurrent request that slipped past the check
        // above surfaces as Conflict here.
        let payment = self
            .store
            .insert_pending_payment(
                order.id,
                &handle.intent_id,
                minor_to_major(amount_minor),
                &self.currency,
            )
            .await?;

        Ok(CreatedIntent {
            client_secret: handle.client_secret,
            intent_id: payment.intent_id,
        })
    }

    /// Confirms a payment against the processor's authoritative status.
    ///
    /// On `succeeded` the payment and its order transition together; on any
    /// other reported status the payment row tracks that status and the
    /// call fails so the caller can retry once the processor side settles.
    pub async fn confirm(
        &self,
        order_id: Uuid,
        intent_id: &str,
        caller: Uuid,
    ) -> ServiceResult<Payment> {
        let order = fetch_owned_order(self.store.as_ref(), order_id, caller).await?;

        let payment = self
            .store
            .find_payment_by_intent(order.id, intent_id)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound("payment intent not found for this order".to_string())
            })?;

        if payment.status == PaymentStatus::Succeeded {
            return Err(ServiceError::Conflict(
                "payment has already been confirmed".to_string(),
            ));
        }

        let reported = self.processor.retrieve_intent_status(intent_id).await?;

        if reported == "succeeded" {
            self.store.complete_payment(payment.id, order.id).await?;
            Ok(Payment {
                status: PaymentStatus::Succeeded,
                ..payment
            })
        } else {
            let status = PaymentStatus::from_str(&reported);
            self.store.update_payment_status(payment.id, &status).await?;
            Err(ServiceError::BadRequest(format!(
                "payment intent status: {}. payment not succeeded",
                reported
            )))
        }
    }
}
