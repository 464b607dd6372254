//! services/api/src/adapters/stripe.rs
//!
//! This module contains the adapter for the Stripe API. It implements the
//! `PaymentProcessor` port from the `core` crate, so the core never sees
//! the Stripe SDK types.

use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use docuflow_core::ports::{IntentHandle, PaymentProcessor, ServiceError, ServiceResult};
use stripe::{Client, CreatePaymentIntent, Currency, PaymentIntent, PaymentIntentId};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `PaymentProcessor` port using Stripe
/// payment intents.
#[derive(Clone)]
pub struct StripeGateway {
    client: Client,
}

impl StripeGateway {
    /// Creates a new `StripeGateway` from the account's secret key.
    pub fn new(secret_key: &str) -> Self {
        Self {
            client: Client::new(secret_key),
        }
    }
}

//=========================================================================================
// `PaymentProcessor` Trait Implementation
//=========================================================================================

#[async_trait]
impl PaymentProcessor for StripeGateway {
    async fn create_intent(
        &self,
        amount_minor: i64,
        currency: &str,
        order_id: Uuid,
        user_id: Uuid,
    ) -> ServiceResult<IntentHandle> {
        let currency = Currency::from_str(currency).map_err(|_| {
            ServiceError::Unexpected(format!("unsupported currency code: {}", currency))
        })?;

        let mut params = CreatePaymentIntent::new(amount_minor, currency);
        let mut metadata = HashMap::new();
        metadata.insert("order_id".to_string(), order_id.to_string());
        metadata.insert("user_id".to_string(), user_id.to_string());
        params.metadata = Some(metadata);

        let intent = PaymentIntent::create(&self.client, params)
            .await
            .map_err(|e| ServiceError::Processor(e.to_string()))?;

        let client_secret = intent.client_secret.ok_or_else(|| {
            ServiceError::Processor("intent was created without a client secret".to_string())
        })?;

        Ok(IntentHandle {
            intent_id: intent.id.to_string(),
            client_secret,
        })
    }

    async fn retrieve_intent_status(&self, intent_id: &str) -> ServiceResult<String> {
        let id = PaymentIntentId::from_str(intent_id).map_err(|_| {
            ServiceError::BadRequest(format!("invalid payment intent id: {}", intent_id))
        })?;

        let intent = PaymentIntent::retrieve(&self.client, &id, &[])
            .await
            .map_err(|e| ServiceError::Processor(e.to_string()))?;

        Ok(intent.status.as_str().to_string())
    }
}
