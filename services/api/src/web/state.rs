//! services/api/src/web/state.rs
//!
//! Defines the application's shared state: the core services and the
//! ports they are wired to, constructed once at startup.

use std::sync::Arc;

use docuflow_core::ports::{EntityStore, FileStore, PaymentProcessor};
use docuflow_core::services::{AnalysisService, DocumentService, OrderService, PaymentService};

use crate::config::Config;

/// The shared application state, created once at startup and passed to all
/// handlers. Each service was constructed with explicit references to its
/// collaborators; handlers never reach for ambient globals.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Used directly by the auth endpoints and middleware.
    pub store: Arc<dyn EntityStore>,
    pub orders: OrderService,
    pub documents: DocumentService,
    pub analyses: AnalysisService,
    pub payments: PaymentService,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        store: Arc<dyn EntityStore>,
        files: Arc<dyn FileStore>,
        processor: Arc<dyn PaymentProcessor>,
    ) -> Self {
        let orders = OrderService::new(store.clone());
        let documents = DocumentService::new(store.clone(), files);
        let analyses = AnalysisService::new(store.clone());
        let payments = PaymentService::new(
            store.clone(),
            processor,
            config.payment_currency.clone(),
        );
        Self {
            config,
            store,
            orders,
            documents,
            analyses,
            payments,
        }
    }
}
