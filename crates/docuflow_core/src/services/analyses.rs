//! crates/docuflow_core/src/services/analyses.rs
//!
//! Records analysis requests against an order. Execution belongs to an
//! external worker that picks up pending rows; this service only creates
//! them and reads current state.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Analysis, AnalysisType};
use crate::ports::{EntityStore, ServiceError, ServiceResult};
use crate::services::fetch_owned_order;

#[derive(Clone)]
pub struct AnalysisService {
    store: Arc<dyn EntityStore>,
}

impl AnalysisService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Validates the requested type and records a pending analysis.
    pub async fn request(
        &self,
        order_id: Uuid,
        raw_type: &str,
        caller: Uuid,
    ) -> ServiceResult<Analysis> {
        let order = fetch_owned_order(self.store.as_ref(), order_id, caller).await?;

        let analysis_type = AnalysisType::parse(raw_type).ok_or_else(|| {
            ServiceError::BadRequest(format!("unsupported analysis type: {}", raw_type))
        })?;

        self.store.insert_analysis(order.id, analysis_type).await
    }

    pub async fn list_for_order(
        &self,
        order_id: Uuid,
        caller: Uuid,
    ) -> ServiceResult<Vec<Analysis>> {
        fetch_owned_order(self.store.as_ref(), order_id, caller).await?;
        self.store.list_analyses(order_id).await
    }

    /// Resolves an analysis and re-derives ownership through its order.
    pub async fn get(&self, analysis_id: Uuid, caller: Uuid) -> ServiceResult<Analysis> {
        let analysis = self.store.get_analysis(analysis_id).await?;
        let order = self.store.get_order(analysis.order_id).await?;
        if order.user_id != caller {
            return Err(ServiceError::Forbidden(
                "you do not have permission to access this analysis".to_string(),
            ));
        }
        Ok(analysis)
    }
}
