//! End-to-end tests for the order / document / analysis / payment flow,
//! running the real services against in-memory port implementations.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use docuflow_core::domain::{
    Analysis, AnalysisStatus, AnalysisType, Document, DocumentKind, Order, OrderStatus, Payment,
    PaymentStatus, User, UserCredentials,
};
use docuflow_core::ports::{
    EntityStore, FileStore, IntentHandle, PaymentProcessor, ServiceError, ServiceResult,
    StagedFile,
};
use docuflow_core::services::{
    AnalysisService, DocumentService, OrderService, PaymentService,
};

//=========================================================================================
// In-Memory Entity Store
//=========================================================================================

#[derive(Default)]
struct StoreInner {
    users: HashMap<Uuid, User>,
    sessions: HashMap<String, (Uuid, DateTime<Utc>)>,
    orders: HashMap<Uuid, Order>,
    documents: HashMap<Uuid, Document>,
    analyses: HashMap<Uuid, Analysis>,
    payments: HashMap<Uuid, Payment>,
}

#[derive(Default)]
struct MemoryStore {
    inner: Mutex<StoreInner>,
}

impl MemoryStore {
    fn seed_user(&self, email: &str) -> Uuid {
        let user_id = Uuid::new_v4();
        let mut inner = self.inner.lock().unwrap();
        inner.users.insert(
            user_id,
            User {
                user_id,
                email: email.to_string(),
            },
        );
        user_id
    }

    fn document_count(&self) -> usize {
        self.inner.lock().unwrap().documents.len()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn create_user(&self, email: &str, _hashed_password: &str) -> ServiceResult<User> {
        let user_id = Uuid::new_v4();
        let user = User {
            user_id,
            email: email.to_string(),
        };
        self.inner.lock().unwrap().users.insert(user_id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, user_id: Uuid) -> ServiceResult<User> {
        self.inner
            .lock()
            .unwrap()
            .users
            .get(&user_id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound("user not found".to_string()))
    }

    async fn get_user_by_email(&self, email: &str) -> ServiceResult<UserCredentials> {
        let inner = self.inner.lock().unwrap();
        inner
            .users
            .values()
            .find(|u| u.email == email)
            .map(|u| UserCredentials {
                user_id: u.user_id,
                email: u.email.clone(),
                hashed_password: String::new(),
            })
            .ok_or_else(|| ServiceError::NotFound("user not found".to_string()))
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> ServiceResult<()> {
        self.inner
            .lock()
            .unwrap()
            .sessions
            .insert(session_id.to_string(), (user_id, expires_at));
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> ServiceResult<Uuid> {
        let inner = self.inner.lock().unwrap();
        match inner.sessions.get(session_id) {
            Some((user_id, expires_at)) if *expires_at > Utc::now() => Ok(*user_id),
            _ => Err(ServiceError::NotFound("auth session not found".to_string())),
        }
    }

    async fn delete_auth_session(&self, session_id: &str) -> ServiceResult<()> {
        self.inner.lock().unwrap().sessions.remove(session_id);
        Ok(())
    }

    async fn create_order(&self, user_id: Uuid) -> ServiceResult<Order> {
        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4(),
            user_id,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        self.inner.lock().unwrap().orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn get_order(&self, order_id: Uuid) -> ServiceResult<Order> {
        self.inner
            .lock()
            .unwrap()
            .orders
            .get(&order_id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound("order not found".to_string()))
    }

    async fn list_orders(&self, user_id: Uuid) -> ServiceResult<Vec<Order>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .orders
            .values()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update_order_status(
        &self,
        order_id: Uuid,
        status: OrderStatus,
    ) -> ServiceResult<Order> {
        let mut inner = self.inner.lock().unwrap();
        let order = inner
            .orders
            .get_mut(&order_id)
            .ok_or_else(|| ServiceError::NotFound("order not found".to_string()))?;
        order.status = status;
        order.updated_at = Utc::now();
        Ok(order.clone())
    }

    async fn insert_document(
        &self,
        id: Uuid,
        order_id: Uuid,
        filename: &str,
        stored_path: &str,
        file_type: DocumentKind,
    ) -> ServiceResult<Document> {
        let document = Document {
            id,
            order_id,
            filename: filename.to_string(),
            stored_path: stored_path.to_string(),
            file_type,
            status: "uploaded".to_string(),
            uploaded_at: Utc::now(),
        };
        self.inner
            .lock()
            .unwrap()
            .documents
            .insert(id, document.clone());
        Ok(document)
    }

    async fn get_document(&self, document_id: Uuid) -> ServiceResult<Document> {
        self.inner
            .lock()
            .unwrap()
            .documents
            .get(&document_id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound("document not found".to_string()))
    }

    async fn delete_document(&self, document_id: Uuid) -> ServiceResult<()> {
        self.inner.lock().unwrap().documents.remove(&document_id);
        Ok(())
    }

    async fn insert_analysis(
        &self,
        order_id: Uuid,
        analysis_type: AnalysisType,
    ) -> ServiceResult<Analysis> {
        let analysis = Analysis {
            id: Uuid::new_v4(),
            order_id,
            analysis_type,
            result_data: serde_json::json!({}),
            status: AnalysisStatus::Pending,
            created_at: Utc::now(),
            completed_at: None,
        };
        self.inner
            .lock()
            .unwrap()
            .analyses
            .insert(analysis.id, analysis.clone());
        Ok(analysis)
    }

    async fn get_analysis(&self, analysis_id: Uuid) -> ServiceResult<Analysis> {
        self.inner
            .lock()
            .unwrap()
            .analyses
            .get(&analysis_id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound("analysis not found".to_string()))
    }

    async fn list_analyses(&self, order_id: Uuid) -> ServiceResult<Vec<Analysis>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .analyses
            .values()
            .filter(|a| a.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn find_pending_payment(&self, order_id: Uuid) -> ServiceResult<Option<Payment>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .payments
            .values()
            .find(|p| p.order_id == order_id && p.status == PaymentStatus::Pending)
            .cloned())
    }

    async fn find_payment_by_intent(
        &self,
        order_id: Uuid,
        intent_id: &str,
    ) -> ServiceResult<Option<Payment>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .payments
            .values()
            .find(|p| p.order_id == order_id && p.intent_id == intent_id)
            .cloned())
    }

    async fn insert_pending_payment(
        &self,
        order_id: Uuid,
        intent_id: &str,
        amount: Decimal,
        currency: &str,
    ) -> ServiceResult<Payment> {
        let mut inner = self.inner.lock().unwrap();
        // Mirrors the partial unique index the real store relies on.
        let pending_exists = inner
            .payments
            .values()
            .any(|p| p.order_id == order_id && p.status == PaymentStatus::Pending);
        if pending_exists {
            return Err(ServiceError::Conflict(
                "a pending payment intent already exists for this order".to_string(),
            ));
        }
        if inner.payments.values().any(|p| p.intent_id == intent_id) {
            return Err(ServiceError::Conflict(
                "payment intent already recorded".to_string(),
            ));
        }
        let now = Utc::now();
        let payment = Payment {
            id: Uuid::new_v4(),
            order_id,
            intent_id: intent_id.to_string(),
            amount,
            currency: currency.to_string(),
            status: PaymentStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        inner.payments.insert(payment.id, payment.clone());
        Ok(payment)
    }

    async fn update_payment_status(
        &self,
        payment_id: Uuid,
        status: &PaymentStatus,
    ) -> ServiceResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let payment = inner
            .payments
            .get_mut(&payment_id)
            .ok_or_else(|| ServiceError::NotFound("payment not found".to_string()))?;
        payment.status = status.clone();
        payment.updated_at = Utc::now();
        Ok(())
    }

    async fn complete_payment(&self, payment_id: Uuid, order_id: Uuid) -> ServiceResult<()> {
        // Both writes happen under the same lock, like the single database
        // transaction in the real adapter.
        let mut inner = self.inner.lock().unwrap();
        let payment = inner
            .payments
            .get_mut(&payment_id)
            .ok_or_else(|| ServiceError::NotFound("payment not found".to_string()))?;
        payment.status = PaymentStatus::Succeeded;
        payment.updated_at = Utc::now();
        let order = inner
            .orders
            .get_mut(&order_id)
            .ok_or_else(|| ServiceError::NotFound("order not found".to_string()))?;
        order.status = OrderStatus::Paid;
        order.updated_at = Utc::now();
        Ok(())
    }
}

//=========================================================================================
// In-Memory File Store and Mock Payment Processor
//=========================================================================================

#[derive(Default)]
struct MemoryFiles {
    staged: Mutex<HashMap<String, Vec<u8>>>,
    committed: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryFiles {
    fn committed_count(&self) -> usize {
        self.committed.lock().unwrap().len()
    }

    fn staged_count(&self) -> usize {
        self.staged.lock().unwrap().len()
    }

    fn remove(&self, locator: &str) {
        self.committed.lock().unwrap().remove(locator);
    }
}

#[async_trait]
impl FileStore for MemoryFiles {
    async fn stage(&self, key: &str, bytes: &[u8]) -> ServiceResult<StagedFile> {
        let staging = format!("staging/{}", key);
        self.staged
            .lock()
            .unwrap()
            .insert(staging.clone(), bytes.to_vec());
        Ok(StagedFile {
            staging_locator: staging,
            final_locator: key.to_string(),
        })
    }

    async fn promote(&self, staged: &StagedFile) -> ServiceResult<()> {
        let bytes = self
            .staged
            .lock()
            .unwrap()
            .remove(&staged.staging_locator)
            .ok_or_else(|| ServiceError::Unexpected("staged file missing".to_string()))?;
        self.committed
            .lock()
            .unwrap()
            .insert(staged.final_locator.clone(), bytes);
        Ok(())
    }

    async fn discard(&self, staged: &StagedFile) -> ServiceResult<()> {
        self.staged.lock().unwrap().remove(&staged.staging_locator);
        Ok(())
    }

    async fn read(&self, locator: &str) -> ServiceResult<Vec<u8>> {
        self.committed
            .lock()
            .unwrap()
            .get(locator)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound("file not found".to_string()))
    }

    async fn delete(&self, locator: &str) -> ServiceResult<()> {
        self.committed.lock().unwrap().remove(locator);
        Ok(())
    }

    async fn exists(&self, locator: &str) -> ServiceResult<bool> {
        Ok(self.committed.lock().unwrap().contains_key(locator))
    }
}

/// A scriptable processor: `reported_status` drives what retrieval returns,
/// and either call can be forced to fail.
struct MockProcessor {
    reported_status: Mutex<String>,
    fail_create: AtomicBool,
    fail_retrieve: AtomicBool,
    created: AtomicUsize,
}

impl Default for MockProcessor {
    fn default() -> Self {
        Self {
            reported_status: Mutex::new("succeeded".to_string()),
            fail_create: AtomicBool::new(false),
            fail_retrieve: AtomicBool::new(false),
            created: AtomicUsize::new(0),
        }
    }
}

impl MockProcessor {
    fn report(&self, status: &str) {
        *self.reported_status.lock().unwrap() = status.to_string();
    }
}

#[async_trait]
impl PaymentProcessor for MockProcessor {
    async fn create_intent(
        &self,
        _amount_minor: i64,
        _currency: &str,
        _order_id: Uuid,
        _user_id: Uuid,
    ) -> ServiceResult<IntentHandle> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(ServiceError::Processor("connection reset".to_string()));
        }
        let n = self.created.fetch_add(1, Ordering::SeqCst);
        Ok(IntentHandle {
            intent_id: format!("pi_test_{}", n),
            client_secret: format!("pi_test_{}_secret", n),
        })
    }

    async fn retrieve_intent_status(&self, _intent_id: &str) -> ServiceResult<String> {
        if self.fail_retrieve.load(Ordering::SeqCst) {
            return Err(ServiceError::Processor("connection reset".to_string()));
        }
        Ok(self.reported_status.lock().unwrap().clone())
    }
}

//=========================================================================================
// Test Harness
//=========================================================================================

struct Env {
    store: Arc<MemoryStore>,
    files: Arc<MemoryFiles>,
    processor: Arc<MockProcessor>,
    orders: OrderService,
    documents: DocumentService,
    analyses: AnalysisService,
    payments: PaymentService,
}

impl Env {
    fn new() -> Self {
        let store = Arc::new(MemoryStore::default());
        let files = Arc::new(MemoryFiles::default());
        let processor = Arc::new(MockProcessor::default());
        let orders = OrderService::new(store.clone());
        let documents = DocumentService::new(store.clone(), files.clone());
        let analyses = AnalysisService::new(store.clone());
        let payments = PaymentService::new(store.clone(), processor.clone(), "usd".to_string());
        Self {
            store,
            files,
            processor,
            orders,
            documents,
            analyses,
            payments,
        }
    }
}

fn assert_conflict<T: std::fmt::Debug>(result: ServiceResult<T>) {
    match result {
        Err(ServiceError::Conflict(_)) => {}
        other => panic!("expected Conflict, got {:?}", other),
    }
}

fn assert_forbidden<T: std::fmt::Debug>(result: ServiceResult<T>) {
    match result {
        Err(ServiceError::Forbidden(_)) => {}
        other => panic!("expected Forbidden, got {:?}", other),
    }
}

fn assert_bad_request<T: std::fmt::Debug>(result: ServiceResult<T>) {
    match result {
        Err(ServiceError::BadRequest(_)) => {}
        other => panic!("expected BadRequest, got {:?}", other),
    }
}

//=========================================================================================
// Tests
//=========================================================================================

#[tokio::test]
async fn create_order_requires_existing_user() {
    let env = Env::new();
    let result = env.orders.create(Uuid::new_v4()).await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));

    let user = env.store.seed_user("owner@example.com");
    let order = env.orders.create(user).await.unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.user_id, user);
}

#[tokio::test]
async fn duplicate_create_intent_yields_exactly_one_conflict() {
    let env = Env::new();
    let user = env.store.seed_user("owner@example.com");
    let order = env.orders.create(user).await.unwrap();

    let first = env.payments.create_intent(order.id, 1000, user).await;
    assert!(first.is_ok());

    let second = env.payments.create_intent(order.id, 1000, user).await;
    assert_conflict(second);
}

#[tokio::test]
async fn reconfirming_a_succeeded_payment_conflicts_and_changes_nothing() {
    let env = Env::new();
    let user = env.store.seed_user("owner@example.com");
    let order = env.orders.create(user).await.unwrap();
    let intent = env.payments.create_intent(order.id, 1000, user).await.unwrap();

    env.processor.report("succeeded");
    let payment = env
        .payments
        .confirm(order.id, &intent.intent_id, user)
        .await
        .unwrap();
    assert_eq!(payment.status, PaymentStatus::Succeeded);

    let again = env.payments.confirm(order.id, &intent.intent_id, user).await;
    assert_conflict(again);

    // Terminal state is untouched by the rejected call.
    let stored = env
        .store
        .find_payment_by_intent(order.id, &intent.intent_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, PaymentStatus::Succeeded);
    let order = env.store.get_order(order.id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Paid);
}

#[tokio::test]
async fn successful_confirmation_moves_payment_and_order_together() {
    let env = Env::new();
    let user = env.store.seed_user("owner@example.com");
    let order = env.orders.create(user).await.unwrap();
    let intent = env.payments.create_intent(order.id, 2500, user).await.unwrap();

    // Order is untouched by intent creation.
    assert_eq!(
        env.store.get_order(order.id).await.unwrap().status,
        OrderStatus::Pending
    );

    env.processor.report("succeeded");
    env.payments
        .confirm(order.id, &intent.intent_id, user)
        .await
        .unwrap();

    let payment = env
        .store
        .find_payment_by_intent(order.id, &intent.intent_id)
        .await
        .unwrap()
        .unwrap();
    let order = env.store.get_order(order.id).await.unwrap();
    assert_eq!(payment.status, PaymentStatus::Succeeded);
    assert_eq!(order.status, OrderStatus::Paid);
    assert_eq!(payment.amount.to_string(), "25.00");
}

#[tokio::test]
async fn interim_processor_status_is_recorded_and_surfaced() {
    let env = Env::new();
    let user = env.store.seed_user("owner@example.com");
    let order = env.orders.create(user).await.unwrap();
    let intent = env.payments.create_intent(order.id, 1000, user).await.unwrap();

    env.processor.report("requires_action");
    let result = env.payments.confirm(order.id, &intent.intent_id, user).await;
    assert_bad_request(result);

    // Local state tracks what the processor reported; the order is untouched.
    let payment = env
        .store
        .find_payment_by_intent(order.id, &intent.intent_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        payment.status,
        PaymentStatus::Reported("requires_action".to_string())
    );
    assert_eq!(
        env.store.get_order(order.id).await.unwrap().status,
        OrderStatus::Pending
    );

    // The caller retries once the processor side completes.
    env.processor.report("succeeded");
    env.payments
        .confirm(order.id, &intent.intent_id, user)
        .await
        .unwrap();
    assert_eq!(
        env.store.get_order(order.id).await.unwrap().status,
        OrderStatus::Paid
    );
}

#[tokio::test]
async fn processor_failures_leave_no_local_state() {
    let env = Env::new();
    let user = env.store.seed_user("owner@example.com");
    let order = env.orders.create(user).await.unwrap();

    env.processor.fail_create.store(true, Ordering::SeqCst);
    let result = env.payments.create_intent(order.id, 1000, user).await;
    assert!(matches!(result, Err(ServiceError::Processor(_))));
    assert!(env
        .store
        .find_pending_payment(order.id)
        .await
        .unwrap()
        .is_none());

    env.processor.fail_create.store(false, Ordering::SeqCst);
    let intent = env.payments.create_intent(order.id, 1000, user).await.unwrap();

    env.processor.fail_retrieve.store(true, Ordering::SeqCst);
    let result = env.payments.confirm(order.id, &intent.intent_id, user).await;
    assert!(matches!(result, Err(ServiceError::Processor(_))));
    let payment = env
        .store
        .find_payment_by_intent(order.id, &intent.intent_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payment.status, PaymentStatus::Pending);
}

#[tokio::test]
async fn rejected_amounts_and_unknown_intents() {
    let env = Env::new();
    let user = env.store.seed_user("owner@example.com");
    let order = env.orders.create(user).await.unwrap();

    assert_bad_request(env.payments.create_intent(order.id, 0, user).await);
    assert_bad_request(env.payments.create_intent(order.id, -500, user).await);

    let result = env.payments.confirm(order.id, "pi_unknown", user).await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn upload_rejects_extensions_outside_the_allow_list() {
    let env = Env::new();
    let user = env.store.seed_user("owner@example.com");
    let order = env.orders.create(user).await.unwrap();

    for name in ["malware.exe", "archive.tar.gz", "noextension"] {
        let result = env
            .documents
            .upload(order.id, user, Some(name), b"content")
            .await;
        assert_bad_request(result);
    }
    assert_bad_request(env.documents.upload(order.id, user, None, b"content").await);
    assert_bad_request(
        env.documents
            .upload(order.id, user, Some("empty.pdf"), b"")
            .await,
    );

    // No row and no file came out of any rejected upload.
    assert_eq!(env.store.document_count(), 0);
    assert_eq!(env.files.committed_count(), 0);
    assert_eq!(env.files.staged_count(), 0);
}

#[tokio::test]
async fn upload_download_delete_round_trip() {
    let env = Env::new();
    let user = env.store.seed_user("owner@example.com");
    let order = env.orders.create(user).await.unwrap();

    let document = env
        .documents
        .upload(order.id, user, Some("contract.pdf"), b"%PDF-1.4")
        .await
        .unwrap();
    assert_eq!(document.file_type, DocumentKind::Pdf);
    assert_eq!(document.status, "uploaded");
    assert_eq!(document.filename, "contract.pdf");
    // Nothing is left in staging once the upload has committed.
    assert_eq!(env.files.staged_count(), 0);

    let (fetched, bytes) = env.documents.download(document.id, user).await.unwrap();
    assert_eq!(fetched.id, document.id);
    assert_eq!(bytes, b"%PDF-1.4");

    env.documents.delete(document.id, user).await.unwrap();
    let result = env.documents.get(document.id, user).await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));
    assert_eq!(env.files.committed_count(), 0);

    // Deleting again is NotFound, not an error about the missing file.
    let result = env.documents.delete(document.id, user).await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn download_detects_storage_metadata_drift() {
    let env = Env::new();
    let user = env.store.seed_user("owner@example.com");
    let order = env.orders.create(user).await.unwrap();
    let document = env
        .documents
        .upload(order.id, user, Some("notes.txt"), b"hello")
        .await
        .unwrap();

    // Simulate the physical file vanishing behind the row.
    env.files.remove(&document.stored_path);
    let result = env.documents.download(document.id, user).await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn analysis_request_validates_type_and_records_pending() {
    let env = Env::new();
    let user = env.store.seed_user("owner@example.com");
    let order = env.orders.create(user).await.unwrap();

    assert_bad_request(env.analyses.request(order.id, "translation", user).await);

    let analysis = env.analyses.request(order.id, "summary", user).await.unwrap();
    assert_eq!(analysis.analysis_type, AnalysisType::Summary);
    assert_eq!(analysis.status, AnalysisStatus::Pending);
    assert_eq!(analysis.result_data, serde_json::json!({}));
    assert!(analysis.completed_at.is_none());

    let listed = env.analyses.list_for_order(order.id, user).await.unwrap();
    assert_eq!(listed.len(), 1);
    let fetched = env.analyses.get(analysis.id, user).await.unwrap();
    assert_eq!(fetched.id, analysis.id);
}

#[tokio::test]
async fn non_owners_are_forbidden_everywhere() {
    let env = Env::new();
    let owner = env.store.seed_user("owner@example.com");
    let intruder = env.store.seed_user("intruder@example.com");

    let order = env.orders.create(owner).await.unwrap();
    let document = env
        .documents
        .upload(order.id, owner, Some("contract.pdf"), b"%PDF-1.4")
        .await
        .unwrap();
    let analysis = env.analyses.request(order.id, "summary", owner).await.unwrap();
    let intent = env.payments.create_intent(order.id, 1000, owner).await.unwrap();

    assert_forbidden(env.orders.get(order.id, intruder).await);
    assert_forbidden(env.orders.update_status(order.id, "processing", intruder).await);
    assert_forbidden(env.documents.get(document.id, intruder).await);
    assert_forbidden(env.documents.download(document.id, intruder).await);
    assert_forbidden(env.documents.delete(document.id, intruder).await);
    assert_forbidden(
        env.documents
            .upload(order.id, intruder, Some("a.pdf"), b"x")
            .await,
    );
    assert_forbidden(env.analyses.get(analysis.id, intruder).await);
    assert_forbidden(env.analyses.list_for_order(order.id, intruder).await);
    assert_forbidden(env.analyses.request(order.id, "summary", intruder).await);
    assert_forbidden(env.payments.create_intent(order.id, 1000, intruder).await);
    assert_forbidden(
        env.payments
            .confirm(order.id, &intent.intent_id, intruder)
            .await,
    );

    // The intruder's own order list stays empty rather than leaking.
    assert!(env.orders.list(intruder).await.unwrap().is_empty());
}

#[tokio::test]
async fn status_updates_are_permissive_within_the_allow_list() {
    let env = Env::new();
    let user = env.store.seed_user("owner@example.com");
    let order = env.orders.create(user).await.unwrap();

    let order = env
        .orders
        .update_status(order.id, "completed", user)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Completed);

    // No transition graph: completed -> pending is accepted.
    let order = env
        .orders
        .update_status(order.id, "pending", user)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Pending);

    assert_bad_request(env.orders.update_status(order.id, "shipped", user).await);
    // paid is reserved for payment confirmation.
    assert_bad_request(env.orders.update_status(order.id, "paid", user).await);
}

#[tokio::test]
async fn full_order_flow_scenario() {
    let env = Env::new();
    let user = env.store.seed_user("u@example.com");

    let order = env.orders.create(user).await.unwrap();
    assert_eq!(order.status, OrderStatus::Pending);

    let document = env
        .documents
        .upload(order.id, user, Some("contract.pdf"), b"%PDF-1.4")
        .await
        .unwrap();
    assert_eq!(document.status, "uploaded");

    let analysis = env.analyses.request(order.id, "summary", user).await.unwrap();
    assert_eq!(analysis.status, AnalysisStatus::Pending);

    let intent = env.payments.create_intent(order.id, 1000, user).await.unwrap();
    assert!(!intent.client_secret.is_empty());
    let pending = env
        .store
        .find_pending_payment(order.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(pending.status, PaymentStatus::Pending);
    assert_eq!(pending.amount.to_string(), "10.00");

    env.processor.report("succeeded");
    let payment = env
        .payments
        .confirm(order.id, &intent.intent_id, user)
        .await
        .unwrap();
    assert_eq!(payment.status, PaymentStatus::Succeeded);
    assert_eq!(
        env.store.get_order(order.id).await.unwrap().status,
        OrderStatus::Paid
    );

    assert_conflict(env.payments.confirm(order.id, &intent.intent_id, user).await);
}
