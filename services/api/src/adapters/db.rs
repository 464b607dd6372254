//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete
//! implementation of the `EntityStore` port from the `core` crate. It
//! handles all interactions with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use docuflow_core::domain::{
    Analysis, AnalysisStatus, AnalysisType, Document, DocumentKind, Order, OrderStatus, Payment,
    PaymentStatus, User, UserCredentials,
};
use docuflow_core::ports::{EntityStore, ServiceError, ServiceResult};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `EntityStore` port.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Creates a new `PgStore`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

/// Maps a sqlx error into the domain taxonomy; `what` names the entity
/// for NotFound messages.
fn map_db_err(e: sqlx::Error, what: &str) -> ServiceError {
    match e {
        sqlx::Error::RowNotFound => ServiceError::NotFound(format!("{} not found", what)),
        other => ServiceError::Unexpected(other.to_string()),
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    user_id: Uuid,
    email: String,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            user_id: self.user_id,
            email: self.email,
        }
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    user_id: Uuid,
    email: String,
    hashed_password: String,
}
impl CredentialsRecord {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            user_id: self.user_id,
            email: self.email,
            hashed_password: self.hashed_password,
        }
    }
}

#[derive(FromRow)]
struct OrderRecord {
    id: Uuid,
    user_id: Uuid,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl OrderRecord {
    fn to_domain(self) -> ServiceResult<Order> {
        let status = OrderStatus::parse(&self.status).ok_or_else(|| {
            ServiceError::Unexpected(format!("order {} has invalid status {}", self.id, self.status))
        })?;
        Ok(Order {
            id: self.id,
            user_id: self.user_id,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(FromRow)]
struct DocumentRecord {
    id: Uuid,
    order_id: Uuid,
    filename: String,
    stored_path: String,
    file_type: String,
    status: String,
    uploaded_at: DateTime<Utc>,
}
impl DocumentRecord {
    fn to_domain(self) -> ServiceResult<Document> {
        let file_type = DocumentKind::from_extension(&self.file_type).ok_or_else(|| {
            ServiceError::Unexpected(format!(
                "document {} has invalid file type {}",
                self.id, self.file_type
            ))
        })?;
        Ok(Document {
            id: self.id,
            order_id: self.order_id,
            filename: self.filename,
            stored_path: self.stored_path,
            file_type,
            status: self.status,
            uploaded_at: self.uploaded_at,
        })
    }
}

#[derive(FromRow)]
struct AnalysisRecord {
    id: Uuid,
    order_id: Uuid,
    analysis_type: String,
    result_data: serde_json::Value,
    status: String,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}
impl AnalysisRecord {
    fn to_domain(self) -> ServiceResult<Analysis> {
        let analysis_type = AnalysisType::parse(&self.analysis_type).ok_or_else(|| {
            ServiceError::Unexpected(format!(
                "analysis {} has invalid type {}",
                self.id, self.analysis_type
            ))
        })?;
        let status = AnalysisStatus::parse(&self.status).ok_or_else(|| {
            ServiceError::Unexpected(format!(
                "analysis {} has invalid status {}",
                self.id, self.status
            ))
        })?;
        Ok(Analysis {
            id: self.id,
            order_id: self.order_id,
            analysis_type,
            result_data: self.result_data,
            status,
            created_at: self.created_at,
            completed_at: self.completed_at,
        })
    }
}

#[derive(FromRow)]
struct PaymentRecord {
    id: Uuid,
    order_id: Uuid,
    intent_id: String,
    amount: Decimal,
    currency: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl PaymentRecord {
    fn to_domain(self) -> Payment {
        Payment {
            id: self.id,
            order_id: self.order_id,
            intent_id: self.intent_id,
            amount: self.amount,
            currency: self.currency,
            status: PaymentStatus::from_str(&self.status),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

//=========================================================================================
// `EntityStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl EntityStore for PgStore {
    async fn create_user(&self, email: &str, hashed_password: &str) -> ServiceResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (user_id, email, hashed_password) VALUES ($1, $2, $3) \
             RETURNING user_id, email",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ServiceError::Conflict("user with this email already exists".to_string())
            } else {
                ServiceError::Unexpected(e.to_string())
            }
        })?;
        Ok(record.to_domain())
    }

    async fn get_user(&self, user_id: Uuid) -> ServiceResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT user_id, email FROM users WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_err(e, "user"))?;
        Ok(record.to_domain())
    }

    async fn get_user_by_email(&self, email: &str) -> ServiceResult<UserCredentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT user_id, email, hashed_password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_err(e, "user"))?;
        Ok(record.to_domain())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> ServiceResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(|e| ServiceError::Unexpected(e.to_string()))?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> ServiceResult<Uuid> {
        let (user_id,): (Uuid,) = sqlx::query_as(
            "SELECT user_id FROM auth_sessions WHERE id = $1 AND expires_at > now()",
        )
        .bind(session_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_err(e, "auth session"))?;
        Ok(user_id)
    }

    async fn delete_auth_session(&self, session_id: &str) -> ServiceResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(|e| ServiceError::Unexpected(e.to_string()))?;
        Ok(())
    }

    async fn create_order(&self, user_id: Uuid) -> ServiceResult<Order> {
        let record = sqlx::query_as::<_, OrderRecord>(
            "INSERT INTO orders (id, user_id) VALUES ($1, $2) \
             RETURNING id, user_id, status, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ServiceError::Unexpected(e.to_string()))?;
        record.to_domain()
    }

    async fn get_order(&self, order_id: Uuid) -> ServiceResult<Order> {
        let record = sqlx::query_as::<_, OrderRecord>(
            "SELECT id, user_id, status, created_at, updated_at FROM orders WHERE id = $1",
        )
        .bind(order_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_err(e, "order"))?;
        record.to_domain()
    }

    async fn list_orders(&self, user_id: Uuid) -> ServiceResult<Vec<Order>> {
        let records = sqlx::query_as::<_, OrderRecord>(
            "SELECT id, user_id, status, created_at, updated_at FROM orders \
             WHERE user_id = $1 ORDER BY created_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ServiceError::Unexpected(e.to_string()))?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn update_order_status(
        &self,
        order_id: Uuid,
        status: OrderStatus,
    ) -> ServiceResult<Order> {
        let record = sqlx::query_as::<_, OrderRecord>(
            "UPDATE orders SET status = $1, updated_at = now() WHERE id = $2 \
             RETURNING id, user_id, status, created_at, updated_at",
        )
        .bind(status.as_str())
        .bind(order_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_err(e, "order"))?;
        record.to_domain()
    }

    async fn insert_document(
        &self,
        id: Uuid,
        order_id: Uuid,
        filename: &str,
        stored_path: &str,
        file_type: DocumentKind,
    ) -> ServiceResult<Document> {
        let record = sqlx::query_as::<_, DocumentRecord>(
            "INSERT INTO documents (id, order_id, filename, stored_path, file_type) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, order_id, filename, stored_path, file_type, status, uploaded_at",
        )
        .bind(id)
        .bind(order_id)
        .bind(filename)
        .bind(stored_path)
        .bind(file_type.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ServiceError::Unexpected(e.to_string()))?;
        record.to_domain()
    }

    async fn get_document(&self, document_id: Uuid) -> ServiceResult<Document> {
        let record = sqlx::query_as::<_, DocumentRecord>(
            "SELECT id, order_id, filename, stored_path, file_type, status, uploaded_at \
             FROM documents WHERE id = $1",
        )
        .bind(document_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_err(e, "document"))?;
        record.to_domain()
    }

    async fn delete_document(&self, document_id: Uuid) -> ServiceResult<()> {
        sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(document_id)
            .execute(&self.pool)
            .await
            .map_err(|e| ServiceError::Unexpected(e.to_string()))?;
        Ok(())
    }

    async fn insert_analysis(
        &self,
        order_id: Uuid,
        analysis_type: AnalysisType,
    ) -> ServiceResult<Analysis> {
        let record = sqlx::query_as::<_, AnalysisRecord>(
            "INSERT INTO analyses (id, order_id, analysis_type) VALUES ($1, $2, $3) \
             RETURNING id, order_id, analysis_type, result_data, status, created_at, completed_at",
        )
        .bind(Uuid::new_v4())
        .bind(order_id)
        .bind(analysis_type.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ServiceError::Unexpected(e.to_string()))?;
        record.to_domain()
    }

    async fn get_analysis(&self, analysis_id: Uuid) -> ServiceResult<Analysis> {
        let record = sqlx::query_as::<_, AnalysisRecord>(
            "SELECT id, order_id, analysis_type, result_data, status, created_at, completed_at \
             FROM analyses WHERE id = $1",
        )
        .bind(analysis_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_err(e, "analysis"))?;
        record.to_domain()
    }

    async fn list_analyses(&self, order_id: Uuid) -> ServiceResult<Vec<Analysis>> {
        let records = sqlx::query_as::<_, AnalysisRecord>(
            "SELECT id, order_id, analysis_type, result_data, status, created_at, completed_at \
             FROM analyses WHERE order_id = $1 ORDER BY created_at ASC",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ServiceError::Unexpected(e.to_string()))?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn find_pending_payment(&self, order_id: Uuid) -> ServiceResult<Option<Payment>> {
        let record = sqlx::query_as::<_, PaymentRecord>(
            "SELECT id, order_id, intent_id, amount, currency, status, created_at, updated_at \
             FROM payments WHERE order_id = $1 AND status = 'pending'",
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ServiceError::Unexpected(e.to_string()))?;
        Ok(record.map(|r| r.to_domain()))
    }

    async fn find_payment_by_intent(
        &self,
        order_id: Uuid,
        intent_id: &str,
    ) -> ServiceResult<Option<Payment>> {
        let record = sqlx::query_as::<_, PaymentRecord>(
            "SELECT id, order_id, intent_id, amount, currency, status, created_at, updated_at \
             FROM payments WHERE order_id = $1 AND intent_id = $2",
        )
        .bind(order_id)
        .bind(intent_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ServiceError::Unexpected(e.to_string()))?;
        Ok(record.map(|r| r.to_domain()))
    }

    async fn insert_pending_payment(
        &self,
        order_id: Uuid,
        intent_id: &str,
        amount: Decimal,
        currency: &str,
    ) -> ServiceResult<Payment> {
        // The partial unique index payments_one_pending_per_order turns a
        // concurrent duplicate insert into a unique violation, which is the
        // race-free backing for the one-in-flight-intent invariant.
        let record = sqlx::query_as::<_, PaymentRecord>(
            "INSERT INTO payments (id, order_id, intent_id, amount, currency) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, order_id, intent_id, amount, currency, status, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(order_id)
        .bind(intent_id)
        .bind(amount)
        .bind(currency)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ServiceError::Conflict(
                    "a pending payment intent already exists for this order".to_string(),
                )
            } else {
                ServiceError::Unexpected(e.to_string())
            }
        })?;
        Ok(record.to_domain())
    }

    async fn update_payment_status(
        &self,
        payment_id: Uuid,
        status: &PaymentStatus,
    ) -> ServiceResult<()> {
        sqlx::query("UPDATE payments SET status = $1, updated_at = now() WHERE id = $2")
            .bind(status.as_str())
            .bind(payment_id)
            .execute(&self.pool)
            .await
            .map_err(|e| ServiceError::Unexpected(e.to_string()))?;
        Ok(())
    }

    async fn complete_payment(&self, payment_id: Uuid, order_id: Uuid) -> ServiceResult<()> {
        // Payment and order transition in one transaction: both or neither.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ServiceError::Unexpected(e.to_string()))?;

        sqlx::query("UPDATE payments SET status = 'succeeded', updated_at = now() WHERE id = $1")
            .bind(payment_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| ServiceError::Unexpected(e.to_string()))?;

        sqlx::query("UPDATE orders SET status = 'paid', updated_at = now() WHERE id = $1")
            .bind(order_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| ServiceError::Unexpected(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| ServiceError::Unexpected(e.to_string()))?;
        Ok(())
    }
}
