//! crates/docuflow_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

// Represents a user - the authorization root for everything below it.
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: Uuid,
    pub email: String,
}

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub email: String,
    pub hashed_password: String,
}

// Represents a browser login session (auth cookie)
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub id: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// The lifecycle status of an [`Order`].
///
/// `Paid` is only ever set as a side effect of a successful payment
/// confirmation; it is not accepted by the status-update endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Cancelled,
    Paid,
}

impl OrderStatus {
    /// The statuses a caller may set directly via the status-update call.
    pub const SETTABLE: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Paid => "paid",
        }
    }

    pub fn parse(raw: &str) -> Option<OrderStatus> {
        match raw {
            "pending" => Some(OrderStatus::Pending),
            "processing" => Some(OrderStatus::Processing),
            "completed" => Some(OrderStatus::Completed),
            "cancelled" => Some(OrderStatus::Cancelled),
            "paid" => Some(OrderStatus::Paid),
            _ => None,
        }
    }
}

/// The unit of work a user initiates, aggregating documents, analyses
/// and payment.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The file types accepted by document intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    Txt,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::Docx => "docx",
            DocumentKind::Txt => "txt",
        }
    }

    /// Maps a lowercase file extension onto the allow-list.
    pub fn from_extension(ext: &str) -> Option<DocumentKind> {
        match ext {
            "pdf" => Some(DocumentKind::Pdf),
            "docx" => Some(DocumentKind::Docx),
            "txt" => Some(DocumentKind::Txt),
            _ => None,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "application/pdf",
            DocumentKind::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            DocumentKind::Txt => "text/plain",
        }
    }
}

/// Represents an uploaded file belonging to exactly one order.
///
/// `stored_path` is the locator understood by the file store. Downstream
/// processing (an external pipeline) may move `status` past `uploaded`;
/// this core only ever writes `uploaded`.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: Uuid,
    pub order_id: Uuid,
    pub filename: String,
    pub stored_path: String,
    pub file_type: DocumentKind,
    pub status: String,
    pub uploaded_at: DateTime<Utc>,
}

/// The kinds of analysis an order can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisType {
    Sentiment,
    EntityRecognition,
    Summary,
}

impl AnalysisType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisType::Sentiment => "sentiment",
            AnalysisType::EntityRecognition => "entity_recognition",
            AnalysisType::Summary => "summary",
        }
    }

    pub fn parse(raw: &str) -> Option<AnalysisType> {
        match raw {
            "sentiment" => Some(AnalysisType::Sentiment),
            "entity_recognition" => Some(AnalysisType::EntityRecognition),
            "summary" => Some(AnalysisType::Summary),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl AnalysisStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisStatus::Pending => "pending",
            AnalysisStatus::InProgress => "in_progress",
            AnalysisStatus::Completed => "completed",
            AnalysisStatus::Failed => "failed",
        }
    }

    pub fn parse(raw: &str) -> Option<AnalysisStatus> {
        match raw {
            "pending" => Some(AnalysisStatus::Pending),
            "in_progress" => Some(AnalysisStatus::InProgress),
            "completed" => Some(AnalysisStatus::Completed),
            "failed" => Some(AnalysisStatus::Failed),
            _ => None,
        }
    }
}

/// A requested analysis job. Execution happens in an external worker;
/// this core creates the pending row and reads current state.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub id: Uuid,
    pub order_id: Uuid,
    pub analysis_type: AnalysisType,
    pub result_data: serde_json::Value,
    pub status: AnalysisStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Local payment state, reconciled against the external processor.
///
/// The processor is authoritative: besides `Pending` and `Succeeded`, a
/// payment can carry whatever interim status the processor last reported
/// (`requires_action`, `requires_payment_method`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Succeeded,
    Reported(String),
}

impl PaymentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Succeeded => "succeeded",
            PaymentStatus::Reported(s) => s.as_str(),
        }
    }

    pub fn from_str(raw: &str) -> PaymentStatus {
        match raw {
            "pending" => PaymentStatus::Pending,
            "succeeded" => PaymentStatus::Succeeded,
            other => PaymentStatus::Reported(other.to_string()),
        }
    }
}

/// A payment against an order, mirroring one processor intent.
#[derive(Debug, Clone)]
pub struct Payment {
    pub id: Uuid,
    pub order_id: Uuid,
    pub intent_id: String,
    pub amount: Decimal,
    pub currency: String,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Converts an integer minor-unit amount (e.g. cents) into major units.
///
/// Exact for two-decimal currencies: 1000 minor units -> 10.00.
pub fn minor_to_major(amount_minor: i64) -> Decimal {
    Decimal::new(amount_minor, 2)
}
