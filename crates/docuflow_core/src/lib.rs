pub mod domain;
pub mod ports;
pub mod services;

pub use domain::{
    Analysis, AnalysisStatus, AnalysisType, AuthSession, Document, DocumentKind, Order,
    OrderStatus, Payment, PaymentStatus, User, UserCredentials,
};
pub use ports::{
    EntityStore, FileStore, IntentHandle, PaymentProcessor, ServiceError, ServiceResult,
    StagedFile,
};
pub use services::{AnalysisService, DocumentService, OrderService, PaymentService};
