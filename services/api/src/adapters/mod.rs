pub mod db;
pub mod storage;
pub mod stripe;

pub use db::PgStore;
pub use storage::DiskStore;
pub use stripe::StripeGateway;
