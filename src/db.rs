pub mod customer_repository;
pub mod error;
pub mod models;
pub mod pool;
pub mod table_repository;

pub use customer_repository::CustomerRepository;
pub use error::DbError;
pub use models::*;
pub use pool::connect;
pub use table_repository::TableRepository;
