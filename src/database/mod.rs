pub mod error;
pub mod memory;
pub mod models;
pub mod pool;

pub use error::{sqlx_sentinel, Sentinel, StoreError};
pub use memory::{Filter, Record, Rows, SortKey, Table};
pub use pool::{connect_lazy, health_check, DatabaseStatus};
