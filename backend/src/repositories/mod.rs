//! User persistence
//!
//! Provides the store trait and its Postgres and in-memory backends.

pub mod memory;
pub mod postgres;
pub mod user;

pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;
pub use user::{with_deadline, StoreError, TokenFields, UserField, UserRecord, UserStore};
