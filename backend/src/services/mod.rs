//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! the user store, the credential verifier and the token codec.

pub mod token_store;
pub mod user;

pub use token_store::TokenStore;
pub use user::UserService;
