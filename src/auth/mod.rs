//! Authentication module for managing the client session.
//!
//! This module provides:
//! - `Session`: the in-memory view of the authenticated identity
//! - `TokenStore`: durable persistence for the session tokens
//! - `AuthManager`: the process-wide session authority (login, logout,
//!   coalesced silent refresh)
//!
//! All session mutation goes through `AuthManager`; no other component
//! writes tokens directly.

pub mod error;
pub mod manager;
pub mod session;
pub mod store;

pub use error::AuthError;
pub use manager::AuthManager;
pub use session::Session;
pub use store::TokenStore;
