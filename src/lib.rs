//! Client library for the Live CMS REST API.
//!
//! Provides the session layer the CMS admin panel relies on:
//!
//! - [`AuthManager`]: login, logout, and silent access-token refresh
//!   with coalescing of concurrent refresh attempts
//! - [`TokenStore`]: durable token persistence with an explicit
//!   capability flag for storage-less contexts
//! - [`ApiClient`]: typed resource fetchers with bearer auth and a
//!   single refresh-and-retry cycle on unauthenticated responses
//! - [`SessionGuard`]: the allow/redirect decision for protected views

pub mod api;
pub mod auth;
pub mod config;
pub mod guard;
pub mod models;
pub mod utils;

pub use api::{ApiClient, ApiError};
pub use auth::{AuthError, AuthManager, Session, TokenStore};
pub use config::Config;
pub use guard::{GuardOutcome, SessionGuard};
