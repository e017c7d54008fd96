//! REST API client module for the Live CMS server.
//!
//! This module provides the `ApiClient` for fetching posts, media,
//! users, and taxonomies, plus the authenticated media management
//! endpoints.
//!
//! Requests carry a bearer access token when a session exists; an
//! unauthenticated response triggers one silent refresh-and-retry cycle
//! through the `AuthManager`.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
