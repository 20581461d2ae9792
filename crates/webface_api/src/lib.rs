//! Transport-only client for the webface backend.
//!
//! This crate owns URL building, request dispatch and response decoding for
//! the five chat/forum endpoints. It knows nothing about message rendering,
//! timers or session rotation; callers decide what a reply means.
//!
//! Required response fields are validated during decoding, so a reply missing
//! `reply` (or a forum batch missing `messages`) surfaces as
//! [`ApiError::MalformedResponse`] instead of a partially-filled value.

pub mod client;
pub mod config;
pub mod error;
pub mod headers;
pub mod payload;
pub mod request;
pub mod url;

pub use client::WebfaceApiClient;
pub use config::WebfaceApiConfig;
pub use error::ApiError;
pub use payload::{AfterReadReply, ChatReply, ForumBatch, ForumMessage, MessageBody, PageDirective};
pub use request::{BackendRequest, BackendResponse, Endpoint};
pub use url::{normalize_base_url, resolve_page_url, DEFAULT_BASE_URL};
