//! Wikipedia summary extraction.
//!
//! This crate provides:
//! - [`SummaryClient`] — HTTP client for the Wikipedia REST summary endpoint
//! - [`RetryPolicy`] / [`fetch_with_retry`] — the explicit retry wrapper
//!   around extraction calls
//!
//! The client itself performs exactly one outbound call per invocation and
//! never retries; retry is a policy applied around it.

pub mod client;
pub mod retry;

pub use client::SummaryClient;
pub use retry::{RetryPolicy, fetch_with_retry};
