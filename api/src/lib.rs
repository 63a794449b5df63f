//! REST client for the events platform backend consumed by the Pulseboard dashboard.
//!
//! Every request goes through [`ApiClient`], which owns the `reqwest` client and the
//! base URL. Analytics and report-table endpoints share [`AnalyticsQuery`] for their
//! query parameters so the on-screen views and the Excel export link stay in sync.

pub mod analytics;
pub mod categories;
mod client;
mod error;
mod query;
pub mod reports;
pub mod surveys;

pub use client::ApiClient;
pub use error::{ApiError, ApiResult, RequestKind};
pub use query::{AnalyticsQuery, GroupBy};
