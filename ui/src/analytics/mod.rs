//! Analytics charts and tables: sponsor events, page visits, member attendance,
//! retention and VTC time.

pub mod axis;
pub mod chart;
pub mod data;
pub mod filters;
mod page;
pub mod sponsor;
pub mod views;

pub use page::AnalyticsPage;
