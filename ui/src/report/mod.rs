//! Custom report builder, widget rendering and the export view.

pub mod blocks;
mod builder_page;
pub mod data;
mod export_page;
pub mod render;
pub mod settings;
pub mod tables;

pub use builder_page::{ReportBuilderPage, TemplateEditPage};
pub use export_page::ReportExportPage;
