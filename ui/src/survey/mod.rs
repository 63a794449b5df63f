//! Survey manual entry.

pub mod entry;
mod page;

pub use entry::ManualEntryDraft;
pub use page::SurveyEntryPage;
