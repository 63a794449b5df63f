//! Class category taxonomy screens.

pub mod form;
mod page;

pub use form::{ClassCategoryDraft, DrawerForm, SubmitOutcome};
pub use page::ClassCategoriesPage;
