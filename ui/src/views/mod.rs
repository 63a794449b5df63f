//! Top-level pages that do not belong to a feature module.

mod home;

pub use home::Home;
