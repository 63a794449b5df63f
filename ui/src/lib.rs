//! Shared UI crate for the Pulseboard admin dashboard: analytics, the custom report
//! builder and its export, class categories and survey manual entry. The web and desktop
//! launchers only add routing, settings and window chrome.

pub mod analytics;
pub mod core;
pub mod export;
pub mod i18n;
pub mod report;
pub mod survey;
pub mod taxonomy;
pub mod views;

use dioxus::prelude::*;

/// Shared theme stylesheet. Desktop embeds the same file with `include_str!`.
pub const THEME_CSS: Asset = asset!("/assets/theme/main.css");

pub mod components {
    // Localized application navbar (components/app_navbar.rs)
    pub mod app_navbar;
    pub use app_navbar::register_nav;
    pub use app_navbar::AppNavbar;
    pub use app_navbar::NavBuilder;

    pub mod notice;
    pub use notice::{BlockingDialog, ErrorNotice, ForbiddenPage, LoadingSkeleton};
}
