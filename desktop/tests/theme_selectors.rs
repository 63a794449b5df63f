#![cfg(test)]
/*!
Theme selector lint for the desktop build.

Ensures the selectors the shared components rely on (report grid, export capture,
dialogs, drawers) remain in `ui/assets/theme/main.css`, which packaged desktop builds
embed. A substring check is enough as an early warning; when a component's markup
renames a class, update REQUIRED_SELECTORS with it.
*/

const THEME_CSS: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../ui/assets/theme/main.css"
));

const REQUIRED_SELECTORS: &[&str] = &[
    // Global / layout
    ":root",
    "body {",
    ".page {",
    ".page__header",
    // Buttons & shared UI
    ".button {",
    ".button--primary",
    ".button--danger",
    ".button--ghost",
    ".notice--error",
    ".status--success",
    ".status--error",
    // Dialogs & drawers
    ".dialog-backdrop",
    ".dialog__actions",
    ".drawer {",
    ".drawer__actions",
    // Tables
    ".data-table",
    ".data-table__num",
    ".pager",
    // Report builder
    ".report-grid",
    ".grid-cell",
    ".grid-cell--empty",
    ".grid-cell__toolbar",
    ".widget-menu__item--armed",
    ".tabs__tab--active",
    // Export capture
    ".export-capture",
    ".export-section",
    // Survey entry
    ".rating-scale__option--active",
    ".question--invalid",
    // Media query token (sanity check responsive block exists)
    "@media (max-width: 720px)",
];

#[test]
fn unified_theme_contains_required_selectors() {
    let mut missing = Vec::new();
    for sel in REQUIRED_SELECTORS {
        if !THEME_CSS.contains(sel) {
            missing.push(*sel);
        }
    }

    if !missing.is_empty() {
        panic!(
            "Missing {} required CSS selectors/tokens in unified theme:\n{}",
            missing.len(),
            missing.join("\n")
        );
    }
}

#[test]
fn unified_theme_not_trivially_empty() {
    let non_ws_len = THEME_CSS.chars().filter(|c| !c.is_whitespace()).count();
    assert!(
        non_ws_len > 4_000,
        "Embedded theme appears unexpectedly small ({} non-whitespace chars) – \
         did the file get truncated or path change?",
        non_ws_len
    );
}

#[test]
fn dark_theme_overrides_core_colors() {
    let dark = THEME_CSS
        .split("[data-theme=\"dark\"]")
        .nth(1)
        .and_then(|rest| rest.split('}').next())
        .unwrap_or_default();
    for token in ["--color-bg", "--color-surface", "--color-text"] {
        assert!(dark.contains(token), "dark theme does not override {token}");
    }
}
