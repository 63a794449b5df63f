#![cfg_attr(all(windows, not(debug_assertions)), windows_subsystem = "windows")]

#[cfg(feature = "desktop")]
use std::path::PathBuf;

#[cfg(feature = "desktop")]
use dioxus::desktop::{tao::window::WindowBuilder, Config};
use dioxus::prelude::*;

use ui::analytics::AnalyticsPage;
use ui::components::app_navbar::{register_nav, NavBuilder};
use ui::components::AppNavbar;
use ui::core::context::AppContext;
use ui::report::{ReportBuilderPage, ReportExportPage, TemplateEditPage};
use ui::survey::SurveyEntryPage;
use ui::taxonomy::ClassCategoriesPage;
use ui::views::Home;

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[layout(DesktopNavbar)]
    #[route("/")]
    Home {},
    #[route("/analytics")]
    Analytics {},
    #[route("/reports/new")]
    ReportBuilder {},
    #[route("/reports/templates/:template_id")]
    TemplateEdit { template_id: String },
    #[route("/reports/export")]
    ReportExport {},
    #[route("/categories")]
    ClassCategories {},
    #[route("/surveys/:survey_id/entry")]
    SurveyEntry { survey_id: String },
}

const MAIN_CSS_INLINE: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../ui/assets/theme/main.css"
)); // Shared theme, embedded so packaged builds need no assets folder.

#[cfg(feature = "desktop")]
fn main() {
    dioxus::logger::initialize_default();
    if let Err(err) = dotenvy::dotenv() {
        tracing::debug!(error = %err, "no .env file loaded");
    }
    let resource_dir = resolve_resource_dir();

    LaunchBuilder::desktop()
        .with_cfg(
            Config::new()
                .with_window(
                    WindowBuilder::new()
                        .with_title(format!("Pulseboard – v{}", env!("CARGO_PKG_VERSION")))
                        .with_maximized(true),
                )
                .with_resource_directory(resource_dir),
        )
        .launch(App);
}

#[cfg(all(feature = "server", not(feature = "desktop")))]
fn main() {
    LaunchBuilder::server().launch(App);
}

/// Settings from `PULSEBOARD_*` environment variables (a `.env` file is honoured).
fn context_from_env() -> AppContext {
    let var = |name: &str| std::env::var(name).ok();
    let context = AppContext::from_settings(
        var("PULSEBOARD_API_URL").as_deref(),
        var("PULSEBOARD_TIMEZONE").as_deref(),
        var("PULSEBOARD_COLOR_MODE").as_deref(),
    );
    tracing::info!(
        api = %context.api.base_url(),
        timezone = %context.timezone,
        "desktop settings loaded"
    );
    context
}

fn nav_home(label: &str) -> Element {
    rsx!(Link { class: "navbar__link", to: Route::Home {}, "{label}" })
}
fn nav_analytics(label: &str) -> Element {
    rsx!(Link { class: "navbar__link", to: Route::Analytics {}, "{label}" })
}
fn nav_reports(label: &str) -> Element {
    rsx!(Link { class: "navbar__link", to: Route::ReportBuilder {}, "{label}" })
}
fn nav_categories(label: &str) -> Element {
    rsx!(Link { class: "navbar__link", to: Route::ClassCategories {}, "{label}" })
}

#[component]
fn App() -> Element {
    ui::i18n::init();

    // AppNavbar updates this when the user picks another language.
    let lang_code = use_signal(|| "en-US".to_string());
    use_context_provider(|| lang_code);
    let context = use_context_provider(context_from_env);

    register_nav(NavBuilder {
        home: nav_home,
        analytics: nav_analytics,
        reports: nav_reports,
        categories: nav_categories,
    });

    // Some window managers ignore the initial maximize.
    #[cfg(feature = "desktop")]
    {
        let win = dioxus::desktop::use_window();
        use_effect(move || {
            win.set_maximized(true);
        });
    }

    rsx! {
        document::Style { "{MAIN_CSS_INLINE}" }

        // Keyed by language so the routed subtree remounts with fresh strings.
        div {
            key: "{lang_code()}",
            class: "app",
            "data-theme": context.color_mode.as_attr(),
            Router::<Route> { }
        }
    }
}

#[cfg(feature = "desktop")]
fn resolve_resource_dir() -> PathBuf {
    #[cfg(debug_assertions)]
    {
        PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/assets"))
    }

    #[cfg(not(debug_assertions))]
    {
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join("assets")))
            .unwrap_or_else(|| PathBuf::from("assets"))
    }
}

#[component]
fn DesktopNavbar() -> Element {
    rsx! {
        AppNavbar { }

        main { class: "app__main",
            Outlet::<Route> {}
        }
    }
}

#[component]
fn Analytics() -> Element {
    rsx! { AnalyticsPage {} }
}

#[component]
fn ReportBuilder() -> Element {
    let nav = navigator();
    rsx! {
        ReportBuilderPage {
            on_export: move |_| {
                nav.push(Route::ReportExport {});
            },
        }
    }
}

#[component]
fn TemplateEdit(template_id: String) -> Element {
    let nav = navigator();
    rsx! {
        TemplateEditPage {
            template_id,
            on_export: move |_| {
                nav.push(Route::ReportExport {});
            },
        }
    }
}

#[component]
fn ReportExport() -> Element {
    rsx! { ReportExportPage {} }
}

#[component]
fn ClassCategories() -> Element {
    rsx! { ClassCategoriesPage {} }
}

#[component]
fn SurveyEntry(survey_id: String) -> Element {
    rsx! { SurveyEntryPage { survey_id } }
}
