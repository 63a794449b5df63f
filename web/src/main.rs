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
    #[layout(WebNavbar)]
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

fn nav_home(label: &str) -> Element {
    rsx!(Link {
        class: "navbar__link",
        to: Route::Home {},
        "{label}"
    })
}
fn nav_analytics(label: &str) -> Element {
    rsx!(Link {
        class: "navbar__link",
        to: Route::Analytics {},
        "{label}"
    })
}
fn nav_reports(label: &str) -> Element {
    rsx!(Link {
        class: "navbar__link",
        to: Route::ReportBuilder {},
        "{label}"
    })
}
fn nav_categories(label: &str) -> Element {
    rsx!(Link {
        class: "navbar__link",
        to: Route::ClassCategories {},
        "{label}"
    })
}

/// Settings baked in at build time (`PULSEBOARD_*`); the timezone defaults to the browser's.
fn context_from_build_env() -> AppContext {
    let context = AppContext::from_settings(
        option_env!("PULSEBOARD_API_URL"),
        option_env!("PULSEBOARD_TIMEZONE"),
        option_env!("PULSEBOARD_COLOR_MODE"),
    );
    tracing::info!(
        api = %context.api.base_url(),
        timezone = %context.timezone,
        "web settings loaded"
    );
    context
}

fn main() {
    dioxus::logger::initialize_default();
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    ui::i18n::init();
    let lang_code = use_signal(|| "en-US".to_string());
    use_context_provider(|| lang_code);
    let context = use_context_provider(context_from_build_env);

    register_nav(NavBuilder {
        home: nav_home,
        analytics: nav_analytics,
        reports: nav_reports,
        categories: nav_categories,
    });

    rsx! {
        document::Link { rel: "stylesheet", href: ui::THEME_CSS }

        div {
            key: "{lang_code()}",
            class: "app",
            "data-theme": context.color_mode.as_attr(),
            Router::<Route> {}
        }
    }
}

#[component]
fn WebNavbar() -> Element {
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
