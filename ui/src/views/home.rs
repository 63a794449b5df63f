use dioxus::prelude::*;

use crate::core::context::AppContext;
use crate::t;

#[component]
pub fn Home() -> Element {
    // Re-render when the launcher's language signal changes.
    let _lang: Option<Signal<String>> = try_use_context::<Signal<String>>();
    let _lang_current = _lang.as_ref().map(|s| s()).unwrap_or_default();
    let ctx = use_context::<AppContext>();

    rsx! {
        section { class: "page page-home",
            h1 { {t!("home-title")} }
            p { {t!("home-intro")} }
            ul { class: "page-home__features",
                li { {t!("home-feature-analytics")} }
                li { {t!("home-feature-reports")} }
                li { {t!("home-feature-categories")} }
                li { {t!("home-feature-surveys")} }
            }
            p { class: "page-home__meta",
                {t!("home-timezone", timezone = ctx.timezone.clone())}
            }
        }
    }
}
