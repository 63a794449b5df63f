//! Notifications and blocking dialogs.

use dioxus::prelude::*;

use crate::t;

/// Non-blocking notification for a failed background request.
#[component]
pub fn ErrorNotice(message: String) -> Element {
    rsx! {
        div { class: "notice notice--error", role: "status",
            span { class: "notice__icon", aria_hidden: "true", "⚠️" }
            span { class: "notice__text", "{message}" }
        }
    }
}

/// Modal that must be dismissed before the page can be used again.
#[component]
pub fn BlockingDialog(title: String, message: String, on_close: EventHandler<()>) -> Element {
    rsx! {
        div { class: "dialog-backdrop",
            div {
                class: "dialog",
                role: "alertdialog",
                aria_modal: "true",
                h2 { class: "dialog__title", "{title}" }
                p { class: "dialog__message", "{message}" }
                div { class: "dialog__actions",
                    button {
                        r#type: "button",
                        class: "button button--primary",
                        onclick: move |_| on_close.call(()),
                        {t!("dialog-dismiss")}
                    }
                }
            }
        }
    }
}

/// Rendered instead of a form the current user may not edit.
#[component]
pub fn ForbiddenPage() -> Element {
    rsx! {
        section { class: "page page--forbidden",
            p { class: "page__status-code", "403" }
            h1 { {t!("forbidden-title")} }
            p { {t!("forbidden-body")} }
        }
    }
}

#[component]
pub fn LoadingSkeleton(#[props(default = 3)] lines: usize) -> Element {
    rsx! {
        div { class: "skeleton-stack", aria_busy: "true",
            for idx in 0..lines {
                div {
                    key: "{idx}",
                    class: if idx + 1 == lines { "skeleton skeleton--line skeleton--short" } else { "skeleton skeleton--line" },
                }
            }
        }
    }
}
