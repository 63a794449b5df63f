use api::categories::ClassCategory;
use dioxus::prelude::*;

use crate::components::notice::{ErrorNotice, LoadingSkeleton};
use crate::core::context::AppContext;
use crate::t;

use super::form::{DrawerForm, DrawerMode, SubmitOutcome};

#[component]
pub fn ClassCategoriesPage() -> Element {
    let ctx = use_context::<AppContext>();
    let form = use_signal(DrawerForm::default);
    let mut refresh = use_signal(|| 0u32);
    let mut action_error = use_signal(|| None::<String>);

    let categories = use_resource({
        let ctx = ctx.clone();
        move || {
            let api = ctx.api.clone();
            let _generation = refresh();
            async move {
                api.list_class_categories().await.map_err(|err| {
                    tracing::warn!(error = %err, "class categories request failed");
                    err.user_message()
                })
            }
        }
    });

    let body = match &*categories.read() {
        None => rsx! { LoadingSkeleton { lines: 5 } },
        Some(Err(message)) => rsx! { ErrorNotice { message: message.clone() } },
        Some(Ok(list)) if list.is_empty() => rsx! {
            p { class: "empty-state", {t!("categories-empty")} }
        },
        Some(Ok(list)) => rsx! {
            table { class: "data-table",
                thead {
                    tr {
                        th { {t!("categories-column-title")} }
                        th { {t!("categories-column-description")} }
                        th { {t!("categories-column-color")} }
                        th { class: "data-table__actions" }
                    }
                }
                tbody {
                    for (id, category) in list.iter().map(|c| (c.id.clone(), c.clone())) {
                        CategoryRow {
                            key: "{id}",
                            category,
                            form,
                            refresh,
                            action_error,
                        }
                    }
                }
            }
        },
    };

    rsx! {
        section { class: "page page-categories",
            header { class: "page__header",
                h1 { {t!("categories-title")} }
                button {
                    r#type: "button",
                    class: "button button--primary",
                    onclick: {
                        let mut form = form;
                        move |_| form.write().open_create()
                    },
                    {t!("categories-new")}
                }
            }
            if let Some(message) = action_error() {
                div { class: "notice-row",
                    ErrorNotice { message }
                    button {
                        r#type: "button",
                        class: "button button--small",
                        onclick: move |_| action_error.set(None),
                        {t!("dialog-dismiss")}
                    }
                }
            }
            {body}
            if form.read().is_open() {
                CategoryDrawer { form, on_saved: move |_| refresh += 1 }
            }
        }
    }
}

#[component]
fn CategoryRow(
    category: ClassCategory,
    mut form: Signal<DrawerForm>,
    mut refresh: Signal<u32>,
    mut action_error: Signal<Option<String>>,
) -> Element {
    let ctx = use_context::<AppContext>();
    let mut deleting = use_signal(|| false);
    let swatch = category.color.clone().unwrap_or_default();
    let description = category.description.clone().unwrap_or_default();

    rsx! {
        tr {
            td { "{category.title}" }
            td { class: "data-table__muted", "{description}" }
            td {
                if !swatch.is_empty() {
                    span { class: "swatch", style: "background-color: {swatch};" }
                    code { "{swatch}" }
                }
            }
            td { class: "data-table__actions",
                button {
                    r#type: "button",
                    class: "button button--small",
                    onclick: {
                        let category = category.clone();
                        move |_| form.write().open_edit(&category)
                    },
                    {t!("action-edit")}
                }
                button {
                    r#type: "button",
                    class: "button button--small button--danger",
                    disabled: deleting(),
                    onclick: {
                        let id = category.id.clone();
                        move |_| {
                            if deleting() {
                                return;
                            }
                            deleting.set(true);
                            let api = ctx.api.clone();
                            let id = id.clone();
                            spawn(async move {
                                match api.delete_class_category(&id).await {
                                    Ok(()) => refresh += 1,
                                    Err(err) => {
                                        tracing::warn!(category_id = %id, error = %err, "delete failed");
                                        action_error.set(Some(err.user_message()));
                                    }
                                }
                                deleting.set(false);
                            });
                        }
                    },
                    {t!("action-delete")}
                }
            }
        }
    }
}

/// Side drawer for creating or editing a category. Submitting calls the api once per open.
#[component]
fn CategoryDrawer(mut form: Signal<DrawerForm>, on_saved: EventHandler<()>) -> Element {
    let ctx = use_context::<AppContext>();
    let snapshot = form.read().clone();
    let heading = match snapshot.mode() {
        DrawerMode::Create => t!("categories-new"),
        DrawerMode::Edit { .. } => t!("categories-edit"),
    };
    let title_error = snapshot.field_error("title").map(|e| e.to_string());
    let color_error = snapshot.field_error("color").map(|e| e.to_string());

    let submit = move |_: MouseEvent| {
        let outcome = form.write().submit();
        let SubmitOutcome::Saved { mode, input } = outcome else {
            return;
        };
        let api = ctx.api.clone();
        spawn(async move {
            let result = match &mode {
                DrawerMode::Create => api.create_class_category(&input).await,
                DrawerMode::Edit { id } => api.update_class_category(id, &input).await,
            };
            match result {
                Ok(saved) => {
                    tracing::info!(category_id = %saved.id, "class category saved");
                    form.write().close();
                    on_saved.call(());
                }
                Err(err) => {
                    tracing::warn!(error = %err, "class category save failed");
                    form.write().save_failed(err.user_message());
                }
            }
        });
    };

    rsx! {
        div { class: "drawer-backdrop",
            aside { class: "drawer", role: "dialog", aria_modal: "true",
                h2 { class: "drawer__title", "{heading}" }
                if let Some(message) = snapshot.save_error() {
                    ErrorNotice { message: message.to_string() }
                }
                label { class: "field",
                    span { class: "field__label", {t!("categories-column-title")} " *" }
                    input {
                        class: if title_error.is_some() { "input input--invalid" } else { "input" },
                        value: "{snapshot.draft.title}",
                        oninput: move |evt| form.write().draft.title = evt.value(),
                    }
                    if let Some(message) = title_error.clone() {
                        span { class: "field__error", "{message}" }
                    }
                }
                label { class: "field",
                    span { class: "field__label", {t!("categories-column-description")} }
                    textarea {
                        class: "input",
                        rows: "3",
                        value: "{snapshot.draft.description}",
                        oninput: move |evt| form.write().draft.description = evt.value(),
                    }
                }
                label { class: "field",
                    span { class: "field__label", {t!("categories-column-color")} }
                    input {
                        class: if color_error.is_some() { "input input--invalid" } else { "input" },
                        placeholder: "#RRGGBB",
                        value: "{snapshot.draft.color}",
                        oninput: move |evt| form.write().draft.color = evt.value(),
                    }
                    if let Some(message) = color_error.clone() {
                        span { class: "field__error", "{message}" }
                    }
                }
                div { class: "drawer__actions",
                    button {
                        r#type: "button",
                        class: "button",
                        disabled: snapshot.is_saving(),
                        onclick: move |_| form.write().close(),
                        {t!("action-cancel")}
                    }
                    button {
                        r#type: "button",
                        class: "button button--primary",
                        disabled: snapshot.is_saving(),
                        onclick: submit,
                        {t!("action-save")}
                    }
                }
            }
        }
    }
}
