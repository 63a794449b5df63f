use api::surveys::{AnswerValue, QuestionKind, SurveyDefinition, SurveyQuestion};
use dioxus::prelude::*;

use crate::components::notice::{ErrorNotice, LoadingSkeleton};
use crate::core::context::AppContext;
use crate::t;

use super::entry::{EntryError, ManualEntryDraft};

#[derive(Clone, Debug, PartialEq)]
enum EntryStatus {
    Idle,
    Submitting,
    Submitted(String),
    Error(String),
}

#[component]
pub fn SurveyEntryPage(survey_id: String) -> Element {
    let ctx = use_context::<AppContext>();

    let survey = use_resource(use_reactive!(|(survey_id,)| {
        let api = ctx.api.clone();
        async move {
            api.fetch_survey(&survey_id).await.map_err(|err| {
                tracing::warn!(survey_id = %survey_id, error = %err, "survey request failed");
                err.user_message()
            })
        }
    }));

    let body = match &*survey.read() {
        None => rsx! { LoadingSkeleton { lines: 6 } },
        Some(Err(message)) => rsx! { ErrorNotice { message: message.clone() } },
        Some(Ok(definition)) => rsx! {
            EntryForm { key: "{definition.id}", definition: definition.clone() }
        },
    };

    rsx! {
        section { class: "page page-survey-entry",
            h1 { {t!("survey-entry-title")} }
            {body}
        }
    }
}

#[component]
fn EntryForm(definition: SurveyDefinition) -> Element {
    let ctx = use_context::<AppContext>();
    let mut draft = use_signal(ManualEntryDraft::default);
    let mut errors = use_signal(Vec::<EntryError>::new);
    let mut status = use_signal(|| EntryStatus::Idle);

    let submit = {
        let definition = definition.clone();
        move |_: MouseEvent| {
            if status() == EntryStatus::Submitting {
                return;
            }
            let found = draft.read().validate(&definition);
            if !found.is_empty() {
                tracing::info!(errors = found.len(), "manual entry blocked");
                errors.set(found);
                return;
            }
            errors.set(Vec::new());
            status.set(EntryStatus::Submitting);

            let submission = draft.read().to_submission();
            let api = ctx.api.clone();
            let survey_id = definition.id.clone();
            spawn(async move {
                match api.submit_manual_entry(&survey_id, &submission).await {
                    Ok(receipt) => {
                        draft.set(ManualEntryDraft::default());
                        status.set(EntryStatus::Submitted(receipt.id));
                    }
                    Err(err) => {
                        tracing::warn!(survey_id = %survey_id, error = %err, "manual entry failed");
                        status.set(EntryStatus::Error(err.user_message()));
                    }
                }
            });
        }
    };

    let feedback = match status() {
        EntryStatus::Idle => None,
        EntryStatus::Submitting => Some(("status".to_string(), t!("survey-submitting"))),
        EntryStatus::Submitted(id) => Some((
            "status status--success".to_string(),
            t!("survey-submitted", id = id),
        )),
        EntryStatus::Error(message) => Some(("status status--error".to_string(), message)),
    };
    let current = draft.read().clone();
    let fields: Vec<(String, SurveyQuestion, Option<AnswerValue>, Option<String>)> = definition
        .questions
        .iter()
        .map(|question| {
            let error = errors
                .read()
                .iter()
                .find(|e| e.question() == question.id)
                .map(|e| e.to_string());
            (
                question.id.clone(),
                question.clone(),
                current.answer(&question.id).cloned(),
                error,
            )
        })
        .collect();

    rsx! {
        form {
            class: "survey-form",
            onsubmit: move |evt| evt.prevent_default(),
            h2 { "{definition.title}" }
            div { class: "survey-form__meta",
                label { class: "field",
                    span { class: "field__label", {t!("survey-respondent-email")} }
                    input {
                        class: "input",
                        r#type: "email",
                        value: "{current.respondent_email}",
                        oninput: move |evt| draft.write().respondent_email = evt.value(),
                    }
                }
                label { class: "field",
                    span { class: "field__label", {t!("survey-occurrence")} }
                    input {
                        class: "input",
                        value: "{current.occurrence_id}",
                        oninput: move |evt| draft.write().occurrence_id = evt.value(),
                    }
                }
            }
            for (id, question, answer, error) in fields {
                QuestionField { key: "{id}", question, answer, error, draft }
            }
            if let Some((class, message)) = feedback {
                p { class: "{class}", "{message}" }
            }
            div { class: "survey-form__actions",
                button {
                    r#type: "button",
                    class: "button button--primary",
                    disabled: status() == EntryStatus::Submitting,
                    onclick: submit,
                    {t!("survey-submit")}
                }
            }
        }
    }
}

#[component]
fn QuestionField(
    question: SurveyQuestion,
    answer: Option<AnswerValue>,
    error: Option<String>,
    mut draft: Signal<ManualEntryDraft>,
) -> Element {
    let id = question.id.clone();
    let input = match &question.kind {
        QuestionKind::Rating { min, max } => {
            let selected = match answer {
                Some(AnswerValue::Rating(value)) => Some(value),
                _ => None,
            };
            rsx! {
                div { class: "rating-scale", role: "radiogroup",
                    for value in *min..=*max {
                        button {
                            key: "{value}",
                            r#type: "button",
                            class: if selected == Some(value) { "rating-scale__option rating-scale__option--active" } else { "rating-scale__option" },
                            aria_pressed: "{selected == Some(value)}",
                            onclick: {
                                let id = id.clone();
                                move |_| draft.write().set_rating(&id, value)
                            },
                            "{value}"
                        }
                    }
                }
            }
        }
        QuestionKind::Text => {
            let text = match answer {
                Some(AnswerValue::Text(text)) => text,
                _ => String::new(),
            };
            rsx! {
                textarea {
                    class: "input",
                    rows: "3",
                    value: "{text}",
                    oninput: {
                        let id = id.clone();
                        move |evt: FormEvent| draft.write().set_text(&id, &evt.value())
                    },
                }
            }
        }
        QuestionKind::Choice { options } => {
            let chosen = match answer {
                Some(AnswerValue::Text(text)) => text,
                _ => String::new(),
            };
            rsx! {
                select {
                    class: "input",
                    value: "{chosen}",
                    onchange: {
                        let id = id.clone();
                        move |evt: FormEvent| draft.write().set_text(&id, &evt.value())
                    },
                    option { value: "", {t!("survey-choose")} }
                    for opt in options.iter() {
                        option { key: "{opt}", value: "{opt}", selected: *opt == chosen, "{opt}" }
                    }
                }
            }
        }
    };

    rsx! {
        fieldset { class: if error.is_some() { "question question--invalid" } else { "question" },
            legend {
                "{question.prompt}"
                if question.required {
                    span { class: "question__required", " *" }
                }
            }
            {input}
            if let Some(message) = error.clone() {
                span { class: "field__error", "{message}" }
            }
        }
    }
}
