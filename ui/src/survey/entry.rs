//! Manually entered survey responses: draft answers checked against the survey definition.

use std::collections::BTreeMap;

use api::surveys::{AnswerValue, ManualEntrySubmission, QuestionKind, SurveyDefinition};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntryError {
    #[error("\"{prompt}\" needs an answer")]
    Required { question: String, prompt: String },

    #[error("\"{prompt}\" must be between {min} and {max}")]
    RatingOutOfRange {
        question: String,
        prompt: String,
        min: u8,
        max: u8,
    },

    #[error("\"{value}\" is not an option for \"{prompt}\"")]
    UnknownOption {
        question: String,
        prompt: String,
        value: String,
    },

    #[error("\"{prompt}\" expects a different kind of answer")]
    WrongKind { question: String, prompt: String },

    #[error("answer for unknown question {0}")]
    UnknownQuestion(String),
}

impl EntryError {
    pub fn question(&self) -> &str {
        match self {
            EntryError::Required { question, .. }
            | EntryError::RatingOutOfRange { question, .. }
            | EntryError::UnknownOption { question, .. }
            | EntryError::WrongKind { question, .. } => question,
            EntryError::UnknownQuestion(question) => question,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ManualEntryDraft {
    pub respondent_email: String,
    pub occurrence_id: String,
    answers: BTreeMap<String, AnswerValue>,
}

impl ManualEntryDraft {
    pub fn answer(&self, question_id: &str) -> Option<&AnswerValue> {
        self.answers.get(question_id)
    }

    pub fn set_rating(&mut self, question_id: &str, value: u8) {
        self.answers
            .insert(question_id.to_string(), AnswerValue::Rating(value));
    }

    /// Text and choice answers. An all-whitespace value clears the answer.
    pub fn set_text(&mut self, question_id: &str, value: &str) {
        if value.trim().is_empty() {
            self.answers.remove(question_id);
        } else {
            self.answers.insert(
                question_id.to_string(),
                AnswerValue::Text(value.to_string()),
            );
        }
    }

    pub fn clear(&mut self, question_id: &str) {
        self.answers.remove(question_id);
    }

    /// Every problem with the draft, in question order.
    pub fn validate(&self, definition: &SurveyDefinition) -> Vec<EntryError> {
        let mut errors = Vec::new();

        for question in &definition.questions {
            let id = || question.id.clone();
            let prompt = || question.prompt.clone();
            let Some(answer) = self.answers.get(&question.id) else {
                if question.required {
                    errors.push(EntryError::Required {
                        question: id(),
                        prompt: prompt(),
                    });
                }
                continue;
            };

            match (&question.kind, answer) {
                (QuestionKind::Rating { min, max }, AnswerValue::Rating(value)) => {
                    if value < min || value > max {
                        errors.push(EntryError::RatingOutOfRange {
                            question: id(),
                            prompt: prompt(),
                            min: *min,
                            max: *max,
                        });
                    }
                }
                (QuestionKind::Text, AnswerValue::Text(_)) => {}
                (QuestionKind::Choice { options }, AnswerValue::Text(value)) => {
                    if !options.iter().any(|option| option == value) {
                        errors.push(EntryError::UnknownOption {
                            question: id(),
                            prompt: prompt(),
                            value: value.clone(),
                        });
                    }
                }
                _ => errors.push(EntryError::WrongKind {
                    question: id(),
                    prompt: prompt(),
                }),
            }
        }

        for question_id in self.answers.keys() {
            if !definition.questions.iter().any(|q| &q.id == question_id) {
                errors.push(EntryError::UnknownQuestion(question_id.clone()));
            }
        }

        errors
    }

    /// Request body; text answers are trimmed and blank metadata is omitted.
    pub fn to_submission(&self) -> ManualEntrySubmission {
        let optional = |raw: &str| {
            let trimmed = raw.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        };
        let answers = self
            .answers
            .iter()
            .map(|(id, answer)| {
                let answer = match answer {
                    AnswerValue::Text(text) => AnswerValue::Text(text.trim().to_string()),
                    rating => rating.clone(),
                };
                (id.clone(), answer)
            })
            .collect();
        ManualEntrySubmission {
            respondent_email: optional(&self.respondent_email),
            occurrence_id: optional(&self.occurrence_id),
            answers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api::surveys::SurveyQuestion;

    fn definition() -> SurveyDefinition {
        SurveyDefinition {
            id: "s1".into(),
            title: "Class feedback".into(),
            questions: vec![
                SurveyQuestion {
                    id: "rating".into(),
                    prompt: "How was the class?".into(),
                    kind: QuestionKind::Rating { min: 1, max: 5 },
                    required: true,
                },
                SurveyQuestion {
                    id: "format".into(),
                    prompt: "Preferred format".into(),
                    kind: QuestionKind::Choice {
                        options: vec!["In person".into(), "Online".into()],
                    },
                    required: false,
                },
                SurveyQuestion {
                    id: "comments".into(),
                    prompt: "Anything else?".into(),
                    kind: QuestionKind::Text,
                    required: false,
                },
            ],
        }
    }

    #[test]
    fn required_questions_must_be_answered() {
        let errors = ManualEntryDraft::default().validate(&definition());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].question(), "rating");
        assert!(errors[0].to_string().contains("How was the class?"));
    }

    #[test]
    fn rating_must_fall_inside_the_scale() {
        let mut draft = ManualEntryDraft::default();
        draft.set_rating("rating", 6);
        assert!(matches!(
            draft.validate(&definition()).as_slice(),
            [EntryError::RatingOutOfRange { min: 1, max: 5, .. }]
        ));
        draft.set_rating("rating", 5);
        assert!(draft.validate(&definition()).is_empty());
    }

    #[test]
    fn choices_must_be_listed_options() {
        let mut draft = ManualEntryDraft::default();
        draft.set_rating("rating", 4);
        draft.set_text("format", "Hybrid");
        assert!(matches!(
            draft.validate(&definition()).as_slice(),
            [EntryError::UnknownOption { value, .. }] if value == "Hybrid"
        ));
    }

    #[test]
    fn mismatched_and_unknown_answers_are_reported() {
        let mut draft = ManualEntryDraft::default();
        draft.set_text("rating", "great");
        draft.set_text("extra", "hello");
        let errors = draft.validate(&definition());
        assert!(matches!(errors[0], EntryError::WrongKind { .. }));
        assert_eq!(errors[1], EntryError::UnknownQuestion("extra".into()));
    }

    #[test]
    fn blank_text_clears_the_answer() {
        let mut draft = ManualEntryDraft::default();
        draft.set_text("comments", "Loved it");
        draft.set_text("comments", "   ");
        assert!(draft.answer("comments").is_none());
    }

    #[test]
    fn submission_trims_and_omits_blank_metadata() {
        let mut draft = ManualEntryDraft {
            respondent_email: "  member@example.com ".into(),
            ..Default::default()
        };
        draft.set_rating("rating", 3);
        draft.set_text("comments", " Loved it ");

        let submission = draft.to_submission();
        assert_eq!(submission.respondent_email.as_deref(), Some("member@example.com"));
        assert_eq!(submission.occurrence_id, None);
        assert_eq!(
            submission.answers.get("comments"),
            Some(&AnswerValue::Text("Loved it".into()))
        );
        assert_eq!(submission.answers.get("rating"), Some(&AnswerValue::Rating(3)));
    }
}
