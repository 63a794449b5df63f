//! Survey definitions and manually entered responses.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{ApiClient, ApiResult, RequestKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionKind {
    Rating { min: u8, max: u8 },
    Text,
    Choice { options: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyQuestion {
    pub id: String,
    pub prompt: String,
    #[serde(flatten)]
    pub kind: QuestionKind,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyDefinition {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub questions: Vec<SurveyQuestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Rating(u8),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualEntrySubmission {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub respondent_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurrence_id: Option<String>,
    pub answers: BTreeMap<String, AnswerValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualEntryReceipt {
    pub id: String,
}

impl ApiClient {
    pub async fn fetch_survey(&self, survey_id: &str) -> ApiResult<SurveyDefinition> {
        self.get_json(RequestKind::Survey, &format!("surveys/{survey_id}"), &[])
            .await
    }

    pub async fn submit_manual_entry(
        &self,
        survey_id: &str,
        submission: &ManualEntrySubmission,
    ) -> ApiResult<ManualEntryReceipt> {
        let receipt: ManualEntryReceipt = self
            .post_json(
                RequestKind::Survey,
                &format!("surveys/{survey_id}/manual_entries"),
                submission,
            )
            .await?;
        tracing::info!(survey_id, entry_id = %receipt.id, "Manual survey entry submitted");
        Ok(receipt)
    }
}
