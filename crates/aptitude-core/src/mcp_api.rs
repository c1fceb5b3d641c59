use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::labels::WrappedLabel;
use crate::model::{Answer, QuestionRef};
use crate::scorer::{AnswerSheet, CategoryScore};

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetQuestionsParams {
    /// Category key such as "A1" or "B". Omit to list every question.
    pub category: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AnswerEntry {
    /// Category key of the question, e.g. "A1".
    pub category: String,
    /// Zero-based question index within the category.
    pub index: usize,
    /// "yes" or "no".
    pub answer: Answer,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DiagnoseParams {
    /// One entry per answered question. Every question must be answered.
    pub answers: Vec<AnswerEntry>,
    /// Wrap chart labels for a narrow viewport (default: false).
    pub compact: Option<bool>,
}

impl DiagnoseParams {
    pub fn answer_sheet(&self) -> AnswerSheet {
        self.answers
            .iter()
            .map(|e| (QuestionRef::new(&e.category, e.index), e.answer))
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct MatchProfileParams {
    /// Per-category scores in catalog category order.
    pub scores: Vec<u32>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetJobProfileParams {
    /// Exact job name as listed by list_job_profiles.
    pub job: String,
    /// Wrap chart labels for a narrow viewport (default: false).
    pub compact: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct WrapLabelsParams {
    pub labels: Vec<String>,
    /// Maximum characters per line; must be positive.
    pub max_length: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CategoryInfo {
    pub key: String,
    pub label: String,
    pub question_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CatalogSummaryResponse {
    pub version: String,
    pub title: String,
    /// SHA-256 of the loaded catalog.
    pub digest: String,
    pub question_count: usize,
    pub categories: Vec<CategoryInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FootnoteInfo {
    pub mark: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct QuestionInfo {
    /// Form id, e.g. "A1-0".
    pub id: String,
    pub category: String,
    pub index: usize,
    /// One-based display number within the category.
    pub number: usize,
    pub text: String,
    pub footnotes: Vec<FootnoteInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct QuestionListResponse {
    pub questions: Vec<QuestionInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CategoryScoreInfo {
    pub key: String,
    pub label: String,
    pub score: u32,
    pub max: u32,
    /// Display line, e.g. "論理的思考: 3点".
    pub summary: String,
}

impl From<&CategoryScore<'_>> for CategoryScoreInfo {
    fn from(score: &CategoryScore<'_>) -> Self {
        Self {
            key: score.key.to_string(),
            label: score.label.to_string(),
            score: score.score,
            max: score.max,
            summary: score.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DiagnoseResponse {
    pub scores: Vec<u32>,
    pub breakdown: Vec<CategoryScoreInfo>,
    /// Recommended job name, or "N/A" when the profile table is empty.
    pub recommended_job: String,
    pub matched: bool,
    /// L1 distance to the recommended profile.
    pub distance: Option<u32>,
    /// Category labels wrapped for the radar chart axis.
    pub chart_labels: Vec<WrappedLabel>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MatchProfileResponse {
    pub job: String,
    pub matched: bool,
    pub distance: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct JobProfileListResponse {
    /// Job names in table order.
    pub jobs: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct JobProfileResponse {
    pub job: String,
    pub scores: Vec<u32>,
    pub breakdown: Vec<CategoryScoreInfo>,
    pub chart_labels: Vec<WrappedLabel>,
    /// Largest per-category score any profile or user can reach.
    pub suggested_max: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WrapLabelsResponse {
    pub labels: Vec<WrappedLabel>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnose_params_build_answer_sheet() {
        let params: DiagnoseParams = serde_json::from_str(
            r#"{"answers": [
                {"category": "A", "index": 0, "answer": "yes"},
                {"category": "A", "index": 1, "answer": "no"},
                {"category": "A", "index": 0, "answer": "no"}
            ]}"#,
        )
        .unwrap();

        assert_eq!(params.compact, None);
        let sheet = params.answer_sheet();
        assert_eq!(sheet.len(), 2);
        assert_eq!(sheet.get(&QuestionRef::new("A", 0)), Some(Answer::No));
        assert_eq!(sheet.get(&QuestionRef::new("A", 1)), Some(Answer::No));
    }

    #[test]
    fn category_score_info_carries_summary_line() {
        let score = CategoryScore {
            key: "B",
            label: "コミュニケーション",
            score: 2,
            max: 4,
        };
        let info = CategoryScoreInfo::from(&score);
        assert_eq!(info.summary, "コミュニケーション: 2点");
        assert_eq!(info.max, 4);
    }
}
