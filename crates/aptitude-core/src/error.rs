/// Error types for the quiz core.
///
/// `ConfigError` covers reference data and layout settings that are wrong before any
/// answer is scored; these are rejected when the catalog or limits are loaded.
/// `ValidationError` covers answer sheets that cannot be scored yet. Both are
/// recoverable: the caller fixes the input and retries.
use crate::model::QuestionRef;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("catalog has no categories")]
    NoCategories,

    #[error("duplicate category key: {0}")]
    DuplicateCategory(String),

    #[error("category {0} has no questions")]
    EmptyCategory(String),

    #[error("category {category} has {count} questions, at most {max} allowed")]
    TooManyQuestions {
        category: String,
        count: usize,
        max: usize,
    },

    #[error("duplicate footnote mark: {0}")]
    DuplicateFootnote(String),

    #[error("question {question} references unknown footnote {mark}")]
    UnknownFootnote { question: QuestionRef, mark: String },

    #[error("duplicate job profile: {0}")]
    DuplicateProfile(String),

    #[error("job profile {profile} has {found} scores, expected {expected}")]
    DimensionMismatch {
        profile: String,
        expected: usize,
        found: usize,
    },

    #[error("job profile {profile} scores {score} in category {category}, max is {max}")]
    ScoreOutOfRange {
        profile: String,
        category: String,
        score: u32,
        max: u32,
    },

    #[error("max line length must be positive, got {0}")]
    InvalidLineLimit(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{} question(s) unanswered: {}", .unanswered.len(), join_refs(.unanswered))]
    Incomplete { unanswered: Vec<QuestionRef> },

    #[error("answer given for unknown question {0}")]
    UnknownQuestion(QuestionRef),
}

impl ValidationError {
    /// The question a re-prompt should jump to, if any.
    pub fn first_unanswered(&self) -> Option<&QuestionRef> {
        match self {
            Self::Incomplete { unanswered } => unanswered.first(),
            Self::UnknownQuestion(_) => None,
        }
    }
}

fn join_refs(refs: &[QuestionRef]) -> String {
    refs.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
