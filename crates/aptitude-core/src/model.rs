use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A scoring dimension of the questionnaire (e.g. "A1: 論理的思考").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Stable key used in answer references and profile alignment, e.g. "A1", "B"
    pub key: String,
    /// Human-readable label shown on the chart axis
    pub label: String,
    /// Questions in presentation order
    pub questions: Vec<Question>,
}

impl Category {
    /// Saturates at `u32::MAX`; catalogs cap categories far below that.
    pub fn question_count(&self) -> u32 {
        u32::try_from(self.questions.len()).unwrap_or(u32::MAX)
    }
}

/// A yes/no question, optionally carrying footnote marks such as "※1".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "QuestionDoc", into = "QuestionDoc")]
pub enum Question {
    Plain { text: String },
    Annotated { text: String, footnotes: Vec<String> },
}

impl Question {
    pub fn plain(text: impl Into<String>) -> Self {
        Self::Plain { text: text.into() }
    }

    pub fn annotated<I, S>(text: impl Into<String>, footnotes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Annotated {
            text: text.into(),
            footnotes: footnotes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Plain { text } | Self::Annotated { text, .. } => text,
        }
    }

    pub fn footnotes(&self) -> &[String] {
        match self {
            Self::Plain { .. } => &[],
            Self::Annotated { footnotes, .. } => footnotes,
        }
    }
}

/// Catalog documents write plain questions as bare strings and annotated ones as objects.
#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum QuestionDoc {
    Text(String),
    WithFootnotes {
        text: String,
        #[serde(default)]
        footnotes: Vec<String>,
    },
}

impl From<QuestionDoc> for Question {
    fn from(doc: QuestionDoc) -> Self {
        match doc {
            QuestionDoc::Text(text) => Self::Plain { text },
            QuestionDoc::WithFootnotes { text, footnotes } if footnotes.is_empty() => {
                Self::Plain { text }
            }
            QuestionDoc::WithFootnotes { text, footnotes } => Self::Annotated { text, footnotes },
        }
    }
}

impl From<Question> for QuestionDoc {
    fn from(question: Question) -> Self {
        match question {
            Question::Plain { text } => Self::Text(text),
            Question::Annotated { text, footnotes } => Self::WithFootnotes { text, footnotes },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Footnote {
    /// Mark referenced by questions, e.g. "※1"
    pub mark: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Answer {
    Yes,
    No,
}

/// Identifies one question by category key and zero-based index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuestionRef {
    pub category: String,
    pub index: usize,
}

impl QuestionRef {
    pub fn new(category: impl Into<String>, index: usize) -> Self {
        Self {
            category: category.into(),
            index,
        }
    }
}

impl fmt::Display for QuestionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.category, self.index)
    }
}

/// Per-category points, positionally aligned with the catalog's category order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreVector(Vec<u32>);

impl ScoreVector {
    pub fn new(values: Vec<u32>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }

    /// Sum of absolute per-category differences. Callers must compare vectors of equal length;
    /// extra trailing entries on either side are ignored.
    pub fn l1_distance(&self, other: &ScoreVector) -> u32 {
        self.0
            .iter()
            .zip(&other.0)
            .map(|(a, b)| a.abs_diff(*b))
            .sum()
    }
}

impl From<Vec<u32>> for ScoreVector {
    fn from(values: Vec<u32>) -> Self {
        Self(values)
    }
}

/// An idealized score vector for a named role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobProfile {
    pub name: String,
    pub scores: ScoreVector,
}

impl JobProfile {
    pub fn new(name: impl Into<String>, scores: impl Into<ScoreVector>) -> Self {
        Self {
            name: name.into(),
            scores: scores.into(),
        }
    }
}
