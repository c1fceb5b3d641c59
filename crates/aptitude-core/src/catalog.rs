/// Versioned reference data for the questionnaire.
///
/// A catalog bundles the ordered categories (with their questions), footnotes and the
/// job profile table. Every consistency rule is checked once in [`Catalog::new`]; after
/// that the catalog is read-only and scoring against it cannot hit a malformed entry.
use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::ConfigError;
use crate::model::{Category, Footnote, JobProfile, QuestionRef};

/// Upper bound on questions in one category. Scores are counts of yes answers.
pub const MAX_QUESTIONS_PER_CATEGORY: usize = 100;

/// Catalog as written on disk, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogDocument {
    /// Free-form version tag, e.g. "2024-six-category"
    pub version: String,
    #[serde(default)]
    pub title: String,
    pub categories: Vec<Category>,
    #[serde(default)]
    pub footnotes: Vec<Footnote>,
    #[serde(default)]
    pub profiles: Vec<JobProfile>,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    doc: CatalogDocument,
    digest: String,
}

impl Catalog {
    pub fn new(doc: CatalogDocument) -> Result<Self, ConfigError> {
        validate(&doc)?;
        let digest = digest_of(&doc);
        debug!(
            version = %doc.version,
            categories = doc.categories.len(),
            profiles = doc.profiles.len(),
            digest = %digest,
            "catalog validated"
        );
        Ok(Self { doc, digest })
    }

    pub fn version(&self) -> &str {
        &self.doc.version
    }

    pub fn title(&self) -> &str {
        &self.doc.title
    }

    /// SHA-256 of the canonical JSON form, hex encoded.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn categories(&self) -> &[Category] {
        &self.doc.categories
    }

    pub fn category(&self, key: &str) -> Option<&Category> {
        self.doc.categories.iter().find(|c| c.key == key)
    }

    pub fn category_labels(&self) -> Vec<&str> {
        self.doc.categories.iter().map(|c| c.label.as_str()).collect()
    }

    pub fn footnotes(&self) -> &[Footnote] {
        &self.doc.footnotes
    }

    pub fn footnote(&self, mark: &str) -> Option<&Footnote> {
        self.doc.footnotes.iter().find(|f| f.mark == mark)
    }

    /// Job profiles in table order. Matching relies on this order for tie-breaks.
    pub fn profiles(&self) -> &[JobProfile] {
        &self.doc.profiles
    }

    pub fn profile(&self, name: &str) -> Option<&JobProfile> {
        self.doc.profiles.iter().find(|p| p.name == name)
    }

    pub fn dimension(&self) -> usize {
        self.doc.categories.len()
    }

    pub fn question_count(&self) -> usize {
        self.doc.categories.iter().map(|c| c.questions.len()).sum()
    }

    pub fn contains_question(&self, question: &QuestionRef) -> bool {
        self.category(&question.category)
            .is_some_and(|c| question.index < c.questions.len())
    }
}

fn validate(doc: &CatalogDocument) -> Result<(), ConfigError> {
    if doc.categories.is_empty() {
        return Err(ConfigError::NoCategories);
    }

    let mut marks = HashSet::new();
    for footnote in &doc.footnotes {
        if !marks.insert(footnote.mark.as_str()) {
            return Err(ConfigError::DuplicateFootnote(footnote.mark.clone()));
        }
    }

    let mut keys = HashSet::new();
    for category in &doc.categories {
        if !keys.insert(category.key.as_str()) {
            return Err(ConfigError::DuplicateCategory(category.key.clone()));
        }
        if category.questions.is_empty() {
            return Err(ConfigError::EmptyCategory(category.key.clone()));
        }
        if category.questions.len() > MAX_QUESTIONS_PER_CATEGORY {
            return Err(ConfigError::TooManyQuestions {
                category: category.key.clone(),
                count: category.questions.len(),
                max: MAX_QUESTIONS_PER_CATEGORY,
            });
        }
        for (index, question) in category.questions.iter().enumerate() {
            if let Some(mark) = question
                .footnotes()
                .iter()
                .find(|mark| !marks.contains(mark.as_str()))
            {
                return Err(ConfigError::UnknownFootnote {
                    question: QuestionRef::new(&category.key, index),
                    mark: mark.clone(),
                });
            }
        }
    }

    let mut names = HashSet::new();
    for profile in &doc.profiles {
        if !names.insert(profile.name.as_str()) {
            return Err(ConfigError::DuplicateProfile(profile.name.clone()));
        }
        if profile.scores.len() != doc.categories.len() {
            return Err(ConfigError::DimensionMismatch {
                profile: profile.name.clone(),
                expected: doc.categories.len(),
                found: profile.scores.len(),
            });
        }
        for (category, &score) in doc.categories.iter().zip(profile.scores.values()) {
            let max = category.question_count();
            if score > max {
                return Err(ConfigError::ScoreOutOfRange {
                    profile: profile.name.clone(),
                    category: category.key.clone(),
                    score,
                    max,
                });
            }
        }
    }

    Ok(())
}

fn digest_of(doc: &CatalogDocument) -> String {
    let bytes = serde_json::to_vec(doc).expect("catalog serializes");
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    format!("{:x}", hasher.finalize())
}
