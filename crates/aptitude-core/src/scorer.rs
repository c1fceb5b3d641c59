/// Scoring of answer sheets and nearest-profile matching.
///
/// `tabulate` turns a complete answer sheet into a [`ScoreVector`]; `best_match` picks the
/// job profile with the smallest L1 distance. Raw per-category point differences are
/// summed without weighting, so categories with more questions carry more range.
use std::collections::HashMap;
use std::fmt;

use tracing::{debug, warn};

use crate::catalog::Catalog;
use crate::error::ValidationError;
use crate::model::{Answer, JobProfile, QuestionRef, ScoreVector};

/// Label shown in place of a job name when no profile could be matched.
pub const NO_MATCH_LABEL: &str = "N/A";

/// Answers collected so far. Unanswered questions simply have no entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSheet {
    answers: HashMap<QuestionRef, Answer>,
}

impl AnswerSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an answer, returning the one it replaced.
    pub fn record(
        &mut self,
        category: impl Into<String>,
        index: usize,
        answer: Answer,
    ) -> Option<Answer> {
        self.answers
            .insert(QuestionRef::new(category, index), answer)
    }

    pub fn clear(&mut self, question: &QuestionRef) -> Option<Answer> {
        self.answers.remove(question)
    }

    pub fn reset(&mut self) {
        self.answers.clear();
    }

    pub fn get(&self, question: &QuestionRef) -> Option<Answer> {
        self.answers.get(question).copied()
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&QuestionRef, Answer)> {
        self.answers.iter().map(|(q, a)| (q, *a))
    }
}

impl FromIterator<(QuestionRef, Answer)> for AnswerSheet {
    fn from_iter<T: IntoIterator<Item = (QuestionRef, Answer)>>(iter: T) -> Self {
        Self {
            answers: iter.into_iter().collect(),
        }
    }
}

/// Counts "yes" answers per category, in catalog order.
///
/// Fails without producing any scores when a question is unanswered or an answer refers
/// to a question the catalog does not have.
pub fn tabulate(catalog: &Catalog, answers: &AnswerSheet) -> Result<ScoreVector, ValidationError> {
    let mut stray: Vec<&QuestionRef> = answers
        .answers
        .keys()
        .filter(|q| !catalog.contains_question(q))
        .collect();
    stray.sort();
    if let Some(question) = stray.first() {
        return Err(ValidationError::UnknownQuestion((*question).clone()));
    }

    let mut unanswered = Vec::new();
    let mut scores = Vec::with_capacity(catalog.dimension());

    for category in catalog.categories() {
        let mut yes = 0u32;
        for index in 0..category.questions.len() {
            let question = QuestionRef::new(&category.key, index);
            match answers.answers.get(&question) {
                Some(Answer::Yes) => yes += 1,
                Some(Answer::No) => {}
                None => unanswered.push(question),
            }
        }
        scores.push(yes);
    }

    if !unanswered.is_empty() {
        debug!(unanswered = unanswered.len(), "answer sheet incomplete");
        return Err(ValidationError::Incomplete { unanswered });
    }

    Ok(ScoreVector::new(scores))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome<'a> {
    Matched {
        profile: &'a JobProfile,
        distance: u32,
    },
    NoMatch,
}

impl<'a> MatchOutcome<'a> {
    pub fn profile(&self) -> Option<&'a JobProfile> {
        match *self {
            Self::Matched { profile, .. } => Some(profile),
            Self::NoMatch => None,
        }
    }

    pub fn distance(&self) -> Option<u32> {
        match *self {
            Self::Matched { distance, .. } => Some(distance),
            Self::NoMatch => None,
        }
    }

    /// Matched job name, or [`NO_MATCH_LABEL`].
    pub fn name(&self) -> &'a str {
        match *self {
            Self::Matched { profile, .. } => &profile.name,
            Self::NoMatch => NO_MATCH_LABEL,
        }
    }
}

impl fmt::Display for MatchOutcome<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Linear nearest-neighbor scan. On equal distance the earlier profile wins.
pub fn best_match<'a>(user: &ScoreVector, profiles: &'a [JobProfile]) -> MatchOutcome<'a> {
    let mut best = MatchOutcome::NoMatch;

    for profile in profiles {
        if profile.scores.len() != user.len() {
            warn!(
                profile = %profile.name,
                expected = user.len(),
                found = profile.scores.len(),
                "skipping job profile with mismatched dimension"
            );
            continue;
        }

        let distance = user.l1_distance(&profile.scores);
        let closer = match best {
            MatchOutcome::Matched { distance: current, .. } => distance < current,
            MatchOutcome::NoMatch => true,
        };
        if closer {
            best = MatchOutcome::Matched { profile, distance };
        }
    }

    best
}

/// One category's line in a result breakdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryScore<'a> {
    pub key: &'a str,
    pub label: &'a str,
    pub score: u32,
    pub max: u32,
}

impl fmt::Display for CategoryScore<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}点", self.label, self.score)
    }
}

/// Pairs each score with its category, in catalog order.
pub fn breakdown<'a>(catalog: &'a Catalog, scores: &ScoreVector) -> Vec<CategoryScore<'a>> {
    catalog
        .categories()
        .iter()
        .zip(scores.values())
        .map(|(category, &score)| CategoryScore {
            key: &category.key,
            label: &category.label,
            score,
            max: category.question_count(),
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct Diagnosis<'a> {
    pub scores: ScoreVector,
    pub breakdown: Vec<CategoryScore<'a>>,
    pub outcome: MatchOutcome<'a>,
}

/// Tabulates the sheet and matches it against the catalog's profile table.
pub fn diagnose<'a>(
    catalog: &'a Catalog,
    answers: &AnswerSheet,
) -> Result<Diagnosis<'a>, ValidationError> {
    let scores = tabulate(catalog, answers)?;
    let outcome = best_match(&scores, catalog.profiles());
    let breakdown = breakdown(catalog, &scores);

    debug!(
        scores = ?scores.values(),
        recommended = %outcome,
        distance = ?outcome.distance(),
        "diagnosis complete"
    );

    Ok(Diagnosis {
        scores,
        breakdown,
        outcome,
    })
}
