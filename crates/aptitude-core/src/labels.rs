/// Multi-line wrapping of chart axis labels.
///
/// Labels within the limit pass through untouched; longer ones are broken at whitespace,
/// `・` and parentheses, and any segment still too long is hard-split. Wrapping never
/// drops characters: the lines of a wrapped label concatenate back to the original.
use std::num::NonZeroUsize;

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A segment is an optional opening parenthesis, a run of ordinary characters, and at most
/// one trailing break character (whitespace, middle dot or closing parenthesis).
const SEGMENT_PATTERN: &str = r"[(（]?[^\s・･()（）]*[\s・･)）]?";

/// Maximum characters per wrapped line. Zero is rejected up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineLimit(NonZeroUsize);

impl LineLimit {
    pub fn new(max_length: usize) -> Result<Self, ConfigError> {
        NonZeroUsize::new(max_length)
            .map(Self)
            .ok_or(ConfigError::InvalidLineLimit(max_length))
    }

    pub fn get(self) -> usize {
        self.0.get()
    }
}

/// A label as a chart axis expects it: the original string when it fits, otherwise lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum WrappedLabel {
    Single(String),
    Lines(Vec<String>),
}

impl WrappedLabel {
    pub fn is_wrapped(&self) -> bool {
        matches!(self, Self::Lines(_))
    }

    pub fn lines(&self) -> Vec<&str> {
        match self {
            Self::Single(label) => vec![label.as_str()],
            Self::Lines(lines) => lines.iter().map(String::as_str).collect(),
        }
    }

    /// The full label text, e.g. for a tooltip title.
    pub fn joined(&self) -> String {
        match self {
            Self::Single(label) => label.clone(),
            Self::Lines(lines) => lines.concat(),
        }
    }
}

pub fn wrap_labels<S: AsRef<str>>(labels: &[S], limit: LineLimit) -> Vec<WrappedLabel> {
    let segment_re = Regex::new(SEGMENT_PATTERN).expect("valid regex");
    labels
        .iter()
        .map(|label| wrap_with(&segment_re, label.as_ref(), limit))
        .collect()
}

pub fn wrap_label(label: &str, limit: LineLimit) -> WrappedLabel {
    let segment_re = Regex::new(SEGMENT_PATTERN).expect("valid regex");
    wrap_with(&segment_re, label, limit)
}

fn wrap_with(segment_re: &Regex, label: &str, limit: LineLimit) -> WrappedLabel {
    let max = limit.get();
    if label.chars().count() <= max {
        return WrappedLabel::Single(label.to_string());
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for segment in segments(segment_re, label) {
        let segment_len = segment.chars().count();

        if segment_len > max {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let chars: Vec<char> = segment.chars().collect();
            let mut chunks = chars.chunks(max).peekable();
            while let Some(chunk) = chunks.next() {
                let chunk: String = chunk.iter().collect();
                if chunks.peek().is_some() {
                    lines.push(chunk);
                } else {
                    current_len = chunk.chars().count();
                    current = chunk;
                }
            }
            continue;
        }

        if current_len + segment_len > max && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        current.push_str(segment);
        current_len += segment_len;
    }

    if !current.is_empty() {
        lines.push(current);
    }

    WrappedLabel::Lines(lines)
}

fn segments<'a>(segment_re: &'a Regex, label: &'a str) -> impl Iterator<Item = &'a str> {
    segment_re
        .find_iter(label)
        .map(|m| m.as_str())
        .filter(|s| !s.is_empty())
}
