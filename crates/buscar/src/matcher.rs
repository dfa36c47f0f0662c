//! Text matching and normalization.
//!
//! Candidate text (an attribute value, in the attribute strategy) is
//! normalized once per query, then compared against a [`TextTarget`] by the
//! exact or fuzzy matcher. Which matcher runs is selected by
//! [`MatchOptions::exact`].

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::dom::Element;

/// Caller-supplied normalization function
pub type CustomNormalizer = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Caller-supplied match predicate, receiving the normalized candidate text
/// and the element it came from
pub type MatchPredicate = Arc<dyn Fn(&str, &Element) -> bool + Send + Sync>;

/// A target to match candidate text against
#[derive(Clone)]
pub enum TextTarget {
    /// A literal string, compared per the exact/fuzzy policy
    Text(String),
    /// A regular expression run against the normalized candidate
    Pattern(Regex),
    /// An arbitrary predicate over (normalized candidate, element)
    Predicate(MatchPredicate),
}

impl TextTarget {
    /// Create a literal text target
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Create a pattern target
    #[must_use]
    pub const fn pattern(pattern: Regex) -> Self {
        Self::Pattern(pattern)
    }

    /// Create a predicate target
    pub fn predicate(pred: impl Fn(&str, &Element) -> bool + Send + Sync + 'static) -> Self {
        Self::Predicate(Arc::new(pred))
    }
}

impl fmt::Debug for TextTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(t) => f.debug_tuple("Text").field(t).finish(),
            Self::Pattern(p) => f.debug_tuple("Pattern").field(&p.as_str()).finish(),
            Self::Predicate(_) => f.debug_tuple("Predicate").finish(),
        }
    }
}

impl fmt::Display for TextTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(t) => f.write_str(t),
            Self::Pattern(p) => write!(f, "/{}/", p.as_str()),
            Self::Predicate(_) => f.write_str("<predicate>"),
        }
    }
}

impl From<&str> for TextTarget {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for TextTarget {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Regex> for TextTarget {
    fn from(pattern: Regex) -> Self {
        Self::Pattern(pattern)
    }
}

/// Options controlling matching and normalization.
///
/// Resolved once per query into a [`Normalizer`]; never mutated afterwards.
/// A custom `normalizer` takes precedence over the built-in whitespace
/// rules, which are then ignored.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchOptions {
    /// Strict equality after normalization; fuzzy substring match otherwise
    pub exact: bool,
    /// Collapse runs of whitespace to a single space
    pub collapse_whitespace: bool,
    /// Trim leading/trailing whitespace
    pub trim: bool,
    /// Caller-supplied replacement for the built-in normalization
    #[serde(skip)]
    pub normalizer: Option<CustomNormalizer>,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            exact: true,
            collapse_whitespace: true,
            trim: true,
            normalizer: None,
        }
    }
}

impl MatchOptions {
    /// Create options with defaults (exact, trimmed, collapsed)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set exact matching on or off
    #[must_use]
    pub const fn with_exact(mut self, exact: bool) -> Self {
        self.exact = exact;
        self
    }

    /// Set whitespace collapsing
    #[must_use]
    pub const fn with_collapse_whitespace(mut self, collapse: bool) -> Self {
        self.collapse_whitespace = collapse;
        self
    }

    /// Set trimming
    #[must_use]
    pub const fn with_trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    /// Install a custom normalizer (overrides the whitespace rules)
    #[must_use]
    pub fn with_normalizer(
        mut self,
        normalizer: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.normalizer = Some(Arc::new(normalizer));
        self
    }
}

impl fmt::Debug for MatchOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchOptions")
            .field("exact", &self.exact)
            .field("collapse_whitespace", &self.collapse_whitespace)
            .field("trim", &self.trim)
            .field("normalizer", &self.normalizer.as_ref().map(|_| "<custom>"))
            .finish()
    }
}

/// A resolved normalization function
#[derive(Clone)]
pub enum Normalizer {
    /// Built-in whitespace normalization
    Builtin {
        /// Collapse runs of whitespace to a single space
        collapse_whitespace: bool,
        /// Trim leading/trailing whitespace
        trim: bool,
    },
    /// Caller-supplied normalization
    Custom(CustomNormalizer),
}

impl Normalizer {
    /// Resolve the normalizer for a set of options
    #[must_use]
    pub fn from_options(options: &MatchOptions) -> Self {
        match &options.normalizer {
            Some(custom) => Self::Custom(Arc::clone(custom)),
            None => Self::Builtin {
                collapse_whitespace: options.collapse_whitespace,
                trim: options.trim,
            },
        }
    }

    /// Map raw candidate text to its canonical comparable form
    #[must_use]
    pub fn normalize(&self, raw: &str) -> String {
        match self {
            Self::Custom(custom) => custom(raw),
            Self::Builtin {
                collapse_whitespace,
                trim,
            } => {
                let mut text = if *trim {
                    raw.trim().to_string()
                } else {
                    raw.to_string()
                };
                if *collapse_whitespace {
                    text = collapse_ws(&text);
                }
                text
            }
        }
    }
}

impl fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin {
                collapse_whitespace,
                trim,
            } => f
                .debug_struct("Builtin")
                .field("collapse_whitespace", collapse_whitespace)
                .field("trim", trim)
                .finish(),
            Self::Custom(_) => f.debug_tuple("Custom").finish(),
        }
    }
}

fn collapse_ws(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_whitespace = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                out.push(' ');
            }
            in_whitespace = true;
        } else {
            out.push(ch);
            in_whitespace = false;
        }
    }
    out
}

/// Strict matcher: the normalized candidate must satisfy the target exactly
#[must_use]
pub fn matches(
    candidate: &str,
    element: &Element,
    target: &TextTarget,
    normalizer: &Normalizer,
) -> bool {
    let normalized = normalizer.normalize(candidate);
    match target {
        TextTarget::Text(text) => normalized == *text,
        TextTarget::Pattern(pattern) => pattern.is_match(&normalized),
        TextTarget::Predicate(pred) => pred(&normalized, element),
    }
}

/// Fuzzy matcher: case-insensitive substring containment for string targets.
///
/// Pattern and predicate targets carry their own matching policy, so the
/// fuzzy flag does not change their behavior.
#[must_use]
pub fn fuzzy_matches(
    candidate: &str,
    element: &Element,
    target: &TextTarget,
    normalizer: &Normalizer,
) -> bool {
    let normalized = normalizer.normalize(candidate);
    match target {
        TextTarget::Text(text) => normalized.to_lowercase().contains(&text.to_lowercase()),
        TextTarget::Pattern(pattern) => pattern.is_match(&normalized),
        TextTarget::Predicate(pred) => pred(&normalized, element),
    }
}
