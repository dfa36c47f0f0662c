//! Attribute-based query strategy.
//!
//! The one concrete strategy shipped with the crate: find elements whose
//! named attribute matches a text target. It exists both as the standard
//! way to locate `data-testid`-style hooks and as the reference for how a
//! strategy plugs its find-all primitive into [`build_queries`].

use tracing::trace;

use crate::dom::{NodeId, Scope};
use crate::matcher::{fuzzy_matches, matches, MatchOptions, Normalizer, TextTarget};
use crate::query::{build_queries, Queries, SingleQuery};
use crate::result::BuscarResult;
use crate::wait::WaitOptions;

/// Typed arguments for the attribute query family
#[derive(Debug, Clone)]
pub struct AttributeQuery {
    /// Attribute name to scan for (e.g. "data-testid")
    pub attribute: String,
    /// Target the attribute value must match
    pub target: TextTarget,
    /// Matching and normalization options
    pub options: MatchOptions,
}

impl AttributeQuery {
    /// Create arguments with default match options
    #[must_use]
    pub fn new(attribute: impl Into<String>, target: impl Into<TextTarget>) -> Self {
        Self {
            attribute: attribute.into(),
            target: target.into(),
            options: MatchOptions::default(),
        }
    }

    /// Set the match options
    #[must_use]
    pub fn with_options(mut self, options: MatchOptions) -> Self {
        self.options = options;
        self
    }
}

/// All elements under `scope` carrying `attribute` with a value that
/// satisfies `target`, in document order.
///
/// Zero matches is a valid outcome at this layer, never an error.
#[must_use]
pub fn query_all_by_attribute(
    attribute: &str,
    scope: Scope<'_>,
    target: &TextTarget,
    options: &MatchOptions,
) -> Vec<NodeId> {
    let normalizer = Normalizer::from_options(options);
    let matcher = if options.exact { matches } else { fuzzy_matches };
    let found: Vec<NodeId> = scope
        .descendants()
        .into_iter()
        .filter(|id| {
            let element = scope.element(*id);
            element
                .attribute(attribute)
                .is_some_and(|value| matcher(value, element, target, &normalizer))
        })
        .collect();
    trace!(attribute, matches = found.len(), "attribute scan");
    found
}

fn all_by_attribute(scope: &Scope<'_>, args: &AttributeQuery) -> Vec<NodeId> {
    query_all_by_attribute(&args.attribute, *scope, &args.target, &args.options)
}

fn describe_multiple(_scope: &Scope<'_>, args: &AttributeQuery) -> String {
    format!(
        "Found multiple elements by [{}={}]",
        args.attribute, args.target
    )
}

fn describe_missing(_scope: &Scope<'_>, args: &AttributeQuery) -> String {
    format!(
        "Unable to find an element by: [{}={}]",
        args.attribute, args.target
    )
}

/// Find-all primitive signature for the attribute strategy
pub type AttributeAllQuery = fn(&Scope<'_>, &AttributeQuery) -> Vec<NodeId>;

/// Error-description signature for the attribute strategy
pub type AttributeDescribe = fn(&Scope<'_>, &AttributeQuery) -> String;

/// The standard query family for the attribute strategy
#[must_use]
pub fn attribute_queries() -> Queries<AttributeAllQuery, AttributeDescribe, AttributeDescribe> {
    build_queries(
        all_by_attribute as AttributeAllQuery,
        describe_multiple as AttributeDescribe,
        describe_missing as AttributeDescribe,
    )
}

/// At most one element by attribute: `Ok(None)` on zero matches, a
/// multiple-elements error on more than one.
///
/// Derived from the generic [`SingleQuery`] combinator so the error
/// wording is identical to the built family's.
pub fn query_by_attribute(
    attribute: &str,
    scope: Scope<'_>,
    target: &TextTarget,
    options: &MatchOptions,
) -> BuscarResult<Option<NodeId>> {
    let args = AttributeQuery::new(attribute, target.clone()).with_options(options.clone());
    SingleQuery::new(all_by_attribute as AttributeAllQuery, describe_multiple as AttributeDescribe)
        .run(&scope, &args)
}

/// Exactly one element by attribute: error on zero or more than one
pub fn get_by_attribute(
    attribute: &str,
    scope: Scope<'_>,
    target: &TextTarget,
    options: &MatchOptions,
) -> BuscarResult<NodeId> {
    let args = AttributeQuery::new(attribute, target.clone()).with_options(options.clone());
    attribute_queries().get_by(&scope, &args)
}

/// At least one element by attribute: error on zero matches
pub fn get_all_by_attribute(
    attribute: &str,
    scope: Scope<'_>,
    target: &TextTarget,
    options: &MatchOptions,
) -> BuscarResult<Vec<NodeId>> {
    let args = AttributeQuery::new(attribute, target.clone()).with_options(options.clone());
    attribute_queries().get_all_by(&scope, &args)
}

/// Retrying `get_by_attribute` under `wait`
pub fn find_by_attribute(
    attribute: &str,
    scope: Scope<'_>,
    target: &TextTarget,
    options: &MatchOptions,
    wait: &WaitOptions,
) -> BuscarResult<NodeId> {
    let args = AttributeQuery::new(attribute, target.clone()).with_options(options.clone());
    attribute_queries().find_by(&scope, &args, wait)
}

/// Retrying `get_all_by_attribute` under `wait`
pub fn find_all_by_attribute(
    attribute: &str,
    scope: Scope<'_>,
    target: &TextTarget,
    options: &MatchOptions,
    wait: &WaitOptions,
) -> BuscarResult<Vec<NodeId>> {
    let args = AttributeQuery::new(attribute, target.clone()).with_options(options.clone());
    attribute_queries().find_all_by(&scope, &args, wait)
}
