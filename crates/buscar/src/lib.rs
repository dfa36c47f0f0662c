//! Buscar: Strict Element Query Combinators for DOM-like Trees
//!
//! Buscar (Spanish: "to search/find") derives the standard five-variant
//! lookup family from a single "find all matching elements" primitive,
//! with uniform cardinality, error, and retry semantics.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                      BUSCAR Architecture                         │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌────────────┐    ┌──────────────┐    ┌───────────────────────┐ │
//! │  │ Strategy   │    │ Cardinality  │    │ query_by  / get_by    │ │
//! │  │ (find-all) │───►│ + Retry      │───►│ get_all_by / find_by  │ │
//! │  │            │    │ Combinators  │    │ find_all_by           │ │
//! │  └────────────┘    └──────────────┘    └───────────────────────┘ │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A strategy supplies its find-all primitive and two error descriptions
//! to [`build_queries`] and gains every variant. The attribute strategy
//! ([`query_all_by_attribute`]) ships as the concrete reference.
//!
//! # Example
//!
//! ```
//! use jugar_buscar::{
//!     get_by_attribute, Document, Element, MatchOptions, TextTarget,
//! };
//!
//! let mut doc = Document::new("body");
//! doc.append_child(
//!     doc.root(),
//!     Element::new("button").with_attribute("data-testid", "start"),
//! );
//!
//! let id = get_by_attribute(
//!     "data-testid",
//!     doc.scope(),
//!     &TextTarget::text("start"),
//!     &MatchOptions::default(),
//! )
//! .unwrap();
//! assert_eq!(doc.element(id).tag, "button");
//! ```

#![warn(missing_docs)]

pub mod attribute;
pub mod diagnostics;
pub mod dom;
pub mod matcher;
pub mod query;
pub mod result;
pub mod snapshot;
pub mod wait;

pub use attribute::{
    attribute_queries, find_all_by_attribute, find_by_attribute, get_all_by_attribute,
    get_by_attribute, query_all_by_attribute, query_by_attribute, AttributeAllQuery,
    AttributeDescribe, AttributeQuery,
};
pub use diagnostics::{element_error, multiple_found_error, MULTIPLE_FOUND_HINT};
pub use dom::{Document, Element, NodeId, Scope};
pub use matcher::{
    fuzzy_matches, matches, CustomNormalizer, MatchOptions, MatchPredicate, Normalizer, TextTarget,
};
pub use query::{build_queries, FindQuery, GetAllQuery, GetQuery, Queries, SingleQuery};
pub use result::{BuscarError, BuscarResult};
pub use snapshot::{
    OutputMode, SnapshotOptions, SnapshotTarget, DEFAULT_PRINT_LIMIT, NO_SNAPSHOT_ENV,
    PRINT_LIMIT_ENV,
};
pub use wait::{
    wait_for, Probe, WaitOptions, DEFAULT_FIND_TIMEOUT_MS, DEFAULT_POLL_INTERVAL_MS,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::attribute::*;
    pub use super::diagnostics::*;
    pub use super::dom::*;
    pub use super::matcher::*;
    pub use super::query::*;
    pub use super::result::*;
    pub use super::snapshot::*;
    pub use super::wait::*;
}
