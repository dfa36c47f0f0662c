//! Cardinality and retry combinators over find-all primitives.
//!
//! A search strategy supplies one "find all matching elements" function and
//! two error descriptions; everything else — `query_by`, `get_all_by`,
//! `get_by`, `find_all_by`, `find_by` — is derived here. The combinators
//! are generic over the root type `R`, the strategy's typed argument
//! struct `A`, and the element handle `T`, so any strategy and any root
//! representation plug in.
//!
//! `get_by` is deliberately built on top of `get_all_by` rather than
//! written independently: its missing-element wording always comes from
//! the "all" variant, and its multiple-element wording is shared with
//! `query_by`, so the two never drift apart for the same strategy.

use std::fmt;

use tracing::{debug, trace};

use crate::diagnostics::{element_error, multiple_found_error};
use crate::result::BuscarResult;
use crate::snapshot::{SnapshotOptions, SnapshotTarget};
use crate::wait::{wait_for, Probe, WaitOptions};

/// Shared "at most one" check so `query_by` and `get_by` build the
/// ambiguity error identically
fn check_at_most_one<R, A, T, D>(
    els: &[T],
    root: &R,
    args: &A,
    describe_multiple: &D,
    snapshot: &SnapshotOptions,
) -> BuscarResult<()>
where
    R: SnapshotTarget,
    D: Fn(&R, &A) -> String,
{
    if els.len() > 1 {
        debug!(matches = els.len(), "ambiguous match");
        return Err(multiple_found_error(
            &describe_multiple(root, args),
            root,
            snapshot,
        ));
    }
    Ok(())
}

/// Wraps a find-all primitive with "at most one" semantics (`query_by`).
///
/// Zero matches is a valid outcome (`Ok(None)`); more than one is an
/// error described by the supplied function.
#[derive(Clone)]
pub struct SingleQuery<F, D> {
    all_query: F,
    describe_multiple: D,
    snapshot: SnapshotOptions,
}

impl<F, D> SingleQuery<F, D> {
    /// Create the combinator from a find-all primitive and an ambiguity
    /// description
    pub fn new(all_query: F, describe_multiple: D) -> Self {
        Self {
            all_query,
            describe_multiple,
            snapshot: SnapshotOptions::default(),
        }
    }

    /// Set the snapshot options used for error diagnostics
    #[must_use]
    pub fn with_snapshot(mut self, snapshot: SnapshotOptions) -> Self {
        self.snapshot = snapshot;
        self
    }

    /// Run the wrapped primitive and enforce "at most one"
    pub fn run<R, A, T>(&self, root: &R, args: &A) -> BuscarResult<Option<T>>
    where
        R: SnapshotTarget,
        F: Fn(&R, &A) -> Vec<T>,
        D: Fn(&R, &A) -> String,
    {
        let els = (self.all_query)(root, args);
        trace!(matches = els.len(), "single query");
        check_at_most_one(&els, root, args, &self.describe_multiple, &self.snapshot)?;
        Ok(els.into_iter().next())
    }
}

impl<F, D> fmt::Debug for SingleQuery<F, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleQuery")
            .field("snapshot", &self.snapshot)
            .finish_non_exhaustive()
    }
}

/// Wraps a find-all primitive with "at least one" semantics (`get_all_by`).
///
/// An empty result set is an error described by the supplied function;
/// otherwise the full set passes through untouched, in document order.
#[derive(Clone)]
pub struct GetAllQuery<F, D> {
    all_query: F,
    describe_missing: D,
    snapshot: SnapshotOptions,
}

impl<F, D> GetAllQuery<F, D> {
    /// Create the combinator from a find-all primitive and a
    /// missing-element description
    pub fn new(all_query: F, describe_missing: D) -> Self {
        Self {
            all_query,
            describe_missing,
            snapshot: SnapshotOptions::default(),
        }
    }

    /// Set the snapshot options used for error diagnostics
    #[must_use]
    pub fn with_snapshot(mut self, snapshot: SnapshotOptions) -> Self {
        self.snapshot = snapshot;
        self
    }

    /// Run the wrapped primitive and enforce "at least one"
    pub fn run<R, A, T>(&self, root: &R, args: &A) -> BuscarResult<Vec<T>>
    where
        R: SnapshotTarget,
        F: Fn(&R, &A) -> Vec<T>,
        D: Fn(&R, &A) -> String,
    {
        let els = (self.all_query)(root, args);
        trace!(matches = els.len(), "get-all query");
        if els.is_empty() {
            return Err(element_error(
                &(self.describe_missing)(root, args),
                root,
                &self.snapshot,
            ));
        }
        Ok(els)
    }
}

impl<F, D> fmt::Debug for GetAllQuery<F, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GetAllQuery")
            .field("snapshot", &self.snapshot)
            .finish_non_exhaustive()
    }
}

/// The "exactly one" composition (`get_by`): [`GetAllQuery`] supplies the
/// zero-match error, then the shared at-most-one check supplies the
/// ambiguity error.
#[derive(Clone)]
pub struct GetQuery<F, DMulti, DMissing> {
    get_all: GetAllQuery<F, DMissing>,
    describe_multiple: DMulti,
    snapshot: SnapshotOptions,
}

impl<F, DMulti, DMissing> GetQuery<F, DMulti, DMissing> {
    /// Create the composed combinator
    pub fn new(all_query: F, describe_multiple: DMulti, describe_missing: DMissing) -> Self {
        Self {
            get_all: GetAllQuery::new(all_query, describe_missing),
            describe_multiple,
            snapshot: SnapshotOptions::default(),
        }
    }

    /// Set the snapshot options used for error diagnostics
    #[must_use]
    pub fn with_snapshot(mut self, snapshot: SnapshotOptions) -> Self {
        self.get_all = self.get_all.with_snapshot(snapshot.clone());
        self.snapshot = snapshot;
        self
    }

    /// Run the composition: error on zero or more than one match
    pub fn run<R, A, T>(&self, root: &R, args: &A) -> BuscarResult<T>
    where
        R: SnapshotTarget,
        F: Fn(&R, &A) -> Vec<T>,
        DMulti: Fn(&R, &A) -> String,
        DMissing: Fn(&R, &A) -> String,
    {
        let mut els = self.get_all.run(root, args)?;
        check_at_most_one(&els, root, args, &self.describe_multiple, &self.snapshot)?;
        // get_all guarantees at least one element
        Ok(els.swap_remove(0))
    }
}

impl<F, DMulti, DMissing> fmt::Debug for GetQuery<F, DMulti, DMissing> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GetQuery")
            .field("snapshot", &self.snapshot)
            .finish_non_exhaustive()
    }
}

/// Wraps a single-result getter into a retrying lookup (`find_by`).
///
/// Every getter error is a retry signal until the timeout elapses, at
/// which point the last error propagates unchanged. Success is typed —
/// a resolved find always carries a genuine element.
#[derive(Clone)]
pub struct FindQuery<G> {
    getter: G,
}

impl<G> FindQuery<G> {
    /// Create the combinator from a fallible getter
    pub fn new(getter: G) -> Self {
        Self { getter }
    }

    /// Poll the getter until it succeeds or `wait` times out
    pub fn run<R, A, T>(&self, root: &R, args: &A, wait: &WaitOptions) -> BuscarResult<T>
    where
        G: Fn(&R, &A) -> BuscarResult<T>,
    {
        wait_for(|| Probe::from((self.getter)(root, args)), wait)
    }
}

impl<G> fmt::Debug for FindQuery<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FindQuery").finish_non_exhaustive()
    }
}

/// The five standard variants derived from one find-all primitive.
///
/// Built by [`build_queries`]; holds the composed combinators so the
/// missing/multiple wording is fixed once per strategy.
#[derive(Clone)]
pub struct Queries<F, DMulti, DMissing> {
    query_all: F,
    single: SingleQuery<F, DMulti>,
    get_all: GetAllQuery<F, DMissing>,
    get: GetQuery<F, DMulti, DMissing>,
}

/// Compose the standard query family for a search strategy.
///
/// `query_all` is the strategy's find-all primitive; `describe_multiple`
/// and `describe_missing` produce the strategy-specific error wording.
pub fn build_queries<F, DMulti, DMissing>(
    query_all: F,
    describe_multiple: DMulti,
    describe_missing: DMissing,
) -> Queries<F, DMulti, DMissing>
where
    F: Clone,
    DMulti: Clone,
    DMissing: Clone,
{
    Queries {
        single: SingleQuery::new(query_all.clone(), describe_multiple.clone()),
        get_all: GetAllQuery::new(query_all.clone(), describe_missing.clone()),
        get: GetQuery::new(query_all.clone(), describe_multiple, describe_missing),
        query_all,
    }
}

impl<F, DMulti, DMissing> Queries<F, DMulti, DMissing> {
    /// Set the snapshot options used for error diagnostics on every variant
    #[must_use]
    pub fn with_snapshot(mut self, snapshot: SnapshotOptions) -> Self {
        self.single = self.single.with_snapshot(snapshot.clone());
        self.get_all = self.get_all.with_snapshot(snapshot.clone());
        self.get = self.get.with_snapshot(snapshot);
        self
    }

    /// All matching elements; empty is a valid outcome
    pub fn query_all_by<R, A, T>(&self, root: &R, args: &A) -> Vec<T>
    where
        F: Fn(&R, &A) -> Vec<T>,
    {
        (self.query_all)(root, args)
    }

    /// At most one element: `Ok(None)` on zero, error on more than one
    pub fn query_by<R, A, T>(&self, root: &R, args: &A) -> BuscarResult<Option<T>>
    where
        R: SnapshotTarget,
        F: Fn(&R, &A) -> Vec<T>,
        DMulti: Fn(&R, &A) -> String,
    {
        self.single.run(root, args)
    }

    /// At least one element: error on zero, full set otherwise
    pub fn get_all_by<R, A, T>(&self, root: &R, args: &A) -> BuscarResult<Vec<T>>
    where
        R: SnapshotTarget,
        F: Fn(&R, &A) -> Vec<T>,
        DMissing: Fn(&R, &A) -> String,
    {
        self.get_all.run(root, args)
    }

    /// Exactly one element: error on zero or more than one
    pub fn get_by<R, A, T>(&self, root: &R, args: &A) -> BuscarResult<T>
    where
        R: SnapshotTarget,
        F: Fn(&R, &A) -> Vec<T>,
        DMulti: Fn(&R, &A) -> String,
        DMissing: Fn(&R, &A) -> String,
    {
        self.get.run(root, args)
    }

    /// Retrying `get_by`: polls until exactly one element or timeout
    pub fn find_by<R, A, T>(&self, root: &R, args: &A, wait: &WaitOptions) -> BuscarResult<T>
    where
        R: SnapshotTarget,
        F: Fn(&R, &A) -> Vec<T>,
        DMulti: Fn(&R, &A) -> String,
        DMissing: Fn(&R, &A) -> String,
    {
        let finder = FindQuery::new(|root: &R, args: &A| self.get.run(root, args));
        finder.run(root, args, wait)
    }

    /// Retrying `get_all_by`: polls until at least one element or timeout
    pub fn find_all_by<R, A, T>(
        &self,
        root: &R,
        args: &A,
        wait: &WaitOptions,
    ) -> BuscarResult<Vec<T>>
    where
        R: SnapshotTarget,
        F: Fn(&R, &A) -> Vec<T>,
        DMissing: Fn(&R, &A) -> String,
    {
        let finder = FindQuery::new(|root: &R, args: &A| self.get_all.run(root, args));
        finder.run(root, args, wait)
    }
}

impl<F, DMulti, DMissing> fmt::Debug for Queries<F, DMulti, DMissing> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Queries").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::MULTIPLE_FOUND_HINT;
    use crate::dom::{Document, NodeId};
    use crate::snapshot::OutputMode;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    /// Synthetic find-all primitive: "matches" as many elements as the
    /// argument asks for. Exercises the cardinality table without a real
    /// strategy.
    fn counted(_root: &Document, count: &usize) -> Vec<NodeId> {
        (0..*count as NodeId).collect()
    }

    fn describe_multiple(_root: &Document, count: &usize) -> String {
        format!("Found multiple elements matching count {count}")
    }

    fn describe_missing(_root: &Document, count: &usize) -> String {
        format!("Unable to find an element matching count {count}")
    }

    type CountedQueries = Queries<
        fn(&Document, &usize) -> Vec<NodeId>,
        fn(&Document, &usize) -> String,
        fn(&Document, &usize) -> String,
    >;

    fn queries() -> CountedQueries {
        build_queries(
            counted as fn(&Document, &usize) -> Vec<NodeId>,
            describe_multiple as fn(&Document, &usize) -> String,
            describe_missing as fn(&Document, &usize) -> String,
        )
        .with_snapshot(SnapshotOptions::new().with_mode(OutputMode::Plain))
    }

    mod single_query_tests {
        use super::*;

        #[test]
        fn test_zero_matches_is_none() {
            let single = SingleQuery::new(counted, describe_multiple);
            let result = single.run(&Document::default(), &0).unwrap();
            assert_eq!(result, None);
        }

        #[test]
        fn test_one_match_is_returned() {
            let single = SingleQuery::new(counted, describe_multiple);
            let result = single.run(&Document::default(), &1).unwrap();
            assert_eq!(result, Some(0));
        }

        #[test]
        fn test_many_matches_is_error() {
            let single = SingleQuery::new(counted, describe_multiple);
            let err = single.run(&Document::default(), &3).unwrap_err();
            assert!(err.is_multiple());
            assert!(err.message().contains("matching count 3"));
            assert!(err.message().contains(MULTIPLE_FOUND_HINT));
        }
    }

    mod get_all_query_tests {
        use super::*;

        #[test]
        fn test_zero_matches_is_error() {
            let get_all = GetAllQuery::new(counted, describe_missing);
            let err = get_all.run(&Document::default(), &0).unwrap_err();
            assert!(err.is_not_found());
            assert!(err.message().contains("Unable to find an element"));
        }

        #[test]
        fn test_nonempty_set_passes_through_in_order() {
            let get_all = GetAllQuery::new(counted, describe_missing);
            let els = get_all.run(&Document::default(), &4).unwrap();
            assert_eq!(els, vec![0, 1, 2, 3]);
        }
    }

    mod get_query_tests {
        use super::*;

        #[test]
        fn test_zero_matches_uses_missing_wording() {
            let get = GetQuery::new(counted, describe_multiple, describe_missing);
            let err = get.run(&Document::default(), &0).unwrap_err();
            assert!(err.is_not_found());
            assert!(err.message().contains("Unable to find an element matching count 0"));
        }

        #[test]
        fn test_one_match_is_returned() {
            let get = GetQuery::new(counted, describe_multiple, describe_missing);
            assert_eq!(get.run(&Document::default(), &1).unwrap(), 0);
        }

        #[test]
        fn test_many_matches_uses_multiple_wording() {
            let get = GetQuery::new(counted, describe_multiple, describe_missing);
            let err = get.run(&Document::default(), &2).unwrap_err();
            assert!(err.is_multiple());
            assert!(err.message().contains("Found multiple elements matching count 2"));
        }

        #[test]
        fn test_error_carries_snapshot() {
            let get = GetQuery::new(counted, describe_multiple, describe_missing)
                .with_snapshot(SnapshotOptions::new().with_mode(OutputMode::Plain));
            let err = get.run(&Document::default(), &0).unwrap_err();
            assert!(err.message().contains("<body"));
        }
    }

    mod find_query_tests {
        use super::*;

        #[test]
        fn test_resolves_immediately_when_present() {
            let get = GetQuery::new(counted, describe_multiple, describe_missing);
            let finder = FindQuery::new(|root: &Document, args: &usize| get.run(root, args));
            let result = finder.run(&Document::default(), &1, &WaitOptions::default());
            assert_eq!(result.unwrap(), 0);
        }

        #[test]
        fn test_times_out_with_last_getter_error() {
            let get = GetQuery::new(counted, describe_multiple, describe_missing);
            let finder = FindQuery::new(|root: &Document, args: &usize| get.run(root, args));
            let wait = WaitOptions::new().with_timeout(50).with_poll_interval(10);
            let start = Instant::now();
            let err = finder.run(&Document::default(), &0, &wait).unwrap_err();
            assert!(err.is_not_found());
            assert!(start.elapsed() >= Duration::from_millis(50));
        }

        #[test]
        fn test_multiple_matches_reject_with_multiple_error() {
            let get = GetQuery::new(counted, describe_multiple, describe_missing);
            let finder = FindQuery::new(|root: &Document, args: &usize| get.run(root, args));
            let wait = WaitOptions::new().with_timeout(50).with_poll_interval(10);
            let err = finder.run(&Document::default(), &2, &wait).unwrap_err();
            assert!(err.is_multiple());
        }
    }

    mod family_tests {
        use super::*;

        #[test]
        fn test_one_match_agrees_across_variants() {
            let queries = queries();
            let doc = Document::default();
            let wait = WaitOptions::new().with_timeout(100).with_poll_interval(10);
            assert_eq!(queries.query_by(&doc, &1).unwrap(), Some(0));
            assert_eq!(queries.get_by(&doc, &1).unwrap(), 0);
            assert_eq!(queries.get_all_by(&doc, &1).unwrap(), vec![0]);
            assert_eq!(queries.find_by(&doc, &1, &wait).unwrap(), 0);
            assert_eq!(queries.find_all_by(&doc, &1, &wait).unwrap(), vec![0]);
        }

        #[test]
        fn test_zero_matches_per_variant() {
            let queries = queries();
            let doc = Document::default();
            let wait = WaitOptions::new().with_timeout(50).with_poll_interval(10);
            assert_eq!(queries.query_by(&doc, &0).unwrap(), None);
            assert!(queries.get_by(&doc, &0).unwrap_err().is_not_found());
            assert!(queries.get_all_by(&doc, &0).unwrap_err().is_not_found());
            assert!(queries.find_by(&doc, &0, &wait).unwrap_err().is_not_found());
            assert!(queries
                .find_all_by(&doc, &0, &wait)
                .unwrap_err()
                .is_not_found());
        }

        #[test]
        fn test_many_matches_per_variant() {
            let queries = queries();
            let doc = Document::default();
            let wait = WaitOptions::new().with_timeout(50).with_poll_interval(10);
            assert!(queries.query_by(&doc, &3).unwrap_err().is_multiple());
            assert!(queries.get_by(&doc, &3).unwrap_err().is_multiple());
            assert!(queries.find_by(&doc, &3, &wait).unwrap_err().is_multiple());
            assert_eq!(queries.get_all_by(&doc, &3).unwrap(), vec![0, 1, 2]);
            assert_eq!(queries.query_all_by(&doc, &3), vec![0, 1, 2]);
            assert_eq!(queries.find_all_by(&doc, &3, &wait).unwrap(), vec![0, 1, 2]);
        }

        #[test]
        fn test_synchronous_variants_are_idempotent() {
            let queries = queries();
            let doc = Document::default();
            assert_eq!(queries.query_all_by(&doc, &2), queries.query_all_by(&doc, &2));
            assert_eq!(
                queries.get_all_by(&doc, &2).unwrap(),
                queries.get_all_by(&doc, &2).unwrap()
            );
            assert_eq!(
                queries.query_by(&doc, &1).unwrap(),
                queries.query_by(&doc, &1).unwrap()
            );
        }

        #[test]
        fn test_query_by_and_get_by_share_multiple_wording() {
            let queries = queries();
            let doc = Document::default();
            let query_err = queries.query_by(&doc, &2).unwrap_err().message();
            let get_err = queries.get_by(&doc, &2).unwrap_err().message();
            assert_eq!(query_err, get_err);
        }
    }

    mod live_root_tests {
        use super::*;
        use crate::snapshot::SnapshotTarget;

        /// A root whose match count changes underneath the polling loop.
        struct LiveRoot {
            count: AtomicUsize,
        }

        impl SnapshotTarget for LiveRoot {
            fn render_snapshot(&self, _options: &SnapshotOptions) -> String {
                format!("<live count={} />", self.count.load(Ordering::SeqCst))
            }
        }

        fn live_all(root: &LiveRoot, _args: &()) -> Vec<NodeId> {
            (0..root.count.load(Ordering::SeqCst) as NodeId).collect()
        }

        fn live_multiple(_root: &LiveRoot, _args: &()) -> String {
            "Found multiple live elements".into()
        }

        fn live_missing(_root: &LiveRoot, _args: &()) -> String {
            "Unable to find a live element".into()
        }

        #[test]
        fn test_find_by_resolves_once_element_appears() {
            let root = Arc::new(LiveRoot {
                count: AtomicUsize::new(0),
            });
            let mutator = Arc::clone(&root);
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(20));
                mutator.count.store(1, Ordering::SeqCst);
            });

            let queries = build_queries(
                live_all as fn(&LiveRoot, &()) -> Vec<NodeId>,
                live_multiple as fn(&LiveRoot, &()) -> String,
                live_missing as fn(&LiveRoot, &()) -> String,
            );
            let wait = WaitOptions::new().with_timeout(500).with_poll_interval(10);
            let start = Instant::now();
            let found = queries.find_by(&*root, &(), &wait).unwrap();
            assert_eq!(found, 0);
            assert!(start.elapsed() < Duration::from_millis(400));
        }

        #[test]
        fn test_find_by_rejects_when_nothing_appears() {
            let root = LiveRoot {
                count: AtomicUsize::new(0),
            };
            let queries = build_queries(
                live_all as fn(&LiveRoot, &()) -> Vec<NodeId>,
                live_multiple as fn(&LiveRoot, &()) -> String,
                live_missing as fn(&LiveRoot, &()) -> String,
            );
            let wait = WaitOptions::new().with_timeout(50).with_poll_interval(10);
            let err = queries.find_by(&root, &(), &wait).unwrap_err();
            assert!(err.message().contains("Unable to find a live element"));
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_cardinality_table_holds(count in 0usize..20) {
                let queries = queries();
                let doc = Document::default();

                let all = queries.query_all_by(&doc, &count);
                prop_assert_eq!(all.len(), count);

                match count {
                    0 => {
                        prop_assert!(queries.query_by(&doc, &count).unwrap().is_none());
                        prop_assert!(queries.get_by(&doc, &count).unwrap_err().is_not_found());
                        prop_assert!(queries.get_all_by(&doc, &count).unwrap_err().is_not_found());
                    }
                    1 => {
                        prop_assert_eq!(queries.query_by(&doc, &count).unwrap(), Some(0));
                        prop_assert_eq!(queries.get_by(&doc, &count).unwrap(), 0);
                        prop_assert_eq!(queries.get_all_by(&doc, &count).unwrap(), vec![0]);
                    }
                    n => {
                        prop_assert!(queries.query_by(&doc, &count).unwrap_err().is_multiple());
                        prop_assert!(queries.get_by(&doc, &count).unwrap_err().is_multiple());
                        let els = queries.get_all_by(&doc, &count).unwrap();
                        prop_assert_eq!(els.len(), n);
                    }
                }
            }
        }
    }
}
