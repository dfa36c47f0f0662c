//! Error construction for query failures.
//!
//! Both error kinds carry the strategy's description followed by a rendered
//! snapshot of the search root, separated by a blank line. The two sections
//! are joined only when both are non-empty, so suppressed snapshots leave
//! the bare description.

use crate::result::BuscarError;
use crate::snapshot::{SnapshotOptions, SnapshotTarget};

/// Fixed hint appended to every multiple-elements error
pub const MULTIPLE_FOUND_HINT: &str = "(If this is intentional, then use the `*_all_by_*` variant \
     of the query (like `query_all_by_attribute` or `get_all_by_attribute`)).";

/// Build a missing-element error from a description and the search root
pub fn element_error<R: SnapshotTarget>(
    message: &str,
    root: &R,
    options: &SnapshotOptions,
) -> BuscarError {
    BuscarError::ElementNotFound {
        message: compose(message, root, options),
    }
}

/// Build a multiple-elements error: description, the `*_all_by_*` hint,
/// then the search root snapshot
pub fn multiple_found_error<R: SnapshotTarget>(
    message: &str,
    root: &R,
    options: &SnapshotOptions,
) -> BuscarError {
    let message = format!("{message}\n\n{MULTIPLE_FOUND_HINT}");
    BuscarError::MultipleElementsFound {
        message: compose(&message, root, options),
    }
}

fn compose<R: SnapshotTarget>(message: &str, root: &R, options: &SnapshotOptions) -> String {
    let snapshot = root.render_snapshot(options);
    [message, snapshot.as_str()]
        .iter()
        .filter(|section| !section.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Document, Element};
    use crate::snapshot::OutputMode;

    fn doc() -> Document {
        let mut doc = Document::new("body");
        doc.append_child(
            doc.root(),
            Element::new("div").with_attribute("data-testid", "foo"),
        );
        doc
    }

    fn plain() -> SnapshotOptions {
        SnapshotOptions::new().with_mode(OutputMode::Plain)
    }

    #[test]
    fn test_element_error_attaches_snapshot() {
        let err = element_error("Unable to find an element by: [data-testid=foo]", &doc(), &plain());
        let message = err.message();
        assert!(err.is_not_found());
        assert!(message.starts_with("Unable to find an element by: [data-testid=foo]\n\n"));
        assert!(message.contains("<body>"));
    }

    #[test]
    fn test_suppressed_snapshot_leaves_bare_message() {
        let options = SnapshotOptions::new().with_mode(OutputMode::Suppressed);
        let err = element_error("Unable to find it", &doc(), &options);
        assert_eq!(err.message(), "Unable to find it");
    }

    #[test]
    fn test_empty_message_leaves_bare_snapshot() {
        let err = element_error("", &doc(), &plain());
        assert!(err.message().starts_with("<body>"));
        assert!(!err.message().starts_with("\n\n"));
    }

    #[test]
    fn test_multiple_error_appends_hint_before_snapshot() {
        let err = multiple_found_error("Found multiple elements by [data-testid=foo]", &doc(), &plain());
        let message = err.message();
        assert!(err.is_multiple());
        let hint_at = message.find(MULTIPLE_FOUND_HINT).unwrap();
        let snapshot_at = message.find("<body>").unwrap();
        assert!(hint_at < snapshot_at);
        assert!(message.starts_with("Found multiple elements by [data-testid=foo]\n\n"));
    }
}
