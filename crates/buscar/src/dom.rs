//! In-memory element tree that queries run against.
//!
//! The tree is a flat arena (`Vec<Node>` indexed by [`NodeId`]) so element
//! handles stay `Copy` and survive unrelated mutations. Queries never hold
//! references into the arena across calls; every invocation re-scans.

use serde::{Deserialize, Serialize};

/// Compact node identifier (index into the document arena)
pub type NodeId = u32;

/// Element payload: tag name, ordered attributes, optional text content
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// Tag name (e.g. "button")
    pub tag: String,
    /// Attributes in authoring order
    pub attributes: Vec<(String, String)>,
    /// Direct text content, if any
    pub text: Option<String>,
}

impl Element {
    /// Create a new element with the given tag
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            text: None,
        }
    }

    /// Add an attribute
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Set the text content
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Look up an attribute value by name
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Check whether the element carries the named attribute (any value)
    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }
}

/// A node in the arena: element payload plus tree links
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Node {
    element: Element,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An element tree with a single root.
///
/// Node ids are only meaningful against the document that issued them.
/// Accessors index the arena directly and panic on a foreign id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    /// Create a document whose root has the given tag
    #[must_use]
    pub fn new(root_tag: impl Into<String>) -> Self {
        Self::with_root(Element::new(root_tag))
    }

    /// Create a document from a prepared root element
    #[must_use]
    pub fn with_root(root: Element) -> Self {
        Self {
            nodes: vec![Node {
                element: root,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Id of the document root
    #[must_use]
    pub const fn root(&self) -> NodeId {
        0
    }

    /// Number of elements in the document
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check whether the document holds only its root
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Append an element as the last child of `parent`, returning its id
    pub fn append_child(&mut self, parent: NodeId, element: Element) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(Node {
            element,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent as usize].children.push(id);
        id
    }

    /// Set (or replace) an attribute on an existing element
    pub fn set_attribute(
        &mut self,
        id: NodeId,
        name: impl Into<String>,
        value: impl Into<String>,
    ) {
        let name = name.into();
        let value = value.into();
        let attrs = &mut self.nodes[id as usize].element.attributes;
        if let Some(slot) = attrs.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            attrs.push((name, value));
        }
    }

    /// Remove an attribute from an existing element
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) {
        self.nodes[id as usize]
            .element
            .attributes
            .retain(|(n, _)| n != name);
    }

    /// Set the text content of an existing element
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        self.nodes[id as usize].element.text = Some(text.into());
    }

    /// The element payload for `id`
    #[must_use]
    pub fn element(&self, id: NodeId) -> &Element {
        &self.nodes[id as usize].element
    }

    /// Attribute value of `id`, if present
    #[must_use]
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).attribute(name)
    }

    /// Parent of `id` (None for the root)
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id as usize].parent
    }

    /// Children of `id` in authoring order
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id as usize].children
    }

    /// Descendants of `id` in document (preorder) order.
    ///
    /// The element itself is not included: a scope element is the container
    /// a query searches under, never a candidate.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// A search scope rooted at the document root
    #[must_use]
    pub fn scope(&self) -> Scope<'_> {
        Scope::new(self, self.root())
    }

    /// A search scope rooted at `id`
    #[must_use]
    pub fn scope_at(&self, id: NodeId) -> Scope<'_> {
        Scope::new(self, id)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("body")
    }
}

/// A subtree handle: the search root every query operates against.
///
/// Cheap to copy, supplied per call, never stored by the library.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    doc: &'a Document,
    root: NodeId,
}

impl<'a> Scope<'a> {
    /// Create a scope over `doc` rooted at `root`
    #[must_use]
    pub const fn new(doc: &'a Document, root: NodeId) -> Self {
        Self { doc, root }
    }

    /// The underlying document
    #[must_use]
    pub const fn document(&self) -> &'a Document {
        self.doc
    }

    /// The element the scope is rooted at
    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Candidate elements of this scope in document order
    #[must_use]
    pub fn descendants(&self) -> Vec<NodeId> {
        self.doc.descendants(self.root)
    }

    /// Element payload for `id`
    #[must_use]
    pub fn element(&self, id: NodeId) -> &'a Element {
        self.doc.element(id)
    }

    /// Attribute value of `id`, if present
    #[must_use]
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&'a str> {
        self.doc.attribute(id, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        let mut doc = Document::new("body");
        let section = doc.append_child(doc.root(), Element::new("section"));
        doc.append_child(
            section,
            Element::new("button")
                .with_attribute("data-testid", "start")
                .with_text("Start"),
        );
        doc.append_child(
            doc.root(),
            Element::new("span").with_attribute("data-testid", "score"),
        );
        doc
    }

    mod element_tests {
        use super::*;

        #[test]
        fn test_attribute_lookup() {
            let el = Element::new("div")
                .with_attribute("id", "hero")
                .with_attribute("class", "big");
            assert_eq!(el.attribute("id"), Some("hero"));
            assert_eq!(el.attribute("class"), Some("big"));
            assert_eq!(el.attribute("role"), None);
            assert!(el.has_attribute("id"));
            assert!(!el.has_attribute("role"));
        }

        #[test]
        fn test_with_text() {
            let el = Element::new("p").with_text("hello");
            assert_eq!(el.text.as_deref(), Some("hello"));
        }
    }

    mod document_tests {
        use super::*;

        #[test]
        fn test_new_document_has_only_root() {
            let doc = Document::new("body");
            assert_eq!(doc.len(), 1);
            assert!(doc.is_empty());
            assert_eq!(doc.element(doc.root()).tag, "body");
            assert_eq!(doc.parent(doc.root()), None);
        }

        #[test]
        fn test_append_child_links_parent() {
            let mut doc = Document::new("body");
            let child = doc.append_child(doc.root(), Element::new("div"));
            assert_eq!(doc.parent(child), Some(doc.root()));
            assert_eq!(doc.children(doc.root()), &[child]);
        }

        #[test]
        fn test_descendants_preorder() {
            let doc = sample();
            let order: Vec<&str> = doc
                .descendants(doc.root())
                .into_iter()
                .map(|id| doc.element(id).tag.as_str())
                .collect();
            assert_eq!(order, ["section", "button", "span"]);
        }

        #[test]
        fn test_descendants_excludes_self() {
            let doc = sample();
            assert!(!doc.descendants(doc.root()).contains(&doc.root()));
        }

        #[test]
        fn test_set_attribute_replaces_existing() {
            let mut doc = Document::new("body");
            let id = doc.append_child(doc.root(), Element::new("span"));
            doc.set_attribute(id, "data-testid", "a");
            doc.set_attribute(id, "data-testid", "b");
            assert_eq!(doc.attribute(id, "data-testid"), Some("b"));
            assert_eq!(doc.element(id).attributes.len(), 1);
        }

        #[test]
        fn test_remove_attribute() {
            let mut doc = Document::new("body");
            let id = doc.append_child(
                doc.root(),
                Element::new("span").with_attribute("role", "status"),
            );
            doc.remove_attribute(id, "role");
            assert_eq!(doc.attribute(id, "role"), None);
        }
    }

    mod scope_tests {
        use super::*;

        #[test]
        fn test_scope_restricts_candidates() {
            let doc = sample();
            let section = doc.children(doc.root())[0];
            let scoped: Vec<&str> = doc
                .scope_at(section)
                .descendants()
                .into_iter()
                .map(|id| doc.element(id).tag.as_str())
                .collect();
            assert_eq!(scoped, ["button"]);
        }

        #[test]
        fn test_scope_is_copy() {
            let doc = sample();
            let scope = doc.scope();
            let copied = scope;
            assert_eq!(copied.root(), scope.root());
        }
    }
}
