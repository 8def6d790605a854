//! Containment and type hierarchies walked by permission fallbacks.
//!
//! Fallback chains never re-enter themselves level by level: each hierarchy
//! is materialized once into an ordered ancestor list (nearest first) and
//! walked with a loop.

use std::collections::{HashMap, HashSet};

use crate::identity::{DomainObject, ObjectIdentity};

/// Default name of the abstract base every content type derives from.
pub const DEFAULT_CONTENT_BASE_TYPE: &str = "ClassContent";

/// A node of a containment tree (a page, a nested node) with its ancestors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    identity: ObjectIdentity,
    ancestors: Vec<ObjectIdentity>,
}

impl TreeNode {
    /// Create a node. `ancestors` are ordered from parent to root.
    pub fn new(identity: ObjectIdentity, ancestors: Vec<ObjectIdentity>) -> Self {
        Self {
            identity,
            ancestors,
        }
    }

    /// Create a root node.
    pub fn root(identity: ObjectIdentity) -> Self {
        Self::new(identity, Vec::new())
    }

    /// The node's own identity.
    pub fn identity(&self) -> &ObjectIdentity {
        &self.identity
    }

    /// Ancestors from parent to root.
    pub fn ancestors(&self) -> &[ObjectIdentity] {
        &self.ancestors
    }

    /// Whether the node has no parent.
    pub fn is_root(&self) -> bool {
        self.ancestors.is_empty()
    }

    /// The node itself followed by its ancestors up to the root.
    pub fn chain(&self) -> impl Iterator<Item = &ObjectIdentity> {
        std::iter::once(&self.identity).chain(self.ancestors.iter())
    }

    /// The root of the tree (the node itself when it is a root).
    pub fn tree_root(&self) -> &ObjectIdentity {
        self.ancestors.last().unwrap_or(&self.identity)
    }
}

impl DomainObject for TreeNode {
    fn object_identity(&self) -> ObjectIdentity {
        self.identity.clone()
    }
}

#[derive(Debug, Clone, Default)]
struct ContentType {
    parent: Option<String>,
    category: Option<String>,
}

/// Registry of content types: their parent type and declared category.
///
/// Every registered type implicitly derives from the base type, so lineages
/// of registered types always end with it.
#[derive(Debug, Clone)]
pub struct ContentTypeRegistry {
    base: String,
    types: HashMap<String, ContentType>,
}

impl ContentTypeRegistry {
    /// Create a registry around the given abstract base type.
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        let mut types = HashMap::new();
        types.insert(base.clone(), ContentType::default());
        Self { base, types }
    }

    /// Register a content type.
    ///
    /// A `None` parent means the type derives directly from the base.
    pub fn register(&mut self, kind: &str, parent: Option<&str>, category: Option<&str>) {
        self.types.insert(
            kind.to_string(),
            ContentType {
                parent: parent.map(str::to_string),
                category: category.map(str::to_string),
            },
        );
    }

    /// Builder-style [`register`](Self::register).
    pub fn with_type(mut self, kind: &str, parent: Option<&str>, category: Option<&str>) -> Self {
        self.register(kind, parent, category);
        self
    }

    /// The abstract base type name.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Whether `kind` is a registered content type.
    pub fn contains(&self, kind: &str) -> bool {
        self.types.contains_key(kind)
    }

    /// The declared category of `kind`, if any.
    pub fn category_of(&self, kind: &str) -> Option<&str> {
        self.types.get(kind).and_then(|t| t.category.as_deref())
    }

    /// Ancestor types of `kind`, nearest first, ending with the base type.
    ///
    /// Unregistered types and the base type itself have no lineage.
    pub fn lineage(&self, kind: &str) -> Vec<String> {
        if kind == self.base || !self.contains(kind) {
            return Vec::new();
        }

        let mut lineage = Vec::new();
        let mut seen = HashSet::from([kind.to_string()]);
        let mut current = kind.to_string();
        while let Some(parent) = self.types.get(&current).and_then(|t| t.parent.clone()) {
            if parent == self.base || !seen.insert(parent.clone()) {
                break;
            }
            lineage.push(parent.clone());
            current = parent;
        }
        lineage.push(self.base.clone());
        lineage
    }
}

impl Default for ContentTypeRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_CONTENT_BASE_TYPE)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn oid(id: &str) -> ObjectIdentity {
        ObjectIdentity::new(id, "Page").unwrap()
    }

    #[test]
    fn test_tree_node_chain() {
        let node = TreeNode::new(oid("child"), vec![oid("parent"), oid("root")]);
        let chain: Vec<&str> = node.chain().map(|o| o.identifier()).collect();
        assert_eq!(chain, vec!["child", "parent", "root"]);
        assert_eq!(node.tree_root().identifier(), "root");
        assert!(!node.is_root());
    }

    #[test]
    fn test_tree_node_root() {
        let node = TreeNode::root(oid("root"));
        assert!(node.is_root());
        assert_eq!(node.tree_root(), node.identity());
        assert_eq!(node.chain().count(), 1);
    }

    #[test]
    fn test_lineage_ends_with_base() {
        let registry = ContentTypeRegistry::default()
            .with_type("Block", None, Some("basic"))
            .with_type("Article", Some("Block"), Some("news"));
        assert_eq!(registry.lineage("Article"), vec!["Block", "ClassContent"]);
        assert_eq!(registry.lineage("Block"), vec!["ClassContent"]);
        assert!(registry.lineage("ClassContent").is_empty());
        assert!(registry.lineage("Unknown").is_empty());
    }

    #[test]
    fn test_lineage_survives_cycles() {
        let registry = ContentTypeRegistry::default()
            .with_type("A", Some("B"), None)
            .with_type("B", Some("A"), None);
        assert_eq!(registry.lineage("A"), vec!["B", "ClassContent"]);
    }

    #[test]
    fn test_category_of() {
        let registry = ContentTypeRegistry::default().with_type("Article", None, Some("news"));
        assert_eq!(registry.category_of("Article"), Some("news"));
        assert_eq!(registry.category_of("ClassContent"), None);
        assert_eq!(registry.category_of("Unknown"), None);
    }
}
