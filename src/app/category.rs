//! In-memory category tree
//!
//! The wire format nests children inside their parents. In memory the tree
//! is an arena: nodes live in a single vector, children are handles owned by
//! their parent, and each node keeps a non-owning handle back to its parent
//! for path reconstruction. No reference cycles, no dangling parents.

use std::fmt;

use crate::app::models::Category;
use crate::constants::search::PATH_SEPARATOR;

/// Handle to a node inside the [`CategoryTree`] that issued it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in its tree's arena
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A category with resolved parent and children
#[derive(Debug, Clone)]
pub struct CategoryNode {
    pub display_name: String,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl CategoryNode {
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

// Nodes compare by display name only, so same-named nodes in unrelated
// subtrees are equal. Callers relying on identity must compare NodeIds.
impl PartialEq for CategoryNode {
    fn eq(&self, other: &Self) -> bool {
        self.display_name == other.display_name
    }
}

impl Eq for CategoryNode {}

/// Arena-backed category forest
#[derive(Debug, Clone, Default)]
pub struct CategoryTree {
    nodes: Vec<CategoryNode>,
    roots: Vec<NodeId>,
}

impl CategoryTree {
    /// Top-level nodes in server order
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Number of nodes in the whole forest
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by a different tree and is out of range.
    pub fn node(&self, id: NodeId) -> &CategoryNode {
        &self.nodes[id.0]
    }

    /// Non-panicking lookup
    pub fn get(&self, id: NodeId) -> Option<&CategoryNode> {
        self.nodes.get(id.0)
    }

    pub fn display_name(&self, id: NodeId) -> &str {
        &self.node(id).display_name
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn has_children(&self, id: NodeId) -> bool {
        !self.node(id).children.is_empty()
    }

    /// The node followed by each of its ancestors, ending at the root
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: Some(id),
        }
    }

    /// Depth of a node, roots being at depth 1
    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).count()
    }

    /// Display names from the root down to `id`, joined with `/`
    pub fn path(&self, id: NodeId) -> String {
        let mut names: Vec<&str> = self
            .ancestors(id)
            .map(|ancestor| self.display_name(ancestor))
            .collect();
        names.reverse();
        names.join(PATH_SEPARATOR)
    }

    /// Resolve a `/`-joined path, matching display names level by level
    ///
    /// The first matching name wins at each level.
    pub fn find_by_path(&self, path: &str) -> Option<NodeId> {
        let mut candidates = self.roots.as_slice();
        let mut found = None;

        for segment in path.split(PATH_SEPARATOR) {
            let id = candidates
                .iter()
                .copied()
                .find(|&id| self.display_name(id) == segment)?;
            candidates = self.children(id);
            found = Some(id);
        }

        found
    }

    /// All node handles, parents before their children
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Depth of the deepest node, 0 for an empty tree
    pub fn max_depth(&self) -> usize {
        self.ids().map(|id| self.depth(id)).max().unwrap_or(0)
    }
}

/// Iterator returned by [`CategoryTree::ancestors`]
pub struct Ancestors<'a> {
    tree: &'a CategoryTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

/// Builds [`CategoryTree`]s from wire categories
#[derive(Debug, Default, Clone, Copy)]
pub struct CategoryTreeBuilder;

impl CategoryTreeBuilder {
    /// Build a tree rooted at a single category
    pub fn build(&self, category: &Category) -> CategoryTree {
        self.build_forest(std::slice::from_ref(category))
    }

    /// Build a forest whose roots are the given categories, in order
    pub fn build_forest(&self, categories: &[Category]) -> CategoryTree {
        let mut tree = CategoryTree::default();
        for category in categories {
            let root = Self::insert(&mut tree, category, None);
            tree.roots.push(root);
        }
        tree
    }

    fn insert(tree: &mut CategoryTree, category: &Category, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(tree.nodes.len());
        tree.nodes.push(CategoryNode {
            display_name: category.display_name.clone(),
            children: Vec::with_capacity(category.children().len()),
            parent,
        });

        for child in category.children() {
            let child_id = Self::insert(tree, child, Some(id));
            tree.nodes[id.0].children.push(child_id);
        }

        id
    }
}
