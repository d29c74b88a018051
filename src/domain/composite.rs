//! Hierarchical aggregate: sized leaves grouped under named groups.
//!
//! A [`Group`] exclusively owns its children. Attaching a node moves it into
//! the group, and removing it drops the whole detached subtree. Names are
//! unique only by convention; lookups resolve duplicates by taking the first
//! match in the order documented on [`Node::remove`].

use std::fmt;

use termtree::Tree;
use tracing::{debug, instrument};

use crate::domain::error::{DomainError, DomainResult};

/// Default number of columns a child is indented relative to its parent.
pub const DEFAULT_INDENT_STEP: usize = 2;

/// Largest indent step honoured by [`Node::render_stepped`].
pub const MAX_INDENT_STEP: usize = 16;

/// Terminal node carrying a size in bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    name: String,
    size: u64,
}

impl Leaf {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

/// Named group owning an ordered sequence of child nodes.
///
/// Insertion order is iteration and rendering order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    name: String,
    children: Vec<Node>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// Builder-style variant of [`Group::add`].
    pub fn with(mut self, child: impl Into<Node>) -> Self {
        self.add(child);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Append `child`, taking ownership of it.
    pub fn add(&mut self, child: impl Into<Node>) {
        let child = child.into();
        debug!(group = %self.name, child = %child.name(), "add");
        self.children.push(child);
    }

    /// Sum of the sizes of all children, recomputed on every call.
    pub fn size_of(&self) -> u64 {
        self.children.iter().map(Node::size_of).sum()
    }

    /// Remove the first node named `name` from this subtree.
    ///
    /// See [`Node::remove`] for the search order.
    #[instrument(level = "debug", skip(self), fields(group = %self.name))]
    pub fn remove(&mut self, name: &str) -> bool {
        if let Some(pos) = self.children.iter().position(|c| c.name() == name) {
            let removed = self.children.remove(pos);
            debug!(removed = %removed.name(), size = removed.size_of(), "detached");
            return true;
        }
        self.children
            .iter_mut()
            .filter_map(Node::as_group_mut)
            .any(|group| group.remove(name))
    }

    fn find(&self, name: &str) -> Option<&Node> {
        self.children
            .iter()
            .find(|c| c.name() == name)
            .or_else(|| {
                self.children
                    .iter()
                    .filter_map(Node::as_group)
                    .find_map(|group| group.find(name))
            })
    }
}

/// A node of the hierarchy: either a [`Leaf`] or a [`Group`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Leaf(Leaf),
    Group(Group),
}

impl From<Leaf> for Node {
    fn from(leaf: Leaf) -> Self {
        Node::Leaf(leaf)
    }
}

impl From<Group> for Node {
    fn from(group: Group) -> Self {
        Node::Group(group)
    }
}

impl Node {
    pub fn leaf(name: impl Into<String>, size: u64) -> Self {
        Node::Leaf(Leaf::new(name, size))
    }

    pub fn group(name: impl Into<String>) -> Self {
        Node::Group(Group::new(name))
    }

    pub fn name(&self) -> &str {
        match self {
            Node::Leaf(leaf) => leaf.name(),
            Node::Group(group) => group.name(),
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Node::Group(_))
    }

    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Node::Group(group) => Some(group),
            Node::Leaf(_) => None,
        }
    }

    pub fn as_group_mut(&mut self) -> Option<&mut Group> {
        match self {
            Node::Group(group) => Some(group),
            Node::Leaf(_) => None,
        }
    }

    /// Direct children; empty for a leaf.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Leaf(_) => &[],
            Node::Group(group) => group.children(),
        }
    }

    /// Aggregate size: a leaf's own size, or the sum over a group's subtree.
    ///
    /// Nothing is cached, so the value always reflects the current shape of
    /// the tree at O(subtree) cost.
    pub fn size_of(&self) -> u64 {
        match self {
            Node::Leaf(leaf) => leaf.size(),
            Node::Group(group) => group.size_of(),
        }
    }

    /// Move `child` to the end of this group's children.
    ///
    /// # Errors
    /// [`DomainError::InvalidOperation`] when called on a leaf; the child is
    /// dropped in that case.
    pub fn add(&mut self, child: impl Into<Node>) -> DomainResult<()> {
        match self {
            Node::Group(group) => {
                group.add(child);
                Ok(())
            }
            Node::Leaf(leaf) => Err(DomainError::InvalidOperation(format!(
                "cannot add child to a leaf: {}",
                leaf.name()
            ))),
        }
    }

    /// Remove the first descendant named `name`, dropping its subtree.
    ///
    /// Direct children are scanned first; only when none matches is each
    /// child group searched recursively, in child order. The search stops at
    /// the first removal, so with duplicate names exactly one node goes.
    /// Returns `false`, leaving the tree untouched, when nothing matches or
    /// when called on a leaf.
    pub fn remove(&mut self, name: &str) -> bool {
        match self {
            Node::Leaf(_) => false,
            Node::Group(group) => group.remove(name),
        }
    }

    /// Locate the descendant [`Node::remove`] would remove for `name`.
    pub fn find(&self, name: &str) -> Option<&Node> {
        self.as_group().and_then(|group| group.find(name))
    }

    /// Names of all leaves in depth-first pre-order.
    pub fn leaf_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_leaves(&mut names);
        names
    }

    fn collect_leaves<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Node::Leaf(leaf) => names.push(leaf.name()),
            Node::Group(group) => {
                for child in group.children() {
                    child.collect_leaves(names);
                }
            }
        }
    }

    /// Number of levels in this subtree; a leaf or an empty group is 1.
    pub fn depth(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(Node::depth)
            .max()
            .unwrap_or(0)
    }

    /// Display lines for this subtree, starting at column `indent`.
    ///
    /// The sequence is lazy: a group's aggregate is computed when its header
    /// line is produced. Call again to start over.
    pub fn render(&self, indent: usize) -> RenderLines<'_> {
        RenderLines::new(self, indent, DEFAULT_INDENT_STEP)
    }

    /// Like [`Node::render`] with a custom indent step per level.
    ///
    /// `step` is clamped to [`MAX_INDENT_STEP`].
    pub fn render_stepped(&self, indent: usize, step: usize) -> RenderLines<'_> {
        RenderLines::new(self, indent, step.min(MAX_INDENT_STEP))
    }

    /// Box-drawing tree of this subtree.
    pub fn to_tree(&self) -> Tree<String> {
        match self {
            Node::Leaf(leaf) => Tree::new(format!("{} ({} B)", leaf.name(), leaf.size())),
            Node::Group(group) => Tree::new(format!("{} [{} B]", group.name(), group.size_of()))
                .with_leaves(group.children().iter().map(Node::to_tree)),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.render(0) {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// Depth-first pre-order iterator over the display lines of a subtree.
#[derive(Debug, Clone)]
pub struct RenderLines<'a> {
    stack: Vec<(&'a Node, usize)>,
    step: usize,
}

impl<'a> RenderLines<'a> {
    fn new(root: &'a Node, indent: usize, step: usize) -> Self {
        Self {
            stack: vec![(root, indent)],
            step,
        }
    }
}

impl<'a> Iterator for RenderLines<'a> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        let (node, indent) = self.stack.pop()?;
        let pad = " ".repeat(indent);
        match node {
            Node::Leaf(leaf) => Some(format!("{pad}- {} ({} B)", leaf.name(), leaf.size())),
            Node::Group(group) => {
                // Push children in reverse order for left-to-right traversal
                for child in group.children().iter().rev() {
                    self.stack.push((child, indent.saturating_add(self.step)));
                }
                Some(format!("{pad}+ {} [{} B]", group.name(), group.size_of()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_group_has_zero_size_and_depth_one() {
        let node = Node::group("empty");
        assert_eq!(node.size_of(), 0);
        assert_eq!(node.depth(), 1);
        assert_eq!(node.render(0).collect::<Vec<_>>(), vec!["+ empty [0 B]"]);
    }

    #[test]
    fn oversized_step_is_clamped() {
        let node: Node = Group::new("g").with(Node::leaf("a", 1)).into();
        let lines: Vec<String> = node.render_stepped(0, usize::MAX).collect();
        assert_eq!(lines[1], format!("{}- a (1 B)", " ".repeat(MAX_INDENT_STEP)));
    }

    #[test]
    fn remove_on_leaf_is_a_no_op() {
        let mut node = Node::leaf("a", 3);
        assert!(!node.remove("a"));
        assert_eq!(node.size_of(), 3);
    }
}
