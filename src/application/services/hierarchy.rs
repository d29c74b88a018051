//! Hierarchy service
//!
//! Shows a file-system style tree, removes entries by name and reports how
//! the aggregate size changes.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::domain::{Group, Node};
use crate::infrastructure::traits::Console;

/// Outcome of one removal request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    pub name: String,
    pub removed: bool,
    /// Aggregate size of the detached subtree (0 when nothing was removed)
    pub freed: u64,
}

/// Totals before and after a run of removals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyReport {
    pub before: u64,
    pub after: u64,
    pub removals: Vec<Removal>,
}

/// Service narrating a hierarchical aggregate.
pub struct HierarchyService {
    console: Arc<dyn Console>,
    indent_step: usize,
}

impl HierarchyService {
    pub fn new(console: Arc<dyn Console>, indent_step: usize) -> Self {
        Self {
            console,
            indent_step,
        }
    }

    /// The sample tree: `docs` and `images` groups plus `readme.md`, 4148 B.
    pub fn sample_tree() -> Node {
        let docs = Group::new("docs")
            .with(Node::leaf("report.pdf", 1200))
            .with(Node::leaf("notes.txt", 300));
        let images = Group::new("images")
            .with(Node::leaf("logo.png", 500))
            .with(Node::leaf("banner.jpg", 2048));

        Group::new("root")
            .with(docs)
            .with(images)
            .with(Node::leaf("readme.md", 100))
            .into()
    }

    /// Print `root`, remove each name in turn, then print it again.
    ///
    /// With `as_tree` the tree is drawn with box-drawing characters instead
    /// of indented lines.
    #[instrument(level = "debug", skip(self, root))]
    pub fn run(&self, root: &mut Node, removals: &[String], as_tree: bool) -> HierarchyReport {
        self.console.header("== Before ==");
        let before = self.show(root, as_tree);
        self.console.blank();

        let removals: Vec<Removal> = removals
            .iter()
            .map(|name| self.remove(root, name))
            .collect();

        self.console.header("== After ==");
        let after = self.show(root, as_tree);

        HierarchyReport {
            before,
            after,
            removals,
        }
    }

    fn remove(&self, root: &mut Node, name: &str) -> Removal {
        self.console.line(&format!("Removing {}...", name));
        let freed = root.find(name).map(Node::size_of).unwrap_or(0);
        let removed = root.remove(name);
        debug!(name, removed, freed, "remove");
        if removed {
            self.console.success("Removed.");
        } else {
            self.console.warning("Not found.");
        }
        self.console.blank();
        Removal {
            name: name.to_string(),
            removed,
            freed: if removed { freed } else { 0 },
        }
    }

    fn show(&self, root: &Node, as_tree: bool) -> u64 {
        if as_tree {
            for line in root.to_tree().to_string().lines() {
                self.console.line(line);
            }
        } else {
            for line in root.render_stepped(0, self.indent_step) {
                self.console.line(&line);
            }
        }
        let total = root.size_of();
        self.console.line(&format!("Total: {} bytes", total));
        total
    }
}
