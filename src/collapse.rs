//! Release directory collapsing.
//!
//! A directory whose first child's name starts with a decimal digit is taken
//! to hold version-named releases. Its children are reversed so the newest
//! release comes first, and only the first digit-named child stays visible.
//! This is a naming heuristic, not version parsing.

use crate::tree::{NodeId, Tree};

/// Returns `true` if `name` looks like a release identifier.
#[must_use]
pub fn is_release_name(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_digit())
}

/// New child order and visibility for one release directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseCollapse {
    /// The directory being collapsed.
    pub dir: NodeId,
    /// Children in their new order.
    pub order: Vec<NodeId>,
    /// The child left visible, if any child is digit-named.
    pub shown: Option<NodeId>,
}

/// Changes to apply to a tree, computed without touching it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollapsePlan {
    /// One entry per release directory, in traversal order.
    pub releases: Vec<ReleaseCollapse>,
}

impl CollapsePlan {
    /// Returns `true` if no directory needs collapsing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }

    /// Writes the planned order and visibility into `tree`.
    pub fn apply(self, tree: &mut Tree) {
        for release in self.releases {
            for child in &release.order {
                tree.set_show(*child, Some(*child) == release.shown);
            }
            tree.reorder_children(release.dir, release.order);
        }
    }
}

/// Computes the collapse for `dir` alone, or `None` if it is not a release
/// directory.
#[must_use]
pub fn plan_directory(tree: &Tree, dir: NodeId) -> Option<ReleaseCollapse> {
    let node = tree.get(dir)?;
    let first = tree.get(*node.children.first()?)?;
    if !is_release_name(&first.name) {
        return None;
    }

    let order: Vec<NodeId> = node.children.iter().rev().copied().collect();
    // bounded: ends at the last child even if none matches
    let shown = order
        .iter()
        .copied()
        .find(|id| tree.get(*id).is_some_and(|n| is_release_name(&n.name)));

    Some(ReleaseCollapse {
        dir,
        order,
        shown,
    })
}

/// Plans the collapse of every release directory in the tree.
///
/// Every directory is examined independently, whether or not its parent is
/// a release directory.
#[must_use]
pub fn plan_releases(tree: &Tree) -> CollapsePlan {
    let mut releases = Vec::new();
    let mut stack = vec![NodeId::ROOT];

    while let Some(id) = stack.pop() {
        let Some(node) = tree.get(id) else { continue };
        if let Some(release) = plan_directory(tree, id) {
            if release.shown.is_none() {
                log::debug!("Release directory {:?} has no digit-named child; all hidden", node.name);
            } else {
                log::debug!("Collapsing release directory {:?}", node.name);
            }
            releases.push(release);
        }
        stack.extend(node.children.iter().rev().copied());
    }

    CollapsePlan { releases }
}

/// Collapses all release directories of `tree` in place.
pub fn collapse_releases(tree: &mut Tree) {
    let plan = plan_releases(tree);
    if !plan.is_empty() {
        log::debug!("Collapsing {} release directories", plan.releases.len());
    }
    plan.apply(tree);
}
