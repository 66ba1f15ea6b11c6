//! Route tree storage.
//!
//! # Responsibilities
//! - Hold route nodes in an arena, parents owning children by index
//! - Expose read-only traversal for the resolver and sidebar consumers
//!
//! # Design Decisions
//! - No mutation API: a tree is only produced by the builder
//! - Node ids are only meaningful for the tree that issued them

use std::fmt;

use crate::routing::matcher::PathPattern;
use crate::routing::types::{ComponentKey, CATCH_ALL};

/// Index of a node within its [`RouteTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One addressable entry in the route tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteNode {
    pub(crate) path: String,
    pub(crate) full_path: String,
    pub(crate) pattern: PathPattern,
    pub(crate) component_key: Option<ComponentKey>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) exact: bool,
    pub(crate) sidebar_ref: Option<String>,
    pub(crate) catch_all: bool,
}

impl RouteNode {
    /// Path relative to the parent: `/` for the root, `*` for the catch-all.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Absolute path the node was built from.
    pub fn full_path(&self) -> &str {
        &self.full_path
    }

    /// Relative pattern used for matching.
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    /// Component key, absent only on a synthetic root.
    pub fn component_key(&self) -> Option<&ComponentKey> {
        self.component_key.as_ref()
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_exact(&self) -> bool {
        self.exact
    }

    pub fn sidebar_ref(&self) -> Option<&str> {
        self.sidebar_ref.as_deref()
    }

    pub fn is_catch_all(&self) -> bool {
        self.catch_all
    }

    pub(crate) fn root(component_key: Option<ComponentKey>, exact: bool, sidebar_ref: Option<String>) -> Self {
        Self {
            path: "/".to_string(),
            full_path: "/".to_string(),
            pattern: PathPattern::default(),
            component_key,
            children: Vec::new(),
            exact,
            sidebar_ref,
            catch_all: false,
        }
    }

    pub(crate) fn catch_all(component_key: ComponentKey) -> Self {
        Self {
            path: CATCH_ALL.to_string(),
            full_path: CATCH_ALL.to_string(),
            pattern: PathPattern::default(),
            component_key: Some(component_key),
            children: Vec::new(),
            exact: false,
            sidebar_ref: None,
            catch_all: true,
        }
    }
}

/// Immutable route tree rooted at `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTree {
    pub(crate) nodes: Vec<RouteNode>,
}

impl RouteTree {
    pub(crate) const ROOT: NodeId = NodeId(0);

    pub(crate) fn with_root(root: RouteNode) -> Self {
        Self { nodes: vec![root] }
    }

    pub(crate) fn push_child(&mut self, parent: NodeId, node: RouteNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn root_id(&self) -> NodeId {
        Self::ROOT
    }

    pub fn root(&self) -> &RouteNode {
        &self.nodes[Self::ROOT.0]
    }

    /// Look up a node. Panics if `id` came from another tree and is out of range.
    pub fn node(&self, id: NodeId) -> &RouteNode {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&RouteNode> {
        self.nodes.get(id.0)
    }

    /// Number of nodes, including the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The top-level catch-all node, if any.
    pub fn catch_all(&self) -> Option<NodeId> {
        self.root()
            .children
            .iter()
            .copied()
            .find(|id| self.node(*id).catch_all)
    }

    /// Depth-first, pre-order walk in child order.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            tree: self,
            stack: vec![(Self::ROOT, 0)],
        }
    }

    /// Every distinct component key referenced by the tree, in walk order.
    pub fn component_keys(&self) -> Vec<ComponentKey> {
        let mut seen = std::collections::HashSet::new();
        self.walk()
            .filter_map(|(_, node, _)| node.component_key.clone())
            .filter(|key| seen.insert(key.clone()))
            .collect()
    }
}

/// Iterator returned by [`RouteTree::walk`]: `(id, node, depth)`.
pub struct Walk<'t> {
    tree: &'t RouteTree,
    stack: Vec<(NodeId, usize)>,
}

impl<'t> Iterator for Walk<'t> {
    type Item = (NodeId, &'t RouteNode, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (id, depth) = self.stack.pop()?;
        let node = self.tree.node(id);
        self.stack
            .extend(node.children.iter().rev().map(|child| (*child, depth + 1)));
        Some((id, node, depth))
    }
}

impl fmt::Display for RouteTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (_, node, depth) in self.walk() {
            write!(f, "{:indent$}{}", "", node.path, indent = depth * 2)?;
            match &node.component_key {
                Some(key) => write!(f, " [{}]", key)?,
                None => write!(f, " [layout]")?,
            }
            if node.exact {
                write!(f, " exact")?;
            }
            if let Some(sidebar) = &node.sidebar_ref {
                write!(f, " sidebar={}", sidebar)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
