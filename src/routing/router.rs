//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Resolve a request path to the most specific route node
//! - Fall back to the catch-all, or report an explicit no-match
//! - Hold the live tree and hand matched keys to the component registry
//!
//! # Design Decisions
//! - Resolution is a pure function of (tree, path)
//! - The live tree sits behind `ArcSwap`; rebuilds swap the whole tree
//! - A rebuilt tree is checked against the registry before it goes live
//! - Ambiguous matches are not fatal: earliest child wins, with a warning

use std::collections::BTreeMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use thiserror::Error;

use crate::observability::metrics;
use crate::registry::{ComponentRegistry, Materialize, RegistryError};
use crate::routing::builder::build;
use crate::routing::matcher::split_request_path;
use crate::routing::tree::{NodeId, RouteNode, RouteTree};
use crate::routing::types::{BuildError, ComponentKey, PageDescriptor, ResolveError, CATCH_ALL};

/// Result of resolving a request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    /// Matched node in the tree that was searched.
    pub node: NodeId,
    /// Key of the component to render.
    pub component_key: ComponentKey,
    /// Captured `:param` values; the catch-all stores the unmatched path under `*`.
    pub params: BTreeMap<String, String>,
    /// Nodes from the root down to `node`. Each one wraps the next.
    pub chain: Vec<NodeId>,
}

impl RouteMatch {
    pub fn is_fallback(&self) -> bool {
        self.params.contains_key(CATCH_ALL)
    }
}

/// A child that could take the remaining request segments.
struct Candidate<'r> {
    id: NodeId,
    consumed: usize,
    captures: Vec<(String, &'r str)>,
    full: bool,
    exact: bool,
    literals: usize,
}

impl Candidate<'_> {
    /// Higher is more specific. Ties fall back to child order.
    fn rank(&self) -> (bool, bool, usize, usize) {
        (self.full, self.exact, self.consumed, self.literals)
    }
}

/// Resolve `request_path` against `tree`.
pub fn resolve(tree: &RouteTree, request_path: &str) -> Result<RouteMatch, ResolveError> {
    let segments = split_request_path(request_path);
    let mut captures = Vec::new();
    let mut chain = vec![RouteTree::ROOT];

    if let Some((node, component_key)) = match_node(
        tree,
        RouteTree::ROOT,
        &segments,
        &mut captures,
        &mut chain,
        request_path,
    ) {
        return Ok(RouteMatch {
            node,
            component_key,
            params: captures
                .into_iter()
                .map(|(name, value)| (name, value.to_string()))
                .collect(),
            chain,
        });
    }

    if let Some(fallback) = tree.catch_all() {
        if let Some(component_key) = tree.node(fallback).component_key.clone() {
            tracing::debug!(path = %request_path, "No route matched, using catch-all");
            let mut params = BTreeMap::new();
            params.insert(CATCH_ALL.to_string(), segments.join("/"));
            return Ok(RouteMatch {
                node: fallback,
                component_key,
                params,
                chain: vec![RouteTree::ROOT, fallback],
            });
        }
    }

    Err(ResolveError::NoRoute {
        path: request_path.to_string(),
    })
}

fn match_node<'r>(
    tree: &RouteTree,
    id: NodeId,
    remaining: &[&'r str],
    captures: &mut Vec<(String, &'r str)>,
    chain: &mut Vec<NodeId>,
    request_path: &str,
) -> Option<(NodeId, ComponentKey)> {
    let node = tree.node(id);
    if remaining.is_empty() {
        return node.component_key.clone().map(|key| (id, key));
    }

    let candidates = candidates(tree, node, remaining);
    if let Some(shadowed) = shadowed(&candidates) {
        tracing::warn!(
            path = %request_path,
            chosen = %tree.node(candidates[0].id).full_path,
            shadowed = %tree.node(shadowed).full_path,
            "Ambiguous routes, earliest registered wins"
        );
    }

    for candidate in candidates {
        let mark = captures.len();
        captures.extend(candidate.captures);
        chain.push(candidate.id);
        let rest = &remaining[candidate.consumed..];
        if let Some(found) = match_node(tree, candidate.id, rest, captures, chain, request_path) {
            return Some(found);
        }
        chain.pop();
        captures.truncate(mark);
    }
    None
}

/// The runner-up when it ties the chosen candidate on every rank criterion.
fn shadowed(candidates: &[Candidate<'_>]) -> Option<NodeId> {
    match candidates {
        [first, second, ..] if first.rank() == second.rank() => Some(second.id),
        _ => None,
    }
}

/// Children of `node` able to consume a prefix of `remaining`, most specific first.
fn candidates<'r>(tree: &RouteTree, node: &RouteNode, remaining: &[&'r str]) -> Vec<Candidate<'r>> {
    let mut found: Vec<Candidate<'r>> = node
        .children
        .iter()
        .filter_map(|&child| {
            let child_node = tree.node(child);
            if child_node.catch_all {
                return None;
            }
            let matched = child_node.pattern.match_prefix(remaining)?;
            let full = matched.consumed == remaining.len();
            if child_node.exact && !full {
                return None;
            }
            Some(Candidate {
                id: child,
                consumed: matched.consumed,
                captures: matched.captures,
                full,
                exact: child_node.exact,
                literals: child_node.pattern.literal_count(),
            })
        })
        .collect();

    // Stable: equal ranks keep child order.
    found.sort_by(|a, b| b.rank().cmp(&a.rank()));
    found
}

/// Errors raised when installing a new tree.
#[derive(Debug, Error)]
pub enum RouterError {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// A resolved navigation with its pending component.
pub struct Navigation<C> {
    tree: Arc<RouteTree>,
    matched: RouteMatch,
    component: Materialize<C>,
}

impl<C> Navigation<C> {
    /// The tree snapshot this navigation was resolved against.
    pub fn tree(&self) -> &Arc<RouteTree> {
        &self.tree
    }

    pub fn node(&self) -> &RouteNode {
        self.tree.node(self.matched.node)
    }

    pub fn route_match(&self) -> &RouteMatch {
        &self.matched
    }

    pub fn component_key(&self) -> &ComponentKey {
        &self.matched.component_key
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.matched.params
    }

    /// Component keys from the outermost layout down to the page.
    ///
    /// A synthetic root has no key and is skipped.
    pub fn chain_keys(&self) -> Vec<&ComponentKey> {
        self.matched
            .chain
            .iter()
            .filter_map(|&id| self.tree.node(id).component_key())
            .collect()
    }

    /// Wait for the component.
    ///
    /// Dropping the navigation instead does not cancel a load that other
    /// navigations may be sharing.
    pub async fn component(self) -> Result<C, RegistryError> {
        self.component.await
    }

    pub fn into_parts(self) -> (RouteMatch, Materialize<C>) {
        (self.matched, self.component)
    }
}

/// Live route tree bound to a component registry.
pub struct Router<C> {
    tree: ArcSwap<RouteTree>,
    registry: Arc<ComponentRegistry<C>>,
}

impl<C> Router<C>
where
    C: Clone + Send + Sync + 'static,
{
    /// Create a router, checking that every key in `tree` has a loader.
    pub fn new(tree: RouteTree, registry: Arc<ComponentRegistry<C>>) -> Result<Self, RouterError> {
        registry.verify(&tree)?;
        metrics::record_tree_nodes(tree.len());
        tracing::info!(nodes = tree.len(), "Router initialized");
        Ok(Self {
            tree: ArcSwap::from_pointee(tree),
            registry,
        })
    }

    /// Build a tree from descriptors and create a router for it.
    pub fn from_descriptors(
        descriptors: &[PageDescriptor],
        registry: Arc<ComponentRegistry<C>>,
    ) -> Result<Self, RouterError> {
        Self::new(build(descriptors)?, registry)
    }

    /// Snapshot of the current tree.
    pub fn tree(&self) -> Arc<RouteTree> {
        self.tree.load_full()
    }

    pub fn registry(&self) -> &Arc<ComponentRegistry<C>> {
        &self.registry
    }

    /// Resolve a path against the current tree without loading anything.
    pub fn resolve(&self, request_path: &str) -> Result<RouteMatch, ResolveError> {
        let tree = self.tree.load();
        let result = resolve(&tree, request_path);
        record_outcome(&result);
        result
    }

    /// Resolve a path and start materializing its component.
    pub fn navigate(&self, request_path: &str) -> Result<Navigation<C>, ResolveError> {
        let tree = self.tree.load_full();
        let result = resolve(&tree, request_path);
        record_outcome(&result);
        let matched = result?;

        tracing::debug!(
            path = %request_path,
            route = %tree.node(matched.node).full_path,
            key = %matched.component_key,
            "Navigating"
        );
        let component = self.registry.materialize(&matched.component_key);
        Ok(Navigation {
            tree,
            matched,
            component,
        })
    }

    /// Build a new tree and swap it in. On error the current tree stays live.
    pub fn rebuild(&self, descriptors: &[PageDescriptor]) -> Result<Arc<RouteTree>, RouterError> {
        let tree = build(descriptors)?;
        self.replace(tree)
    }

    /// Swap in a prebuilt tree.
    pub fn replace(&self, tree: RouteTree) -> Result<Arc<RouteTree>, RouterError> {
        self.registry.verify(&tree)?;
        let tree = Arc::new(tree);
        self.tree.store(Arc::clone(&tree));

        metrics::record_tree_swap();
        metrics::record_tree_nodes(tree.len());
        tracing::info!(nodes = tree.len(), "Route tree replaced");
        Ok(tree)
    }
}

fn record_outcome(result: &Result<RouteMatch, ResolveError>) {
    let outcome = match result {
        Ok(matched) if matched.is_fallback() => "fallback",
        Ok(_) => "matched",
        Err(_) => "no_route",
    };
    metrics::record_resolution(outcome);
}
