//! Route tree construction.
//!
//! # Responsibilities
//! - Validate page descriptors (paths, keys, duplicates)
//! - Nest descriptors under their closest non-exact path prefix
//! - Hoist the catch-all to the end of the root's routes
//!
//! # Design Decisions
//! - Fail on the first error; a partial tree is never returned
//! - Ancestors are inserted before descendants (stable sort by depth), so the
//!   output only depends on the input order
//! - Exact routes are leaves: they never adopt nested routes

use std::collections::HashMap;

use crate::routing::matcher::PathPattern;
use crate::routing::tree::{NodeId, RouteNode, RouteTree};
use crate::routing::types::{BuildError, BuildResult, ComponentKey, PageDescriptor, CATCH_ALL};

/// A descriptor that passed validation.
struct Page<'d> {
    descriptor: &'d PageDescriptor,
    key: ComponentKey,
    pattern: PathPattern,
    full_path: String,
}

/// Build a route tree from an ordered list of page descriptors.
pub fn build(descriptors: &[PageDescriptor]) -> BuildResult<RouteTree> {
    let mut claimed: HashMap<String, &str> = HashMap::new();
    let mut root_page = None;
    let mut catch_all = None;
    let mut pages = Vec::with_capacity(descriptors.len());

    // 1. Validate every descriptor before touching the tree
    for descriptor in descriptors {
        let key = ComponentKey::new(&descriptor.key).map_err(|_| BuildError::EmptyKey {
            path: descriptor.path.clone(),
        })?;

        let (pattern, full_path) = if descriptor.is_catch_all() {
            (PathPattern::default(), CATCH_ALL.to_string())
        } else {
            let pattern =
                PathPattern::parse(&descriptor.path).map_err(|e| BuildError::InvalidPath {
                    path: descriptor.path.clone(),
                    key: descriptor.key.clone(),
                    reason: e.to_string(),
                })?;
            let full_path = format!("/{}", pattern);
            (pattern, full_path)
        };

        if let Some(first) = claimed.insert(full_path.clone(), &descriptor.key) {
            return Err(BuildError::DuplicateRoute {
                path: full_path,
                first: first.to_string(),
                second: descriptor.key.clone(),
            });
        }

        let page = Page {
            descriptor,
            key,
            pattern,
            full_path,
        };
        if descriptor.is_catch_all() {
            catch_all = Some(page);
        } else if page.pattern.is_empty() {
            root_page = Some(page);
        } else {
            pages.push(page);
        }
    }

    // 2. Root: either the "/" page or a synthetic layout
    let root = match root_page {
        Some(page) => RouteNode::root(
            Some(page.key),
            page.descriptor.exact,
            page.descriptor.sidebar.clone(),
        ),
        None => RouteNode::root(None, false, None),
    };
    let mut tree = RouteTree::with_root(root);

    // 3. Ancestors first, input order within a depth
    pages.sort_by_key(|page| page.pattern.len());
    for page in pages {
        insert(&mut tree, page);
    }

    // 4. Catch-all is evaluated last
    if let Some(page) = catch_all {
        tree.push_child(RouteTree::ROOT, RouteNode::catch_all(page.key));
    }

    tracing::debug!(
        nodes = tree.len(),
        catch_all = tree.catch_all().is_some(),
        "Route tree built"
    );
    Ok(tree)
}

fn insert(tree: &mut RouteTree, page: Page<'_>) {
    let mut parent = RouteTree::ROOT;
    let mut consumed = 0;

    loop {
        let remaining = page.pattern.suffix(consumed);
        let mut adopter: Option<(NodeId, usize)> = None;
        for &child in tree.node(parent).children() {
            let node = tree.node(child);
            if node.exact || node.catch_all || !node.pattern.is_strict_prefix_of(&remaining) {
                continue;
            }
            if adopter.map_or(true, |(_, len)| node.pattern.len() > len) {
                adopter = Some((child, node.pattern.len()));
            }
        }

        match adopter {
            Some((child, len)) => {
                parent = child;
                consumed += len;
            }
            None => break,
        }
    }

    let relative = page.pattern.suffix(consumed);
    tracing::trace!(
        path = %page.full_path,
        relative = %relative,
        parent = parent.index(),
        "Inserting route"
    );

    tree.push_child(
        parent,
        RouteNode {
            path: relative.to_string(),
            full_path: page.full_path,
            pattern: relative,
            component_key: Some(page.key),
            children: Vec::new(),
            exact: page.descriptor.exact,
            sidebar_ref: page.descriptor.sidebar.clone(),
            catch_all: false,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn child_paths(tree: &RouteTree, id: NodeId) -> Vec<&str> {
        tree.node(id)
            .children()
            .iter()
            .map(|c| tree.node(*c).path())
            .collect()
    }

    #[test]
    fn test_flat_routes_under_synthetic_root() {
        let tree = build(&[
            PageDescriptor::new("/api/endpoints", "6cf").exact(),
            PageDescriptor::new("/api/models", "d72").exact(),
            PageDescriptor::catch_all("404"),
        ])
        .unwrap();

        assert!(tree.root().component_key().is_none());
        assert_eq!(tree.root().path(), "/");
        assert_eq!(
            child_paths(&tree, tree.root_id()),
            vec!["api/endpoints", "api/models", "*"]
        );
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn test_prefix_becomes_ancestor() {
        let tree = build(&[
            PageDescriptor::new("/api/models", "d72").exact(),
            PageDescriptor::new("/api", "a00"),
            PageDescriptor::new("/api/endpoints", "6cf").exact(),
        ])
        .unwrap();

        let api = tree.root().children()[0];
        assert_eq!(tree.node(api).path(), "api");
        assert_eq!(child_paths(&tree, api), vec!["models", "endpoints"]);

        let models = tree.node(api).children()[0];
        assert_eq!(tree.node(models).full_path(), "/api/models");
    }

    #[test]
    fn test_deepest_ancestor_adopts() {
        let tree = build(&[
            PageDescriptor::new("/docs", "d00"),
            PageDescriptor::new("/docs/guides", "d01"),
            PageDescriptor::new("/docs/guides/setup", "d02").exact(),
        ])
        .unwrap();

        let docs = tree.root().children()[0];
        let guides = tree.node(docs).children()[0];
        assert_eq!(child_paths(&tree, guides), vec!["setup"]);
    }

    #[test]
    fn test_exact_routes_do_not_adopt() {
        let tree = build(&[
            PageDescriptor::new("/tron", "t00").exact(),
            PageDescriptor::new("/tron/agents", "444").exact(),
        ])
        .unwrap();

        assert_eq!(child_paths(&tree, tree.root_id()), vec!["tron", "tron/agents"]);
    }

    #[test]
    fn test_root_descriptor_owns_root() {
        let tree = build(&[
            PageDescriptor::new("/guides/setup", "e83").exact(),
            PageDescriptor::new("/", "fc9").with_sidebar("tutorialSidebar"),
        ])
        .unwrap();

        assert_eq!(tree.root().component_key().unwrap().as_str(), "fc9");
        assert_eq!(tree.root().sidebar_ref(), Some("tutorialSidebar"));
        assert_eq!(child_paths(&tree, tree.root_id()), vec!["guides/setup"]);
    }

    #[test]
    fn test_catch_all_hoisted_last() {
        let tree = build(&[
            PageDescriptor::catch_all("404"),
            PageDescriptor::new("/api", "a00"),
            PageDescriptor::new("/api/models", "d72").exact(),
        ])
        .unwrap();

        let root_children = tree.root().children();
        let last = *root_children.last().unwrap();
        assert!(tree.node(last).is_catch_all());
        assert!(tree.node(last).children().is_empty());
        assert_eq!(tree.catch_all(), Some(last));
    }

    #[test]
    fn test_duplicate_route_reports_both_keys() {
        let err = build(&[
            PageDescriptor::new("/api/models", "d72"),
            PageDescriptor::new("/api/models", "e99"),
        ])
        .unwrap_err();

        assert_eq!(
            err,
            BuildError::DuplicateRoute {
                path: "/api/models".into(),
                first: "d72".into(),
                second: "e99".into(),
            }
        );
    }

    #[test]
    fn test_duplicate_after_normalization() {
        let err = build(&[
            PageDescriptor::new("/guides/", "aaa"),
            PageDescriptor::new("/guides", "bbb"),
        ])
        .unwrap_err();
        assert!(matches!(err, BuildError::DuplicateRoute { .. }));
    }

    #[test]
    fn test_duplicate_catch_all() {
        let err = build(&[PageDescriptor::catch_all("404"), PageDescriptor::catch_all("405")])
            .unwrap_err();
        assert!(matches!(err, BuildError::DuplicateRoute { ref path, .. } if path == "*"));
    }

    #[test]
    fn test_invalid_inputs() {
        let err = build(&[PageDescriptor::new("api", "aaa")]).unwrap_err();
        assert!(matches!(err, BuildError::InvalidPath { .. }));

        let err = build(&[PageDescriptor::new("", "aaa")]).unwrap_err();
        assert!(matches!(err, BuildError::InvalidPath { .. }));

        let err = build(&[PageDescriptor::new("/api", "")]).unwrap_err();
        assert_eq!(err, BuildError::EmptyKey { path: "/api".into() });

        let err = build(&[PageDescriptor::new("/api?version=2", "aaa")]).unwrap_err();
        assert!(matches!(err, BuildError::InvalidPath { ref reason, .. } if reason.contains("query")));
    }

    #[test]
    fn test_build_is_deterministic() {
        let descriptors = vec![
            PageDescriptor::new("/", "785"),
            PageDescriptor::new("/tron/overview", "ed3").exact(),
            PageDescriptor::new("/tron", "t00"),
            PageDescriptor::new("/tron/api", "481").exact(),
            PageDescriptor::catch_all("404"),
        ];
        assert_eq!(build(&descriptors).unwrap(), build(&descriptors).unwrap());
    }

    #[test]
    fn test_display_renders_indented_tree() {
        let tree = build(&[
            PageDescriptor::new("/api", "a00"),
            PageDescriptor::new("/api/models", "d72").exact(),
            PageDescriptor::catch_all("404"),
        ])
        .unwrap();

        let rendered = tree.to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines, vec!["/ [layout]", "  api [a00]", "    models [d72] exact", "  * [404]"]);
    }

    #[test]
    fn test_component_keys_are_distinct() {
        let tree = build(&[
            PageDescriptor::new("/a", "same"),
            PageDescriptor::new("/b", "same"),
            PageDescriptor::catch_all("404"),
        ])
        .unwrap();

        let keys: Vec<String> = tree.component_keys().iter().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["same", "404"]);
    }
}
