//! Read-only sidebar view of a route tree.
//!
//! Groups routes by their `sidebar_ref` for an external navigation renderer.
//! Groups appear in the order their first route is reached in a depth-first
//! walk, and entries keep tree order.

use serde::Serialize;

use crate::routing::tree::RouteTree;
use crate::routing::types::ComponentKey;

/// One route listed in a sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SidebarEntry {
    pub path: String,
    pub key: ComponentKey,
}

/// All routes sharing a sidebar name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SidebarGroup {
    pub name: String,
    pub entries: Vec<SidebarEntry>,
}

/// Group the tree's routes by sidebar.
pub fn group(tree: &RouteTree) -> Vec<SidebarGroup> {
    let mut groups: Vec<SidebarGroup> = Vec::new();

    for (_, node, _) in tree.walk() {
        let (Some(name), Some(key)) = (node.sidebar_ref(), node.component_key()) else {
            continue;
        };
        let entry = SidebarEntry {
            path: node.full_path().to_string(),
            key: key.clone(),
        };
        match groups.iter_mut().find(|g| g.name == name) {
            Some(group) => group.entries.push(entry),
            None => groups.push(SidebarGroup {
                name: name.to_string(),
                entries: vec![entry],
            }),
        }
    }
    groups
}
