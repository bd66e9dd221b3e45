//! Menu tags: the renderable views templates ask for.
//!
//! Every tag rebuilds the node tree from the pool, then narrows it down to
//! what the template displays.

use std::collections::HashSet;

use super::node::{NavTree, NodeArena, NodeIndex};
use super::registry::MenuPool;
use super::request::MenuRequest;

/// Window of levels rendered by [`show_menu`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowMenu {
    /// Level whose nodes become the menu roots.
    pub from_level: usize,
    /// Deepest level rendered.
    pub to_level: usize,
    /// Levels kept below nodes off the selected path.
    pub extra_inactive: usize,
    /// Levels kept below the selected node.
    pub extra_active: usize,
    /// Restrict the menu to one provider.
    pub namespace: Option<String>,
    /// Render below the node with this `reverse_id`.
    pub root_id: Option<String>,
}

impl Default for ShowMenu {
    fn default() -> Self {
        Self {
            from_level: 0,
            to_level: 100,
            extra_inactive: 0,
            extra_active: 100,
            namespace: None,
            root_id: None,
        }
    }
}

impl ShowMenu {
    pub fn new(from_level: usize, to_level: usize, extra_inactive: usize, extra_active: usize) -> Self {
        Self {
            from_level,
            to_level,
            extra_inactive,
            extra_active,
            ..Self::default()
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn below_id(mut self, root_id: impl Into<String>) -> Self {
        self.root_id = Some(root_id.into());
        self
    }
}

/// Render the navigation menu; the result's nodes are the menu roots.
pub fn show_menu(pool: &MenuPool, request: &MenuRequest<'_>, options: &ShowMenu) -> NavTree {
    let namespace = options.namespace.as_deref();
    let root_id = options.root_id.as_deref();
    let (mut arena, nodes) = pool
        .get_nodes(request, namespace, root_id, false)
        .into_parts();

    let mut from_level = options.from_level;
    let mut to_level = options.to_level;

    let nodes = match root_id {
        Some(root_id) => {
            let root = nodes
                .iter()
                .copied()
                .find(|&n| arena[n].attr.reverse_id.as_deref() == Some(root_id));
            match root {
                Some(root) => {
                    let children = arena.children(root).to_vec();
                    for &child in &children {
                        arena.clear_parent(child);
                    }
                    let offset = arena[root].level.unwrap_or(0) + 1;
                    from_level += offset;
                    to_level += offset;
                    children
                }
                None => {
                    tracing::debug!(root_id = %root_id, "no node carries the requested reverse id");
                    Vec::new()
                }
            }
        }
        None => nodes,
    };

    let roots = cut_levels(
        &mut arena,
        &nodes,
        from_level,
        to_level,
        options.extra_inactive,
        options.extra_active,
    );
    let roots = pool.apply_modifiers(&mut arena, roots, request, namespace, root_id, true, false);
    NavTree::new(arena, roots)
}

/// Render the menu below the node whose `reverse_id` is `root_id`.
pub fn show_menu_below_id(
    pool: &MenuPool,
    request: &MenuRequest<'_>,
    root_id: &str,
    options: &ShowMenu,
) -> NavTree {
    let options = options.clone().below_id(root_id);
    show_menu(pool, request, &options)
}

/// Render the children of the selected node, `levels` deep.
pub fn show_sub_menu(pool: &MenuPool, request: &MenuRequest<'_>, levels: usize) -> NavTree {
    let (mut arena, nodes) = pool.get_nodes(request, None, None, false).into_parts();

    let Some(selected) = nodes.iter().copied().find(|&n| arena[n].selected) else {
        return NavTree::new(arena, Vec::new());
    };

    let mut removed = HashSet::new();
    arena.cut_after(selected, levels, &mut removed);
    let children = arena.children(selected).to_vec();
    for &child in &children {
        arena.clear_parent(child);
    }
    let children = pool.apply_modifiers(&mut arena, children, request, None, None, true, false);
    NavTree::new(arena, children)
}

/// Trail from home to the selected node, skipping `start_level` entries.
pub fn show_breadcrumb(pool: &MenuPool, request: &MenuRequest<'_>, start_level: usize) -> NavTree {
    let (arena, nodes) = pool.get_nodes(request, None, None, true).into_parts();

    let selected = nodes.iter().copied().find(|&n| arena[n].selected);
    let home = nodes.iter().copied().find(|&n| arena[n].attr.is_home);

    let mut trail = Vec::new();
    if let Some(selected) = selected
        && Some(selected) != home
    {
        let mut current = Some(selected);
        while let Some(node) = current {
            if arena[node].visible {
                trail.push(node);
            }
            current = arena.parent(node);
        }
    }
    if let Some(home) = home
        && trail.last() != Some(&home)
    {
        trail.push(home);
    }
    trail.reverse();

    let trail = trail.get(start_level..).map(<[_]>::to_vec).unwrap_or_default();
    NavTree::new(arena, trail)
}

/// Reduce a leveled node list to the menu roots.
///
/// Nodes at `from_level` become roots. Below nodes off the selected path only
/// `extra_inactive` levels survive; below the selected node `extra_active`.
/// Nodes deeper than `to_level` and invisible nodes are detached from their
/// parents, which drops their subtrees with them.
pub fn cut_levels(
    arena: &mut NodeArena,
    nodes: &[NodeIndex],
    from_level: usize,
    to_level: usize,
    extra_inactive: usize,
    extra_active: usize,
) -> Vec<NodeIndex> {
    let mut roots = Vec::new();
    let mut removed: HashSet<NodeIndex> = HashSet::new();
    let mut selected = None;

    for &node in nodes {
        let Some(level) = arena[node].level else {
            remove(arena, node, &mut removed);
            continue;
        };

        if level == from_level {
            roots.push(node);
            arena.clear_parent(node);
        }
        let current = &arena[node];
        if !current.ancestor && !current.selected && !current.descendant {
            arena.cut_after(node, extra_inactive, &mut removed);
        }
        if level > to_level && arena.parent(node).is_some() {
            remove(arena, node, &mut removed);
        }
        if arena[node].selected {
            selected = Some(node);
        }
        if !arena[node].visible {
            remove(arena, node, &mut removed);
        }
    }

    if let Some(selected) = selected {
        arena.cut_after(selected, extra_active, &mut removed);
    }

    roots.retain(|node| !removed.contains(node));
    roots
}

fn remove(arena: &mut NodeArena, node: NodeIndex, removed: &mut HashSet<NodeIndex>) {
    removed.insert(node);
    arena.unlink(node);
}
