//! Tree modifiers applied by the menu pool.
//!
//! Each modifier receives the arena and the current node list and returns the
//! node list to pass on. Modifiers run twice per menu render: once over the
//! full tree (`post_cut = false`) and once over the cut menu roots
//! (`post_cut = true`).

use std::collections::HashSet;

use tracing::debug;

use super::node::{NodeArena, NodeIndex};
use super::request::MenuRequest;

/// Per-pass context shared by all modifiers.
#[derive(Debug, Clone)]
pub struct ModifierContext<'a> {
    pub request: &'a MenuRequest<'a>,
    pub namespace: Option<&'a str>,
    /// `reverse_id` the menu is rendered below, if any.
    pub root_id: Option<&'a str>,
    pub post_cut: bool,
    pub breadcrumb: bool,
    /// Names of registered attachable providers.
    pub attachable_menus: &'a [String],
}

/// A pluggable tree transformation.
pub trait Modifier: Send + Sync {
    fn name(&self) -> &str;

    fn modify(
        &self,
        arena: &mut NodeArena,
        nodes: Vec<NodeIndex>,
        ctx: &ModifierContext<'_>,
    ) -> Vec<NodeIndex>;
}

/// The modifiers every discovered pool carries, in application order.
pub fn default_modifiers() -> Vec<Box<dyn Modifier>> {
    vec![
        Box::new(NavExtender),
        Box::new(SoftRootCutter),
        Box::new(Marker),
        Box::new(AuthVisibility),
        Box::new(Level),
    ]
}

/// Splices provider nodes below the pages that name them as extenders.
#[derive(Debug, Clone, Copy, Default)]
pub struct NavExtender;

impl Modifier for NavExtender {
    fn name(&self) -> &str {
        "NavExtender"
    }

    fn modify(
        &self,
        arena: &mut NodeArena,
        nodes: Vec<NodeIndex>,
        ctx: &ModifierContext<'_>,
    ) -> Vec<NodeIndex> {
        if ctx.post_cut {
            return nodes;
        }

        let mut claimed: Vec<String> = Vec::new();
        let mut home = None;

        for &node in &nodes {
            if arena[node].attr.is_home {
                home = Some(node);
            }
            let extenders = arena[node].attr.navigation_extenders.clone();
            if extenders.is_empty() {
                continue;
            }
            // Extending a hidden home keeps the provider nodes at the top level.
            let hidden_home = arena[node].attr.is_home && !arena[node].visible;

            for extender in extenders {
                if extender == arena[node].namespace {
                    debug!(
                        node = %arena[node].id,
                        extender = %extender,
                        "navigation extender names the node's own menu, keeping default children"
                    );
                    continue;
                }

                // A node never adopts itself or one of its ancestors.
                let lineage = arena.ancestors(node);
                let provider_roots: Vec<NodeIndex> = nodes
                    .iter()
                    .copied()
                    .filter(|&n| arena[n].namespace == extender && arena[n].parent_id.is_none())
                    .filter(|&n| n != node && !lineage.contains(&n))
                    .collect();

                if provider_roots.is_empty() {
                    debug!(
                        node = %arena[node].id,
                        extender = %extender,
                        "navigation extender produced no nodes, keeping default children"
                    );
                }

                for provider_root in provider_roots {
                    if hidden_home {
                        continue;
                    }
                    let parent_id = arena[node].id.clone();
                    let parent_namespace = arena[node].namespace.clone();
                    arena[provider_root].parent_id = Some(parent_id);
                    arena[provider_root].parent_namespace = Some(parent_namespace);
                    arena.attach(node, provider_root);
                }

                if !claimed.contains(&extender) {
                    claimed.push(extender);
                }
            }
        }

        if ctx.breadcrumb
            && let Some(home) = home
            && !arena[home].visible
        {
            arena[home].visible = true;
            arena[home].selected = arena[home].url == ctx.request.path;
        }

        let unclaimed: Vec<&String> = ctx
            .attachable_menus
            .iter()
            .filter(|name| !claimed.contains(name))
            .collect();
        if unclaimed.is_empty() {
            return nodes;
        }

        nodes
            .into_iter()
            .filter(|&n| !unclaimed.iter().any(|name| **name == arena[n].namespace))
            .collect()
    }
}

/// Confines the menu to the soft root above the selected node.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftRootCutter;

impl Modifier for SoftRootCutter {
    fn name(&self) -> &str {
        "SoftRootCutter"
    }

    fn modify(
        &self,
        arena: &mut NodeArena,
        nodes: Vec<NodeIndex>,
        ctx: &ModifierContext<'_>,
    ) -> Vec<NodeIndex> {
        if ctx.post_cut || ctx.root_id.is_some() {
            return nodes;
        }
        let Some(selected) = nodes.iter().copied().find(|&n| arena[n].selected) else {
            return nodes;
        };

        let mut path = vec![selected];
        path.extend(arena.ancestors(selected));

        if let Some(soft_root) = path.iter().copied().find(|&n| arena[n].attr.soft_root) {
            arena.clear_parent(soft_root);
            let mut kept = vec![soft_root];
            kept.extend(arena.descendants(soft_root));
            return kept;
        }

        // Off the selected path, soft roots are shown without their subtrees.
        let mut dropped = Vec::new();
        for &node in &nodes {
            if arena[node].attr.soft_root && !path.contains(&node) && !dropped.contains(&node) {
                dropped.extend(arena.descendants(node));
                arena.clear_children(node);
            }
        }
        nodes
            .into_iter()
            .filter(|n| !dropped.contains(n))
            .collect()
    }
}

/// Marks ancestors, descendants, and siblings of the selected node.
#[derive(Debug, Clone, Copy, Default)]
pub struct Marker;

impl Modifier for Marker {
    fn name(&self) -> &str {
        "Marker"
    }

    fn modify(
        &self,
        arena: &mut NodeArena,
        nodes: Vec<NodeIndex>,
        ctx: &ModifierContext<'_>,
    ) -> Vec<NodeIndex> {
        if ctx.post_cut || ctx.breadcrumb {
            return nodes;
        }

        let mut selected: Option<NodeIndex> = None;
        let mut root_nodes = Vec::new();

        for &node in &nodes {
            if arena.parent(node).is_none() {
                if let Some(sel) = selected
                    && arena.parent(sel).is_none()
                {
                    arena[node].sibling = true;
                }
                root_nodes.push(node);
            }

            if arena[node].selected {
                match arena.parent(node) {
                    Some(parent) => {
                        for ancestor in arena.ancestors(node) {
                            arena[ancestor].ancestor = true;
                        }
                        for sibling in arena.children(parent).to_vec() {
                            if !arena[sibling].selected {
                                arena[sibling].sibling = true;
                            }
                        }
                    }
                    None => {
                        for &root in &root_nodes {
                            if !arena[root].selected {
                                arena[root].sibling = true;
                            }
                        }
                    }
                }
                for descendant in arena.descendants(node) {
                    arena[descendant].descendant = true;
                }
                selected = Some(node);
            }

            arena[node].is_leaf_node = arena.children(node).is_empty();
        }
        nodes
    }
}

/// Drops nodes the current visitor may not see.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthVisibility;

impl Modifier for AuthVisibility {
    fn name(&self) -> &str {
        "AuthVisibility"
    }

    fn modify(
        &self,
        arena: &mut NodeArena,
        nodes: Vec<NodeIndex>,
        ctx: &ModifierContext<'_>,
    ) -> Vec<NodeIndex> {
        if ctx.post_cut || ctx.breadcrumb {
            return nodes;
        }

        let authenticated = ctx.request.visitor.is_authenticated();
        let mut kept = Vec::with_capacity(nodes.len());
        for node in nodes {
            let attr = &arena[node].attr;
            let allowed = if authenticated {
                attr.visible_for_authenticated
            } else {
                attr.visible_for_anonymous && !attr.auth_required
            };
            if allowed {
                kept.push(node);
            } else {
                arena.unlink(node);
            }
        }
        kept
    }
}

/// Assigns tree depth from the roots down.
#[derive(Debug, Clone, Copy, Default)]
pub struct Level;

impl Modifier for Level {
    fn name(&self) -> &str {
        "Level"
    }

    fn modify(
        &self,
        arena: &mut NodeArena,
        nodes: Vec<NodeIndex>,
        ctx: &ModifierContext<'_>,
    ) -> Vec<NodeIndex> {
        if ctx.breadcrumb {
            return nodes;
        }

        for &node in &nodes {
            if arena.parent(node).is_some() {
                continue;
            }
            let mut seen = HashSet::new();
            let mut stack = vec![(node, 0usize)];
            while let Some((current, depth)) = stack.pop() {
                if !seen.insert(current) {
                    continue;
                }
                if ctx.post_cut {
                    arena[current].menu_level = Some(depth);
                } else {
                    arena[current].level = Some(depth);
                }
                stack.extend(
                    arena
                        .children(current)
                        .iter()
                        .map(|&child| (child, depth + 1)),
                );
            }
        }
        nodes
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::menu::node::{NavigationNode, NodeAttr};
    use crate::menu::request::Visitor;
    use crate::models::PageStore;

    fn context<'a>(request: &'a MenuRequest<'a>, attachable: &'a [String]) -> ModifierContext<'a> {
        ModifierContext {
            request,
            namespace: None,
            root_id: None,
            post_cut: false,
            breadcrumb: false,
            attachable_menus: attachable,
        }
    }

    fn node(arena: &mut NodeArena, namespace: &str, id: &str) -> NodeIndex {
        let mut n = NavigationNode::new(id, format!("/{id}/"), id);
        n.namespace = namespace.to_string();
        arena.push(n)
    }

    #[test]
    fn extender_appends_provider_roots_after_children() {
        let store = PageStore::new();
        let request = MenuRequest::new(&store, "/");
        let attachable = vec!["Ext".to_string()];
        let ctx = context(&request, &attachable);

        let mut arena = NodeArena::new();
        let page = node(&mut arena, "PageMenu", "page");
        let child = node(&mut arena, "PageMenu", "child");
        arena.attach(page, child);
        arena[page].attr.navigation_extenders = vec!["Ext".to_string()];
        let a = node(&mut arena, "Ext", "a");
        let b = node(&mut arena, "Ext", "b");

        let nodes = NavExtender.modify(&mut arena, vec![page, child, a, b], &ctx);
        assert_eq!(nodes.len(), 4);
        assert_eq!(arena.children(page), &[child, a, b]);
        assert_eq!(arena[a].parent_id.as_deref(), Some("page"));
        assert_eq!(arena[a].parent_namespace.as_deref(), Some("PageMenu"));
    }

    #[test]
    fn extender_on_hidden_home_keeps_provider_roots_on_top() {
        let store = PageStore::new();
        let request = MenuRequest::new(&store, "/");
        let attachable = vec!["Ext".to_string()];
        let ctx = context(&request, &attachable);

        let mut arena = NodeArena::new();
        let home = node(&mut arena, "PageMenu", "home");
        arena[home].attr = NodeAttr {
            is_home: true,
            navigation_extenders: vec!["Ext".to_string()],
            ..NodeAttr::default()
        };
        arena[home].visible = false;
        let a = node(&mut arena, "Ext", "a");

        let nodes = NavExtender.modify(&mut arena, vec![home, a], &ctx);
        assert_eq!(nodes, vec![home, a]);
        assert!(arena.children(home).is_empty());
        assert_eq!(arena.parent(a), None);
    }

    #[test]
    fn extender_naming_own_menu_keeps_default_children() {
        let store = PageStore::new();
        let request = MenuRequest::new(&store, "/");
        let ctx = context(&request, &[]);

        let mut arena = NodeArena::new();
        let root = node(&mut arena, "PageMenu", "root");
        let page = node(&mut arena, "PageMenu", "page");
        let other = node(&mut arena, "PageMenu", "other");
        arena.attach(root, page);
        arena[page].parent_id = Some("root".to_string());
        arena[page].attr.navigation_extenders = vec!["PageMenu".to_string()];

        let nodes = NavExtender.modify(&mut arena, vec![root, page, other], &ctx);
        assert_eq!(nodes, vec![root, page, other]);
        assert!(arena.children(page).is_empty());
        assert_eq!(arena.parent(root), None);
        assert_eq!(arena.parent(other), None);
    }

    #[test]
    fn extender_never_adopts_an_ancestor() {
        let store = PageStore::new();
        let request = MenuRequest::new(&store, "/");
        let ctx = context(&request, &[]);

        // a provider root that already sits above the extended node
        let mut arena = NodeArena::new();
        let top = node(&mut arena, "Ext", "top");
        let page = node(&mut arena, "PageMenu", "page");
        let sibling = node(&mut arena, "Ext", "sibling");
        arena.attach(top, page);
        arena[page].attr.navigation_extenders = vec!["Ext".to_string()];

        NavExtender.modify(&mut arena, vec![top, page, sibling], &ctx);
        assert_eq!(arena.children(page), &[sibling]);
        assert_eq!(arena.parent(top), None);
    }

    #[test]
    fn level_terminates_on_cycles() {
        let store = PageStore::new();
        let request = MenuRequest::new(&store, "/");
        let ctx = context(&request, &[]);

        let mut arena = NodeArena::new();
        let a = node(&mut arena, "PageMenu", "a");
        let b = node(&mut arena, "PageMenu", "b");
        arena.attach(a, b);
        arena.attach(b, a);
        arena.clear_parent(a);

        Level.modify(&mut arena, vec![a, b], &ctx);
        assert_eq!(arena[a].level, Some(0));
        assert_eq!(arena[b].level, Some(1));
    }

    #[test]
    fn unclaimed_attachable_nodes_are_dropped() {
        let store = PageStore::new();
        let request = MenuRequest::new(&store, "/");
        let attachable = vec!["Ext".to_string()];
        let ctx = context(&request, &attachable);

        let mut arena = NodeArena::new();
        let page = node(&mut arena, "PageMenu", "page");
        arena[page].attr.navigation_extenders = vec!["Missing".to_string()];
        let a = node(&mut arena, "Ext", "a");

        let nodes = NavExtender.modify(&mut arena, vec![page, a], &ctx);
        assert_eq!(nodes, vec![page]);
        assert!(arena.children(page).is_empty());
    }

    #[test]
    fn marker_flags_relatives_of_selection() {
        let store = PageStore::new();
        let request = MenuRequest::new(&store, "/");
        let ctx = context(&request, &[]);

        let mut arena = NodeArena::new();
        let root = node(&mut arena, "M", "root");
        let left = node(&mut arena, "M", "left");
        let right = node(&mut arena, "M", "right");
        let leaf = node(&mut arena, "M", "leaf");
        let other = node(&mut arena, "M", "other");
        arena.attach(root, left);
        arena.attach(root, right);
        arena.attach(left, leaf);
        arena[left].selected = true;

        Marker.modify(&mut arena, vec![root, left, right, leaf, other], &ctx);
        assert!(arena[root].ancestor);
        assert!(arena[right].sibling);
        assert!(!arena[left].sibling);
        assert!(arena[leaf].descendant);
        assert!(arena[leaf].is_leaf_node);
        assert!(!arena[root].is_leaf_node);
        assert!(!arena[other].sibling);
    }

    #[test]
    fn auth_visibility_respects_visitor() {
        let store = PageStore::new();
        let mut arena = NodeArena::new();
        let public = node(&mut arena, "M", "public");
        let members = node(&mut arena, "M", "members");
        let guests = node(&mut arena, "M", "guests");
        arena[members].attr.auth_required = true;
        arena[guests].attr.visible_for_authenticated = false;

        let anonymous = MenuRequest::new(&store, "/");
        let kept = AuthVisibility.modify(
            &mut arena.clone(),
            vec![public, members, guests],
            &context(&anonymous, &[]),
        );
        assert_eq!(kept, vec![public, guests]);

        let signed_in = MenuRequest::new(&store, "/").with_visitor(Visitor::Authenticated);
        let kept = AuthVisibility.modify(
            &mut arena,
            vec![public, members, guests],
            &context(&signed_in, &[]),
        );
        assert_eq!(kept, vec![public, members]);
    }

    #[test]
    fn soft_root_becomes_only_root() {
        let store = PageStore::new();
        let request = MenuRequest::new(&store, "/");
        let ctx = context(&request, &[]);

        let mut arena = NodeArena::new();
        let top = node(&mut arena, "M", "top");
        let section = node(&mut arena, "M", "section");
        let page = node(&mut arena, "M", "page");
        let other = node(&mut arena, "M", "other");
        arena.attach(top, section);
        arena.attach(section, page);
        arena[section].attr.soft_root = true;
        arena[page].selected = true;

        let nodes = SoftRootCutter.modify(&mut arena, vec![top, section, page, other], &ctx);
        assert_eq!(nodes, vec![section, page]);
        assert_eq!(arena.parent(section), None);
    }

    #[test]
    fn soft_roots_off_path_lose_children() {
        let store = PageStore::new();
        let request = MenuRequest::new(&store, "/");
        let ctx = context(&request, &[]);

        let mut arena = NodeArena::new();
        let home = node(&mut arena, "M", "home");
        let section = node(&mut arena, "M", "section");
        let inner = node(&mut arena, "M", "inner");
        arena.attach(section, inner);
        arena[section].attr.soft_root = true;
        arena[home].selected = true;

        let nodes = SoftRootCutter.modify(&mut arena, vec![home, section, inner], &ctx);
        assert_eq!(nodes, vec![home, section]);
        assert!(arena.children(section).is_empty());
    }

    #[test]
    fn level_assigns_depths() {
        let store = PageStore::new();
        let request = MenuRequest::new(&store, "/");
        let mut ctx = context(&request, &[]);

        let mut arena = NodeArena::new();
        let root = node(&mut arena, "M", "root");
        let child = node(&mut arena, "M", "child");
        let grandchild = node(&mut arena, "M", "grandchild");
        arena.attach(root, child);
        arena.attach(child, grandchild);

        Level.modify(&mut arena, vec![root, child, grandchild], &ctx);
        assert_eq!(arena[grandchild].level, Some(2));
        assert_eq!(arena[grandchild].menu_level, None);

        ctx.post_cut = true;
        arena.clear_parent(child);
        Level.modify(&mut arena, vec![child], &ctx);
        assert_eq!(arena[child].menu_level, Some(0));
        assert_eq!(arena[grandchild].menu_level, Some(1));
        assert_eq!(arena[root].menu_level, None);
    }
}
