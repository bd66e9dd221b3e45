//! Navigation nodes and the per-render node arena.
//!
//! Providers hand out detached [`NavigationNode`] values. The pool moves them
//! into a [`NodeArena`] where parent/child links are plain indices, so the
//! tree can be rewired by modifiers without shared ownership.

use std::collections::HashSet;
use std::ops::{Deref, Index, IndexMut};

use serde::Serialize;
use uuid::Uuid;

/// Position of a node inside its [`NodeArena`].
pub type NodeIndex = usize;

/// Where a node came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum NodeSource {
    /// Generated from a page.
    Page(Uuid),
    /// Generated by a menu provider.
    Provider,
}

/// Node attributes consumed by modifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeAttr {
    pub is_home: bool,
    pub soft_root: bool,
    pub auth_required: bool,
    pub visible_for_authenticated: bool,
    pub visible_for_anonymous: bool,
    pub reverse_id: Option<String>,
    /// Provider names whose root nodes are appended to this node's children.
    pub navigation_extenders: Vec<String>,
    pub redirect_url: Option<String>,
}

impl Default for NodeAttr {
    fn default() -> Self {
        Self {
            is_home: false,
            soft_root: false,
            auth_required: false,
            visible_for_authenticated: true,
            visible_for_anonymous: true,
            reverse_id: None,
            navigation_extenders: Vec::new(),
            redirect_url: None,
        }
    }
}

/// A single entry of a navigation menu.
#[derive(Debug, Clone)]
pub struct NavigationNode {
    /// Display title.
    pub title: String,
    /// Link target.
    pub url: String,
    /// Identifier, unique within its namespace.
    pub id: String,
    /// Name of the provider that produced the node. Filled in by the pool
    /// when left empty.
    pub namespace: String,
    /// Identifier of the parent node, if any.
    pub parent_id: Option<String>,
    /// Namespace of the parent node.
    pub parent_namespace: Option<String>,
    /// Whether the node is rendered. Invisible nodes take their subtree with
    /// them when levels are cut.
    pub visible: bool,
    pub attr: NodeAttr,
    pub source: NodeSource,

    pub selected: bool,
    pub ancestor: bool,
    pub descendant: bool,
    pub sibling: bool,
    pub is_leaf_node: bool,
    /// Depth in the full tree, set by the `Level` modifier before cutting.
    pub level: Option<usize>,
    /// Depth in the rendered menu, set by the `Level` modifier after cutting.
    pub menu_level: Option<usize>,

    parent: Option<NodeIndex>,
    children: Vec<NodeIndex>,
}

impl NavigationNode {
    /// Create a visible provider node.
    pub fn new(title: impl Into<String>, url: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            id: id.into(),
            namespace: String::new(),
            parent_id: None,
            parent_namespace: None,
            visible: true,
            attr: NodeAttr::default(),
            source: NodeSource::Provider,
            selected: false,
            ancestor: false,
            descendant: false,
            sibling: false,
            is_leaf_node: true,
            level: None,
            menu_level: None,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Reference a parent node by its identifier.
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_attr(mut self, attr: NodeAttr) -> Self {
        self.attr = attr;
        self
    }

    pub fn with_source(mut self, source: NodeSource) -> Self {
        self.source = source;
        self
    }

    /// The URL this node links to.
    pub fn absolute_url(&self) -> &str {
        &self.url
    }

    /// Link target for rendering: the redirect when one is set, the node url
    /// otherwise. Selection still matches against [`Self::absolute_url`].
    pub fn link(&self) -> &str {
        self.attr.redirect_url.as_deref().unwrap_or(&self.url)
    }

    /// The title shown in menus.
    pub fn menu_title(&self) -> &str {
        &self.title
    }
}

/// Owner of every node built for one render.
#[derive(Debug, Clone, Default)]
pub struct NodeArena {
    nodes: Vec<NavigationNode>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move a node into the arena. Any links it carried are reset.
    pub fn push(&mut self, mut node: NavigationNode) -> NodeIndex {
        node.parent = None;
        node.children.clear();
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, index: NodeIndex) -> Option<&NavigationNode> {
        self.nodes.get(index)
    }

    pub fn parent(&self, index: NodeIndex) -> Option<NodeIndex> {
        self.nodes[index].parent
    }

    pub fn children(&self, index: NodeIndex) -> &[NodeIndex] {
        &self.nodes[index].children
    }

    /// Append `child` to the children of `parent`.
    pub fn attach(&mut self, parent: NodeIndex, child: NodeIndex) {
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
    }

    /// Remove `child` from its parent's children list. The child keeps its
    /// parent reference, so it is no longer reachable from a root and is not
    /// a root itself.
    pub fn unlink(&mut self, child: NodeIndex) {
        if let Some(parent) = self.nodes[child].parent {
            self.nodes[parent].children.retain(|&c| c != child);
        }
    }

    /// Forget the parent reference of a node, turning it into a root. The old
    /// parent's children list is left untouched.
    pub fn clear_parent(&mut self, index: NodeIndex) {
        self.nodes[index].parent = None;
    }

    /// Drop every child of a node.
    pub fn clear_children(&mut self, index: NodeIndex) -> Vec<NodeIndex> {
        std::mem::take(&mut self.nodes[index].children)
    }

    /// All descendants in depth-first order.
    pub fn descendants(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let mut found = Vec::new();
        let mut seen = HashSet::from([index]);
        let mut stack: Vec<NodeIndex> = self.nodes[index].children.iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            found.push(current);
            stack.extend(self.nodes[current].children.iter().rev().copied());
        }
        found
    }

    /// Ancestors, nearest first.
    pub fn ancestors(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let mut found = Vec::new();
        let mut current = self.nodes[index].parent;
        while let Some(parent) = current {
            if parent == index || found.contains(&parent) {
                break;
            }
            found.push(parent);
            current = self.nodes[parent].parent;
        }
        found
    }

    /// Keep `levels` generations below `index`; everything deeper is dropped
    /// and recorded in `removed`.
    pub fn cut_after(&mut self, index: NodeIndex, levels: usize, removed: &mut HashSet<NodeIndex>) {
        if levels == 0 {
            removed.extend(self.clear_children(index));
        } else {
            for child in self.nodes[index].children.clone() {
                self.cut_after(child, levels - 1, removed);
            }
        }
    }
}

impl Index<NodeIndex> for NodeArena {
    type Output = NavigationNode;

    fn index(&self, index: NodeIndex) -> &Self::Output {
        &self.nodes[index]
    }
}

impl IndexMut<NodeIndex> for NodeArena {
    fn index_mut(&mut self, index: NodeIndex) -> &mut Self::Output {
        &mut self.nodes[index]
    }
}

/// A rendered navigation result: an arena plus the node list handed to the
/// template. For `MenuPool::get_nodes` the list is every node; for the menu
/// tags it is the top-level entries.
#[derive(Debug, Clone, Default)]
pub struct NavTree {
    arena: NodeArena,
    nodes: Vec<NodeIndex>,
}

impl NavTree {
    pub fn new(arena: NodeArena, nodes: Vec<NodeIndex>) -> Self {
        Self { arena, nodes }
    }

    /// Entry nodes in order.
    pub fn nodes(&self) -> Vec<NodeRef<'_>> {
        self.nodes
            .iter()
            .map(|&index| NodeRef {
                arena: &self.arena,
                index,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look a node up by namespace and identifier.
    pub fn find(&self, namespace: &str, id: &str) -> Option<NodeRef<'_>> {
        self.reachable()
            .into_iter()
            .find(|&index| self.arena[index].namespace == namespace && self.arena[index].id == id)
            .map(|index| NodeRef {
                arena: &self.arena,
                index,
            })
    }

    /// The selected node, if it is part of the result.
    pub fn selected(&self) -> Option<NodeRef<'_>> {
        self.reachable()
            .into_iter()
            .find(|&index| self.arena[index].selected)
            .map(|index| NodeRef {
                arena: &self.arena,
                index,
            })
    }

    /// Number of nodes reachable from the entry nodes, entries included.
    pub fn total_nodes(&self) -> usize {
        self.reachable().len()
    }

    /// Serializable copy of the tree for template collaborators.
    pub fn to_items(&self) -> Vec<MenuItem> {
        self.nodes().iter().map(NodeRef::to_item).collect()
    }

    pub fn into_parts(self) -> (NodeArena, Vec<NodeIndex>) {
        (self.arena, self.nodes)
    }

    fn reachable(&self) -> Vec<NodeIndex> {
        let mut seen = HashSet::new();
        let mut ordered = Vec::new();
        for &entry in &self.nodes {
            for index in std::iter::once(entry).chain(self.arena.descendants(entry)) {
                if seen.insert(index) {
                    ordered.push(index);
                }
            }
        }
        ordered
    }
}

/// Borrowed view of one node inside a [`NavTree`].
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    arena: &'a NodeArena,
    index: NodeIndex,
}

impl<'a> NodeRef<'a> {
    pub fn index(&self) -> NodeIndex {
        self.index
    }

    /// Children in render order.
    pub fn children(&self) -> Vec<NodeRef<'a>> {
        self.arena
            .children(self.index)
            .iter()
            .map(|&index| NodeRef {
                arena: self.arena,
                index,
            })
            .collect()
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.arena.parent(self.index).map(|index| NodeRef {
            arena: self.arena,
            index,
        })
    }

    pub fn descendants(&self) -> Vec<NodeRef<'a>> {
        self.arena
            .descendants(self.index)
            .into_iter()
            .map(|index| NodeRef {
                arena: self.arena,
                index,
            })
            .collect()
    }

    pub fn to_item(&self) -> MenuItem {
        let node = &self.arena[self.index];
        MenuItem {
            title: node.title.clone(),
            url: node.url.clone(),
            redirect_url: node.attr.redirect_url.clone(),
            namespace: node.namespace.clone(),
            id: node.id.clone(),
            source: node.source,
            selected: node.selected,
            ancestor: node.ancestor,
            descendant: node.descendant,
            sibling: node.sibling,
            level: node.level,
            menu_level: node.menu_level,
            children: self.children().iter().map(NodeRef::to_item).collect(),
        }
    }
}

impl Deref for NodeRef<'_> {
    type Target = NavigationNode;

    fn deref(&self) -> &Self::Target {
        &self.arena[self.index]
    }
}

/// Owned, serializable navigation entry.
#[derive(Debug, Clone, Serialize)]
pub struct MenuItem {
    pub title: String,
    pub url: String,
    /// External target the entry links to instead of `url`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    pub namespace: String,
    pub id: String,
    pub source: NodeSource,
    pub selected: bool,
    pub ancestor: bool,
    pub descendant: bool,
    pub sibling: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub menu_level: Option<usize>,
    pub children: Vec<MenuItem>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn arena_with(count: usize) -> NodeArena {
        let mut arena = NodeArena::new();
        for i in 0..count {
            arena.push(NavigationNode::new(format!("n{i}"), format!("/n{i}/"), i.to_string()));
        }
        arena
    }

    #[test]
    fn attach_and_walk() {
        let mut arena = arena_with(4);
        arena.attach(0, 1);
        arena.attach(1, 2);
        arena.attach(0, 3);

        assert_eq!(arena.children(0), &[1, 3]);
        assert_eq!(arena.descendants(0), vec![1, 2, 3]);
        assert_eq!(arena.ancestors(2), vec![1, 0]);
    }

    #[test]
    fn walks_stop_at_cycles() {
        let mut arena = arena_with(3);
        arena.attach(0, 1);
        arena.attach(1, 2);
        arena.attach(2, 0);

        assert_eq!(arena.descendants(0), vec![1, 2]);
        assert_eq!(arena.ancestors(0), vec![2, 1]);
    }

    #[test]
    fn redirect_overrides_link_target() {
        let mut arena = arena_with(2);
        arena[1].attr.redirect_url = Some("https://example.com/".to_string());
        arena.attach(0, 1);
        let tree = NavTree::new(arena, vec![0]);

        let child = tree.nodes()[0].children()[0];
        assert_eq!(child.link(), "https://example.com/");
        assert_eq!(child.absolute_url(), "/n1/");
        assert_eq!(tree.nodes()[0].link(), "/n0/");

        let items = tree.to_items();
        assert_eq!(items[0].redirect_url, None);
        assert_eq!(
            items[0].children[0].redirect_url.as_deref(),
            Some("https://example.com/")
        );
    }

    #[test]
    fn unlink_keeps_parent_reference() {
        let mut arena = arena_with(2);
        arena.attach(0, 1);
        arena.unlink(1);

        assert!(arena.children(0).is_empty());
        assert_eq!(arena.parent(1), Some(0));
    }

    #[test]
    fn cut_after_drops_deeper_generations() {
        let mut arena = arena_with(4);
        arena.attach(0, 1);
        arena.attach(1, 2);
        arena.attach(2, 3);

        let mut removed = HashSet::new();
        arena.cut_after(0, 1, &mut removed);

        assert_eq!(arena.children(0), &[1]);
        assert!(arena.children(1).is_empty());
        assert!(removed.contains(&2));
        assert!(!removed.contains(&3));
    }

    #[test]
    fn tree_views_follow_links() {
        let mut arena = arena_with(3);
        arena.attach(0, 1);
        arena.attach(0, 2);
        arena[2].selected = true;

        let tree = NavTree::new(arena, vec![0]);
        let roots = tree.nodes();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].children().len(), 2);
        assert_eq!(roots[0].children()[1].absolute_url(), "/n2/");
        assert_eq!(roots[0].children()[1].parent().unwrap().index(), 0);
        assert_eq!(tree.selected().unwrap().id, "2");
        assert_eq!(tree.total_nodes(), 3);

        let items = tree.to_items();
        assert_eq!(items[0].children.len(), 2);
        let json = serde_json::to_value(&items).unwrap();
        assert_eq!(json[0]["children"][0]["url"], "/n1/");
    }
}
