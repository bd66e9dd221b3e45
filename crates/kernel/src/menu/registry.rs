//! Menu pool - registry of menu providers and tree modifiers.
//!
//! The pool is an explicit value: callers discover the built-in menu and
//! modifiers, register their own providers, and pass the pool to the menu
//! tags on every render.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tracing::debug;

use super::modifiers::{Modifier, ModifierContext, default_modifiers};
use super::node::{NavTree, NavigationNode, NodeArena, NodeIndex};
use super::provider::{MenuProvider, PageMenu};
use super::request::MenuRequest;
use crate::error::{NavError, NavResult};

/// Registry of menu providers and modifiers.
#[derive(Default)]
pub struct MenuPool {
    /// Providers in registration order; node collection follows this order.
    menus: Vec<Arc<dyn MenuProvider>>,
    /// Modifiers in application order.
    modifiers: Vec<Arc<dyn Modifier>>,
    discovered: bool,
}

impl std::fmt::Debug for MenuPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuPool")
            .field("menus", &self.menu_names().collect::<Vec<_>>())
            .field(
                "modifiers",
                &self.modifiers.iter().map(|m| m.name()).collect::<Vec<_>>(),
            )
            .field("discovered", &self.discovered)
            .finish()
    }
}

impl MenuPool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the page menu and the default modifiers.
    ///
    /// Runs once; later calls are no-ops until [`MenuPool::clear`].
    pub fn discover_menus(&mut self) {
        if self.discovered {
            return;
        }

        if self.menu(super::provider::PAGE_MENU).is_none() {
            self.menus.push(Arc::new(PageMenu));
        }
        for modifier in default_modifiers() {
            self.modifiers.push(Arc::from(modifier));
        }
        self.discovered = true;

        debug!(
            menus = self.menus.len(),
            modifiers = self.modifiers.len(),
            "discovered menus"
        );
    }

    /// Whether [`MenuPool::discover_menus`] has run since the last clear.
    pub fn is_discovered(&self) -> bool {
        self.discovered
    }

    /// Register a menu provider. Names must be unique.
    pub fn register_menu<M>(&mut self, menu: M) -> NavResult<()>
    where
        M: MenuProvider + 'static,
    {
        self.register_shared_menu(Arc::new(menu))
    }

    /// Register an already shared provider.
    pub fn register_shared_menu(&mut self, menu: Arc<dyn MenuProvider>) -> NavResult<()> {
        if self.menu(menu.name()).is_some() {
            return Err(NavError::DuplicateMenu(menu.name().to_string()));
        }
        debug!(menu = %menu.name(), attachable = menu.attachable(), "registered menu");
        self.menus.push(menu);
        Ok(())
    }

    /// Register a modifier; it runs after those already registered.
    pub fn register_modifier<M>(&mut self, modifier: M)
    where
        M: Modifier + 'static,
    {
        self.modifiers.push(Arc::new(modifier));
    }

    /// Drop every provider and modifier and forget discovery.
    pub fn clear(&mut self) {
        self.menus.clear();
        self.modifiers.clear();
        self.discovered = false;
    }

    /// Look a provider up by name.
    pub fn menu(&self, name: &str) -> Option<&dyn MenuProvider> {
        self.menus
            .iter()
            .find(|menu| menu.name() == name)
            .map(|menu| menu.as_ref())
    }

    /// Registered provider names in registration order.
    pub fn menu_names(&self) -> impl Iterator<Item = &str> {
        self.menus.iter().map(|menu| menu.name())
    }

    /// Get provider count.
    pub fn menu_count(&self) -> usize {
        self.menus.len()
    }

    /// Get modifier count.
    pub fn modifier_count(&self) -> usize {
        self.modifiers.len()
    }

    /// Check if no provider is registered.
    pub fn is_empty(&self) -> bool {
        self.menus.is_empty()
    }

    /// Collect, link, mark, and modify the nodes of every provider.
    ///
    /// The result lists every surviving node (not only roots) with `level`
    /// assigned; the menu tags cut it down for rendering.
    pub fn get_nodes(
        &self,
        request: &MenuRequest<'_>,
        namespace: Option<&str>,
        root_id: Option<&str>,
        breadcrumb: bool,
    ) -> NavTree {
        let mut arena = NodeArena::new();
        let nodes = self.build_nodes(&mut arena, request);
        mark_selected(&mut arena, &nodes, &request.path);

        let mut nodes =
            self.apply_modifiers(&mut arena, nodes, request, namespace, root_id, false, breadcrumb);

        if let Some(namespace) = namespace {
            let (kept, foreign): (Vec<NodeIndex>, Vec<NodeIndex>) = nodes
                .into_iter()
                .partition(|&n| arena[n].namespace == namespace);
            for node in foreign {
                arena.unlink(node);
            }
            nodes = kept;
        }

        debug!(nodes = nodes.len(), path = %request.path, "built navigation nodes");
        NavTree::new(arena, nodes)
    }

    /// Run every modifier over `nodes`.
    #[allow(clippy::too_many_arguments)]
    pub fn apply_modifiers(
        &self,
        arena: &mut NodeArena,
        nodes: Vec<NodeIndex>,
        request: &MenuRequest<'_>,
        namespace: Option<&str>,
        root_id: Option<&str>,
        post_cut: bool,
        breadcrumb: bool,
    ) -> Vec<NodeIndex> {
        let attachable_menus: Vec<String> = self
            .menus
            .iter()
            .filter(|menu| menu.attachable())
            .map(|menu| menu.name().to_string())
            .collect();

        let ctx = ModifierContext {
            request,
            namespace,
            root_id,
            post_cut,
            breadcrumb,
            attachable_menus: &attachable_menus,
        };

        self.modifiers
            .iter()
            .fold(nodes, |nodes, modifier| modifier.modify(arena, nodes, &ctx))
    }

    fn build_nodes(&self, arena: &mut NodeArena, request: &MenuRequest<'_>) -> Vec<NodeIndex> {
        let mut all = Vec::new();
        for menu in &self.menus {
            let nodes = menu.get_nodes(request);
            all.extend(link_menu_nodes(arena, nodes, menu.name()));
        }
        all
    }
}

/// Move one provider's nodes into the arena, linking children to parents of
/// the same namespace.
///
/// A node whose parent has not been seen yet is retried after the others; a
/// node whose parent never shows up is dropped.
fn link_menu_nodes(
    arena: &mut NodeArena,
    nodes: Vec<NavigationNode>,
    menu_name: &str,
) -> Vec<NodeIndex> {
    let total = nodes.len();
    let mut pending: VecDeque<(NavigationNode, usize)> =
        nodes.into_iter().map(|node| (node, 0)).collect();
    let mut done: HashMap<(String, String), NodeIndex> = HashMap::new();
    let mut linked = Vec::with_capacity(total);

    while let Some((mut node, attempts)) = pending.pop_front() {
        let attempts = attempts + 1;
        if node.namespace.is_empty() {
            node.namespace = menu_name.to_string();
        }

        let parent = match node.parent_id.clone() {
            None => None,
            Some(parent_id) => {
                let key = (node.namespace.clone(), parent_id.clone());
                match done.get(&key) {
                    Some(&parent) => Some(parent),
                    None => {
                        if attempts < total {
                            pending.push_back((node, attempts));
                        } else {
                            debug!(
                                menu = %menu_name,
                                node = %node.id,
                                parent = %parent_id,
                                "dropping node with unknown parent"
                            );
                        }
                        continue;
                    }
                }
            }
        };

        if parent.is_some() && node.parent_namespace.is_none() {
            node.parent_namespace = Some(menu_name.to_string());
        }
        let key = (node.namespace.clone(), node.id.clone());
        let index = arena.push(node);
        if let Some(parent) = parent {
            arena.attach(parent, index);
        }
        done.insert(key, index);
        linked.push(index);
    }

    linked
}

/// Select the node whose URL is the longest prefix of the request path.
fn mark_selected(arena: &mut NodeArena, nodes: &[NodeIndex], path: &str) {
    let mut selected: Option<NodeIndex> = None;
    for &node in nodes {
        let current = &mut arena[node];
        current.selected = false;
        current.ancestor = false;
        current.descendant = false;
        current.sibling = false;

        if path.starts_with(current.url.as_str()) {
            let longer = match selected {
                Some(sel) => arena[node].url.len() > arena[sel].url.len(),
                None => true,
            };
            if longer {
                selected = Some(node);
            }
        }
    }
    if let Some(sel) = selected {
        arena[sel].selected = true;
    }
}
