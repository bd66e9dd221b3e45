//! Menu providers: the page tree menu and declarative static menus.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::node::{NavigationNode, NodeAttr, NodeSource};
use super::request::MenuRequest;
use crate::models::{Page, PageStore, VisibilityLimit};

/// Name under which the page tree menu is registered.
pub const PAGE_MENU: &str = "PageMenu";

/// A named source of navigation nodes.
///
/// Nodes may reference a parent by its provider-local `id`; the pool links
/// them and fills in the namespace.
pub trait MenuProvider: Send + Sync {
    /// Unique registry name, also used as extender name.
    fn name(&self) -> &str;

    /// Produce this provider's nodes for one render.
    fn get_nodes(&self, request: &MenuRequest<'_>) -> Vec<NavigationNode>;

    /// Attachable providers only appear where a page names them as its
    /// navigation extender; unclaimed nodes are dropped.
    fn attachable(&self) -> bool {
        false
    }
}

/// Builds one node per published page.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageMenu;

impl MenuProvider for PageMenu {
    fn name(&self) -> &str {
        PAGE_MENU
    }

    fn get_nodes(&self, request: &MenuRequest<'_>) -> Vec<NavigationNode> {
        let pages = request.pages.published();
        let Some(home) = pages.first().copied() else {
            return Vec::new();
        };

        // A hidden home page lifts its children to the top level.
        let home_cut = !home.in_navigation;

        pages
            .iter()
            .map(|page| page_to_node(request.pages, page, home, home_cut))
            .collect()
    }
}

fn page_to_node(store: &PageStore, page: &Page, home: &Page, home_cut: bool) -> NavigationNode {
    let parent_id = match page.parent_id {
        Some(parent) if home_cut && parent == home.id => None,
        other => other,
    };

    let attr = NodeAttr {
        is_home: page.id == home.id,
        soft_root: page.soft_root,
        auth_required: page.login_required,
        visible_for_authenticated: page.limit_visibility != VisibilityLimit::Anonymous,
        visible_for_anonymous: page.limit_visibility != VisibilityLimit::Authenticated,
        reverse_id: page.reverse_id.clone(),
        navigation_extenders: page.extender().map(str::to_string).into_iter().collect(),
        redirect_url: page.redirect.clone(),
    };

    let mut node = NavigationNode::new(
        page.menu_title(),
        store.url_under_home(page, Some(home.id)),
        page.id.to_string(),
    )
    .with_visible(page.in_navigation)
    .with_attr(attr)
    .with_source(NodeSource::Page(page.id));
    node.parent_id = parent_id.map(|id| id.to_string());
    node
}

/// One entry of a static menu.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuEntry {
    pub id: String,
    pub title: String,
    pub url: String,
    /// Identifier of the parent entry.
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Language the entry is shown in; untagged entries show in every language.
    #[serde(default)]
    pub language: Option<String>,
}

impl MenuEntry {
    fn shown_in(&self, language: &str) -> bool {
        self.language
            .as_deref()
            .is_none_or(|lang| lang.eq_ignore_ascii_case(language))
    }
}

fn default_true() -> bool {
    true
}

/// Provider serving a fixed list of entries.
#[derive(Debug, Clone)]
pub struct StaticMenu {
    name: String,
    entries: Vec<MenuEntry>,
    attachable: bool,
}

impl StaticMenu {
    pub fn new(name: impl Into<String>, entries: Vec<MenuEntry>) -> Self {
        Self {
            name: name.into(),
            entries,
            attachable: false,
        }
    }

    /// Build a menu from a JSON array of entries.
    ///
    /// Malformed JSON yields an empty menu.
    pub fn from_json(name: impl Into<String>, json: &str) -> Self {
        let name = name.into();
        let entries = match serde_json::from_str::<Vec<MenuEntry>>(json) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(menu = %name, error = %e, "failed to parse static menu entries");
                Vec::new()
            }
        };
        Self::new(name, entries)
    }

    pub fn with_attachable(mut self, attachable: bool) -> Self {
        self.attachable = attachable;
        self
    }

    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }
}

impl MenuProvider for StaticMenu {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_nodes(&self, request: &MenuRequest<'_>) -> Vec<NavigationNode> {
        self.entries
            .iter()
            .filter(|entry| entry.shown_in(&request.language))
            .map(|entry| {
                let node = NavigationNode::new(&entry.title, &entry.url, &entry.id)
                    .with_visible(entry.visible);
                match &entry.parent {
                    Some(parent) => node.with_parent(parent),
                    None => node,
                }
            })
            .collect()
    }

    fn attachable(&self) -> bool {
        self.attachable
    }
}
