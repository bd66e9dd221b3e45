//! Page model and the in-memory page store.
//!
//! Pages form an ordered forest: each page has an optional parent and a
//! `position` among its siblings. The store owns every page and hands out
//! tree-ordered views; navigation is built from those views on each render.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{NavError, NavResult};

/// Which visitors may see a page in navigation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisibilityLimit {
    /// Shown to every visitor.
    #[default]
    All,
    /// Shown only to authenticated visitors.
    Authenticated,
    /// Shown only to anonymous visitors.
    Anonymous,
}

/// Page record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Unique identifier (UUIDv7).
    pub id: Uuid,

    /// Display title.
    pub title: String,

    /// URL segment.
    pub slug: String,

    /// Title used in menus instead of `title`.
    pub menu_title: Option<String>,

    /// Optional parent page for hierarchy.
    pub parent_id: Option<Uuid>,

    /// Order among siblings (lower = earlier).
    pub position: i32,

    /// Whether the page appears in rendered navigation.
    pub in_navigation: bool,

    /// Whether the page is published.
    pub published: bool,

    /// Name of the menu provider whose nodes extend this page's children.
    pub navigation_extenders: Option<String>,

    /// Menus rendered below this page treat it as their root.
    pub soft_root: bool,

    /// Hidden from anonymous visitors.
    pub login_required: bool,

    /// Visitor-based navigation visibility.
    pub limit_visibility: VisibilityLimit,

    /// Stable handle used by `show_menu_below_id`.
    pub reverse_id: Option<String>,

    /// External redirect target.
    pub redirect: Option<String>,

    /// Unix timestamp when created.
    pub created: i64,

    /// Unix timestamp when last changed.
    pub changed: i64,
}

impl Page {
    /// Title shown in menus.
    pub fn menu_title(&self) -> &str {
        self.menu_title.as_deref().unwrap_or(&self.title)
    }

    /// The extender name, ignoring blank values.
    pub fn extender(&self) -> Option<&str> {
        self.navigation_extenders
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// Input for creating a page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatePage {
    pub title: String,
    pub slug: Option<String>,
    pub menu_title: Option<String>,
    pub parent_id: Option<Uuid>,
    pub in_navigation: Option<bool>,
    pub published: Option<bool>,
    pub navigation_extenders: Option<String>,
    pub soft_root: Option<bool>,
    pub login_required: Option<bool>,
    pub limit_visibility: Option<VisibilityLimit>,
    pub reverse_id: Option<String>,
    pub redirect: Option<String>,
}

/// Input for updating a page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePage {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub menu_title: Option<Option<String>>,
    pub parent_id: Option<Option<Uuid>>,
    pub in_navigation: Option<bool>,
    pub published: Option<bool>,
    pub navigation_extenders: Option<Option<String>>,
    pub soft_root: Option<bool>,
    pub login_required: Option<bool>,
    pub limit_visibility: Option<VisibilityLimit>,
    pub reverse_id: Option<Option<String>>,
    pub redirect: Option<Option<String>>,
}

/// In-memory page store.
#[derive(Debug, Clone)]
pub struct PageStore {
    pages: HashMap<Uuid, Page>,
    append_slash: bool,
}

impl Default for PageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PageStore {
    /// Create an empty store producing slash-terminated URLs.
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            append_slash: true,
        }
    }

    /// Set whether page URLs end with a slash.
    pub fn with_append_slash(mut self, append_slash: bool) -> Self {
        self.append_slash = append_slash;
        self
    }

    /// Create a new page as the last child of its parent.
    pub fn create(&mut self, input: CreatePage) -> NavResult<Page> {
        if let Some(parent_id) = input.parent_id
            && !self.pages.contains_key(&parent_id)
        {
            return Err(NavError::PageNotFound(parent_id));
        }

        let slug = slugify(input.slug.as_deref().unwrap_or(&input.title));
        if slug.is_empty() {
            return Err(NavError::InvalidSlug { title: input.title });
        }

        let now = chrono::Utc::now().timestamp();
        let page = Page {
            id: Uuid::now_v7(),
            title: input.title,
            slug,
            menu_title: input.menu_title,
            parent_id: input.parent_id,
            position: self.next_position(input.parent_id),
            in_navigation: input.in_navigation.unwrap_or(true),
            published: input.published.unwrap_or(false),
            navigation_extenders: input.navigation_extenders,
            soft_root: input.soft_root.unwrap_or(false),
            login_required: input.login_required.unwrap_or(false),
            limit_visibility: input.limit_visibility.unwrap_or_default(),
            reverse_id: input.reverse_id,
            redirect: input.redirect,
            created: now,
            changed: now,
        };

        tracing::debug!(page = %page.id, slug = %page.slug, "created page");
        self.pages.insert(page.id, page.clone());
        Ok(page)
    }

    /// Find a page by ID.
    pub fn find_by_id(&self, id: Uuid) -> Option<&Page> {
        self.pages.get(&id)
    }

    /// Update a page. Moving a page appends it to its new siblings.
    pub fn update(&mut self, id: Uuid, input: UpdatePage) -> NavResult<Page> {
        let Some(existing) = self.pages.get(&id).cloned() else {
            return Err(NavError::PageNotFound(id));
        };

        let mut page = existing;

        if let Some(parent_id) = input.parent_id
            && parent_id != page.parent_id
        {
            if let Some(new_parent) = parent_id {
                if !self.pages.contains_key(&new_parent) {
                    return Err(NavError::PageNotFound(new_parent));
                }
                if new_parent == id || self.ancestor_ids(new_parent).contains(&id) {
                    return Err(NavError::CyclicParent {
                        page: id,
                        parent: new_parent,
                    });
                }
            }
            page.parent_id = parent_id;
            page.position = self.next_position(parent_id);
        }

        if let Some(title) = input.title {
            page.title = title;
        }
        if let Some(slug) = input.slug {
            let slug = slugify(&slug);
            if slug.is_empty() {
                return Err(NavError::InvalidSlug { title: page.title });
            }
            page.slug = slug;
        }
        if let Some(menu_title) = input.menu_title {
            page.menu_title = menu_title;
        }
        if let Some(in_navigation) = input.in_navigation {
            page.in_navigation = in_navigation;
        }
        if let Some(published) = input.published {
            page.published = published;
        }
        if let Some(extenders) = input.navigation_extenders {
            page.navigation_extenders = extenders;
        }
        if let Some(soft_root) = input.soft_root {
            page.soft_root = soft_root;
        }
        if let Some(login_required) = input.login_required {
            page.login_required = login_required;
        }
        if let Some(limit) = input.limit_visibility {
            page.limit_visibility = limit;
        }
        if let Some(reverse_id) = input.reverse_id {
            page.reverse_id = reverse_id;
        }
        if let Some(redirect) = input.redirect {
            page.redirect = redirect;
        }
        page.changed = chrono::Utc::now().timestamp();

        self.pages.insert(id, page.clone());
        Ok(page)
    }

    /// Delete a page and its whole subtree. Returns the number of removed pages.
    pub fn delete(&mut self, id: Uuid) -> NavResult<usize> {
        if !self.pages.contains_key(&id) {
            return Err(NavError::PageNotFound(id));
        }

        let mut doomed = vec![id];
        let mut cursor = 0;
        while cursor < doomed.len() {
            let current = doomed[cursor];
            doomed.extend(
                self.pages
                    .values()
                    .filter(|p| p.parent_id == Some(current))
                    .map(|p| p.id),
            );
            cursor += 1;
        }

        for page_id in &doomed {
            self.pages.remove(page_id);
        }
        Ok(doomed.len())
    }

    /// Children of a page in sibling order.
    pub fn children_of(&self, id: Uuid) -> Vec<&Page> {
        let mut children: Vec<&Page> = self
            .pages
            .values()
            .filter(|p| p.parent_id == Some(id))
            .collect();
        children.sort_by_key(|p| (p.position, p.id));
        children
    }

    /// Ancestors of a page, root first.
    pub fn ancestors(&self, id: Uuid) -> Vec<&Page> {
        let mut chain: Vec<&Page> = self
            .ancestor_ids(id)
            .into_iter()
            .filter_map(|ancestor| self.pages.get(&ancestor))
            .collect();
        chain.reverse();
        chain
    }

    /// All pages, depth-first with siblings by position.
    pub fn tree_order(&self) -> Vec<&Page> {
        let mut by_parent: HashMap<Option<Uuid>, Vec<&Page>> = HashMap::new();
        for page in self.pages.values() {
            by_parent.entry(page.parent_id).or_default().push(page);
        }
        for siblings in by_parent.values_mut() {
            siblings.sort_by_key(|p| (p.position, p.id));
        }

        let mut ordered = Vec::with_capacity(self.pages.len());
        let mut stack: Vec<&Page> = by_parent
            .get(&None)
            .map(|roots| roots.iter().rev().copied().collect())
            .unwrap_or_default();

        while let Some(page) = stack.pop() {
            ordered.push(page);
            if let Some(children) = by_parent.get(&Some(page.id)) {
                stack.extend(children.iter().rev().copied());
            }
        }
        ordered
    }

    /// Published pages in tree order.
    pub fn published(&self) -> Vec<&Page> {
        self.tree_order()
            .into_iter()
            .filter(|p| p.published)
            .collect()
    }

    /// The home page: the first published page in tree order.
    pub fn home(&self) -> Option<&Page> {
        self.tree_order().into_iter().find(|p| p.published)
    }

    /// Resolve the URL of a page.
    ///
    /// The home page lives at `/`; every other page is addressed by the slugs
    /// of its ancestors (home excluded) followed by its own slug.
    pub fn absolute_url(&self, page: &Page) -> String {
        self.url_under_home(page, self.home().map(|h| h.id))
    }

    /// [`Self::absolute_url`] with the home page already resolved, for callers
    /// that build urls for many pages at once.
    pub fn url_under_home(&self, page: &Page, home_id: Option<Uuid>) -> String {
        if Some(page.id) == home_id {
            return "/".to_string();
        }

        let mut segments: Vec<&str> = self
            .ancestors(page.id)
            .into_iter()
            .filter(|ancestor| Some(ancestor.id) != home_id)
            .map(|ancestor| ancestor.slug.as_str())
            .collect();
        segments.push(&page.slug);

        let mut url = format!("/{}", segments.join("/"));
        if self.append_slash {
            url.push('/');
        }
        url
    }

    /// Number of stored pages.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    fn next_position(&self, parent_id: Option<Uuid>) -> i32 {
        self.pages
            .values()
            .filter(|p| p.parent_id == parent_id)
            .map(|p| p.position + 1)
            .max()
            .unwrap_or(0)
    }

    /// Parent chain of a page, nearest first.
    fn ancestor_ids(&self, id: Uuid) -> Vec<Uuid> {
        let mut chain = Vec::new();
        let mut current = self.pages.get(&id).and_then(|p| p.parent_id);
        while let Some(parent_id) = current {
            if chain.contains(&parent_id) {
                break;
            }
            chain.push(parent_id);
            current = self.pages.get(&parent_id).and_then(|p| p.parent_id);
        }
        chain
    }
}

/// Convert text into a URL-safe slug.
///
/// Transforms to lowercase, replaces non-alphanumeric characters with hyphens,
/// collapses consecutive hyphens, and trims leading/trailing hyphens.
pub fn slugify(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut prev_was_hyphen = true; // Start true to skip leading hyphens
    for c in text.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            result.push(c);
            prev_was_hyphen = false;
        } else if !prev_was_hyphen {
            result.push('-');
            prev_was_hyphen = true;
        }
    }

    while result.ends_with('-') {
        result.pop();
    }
    result
}
