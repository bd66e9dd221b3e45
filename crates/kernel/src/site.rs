//! Site fixtures: a page tree and static menus described in YAML.
//!
//! ```yaml
//! pages:
//!   - title: page1
//!     navigation_extenders: TestMenu
//!   - title: page2
//!     parent: page1
//! menus:
//!   TestMenu:
//!     attachable: true
//!     entries:
//!       - { id: "1", title: "sample root page", url: "/" }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{NavError, NavResult};
use crate::menu::{MenuEntry, MenuPool, StaticMenu};
use crate::models::{CreatePage, PageStore, VisibilityLimit};

#[derive(Debug, Deserialize)]
struct SiteFixture {
    #[serde(default)]
    pages: Vec<FixturePage>,
    #[serde(default)]
    menus: BTreeMap<String, FixtureMenu>,
}

#[derive(Debug, Deserialize)]
struct FixturePage {
    title: String,
    slug: Option<String>,
    menu_title: Option<String>,
    /// Title of an earlier page.
    parent: Option<String>,
    #[serde(default = "default_true")]
    in_navigation: bool,
    #[serde(default = "default_true")]
    published: bool,
    navigation_extenders: Option<String>,
    #[serde(default)]
    soft_root: bool,
    #[serde(default)]
    login_required: bool,
    #[serde(default)]
    limit_visibility: VisibilityLimit,
    reverse_id: Option<String>,
    redirect: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FixtureMenu {
    #[serde(default)]
    attachable: bool,
    #[serde(default)]
    entries: Vec<MenuEntry>,
}

fn default_true() -> bool {
    true
}

/// A loaded site: page state plus the static menus to register.
#[derive(Debug)]
pub struct Site {
    pub pages: PageStore,
    pub menus: Vec<StaticMenu>,
}

impl Site {
    /// Parse a YAML fixture.
    pub fn from_yaml(yaml: &str, config: &Config) -> NavResult<Self> {
        let fixture: SiteFixture =
            serde_yml::from_str(yaml).map_err(|e| NavError::Fixture(e.to_string()))?;

        let mut pages = PageStore::new().with_append_slash(config.append_slash);
        let mut by_title: HashMap<String, Uuid> = HashMap::new();

        for page in fixture.pages {
            let parent_id = match &page.parent {
                Some(parent) => Some(*by_title.get(parent).ok_or_else(|| {
                    NavError::Fixture(format!(
                        "page {:?} references unknown parent {parent:?}",
                        page.title
                    ))
                })?),
                None => None,
            };

            let created = pages.create(CreatePage {
                title: page.title,
                slug: page.slug,
                menu_title: page.menu_title,
                parent_id,
                in_navigation: Some(page.in_navigation),
                published: Some(page.published),
                navigation_extenders: page.navigation_extenders,
                soft_root: Some(page.soft_root),
                login_required: Some(page.login_required),
                limit_visibility: Some(page.limit_visibility),
                reverse_id: page.reverse_id,
                redirect: page.redirect,
            })?;
            by_title.insert(created.title.clone(), created.id);
        }

        let menus = fixture
            .menus
            .into_iter()
            .map(|(name, menu)| StaticMenu::new(name, menu.entries).with_attachable(menu.attachable))
            .collect();

        Ok(Self { pages, menus })
    }

    /// Read and parse a YAML fixture file.
    pub fn load(path: &Path, config: &Config) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read site fixture {}", path.display()))?;
        Self::from_yaml(&yaml, config)
            .with_context(|| format!("failed to load site fixture {}", path.display()))
    }

    /// A discovered pool with this site's static menus registered.
    pub fn menu_pool(&self) -> NavResult<MenuPool> {
        let mut pool = MenuPool::new();
        pool.discover_menus();
        for menu in &self.menus {
            pool.register_menu(menu.clone())?;
        }
        Ok(pool)
    }
}
