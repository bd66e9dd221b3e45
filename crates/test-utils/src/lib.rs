//! Trellis test utilities.
//!
//! Helpers for integration testing: page fixture builders, the standard
//! navigation fixture, and a test menu provider.

use trellis_kernel::menu::{MenuPool, MenuProvider, MenuRequest, NavigationNode};
use trellis_kernel::models::{CreatePage, Page, PageStore, UpdatePage, VisibilityLimit};
use uuid::Uuid;

/// Registry name of [`TestMenu`].
pub const TEST_MENU: &str = "TestMenu";

/// Attachable provider with four nodes: three roots and one child of the
/// third root.
#[derive(Debug, Clone, Copy, Default)]
pub struct TestMenu;

impl MenuProvider for TestMenu {
    fn name(&self) -> &str {
        TEST_MENU
    }

    fn get_nodes(&self, _request: &MenuRequest<'_>) -> Vec<NavigationNode> {
        vec![
            NavigationNode::new("sample root page", "/", "1"),
            NavigationNode::new("sample settings page", "/bye/", "2"),
            NavigationNode::new("sample account page", "/hello/", "3"),
            NavigationNode::new("sample my profile page", "/hello/world/", "4").with_parent("3"),
        ]
    }

    fn attachable(&self) -> bool {
        true
    }
}

/// A discovered pool with [`TestMenu`] registered.
pub fn test_pool() -> MenuPool {
    let mut pool = MenuPool::new();
    pool.discover_menus();
    if let Err(e) = pool.register_menu(TestMenu) {
        panic!("failed to register test menu: {e}");
    }
    pool
}

/// Create a test page with default values: published and in navigation.
pub fn test_page(title: &str) -> TestPage {
    TestPage {
        input: CreatePage {
            title: title.to_string(),
            published: Some(true),
            in_navigation: Some(true),
            ..Default::default()
        },
    }
}

/// A test page builder for creating fixtures.
#[derive(Debug, Clone)]
pub struct TestPage {
    pub input: CreatePage,
}

impl TestPage {
    /// Place the page below a parent.
    pub fn child_of(mut self, parent_id: Uuid) -> Self {
        self.input.parent_id = Some(parent_id);
        self
    }

    /// Set as unpublished.
    pub fn unpublished(mut self) -> Self {
        self.input.published = Some(false);
        self
    }

    /// Keep the page out of navigation.
    pub fn hidden(mut self) -> Self {
        self.input.in_navigation = Some(false);
        self
    }

    /// Delegate navigation children to a provider.
    pub fn extended_by(mut self, extender: &str) -> Self {
        self.input.navigation_extenders = Some(extender.to_string());
        self
    }

    /// Mark as soft root.
    pub fn soft_root(mut self) -> Self {
        self.input.soft_root = Some(true);
        self
    }

    /// Require login.
    pub fn login_required(mut self) -> Self {
        self.input.login_required = Some(true);
        self
    }

    /// Limit visibility to a visitor kind.
    pub fn visible_for(mut self, limit: VisibilityLimit) -> Self {
        self.input.limit_visibility = Some(limit);
        self
    }

    /// Set the reverse id.
    pub fn with_reverse_id(mut self, reverse_id: &str) -> Self {
        self.input.reverse_id = Some(reverse_id.to_string());
        self
    }

    /// Insert into a store.
    pub fn create(self, store: &mut PageStore) -> Page {
        match store.create(self.input) {
            Ok(page) => page,
            Err(e) => panic!("failed to create test page: {e}"),
        }
    }
}

/// Page ids of the standard navigation fixture:
///
/// ```text
/// page1
///     page2
///         page3
/// page4
///     page5
/// ```
#[derive(Debug, Clone, Copy)]
pub struct NavFixture {
    pub page1: Uuid,
    pub page2: Uuid,
    pub page3: Uuid,
    pub page4: Uuid,
    pub page5: Uuid,
}

/// Build the standard navigation fixture.
pub fn create_some_nodes(store: &mut PageStore) -> NavFixture {
    let page1 = test_page("page1").create(store).id;
    let page2 = test_page("page2").child_of(page1).create(store).id;
    let page3 = test_page("page3").child_of(page2).create(store).id;
    let page4 = test_page("page4").create(store).id;
    let page5 = test_page("page5").child_of(page4).create(store).id;
    NavFixture {
        page1,
        page2,
        page3,
        page4,
        page5,
    }
}

/// Apply an update, panicking on failure.
pub fn update_page(store: &mut PageStore, id: Uuid, input: UpdatePage) -> Page {
    match store.update(id, input) {
        Ok(page) => page,
        Err(e) => panic!("failed to update test page: {e}"),
    }
}

/// Set a page's navigation extender.
pub fn set_extender(store: &mut PageStore, id: Uuid, extender: &str) -> Page {
    update_page(
        store,
        id,
        UpdatePage {
            navigation_extenders: Some(Some(extender.to_string())),
            ..Default::default()
        },
    )
}

/// Set a page's in-navigation flag.
pub fn set_in_navigation(store: &mut PageStore, id: Uuid, in_navigation: bool) -> Page {
    update_page(
        store,
        id,
        UpdatePage {
            in_navigation: Some(in_navigation),
            ..Default::default()
        },
    )
}
