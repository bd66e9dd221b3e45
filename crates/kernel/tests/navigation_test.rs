#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Integration tests for menu rendering over the page tree.

use trellis_kernel::menu::{
    MenuRequest, PAGE_MENU, ShowMenu, Visitor, show_breadcrumb, show_menu, show_menu_below_id,
    show_sub_menu,
};
use trellis_kernel::models::{PageStore, VisibilityLimit};
use trellis_test_utils::{create_some_nodes, test_page, test_pool};

#[test]
fn test_default_menu_collapses_inactive_branches() {
    let mut store = PageStore::new();
    create_some_nodes(&mut store);
    let pool = test_pool();

    let request = MenuRequest::new(&store, "/page4/");
    let menu = show_menu(&pool, &request, &ShowMenu::default());
    let roots = menu.nodes();
    assert_eq!(roots.len(), 2);
    assert!(roots[0].children().is_empty());
    assert_eq!(roots[1].children().len(), 1);
    assert!(roots[1].selected);
    assert!(roots[0].sibling);
}

#[test]
fn test_unpublished_page_takes_subtree_along() {
    let mut store = PageStore::new();
    let home = test_page("home").create(&mut store);
    let draft = test_page("draft").child_of(home.id).unpublished().create(&mut store);
    test_page("below-draft").child_of(draft.id).create(&mut store);
    test_page("live").child_of(home.id).create(&mut store);
    let pool = test_pool();

    let request = MenuRequest::new(&store, "/");
    let menu = show_menu(&pool, &request, &ShowMenu::new(0, 100, 100, 100));
    assert_eq!(menu.len(), 1);
    let children = menu.nodes()[0].children();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].title, "live");
}

#[test]
fn test_auth_visibility() {
    let mut store = PageStore::new();
    let home = test_page("home").create(&mut store);
    test_page("members").child_of(home.id).login_required().create(&mut store);
    test_page("signup")
        .child_of(home.id)
        .visible_for(VisibilityLimit::Anonymous)
        .create(&mut store);
    test_page("dashboard")
        .child_of(home.id)
        .visible_for(VisibilityLimit::Authenticated)
        .create(&mut store);
    let pool = test_pool();
    let options = ShowMenu::new(0, 100, 100, 100);

    let anonymous = MenuRequest::new(&store, "/");
    let menu = show_menu(&pool, &anonymous, &options);
    let titles: Vec<String> = menu.nodes()[0]
        .children()
        .iter()
        .map(|n| n.title.clone())
        .collect();
    assert_eq!(titles, vec!["signup"]);

    let member = MenuRequest::new(&store, "/").with_visitor(Visitor::Authenticated);
    let menu = show_menu(&pool, &member, &options);
    let titles: Vec<String> = menu.nodes()[0]
        .children()
        .iter()
        .map(|n| n.title.clone())
        .collect();
    assert_eq!(titles, vec!["members", "dashboard"]);
}

#[test]
fn test_soft_root_limits_menu() {
    let mut store = PageStore::new();
    let home = test_page("home").create(&mut store);
    let docs = test_page("docs").child_of(home.id).soft_root().create(&mut store);
    test_page("install").child_of(docs.id).create(&mut store);
    test_page("blog").create(&mut store);
    let pool = test_pool();

    let request = MenuRequest::new(&store, "/docs/install/");
    let menu = show_menu(&pool, &request, &ShowMenu::default());
    let roots = menu.nodes();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].title, "docs");
    assert_eq!(roots[0].children().len(), 1);

    // away from the soft root its subtree is hidden
    let request = MenuRequest::new(&store, "/blog/");
    let menu = show_menu(&pool, &request, &ShowMenu::new(0, 100, 100, 100));
    let roots = menu.nodes();
    assert_eq!(roots.len(), 2);
    let docs_node = roots[0].children()[0];
    assert_eq!(docs_node.title, "docs");
    assert!(docs_node.children().is_empty());
}

#[test]
fn test_namespace_filter() {
    let mut store = PageStore::new();
    let fixture = create_some_nodes(&mut store);
    trellis_test_utils::set_extender(&mut store, fixture.page4, trellis_test_utils::TEST_MENU);
    let pool = test_pool();

    let request = MenuRequest::new(&store, "/");
    let options = ShowMenu::new(0, 100, 100, 100).with_namespace(PAGE_MENU);
    let menu = show_menu(&pool, &request, &options);
    let roots = menu.nodes();
    assert_eq!(roots.len(), 2);
    assert!(roots.iter().all(|n| n.namespace == PAGE_MENU));
    assert_eq!(roots[1].children().len(), 1);
}

#[test]
fn test_menu_below_id_sub_menu_and_breadcrumb() {
    let mut store = PageStore::new();
    let home = test_page("home").create(&mut store);
    let docs = test_page("docs")
        .child_of(home.id)
        .with_reverse_id("docs")
        .create(&mut store);
    let guide = test_page("guide").child_of(docs.id).create(&mut store);
    test_page("faq").child_of(docs.id).create(&mut store);
    test_page("advanced").child_of(guide.id).create(&mut store);
    let pool = test_pool();

    let request = MenuRequest::new(&store, "/docs/guide/");
    let below = show_menu_below_id(&pool, &request, "docs", &ShowMenu::new(0, 100, 0, 100));
    let titles: Vec<String> = below.nodes().iter().map(|n| n.title.clone()).collect();
    assert_eq!(titles, vec!["guide", "faq"]);
    assert_eq!(below.nodes()[0].children().len(), 1);
    assert_eq!(below.nodes()[0].menu_level, Some(0));

    let request = MenuRequest::new(&store, "/docs/");
    let sub = show_sub_menu(&pool, &request, 100);
    assert_eq!(sub.len(), 2);
    assert_eq!(sub.total_nodes(), 3);

    let request = MenuRequest::new(&store, "/docs/guide/advanced/");
    let trail = show_breadcrumb(&pool, &request, 0);
    let titles: Vec<String> = trail.nodes().iter().map(|n| n.title.clone()).collect();
    assert_eq!(titles, vec!["home", "docs", "guide", "advanced"]);
}
