//! Access tree and index integration tests
//!
//! Covers index completeness at any depth, blank URL handling, ordering of
//! equal-index siblings and lookup cost on large nested trees.

use menuguard_authz::{
    AccessTree, ActionKind, CollisionPolicy, MenuDefinition, MenuItemDefinition, MenuItemId, MenuNode,
    SecurityError,
};
use proptest::prelude::*;
use std::time::{Duration, Instant};

fn leaf(index: i32, url: &str) -> MenuItemDefinition {
    MenuItemDefinition::new(index, url, url, ActionKind::Page)
}

/// A single chain of `depth` items, each the only child of the previous one
fn chain(menu: &mut MenuNode, prefix: &str, depth: usize) -> Vec<MenuItemId> {
    let mut handles = Vec::with_capacity(depth);
    let mut parent = None;
    for level in 0..depth {
        let handle = menu
            .attach(leaf(0, &format!("{}-{}.do", prefix, level)), parent)
            .unwrap();
        handles.push(handle);
        parent = Some(handle);
    }
    handles
}

// ============================================================================
// INDEX COMPLETENESS
// ============================================================================

#[test]
fn test_every_item_found_by_both_urls() {
    let mut menu = MenuNode::new(1, "Payables", "payables.do");

    let mut root = MenuItemDefinition::new(0, "Invoices", "invoices.do", ActionKind::LeftNavigation)
        .with_encrypted_url("enc-invoices");
    for i in 0..5 {
        let mut child = leaf(i, &format!("child-{}.do", i)).with_encrypted_url(format!("enc-child-{}", i));
        for j in 0..5 {
            child = child.with_sub_item(
                leaf(j, &format!("grandchild-{}-{}.do", i, j)).with_encrypted_url(format!("enc-gc-{}-{}", i, j)),
            );
        }
        root = root.with_sub_item(child);
    }
    menu.attach(root, None).unwrap();

    assert_eq!(menu.item_count(), 31);
    assert_eq!(menu.indexed_url_count(), 62);

    for i in 0..5 {
        let by_url = menu.find_item_by_url(&format!("child-{}.do", i)).unwrap().unwrap();
        let by_alias = menu.find_item_by_url(&format!("enc-child-{}", i)).unwrap().unwrap();
        assert_eq!(by_url.handle(), by_alias.handle());

        for j in 0..5 {
            let url = format!("grandchild-{}-{}.do", i, j);
            let found = menu.find_item_by_url(&url).unwrap().unwrap();
            assert_eq!(found.url(), url);
            assert_eq!(
                menu.find_item_by_url(&format!("enc-gc-{}-{}", i, j)).unwrap().unwrap().handle(),
                found.handle()
            );
        }
    }
}

#[test]
fn test_lookup_trims_and_is_case_sensitive() {
    let mut menu = MenuNode::new(1, "Payables", "payables.do");
    menu.attach(leaf(0, " invoices.do "), None).unwrap();

    assert!(menu.find_item_by_url("invoices.do").unwrap().is_some());
    assert!(menu.find_item_by_url("  invoices.do\t").unwrap().is_some());
    assert!(menu.find_item_by_url("Invoices.do").unwrap().is_none());
    assert!(matches!(
        menu.find_item_by_url("  "),
        Err(SecurityError::InvalidArgument(_))
    ));
}

#[test]
fn test_blank_url_anywhere_fails_and_attaches_nothing() {
    let mut menu = MenuNode::new(1, "Payables", "payables.do");
    let tree = leaf(0, "ok.do").with_sub_item(leaf(0, "ok-child.do").with_sub_item(leaf(0, "   ")));

    let err = menu.attach(tree, None).unwrap_err();

    assert!(matches!(err, SecurityError::IllegalState(_)));
    assert_eq!(menu.item_count(), 0);
    assert!(menu.find_item_by_url("ok.do").unwrap().is_none());
}

#[test]
fn test_reject_policy_refuses_duplicate_urls() {
    let mut menu =
        MenuNode::from_definition(MenuDefinition::new(1, "Payables", "payables.do"), CollisionPolicy::Reject).unwrap();
    menu.attach(leaf(0, "dup.do"), None).unwrap();

    let err = menu.attach(leaf(1, "dup.do"), None).unwrap_err();
    assert!(matches!(err, SecurityError::IllegalState(_)));
    assert_eq!(menu.item_count(), 1);
}

#[test]
fn test_last_write_wins_keeps_both_nodes() {
    let mut menu = MenuNode::new(1, "Payables", "payables.do");
    let first = menu.attach(leaf(0, "dup.do"), None).unwrap();
    let second = menu.attach(leaf(1, "dup.do"), None).unwrap();

    assert_ne!(first, second);
    assert_eq!(menu.item_count(), 2);
    assert_eq!(menu.find_item_by_url("dup.do").unwrap().unwrap().handle(), second);
}

// ============================================================================
// ORDERING
// ============================================================================

#[test]
fn test_equal_index_siblings_are_both_kept_in_order() {
    let mut menu = MenuNode::new(1, "Payables", "payables.do");
    menu.attach(leaf(5, "b.do"), None).unwrap();
    menu.attach(leaf(5, "a.do"), None).unwrap();
    menu.attach(leaf(1, "c.do"), None).unwrap();

    let urls: Vec<_> = menu.root_items().map(|item| item.url()).collect();
    assert_eq!(urls, vec!["c.do", "b.do", "a.do"]);
}

#[test]
fn test_equal_index_menus_are_both_kept() {
    let mut builder = AccessTree::builder(CollisionPolicy::LastWriteWins);
    builder.attach_definition(MenuDefinition::new(3, "B", "b.do")).unwrap();
    builder.attach_definition(MenuDefinition::new(3, "A", "a.do")).unwrap();
    let tree = builder.build();

    let urls: Vec<_> = tree.page_menus().map(|menu| menu.url()).collect();
    assert_eq!(urls, vec!["b.do", "a.do"]);
}

// ============================================================================
// LARGE TREES
// ============================================================================

#[test]
fn test_ten_thousand_items_in_nested_chains() {
    let mut menu = MenuNode::new(1, "Deep", "deep.do");
    for chain_no in 0..100 {
        chain(&mut menu, &format!("c{}", chain_no), 100);
    }

    assert_eq!(menu.item_count(), 10_000);
    assert_eq!(menu.indexed_url_count(), 10_000);

    let deepest = menu.find_item_by_url("c99-99.do").unwrap().unwrap();
    assert_eq!(menu.breadcrumb(deepest.handle()).len(), 100);
    assert!(menu.find_item_by_url("c100-0.do").unwrap().is_none());
}

#[test]
fn test_lookup_does_not_walk_the_tree() {
    let mut menu = MenuNode::new(1, "Deep", "deep.do");
    let handles = chain(&mut menu, "level", 10_000);
    let deepest = *handles.last().unwrap();

    assert_eq!(menu.breadcrumb(deepest).len(), 10_000);

    let time = |url: &str| {
        let start = Instant::now();
        for _ in 0..10_000 {
            assert!(menu.find_item_by_url(url).unwrap().is_some());
        }
        start.elapsed()
    };

    let shallow = time("level-0.do");
    let deep = time("level-9999.do");
    let missing_start = Instant::now();
    for _ in 0..10_000 {
        assert!(menu.find_item_by_url("nowhere.do").unwrap().is_none());
    }
    let missing = missing_start.elapsed();

    // A walk over 10,000 nodes per lookup would take orders of magnitude longer
    let bound = shallow * 20 + Duration::from_millis(50);
    assert!(deep < bound, "deep {:?} vs shallow {:?}", deep, shallow);
    assert!(missing < bound, "missing {:?} vs shallow {:?}", missing, shallow);
}

#[test]
fn test_rebuild_is_independent_of_source() {
    let mut builder = AccessTree::builder(CollisionPolicy::LastWriteWins);
    builder
        .attach_definition(
            MenuDefinition::new(1, "Payables", "payables.do").with_item(
                MenuItemDefinition::new(0, "Invoices", "invoices.do", ActionKind::LeftNavigation)
                    .with_sub_item(leaf(0, "edit.do")),
            ),
        )
        .unwrap();
    let tree = builder.build();
    let copy = tree.rebuild().unwrap();
    drop(tree);

    let menu = copy.find_menu_by_url("payables.do").unwrap().unwrap();
    assert!(menu.find_item_by_url("edit.do").unwrap().is_some());
    assert_eq!(menu.left_navigation_items().count(), 1);
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    #[test]
    fn prop_every_attached_url_is_indexed(
        shape in prop::collection::vec((0i32..5, 0usize..4), 1..40)
    ) {
        let mut menu = MenuNode::new(1, "Prop", "prop.do");
        let mut handles: Vec<MenuItemId> = Vec::new();

        for (n, (index, parent_pick)) in shape.iter().enumerate() {
            let parent = if handles.is_empty() || *parent_pick == 0 {
                None
            } else {
                Some(handles[parent_pick % handles.len()])
            };
            let def = leaf(*index, &format!("item-{}.do", n)).with_encrypted_url(format!("enc-{}", n));
            handles.push(menu.attach(def, parent).unwrap());
        }

        prop_assert_eq!(menu.item_count(), shape.len());
        for (n, handle) in handles.iter().enumerate() {
            let by_url = menu.find_item_by_url(&format!("item-{}.do", n)).unwrap();
            let by_alias = menu.find_item_by_url(&format!("enc-{}", n)).unwrap();
            prop_assert_eq!(by_url.map(|item| item.handle()), Some(*handle));
            prop_assert_eq!(by_alias.map(|item| item.handle()), Some(*handle));
        }
    }
}
