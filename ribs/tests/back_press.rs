//! Back press delivery order.

mod common;

use std::sync::{Arc, Mutex};

use common::{Journal, Recording, recording_node};
use ribs::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Page {
    List,
    Detail,
}

fn node_with(name: &str, journal: &Journal, consume: bool) -> Arc<dyn Builder> {
    let name = name.to_string();
    let journal = journal.clone();
    Arc::new(BuildFn(move |cx: &BuildContext| {
        let interactor = Recording::new(&name, &journal);
        let interactor = if consume { interactor.consuming_back() } else { interactor };
        recording_node(cx, interactor, LeafRouting::new())
    }))
}

#[test]
fn test_leaf_handles_back_press_once() {
    let journal = Journal::new();
    let leaf = node_with("leaf", &journal, true);
    let root_journal = journal.clone();
    let root = BuildFn(move |cx: &BuildContext| {
        recording_node(
            cx,
            Recording::new("root", &root_journal),
            LeafRouting::new().permanent(leaf.clone()),
        )
    });
    let mut tree = RibTree::new(RibsConfig::default());
    tree.attach_root(&root, None);

    assert!(tree.handle_back_press());
    assert_eq!(journal.with_prefix("back:"), vec!["back:leaf"]);
}

#[test]
fn test_interactor_asked_after_children() {
    let journal = Journal::new();
    let children = [
        node_with("first", &journal, false),
        node_with("second", &journal, false),
    ];
    let root_journal = journal.clone();
    let root = BuildFn(move |cx: &BuildContext| {
        let routing = children
            .iter()
            .fold(LeafRouting::new(), |routing, child| routing.permanent(child.clone()));
        recording_node(cx, Recording::new("root", &root_journal).consuming_back(), routing)
    });
    let mut tree = RibTree::new(RibsConfig::default());
    tree.attach_root(&root, None);

    assert!(tree.handle_back_press());
    assert_eq!(
        journal.with_prefix("back:"),
        vec!["back:second", "back:first", "back:root"]
    );
}

#[test]
fn test_unhandled_back_press_pops_router() {
    let journal = Journal::new();
    let handle: Arc<Mutex<Option<RouterHandle<Page>>>> = Arc::new(Mutex::new(None));
    let slot = handle.clone();
    let pages_journal = journal.clone();
    let root = BuildFn(move |cx: &BuildContext| {
        let journal = pages_journal.clone();
        let router = Router::new(Page::List, move |page: &Page| match page {
            // Hidden while Detail is on top, so never asked.
            Page::List => RoutingAction::attach(node_with("list", &journal, true)),
            Page::Detail => RoutingAction::attach(node_with("detail", &journal, false)),
        });
        *slot.lock().unwrap() = Some(router.handle());
        recording_node(cx, Recording::new("root", &pages_journal), router)
    });
    let mut tree = RibTree::new(RibsConfig::default());
    tree.attach_root(&root, None);
    let handle = handle.lock().unwrap().clone().unwrap();

    handle.push(Page::Detail);
    tree.dispatch();
    journal.clear();

    assert!(tree.handle_back_press());
    assert_eq!(handle.back_stack(), vec![Page::List]);
    assert_eq!(journal.with_prefix("back:"), vec!["back:detail", "back:root"]);

    // List consumes it now that it is visible again.
    journal.clear();
    assert!(tree.handle_back_press());
    assert_eq!(journal.with_prefix("back:"), vec!["back:list"]);
    assert_eq!(handle.back_stack(), vec![Page::List]);
}

#[test]
fn test_back_press_at_bottom_is_unhandled() {
    let journal = Journal::new();
    let root_journal = journal.clone();
    let root = BuildFn(move |cx: &BuildContext| {
        let router = Router::new(Page::List, |_page: &Page| RoutingAction::noop());
        recording_node(cx, Recording::new("root", &root_journal), router)
    });
    let mut tree = RibTree::new(RibsConfig::default());
    tree.attach_root(&root, None);

    assert!(!tree.handle_back_press());
    assert_eq!(journal.with_prefix("back:"), vec!["back:root"]);
}
