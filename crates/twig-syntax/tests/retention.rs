use std::thread;

use twig_syntax::{
    CacheConfig, GreenNode, GreenToken, ListBuilder, Retention, SeparatedSyntaxList, SlotState,
    SyntaxKind, SyntaxNode, TextSize,
};

const WORD: SyntaxKind = SyntaxKind(1);
const COMMA: SyntaxKind = SyntaxKind(2);
const ITEM: SyntaxKind = SyntaxKind(3);
const ROOT: SyntaxKind = SyntaxKind(4);

fn item(i: usize) -> GreenNode {
    GreenNode::new(ITEM, [Some(GreenToken::new(WORD, &"w".repeat(i % 5 + 1)).into())])
}

/// `LIST(item, ",", item, ...)`
fn separated(len: usize) -> GreenNode {
    let mut builder = ListBuilder::new();
    for i in 0..len {
        if i > 0 {
            builder.append_separator(GreenToken::new(COMMA, ", "));
        }
        builder.append(item(i));
    }
    builder.freeze_separated().unwrap().unwrap()
}

/// `ROOT(open, LIST(item, ",", item, ...))`
fn tree(len: usize) -> GreenNode {
    GreenNode::new(ROOT, [Some(GreenToken::new(WORD, "(").into()), Some(separated(len).into())])
}

#[test]
fn strong_entries_keep_identity() {
    let root = SyntaxNode::new_root(tree(6));
    let list = root.node_slot(1).unwrap();
    let first = list.node_slot(4).unwrap();
    drop(list);

    let list = root.node_slot(1).unwrap();
    assert_eq!(list.slot_state(4), SlotState::Live);
    assert_eq!(list.node_slot(4).unwrap(), first);
    assert_eq!(list.cached_slot(4), Some(first));
}

#[test]
fn weak_entries_are_evicted_and_rebuilt_transparently() {
    let config = CacheConfig::new().with_retention(Retention::Weak);
    let root = SyntaxNode::new_root_with_config(tree(6), config);
    let list = root.node_slot(1).unwrap();

    assert_eq!(list.slot_state(4), SlotState::Uncached);
    let child = list.node_slot(4).unwrap();
    let (offset, green) = (child.offset(), child.green().clone());
    assert_eq!(list.slot_state(4), SlotState::Live);
    assert_eq!(list.node_slot(4).unwrap(), child);

    drop(child);
    assert_eq!(list.slot_state(4), SlotState::Evicted);
    assert_eq!(list.cached_slot(4), None);

    let rebuilt = list.node_slot(4).unwrap();
    assert_eq!(list.slot_state(4), SlotState::Live);
    assert_eq!(rebuilt.offset(), offset);
    assert!(rebuilt.green().ptr_eq(&green));
    assert_eq!(rebuilt.parent().unwrap(), list);
}

#[test]
fn wide_lists_switch_to_weak_entries() {
    let config = CacheConfig::new().with_weak_list_threshold(8);
    let root = SyntaxNode::new_root_with_config(tree(4), config);
    let list = root.node_slot(1).unwrap();
    assert_eq!(list.slot_count(), 7);
    drop(list.node_slot(0));
    assert_eq!(list.slot_state(0), SlotState::Live);

    let root = SyntaxNode::new_root_with_config(tree(5), config);
    let list = root.node_slot(1).unwrap();
    assert_eq!(list.slot_count(), 9);
    drop(list.node_slot(0));
    assert_eq!(list.slot_state(0), SlotState::Evicted);
    // The root itself is not a list and stays strong.
    drop(list);
    assert_eq!(root.slot_state(1), SlotState::Live);
}

#[test]
fn weak_entries_keep_ancestors_reachable() {
    let config = CacheConfig::new().with_retention(Retention::Weak);
    let root = SyntaxNode::new_root_with_config(tree(3), config);
    let item = root.node_slot(1).unwrap().node_slot(2).unwrap();

    // Only `item` refers to the list now.
    assert_eq!(root.slot_state(1), SlotState::Live);
    let list = item.parent().unwrap();
    assert_eq!(list.kind(), SyntaxKind::LIST);
    assert_eq!(list, root.node_slot(1).unwrap());
    assert_eq!(list.offset(), TextSize::of("("));
    drop(list);

    let ancestors: Vec<_> = item.ancestors().collect();
    assert_eq!(ancestors.len(), 3);
    assert_eq!(ancestors[2], root);
    assert_eq!(item.next_sibling_or_token().unwrap().kind(), COMMA);
    assert_eq!(item.prev_sibling_or_token().unwrap().kind(), COMMA);
}

#[test]
fn nested_wide_lists_keep_ancestors_reachable() {
    let config = CacheConfig::new().with_weak_list_threshold(4);
    let mut builder = ListBuilder::new();
    for _ in 0..4 {
        builder.append(separated(3));
    }
    let outer = builder.freeze_list_node().unwrap();
    let root = SyntaxNode::new_root_with_config(GreenNode::new(ROOT, [Some(outer.into())]), config);

    let leaf = root.node_slot(0).unwrap().node_slot(1).unwrap().node_slot(4).unwrap();
    assert_eq!(root.node_slot(0).unwrap().slot_state(1), SlotState::Live);
    let kinds: Vec<_> = leaf.ancestors().map(|node| node.kind()).collect();
    assert_eq!(kinds, [ITEM, SyntaxKind::LIST, SyntaxKind::LIST, ROOT]);
    assert_eq!(leaf.ancestors().last().unwrap(), root);

    // Once the leaf goes, the chain above it is reclaimable again.
    let outer = root.node_slot(0).unwrap();
    drop(leaf);
    assert_eq!(outer.slot_state(1), SlotState::Evicted);
}

#[test]
fn held_leaf_outlives_its_root_handle() {
    let config = CacheConfig::new().with_retention(Retention::Weak);
    let root = SyntaxNode::new_root_with_config(tree(4), config);
    let leaf = root.node_slot(1).unwrap().node_slot(6).unwrap();
    let expected = root.green().clone();
    drop(root);

    let top = leaf.ancestors().last().unwrap();
    assert!(top.green().ptr_eq(&expected));
    assert_eq!(top.parent(), None);
}

#[test]
fn children_inherit_config() {
    let config = CacheConfig::new().with_small_max(2).with_retention(Retention::Strong);
    let root = SyntaxNode::new_root_with_config(tree(3), config);
    let item = root.node_slot(1).unwrap().node_slot(2).unwrap();
    assert_eq!(item.config(), config);
}

#[test]
fn evicted_neighbors_do_not_skew_offsets() {
    let config = CacheConfig::new().with_retention(Retention::Weak);
    // Nine slots, below the offset-table threshold.
    let green = tree(5);
    let root = SyntaxNode::new_root_with_config(green, config);
    let list = root.node_slot(1).unwrap();
    let expected: Vec<_> = (0..list.slot_count()).map(|i| list.slot_offset_from_start(i)).collect();

    // Touch every other element and let them go, then walk back and forth.
    for i in (0..list.slot_count()).step_by(4) {
        drop(list.node_slot(i));
    }
    let mut held = Vec::new();
    for i in (0..list.slot_count()).rev().chain(0..list.slot_count()) {
        let element = list.slot(i).unwrap();
        assert_eq!(element.offset(), expected[i], "slot {i}");
        if i % 3 == 0 {
            held.push(element);
        }
    }
}

#[test]
fn concurrent_materialization_agrees() {
    for retention in [Retention::Strong, Retention::Weak] {
        let config = CacheConfig::new().with_retention(retention);
        let root = SyntaxNode::new_root_with_config(tree(64), config);
        let reference = SyntaxNode::new_root(root.green().clone());
        let reference_list = SeparatedSyntaxList::from_slot(&reference, 1);
        let expected: Vec<TextSize> = reference_list.iter().map(|element| element.offset()).collect();

        let seen: Vec<Vec<SyntaxNode>> = thread::scope(|scope| {
            let workers: Vec<_> = (0..8)
                .map(|worker| {
                    let root = &root;
                    let expected = &expected;
                    scope.spawn(move || {
                        let list = SeparatedSyntaxList::from_slot(root, 1);
                        let len = list.len();
                        let mut held = Vec::with_capacity(len + 1);
                        held.push(list.node().unwrap().clone());
                        for step in 0..len {
                            // Each worker visits the elements in its own order.
                            let k = if worker % 2 == 0 { (step * 7 + worker) % len } else { len - 1 - step };
                            let element = list.element(k).into_node().unwrap();
                            assert_eq!(element.offset(), expected[k]);
                            held.push(element);
                        }
                        held.sort_by_key(SyntaxNode::offset);
                        held
                    })
                })
                .collect();
            workers.into_iter().map(|worker| worker.join().unwrap()).collect()
        });

        // Every handle is still held, so every worker saw the same winners.
        for handles in &seen[1..] {
            assert_eq!(handles, &seen[0]);
        }
    }
}

#[test]
fn deep_positioned_tree_drops_without_overflow() {
    const DEPTH: usize = 100_000;
    let mut green = GreenNode::new(ITEM, [Some(GreenToken::new(WORD, "leaf").into())]);
    for _ in 0..DEPTH {
        green = GreenNode::new(ROOT, [Some(green.into())]);
    }
    for retention in [Retention::Strong, Retention::Weak] {
        let config = CacheConfig::new().with_retention(retention);
        let root = SyntaxNode::new_root_with_config(green.clone(), config);
        let mut node = root.clone();
        while let Some(child) = node.node_slot(0) {
            node = child;
        }
        assert_eq!(node.kind(), ITEM);
        assert_eq!(node.ancestors().count(), DEPTH + 1);
        // Under weak retention the leaf is what keeps the chain alive.
        drop(root);
        drop(node);
    }
}
