use omtree::{BuildState, Error, Om};

#[test]
fn test_add_child_after_unparsed_children() {
    let mut om = Om::new();
    let doc = om.parse_lazy("<list><item>1</item><item>2</item></list>");
    let list = om.root_element(doc).unwrap();
    let first = om.first_child(list).unwrap();
    let item = om.new_element("item");
    let three = om.new_text("3");
    om.add_child(item, three).unwrap();
    om.add_child(list, item).unwrap();

    assert_eq!(om.first_child(list), Some(first));
    assert_eq!(om.last_child(list), Some(item));
    assert!(om.is_complete(list));
    assert_eq!(
        om.to_string(list).unwrap(),
        "<list><item>1</item><item>2</item><item>3</item></list>"
    );
}

#[test]
fn test_add_child_moves_node() {
    let mut om = Om::new();
    let doc = om.parse("<a><b/><c/></a>").unwrap();
    let a = om.root_element(doc).unwrap();
    let b = om.first_child(a).unwrap();
    let c = om.next_sibling(b).unwrap();
    om.add_child(c, b).unwrap();
    assert_eq!(om.parent(b), Some(c));
    assert_eq!(om.to_string(a).unwrap(), "<a><c><b/></c></a>");
}

#[test]
fn test_add_child_rejects_ancestor() {
    let mut om = Om::new();
    let doc = om.parse("<a><b/></a>").unwrap();
    let a = om.root_element(doc).unwrap();
    let b = om.first_child(a).unwrap();
    assert!(matches!(
        om.add_child(b, a),
        Err(Error::InvalidOperation(_))
    ));
    assert!(matches!(
        om.add_child(a, a),
        Err(Error::InvalidOperation(_))
    ));
    assert_eq!(om.to_string(a).unwrap(), "<a><b/></a>");
}

#[test]
fn test_add_child_to_text_fails() {
    let mut om = Om::new();
    let text = om.new_text("t");
    let a = om.new_element("a");
    assert!(matches!(om.add_child(text, a), Err(Error::NotElement(_))));
}

#[test]
fn test_add_child_takes_top_level_node_out_of_document() {
    let mut om = Om::new();
    let doc = om.parse("<!--c--><a/>").unwrap();
    let a = om.root_element(doc).unwrap();
    let comment = om.previous_sibling(a).unwrap();
    om.add_child(a, comment).unwrap();
    assert_eq!(om.document_children(doc), &[a]);
    assert_eq!(om.document_of(comment), None);
    assert_eq!(om.document_to_string(doc).unwrap(), "<a><!--c--></a>");
}

#[test]
fn test_insert_siblings() {
    let mut om = Om::new();
    let doc = om.parse("<a><m/></a>").unwrap();
    let a = om.root_element(doc).unwrap();
    let m = om.first_child(a).unwrap();
    let before = om.new_element("before");
    let after = om.new_element("after");
    om.insert_sibling_before(m, before).unwrap();
    om.insert_sibling_after(m, after).unwrap();
    assert_eq!(om.previous_sibling(m), Some(before));
    assert_eq!(om.next_sibling(m), Some(after));
    assert_eq!(om.to_string(a).unwrap(), "<a><before/><m/><after/></a>");
}

#[test]
fn test_insert_sibling_without_parent() {
    let mut om = Om::new();
    let lone = om.new_element("lone");
    let other = om.new_element("other");
    assert!(matches!(
        om.insert_sibling_before(lone, other),
        Err(Error::NoParent(_))
    ));
    assert!(matches!(
        om.insert_sibling_after(lone, other),
        Err(Error::NoParent(_))
    ));
    // a document element has no parent either
    let doc = om.parse("<a/>").unwrap();
    let a = om.root_element(doc).unwrap();
    assert!(matches!(
        om.insert_sibling_after(a, other),
        Err(Error::NoParent(_))
    ));
}

#[test]
fn test_insert_sibling_into_unbuilt_parent() {
    let mut om = Om::new();
    let doc = om.parse_lazy("<a><b/><c/></a>");
    let a = om.root_element(doc).unwrap();
    let b = om.first_child(a).unwrap();
    let x = om.new_element("x");
    om.insert_sibling_after(b, x).unwrap();
    assert_eq!(om.to_string(a).unwrap(), "<a><b/><x/><c/></a>");
}

#[test]
fn test_detach_leaves_parent_consistent() {
    let mut om = Om::new();
    let doc = om.parse("<a><b/><c/><d/></a>").unwrap();
    let a = om.root_element(doc).unwrap();
    let b = om.first_child(a).unwrap();
    let c = om.next_sibling(b).unwrap();
    let d = om.next_sibling(c).unwrap();
    om.detach(c).unwrap();
    assert_eq!(om.parent(c), None);
    assert_eq!(om.next_sibling(b), Some(d));
    assert_eq!(om.previous_sibling(d), Some(b));
    assert!(!om.is_attached(c));
    assert_eq!(om.to_string(a).unwrap(), "<a><b/><d/></a>");
}

#[test]
fn test_detach_builds_rest_of_subtree() {
    let mut om = Om::new();
    let doc = om.parse_lazy("<a><b><c/><d/></b><e/></a>");
    let a = om.root_element(doc).unwrap();
    let b = om.first_child(a).unwrap();
    om.detach(b).unwrap();
    assert!(om.is_complete(b));
    assert_eq!(om.to_string(b).unwrap(), "<b><c/><d/></b>");
    // the rest of the document still builds into the original tree
    assert_eq!(om.to_string(a).unwrap(), "<a><e/></a>");
}

#[test]
fn test_detach_document_element() {
    let mut om = Om::new();
    let doc = om.parse("<a/>").unwrap();
    let a = om.root_element(doc).unwrap();
    om.detach(a).unwrap();
    assert_eq!(om.root_element(doc), None);
    assert!(om.document_children(doc).is_empty());
    let new_root = om.new_element("z");
    om.document_append(doc, new_root).unwrap();
    assert_eq!(om.document_to_string(doc).unwrap(), "<z/>");
}

#[test]
fn test_detach_malformed_rest_fails_without_change() {
    let mut om = Om::new();
    let doc = om.parse_lazy("<a><b><c/></x></a>");
    let a = om.root_element(doc).unwrap();
    let b = om.first_child(a).unwrap();
    assert!(om.detach(b).is_err());
    assert_eq!(om.parent(b), Some(a));
    assert_eq!(om.document_state(doc), BuildState::Failed);
}

#[test]
fn test_free_mid_parse_skips_owed_input() {
    let mut om = Om::new();
    let doc = om.parse_lazy("<a><b><c>deep</c><d/></b><e/></a>");
    let a = om.root_element(doc).unwrap();
    let b = om.first_child(a).unwrap();
    let c = om.first_child(b).unwrap();
    assert!(!om.is_complete(b));
    om.free_tree(b);
    assert!(om.is_removed(b));
    assert!(om.is_removed(c));
    assert_eq!(om.to_string(a).unwrap(), "<a><e/></a>");
    om.build_all(doc).unwrap();
    assert_eq!(om.document_state(doc), BuildState::Complete);
}

#[test]
fn test_free_twice_is_noop() {
    let mut om = Om::new();
    let doc = om.parse("<a><b/></a>").unwrap();
    let a = om.root_element(doc).unwrap();
    let b = om.first_child(a).unwrap();
    om.free_tree(b);
    om.free_tree(b);
    assert!(om.is_removed(b));
    assert_eq!(om.first_child(a), None);
}

#[test]
fn test_free_after_serialize() {
    let mut om = Om::new();
    let doc = om.parse_lazy("<a><b>text</b></a>");
    let a = om.root_element(doc).unwrap();
    assert_eq!(om.to_string(a).unwrap(), "<a><b>text</b></a>");
    om.free_tree(a);
    assert!(om.is_removed(a));
    assert_eq!(om.root_element(doc), None);
}

#[test]
fn test_operations_on_freed_node() {
    let mut om = Om::new();
    let a = om.new_element("a");
    let b = om.new_element("b");
    om.free_tree(b);
    assert!(matches!(om.add_child(a, b), Err(Error::Removed(_))));
    assert!(matches!(om.detach(b), Err(Error::Removed(_))));
}

#[test]
fn test_freed_node_reads_as_absent() {
    let mut om = Om::new();
    let doc = om
        .parse(r#"<a xmlns:p="urn:x"><b k="v"><p:c/>text</b></a>"#)
        .unwrap();
    let a = om.root_element(doc).unwrap();
    let b = om.first_child(a).unwrap();
    om.free_tree(b);
    assert!(!om.is_complete(b));
    assert!(!om.is_attached(b));
    assert!(!om.is_element(b));
    assert_eq!(om.value_type(b), None);
    assert_eq!(om.element(b), None);
    assert_eq!(om.local_name(b), None);
    assert_eq!(om.attribute_value(b, "k", None), None);
    assert_eq!(om.parent(b), None);
    assert_eq!(om.first_child(b), None);
    assert_eq!(om.next_sibling(b), None);
    assert_eq!(om.previous_sibling(b), None);
    assert_eq!(om.last_child(b), None);
    assert_eq!(om.document_of(b), None);
    assert_eq!(om.ancestors(b).count(), 0);
    assert_eq!(om.find_namespace(b, None, Some("p")), None);
    assert_eq!(om.default_namespace(b), None);
    assert!(om.namespaces_in_scope(b).is_empty());
    assert!(om.gather_parent_namespaces(b).is_empty());
}

#[test]
fn test_freed_node_fails_with_removed() {
    let mut om = Om::new();
    let doc = om.parse_lazy("<a><b><c/></b></a>");
    let a = om.root_element(doc).unwrap();
    let b = om.first_child(a).unwrap();
    om.free_tree(b);
    assert!(matches!(om.to_string(b), Err(Error::Removed(_))));
    assert!(matches!(om.subtree_to_string(b), Err(Error::Removed(_))));
    assert!(matches!(om.try_first_child(b), Err(Error::Removed(_))));
    assert!(matches!(om.try_next_sibling(b), Err(Error::Removed(_))));
    assert!(matches!(om.child_nodes(b), Err(Error::Removed(_))));
    assert!(matches!(om.build(b), Err(Error::Removed(_))));
    assert!(matches!(om.text_content(b), Err(Error::Removed(_))));
    assert!(matches!(om.set_text_content(b, "x"), Err(Error::Removed(_))));
    assert!(matches!(om.set_local_name(b, "x"), Err(Error::Removed(_))));
    assert!(matches!(om.set_attribute(b, "k", "v"), Err(Error::Removed(_))));
    assert!(matches!(
        om.set_attribute_ns(b, "k", "p", "urn:x", "v"),
        Err(Error::Removed(_))
    ));
    assert!(matches!(
        om.declare_namespace(b, "p", "urn:x"),
        Err(Error::Removed(_))
    ));
    assert!(matches!(
        om.set_namespace(b, "p", "urn:x"),
        Err(Error::Removed(_))
    ));
    assert!(matches!(om.insert_sibling_after(b, a), Err(Error::Removed(_))));
    assert_eq!(om.to_string(a).unwrap(), "<a/>");
}

#[test]
fn test_stale_handle_after_slot_reuse() {
    let mut om = Om::new();
    let a = om.new_element("a");
    let b = om.new_element("b");
    om.add_child(a, b).unwrap();
    om.free_tree(b);
    // the freed slot is handed out again
    let c = om.new_element("c");
    assert!(om.is_removed(b));
    assert!(!om.is_removed(c));
    assert_eq!(om.local_name(b), None);
    assert_eq!(om.local_name(c), Some("c"));
    assert!(matches!(om.to_string(b), Err(Error::Removed(_))));
    assert_eq!(om.to_string(c).unwrap(), "<c/>");
}

#[test]
fn test_document_append_rules() {
    let mut om = Om::new();
    let doc = om.new_document();
    let comment = om.new_comment("c").unwrap();
    om.document_append(doc, comment).unwrap();
    let root = om.new_element("root");
    om.document_append(doc, root).unwrap();
    let second = om.new_element("second");
    assert!(matches!(
        om.document_append(doc, second),
        Err(Error::MultipleRootElements)
    ));
    let text = om.new_text("x");
    assert!(matches!(
        om.document_append(doc, text),
        Err(Error::TextOutsideRoot)
    ));
    assert_eq!(om.root_element(doc), Some(root));
    assert_eq!(om.document_to_string(doc).unwrap(), "<!--c--><root/>");
}
