use proptest::prelude::*;

use omtree::{Node, Om};

const XML: &str = concat!(
    r#"<a xmlns:p="urn:p" xmlns:q="urn:q">"#,
    r#"<p:b q:k="1"><c>text</c><p:d/></p:b>"#,
    r#"<e xmlns:p="urn:other"><p:f/><q:g/></e>"#,
    r#"<!--comment--><h/>"#,
    r#"</a>"#
);

#[derive(Debug, Clone)]
enum Op {
    AddChild(usize, usize),
    InsertBefore(usize, usize),
    InsertAfter(usize, usize),
    Detach(usize),
    Free(usize),
    Create,
    SetNamespace(usize, usize, usize),
    SetAttributeNs(usize, usize, usize),
}

const PREFIXES: [&str; 3] = ["p", "q", ""];
const URIS: [&str; 3] = ["urn:p", "urn:q", "urn:other"];

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..32usize, 0..32usize).prop_map(|(a, b)| Op::AddChild(a, b)),
        (0..32usize, 0..32usize).prop_map(|(a, b)| Op::InsertBefore(a, b)),
        (0..32usize, 0..32usize).prop_map(|(a, b)| Op::InsertAfter(a, b)),
        (0..32usize).prop_map(Op::Detach),
        (0..32usize).prop_map(Op::Free),
        Just(Op::Create),
        (0..32usize, 0..3usize, 0..3usize).prop_map(|(a, p, u)| Op::SetNamespace(a, p, u)),
        (0..32usize, 0..3usize, 0..3usize).prop_map(|(a, p, u)| Op::SetAttributeNs(a, p, u)),
    ]
}

fn all_nodes(om: &mut Om, root: Node) -> Vec<Node> {
    let mut nodes = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        nodes.push(node);
        stack.extend(om.child_nodes(node).unwrap());
    }
    nodes
}

fn check_links(om: &mut Om, node: Node) -> Result<(), TestCaseError> {
    let children = om.child_nodes(node).unwrap();
    prop_assert_eq!(children.first().copied(), om.first_child(node));
    prop_assert_eq!(children.last().copied(), om.last_child(node));
    for (i, child) in children.iter().enumerate() {
        prop_assert_eq!(om.parent(*child), Some(node));
        let previous = if i == 0 { None } else { Some(children[i - 1]) };
        prop_assert_eq!(om.previous_sibling(*child), previous);
        prop_assert_eq!(om.next_sibling(*child), children.get(i + 1).copied());
    }
    Ok(())
}

fn apply(om: &mut Om, pool: &mut Vec<Node>, op: &Op) {
    let pick = |i: usize| pool[i % pool.len()];
    // failures are expected for many random edits; they must leave the
    // tree consistent
    match *op {
        Op::AddChild(a, b) => {
            let _ = om.add_child(pick(a), pick(b));
        }
        Op::InsertBefore(a, b) => {
            let _ = om.insert_sibling_before(pick(a), pick(b));
        }
        Op::InsertAfter(a, b) => {
            let _ = om.insert_sibling_after(pick(a), pick(b));
        }
        Op::Detach(a) => {
            let _ = om.detach(pick(a));
        }
        Op::Free(a) => {
            let node = pick(a);
            om.free_tree(node);
        }
        Op::Create => {
            let node = om.new_element("new");
            pool.push(node);
        }
        Op::SetNamespace(a, p, u) => {
            let _ = om.set_namespace(pick(a), PREFIXES[p], URIS[u]);
        }
        Op::SetAttributeNs(a, p, u) => {
            let _ = om.set_attribute_ns(pick(a), "k", PREFIXES[p], URIS[u], "v");
        }
    }
}

proptest! {
    #[test]
    fn test_random_edits_keep_tree_consistent(
        ops in prop::collection::vec(arb_op(), 1..40),
        lazy in any::<bool>(),
    ) {
        let mut om = Om::new();
        let doc = if lazy { om.parse_lazy(XML) } else { om.parse(XML).unwrap() };
        let root = om.root_element(doc).unwrap();
        let mut pool = all_nodes(&mut om, root);
        for op in &ops {
            apply(&mut om, &mut pool, op);
            pool.retain(|node| !om.is_removed(*node));
            if pool.is_empty() {
                break;
            }
            for node in pool.clone() {
                check_links(&mut om, node)?;
            }
        }
        for node in pool.clone() {
            // every remaining tree parses back with the same names
            if om.parent(node).is_none() && om.is_element(node) {
                let serialized = om.to_string(node).unwrap();
                let mut fresh = Om::new();
                let reparsed = fresh.parse(&serialized);
                prop_assert!(reparsed.is_ok(), "cannot parse {}", serialized);
                let root = fresh.root_element(reparsed.unwrap()).unwrap();
                prop_assert_eq!(names(&mut om, node), names(&mut fresh, root), "{}", serialized);
            }
        }
    }

    #[test]
    fn test_detach_keeps_subtree_resolvable(index in 0..12usize) {
        let mut om = Om::new();
        let doc = om.parse(XML).unwrap();
        let root = om.root_element(doc).unwrap();
        let nodes = all_nodes(&mut om, root);
        let node = nodes[index % nodes.len()];
        let expected = om.subtree_to_string(node).unwrap();
        om.detach(node).unwrap();
        let serialized = om.to_string(node).unwrap();
        let mut fresh = Om::new();
        let reparsed = fresh.parse(&serialized);
        if om.is_element(node) {
            prop_assert!(reparsed.is_ok(), "cannot parse {}", serialized);
            // both forms bind the same names to the same URIs
            let mut expected_om = Om::new();
            let a = expected_om.parse(&expected).unwrap();
            let b = reparsed.unwrap();
            let a = expected_om.root_element(a).unwrap();
            let b = fresh.root_element(b).unwrap();
            prop_assert_eq!(names(&mut expected_om, a), names(&mut fresh, b));
        }
        // detaching again changes nothing
        om.detach(node).unwrap();
        prop_assert_eq!(om.to_string(node).unwrap(), serialized);
    }
}

/// `{uri}local` for every element and attribute, in document order.
fn names(om: &mut Om, root: Node) -> Vec<String> {
    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if let Some(element) = om.element(node) {
            let uri = element.namespace().map(|ns| om.namespace_uri(ns)).unwrap_or("");
            out.push(format!("{{{}}}{}", uri, element.local_name()));
            for attribute in element.attributes().iter() {
                let uri = attribute
                    .namespace()
                    .map(|ns| om.namespace_uri(ns))
                    .unwrap_or("");
                out.push(format!("@{{{}}}{}", uri, attribute.local_name()));
            }
        }
        let mut children = om.child_nodes(node).unwrap();
        children.reverse();
        stack.extend(children);
    }
    out
}
