use omtree::{BuildState, Error, Om, ParseOptions, StartElement, XmlToken};

#[test]
fn test_parse_invalid_close_tag() {
    let mut om = Om::new();
    let err = om.parse(r#"<doc></a></doc>"#).unwrap_err();
    assert!(matches!(err, Error::InvalidCloseTag { .. }));
}

#[test]
fn test_parse_invalid_close_tag_prefix() {
    let mut om = Om::new();
    let err = om
        .parse(r#"<doc xmlns:a="http://example.com"></a:doc></doc>"#)
        .unwrap_err();
    match err {
        Error::InvalidCloseTag { expected, found } => {
            assert_eq!(expected, "doc");
            assert_eq!(found, "a:doc");
        }
        _ => unreachable!(),
    }
}

#[test]
fn test_unknown_prefix() {
    let mut om = Om::new();
    let err = om.parse(r#"<doc><a:p/></doc>"#).unwrap_err();
    assert!(matches!(err, Error::UnknownPrefix(_)));
}

#[test]
fn test_unknown_attribute_prefix() {
    let mut om = Om::new();
    let err = om.parse(r#"<doc a:p="1"/>"#).unwrap_err();
    assert!(matches!(err, Error::UnknownPrefix(_)));
}

#[test]
fn test_unclosed_element() {
    let mut om = Om::new();
    let err = om.parse(r#"<doc><a>"#).unwrap_err();
    assert!(matches!(err, Error::UnexpectedEndOfInput));
}

#[test]
fn test_invalid_entity() {
    let mut om = Om::new();
    let err = om.parse(r#"<doc>&nope;</doc>"#).unwrap_err();
    assert!(matches!(err, Error::InvalidEntity(_)));
}

#[test]
fn test_unclosed_entity() {
    let mut om = Om::new();
    let err = om.parse(r#"<doc>&amp</doc>"#).unwrap_err();
    assert!(matches!(err, Error::UnclosedEntity(_)));
}

fn tokens(tokens: Vec<XmlToken>) -> std::vec::IntoIter<XmlToken> {
    tokens.into_iter()
}

fn element(name: &str) -> XmlToken {
    XmlToken::StartElement(StartElement::new("", name))
}

#[test]
fn test_multiple_root_elements() {
    let mut om = Om::new();
    assert!(om.parse(r#"<a/><b/>"#).is_err());
    let doc = om.build_lazy(
        tokens(vec![
            element("a"),
            XmlToken::EndElement,
            element("b"),
            XmlToken::EndElement,
        ]),
        ParseOptions::default(),
    );
    assert!(matches!(om.build_all(doc), Err(Error::MultipleRootElements)));
}

#[test]
fn test_text_outside_root() {
    let mut om = Om::new();
    assert!(om.parse(r#"<a/>tail"#).is_err());
    let doc = om.build_lazy(
        tokens(vec![
            element("a"),
            XmlToken::EndElement,
            XmlToken::Text("tail".to_string()),
        ]),
        ParseOptions::default(),
    );
    assert!(matches!(om.build_all(doc), Err(Error::TextOutsideRoot)));
}

#[test]
fn test_whitespace_outside_root_is_dropped() {
    let mut om = Om::new();
    let doc = om.parse("\n<a/>\n").unwrap();
    assert_eq!(om.document_children(doc).len(), 1);
    let doc = om.build_lazy(
        tokens(vec![
            XmlToken::Text(" \n".to_string()),
            element("a"),
            XmlToken::EndElement,
            XmlToken::Text("\t".to_string()),
        ]),
        ParseOptions::default(),
    );
    om.build_all(doc).unwrap();
    assert_eq!(om.document_children(doc).len(), 1);
}

#[test]
fn test_doctype_after_root() {
    let mut om = Om::new();
    assert!(om.parse(r#"<a/><!DOCTYPE a>"#).is_err());
    let doc = om.build_lazy(
        tokens(vec![
            element("a"),
            XmlToken::EndElement,
            XmlToken::Doctype("a".to_string()),
        ]),
        ParseOptions::default(),
    );
    assert!(matches!(om.build_all(doc), Err(Error::InvalidOperation(_))));
}

#[test]
fn test_unbalanced_end_token() {
    let mut om = Om::new();
    let doc = om.build_lazy(tokens(vec![XmlToken::EndElement]), ParseOptions::default());
    assert!(matches!(om.build_all(doc), Err(Error::UnbalancedEndTag)));
}

#[test]
fn test_reserved_prefix_declaration() {
    let mut om = Om::new();
    let err = om
        .parse(r#"<a xmlns:xml="urn:not-xml"/>"#)
        .unwrap_err();
    assert!(matches!(err, Error::ReservedPrefix(_)));
}

#[test]
fn test_depth_limit() {
    let mut om = Om::new();
    let options = ParseOptions {
        max_depth: Some(3),
        ..Default::default()
    };
    assert!(om
        .parse_with_options("<a><b><c/></b></a>", options.clone())
        .is_ok());
    let err = om
        .parse_with_options("<a><b><c><d/></c></b></a>", options)
        .unwrap_err();
    assert!(matches!(err, Error::DepthLimitExceeded(3)));
}

#[test]
fn test_syntax_error_from_tokenizer() {
    let mut om = Om::new();
    let err = om.parse(r#"<a b=></a>"#).unwrap_err();
    assert!(matches!(err, Error::Parser(_)));
}

#[test]
fn test_lazy_error_surfaces_on_navigation() {
    let mut om = Om::new();
    let doc = om.parse_lazy("<a><b/><c></a>");
    let a = om.root_element(doc).unwrap();
    let b = om.first_child(a).unwrap();
    let c = om.try_next_sibling(b).unwrap().unwrap();
    assert!(om.try_first_child(c).is_err());
    assert_eq!(om.document_state(doc), BuildState::Failed);
    // nothing already built is lost
    assert_eq!(om.child_nodes(a).unwrap(), vec![b, c]);
}

#[test]
fn test_lazy_empty_input() {
    let mut om = Om::new();
    let doc = om.parse_lazy("");
    assert!(matches!(om.try_root_element(doc), Err(Error::NoRootElement)));
    assert_eq!(om.root_element(doc), None);
}
