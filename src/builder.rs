use tracing::{debug, trace};

use crate::error::Error;
use crate::omdata::{BuildState, Document, Node, NodeData, Om, XML_NAMESPACE};
use crate::options::ParseOptions;
use crate::token::{StartElement, TokenSource, XmlToken};
use crate::xmlvalue::{Comment, Doctype, Element, Prefixes, ProcessingInstruction, Text, Value};

/// Turns tokens into nodes, one token per step.
///
/// Elements are created incomplete and carry a back-reference to their
/// document until their end tag arrives.
pub(crate) struct Builder {
    open: Vec<Node>,
    skip_depth: usize,
    root_seen: bool,
    options: ParseOptions,
}

impl Builder {
    pub(crate) fn new(options: ParseOptions) -> Self {
        Builder {
            open: Vec::new(),
            skip_depth: 0,
            root_seen: false,
            options,
        }
    }

    /// Stop building `node`. It and every element opened inside it leave
    /// the open stack, and the input still owed to them is swallowed.
    pub(crate) fn discard(&mut self, node: Node) {
        if let Some(index) = self.open.iter().position(|open| *open == node) {
            self.skip_depth += self.open.len() - index;
            self.open.truncate(index);
        }
    }
}

fn is_whitespace(text: &str) -> bool {
    text.chars().all(|c| matches!(c, ' ' | '\t' | '\n' | '\r'))
}

impl<'a> Om<'a> {
    /// Pull one token from the source stored with the document.
    ///
    /// Returns `Ok(false)` when the document has nothing left to give.
    pub(crate) fn pull(&mut self, document: Document) -> Result<bool, Error> {
        if self.document_data(document).state != BuildState::Building {
            return Ok(false);
        }
        let Some(mut source) = self.document_data_mut(document).source.take() else {
            return Ok(false);
        };
        let result = self.pull_from(document, source.as_mut());
        let data = self.document_data_mut(document);
        if data.state == BuildState::Building {
            data.source = Some(source);
        }
        result
    }

    /// Pull one token from `source` into the document's builder.
    pub(crate) fn pull_from<S: TokenSource + ?Sized>(
        &mut self,
        document: Document,
        source: &mut S,
    ) -> Result<bool, Error> {
        let Some(mut builder) = self.document_data_mut(document).builder.take() else {
            return Ok(false);
        };
        let token = match source.next_token() {
            Ok(token) => token,
            Err(e) => {
                self.fail_build(document, builder);
                return Err(e);
            }
        };
        trace!(?token, "pulled token");
        match self.apply_token(document, &mut builder, token) {
            Ok(false) => {
                self.document_data_mut(document).builder = Some(builder);
                Ok(true)
            }
            Ok(true) => {
                let data = self.document_data_mut(document);
                data.state = BuildState::Complete;
                data.source = None;
                debug!(document = document.get(), "document build complete");
                Ok(true)
            }
            Err(e) => {
                self.fail_build(document, builder);
                Err(e)
            }
        }
    }

    fn fail_build(&mut self, document: Document, builder: Builder) {
        for node in builder.open {
            self.data_mut(node).builder = None;
        }
        let data = self.document_data_mut(document);
        data.state = BuildState::Failed;
        data.source = None;
        debug!(document = document.get(), "document build failed");
    }

    /// Tell an active builder to stop producing `node`.
    pub(crate) fn discard_open(&mut self, document: Document, node: Node) {
        if let Some(builder) = self.document_data_mut(document).builder.as_mut() {
            builder.discard(node);
        }
    }

    /// Returns `true` once the end of input was accepted.
    fn apply_token(
        &mut self,
        document: Document,
        builder: &mut Builder,
        token: XmlToken,
    ) -> Result<bool, Error> {
        if builder.skip_depth > 0 {
            match token {
                XmlToken::StartElement(_) => builder.skip_depth += 1,
                XmlToken::EndElement => builder.skip_depth -= 1,
                XmlToken::EndOfInput => return Err(Error::UnexpectedEndOfInput),
                _ => {}
            }
            return Ok(false);
        }
        match token {
            XmlToken::StartElement(start) => {
                let node = self.build_element(document, builder, start)?;
                self.attach_built(document, builder, node)?;
                builder.open.push(node);
            }
            XmlToken::EndElement => {
                let node = builder.open.pop().ok_or(Error::UnbalancedEndTag)?;
                let data = self.data_mut(node);
                data.complete = true;
                data.builder = None;
            }
            XmlToken::Text(text) => {
                if builder.open.is_empty() {
                    if !is_whitespace(&text) {
                        return Err(Error::TextOutsideRoot);
                    }
                } else if builder.options.preserve_whitespace || !is_whitespace(&text) {
                    let node = self.new_node(Value::Text(Text::new(text)));
                    self.attach_built(document, builder, node)?;
                }
            }
            XmlToken::Comment(text) => {
                let node = self.new_node(Value::Comment(Comment::new(text)));
                self.attach_built(document, builder, node)?;
            }
            XmlToken::ProcessingInstruction { target, data } => {
                let node = self.new_node(Value::ProcessingInstruction(ProcessingInstruction::new(
                    target, data,
                )));
                self.attach_built(document, builder, node)?;
            }
            XmlToken::Doctype(value) => {
                if !builder.open.is_empty() || builder.root_seen {
                    return Err(Error::InvalidOperation(
                        "doctype must precede the root element".into(),
                    ));
                }
                let node = self.new_node(Value::Doctype(Doctype::new(value)));
                self.attach_built(document, builder, node)?;
            }
            XmlToken::EndOfInput => {
                if !builder.open.is_empty() {
                    return Err(Error::UnexpectedEndOfInput);
                }
                if !builder.root_seen {
                    return Err(Error::NoRootElement);
                }
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn build_element(
        &mut self,
        document: Document,
        builder: &Builder,
        start: StartElement,
    ) -> Result<Node, Error> {
        if let Some(max_depth) = builder.options.max_depth {
            if builder.open.len() >= max_depth {
                return Err(Error::DepthLimitExceeded(max_depth));
            }
        }
        let parent = builder.open.last().copied();
        if parent.is_none() && builder.root_seen {
            return Err(Error::MultipleRootElements);
        }

        let mut namespaces = Prefixes::new();
        for (prefix, uri) in start.namespaces {
            match prefix.as_str() {
                "xml" if uri == XML_NAMESPACE => continue,
                "xml" | "xmlns" => return Err(Error::ReservedPrefix(prefix)),
                _ => {}
            }
            let prefix_id = self.add_prefix(&prefix);
            let namespace = self.add_namespace(prefix_id, &uri);
            namespaces.insert(prefix_id, namespace);
        }

        let namespace = self.resolve_prefix(&namespaces, parent, &start.prefix)?;
        let mut element = Element::new(start.local_name, namespace);
        for attribute in start.attributes {
            // unprefixed attributes are in no namespace, whatever the default
            let namespace = if attribute.prefix.is_empty() {
                None
            } else {
                self.resolve_prefix(&namespaces, parent, &attribute.prefix)?
            };
            element
                .attributes
                .insert(&attribute.local_name, namespace, attribute.value);
        }
        element.namespaces = namespaces;
        element.is_empty = start.is_empty;

        let node = Node::new(self.arena.new_node(NodeData {
            value: Value::Element(element),
            complete: false,
            builder: Some(document),
            document: None,
        }));
        Ok(node)
    }

    fn attach_built(
        &mut self,
        document: Document,
        builder: &mut Builder,
        node: Node,
    ) -> Result<(), Error> {
        if let Some(parent) = builder.open.last() {
            parent.get().checked_append(node.get(), &mut self.arena)?;
            return Ok(());
        }
        let is_element = self.is_element(node);
        self.data_mut(node).document = Some(document);
        let data = self.document_data_mut(document);
        data.children.push(node);
        if is_element {
            data.root_element = Some(node);
            builder.root_seen = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::token::XmlToken;

    fn tokens(tokens: Vec<XmlToken>) -> std::vec::IntoIter<XmlToken> {
        tokens.into_iter()
    }

    #[test]
    fn test_one_token_per_pull() {
        let mut om = Om::new();
        let doc = om.build_lazy(
            tokens(vec![
                XmlToken::StartElement(StartElement::new("", "a")),
                XmlToken::Text("x".to_string()),
                XmlToken::EndElement,
            ]),
            ParseOptions::default(),
        );
        assert!(om.pull(doc).unwrap());
        let a = om.document_data(doc).root_element.unwrap();
        assert!(!om.is_complete(a));
        assert!(om.pull(doc).unwrap());
        assert!(om.pull(doc).unwrap());
        assert!(om.is_complete(a));
        assert_eq!(om.document_state(doc), BuildState::Building);
        assert!(om.pull(doc).unwrap());
        assert_eq!(om.document_state(doc), BuildState::Complete);
        assert!(!om.pull(doc).unwrap());
    }

    #[test]
    fn test_discard_swallows_owed_input() {
        let mut builder = Builder::new(ParseOptions::default());
        let mut om = Om::new();
        let a = om.new_element("a");
        let b = om.new_element("b");
        let c = om.new_element("c");
        builder.open = vec![a, b, c];
        builder.discard(b);
        assert_eq!(builder.open, vec![a]);
        assert_eq!(builder.skip_depth, 2);
    }

    #[test]
    fn test_max_depth() {
        let mut om = Om::new();
        let options = ParseOptions {
            max_depth: Some(2),
            ..Default::default()
        };
        let err = om
            .parse_with_options("<a><b><c/></b></a>", options)
            .unwrap_err();
        assert!(matches!(err, Error::DepthLimitExceeded(2)));
    }

    #[test]
    fn test_whitespace_dropped_when_not_preserved() {
        let mut om = Om::new();
        let options = ParseOptions {
            preserve_whitespace: false,
            ..Default::default()
        };
        let doc = om
            .parse_with_options("<a>\n  <b> x </b>\n</a>", options)
            .unwrap();
        assert_eq!(om.document_to_string(doc).unwrap(), "<a><b> x </b></a>");
    }

    #[test]
    fn test_source_error_fails_document() {
        struct Broken;
        impl TokenSource for Broken {
            fn next_token(&mut self) -> Result<XmlToken, Error> {
                Err(Error::UnexpectedEndOfInput)
            }
        }
        let mut om = Om::new();
        let doc = om.build_lazy(Broken, ParseOptions::default());
        assert!(om.pull(doc).is_err());
        assert_eq!(om.document_state(doc), BuildState::Failed);
        assert!(!om.pull(doc).unwrap());
    }
}
