use crate::error::Error;

/// A pull-style producer of XML tokens.
///
/// Every [`XmlToken::StartElement`] is eventually followed by a matching
/// [`XmlToken::EndElement`], also for empty-element tags. After
/// [`XmlToken::EndOfInput`] the source is not asked again.
pub trait TokenSource {
    fn next_token(&mut self) -> Result<XmlToken, Error>;
}

/// A structural event in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlToken {
    StartElement(StartElement),
    /// Character data with entities already resolved.
    Text(String),
    Comment(String),
    ProcessingInstruction {
        target: String,
        data: Option<String>,
    },
    /// The text between `<!DOCTYPE` and the closing `>`.
    Doctype(String),
    EndElement,
    EndOfInput,
}

/// An element start tag, with its declarations split out of the attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartElement {
    pub prefix: String,
    pub local_name: String,
    /// `(prefix, uri)` pairs; the empty prefix is the default namespace.
    pub namespaces: Vec<(String, String)>,
    pub attributes: Vec<RawAttribute>,
    /// Written as `<x/>` in the source.
    pub is_empty: bool,
}

impl StartElement {
    pub fn new<P: Into<String>, L: Into<String>>(prefix: P, local_name: L) -> Self {
        StartElement {
            prefix: prefix.into(),
            local_name: local_name.into(),
            ..Default::default()
        }
    }

    pub fn with_namespace<P: Into<String>, U: Into<String>>(mut self, prefix: P, uri: U) -> Self {
        self.namespaces.push((prefix.into(), uri.into()));
        self
    }

    pub fn with_attribute<P: Into<String>, L: Into<String>, V: Into<String>>(
        mut self,
        prefix: P,
        local_name: L,
        value: V,
    ) -> Self {
        self.attributes.push(RawAttribute {
            prefix: prefix.into(),
            local_name: local_name.into(),
            value: value.into(),
        });
        self
    }
}

/// An attribute as written, before its prefix is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAttribute {
    pub prefix: String,
    pub local_name: String,
    pub value: String,
}

impl TokenSource for std::vec::IntoIter<XmlToken> {
    fn next_token(&mut self) -> Result<XmlToken, Error> {
        Ok(self.next().unwrap_or(XmlToken::EndOfInput))
    }
}
