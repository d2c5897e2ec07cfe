use tracing::{debug, warn};

use crate::builder::Builder;
use crate::encoding::decode;
use crate::error::Error;
use crate::omdata::{BuildState, Document, DocumentData, Node, Om};
use crate::options::ParseOptions;
use crate::reader::XmlReader;
use crate::token::TokenSource;

/// ## Documents
///
/// A document is either parsed eagerly, in which case it is complete when
/// the call returns, or built lazily from a [`TokenSource`], in which case
/// navigation and serialization pull input as they need it.
impl<'a> Om<'a> {
    /// Parse a string into a complete document.
    ///
    /// On error everything built so far is freed.
    ///
    /// ```rust
    /// let mut om = omtree::Om::new();
    /// let doc = om.parse("<env><body/></env>")?;
    /// assert_eq!(om.document_to_string(doc)?, "<env><body/></env>");
    /// # Ok::<(), omtree::Error>(())
    /// ```
    pub fn parse(&mut self, xml: &str) -> Result<Document, Error> {
        self.parse_with_options(xml, ParseOptions::default())
    }

    pub fn parse_with_options(
        &mut self,
        xml: &str,
        options: ParseOptions,
    ) -> Result<Document, Error> {
        let document = self.add_document(DocumentData::new(Some(Builder::new(options))));
        let mut reader = XmlReader::new(xml);
        while self.document_state(document) == BuildState::Building {
            if let Err(e) = self.pull_from(document, &mut reader) {
                self.discard_document(document);
                return Err(e);
            }
        }
        Ok(document)
    }

    /// Parse bytes in the encoding their XML declaration or byte order
    /// mark announces. Without either, UTF-8 is assumed.
    pub fn parse_bytes(&mut self, bytes: &[u8]) -> Result<Document, Error> {
        let xml = decode(bytes)?;
        self.parse(&xml)
    }

    /// Start building a document from a string without reading any of it.
    pub fn parse_lazy(&mut self, xml: &'a str) -> Document {
        self.parse_lazy_with_options(xml, ParseOptions::default())
    }

    pub fn parse_lazy_with_options(&mut self, xml: &'a str, options: ParseOptions) -> Document {
        self.build_lazy(XmlReader::new(xml), options)
    }

    /// Start building a document from any token source. Nothing is pulled
    /// until the tree is navigated.
    pub fn build_lazy<S: TokenSource + 'a>(
        &mut self,
        source: S,
        options: ParseOptions,
    ) -> Document {
        let mut data = DocumentData::new(Some(Builder::new(options)));
        data.source = Some(Box::new(source));
        let document = self.add_document(data);
        debug!(document = document.get(), "lazy document created");
        document
    }

    /// Create an empty, complete document to fill with
    /// [`Om::document_append`].
    pub fn new_document(&mut self) -> Document {
        self.add_document(DocumentData::new(None))
    }

    fn discard_document(&mut self, document: Document) {
        let children = std::mem::take(&mut self.document_data_mut(document).children);
        for child in children {
            child.get().remove_subtree(&mut self.arena);
        }
        self.document_data_mut(document).root_element = None;
    }

    /// How far the document has been built.
    pub fn document_state(&self, document: Document) -> BuildState {
        self.document_data(document).state
    }

    /// The top-level nodes built so far, in document order.
    pub fn document_children(&self, document: Document) -> &[Node] {
        &self.document_data(document).children
    }

    /// The document element, building up to it if needed.
    pub fn try_root_element(&mut self, document: Document) -> Result<Option<Node>, Error> {
        loop {
            if let Some(root) = self.document_data(document).root_element {
                return Ok(Some(root));
            }
            if !self.pull(document)? {
                return Ok(None);
            }
        }
    }

    /// The document element, building up to it if needed.
    ///
    /// Returns [`None`] if input is malformed before the first element, or
    /// the element was detached.
    pub fn root_element(&mut self, document: Document) -> Option<Node> {
        self.try_root_element(document).unwrap_or_else(|error| {
            warn!(%error, "building the document element failed");
            None
        })
    }

    /// Build a node completely.
    pub fn build(&mut self, node: Node) -> Result<(), Error> {
        self.check_live(node)?;
        while !self.is_complete(node) {
            let Some(document) = self.data(node).builder else {
                break;
            };
            if !self.pull(document)? {
                break;
            }
        }
        Ok(())
    }

    /// Build a document to the end of its input.
    pub fn build_all(&mut self, document: Document) -> Result<(), Error> {
        while self.pull(document)? {}
        Ok(())
    }
}
