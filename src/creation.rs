use crate::error::Error;
use crate::omdata::{Node, NodeData, Om};
use crate::xmlvalue::{
    check_comment, check_target, Comment, DataSource, Doctype, Element, ProcessingInstruction,
    Text, Value,
};

/// Creating nodes.
///
/// New nodes are detached and complete: nothing is owed to them by a
/// builder. Attach them with [`Om::add_child`] or the sibling insertion
/// methods.
impl<'a> Om<'a> {
    pub(crate) fn new_node(&mut self, value: Value) -> Node {
        Node::new(self.arena.new_node(NodeData::new(value)))
    }

    /// Create an element in no namespace.
    pub fn new_element(&mut self, local_name: &str) -> Node {
        self.new_node(Value::Element(Element::new(local_name.to_string(), None)))
    }

    /// Create an element in a namespace, declaring `prefix` for `uri` on
    /// the element itself.
    ///
    /// ```rust
    /// use omtree::Om;
    ///
    /// let mut om = Om::new();
    /// let body = om.new_element_ns("Body", "soap", "http://www.w3.org/2003/05/soap-envelope")?;
    /// assert_eq!(
    ///     om.to_string(body)?,
    ///     r#"<soap:Body xmlns:soap="http://www.w3.org/2003/05/soap-envelope"/>"#
    /// );
    /// # Ok::<(), omtree::Error>(())
    /// ```
    pub fn new_element_ns(
        &mut self,
        local_name: &str,
        prefix: &str,
        uri: &str,
    ) -> Result<Node, Error> {
        let node = self.new_element(local_name);
        let namespace = self.declare_on(node, prefix, uri, false)?;
        if let Some(element) = self.element_mut(node) {
            element.namespace = Some(namespace);
        }
        Ok(node)
    }

    pub fn new_text(&mut self, text: &str) -> Node {
        self.new_node(Value::Text(Text::new(text.to_string())))
    }

    /// Create a comment. Text containing `--` is rejected.
    pub fn new_comment(&mut self, comment: &str) -> Result<Node, Error> {
        check_comment(comment)?;
        Ok(self.new_node(Value::Comment(Comment::new(comment.to_string()))))
    }

    /// Create a processing instruction. An empty target or `xml` is
    /// rejected.
    pub fn new_processing_instruction(
        &mut self,
        target: &str,
        data: Option<&str>,
    ) -> Result<Node, Error> {
        check_target(target)?;
        let data = data.filter(|d| !d.is_empty()).map(|d| d.to_string());
        Ok(self.new_node(Value::ProcessingInstruction(ProcessingInstruction::new(
            target.to_string(),
            data,
        ))))
    }

    /// Create a document type declaration from the text that goes between
    /// `<!DOCTYPE` and `>`.
    pub fn new_doctype(&mut self, value: &str) -> Node {
        self.new_node(Value::Doctype(Doctype::new(value.to_string())))
    }

    /// Create a node holding pre-serialized XML.
    pub fn new_data_source(&mut self, data: &str) -> Node {
        self.new_node(Value::DataSource(DataSource::new(data.to_string())))
    }
}
