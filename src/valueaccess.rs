use crate::omdata::{Node, Om};
use crate::xmlvalue::{
    Comment, DataSource, Doctype, Element, ProcessingInstruction, Text, Value, ValueType,
};

/// Obtain node values and their types.
///
/// These are handy if you only need a single kind of value. To handle all
/// kinds, `match` on [`Value`](crate::Value) instead.
///
/// The typed getters return [`None`], and the `is_` checks `false`, for a
/// node that was freed.
impl<'a> Om<'a> {
    /// Access to the value of this node.
    ///
    /// ```rust
    /// use omtree::{Om, Value};
    ///
    /// let mut om = Om::new();
    /// let doc = om.parse("<env>Example</env>").unwrap();
    /// let env = om.root_element(doc).unwrap();
    ///
    /// match om.value(env) {
    ///     Value::Element(element) => assert_eq!(element.local_name(), "env"),
    ///     _ => unreachable!(),
    /// }
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the node was freed. See [`Om::is_removed`].
    #[inline]
    pub fn value(&self, node: Node) -> &Value {
        &self.data(node).value
    }

    /// Mutable access to the value of this node.
    ///
    /// # Panics
    ///
    /// Panics if the node was freed.
    #[inline]
    pub fn value_mut(&mut self, node: Node) -> &mut Value {
        &mut self.data_mut(node).value
    }

    /// Get the [`ValueType`](crate::ValueType) of a node, or `None` if it
    /// was freed.
    pub fn value_type(&self, node: Node) -> Option<ValueType> {
        self.try_value(node).map(Value::value_type)
    }

    fn try_value(&self, node: Node) -> Option<&Value> {
        self.try_data(node).map(|data| &data.value)
    }

    fn try_value_mut(&mut self, node: Node) -> Option<&mut Value> {
        self.arena
            .get_mut(node.get())
            .and_then(|node| node.try_get_mut())
            .map(|data| &mut data.value)
    }

    pub fn is_element(&self, node: Node) -> bool {
        self.value_type(node) == Some(ValueType::Element)
    }

    pub fn is_text(&self, node: Node) -> bool {
        self.value_type(node) == Some(ValueType::Text)
    }

    pub fn is_comment(&self, node: Node) -> bool {
        self.value_type(node) == Some(ValueType::Comment)
    }

    pub fn is_processing_instruction(&self, node: Node) -> bool {
        self.value_type(node) == Some(ValueType::ProcessingInstruction)
    }

    pub fn is_doctype(&self, node: Node) -> bool {
        self.value_type(node) == Some(ValueType::Doctype)
    }

    pub fn is_data_source(&self, node: Node) -> bool {
        self.value_type(node) == Some(ValueType::DataSource)
    }

    /// If this node's value is an element, return a reference to it.
    pub fn element(&self, node: Node) -> Option<&Element> {
        if let Value::Element(element) = self.try_value(node)? {
            Some(element)
        } else {
            None
        }
    }

    /// If this node's value is an element, return a mutable reference to it.
    pub fn element_mut(&mut self, node: Node) -> Option<&mut Element> {
        if let Value::Element(element) = self.try_value_mut(node)? {
            Some(element)
        } else {
            None
        }
    }

    pub fn text(&self, node: Node) -> Option<&Text> {
        if let Value::Text(text) = self.try_value(node)? {
            Some(text)
        } else {
            None
        }
    }

    /// If this node's value is text, return a reference to the string.
    pub fn text_str(&self, node: Node) -> Option<&str> {
        self.text(node).map(|t| t.get())
    }

    pub fn text_mut(&mut self, node: Node) -> Option<&mut Text> {
        if let Value::Text(text) = self.try_value_mut(node)? {
            Some(text)
        } else {
            None
        }
    }

    pub fn comment(&self, node: Node) -> Option<&Comment> {
        if let Value::Comment(comment) = self.try_value(node)? {
            Some(comment)
        } else {
            None
        }
    }

    pub fn comment_mut(&mut self, node: Node) -> Option<&mut Comment> {
        if let Value::Comment(comment) = self.try_value_mut(node)? {
            Some(comment)
        } else {
            None
        }
    }

    pub fn processing_instruction(&self, node: Node) -> Option<&ProcessingInstruction> {
        if let Value::ProcessingInstruction(pi) = self.try_value(node)? {
            Some(pi)
        } else {
            None
        }
    }

    pub fn processing_instruction_mut(
        &mut self,
        node: Node,
    ) -> Option<&mut ProcessingInstruction> {
        if let Value::ProcessingInstruction(pi) = self.try_value_mut(node)? {
            Some(pi)
        } else {
            None
        }
    }

    pub fn doctype(&self, node: Node) -> Option<&Doctype> {
        if let Value::Doctype(doctype) = self.try_value(node)? {
            Some(doctype)
        } else {
            None
        }
    }

    pub fn data_source(&self, node: Node) -> Option<&DataSource> {
        if let Value::DataSource(data_source) = self.try_value(node)? {
            Some(data_source)
        } else {
            None
        }
    }

    pub fn data_source_mut(&mut self, node: Node) -> Option<&mut DataSource> {
        if let Value::DataSource(data_source) = self.try_value_mut(node)? {
            Some(data_source)
        } else {
            None
        }
    }
}
