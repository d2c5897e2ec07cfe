use crate::error::Error;
use crate::namespace::NamespaceId;
use crate::omdata::{Node, Om};
use crate::xmlvalue::Value;

/// ## Element convenience
///
/// Element-level accessors that combine name lookup with navigation.
/// Children are built as the methods reach them.
impl<'a> Om<'a> {
    /// `prefix:local`, or `local` for no namespace and the default
    /// namespace.
    pub fn qualified_name(&self, namespace: Option<NamespaceId>, local_name: &str) -> String {
        match namespace.map(|namespace| self.namespace_prefix(namespace)) {
            Some(prefix) if !prefix.is_empty() => format!("{}:{}", prefix, local_name),
            _ => local_name.to_string(),
        }
    }

    /// The local name of an element.
    pub fn local_name(&self, node: Node) -> Option<&str> {
        self.element(node).map(|element| element.local_name())
    }

    pub fn set_local_name(&mut self, node: Node, local_name: &str) -> Result<(), Error> {
        self.check_live(node)?;
        let element = self.element_mut(node).ok_or(Error::NotElement(node))?;
        element.set_local_name(local_name);
        Ok(())
    }

    fn has_name(&self, node: Node, local_name: &str, uri: Option<&str>) -> bool {
        match self.element(node) {
            Some(element) => {
                element.local_name() == local_name
                    && element.namespace().map(|ns| self.namespace_uri(ns)) == uri
            }
            None => false,
        }
    }

    /// The value of an attribute, by local name and namespace URI.
    /// Unprefixed attributes are in no namespace.
    pub fn attribute_value(
        &self,
        node: Node,
        local_name: &str,
        uri: Option<&str>,
    ) -> Option<&str> {
        self.element(node)?
            .attributes()
            .iter()
            .find(|attribute| {
                attribute.local_name() == local_name
                    && attribute.namespace().map(|ns| self.namespace_uri(ns)) == uri
            })
            .map(|attribute| attribute.value())
    }

    /// Set an attribute in no namespace. An existing value is replaced
    /// in place.
    pub fn set_attribute(
        &mut self,
        node: Node,
        local_name: &str,
        value: &str,
    ) -> Result<(), Error> {
        self.check_live(node)?;
        let element = self.element_mut(node).ok_or(Error::NotElement(node))?;
        element.set_attribute(local_name, None, value);
        Ok(())
    }

    /// Set an attribute in a namespace, reusing the binding of `prefix` in
    /// scope when it is `uri`, or declaring `prefix` for `uri` on the
    /// element.
    ///
    /// ```rust
    /// use omtree::Om;
    ///
    /// let mut om = Om::new();
    /// let doc = om.parse(r#"<e:Envelope xmlns:e="urn:env"><e:Header/></e:Envelope>"#)?;
    /// let envelope = om.root_element(doc).unwrap();
    /// let header = om.first_child(envelope).unwrap();
    /// om.set_attribute_ns(header, "mustUnderstand", "e", "urn:env", "true")?;
    /// assert_eq!(
    ///     om.to_string(header)?,
    ///     r#"<e:Header e:mustUnderstand="true"/>"#
    /// );
    /// # Ok::<(), omtree::Error>(())
    /// ```
    pub fn set_attribute_ns(
        &mut self,
        node: Node,
        local_name: &str,
        prefix: &str,
        uri: &str,
        value: &str,
    ) -> Result<NamespaceId, Error> {
        self.check_live(node)?;
        if !self.is_element(node) {
            return Err(Error::NotElement(node));
        }
        if prefix.is_empty() {
            return Err(Error::InvalidOperation(
                "a namespaced attribute needs a prefix".into(),
            ));
        }
        self.check_rebound(node, prefix, uri, true)?;
        let namespace = match self.binding_in_scope(node, prefix, uri) {
            Some(namespace) => namespace,
            None => self.declare_namespace(node, prefix, uri)?,
        };
        let element = self.element_mut(node).ok_or(Error::NotElement(node))?;
        element.set_attribute(local_name, Some(namespace), value);
        Ok(namespace)
    }

    /// Remove an attribute, by local name and namespace URI, returning its
    /// value.
    pub fn remove_attribute(
        &mut self,
        node: Node,
        local_name: &str,
        uri: Option<&str>,
    ) -> Option<String> {
        let namespace = self
            .element(node)?
            .attributes()
            .iter()
            .find(|attribute| {
                attribute.local_name() == local_name
                    && attribute.namespace().map(|ns| self.namespace_uri(ns)) == uri
            })
            .map(|attribute| attribute.namespace())?;
        self.element_mut(node)?
            .remove_attribute(local_name, namespace)
    }

    /// The concatenated text of the direct text children of an element.
    pub fn text_content(&mut self, node: Node) -> Result<String, Error> {
        let mut text = String::new();
        for child in self.child_nodes(node)? {
            if let Value::Text(t) = self.value(child) {
                text.push_str(t.get());
            }
        }
        Ok(text)
    }

    /// Replace the direct text children of an element by one text node
    /// appended after the remaining children. Empty text removes them.
    pub fn set_text_content(&mut self, node: Node, text: &str) -> Result<(), Error> {
        self.check_live(node)?;
        if !self.is_element(node) {
            return Err(Error::NotElement(node));
        }
        for child in self.child_nodes(node)? {
            if self.is_text(child) {
                self.free_tree(child);
            }
        }
        if !text.is_empty() {
            let text = self.new_text(text);
            self.add_child(node, text)?;
        }
        Ok(())
    }

    /// The first child that is an element.
    pub fn first_element(&mut self, node: Node) -> Result<Option<Node>, Error> {
        let mut current = self.try_first_child(node)?;
        while let Some(child) = current {
            if self.is_element(child) {
                return Ok(Some(child));
            }
            current = self.try_next_sibling(child)?;
        }
        Ok(None)
    }

    /// The next sibling that is an element.
    pub fn next_sibling_element(&mut self, node: Node) -> Result<Option<Node>, Error> {
        let mut current = self.try_next_sibling(node)?;
        while let Some(sibling) = current {
            if self.is_element(sibling) {
                return Ok(Some(sibling));
            }
            current = self.try_next_sibling(sibling)?;
        }
        Ok(None)
    }

    /// All child elements, building the node completely.
    pub fn child_elements(&mut self, node: Node) -> Result<Vec<Node>, Error> {
        let mut elements = Vec::new();
        let mut current = self.first_element(node)?;
        while let Some(element) = current {
            elements.push(element);
            current = self.next_sibling_element(element)?;
        }
        Ok(elements)
    }

    /// The first child element with a local name and namespace URI.
    ///
    /// Only as much input is built as it takes to find it.
    pub fn first_child_with_name(
        &mut self,
        node: Node,
        local_name: &str,
        uri: Option<&str>,
    ) -> Result<Option<Node>, Error> {
        let mut current = self.first_element(node)?;
        while let Some(element) = current {
            if self.has_name(element, local_name, uri) {
                return Ok(Some(element));
            }
            current = self.next_sibling_element(element)?;
        }
        Ok(None)
    }

    /// The text of the first child element with a name, if there is one.
    pub fn child_text(
        &mut self,
        node: Node,
        local_name: &str,
        uri: Option<&str>,
    ) -> Result<Option<String>, Error> {
        match self.first_child_with_name(node, local_name, uri)? {
            Some(child) => Ok(Some(self.text_content(child)?)),
            None => Ok(None),
        }
    }
}
