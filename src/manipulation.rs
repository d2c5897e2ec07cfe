use tracing::debug;

use crate::error::Error;
use crate::omdata::{Document, Node, Om};

/// ## Manipulation of the tree structure
///
/// A node that is moved is detached first, with the namespace handling of
/// [`Om::detach`], so it never loses the declarations it relies on.
impl<'a> Om<'a> {
    fn check_not_ancestor(&self, node: Node, reference: Node) -> Result<(), Error> {
        if self.ancestors(reference).any(|ancestor| ancestor == node) {
            return Err(Error::InvalidOperation(
                "cannot move a node into its own subtree".into(),
            ));
        }
        Ok(())
    }

    /// Append `child` as the last child of `parent`.
    ///
    /// If `child` is attached anywhere it is detached first. If `parent` is
    /// still being built its remaining input is built first, so that parsed
    /// children stay in front of appended ones.
    ///
    /// ```rust
    /// use omtree::Om;
    ///
    /// let mut om = Om::new();
    /// let doc = om.parse_lazy("<list><item>1</item></list>");
    /// let list = om.root_element(doc).unwrap();
    /// let item = om.new_element("item");
    /// om.add_child(list, item)?;
    /// assert_eq!(om.to_string(list)?, "<list><item>1</item><item/></list>");
    /// # Ok::<(), omtree::Error>(())
    /// ```
    pub fn add_child(&mut self, parent: Node, child: Node) -> Result<(), Error> {
        self.check_live(parent)?;
        self.check_live(child)?;
        if !self.is_element(parent) {
            return Err(Error::NotElement(parent));
        }
        self.check_not_ancestor(child, parent)?;
        self.build(parent)?;
        self.detach(child)?;
        parent.get().checked_append(child.get(), &mut self.arena)?;
        Ok(())
    }

    /// Insert `new_sibling` right before `node`.
    ///
    /// Fails with [`Error::NoParent`] when `node` has no parent.
    pub fn insert_sibling_before(&mut self, node: Node, new_sibling: Node) -> Result<(), Error> {
        self.prepare_sibling(node, new_sibling)?;
        node.get()
            .checked_insert_before(new_sibling.get(), &mut self.arena)?;
        Ok(())
    }

    /// Insert `new_sibling` right after `node`.
    ///
    /// Fails with [`Error::NoParent`] when `node` has no parent.
    pub fn insert_sibling_after(&mut self, node: Node, new_sibling: Node) -> Result<(), Error> {
        self.prepare_sibling(node, new_sibling)?;
        node.get()
            .checked_insert_after(new_sibling.get(), &mut self.arena)?;
        Ok(())
    }

    fn prepare_sibling(&mut self, node: Node, new_sibling: Node) -> Result<(), Error> {
        self.check_live(node)?;
        self.check_live(new_sibling)?;
        if self.parent(node).is_none() {
            return Err(Error::NoParent(node));
        }
        self.check_not_ancestor(new_sibling, node)?;
        self.detach(new_sibling)?;
        Ok(())
    }

    /// Detach a node and its descendants, keeping the subtree's namespace
    /// uses resolvable.
    ///
    /// The rest of the subtree is built first. Inherited declarations the
    /// subtree uses are then declared on the detached node. Detaching a
    /// node that is already detached returns it unchanged.
    ///
    /// ```rust
    /// use omtree::Om;
    ///
    /// let mut om = Om::new();
    /// let doc = om.parse(r#"<a xmlns:p="urn:x"><b><p:c/></b></a>"#)?;
    /// let a = om.root_element(doc).unwrap();
    /// let b = om.first_child(a).unwrap();
    /// let b = om.detach(b)?;
    /// assert_eq!(om.to_string(b)?, r#"<b xmlns:p="urn:x"><p:c/></b>"#);
    /// assert_eq!(om.to_string(a)?, r#"<a xmlns:p="urn:x"/>"#);
    /// # Ok::<(), omtree::Error>(())
    /// ```
    pub fn detach(&mut self, node: Node) -> Result<Node, Error> {
        self.check_live(node)?;
        if !self.is_attached(node) {
            return Ok(node);
        }
        self.build(node)?;
        let inherited = if self.is_element(node) {
            self.gather_parent_namespaces(node)
        } else {
            Default::default()
        };
        self.detach_without_namespaces(node);
        if !inherited.is_empty() {
            self.redeclare_parent_namespaces(node, inherited);
        }
        Ok(node)
    }

    /// Unlink a node from its parent or from its document, without any
    /// namespace work.
    pub(crate) fn detach_without_namespaces(&mut self, node: Node) {
        if self.parent(node).is_some() {
            node.get().detach(&mut self.arena);
        } else if let Some((document, index)) = self.top_level_position(node) {
            let data = self.document_data_mut(document);
            data.children.remove(index);
            if data.root_element == Some(node) {
                data.root_element = None;
            }
        }
        let data = self.data_mut(node);
        data.builder = None;
        data.document = None;
    }

    /// Free a node and all its descendants.
    ///
    /// A node that is still being built stops being built: the input that
    /// belongs to it is skipped. Freeing a freed node does nothing.
    pub fn free_tree(&mut self, node: Node) {
        if self.is_removed(node) {
            return;
        }
        let data = self.data(node);
        if let (false, Some(document)) = (data.complete, data.builder) {
            self.discard_open(document, node);
        }
        self.detach_without_namespaces(node);
        node.get().remove_subtree(&mut self.arena);
        debug!(?node, "freed subtree");
    }

    /// Append a top-level node to a document.
    ///
    /// A document holds at most one element at the top level.
    pub fn document_append(&mut self, document: Document, node: Node) -> Result<(), Error> {
        self.check_live(node)?;
        self.build_all(document)?;
        let has_root = self.document_data(document).root_element.is_some();
        let is_element = self.is_element(node);
        if is_element && has_root {
            return Err(Error::MultipleRootElements);
        }
        if self.is_text(node) {
            return Err(Error::TextOutsideRoot);
        }
        self.detach(node)?;
        self.data_mut(node).document = Some(document);
        let data = self.document_data_mut(document);
        data.children.push(node);
        if is_element {
            data.root_element = Some(node);
        }
        Ok(())
    }
}
