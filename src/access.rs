use tracing::warn;

use crate::error::Error;
use crate::omdata::{BuildState, Document, Node, Om};

/// ## Navigation
///
/// Links that are not known yet are completed by pulling more input from
/// the builder of the node's document. The `try_` methods report errors
/// raised while pulling; the plain methods log them and report that no
/// node exists.
///
/// `parent`, `last_child` and `previous_sibling` never pull: they reflect
/// the part of the tree built so far.
///
/// A freed node has no links: the plain methods return [`None`] for it and
/// the `try_` methods fail with [`Error::Removed`].
impl<'a> Om<'a> {
    /// Check whether a node has been freed.
    pub fn is_removed(&self, node: Node) -> bool {
        node.get().is_removed(&self.arena)
    }

    /// Whether the builder owes this node no more input.
    pub fn is_complete(&self, node: Node) -> bool {
        self.try_data(node).is_some_and(|data| data.complete)
    }

    /// The document this node sits in at the top level, if any.
    pub fn document_of(&self, node: Node) -> Option<Document> {
        self.try_data(node)?.document
    }

    /// Position of a parentless node in its document's top-level list.
    pub(crate) fn top_level_position(&self, node: Node) -> Option<(Document, usize)> {
        if self.parent(node).is_some() {
            return None;
        }
        let document = self.try_data(node)?.document?;
        let index = self
            .document_data(document)
            .children
            .iter()
            .position(|child| *child == node)?;
        Some((document, index))
    }

    /// Whether the node has a parent or is listed at the top level of a
    /// document.
    pub fn is_attached(&self, node: Node) -> bool {
        self.parent(node).is_some() || self.top_level_position(node).is_some()
    }

    /// Get parent node.
    ///
    /// Returns [`None`] for detached nodes and for the top-level nodes of a
    /// document.
    pub fn parent(&self, node: Node) -> Option<Node> {
        self.arena.get(node.get())?.parent().map(Node::new)
    }

    /// Get the first child, building it if needed.
    pub fn try_first_child(&mut self, node: Node) -> Result<Option<Node>, Error> {
        self.check_live(node)?;
        loop {
            if let Some(child) = self.arena[node.get()].first_child() {
                return Ok(Some(Node::new(child)));
            }
            let data = self.data(node);
            if data.complete {
                return Ok(None);
            }
            let Some(document) = data.builder else {
                return Ok(None);
            };
            if !self.pull(document)? {
                return Ok(None);
            }
        }
    }

    /// Get the first child, building it if needed.
    ///
    /// ```rust
    /// let mut om = omtree::Om::new();
    /// let doc = om.parse_lazy("<p>Example</p>");
    /// let p = om.root_element(doc).unwrap();
    /// let text = om.first_child(p).unwrap();
    /// assert_eq!(om.text_str(text), Some("Example"));
    /// assert_eq!(om.first_child(text), None);
    /// ```
    pub fn first_child(&mut self, node: Node) -> Option<Node> {
        if self.is_removed(node) {
            return None;
        }
        self.try_first_child(node)
            .unwrap_or_else(|e| log_swallowed("first_child", e))
    }

    /// Get the next sibling, building it if needed.
    ///
    /// For a top-level node this is the next top-level node of its
    /// document.
    pub fn try_next_sibling(&mut self, node: Node) -> Result<Option<Node>, Error> {
        self.check_live(node)?;
        loop {
            if let Some(next) = self.arena[node.get()].next_sibling() {
                return Ok(Some(Node::new(next)));
            }
            let document = match self.parent(node) {
                Some(parent) => {
                    let data = self.data(parent);
                    if data.complete {
                        return Ok(None);
                    }
                    data.builder
                }
                None => match self.top_level_position(node) {
                    Some((document, index)) => {
                        let children = &self.document_data(document).children;
                        if let Some(next) = children.get(index + 1) {
                            return Ok(Some(*next));
                        }
                        Some(document)
                    }
                    None => None,
                },
            };
            let Some(document) = document else {
                return Ok(None);
            };
            if !self.pull(document)? {
                return Ok(None);
            }
        }
    }

    /// Get the next sibling, building it if needed.
    ///
    /// ```rust
    /// let mut om = omtree::Om::new();
    /// let doc = om.parse_lazy("<p><a/><b/></p>");
    /// let p = om.root_element(doc).unwrap();
    /// let a = om.first_child(p).unwrap();
    /// let b = om.next_sibling(a).unwrap();
    /// assert_eq!(om.next_sibling(b), None);
    /// ```
    pub fn next_sibling(&mut self, node: Node) -> Option<Node> {
        if self.is_removed(node) {
            return None;
        }
        self.try_next_sibling(node)
            .unwrap_or_else(|e| log_swallowed("next_sibling", e))
    }

    /// Get the previous sibling among the nodes built so far.
    pub fn previous_sibling(&self, node: Node) -> Option<Node> {
        if let Some(previous) = self.arena.get(node.get())?.previous_sibling() {
            return Some(Node::new(previous));
        }
        let (document, index) = self.top_level_position(node)?;
        let previous = index.checked_sub(1)?;
        self.document_data(document).children.get(previous).copied()
    }

    /// Get the last child among the nodes built so far.
    pub fn last_child(&self, node: Node) -> Option<Node> {
        self.arena.get(node.get())?.last_child().map(Node::new)
    }

    /// All children of a node, building the node completely.
    pub fn child_nodes(&mut self, node: Node) -> Result<Vec<Node>, Error> {
        let mut children = Vec::new();
        let mut current = self.try_first_child(node)?;
        while let Some(child) = current {
            children.push(child);
            current = self.try_next_sibling(child)?;
        }
        Ok(children)
    }

    /// Ancestors of a node, starting with the node itself. A freed node
    /// has none.
    pub fn ancestors(&self, node: Node) -> impl Iterator<Item = Node> + '_ {
        let live = !self.is_removed(node);
        live.then(|| node.get().ancestors(&self.arena).map(Node::new))
            .into_iter()
            .flatten()
    }

    /// The top-level node at `index` of a document, building it if
    /// needed.
    pub fn try_document_child(
        &mut self,
        document: Document,
        index: usize,
    ) -> Result<Option<Node>, Error> {
        loop {
            let data = self.document_data(document);
            if let Some(child) = data.children.get(index) {
                return Ok(Some(*child));
            }
            if data.state != BuildState::Building || !self.pull(document)? {
                return Ok(None);
            }
        }
    }
}

fn log_swallowed(operation: &'static str, error: Error) -> Option<Node> {
    warn!(operation, %error, "building the tree failed during navigation");
    None
}
