use ahash::HashMap;
use std::io;

use crate::error::Error;
use crate::nameaccess::used_namespaces;
use crate::namespace::{NamespaceId, PrefixId};
use crate::omdata::{Document, Node, Om};
use crate::options::WriterOptions;
use crate::writer::{StartTag, Writer, XmlWriter};
use crate::xmlvalue::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Output continues the declarations of the start node's ancestors.
    Full,
    /// Output starts with nothing declared.
    Subtree,
}

/// Bindings a start tag replaced, to restore at its end tag. `None` means
/// the prefix was unbound before.
type Replaced = Vec<(PrefixId, Option<Option<NamespaceId>>)>;

/// Walks a tree without recursion, pulling unbuilt input as it goes.
///
/// Every element writes its own declarations. A name whose prefix is not
/// bound to its namespace at that point of the output gets a declaration
/// on its start tag, and an element in no namespace under a default
/// namespace gets `xmlns=""`. These stay in scope for the element's
/// content only.
struct Serializer<'s, 'a, W: Writer + ?Sized> {
    om: &'s mut Om<'a>,
    writer: &'s mut W,
    /// The binding of each prefix at the current point of the output.
    /// `None` is a default namespace undeclared with `xmlns=""`.
    in_scope: HashMap<PrefixId, Option<NamespaceId>>,
    scopes: Vec<Replaced>,
}

impl<'s, 'a, W: Writer + ?Sized> Serializer<'s, 'a, W> {
    fn new(om: &'s mut Om<'a>, writer: &'s mut W, mode: Mode, root: Node) -> Self {
        let mut in_scope = HashMap::default();
        if mode == Mode::Full {
            if let Some(parent) = om.parent(root) {
                for (prefix, namespace) in om.namespaces_in_scope(parent) {
                    in_scope.insert(prefix, binding(om, namespace));
                }
            }
        }
        Serializer {
            om,
            writer,
            in_scope,
            scopes: Vec::new(),
        }
    }

    fn serialize(&mut self, root: Node) -> Result<(), Error> {
        self.om.check_live(root)?;
        let mut stack: Vec<Node> = Vec::new();
        let mut current = Some(root);
        while let Some(node) = current {
            if self.start(node)? {
                if let Some(child) = self.om.try_first_child(node)? {
                    stack.push(node);
                    current = Some(child);
                    continue;
                }
                self.end(node)?;
            }
            current = None;
            // the start node never moves on to its own siblings
            let mut node = node;
            while node != root {
                if let Some(next) = self.om.try_next_sibling(node)? {
                    current = Some(next);
                    break;
                }
                match stack.pop() {
                    Some(parent) => {
                        self.end(parent)?;
                        node = parent;
                    }
                    None => break,
                }
            }
        }
        Ok(())
    }

    /// Write the start of a node. Returns `true` for elements, whose end
    /// tag is still owed.
    fn start(&mut self, node: Node) -> Result<bool, Error> {
        let om = &*self.om;
        match om.value(node) {
            Value::Element(element) => {
                let mut namespaces = Vec::new();
                let mut written = Vec::new();
                let mut replaced = Replaced::new();
                for (prefix, namespace) in element.namespaces.iter() {
                    namespaces.push((om.prefix_str(*prefix), om.namespace_uri(*namespace)));
                    written.push(*prefix);
                    let previous = self.in_scope.insert(*prefix, binding(om, *namespace));
                    replaced.push((*prefix, previous));
                }
                let empty = om.empty_prefix_id;
                let default_bound = matches!(self.in_scope.get(&empty), Some(Some(_)));
                if element.namespace.is_none() && default_bound {
                    if written.contains(&empty) {
                        let existing = self.in_scope.get(&empty).copied().flatten();
                        return Err(self.conflict(empty, existing, None));
                    }
                    namespaces.push(("", ""));
                    written.push(empty);
                    replaced.push((empty, self.in_scope.insert(empty, None)));
                }
                let used = used_namespaces(element);
                for (i, namespace) in used.iter().enumerate() {
                    let prefix = om.namespace(*namespace).prefix();
                    let other = used[..i].iter().find(|other| {
                        *other != namespace && om.namespace(**other).prefix() == prefix
                    });
                    if let Some(other) = other {
                        return Err(self.conflict(prefix, Some(*other), Some(*namespace)));
                    }
                }
                for namespace in used {
                    if namespace == om.xml_namespace_id {
                        continue;
                    }
                    let prefix = om.namespace(namespace).prefix();
                    if self.in_scope.get(&prefix) == Some(&Some(namespace)) {
                        continue;
                    }
                    if written.contains(&prefix) {
                        let existing = self.in_scope.get(&prefix).copied().flatten();
                        return Err(self.conflict(prefix, existing, Some(namespace)));
                    }
                    namespaces.push((om.prefix_str(prefix), om.namespace_uri(namespace)));
                    written.push(prefix);
                    replaced.push((prefix, self.in_scope.insert(prefix, Some(namespace))));
                }
                self.scopes.push(replaced);
                let attributes = element
                    .attributes
                    .iter()
                    .map(|attribute| {
                        (
                            om.qualified_name(attribute.namespace, &attribute.local_name),
                            attribute.value.as_str(),
                        )
                    })
                    .collect();
                let tag = StartTag {
                    name: om.qualified_name(element.namespace, &element.local_name),
                    namespaces,
                    attributes,
                    is_empty: element.is_empty,
                };
                self.writer.write_start_tag(&tag)?;
                Ok(true)
            }
            Value::Text(text) => {
                self.writer.write_text(text.get())?;
                Ok(false)
            }
            Value::Comment(comment) => {
                self.writer.write_comment(comment.get())?;
                Ok(false)
            }
            Value::ProcessingInstruction(pi) => {
                self.writer
                    .write_processing_instruction(pi.target(), pi.data())?;
                Ok(false)
            }
            Value::Doctype(doctype) => {
                self.writer.write_doctype(doctype.get())?;
                Ok(false)
            }
            Value::DataSource(data_source) => {
                self.writer.write_raw(data_source.get())?;
                Ok(false)
            }
        }
    }

    fn end(&mut self, node: Node) -> Result<(), Error> {
        let om = &*self.om;
        if let Some(element) = om.element(node) {
            let name = om.qualified_name(element.namespace, &element.local_name);
            self.writer.write_end_tag(&name)?;
            if let Some(replaced) = self.scopes.pop() {
                for (prefix, previous) in replaced.into_iter().rev() {
                    match previous {
                        Some(previous) => self.in_scope.insert(prefix, previous),
                        None => self.in_scope.remove(&prefix),
                    };
                }
            }
        }
        Ok(())
    }

    /// One start tag would need two bindings for `prefix`.
    fn conflict(
        &self,
        prefix: PrefixId,
        existing: Option<NamespaceId>,
        wanted: Option<NamespaceId>,
    ) -> Error {
        let uri = |namespace: Option<NamespaceId>| {
            namespace
                .map(|namespace| self.om.namespace_uri(namespace).to_string())
                .unwrap_or_default()
        };
        Error::PrefixConflict {
            prefix: self.om.prefix_str(prefix).to_string(),
            existing: uri(existing),
            uri: uri(wanted),
        }
    }
}

/// What a declaration binds its prefix to: nothing for `xmlns=""`.
fn binding(om: &Om, namespace: NamespaceId) -> Option<NamespaceId> {
    if om.namespace_uri(namespace).is_empty() {
        None
    } else {
        Some(namespace)
    }
}

/// ## Serialization
///
/// Serialization is iterative and pulls input that is not built yet, so it
/// also works on trees still being parsed. An error from the writer or from
/// the builder stops it; output already written stays written.
impl<'a> Om<'a> {
    /// Serialize a node and its descendants.
    ///
    /// Each element carries the declarations made on it, as if the output
    /// continued inside the node's ancestors. A declaration is only added
    /// where a name would otherwise resolve to another namespace. Use
    /// [`Om::serialize_subtree`] for a node that relies on declarations of
    /// its ancestors.
    ///
    /// Fails with [`Error::PrefixConflict`] when one start tag would need
    /// two bindings of the same prefix.
    pub fn serialize<W: Writer + ?Sized>(
        &mut self,
        node: Node,
        writer: &mut W,
    ) -> Result<(), Error> {
        Serializer::new(self, writer, Mode::Full, node).serialize(node)
    }

    /// Serialize a node and its descendants as a standalone fragment.
    ///
    /// A namespace used in the subtree but declared outside it is declared
    /// on the element where it is first used, and stays in scope only for
    /// that element's content.
    ///
    /// ```rust
    /// use omtree::Om;
    ///
    /// let mut om = Om::new();
    /// let doc = om.parse(r#"<a xmlns:p="urn:x"><b><p:c/></b></a>"#)?;
    /// let a = om.root_element(doc).unwrap();
    /// let b = om.first_child(a).unwrap();
    /// assert_eq!(om.subtree_to_string(b)?, r#"<b><p:c xmlns:p="urn:x"/></b>"#);
    /// # Ok::<(), omtree::Error>(())
    /// ```
    pub fn serialize_subtree<W: Writer + ?Sized>(
        &mut self,
        node: Node,
        writer: &mut W,
    ) -> Result<(), Error> {
        Serializer::new(self, writer, Mode::Subtree, node).serialize(node)
    }

    /// Serialize every top-level node of a document, building it to the
    /// end of its input.
    pub fn serialize_document<W: Writer + ?Sized>(
        &mut self,
        document: Document,
        writer: &mut W,
    ) -> Result<(), Error> {
        let mut index = 0;
        while let Some(node) = self.try_document_child(document, index)? {
            self.serialize(node, writer)?;
            index += 1;
        }
        Ok(())
    }

    /// Write a document as XML text to an [`io::Write`] sink.
    pub fn write_document<W: io::Write>(
        &mut self,
        document: Document,
        w: W,
        options: WriterOptions,
    ) -> Result<W, Error> {
        let mut writer = XmlWriter::with_options(w, options);
        self.serialize_document(document, &mut writer)?;
        writer.finish()
    }

    fn string_with<F>(&mut self, f: F) -> Result<String, Error>
    where
        F: FnOnce(&mut Self, &mut XmlWriter<Vec<u8>>) -> Result<(), Error>,
    {
        let mut writer = XmlWriter::new(Vec::new());
        f(self, &mut writer)?;
        Ok(String::from_utf8(writer.finish()?)?)
    }

    /// Serialize a node to a string. See [`Om::serialize`].
    pub fn to_string(&mut self, node: Node) -> Result<String, Error> {
        self.string_with(|om, writer| om.serialize(node, writer))
    }

    /// Serialize a node to a string as a standalone fragment. See
    /// [`Om::serialize_subtree`].
    pub fn subtree_to_string(&mut self, node: Node) -> Result<String, Error> {
        self.string_with(|om, writer| om.serialize_subtree(node, writer))
    }

    /// Serialize a whole document to a string.
    pub fn document_to_string(&mut self, document: Document) -> Result<String, Error> {
        self.string_with(|om, writer| om.serialize_document(document, writer))
    }
}
