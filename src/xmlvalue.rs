use vector_map::VecMap;

use crate::error::Error;
use crate::namespace::{NamespaceId, PrefixId};

/// The type of a node.
///
/// Use it when you need the kind of node without matching on its
/// [`Value`].
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum ValueType {
    /// Element; it has a name, attributes and namespace declarations.
    Element,
    /// Character data.
    Text,
    /// Comment.
    Comment,
    /// Processing instruction.
    ProcessingInstruction,
    /// Document type declaration.
    Doctype,
    /// Pre-serialized XML written through verbatim.
    DataSource,
}

/// The payload of a node.
///
/// Access it with [`Om::value`](crate::Om::value) or mutably with
/// [`Om::value_mut`](crate::Om::value_mut).
#[derive(Debug, Clone)]
pub enum Value {
    Element(Element),
    Text(Text),
    Comment(Comment),
    ProcessingInstruction(ProcessingInstruction),
    Doctype(Doctype),
    DataSource(DataSource),
}

impl Value {
    /// Returns the type of the value.
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Element(_) => ValueType::Element,
            Value::Text(_) => ValueType::Text,
            Value::Comment(_) => ValueType::Comment,
            Value::ProcessingInstruction(_) => ValueType::ProcessingInstruction,
            Value::Doctype(_) => ValueType::Doctype,
            Value::DataSource(_) => ValueType::DataSource,
        }
    }
}

/// Namespace declarations made on one element, by prefix.
pub type Prefixes = VecMap<PrefixId, NamespaceId>;

/// An attribute. Unprefixed attributes are in no namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub(crate) local_name: String,
    pub(crate) namespace: Option<NamespaceId>,
    pub(crate) value: String,
}

impl Attribute {
    pub(crate) fn new(local_name: String, namespace: Option<NamespaceId>, value: String) -> Self {
        Attribute {
            local_name,
            namespace,
            value,
        }
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    pub fn namespace(&self) -> Option<NamespaceId> {
        self.namespace
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Attributes of an element in document order, keyed by local name and
/// namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<Attribute>);

impl Attributes {
    pub fn new() -> Self {
        Attributes(Vec::new())
    }

    pub fn get(&self, local_name: &str, namespace: Option<NamespaceId>) -> Option<&Attribute> {
        self.0
            .iter()
            .find(|a| a.local_name == local_name && a.namespace == namespace)
    }

    /// Set an attribute. An existing attribute with the same key keeps its
    /// position and gets the new value.
    pub fn insert<S: Into<String>>(
        &mut self,
        local_name: &str,
        namespace: Option<NamespaceId>,
        value: S,
    ) {
        let value = value.into();
        if let Some(existing) = self
            .0
            .iter_mut()
            .find(|a| a.local_name == local_name && a.namespace == namespace)
        {
            existing.value = value;
        } else {
            self.0
                .push(Attribute::new(local_name.to_string(), namespace, value));
        }
    }

    pub fn remove(&mut self, local_name: &str, namespace: Option<NamespaceId>) -> Option<String> {
        let index = self
            .0
            .iter()
            .position(|a| a.local_name == local_name && a.namespace == namespace)?;
        Some(self.0.remove(index).value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// XML element value.
///
/// Example: `<soap:Body/>` or `<item id="1">`.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub(crate) local_name: String,
    pub(crate) namespace: Option<NamespaceId>,
    pub(crate) attributes: Attributes,
    pub(crate) namespaces: Prefixes,
    pub(crate) is_empty: bool,
}

impl Element {
    pub(crate) fn new(local_name: String, namespace: Option<NamespaceId>) -> Self {
        Element {
            local_name,
            namespace,
            attributes: Attributes::new(),
            namespaces: Prefixes::new(),
            is_empty: false,
        }
    }

    /// The local part of the element name.
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// Rename the element, keeping its namespace.
    pub fn set_local_name<S: Into<String>>(&mut self, local_name: S) {
        self.local_name = local_name.into();
    }

    /// The namespace binding the element name uses, if any.
    pub fn namespace(&self) -> Option<NamespaceId> {
        self.namespace
    }

    /// Bind the element name to a namespace.
    ///
    /// The binding has to be declared on this element or an ancestor by
    /// the time the tree is serialized, unless the subtree serializer
    /// supplies it. See [`Om::set_namespace`](crate::Om::set_namespace) for
    /// a variant that declares it as needed.
    pub fn set_namespace(&mut self, namespace: Option<NamespaceId>) {
        self.namespace = namespace;
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }

    /// Get an attribute value by local name and namespace.
    pub fn get_attribute(&self, local_name: &str, namespace: Option<NamespaceId>) -> Option<&str> {
        self.attributes
            .get(local_name, namespace)
            .map(|a| a.value.as_str())
    }

    pub fn set_attribute<S: Into<String>>(
        &mut self,
        local_name: &str,
        namespace: Option<NamespaceId>,
        value: S,
    ) {
        self.attributes.insert(local_name, namespace, value);
    }

    pub fn remove_attribute(
        &mut self,
        local_name: &str,
        namespace: Option<NamespaceId>,
    ) -> Option<String> {
        self.attributes.remove(local_name, namespace)
    }

    /// The namespace declarations made on this element.
    ///
    /// Declarations on ancestors are not included.
    pub fn namespaces(&self) -> &Prefixes {
        &self.namespaces
    }

    /// The namespace a prefix is bound to on this element only.
    pub fn get_namespace(&self, prefix: PrefixId) -> Option<NamespaceId> {
        self.namespaces.get(&prefix).copied()
    }

    /// Remove a declaration. Serialization then declares the namespace on
    /// the elements that still use it.
    pub fn remove_namespace_declaration(&mut self, prefix: PrefixId) -> Option<NamespaceId> {
        self.namespaces.remove(&prefix)
    }

    /// Whether the element was written as `<x/>` in the source.
    pub fn is_empty(&self) -> bool {
        self.is_empty
    }

    /// Mark the element to be written self-closing when it has no
    /// children, even if the writer does not collapse empty elements.
    pub fn set_is_empty(&mut self, is_empty: bool) {
        self.is_empty = is_empty;
    }
}

/// Character data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    pub(crate) text: String,
}

impl Text {
    pub(crate) fn new(text: String) -> Self {
        Text { text }
    }

    pub fn get(&self) -> &str {
        &self.text
    }

    pub fn set<S: Into<String>>(&mut self, text: S) {
        self.text = text.into();
    }
}

/// XML comment.
///
/// Example: `<!-- note -->`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub(crate) text: String,
}

impl Comment {
    pub(crate) fn new(text: String) -> Self {
        Comment { text }
    }

    pub fn get(&self) -> &str {
        &self.text
    }

    /// Set the comment text.
    ///
    /// Rejects text containing `--`.
    pub fn set<S: Into<String>>(&mut self, text: S) -> Result<(), Error> {
        let text = text.into();
        check_comment(&text)?;
        self.text = text;
        Ok(())
    }
}

pub(crate) fn check_comment(text: &str) -> Result<(), Error> {
    if text.contains("--") || text.ends_with('-') {
        return Err(Error::InvalidComment(text.to_string()));
    }
    Ok(())
}

/// XML processing instruction.
///
/// Example: `<?xml-stylesheet href="a.xsl"?>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingInstruction {
    pub(crate) target: String,
    pub(crate) data: Option<String>,
}

impl ProcessingInstruction {
    pub(crate) fn new(target: String, data: Option<String>) -> Self {
        ProcessingInstruction { target, data }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }

    /// Set target.
    ///
    /// Rejects an empty target and `xml` in any case.
    pub fn set_target<S: Into<String>>(&mut self, target: S) -> Result<(), Error> {
        let target = target.into();
        check_target(&target)?;
        self.target = target;
        Ok(())
    }

    /// Set data. Empty data is the same as none.
    pub fn set_data<S: Into<String>>(&mut self, data: Option<S>) {
        self.data = data.map(Into::into).filter(|d| !d.is_empty());
    }
}

pub(crate) fn check_target(target: &str) -> Result<(), Error> {
    if target.is_empty() || target.eq_ignore_ascii_case("xml") {
        return Err(Error::InvalidTarget(target.to_string()));
    }
    Ok(())
}

/// Document type declaration, kept as the text between `<!DOCTYPE` and the
/// closing `>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Doctype {
    pub(crate) value: String,
}

impl Doctype {
    pub(crate) fn new(value: String) -> Self {
        Doctype { value }
    }

    pub fn get(&self) -> &str {
        &self.value
    }
}

/// Pre-serialized XML. The writer emits it unchanged; it is never parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSource {
    pub(crate) data: String,
}

impl DataSource {
    pub(crate) fn new(data: String) -> Self {
        DataSource { data }
    }

    pub fn get(&self) -> &str {
        &self.data
    }

    pub fn set<S: Into<String>>(&mut self, data: S) {
        self.data = data.into();
    }
}
