use indextree::{Arena, NodeId};

use crate::builder::Builder;
use crate::error::Error;
use crate::namespace::{Namespace, NamespaceId, NamespaceLookup, PrefixId, PrefixLookup};
use crate::token::TokenSource;
use crate::xmlvalue::Value;

pub(crate) const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

pub(crate) type OmArena = Arena<NodeData>;

/// A node in the tree.
/// This is a lightweight value and can be copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Node(NodeId);

impl Node {
    #[inline]
    pub(crate) fn new(node_id: NodeId) -> Self {
        Node(node_id)
    }

    #[inline]
    pub(crate) fn get(&self) -> NodeId {
        self.0
    }
}

/// A handle to a document: the ordered top-level nodes of one parse, and
/// the builder that is still producing them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Document(usize);

impl Document {
    #[inline]
    pub(crate) fn get(&self) -> usize {
        self.0
    }
}

/// How far a document has been built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildState {
    /// Input remains; navigation may pull more of it.
    Building,
    /// All input was consumed.
    Complete,
    /// The token source or the builder reported an error. The part built
    /// before the error stays usable.
    Failed,
}

pub(crate) struct NodeData {
    pub(crate) value: Value,
    pub(crate) complete: bool,
    /// Document whose builder still owes this node input.
    pub(crate) builder: Option<Document>,
    /// Document this node was parsed into or appended to at the top level.
    pub(crate) document: Option<Document>,
}

impl NodeData {
    pub(crate) fn new(value: Value) -> Self {
        NodeData {
            value,
            complete: true,
            builder: None,
            document: None,
        }
    }
}

pub(crate) struct DocumentData<'a> {
    pub(crate) children: Vec<Node>,
    pub(crate) root_element: Option<Node>,
    pub(crate) builder: Option<Builder>,
    pub(crate) source: Option<Box<dyn TokenSource + 'a>>,
    pub(crate) state: BuildState,
}

impl<'a> DocumentData<'a> {
    pub(crate) fn new(builder: Option<Builder>) -> Self {
        let state = if builder.is_some() {
            BuildState::Building
        } else {
            BuildState::Complete
        };
        DocumentData {
            children: Vec::new(),
            root_element: None,
            builder,
            source: None,
            state,
        }
    }
}

/// The `Om` struct owns every node, document and interned namespace in
/// your program. Nodes, documents and namespaces are handles into it.
///
/// `'a` is the lifetime of input that lazily built documents still read
/// from; see [`Om::parse_lazy`].
///
/// `Om` is implemented in several sections focusing on different aspects
/// of accessing and manipulating the tree.
pub struct Om<'a> {
    pub(crate) arena: OmArena,
    pub(crate) documents: Vec<DocumentData<'a>>,
    pub(crate) namespace_lookup: NamespaceLookup,
    pub(crate) prefix_lookup: PrefixLookup,
    pub(crate) empty_prefix_id: PrefixId,
    pub(crate) xml_namespace_id: NamespaceId,
}

impl<'a> Om<'a> {
    /// Create a new, empty `Om`.
    pub fn new() -> Self {
        let mut prefix_lookup = PrefixLookup::new();
        let empty_prefix_id = prefix_lookup.get_id_mut(String::new());
        let xml_prefix_id = prefix_lookup.get_id_mut("xml".to_string());
        let mut namespace_lookup = NamespaceLookup::new();
        let xml_namespace_id =
            namespace_lookup.get_id_mut(Namespace::new(xml_prefix_id, XML_NAMESPACE.to_string()));
        Om {
            arena: OmArena::new(),
            documents: Vec::new(),
            namespace_lookup,
            prefix_lookup,
            empty_prefix_id,
            xml_namespace_id,
        }
    }

    /// The data of a node, or `None` once it was freed.
    #[inline]
    pub(crate) fn try_data(&self, node: Node) -> Option<&NodeData> {
        self.arena.get(node.get()).and_then(|node| node.try_get())
    }

    pub(crate) fn check_live(&self, node: Node) -> Result<(), Error> {
        if self.try_data(node).is_none() {
            return Err(Error::Removed(node));
        }
        Ok(())
    }

    /// # Panics
    ///
    /// Panics if the node was freed.
    #[inline]
    pub(crate) fn data(&self, node: Node) -> &NodeData {
        self.arena[node.get()].get()
    }

    #[inline]
    pub(crate) fn data_mut(&mut self, node: Node) -> &mut NodeData {
        self.arena[node.get()].get_mut()
    }

    pub(crate) fn add_document(&mut self, data: DocumentData<'a>) -> Document {
        self.documents.push(data);
        Document(self.documents.len() - 1)
    }

    #[inline]
    pub(crate) fn document_data(&self, document: Document) -> &DocumentData<'a> {
        &self.documents[document.get()]
    }

    #[inline]
    pub(crate) fn document_data_mut(&mut self, document: Document) -> &mut DocumentData<'a> {
        &mut self.documents[document.get()]
    }
}

impl<'a> Default for Om<'a> {
    fn default() -> Self {
        Self::new()
    }
}
