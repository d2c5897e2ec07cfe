use crate::idmap::{IdIndex, IdMap};

/// Id of an interned namespace prefix. The empty prefix stands for the
/// default namespace.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Ord, PartialOrd)]
pub struct PrefixId(u16);

impl IdIndex<PrefixId> for PrefixId {
    fn to_id(index: usize) -> PrefixId {
        PrefixId(index as u16)
    }

    fn from_id(id: PrefixId) -> usize {
        id.0 as usize
    }
}

pub(crate) type PrefixLookup = IdMap<PrefixId, String>;

/// Id of an interned `(prefix, uri)` namespace binding.
///
/// Two declarations of the same prefix for the same URI share an id, so
/// comparing ids compares both halves of the binding.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct NamespaceId(u16);

impl IdIndex<NamespaceId> for NamespaceId {
    fn to_id(index: usize) -> NamespaceId {
        NamespaceId(index as u16)
    }

    fn from_id(id: NamespaceId) -> usize {
        id.0 as usize
    }
}

/// A namespace binding: a prefix bound to a URI.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct Namespace {
    pub(crate) prefix: PrefixId,
    pub(crate) uri: String,
}

impl Namespace {
    pub(crate) fn new(prefix: PrefixId, uri: String) -> Self {
        Self { prefix, uri }
    }

    /// The bound prefix.
    pub fn prefix(&self) -> PrefixId {
        self.prefix
    }

    /// The namespace URI. Empty for an `xmlns=""` undeclaration.
    pub fn uri(&self) -> &str {
        &self.uri
    }
}

pub(crate) type NamespaceLookup = IdMap<NamespaceId, Namespace>;
