use ahash::{HashMap, HashSet};
use tracing::debug;

use crate::error::Error;
use crate::namespace::{Namespace, NamespaceId, PrefixId};
use crate::omdata::{Node, Om, XML_NAMESPACE};
use crate::xmlvalue::{Element, Prefixes, Value};

/// Namespace lookup, declaration and resolution.
///
/// A namespace is always a binding of a prefix to a URI; the empty prefix
/// is the default namespace. Lookups that find nothing return [`None`].
impl<'a> Om<'a> {
    /// Look up a prefix id.
    pub fn prefix(&self, prefix: &str) -> Option<PrefixId> {
        self.prefix_lookup.get_id(&prefix.to_string())
    }

    /// Add a prefix. If it already exists, return its id.
    pub fn add_prefix(&mut self, prefix: &str) -> PrefixId {
        self.prefix_lookup.get_id_mut(prefix.to_string())
    }

    /// The prefix string behind a prefix id. The empty string is the
    /// default namespace prefix.
    pub fn prefix_str(&self, prefix: PrefixId) -> &str {
        self.prefix_lookup.get_value(prefix)
    }

    pub(crate) fn add_namespace(&mut self, prefix: PrefixId, uri: &str) -> NamespaceId {
        self.namespace_lookup
            .get_id_mut(Namespace::new(prefix, uri.to_string()))
    }

    /// The binding behind a namespace id.
    pub fn namespace(&self, namespace: NamespaceId) -> &Namespace {
        self.namespace_lookup.get_value(namespace)
    }

    /// The URI of a namespace. It is empty for an `xmlns=""` undeclaration.
    pub fn namespace_uri(&self, namespace: NamespaceId) -> &str {
        self.namespace(namespace).uri()
    }

    /// The prefix a namespace is bound with.
    pub fn namespace_prefix(&self, namespace: NamespaceId) -> &str {
        self.prefix_str(self.namespace(namespace).prefix())
    }

    /// The id of the implicit `xml` binding.
    pub fn xml_namespace(&self) -> NamespaceId {
        self.xml_namespace_id
    }

    fn find_in_declarations(
        &self,
        declarations: &Prefixes,
        uri: Option<&str>,
        prefix: Option<&str>,
    ) -> Option<NamespaceId> {
        match (uri, prefix) {
            (Some(uri), Some(prefix)) if !prefix.is_empty() => {
                let prefix_id = self.prefix(prefix)?;
                declarations
                    .get(&prefix_id)
                    .copied()
                    .filter(|namespace| self.namespace_uri(*namespace) == uri)
            }
            (Some(uri), _) => declarations
                .iter()
                .map(|(_, namespace)| *namespace)
                .find(|namespace| self.namespace_uri(*namespace) == uri),
            (None, Some(prefix)) => {
                let prefix_id = self.prefix(prefix)?;
                declarations.get(&prefix_id).copied()
            }
            (None, None) => None,
        }
    }

    fn is_xml_lookup(uri: Option<&str>, prefix: Option<&str>) -> bool {
        match (uri, prefix) {
            (Some(uri), Some("xml")) => uri == XML_NAMESPACE,
            (None, Some("xml")) => true,
            (Some(uri), None) => uri == XML_NAMESPACE,
            _ => false,
        }
    }

    /// Find a namespace declared on this element only.
    ///
    /// With both a URI and a non-empty prefix, the prefix has to be bound to
    /// that URI. With only a URI (or an empty prefix), the first declaration
    /// of the URI matches. With only a prefix, its declaration matches.
    pub fn find_declared_namespace(
        &self,
        node: Node,
        uri: Option<&str>,
        prefix: Option<&str>,
    ) -> Option<NamespaceId> {
        if Self::is_xml_lookup(uri, prefix) {
            return Some(self.xml_namespace_id);
        }
        let element = self.element(node)?;
        self.find_in_declarations(&element.namespaces, uri, prefix)
    }

    /// Find a namespace in scope at `node`: declared on it or on the
    /// nearest ancestor that matches.
    ///
    /// Matching follows [`Om::find_declared_namespace`].
    ///
    /// ```rust
    /// use omtree::Om;
    ///
    /// let mut om = Om::new();
    /// let doc = om.parse(r#"<a xmlns:p="urn:x"><b/></a>"#)?;
    /// let a = om.root_element(doc).unwrap();
    /// let b = om.first_child(a).unwrap();
    ///
    /// let ns = om.find_namespace(b, Some("urn:x"), Some("p")).unwrap();
    /// assert_eq!(om.namespace_prefix(ns), "p");
    /// assert!(om.find_namespace(b, Some("urn:y"), Some("p")).is_none());
    /// # Ok::<(), omtree::Error>(())
    /// ```
    pub fn find_namespace(
        &self,
        node: Node,
        uri: Option<&str>,
        prefix: Option<&str>,
    ) -> Option<NamespaceId> {
        if Self::is_xml_lookup(uri, prefix) {
            return Some(self.xml_namespace_id);
        }
        self.ancestors(node).find_map(|ancestor| {
            let element = self.element(ancestor)?;
            self.find_in_declarations(&element.namespaces, uri, prefix)
        })
    }

    /// The binding of a prefix nearest to `node`, starting at `node`.
    pub(crate) fn namespace_for_prefix(&self, node: Node, prefix: PrefixId) -> Option<NamespaceId> {
        self.ancestors(node)
            .find_map(|ancestor| self.element(ancestor)?.get_namespace(prefix))
    }

    /// The namespace `prefix` resolves to at `node`, if that is `uri`.
    ///
    /// Unlike [`Om::find_namespace`], a binding hidden by a nearer
    /// declaration of the same prefix does not count.
    pub(crate) fn binding_in_scope(
        &self,
        node: Node,
        prefix: &str,
        uri: &str,
    ) -> Option<NamespaceId> {
        if Self::is_xml_lookup(Some(uri), Some(prefix)) {
            return Some(self.xml_namespace_id);
        }
        let prefix_id = self.prefix(prefix)?;
        self.namespace_for_prefix(node, prefix_id)
            .filter(|namespace| self.namespace_uri(*namespace) == uri)
    }

    /// Resolve a prefix written on a start tag, given the declarations of
    /// that tag and its parent. `xmlns=""` resolves to no namespace.
    pub(crate) fn resolve_prefix(
        &self,
        declarations: &Prefixes,
        parent: Option<Node>,
        prefix: &str,
    ) -> Result<Option<NamespaceId>, Error> {
        if prefix == "xml" {
            return Ok(Some(self.xml_namespace_id));
        }
        let found = self.prefix(prefix).and_then(|prefix_id| {
            declarations
                .get(&prefix_id)
                .copied()
                .or_else(|| parent.and_then(|parent| self.namespace_for_prefix(parent, prefix_id)))
        });
        match found {
            Some(namespace) if self.namespace_uri(namespace).is_empty() => Ok(None),
            Some(namespace) => Ok(Some(namespace)),
            None if prefix.is_empty() => Ok(None),
            None => Err(Error::UnknownPrefix(prefix.to_string())),
        }
    }

    /// Declare `prefix` for `uri` on an element.
    ///
    /// Declaring a binding the element already has returns the existing
    /// id. Declaring a prefix the element already binds to another URI is
    /// a [`Error::PrefixConflict`], and so is a declaration that would move
    /// the element's own name or attributes to another namespace.
    pub fn declare_namespace(
        &mut self,
        node: Node,
        prefix: &str,
        uri: &str,
    ) -> Result<NamespaceId, Error> {
        self.declare_on(node, prefix, uri, true)
    }

    /// Declare a binding on an element. With `keep_name` unset the
    /// element's own name is about to change and is not checked.
    pub(crate) fn declare_on(
        &mut self,
        node: Node,
        prefix: &str,
        uri: &str,
        keep_name: bool,
    ) -> Result<NamespaceId, Error> {
        self.check_live(node)?;
        if !self.is_element(node) {
            return Err(Error::NotElement(node));
        }
        match prefix {
            "xml" if uri == XML_NAMESPACE => return Ok(self.xml_namespace_id),
            "xml" | "xmlns" => return Err(Error::ReservedPrefix(prefix.to_string())),
            _ => {}
        }
        let prefix_id = self.add_prefix(prefix);
        let namespace = self.add_namespace(prefix_id, uri);
        let element = self.element(node).ok_or(Error::NotElement(node))?;
        if let Some(existing) = element.get_namespace(prefix_id) {
            if existing == namespace {
                return Ok(existing);
            }
            return Err(Error::PrefixConflict {
                prefix: prefix.to_string(),
                existing: self.namespace_uri(existing).to_string(),
                uri: uri.to_string(),
            });
        }
        self.check_rebound(node, prefix, uri, keep_name)?;
        if let Some(element) = self.element_mut(node) {
            element.namespaces.insert(prefix_id, namespace);
        }
        Ok(namespace)
    }

    /// The default namespace in scope at `node`, if any.
    pub fn default_namespace(&self, node: Node) -> Option<NamespaceId> {
        self.namespace_for_prefix(node, self.empty_prefix_id)
            .filter(|namespace| !self.namespace_uri(*namespace).is_empty())
    }

    /// Declare the default namespace on an element. An empty URI
    /// undeclares an inherited default.
    pub fn declare_default_namespace(
        &mut self,
        node: Node,
        uri: &str,
    ) -> Result<NamespaceId, Error> {
        self.declare_namespace(node, "", uri)
    }

    /// Put an element in the namespace `uri` using `prefix`, declaring the
    /// binding on the element unless `prefix` already resolves to `uri`
    /// there.
    pub fn set_namespace(
        &mut self,
        node: Node,
        prefix: &str,
        uri: &str,
    ) -> Result<NamespaceId, Error> {
        self.check_live(node)?;
        if !self.is_element(node) {
            return Err(Error::NotElement(node));
        }
        if uri.is_empty() {
            return Err(Error::InvalidOperation(
                "cannot bind an element to the empty namespace URI".into(),
            ));
        }
        self.check_rebound(node, prefix, uri, false)?;
        let namespace = match self.binding_in_scope(node, prefix, uri) {
            Some(namespace) => namespace,
            None => self.declare_on(node, prefix, uri, false)?,
        };
        if let Some(element) = self.element_mut(node) {
            element.namespace = Some(namespace);
        }
        Ok(namespace)
    }

    /// The nearest declaration of every prefix declared on a strict
    /// ancestor of `node`.
    pub fn gather_parent_namespaces(&self, node: Node) -> HashMap<PrefixId, NamespaceId> {
        let mut gathered = HashMap::default();
        for ancestor in self.ancestors(node).skip(1) {
            if let Some(element) = self.element(ancestor) {
                for (prefix, namespace) in element.namespaces.iter() {
                    gathered.entry(*prefix).or_insert(*namespace);
                }
            }
        }
        gathered
    }

    /// Every binding visible at `node`, nearest declaration first.
    pub fn namespaces_in_scope(&self, node: Node) -> Vec<(PrefixId, NamespaceId)> {
        let mut seen = HashSet::default();
        let mut in_scope = Vec::new();
        for ancestor in self.ancestors(node) {
            if let Some(element) = self.element(ancestor) {
                for (prefix, namespace) in element.namespaces.iter() {
                    if seen.insert(*prefix) {
                        in_scope.push((*prefix, *namespace));
                    }
                }
            }
        }
        in_scope
    }

    /// Whether `prefix` is declared on `node` or an ancestor up to and
    /// including `top`.
    fn declared_up_to(&self, node: Node, top: Node, prefix: PrefixId) -> bool {
        for ancestor in node.get().ancestors(&self.arena) {
            if let Value::Element(element) = &self.arena[ancestor].get().value {
                if element.namespaces.contains_key(&prefix) {
                    return true;
                }
            }
            if ancestor == top.get() {
                break;
            }
        }
        false
    }

    /// Declare on `root` the inherited bindings its subtree uses but no
    /// longer sees. Each binding is declared at most once; a use shadowed
    /// by a declaration inside the subtree is left alone.
    pub(crate) fn redeclare_parent_namespaces(
        &mut self,
        root: Node,
        mut inherited: HashMap<PrefixId, NamespaceId>,
    ) {
        let mut redeclared = Vec::new();
        for descendant in root.get().descendants(&self.arena) {
            if inherited.is_empty() {
                break;
            }
            let node = Node::new(descendant);
            let Some(element) = self.element(node) else {
                continue;
            };
            for namespace in used_namespaces(element) {
                let prefix = self.namespace(namespace).prefix();
                if inherited.get(&prefix) != Some(&namespace) {
                    continue;
                }
                if self.declared_up_to(node, root, prefix) {
                    continue;
                }
                inherited.remove(&prefix);
                redeclared.push((prefix, namespace));
            }
        }
        // a binding that would move the root's own names is left to the
        // serializer, which declares it where it is used
        if let Some(element) = self.element(root) {
            redeclared.retain(|(prefix, namespace)| {
                let uri = self.namespace_uri(*namespace);
                self.rebound_use(element, *prefix, uri, true).is_none()
            });
        }
        if let Some(element) = self.element_mut(root) {
            for (prefix, namespace) in redeclared {
                element.namespaces.insert(prefix, namespace);
            }
        }
        debug!(
            remaining = inherited.len(),
            "redeclared inherited namespaces on detached subtree"
        );
    }
}

impl<'a> Om<'a> {
    /// A name on the element itself that writes `prefix` for a namespace
    /// other than `uri`. `Some(None)` is an element in no namespace that a
    /// new default namespace would capture.
    fn rebound_use(
        &self,
        element: &Element,
        prefix: PrefixId,
        uri: &str,
        include_name: bool,
    ) -> Option<Option<NamespaceId>> {
        if include_name
            && element.namespace.is_none()
            && prefix == self.empty_prefix_id
            && !uri.is_empty()
        {
            return Some(None);
        }
        let name = if include_name { element.namespace } else { None };
        name.into_iter()
            .chain(element.attributes.iter().filter_map(|a| a.namespace))
            .find(|used| {
                self.namespace(*used).prefix() == prefix && self.namespace_uri(*used) != uri
            })
            .map(Some)
    }

    /// Fail if binding `prefix` to `uri` on an element would move one of
    /// its own names to another namespace.
    pub(crate) fn check_rebound(
        &self,
        node: Node,
        prefix: &str,
        uri: &str,
        include_name: bool,
    ) -> Result<(), Error> {
        let (Some(element), Some(prefix_id)) = (self.element(node), self.prefix(prefix)) else {
            return Ok(());
        };
        match self.rebound_use(element, prefix_id, uri, include_name) {
            Some(used) => Err(Error::PrefixConflict {
                prefix: prefix.to_string(),
                existing: used
                    .map(|used| self.namespace_uri(used).to_string())
                    .unwrap_or_default(),
                uri: uri.to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// The namespaces an element name and its attributes use.
pub(crate) fn used_namespaces(element: &Element) -> Vec<NamespaceId> {
    element
        .namespace
        .into_iter()
        .chain(element.attributes.iter().filter_map(|a| a.namespace))
        .collect()
}
