use thiserror::Error;

use crate::omdata::Node;

/// Errors raised while building, editing or serializing a tree.
#[derive(Error, Debug)]
pub enum Error {
    /// An entity reference without a closing `;`.
    #[error("unclosed entity: &{0}")]
    UnclosedEntity(String),
    /// An entity reference that is not predefined and not a character reference.
    #[error("invalid entity: &{0};")]
    InvalidEntity(String),
    /// A prefix used on an element or attribute that no declaration binds.
    #[error("unknown namespace prefix: {0}")]
    UnknownPrefix(String),
    /// The prefix is already declared on this element with another URI.
    #[error("prefix {prefix:?} is already bound to {existing:?}, cannot bind it to {uri:?}")]
    PrefixConflict {
        prefix: String,
        existing: String,
        uri: String,
    },
    /// `xml` bound to a foreign URI, or an attempt to declare `xmlns`.
    #[error("reserved prefix: {0}")]
    ReservedPrefix(String),
    /// A close tag whose name differs from the open element.
    #[error("close tag </{found}> does not match <{expected}>")]
    InvalidCloseTag { expected: String, found: String },
    /// Input ended while elements were still open.
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,
    /// An end tag with no open element.
    #[error("end tag without a matching start tag")]
    UnbalancedEndTag,
    /// A second element at the top level of a document.
    #[error("document has more than one root element")]
    MultipleRootElements,
    /// Input ended without any element.
    #[error("document has no root element")]
    NoRootElement,
    /// Non-whitespace text at the top level of a document.
    #[error("text is not allowed outside the root element")]
    TextOutsideRoot,
    /// Element nesting went past the configured limit.
    #[error("element nesting exceeds {0} levels")]
    DepthLimitExceeded(usize),
    /// The operation needs an element.
    #[error("node is not an element: {0:?}")]
    NotElement(Node),
    /// Sibling insertion relative to a node without a parent.
    #[error("node has no parent: {0:?}")]
    NoParent(Node),
    /// The node was freed.
    #[error("node was removed: {0:?}")]
    Removed(Node),
    /// A structural edit that would break the tree.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
    /// Comment text containing `--`.
    #[error("invalid comment: {0}")]
    InvalidComment(String),
    /// Empty processing instruction target, or `xml`.
    #[error("invalid processing instruction target: {0}")]
    InvalidTarget(String),
    /// Byte input that could not be decoded.
    #[error("input cannot be decoded as {0}")]
    Decoding(&'static str),
    #[error("tree error: {0}")]
    Tree(#[from] indextree::NodeError),
    #[error("XML syntax error: {0}")]
    Parser(#[from] xmlparser::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialized output is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
