#![forbid(unsafe_code)]
//! An XML object model for SOAP processing, built lazily from a stream of
//! tokens.
//!
//! All nodes live in an [`Om`]. Navigating past what has been built pulls
//! more input, so a large message can be inspected, edited and written
//! out without building the parts nobody looks at.
//!
//! ```rust
//! use omtree::Om;
//!
//! let mut om = Om::new();
//! let doc = om.parse_lazy(r#"<s:Envelope xmlns:s="urn:s"><s:Body><op/></s:Body></s:Envelope>"#);
//! let envelope = om.root_element(doc).unwrap();
//! let body = om.first_child(envelope).unwrap();
//! assert_eq!(om.subtree_to_string(body)?, r#"<s:Body xmlns:s="urn:s"><op/></s:Body>"#);
//! # Ok::<(), omtree::Error>(())
//! ```

mod access;
mod builder;
mod creation;
mod document;
mod elementaccess;
mod encoding;
mod entity;
mod error;
mod idmap;
mod manipulation;
mod nameaccess;
mod namespace;
mod omdata;
mod options;
mod reader;
mod serialize;
mod token;
mod valueaccess;
mod writer;
mod xmlvalue;

pub use error::Error;
pub use namespace::{Namespace, NamespaceId, PrefixId};
pub use omdata::{BuildState, Document, Node, Om};
pub use options::{ParseOptions, WriterOptions};
pub use reader::XmlReader;
pub use token::{RawAttribute, StartElement, TokenSource, XmlToken};
pub use writer::{StartTag, Writer, XmlWriter};
pub use xmlvalue::{
    Attribute, Attributes, Comment, DataSource, Doctype, Element, Prefixes,
    ProcessingInstruction, Text, Value, ValueType,
};
