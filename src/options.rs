#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Options controlling how a document is built from tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ParseOptions {
    /// Keep whitespace-only text inside elements. Whitespace at the top
    /// level of a document is always dropped.
    pub preserve_whitespace: bool,
    /// Reject documents nested deeper than this many elements.
    pub max_depth: Option<usize>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            preserve_whitespace: true,
            max_depth: Some(1024),
        }
    }
}

/// Options for [`XmlWriter`](crate::XmlWriter).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WriterOptions {
    /// Start the output with `<?xml version="1.0" encoding="UTF-8"?>`.
    pub xml_declaration: bool,
    /// Write elements without children as `<x/>`. Elements parsed from an
    /// empty-element tag are written that way regardless.
    pub collapse_empty_elements: bool,
}

impl Default for WriterOptions {
    fn default() -> Self {
        WriterOptions {
            xml_declaration: false,
            collapse_empty_elements: true,
        }
    }
}
