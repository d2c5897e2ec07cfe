use std::io;

use crate::entity::{serialize_attribute, serialize_text};
use crate::error::Error;
use crate::options::WriterOptions;

/// An element start tag as handed to a [`Writer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag<'a> {
    /// Qualified name, `prefix:local` or `local`.
    pub name: String,
    /// Declarations to write, as `(prefix, uri)`; the empty prefix is the
    /// default namespace.
    pub namespaces: Vec<(&'a str, &'a str)>,
    /// Attributes as `(qualified name, unescaped value)`.
    pub attributes: Vec<(String, &'a str)>,
    /// The element was parsed from an empty-element tag.
    pub is_empty: bool,
}

/// Receives structural events from the serializer in document order.
///
/// Every start tag is followed, after the element's content, by an end tag
/// with the same name. Values arrive unescaped.
pub trait Writer {
    fn write_start_tag(&mut self, tag: &StartTag) -> Result<(), Error>;
    fn write_end_tag(&mut self, name: &str) -> Result<(), Error>;
    fn write_text(&mut self, text: &str) -> Result<(), Error>;
    fn write_comment(&mut self, text: &str) -> Result<(), Error>;
    fn write_processing_instruction(
        &mut self,
        target: &str,
        data: Option<&str>,
    ) -> Result<(), Error>;
    fn write_doctype(&mut self, value: &str) -> Result<(), Error>;
    /// Pre-serialized XML, to be written unchanged.
    fn write_raw(&mut self, data: &str) -> Result<(), Error>;
}

/// A [`Writer`] producing XML text on an [`io::Write`] sink.
pub struct XmlWriter<W: io::Write> {
    w: W,
    options: WriterOptions,
    /// A start tag is waiting for `>` or `/>`; the flag is its `is_empty`.
    open_start: Option<bool>,
    started: bool,
}

impl<W: io::Write> XmlWriter<W> {
    pub fn new(w: W) -> Self {
        Self::with_options(w, WriterOptions::default())
    }

    pub fn with_options(w: W, options: WriterOptions) -> Self {
        XmlWriter {
            w,
            options,
            open_start: None,
            started: false,
        }
    }

    /// Close a pending start tag and return the sink.
    pub fn finish(mut self) -> Result<W, Error> {
        self.before_event()?;
        self.close_start_tag()?;
        Ok(self.w)
    }

    fn before_event(&mut self) -> Result<(), Error> {
        if !self.started {
            self.started = true;
            if self.options.xml_declaration {
                self.w
                    .write_all(b"<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
            }
        }
        Ok(())
    }

    fn close_start_tag(&mut self) -> Result<(), Error> {
        if self.open_start.take().is_some() {
            self.w.write_all(b">")?;
        }
        Ok(())
    }

    fn content(&mut self) -> Result<(), Error> {
        self.before_event()?;
        self.close_start_tag()
    }
}

impl<W: io::Write> Writer for XmlWriter<W> {
    fn write_start_tag(&mut self, tag: &StartTag) -> Result<(), Error> {
        self.content()?;
        write!(self.w, "<{}", tag.name)?;
        for (prefix, uri) in &tag.namespaces {
            let uri = serialize_attribute((*uri).into());
            if prefix.is_empty() {
                write!(self.w, " xmlns=\"{}\"", uri)?;
            } else {
                write!(self.w, " xmlns:{}=\"{}\"", prefix, uri)?;
            }
        }
        for (name, value) in &tag.attributes {
            write!(
                self.w,
                " {}=\"{}\"",
                name,
                serialize_attribute((*value).into())
            )?;
        }
        self.open_start = Some(tag.is_empty);
        Ok(())
    }

    fn write_end_tag(&mut self, name: &str) -> Result<(), Error> {
        self.before_event()?;
        match self.open_start.take() {
            Some(is_empty) if is_empty || self.options.collapse_empty_elements => {
                self.w.write_all(b"/>")?;
            }
            Some(_) => {
                write!(self.w, "></{}>", name)?;
            }
            None => {
                write!(self.w, "</{}>", name)?;
            }
        }
        Ok(())
    }

    fn write_text(&mut self, text: &str) -> Result<(), Error> {
        self.content()?;
        self.w.write_all(serialize_text(text.into()).as_bytes())?;
        Ok(())
    }

    fn write_comment(&mut self, text: &str) -> Result<(), Error> {
        self.content()?;
        write!(self.w, "<!--{}-->", text)?;
        Ok(())
    }

    fn write_processing_instruction(
        &mut self,
        target: &str,
        data: Option<&str>,
    ) -> Result<(), Error> {
        self.content()?;
        match data {
            Some(data) => write!(self.w, "<?{} {}?>", target, data)?,
            None => write!(self.w, "<?{}?>", target)?,
        }
        Ok(())
    }

    fn write_doctype(&mut self, value: &str) -> Result<(), Error> {
        self.content()?;
        write!(self.w, "<!DOCTYPE {}>", value)?;
        Ok(())
    }

    fn write_raw(&mut self, data: &str) -> Result<(), Error> {
        self.content()?;
        self.w.write_all(data.as_bytes())?;
        Ok(())
    }
}
