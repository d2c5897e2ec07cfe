use xmlparser::{ElementEnd, Token, Tokenizer};

use crate::entity::parse_entities;
use crate::error::Error;
use crate::token::{RawAttribute, StartElement, TokenSource, XmlToken};

/// A [`TokenSource`] over a string, backed by `xmlparser`.
///
/// It reports one token per start tag (with its attributes and
/// declarations), checks that close tags match, resolves entities,
/// reports CDATA sections as text and skips the XML declaration.
pub struct XmlReader<'a> {
    xml: &'a str,
    tokenizer: Tokenizer<'a>,
    open_names: Vec<(&'a str, &'a str)>,
    start: Option<StartElement>,
    start_name: (&'a str, &'a str),
    pending_end: bool,
    doctype_start: Option<usize>,
    done: bool,
}

impl<'a> XmlReader<'a> {
    pub fn new(xml: &'a str) -> Self {
        XmlReader {
            xml,
            tokenizer: Tokenizer::from(xml),
            open_names: Vec::new(),
            start: None,
            start_name: ("", ""),
            pending_end: false,
            doctype_start: None,
            done: false,
        }
    }

    fn take_start(&mut self) -> Result<StartElement, Error> {
        self.start.take().ok_or(Error::UnbalancedEndTag)
    }
}

fn qualified(prefix: &str, local: &str) -> String {
    if prefix.is_empty() {
        local.to_string()
    } else {
        format!("{}:{}", prefix, local)
    }
}

/// The part of a raw `<!DOCTYPE ...>` between the keyword and the final `>`.
fn doctype_value(raw: &str) -> String {
    let inner = raw.strip_prefix("<!DOCTYPE").unwrap_or(raw);
    let inner = inner.strip_suffix('>').unwrap_or(inner);
    inner.trim().to_string()
}

impl<'a> TokenSource for XmlReader<'a> {
    fn next_token(&mut self) -> Result<XmlToken, Error> {
        if self.pending_end {
            self.pending_end = false;
            return Ok(XmlToken::EndElement);
        }
        if self.done {
            return Ok(XmlToken::EndOfInput);
        }
        loop {
            let Some(token) = self.tokenizer.next() else {
                if !self.open_names.is_empty() {
                    return Err(Error::UnexpectedEndOfInput);
                }
                self.done = true;
                return Ok(XmlToken::EndOfInput);
            };
            match token? {
                Token::Declaration { .. } | Token::EntityDeclaration { .. } => {}
                Token::ProcessingInstruction {
                    target, content, ..
                } => {
                    return Ok(XmlToken::ProcessingInstruction {
                        target: target.as_str().to_string(),
                        data: content
                            .map(|c| c.as_str().to_string())
                            .filter(|c| !c.is_empty()),
                    });
                }
                Token::Comment { text, .. } => {
                    return Ok(XmlToken::Comment(text.as_str().to_string()));
                }
                Token::DtdStart { span, .. } => {
                    self.doctype_start = Some(span.start());
                }
                Token::DtdEnd { span } => {
                    let start = self.doctype_start.take().unwrap_or(span.start());
                    return Ok(XmlToken::Doctype(doctype_value(
                        &self.xml[start..span.end()],
                    )));
                }
                Token::EmptyDtd { span, .. } => {
                    return Ok(XmlToken::Doctype(doctype_value(span.as_str())));
                }
                Token::ElementStart { prefix, local, .. } => {
                    self.start = Some(StartElement::new(prefix.as_str(), local.as_str()));
                    self.start_name = (prefix.as_str(), local.as_str());
                }
                Token::Attribute {
                    prefix,
                    local,
                    value,
                    ..
                } => {
                    let value = parse_entities(value.as_str().into())?.into_owned();
                    let Some(start) = self.start.as_mut() else {
                        continue;
                    };
                    match (prefix.as_str(), local.as_str()) {
                        ("xmlns", prefix) => start.namespaces.push((prefix.to_string(), value)),
                        ("", "xmlns") => start.namespaces.push((String::new(), value)),
                        (prefix, local) => start.attributes.push(RawAttribute {
                            prefix: prefix.to_string(),
                            local_name: local.to_string(),
                            value,
                        }),
                    }
                }
                Token::ElementEnd { end, .. } => match end {
                    ElementEnd::Open => {
                        let start = self.take_start()?;
                        self.open_names.push(self.start_name);
                        return Ok(XmlToken::StartElement(start));
                    }
                    ElementEnd::Empty => {
                        let mut start = self.take_start()?;
                        start.is_empty = true;
                        self.pending_end = true;
                        return Ok(XmlToken::StartElement(start));
                    }
                    ElementEnd::Close(prefix, local) => {
                        let (open_prefix, open_local) =
                            self.open_names.pop().ok_or(Error::UnbalancedEndTag)?;
                        if open_prefix != prefix.as_str() || open_local != local.as_str() {
                            return Err(Error::InvalidCloseTag {
                                expected: qualified(open_prefix, open_local),
                                found: qualified(prefix.as_str(), local.as_str()),
                            });
                        }
                        return Ok(XmlToken::EndElement);
                    }
                },
                Token::Text { text } => {
                    let text = parse_entities(text.as_str().into())?;
                    return Ok(XmlToken::Text(text.into_owned()));
                }
                Token::Cdata { text, .. } => {
                    return Ok(XmlToken::Text(text.as_str().to_string()));
                }
            }
        }
    }
}
