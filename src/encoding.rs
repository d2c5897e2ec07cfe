use std::borrow::Cow;

use encoding_rs::Encoding;
use xhtmlchardet::detect;

use crate::error::Error;

pub(crate) fn encoding(data: &[u8], hint: Option<String>) -> Option<&'static Encoding> {
    let mut cursor = std::io::Cursor::new(data);
    let charsets = detect(&mut cursor, hint).ok()?;
    // nothing detected, XML defaults to UTF-8
    let label = charsets.first().map(String::as_str).unwrap_or("UTF-8");
    Encoding::for_label(label.as_bytes())
}

/// Decode a byte payload using the encoding its XML declaration or byte
/// order mark announces.
pub(crate) fn decode(data: &[u8]) -> Result<Cow<'_, str>, Error> {
    let encoding = encoding(data, None).unwrap_or(encoding_rs::UTF_8);
    let (text, _, had_errors) = encoding.decode(data);
    if had_errors {
        return Err(Error::Decoding(encoding.name()));
    }
    Ok(text)
}
