use std::borrow::Cow;

use crate::error::Error;

/// Resolve predefined entities and character references.
///
/// Returns the input unchanged when it contains no `&`.
pub(crate) fn parse_entities(content: Cow<'_, str>) -> Result<Cow<'_, str>, Error> {
    if !content.contains('&') {
        return Ok(content);
    }
    let mut result = String::with_capacity(content.len());
    let mut rest: &str = &content;
    while let Some(start) = rest.find('&') {
        result.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let end = after
            .find(';')
            .ok_or_else(|| Error::UnclosedEntity(after.to_string()))?;
        let entity = &after[..end];
        result.push(resolve_entity(entity)?);
        rest = &after[end + 1..];
    }
    result.push_str(rest);
    Ok(result.into())
}

fn resolve_entity(entity: &str) -> Result<char, Error> {
    let c = match entity {
        "amp" => Some('&'),
        "apos" => Some('\''),
        "gt" => Some('>'),
        "lt" => Some('<'),
        "quot" => Some('"'),
        _ => {
            if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                None
            }
        }
    };
    c.ok_or_else(|| Error::InvalidEntity(entity.to_string()))
}

fn escape<'a>(
    content: Cow<'a, str>,
    needs_escape: impl Fn(char) -> Option<&'static str>,
) -> Cow<'a, str> {
    if !content.chars().any(|c| needs_escape(c).is_some()) {
        return content;
    }
    let mut result = String::with_capacity(content.len() + 8);
    for c in content.chars() {
        match needs_escape(c) {
            Some(escaped) => result.push_str(escaped),
            None => result.push(c),
        }
    }
    result.into()
}

pub(crate) fn serialize_text(content: Cow<'_, str>) -> Cow<'_, str> {
    escape(content, |c| match c {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        _ => None,
    })
}

pub(crate) fn serialize_attribute(content: Cow<'_, str>) -> Cow<'_, str> {
    escape(content, |c| match c {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '"' => Some("&quot;"),
        '\n' => Some("&#10;"),
        '\r' => Some("&#13;"),
        '\t' => Some("&#9;"),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_predefined() {
        assert_eq!(
            parse_entities("&amp;&apos;&gt;&lt;&quot;".into()).unwrap(),
            "&'><\""
        );
    }

    #[test]
    fn test_parse_character_references() {
        assert_eq!(
            parse_entities("a&#65;&#x42;&#X43;".into()).unwrap(),
            "aABC"
        );
    }

    #[test]
    fn test_parse_unknown_entity() {
        let err = parse_entities("&nbsp;".into());
        if let Err(Error::InvalidEntity(entity)) = err {
            assert_eq!(entity, "nbsp");
        } else {
            unreachable!();
        }
    }

    #[test]
    fn test_parse_invalid_code_point() {
        assert!(matches!(
            parse_entities("&#xD800;".into()),
            Err(Error::InvalidEntity(_))
        ));
    }

    #[test]
    fn test_parse_unclosed_entity() {
        let err = parse_entities("A &amp B".into());
        if let Err(Error::UnclosedEntity(entity)) = err {
            assert_eq!(entity, "amp B");
        } else {
            unreachable!();
        }
    }

    #[test]
    fn test_parse_no_entities_borrows() {
        let text = "hello";
        let result = parse_entities(text.into()).unwrap();
        assert!(std::ptr::eq(text, result.as_ref()));
    }

    #[test]
    fn test_serialize_text_keeps_quotes() {
        assert_eq!(serialize_text("a<b & \"c\"".into()), "a&lt;b &amp; \"c\"");
    }

    #[test]
    fn test_serialize_attribute() {
        assert_eq!(
            serialize_attribute("\"x\"\n<&>".into()),
            "&quot;x&quot;&#10;&lt;&amp;&gt;"
        );
    }

    #[test]
    fn test_serialize_no_escapes_borrows() {
        let text = "plain";
        let result = serialize_attribute(text.into());
        assert!(std::ptr::eq(text, result.as_ref()));
    }
}
