//! IRCv3 message tag escaping and tag-block parsing.

use std::fmt::{Result as FmtResult, Write};

/// A single message tag: name plus optional unescaped value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tag(pub String, pub Option<String>);

/// Escape a tag value for serialization.
///
/// Escapes special characters according to the IRCv3 message-tags spec.
pub fn escape_tag_value(f: &mut dyn Write, value: &str) -> FmtResult {
    for c in value.chars() {
        match c {
            ';' => f.write_str("\\:")?,
            ' ' => f.write_str("\\s")?,
            '\\' => f.write_str("\\\\")?,
            '\r' => f.write_str("\\r")?,
            '\n' => f.write_str("\\n")?,
            c => f.write_char(c)?,
        }
    }
    Ok(())
}

/// Unescape a tag value from wire format.
///
/// Reverses the escaping applied by [`escape_tag_value`]. An unknown
/// escape sequence collapses to nothing, and a lone trailing backslash
/// is dropped.
pub fn unescape_tag_value(value: &str) -> String {
    let mut unescaped = String::with_capacity(value.len());
    let mut iter = value.chars();
    while let Some(c) = iter.next() {
        if c != '\\' {
            unescaped.push(c);
            continue;
        }
        match iter.next() {
            Some(':') => unescaped.push(';'),
            Some('s') => unescaped.push(' '),
            Some('\\') => unescaped.push('\\'),
            Some('r') => unescaped.push('\r'),
            Some('n') => unescaped.push('\n'),
            Some(_) => {}
            None => break,
        }
    }
    unescaped
}

/// Parse a raw tag block (the text between `@` and the first space) into
/// a list of tags with values unescaped.
///
/// Duplicate names keep the last occurrence. No name validation is done.
pub fn parse_tag_block(block: &str) -> Vec<Tag> {
    let mut tags: Vec<Tag> = Vec::new();
    for item in block.split(';') {
        if item.is_empty() {
            continue;
        }
        let (name, value) = match item.find('=') {
            Some(eq) => (&item[..eq], Some(unescape_tag_value(&item[eq + 1..]))),
            None => (item, None),
        };
        if let Some(existing) = tags.iter_mut().find(|t| t.0 == name) {
            existing.1 = value;
        } else {
            tags.push(Tag(name.to_string(), value));
        }
    }
    tags
}

/// Render a tag list back to its wire form (without the leading `@`).
pub fn render_tags(f: &mut dyn Write, tags: &[Tag]) -> FmtResult {
    for (i, Tag(name, value)) in tags.iter().enumerate() {
        if i > 0 {
            f.write_char(';')?;
        }
        f.write_str(name)?;
        if let Some(value) = value {
            f.write_char('=')?;
            escape_tag_value(f, value)?;
        }
    }
    Ok(())
}
