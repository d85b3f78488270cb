//! Inline notation parser
//!
//! Turns one cell's text back into an untyped tree. Typing happens later in
//! the converter, which walks the tree alongside a [`TargetType`].
//!
//! [`TargetType`]: crate::model::TargetType

use crate::error::{CsvError, Result};

/// Untyped inline tree
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Null,
    /// A leaf; `quoted` records whether it was written in double quotes
    Text { text: String, quoted: bool },
    Map(Vec<(String, Inline)>),
    Seq(Vec<Inline>),
}

impl Inline {
    /// Short description used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Inline::Null => "null",
            Inline::Text { .. } => "text",
            Inline::Map(_) => "map",
            Inline::Seq(_) => "sequence",
        }
    }
}

/// Parse a whole cell. The bare null marker becomes [`Inline::Null`];
/// top-level bare text is taken verbatim.
pub fn parse_inline(input: &str, null_marker: &str) -> Result<Inline> {
    let mut parser = InlineParser {
        input,
        pos: 0,
        null_marker,
    };
    let value = parser.parse_value(&[])?;
    if parser.pos < input.len() {
        return Err(parser.error("unexpected trailing characters"));
    }
    Ok(value)
}

/// Whether text looks like a structure or quoted leaf rather than bare text
pub fn is_structured(text: &str) -> bool {
    matches!(text.as_bytes().first(), Some(b'{' | b'[' | b'"'))
}

struct InlineParser<'a> {
    input: &'a str,
    /// Byte offset; delimiters are ASCII so slicing at them is always valid
    pos: usize,
    null_marker: &'a str,
}

impl<'a> InlineParser<'a> {
    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn error(&self, message: impl Into<String>) -> CsvError {
        CsvError::Inline {
            position: self.pos,
            message: message.into(),
        }
    }

    fn expect(&mut self, byte: u8) -> Result<()> {
        match self.peek() {
            Some(b) if b == byte => {
                self.pos += 1;
                Ok(())
            }
            Some(b) => Err(self.error(format!(
                "expected '{}' but found '{}'",
                byte as char, b as char
            ))),
            None => Err(self.error(format!("expected '{}' but found end of input", byte as char))),
        }
    }

    fn parse_value(&mut self, stops: &[u8]) -> Result<Inline> {
        match self.peek() {
            Some(b'{') => self.parse_map(),
            Some(b'[') => self.parse_seq(),
            Some(b'"') => Ok(Inline::Text {
                text: self.parse_quoted()?,
                quoted: true,
            }),
            _ => {
                let text = self.parse_bare(stops);
                if text == self.null_marker {
                    Ok(Inline::Null)
                } else {
                    Ok(Inline::Text {
                        text: text.to_string(),
                        quoted: false,
                    })
                }
            }
        }
    }

    fn parse_bare(&mut self, stops: &[u8]) -> &'a str {
        let input: &'a str = self.input;
        let start = self.pos;
        let rest = &input.as_bytes()[start..];
        let len = rest
            .iter()
            .position(|b| stops.contains(b))
            .unwrap_or(rest.len());
        self.pos += len;
        &input[start..self.pos]
    }

    fn parse_quoted(&mut self) -> Result<String> {
        self.expect(b'"')?;
        let mut out = String::new();
        let mut escaped = false;
        let input: &'a str = self.input;
        let start = self.pos;
        for (offset, c) in input[start..].char_indices() {
            if escaped {
                out.push(c);
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                self.pos = start + offset + 1;
                return Ok(out);
            } else {
                out.push(c);
            }
        }
        self.pos = self.input.len();
        Err(self.error("unterminated quoted value"))
    }

    fn parse_key(&mut self) -> Result<String> {
        if self.peek() == Some(b'"') {
            self.parse_quoted()
        } else {
            Ok(self.parse_bare(b":;}").to_string())
        }
    }

    fn parse_map(&mut self) -> Result<Inline> {
        self.expect(b'{')?;
        let mut entries = Vec::new();
        if self.peek() == Some(b'}') {
            self.pos += 1;
            return Ok(Inline::Map(entries));
        }
        loop {
            let key = self.parse_key()?;
            self.expect(b':')?;
            let value = self.parse_value(b";}")?;
            entries.push((key, value));
            match self.peek() {
                Some(b';') => self.pos += 1,
                Some(b'}') => {
                    self.pos += 1;
                    return Ok(Inline::Map(entries));
                }
                Some(b) => return Err(self.error(format!("unexpected '{}' in map", b as char))),
                None => return Err(self.error("unterminated map")),
            }
        }
    }

    fn parse_seq(&mut self) -> Result<Inline> {
        self.expect(b'[')?;
        let mut items = Vec::new();
        if self.peek() == Some(b']') {
            self.pos += 1;
            return Ok(Inline::Seq(items));
        }
        loop {
            items.push(self.parse_value(b";]")?);
            match self.peek() {
                Some(b';') => self.pos += 1,
                Some(b']') => {
                    self.pos += 1;
                    return Ok(Inline::Seq(items));
                }
                Some(b) => {
                    return Err(self.error(format!("unexpected '{}' in sequence", b as char)))
                }
                None => return Err(self.error("unterminated sequence")),
            }
        }
    }
}
