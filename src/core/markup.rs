/// Inline markup scanning — lazy tokenization of `<...>` tag spans and
/// typed access to tag arguments.

use thiserror::Error;

/// A recoverable markup argument failure. These never abort a reveal:
/// the offending tag is stripped, the error is logged and recorded, and
/// scanning continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkupError {
    #[error("directive `{name}` is missing its argument")]
    MissingArgument { name: String },
    #[error("directive `{name}` has a malformed argument `{value}`")]
    InvalidArgument { name: String, value: String },
    #[error("unknown emotion `{value}`")]
    UnknownEmotion { value: String },
}

/// A complete bracketed span, delimiters included: `<name>` or
/// `<name=value>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag<'a> {
    raw: &'a str,
}

impl<'a> Tag<'a> {
    /// The span exactly as written, including `<` and `>`.
    pub fn raw(&self) -> &'a str {
        self.raw
    }

    fn payload(&self) -> &'a str {
        &self.raw[1..self.raw.len() - 1]
    }

    /// Text between `<` and `=` (keyed form) or `<` and `>` (bare form).
    pub fn name(&self) -> &'a str {
        match self.payload().split_once('=') {
            Some((name, _)) => name,
            None => self.payload(),
        }
    }

    /// Text between `=` and `>`, if the tag has the keyed form.
    pub fn value(&self) -> Option<&'a str> {
        self.payload().split_once('=').map(|(_, value)| value)
    }

    pub fn value_u32(&self) -> Result<u32, MarkupError> {
        let value = self.value().ok_or_else(|| MarkupError::MissingArgument {
            name: self.name().to_string(),
        })?;
        value.parse().map_err(|_| MarkupError::InvalidArgument {
            name: self.name().to_string(),
            value: value.to_string(),
        })
    }

    pub fn value_f64(&self) -> Result<f64, MarkupError> {
        let value = self.value().ok_or_else(|| MarkupError::MissingArgument {
            name: self.name().to_string(),
        })?;
        value.parse().map_err(|_| MarkupError::InvalidArgument {
            name: self.name().to_string(),
            value: value.to_string(),
        })
    }
}

/// One scanned element of a source string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// An ordinary character, revealed with per-character pacing.
    Literal(char),
    /// A complete `<...>` span.
    Tag(Tag<'a>),
}

/// Lazy scanner over a rich-text string. Purely lexical: no nesting and
/// no escaping of `<` or `>` inside tags. A `<` with no closing `>`
/// before end of input degrades the rest of the string to literal
/// characters rather than failing.
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    src: &'a str,
    pos: usize,
    literal_only: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(src: &'a str) -> Tokenizer<'a> {
        Tokenizer {
            src,
            pos: 0,
            literal_only: false,
        }
    }

    /// Byte offset of the first unconsumed character.
    pub fn pos(&self) -> usize {
        self.pos
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let rest = &self.src[self.pos..];
        let c = rest.chars().next()?;

        if c == '<' && !self.literal_only {
            match rest.find('>') {
                Some(end) => {
                    self.pos += end + 1;
                    return Some(Token::Tag(Tag {
                        raw: &rest[..=end],
                    }));
                }
                // Unterminated tag: everything from here on is literal.
                None => self.literal_only = true,
            }
        }

        self.pos += c.len_utf8();
        Some(Token::Literal(c))
    }
}
