use crate::json::{JsonOptions, JsonWriter};
use crate::stack::{Frame, FrameStack};
use crate::{classify, split_list, Error, ErrorKind, Token, TokenKind};
use serde_json::ser::{CompactFormatter, Formatter, PrettyFormatter};
use std::io::Write;
use std::mem;
use tracing::debug;

/// The format header of plaintext CK2 saves
pub const CK2_HEADER: &str = "CK2txt";

/// A token whose meaning depends on the token after it
#[derive(Debug)]
enum Pending {
    /// `key=` waiting to learn if a value or a group follows
    Equal { key: String, index: usize },

    /// `{` waiting to learn if it starts an object or an array
    Open { key: Option<String>, index: usize },
}

/// Turns a token stream into a JSON document, one token at a time.
///
/// The document has the shape `{"<header>":{...}}`. Groups are decided
/// with a single token of lookahead: a group whose first token is a value or
/// its own close is an array, anything else is an object. Legacy lists
/// (`{1 2 3}`) have their whitespace separated elements classified
/// individually.
///
/// ```
/// use ck2json::{builder::DocumentBuilder, json::JsonWriter, Token, TokenKind};
///
/// # fn main() -> Result<(), ck2json::Error> {
/// let mut builder = DocumentBuilder::new(JsonWriter::new(Vec::new()));
/// builder.push(Token::new("CK2txt", TokenKind::Value))?;
/// builder.push(Token::new("version", TokenKind::Equal))?;
/// builder.push(Token::new("\"1.0\"", TokenKind::Value))?;
/// let out = builder.finish()?;
/// assert_eq!(out, br#"{"CK2txt":{"version":"1.0"}}"#);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct DocumentBuilder<W, F = CompactFormatter> {
    writer: JsonWriter<W, F>,
    header: String,
    frames: FrameStack,
    pending: Option<Pending>,

    // text of the last token seen, the key of a following `{`
    previous: String,
    index: usize,
    started: bool,
}

impl<W, F> DocumentBuilder<W, F>
where
    W: Write,
    F: Formatter,
{
    /// Creates a builder expecting the CK2txt header
    pub fn new(writer: JsonWriter<W, F>) -> Self {
        DocumentBuilder::with_header(writer, CK2_HEADER)
    }

    /// Creates a builder expecting a custom header literal
    pub fn with_header(writer: JsonWriter<W, F>, header: &str) -> Self {
        DocumentBuilder {
            writer,
            header: header.to_string(),
            frames: FrameStack::new(),
            pending: None,
            previous: String::new(),
            index: 0,
            started: false,
        }
    }

    /// Number of groups currently open, the header object included
    pub fn depth(&self) -> usize {
        self.frames.depth()
    }

    /// Number of tokens pushed so far, comments excluded
    pub fn token_count(&self) -> usize {
        self.index
    }

    /// Feeds the next token
    pub fn push(&mut self, token: Token) -> Result<(), Error> {
        if token.kind == TokenKind::Comment {
            return Ok(());
        }

        let index = self.index;
        self.index += 1;

        if !self.started {
            return self.start(token);
        }

        match self.pending.take() {
            Some(Pending::Equal { key, index: at }) => match token.kind {
                TokenKind::Value => {
                    match self.frames.last() {
                        Some(Frame::Object) => {}
                        Some(Frame::Array) => {
                            let msg = "key-value pair in array context";
                            return Err(Error::unexpected(&key, at, msg));
                        }
                        None => return Err(Error::unbalanced(0, at)),
                    }

                    let value = classify(&token.text).map_err(|e| e.at_token(index))?;
                    self.writer.write_scalar(Some(&key), &value)?;
                    self.previous = token.text;
                    return Ok(());
                }

                // the group takes the key
                TokenKind::Open => match self.frames.last() {
                    Some(Frame::Array) => {
                        let msg = "key-value pair in array context";
                        return Err(Error::unexpected(&key, at, msg));
                    }
                    _ => self.previous = key,
                },
                _ => self.bare_value(&key, at)?,
            },
            Some(Pending::Open { key, .. }) => {
                let frame = match token.kind {
                    TokenKind::Value | TokenKind::Close => Frame::Array,
                    _ => Frame::Object,
                };
                self.open(frame, key.as_deref())?;
            }
            None => {}
        }

        match token.kind {
            TokenKind::Equal => {
                self.pending = Some(Pending::Equal {
                    key: token.text,
                    index,
                });
                return Ok(());
            }
            TokenKind::Open => {
                let key = match self.frames.last() {
                    Some(Frame::Object) => Some(mem::take(&mut self.previous)),
                    Some(Frame::Array) => {
                        // `2{` in a list: the 2 is an element before the group
                        self.write_list(&token.text, index)?;
                        None
                    }
                    None => return Err(Error::unbalanced(0, index)),
                };
                self.pending = Some(Pending::Open { key, index });
            }
            TokenKind::Close => self.close(&token.text, index)?,
            TokenKind::Value => self.bare_value(&token.text, index)?,
            TokenKind::Comment => {}
        }

        self.previous = token.text;
        Ok(())
    }

    /// Verifies every group was closed and completes the document. The
    /// header object alone may be left open: it is closed implicitly.
    pub fn finish(mut self) -> Result<W, Error> {
        if !self.started {
            return Err(self.malformed_header(""));
        }

        match self.pending.take() {
            Some(Pending::Equal { .. }) => return Err(Error::new(ErrorKind::Eof)),
            Some(Pending::Open { index, .. }) => {
                return Err(Error::unbalanced(self.frames.depth() + 1, index))
            }
            None => {}
        }

        match self.frames.depth() {
            0 => {}
            1 => self.writer.end_object()?,
            depth => return Err(Error::unbalanced(depth, self.index)),
        }

        self.writer.end_object()?;
        self.writer.flush()?;
        debug!(tokens = self.index, "document complete");
        Ok(self.writer.into_inner())
    }

    fn start(&mut self, token: Token) -> Result<(), Error> {
        if token.text != self.header {
            return Err(self.malformed_header(&token.text));
        }

        self.writer.begin_object(None)?;
        self.writer.begin_object(Some(&self.header))?;
        self.frames.push(Frame::Object);
        self.started = true;
        self.previous = token.text;
        Ok(())
    }

    fn open(&mut self, frame: Frame, key: Option<&str>) -> Result<(), Error> {
        match frame {
            Frame::Object => self.writer.begin_object(key)?,
            Frame::Array => self.writer.begin_array(key)?,
        }

        self.frames.push(frame);
        Ok(())
    }

    fn close(&mut self, text: &str, index: usize) -> Result<(), Error> {
        match self.frames.pop() {
            Some(Frame::Object) => self.writer.end_object(),
            Some(Frame::Array) => {
                self.write_list(text, index)?;
                self.writer.end_array()
            }
            None => Err(Error::unbalanced(0, index)),
        }
    }

    fn bare_value(&mut self, text: &str, index: usize) -> Result<(), Error> {
        if is_blank(text) {
            return Ok(());
        }

        match self.frames.last() {
            Some(Frame::Array) => self.write_list(text, index),
            Some(Frame::Object) => Err(Error::unexpected(
                text,
                index,
                "value with no key in object context",
            )),
            None => Err(Error::unbalanced(0, index)),
        }
    }

    fn write_list(&mut self, text: &str, index: usize) -> Result<(), Error> {
        for item in split_list(text) {
            let value = classify(item).map_err(|e| e.at_token(index))?;
            self.writer.write_scalar(None, &value)?;
        }
        Ok(())
    }

    fn malformed_header(&self, found: &str) -> Error {
        Error::new(ErrorKind::MalformedHeader {
            expected: self.header.clone(),
            found: found.to_string(),
        })
    }
}

#[inline]
fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Writes the JSON document for a materialized token list
///
/// ```
/// use ck2json::{builder::tokens_to_json, json::JsonOptions, Token, TokenKind};
///
/// # fn main() -> Result<(), ck2json::Error> {
/// let tokens = vec![
///     Token::new("CK2txt", TokenKind::Value),
///     Token::new("flags", TokenKind::Equal),
///     Token::new("", TokenKind::Open),
///     Token::new("a", TokenKind::Value),
///     Token::new("b", TokenKind::Close),
/// ];
///
/// let mut out = Vec::new();
/// tokens_to_json(tokens, "CK2txt", &mut out, JsonOptions::new())?;
/// assert_eq!(out, br#"{"CK2txt":{"flags":["a","b"]}}"#);
/// # Ok(())
/// # }
/// ```
pub fn tokens_to_json<I, W>(
    tokens: I,
    header: &str,
    writer: W,
    options: JsonOptions,
) -> Result<W, Error>
where
    I: IntoIterator<Item = Token>,
    W: Write,
{
    if options.pretty() {
        let builder = DocumentBuilder::with_header(JsonWriter::pretty(writer), header);
        replay(builder, tokens)
    } else {
        let builder = DocumentBuilder::with_header(JsonWriter::new(writer), header);
        replay(builder, tokens)
    }
}

fn replay<I, W, F>(mut builder: DocumentBuilder<W, F>, tokens: I) -> Result<W, Error>
where
    I: IntoIterator<Item = Token>,
    W: Write,
    F: Formatter,
{
    for token in tokens {
        builder.push(token)?;
    }
    builder.finish()
}

impl<W> DocumentBuilder<W, PrettyFormatter<'static>>
where
    W: Write,
{
    /// Creates a builder expecting the CK2txt header that writes indented
    /// output
    pub fn pretty(writer: W) -> Self {
        DocumentBuilder::new(JsonWriter::pretty(writer))
    }
}
