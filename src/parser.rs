use crate::builder::{DocumentBuilder, CK2_HEADER};
use crate::json::{JsonOptions, JsonWriter};
use crate::{
    ByteSource, ByteSourceBuilder, Encoding, Error, Token, Tokenizer, TokenizerOptions,
    Windows1252Encoding,
};
use serde_json::ser::Formatter;
use std::io::{Read, Write};
use tracing::debug;

/// Converts CK2txt data to JSON.
///
/// Bytes flow from a [ByteSource] through a [Tokenizer] into a
/// [DocumentBuilder] that writes JSON as it goes. By default tokens are
/// handed to the builder as soon as they are read, so memory use is bounded
/// by the byte source's read-ahead and the longest token.
///
/// ```
/// use ck2json::{json::JsonOptions, Ck2Parser};
///
/// # fn main() -> Result<(), ck2json::Error> {
/// let data = b"CK2txt\n\tplayer={\n\t\tid=1\n\t\ttype=0\n\t}\n";
/// let parser = Ck2Parser::new().with_json_options(JsonOptions::new().with_prettyprint(false));
/// let out = parser.convert_slice(&data[..])?;
/// assert_eq!(out, br#"{"CK2txt":{"player":{"id":1,"type":0}}}"#);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Ck2Parser<E = Windows1252Encoding> {
    header: String,
    source: ByteSourceBuilder,
    tokenizer: TokenizerOptions,
    json: JsonOptions,
    materialize: bool,
    encoding: E,
}

impl Default for Ck2Parser<Windows1252Encoding> {
    fn default() -> Self {
        Ck2Parser {
            header: String::from(CK2_HEADER),
            source: ByteSourceBuilder::default(),
            tokenizer: TokenizerOptions::default(),
            json: JsonOptions::default(),
            materialize: false,
            encoding: Windows1252Encoding::new(),
        }
    }
}

impl Ck2Parser<Windows1252Encoding> {
    /// Creates a parser with default options
    pub fn new() -> Self {
        Ck2Parser::default()
    }
}

impl<E> Ck2Parser<E>
where
    E: Encoding,
{
    /// Sets the literal the first token must equal
    pub fn with_header(mut self, header: &str) -> Self {
        self.header = header.to_string();
        self
    }

    /// Sets how bytes are read ahead from the input
    pub fn with_source(mut self, source: ByteSourceBuilder) -> Self {
        self.source = source;
        self
    }

    pub fn with_tokenizer_options(mut self, options: TokenizerOptions) -> Self {
        self.tokenizer = options;
        self
    }

    pub fn with_json_options(mut self, options: JsonOptions) -> Self {
        self.json = options;
        self
    }

    /// Sets if every token is read before the document is built instead of
    /// building as tokens arrive. The output is the same either way.
    pub fn materialize_tokens(mut self, materialize: bool) -> Self {
        self.materialize = materialize;
        self
    }

    /// Sets how token bytes are decoded
    pub fn with_encoding<E2: Encoding>(self, encoding: E2) -> Ck2Parser<E2> {
        Ck2Parser {
            header: self.header,
            source: self.source,
            tokenizer: self.tokenizer,
            json: self.json,
            materialize: self.materialize,
            encoding,
        }
    }

    /// Converts data read on a background thread, writing JSON to `writer`.
    /// The writer is returned once the document is complete.
    pub fn convert<R, W>(&self, reader: R, writer: W) -> Result<W, Error>
    where
        R: Read + Send + 'static,
        W: Write,
    {
        let source = self.source.spawn(reader)?;
        self.run(source, writer)
    }

    /// Converts data read on the caller's thread, writing JSON to `writer`
    pub fn convert_reader<R, W>(&self, reader: R, writer: W) -> Result<W, Error>
    where
        R: Read,
        W: Write,
    {
        let source = self.source.build(reader);
        self.run(source, writer)
    }

    /// Converts an in-memory save to JSON bytes
    pub fn convert_slice(&self, data: &[u8]) -> Result<Vec<u8>, Error> {
        let out = Vec::with_capacity(data.len() * self.json.output_len_factor());
        self.convert_reader(data, out)
    }

    /// Reads every token of the input, comments included when enabled
    ///
    /// ```
    /// use ck2json::{Ck2Parser, Token, TokenKind};
    ///
    /// # fn main() -> Result<(), ck2json::Error> {
    /// let tokens = Ck2Parser::new().tokens(&b"CK2txt\na=b"[..])?;
    /// assert_eq!(tokens[1], Token::new("a", TokenKind::Equal));
    /// # Ok(())
    /// # }
    /// ```
    pub fn tokens<R>(&self, reader: R) -> Result<Vec<Token>, Error>
    where
        R: Read,
    {
        let source = self.source.build(reader);
        Tokenizer::with_options(source, &self.encoding, self.tokenizer).read_all()
    }

    fn run<W>(&self, source: ByteSource, writer: W) -> Result<W, Error>
    where
        W: Write,
    {
        let mut tokenizer = Tokenizer::with_options(source, &self.encoding, self.tokenizer);
        let result = if self.json.pretty() {
            let json = JsonWriter::pretty(writer);
            self.build(&mut tokenizer, DocumentBuilder::with_header(json, &self.header))
        } else {
            let json = JsonWriter::new(writer);
            self.build(&mut tokenizer, DocumentBuilder::with_header(json, &self.header))
        };

        debug!(
            tokens = tokenizer.token_count(),
            bytes = tokenizer.position(),
            ok = result.is_ok(),
            "conversion finished"
        );
        result
    }

    fn build<En, W, F>(
        &self,
        tokenizer: &mut Tokenizer<En>,
        mut builder: DocumentBuilder<W, F>,
    ) -> Result<W, Error>
    where
        En: Encoding,
        W: Write,
        F: Formatter,
    {
        if self.materialize {
            let tokens = tokenizer.read_all()?;
            debug!(tokens = tokens.len(), "materialized token list");
            for token in tokens {
                builder.push(token)?;
            }
        } else {
            while let Some(token) = tokenizer.next()? {
                builder.push(token)?;
            }
        }

        builder.finish()
    }
}
