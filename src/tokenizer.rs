use crate::scan::{position_of_any, DelimiterSet};
use crate::{ByteSource, Encoding, Error, Windows1252Encoding};
use tracing::trace;

const DELIMITERS: DelimiterSet = DelimiterSet::new(b"{}=\r\n\t ");
const QUOTE_AWARE: DelimiterSet = DELIMITERS.with(b'"');
const COMMENTS: DelimiterSet = DELIMITERS.with(b'#');
const QUOTE_AWARE_COMMENTS: DelimiterSet = QUOTE_AWARE.with(b'#');
const QUOTE_END: DelimiterSet = DelimiterSet::new(b"\"");
const LINE_END: DelimiterSet = DelimiterSet::new(b"\n");

/// What ended a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Ended by whitespace or by the end of the stream
    Value,

    /// Ended by `=`
    Equal,

    /// Ended by `{`
    Open,

    /// Ended by `}`
    Close,

    /// The rest of a line following `#`
    Comment,
}

/// The text that preceded a delimiter, tagged with the delimiter's kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
}

impl Token {
    pub fn new(text: impl Into<String>, kind: TokenKind) -> Self {
        Token {
            text: text.into(),
            kind,
        }
    }

    /// Returns true if the text holds nothing but whitespace
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Customizes how bytes are split into tokens
///
/// ```
/// use ck2json::TokenizerOptions;
///
/// let options = TokenizerOptions::new()
///     .with_quotes(true)
///     .with_comments(false);
///
/// // These are the default options
/// assert_eq!(options, TokenizerOptions::default());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenizerOptions {
    quotes: bool,
    comments: bool,
}

impl Default for TokenizerOptions {
    fn default() -> Self {
        TokenizerOptions {
            quotes: true,
            comments: false,
        }
    }
}

impl TokenizerOptions {
    /// Creates the structure with default options
    pub fn new() -> Self {
        TokenizerOptions::default()
    }

    /// Sets if delimiters between a pair of double quotes belong to the token
    pub fn with_quotes(mut self, quotes: bool) -> TokenizerOptions {
        self.quotes = quotes;
        self
    }

    /// Sets if `#` starts a comment running to the end of the line
    pub fn with_comments(mut self, comments: bool) -> TokenizerOptions {
        self.comments = comments;
        self
    }

    fn delimiters(&self) -> &'static DelimiterSet {
        match (self.quotes, self.comments) {
            (false, false) => &DELIMITERS,
            (true, false) => &QUOTE_AWARE,
            (false, true) => &COMMENTS,
            (true, true) => &QUOTE_AWARE_COMMENTS,
        }
    }
}

/// Splits a byte stream into delimiter-terminated tokens.
///
/// A token is the text between two delimiters (`{`, `}`, `=`, and
/// whitespace) and takes its kind from the delimiter that ends it. Empty
/// text ended by whitespace is skipped, while empty text ended by a
/// structural delimiter still produces a token. Whatever remains when the
/// stream ends is yielded as a final `Value` token, possibly empty.
///
/// ```
/// use ck2json::{ByteSource, Token, TokenKind, Tokenizer};
///
/// # fn main() -> Result<(), ck2json::Error> {
/// let source = ByteSource::builder().build(&b"a={1 2}"[..]);
/// let tokens = Tokenizer::new(source).read_all()?;
/// assert_eq!(
///     tokens,
///     vec![
///         Token::new("a", TokenKind::Equal),
///         Token::new("", TokenKind::Open),
///         Token::new("1", TokenKind::Value),
///         Token::new("2", TokenKind::Close),
///         Token::new("", TokenKind::Value),
///     ]
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Tokenizer<'r, E = Windows1252Encoding> {
    source: ByteSource<'r>,
    encoding: E,
    options: TokenizerOptions,

    // bytes at the front of the window already searched without a match
    scanned: usize,

    // whether `scanned` sits inside an open quote
    quoted: bool,
    in_comment: bool,
    finished: bool,
    emitted: usize,
}

impl<'r> Tokenizer<'r, Windows1252Encoding> {
    /// Creates a windows-1252 tokenizer with default options
    pub fn new(source: ByteSource<'r>) -> Self {
        Tokenizer::with_options(source, Windows1252Encoding::new(), TokenizerOptions::default())
    }
}

impl<'r, E> Tokenizer<'r, E>
where
    E: Encoding,
{
    pub fn with_options(source: ByteSource<'r>, encoding: E, options: TokenizerOptions) -> Self {
        Tokenizer {
            source,
            encoding,
            options,
            scanned: 0,
            quoted: false,
            in_comment: false,
            finished: false,
            emitted: 0,
        }
    }

    /// Number of tokens yielded so far
    pub fn token_count(&self) -> usize {
        self.emitted
    }

    /// Absolute stream offset of the start of the pending token
    pub fn position(&self) -> usize {
        self.source.position()
    }

    /// Reads the next token. Returns `Ok(None)` once the final token has been
    /// yielded.
    pub fn next(&mut self) -> Result<Option<Token>, Error> {
        loop {
            if self.finished {
                return Ok(None);
            }

            if let Some((at, byte)) = self.find_delimiter() {
                let mut text = self.encoding.decode_segments(self.source.window(), at);
                self.advance(at + 1);

                if self.in_comment {
                    self.in_comment = false;
                    strip_carriage_return(&mut text);
                    return Ok(Some(self.emit(text, TokenKind::Comment)));
                }

                let kind = match byte {
                    b'{' => TokenKind::Open,
                    b'}' => TokenKind::Close,
                    b'=' => TokenKind::Equal,
                    b'#' => {
                        self.in_comment = true;
                        if text.is_empty() {
                            continue;
                        }
                        TokenKind::Value
                    }
                    _ => TokenKind::Value,
                };

                if text.is_empty() && byte <= b' ' {
                    continue;
                }

                return Ok(Some(self.emit(text, kind)));
            }

            let more = match self.source.fill() {
                Ok(x) => x,
                Err(e) => {
                    self.finished = true;
                    return Err(e);
                }
            };

            if !more {
                let window = self.source.window();
                let len = window.len();
                let mut text = self.encoding.decode_segments(window, len);
                self.source.consume(len);
                self.finished = true;

                let kind = if self.in_comment {
                    strip_carriage_return(&mut text);
                    TokenKind::Comment
                } else {
                    TokenKind::Value
                };

                return Ok(Some(self.emit(text, kind)));
            }
        }
    }

    /// Reads every remaining token
    pub fn read_all(&mut self) -> Result<Vec<Token>, Error> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    /// Searches the unscanned part of the window. On a miss the scan state is
    /// saved so the next search resumes where this one stopped.
    fn find_delimiter(&mut self) -> Option<(usize, u8)> {
        let window = self.source.window();
        loop {
            let set = if self.in_comment {
                &LINE_END
            } else if self.quoted {
                &QUOTE_END
            } else {
                self.options.delimiters()
            };

            let view = window.skip(self.scanned);
            match position_of_any(view, set) {
                Some(pos) => {
                    let at = self.scanned + pos.absolute;
                    if pos.byte == b'"' && !self.in_comment {
                        self.quoted = !self.quoted;
                        self.scanned = at + 1;
                    } else {
                        return Some((at, pos.byte));
                    }
                }
                None => {
                    self.scanned = window.len();
                    return None;
                }
            }
        }
    }

    fn advance(&mut self, amt: usize) {
        self.source.consume(amt);
        self.scanned = 0;
        self.quoted = false;
    }

    fn emit(&mut self, text: String, kind: TokenKind) -> Token {
        trace!(index = self.emitted, ?kind, text = %text, "token");
        self.emitted += 1;
        Token { text, kind }
    }
}

fn strip_carriage_return(text: &mut String) {
    if text.ends_with('\r') {
        text.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Utf8Encoding;
    use rstest::*;
    use std::io::{self, Read};

    fn tokenize(data: &[u8]) -> Vec<Token> {
        tokenize_with(data, TokenizerOptions::default())
    }

    fn tokenize_with(data: &[u8], options: TokenizerOptions) -> Vec<Token> {
        let source = ByteSource::builder().build(data);
        Tokenizer::with_options(source, Windows1252Encoding::new(), options)
            .read_all()
            .unwrap()
    }

    fn t(text: &str, kind: TokenKind) -> Token {
        Token::new(text, kind)
    }

    /// Hands out the data split at fixed cut points, one piece per read
    struct Pieces {
        data: Vec<u8>,
        cuts: Vec<usize>,
        pos: usize,
    }

    impl Pieces {
        fn new(data: &[u8], cuts: &[usize]) -> Self {
            Pieces {
                data: data.to_vec(),
                cuts: cuts.to_vec(),
                pos: 0,
            }
        }
    }

    impl Read for Pieces {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let next = self
                .cuts
                .iter()
                .copied()
                .find(|&x| x > self.pos)
                .unwrap_or(self.data.len());
            let end = next.min(self.pos + buf.len());
            let len = end - self.pos;
            buf[..len].copy_from_slice(&self.data[self.pos..end]);
            self.pos = end;
            Ok(len)
        }
    }

    #[rstest]
    #[case(b"", &[t("", TokenKind::Value)])]
    #[case(b"CK2txt\n", &[t("CK2txt", TokenKind::Value), t("", TokenKind::Value)])]
    #[case(b"a=b", &[t("a", TokenKind::Equal), t("b", TokenKind::Value)])]
    #[case(b"a = b ", &[
        t("a", TokenKind::Value),
        t("", TokenKind::Equal),
        t("b", TokenKind::Value),
        t("", TokenKind::Value),
    ])]
    #[case(b"x={}", &[
        t("x", TokenKind::Equal),
        t("", TokenKind::Open),
        t("", TokenKind::Close),
        t("", TokenKind::Value),
    ])]
    #[case(b"\r\n\t  ", &[t("", TokenKind::Value)])]
    fn test_tokens(#[case] input: &[u8], #[case] expected: &[Token]) {
        assert_eq!(tokenize(input), expected);
    }

    #[test]
    fn quoted_text_keeps_delimiters() {
        let tokens = tokenize(b"name=\"Duke {of} = Saxony\"\n");
        assert_eq!(
            tokens,
            vec![
                t("name", TokenKind::Equal),
                t("\"Duke {of} = Saxony\"", TokenKind::Value),
                t("", TokenKind::Value),
            ]
        );
    }

    #[test]
    fn quotes_can_be_disabled() {
        let options = TokenizerOptions::new().with_quotes(false);
        let tokens = tokenize_with(b"n=\"a b\"", options);
        assert_eq!(
            tokens,
            vec![
                t("n", TokenKind::Equal),
                t("\"a", TokenKind::Value),
                t("b\"", TokenKind::Value),
            ]
        );
    }

    #[test]
    fn unterminated_quote_is_flushed() {
        let tokens = tokenize(b"a=\"open {");
        assert_eq!(
            tokens,
            vec![t("a", TokenKind::Equal), t("\"open {", TokenKind::Value)]
        );
    }

    #[test]
    fn comments_are_tokens_when_enabled() {
        let options = TokenizerOptions::new().with_comments(true);
        let tokens = tokenize_with(b"a=1#note = {\r\nb=2 # tail", options);
        assert_eq!(
            tokens,
            vec![
                t("a", TokenKind::Equal),
                t("1", TokenKind::Value),
                t("note = {", TokenKind::Comment),
                t("b", TokenKind::Equal),
                t("2", TokenKind::Value),
                t(" tail", TokenKind::Comment),
            ]
        );
    }

    #[test]
    fn hash_is_text_without_comments() {
        let tokens = tokenize(b"a=#b");
        assert_eq!(tokens, vec![t("a", TokenKind::Equal), t("#b", TokenKind::Value)]);
    }

    #[test]
    fn windows1252_text_is_decoded() {
        let tokens = tokenize(b"name=\"\xdcberlingen\"");
        assert_eq!(tokens[1].text, "\"Überlingen\"");
    }

    #[test]
    fn utf8_encoding_can_be_swapped_in() {
        let source = ByteSource::builder().chunk_len(3).build("n=Jåhkåmåhkke".as_bytes());
        let mut tokenizer =
            Tokenizer::with_options(source, Utf8Encoding::new(), TokenizerOptions::default());
        let tokens = tokenizer.read_all().unwrap();
        assert_eq!(tokens[1], t("Jåhkåmåhkke", TokenKind::Value));
    }

    #[test]
    fn read_errors_are_returned() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::Other, "boom"))
            }
        }

        let mut tokenizer = Tokenizer::new(ByteSource::builder().build(Broken));
        assert!(tokenizer.next().is_err());
        assert_eq!(tokenizer.next().unwrap(), None);
    }

    #[test]
    fn counts_tokens() {
        let mut tokenizer = Tokenizer::new(ByteSource::builder().build(&b"a=b c"[..]));
        tokenizer.read_all().unwrap();
        assert_eq!(tokenizer.token_count(), 3);
        assert_eq!(tokenizer.position(), 5);
    }

    const SAMPLE: &[u8] = b"CK2txt\nversion=\"1.0\"\ndate=1066.9.15\nflags={a b c}\nplayer=\n{\n\tid=1\n\ttype=0\n}\nname=\"Duke Heinrich\"\n}\n";

    #[test]
    fn every_split_point_inline() {
        let expected = tokenize(SAMPLE);
        for cut in 0..=SAMPLE.len() {
            let source = ByteSource::builder().build(Pieces::new(SAMPLE, &[cut]));
            let actual = Tokenizer::new(source).read_all().unwrap();
            assert_eq!(actual, expected, "split at {}", cut);
        }
    }

    #[test]
    fn every_split_point_threaded() {
        let expected = tokenize(SAMPLE);
        for cut in 0..=SAMPLE.len() {
            let source = ByteSource::builder()
                .chunk_len(4)
                .high_watermark(8)
                .spawn(Pieces::new(SAMPLE, &[cut]))
                .unwrap();
            let actual = Tokenizer::new(source).read_all().unwrap();
            assert_eq!(actual, expected, "split at {}", cut);
        }
    }

    #[rstest]
    fn tiny_chunks(#[values(1, 2, 3, 5, 7)] chunk_len: usize) {
        let expected = tokenize(SAMPLE);
        let source = ByteSource::builder().chunk_len(chunk_len).build(SAMPLE);
        let actual = Tokenizer::new(source).read_all().unwrap();
        assert_eq!(actual, expected);
    }
}
