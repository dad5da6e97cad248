use std::fmt;
use std::io;

/// An error that can occur when converting CK2txt data
#[derive(Debug)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub(crate) fn new(kind: ErrorKind) -> Error {
        Error(Box::new(kind))
    }

    /// Return the specific type of error
    pub fn kind(&self) -> &ErrorKind {
        &self.0
    }

    /// Consume the error, returning the specific type of error
    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    /// Returns the index of the offending token (if available)
    pub fn token_index(&self) -> Option<usize> {
        self.0.token_index()
    }

    pub(crate) fn unrecognized(token: &str) -> Error {
        Error::new(ErrorKind::UnrecognizedToken {
            token: token.to_string(),
            index: None,
        })
    }

    /// Attaches the index of the token being converted to a classification
    /// failure
    pub(crate) fn at_token(mut self, at: usize) -> Error {
        if let ErrorKind::UnrecognizedToken { ref mut index, .. } = *self.0 {
            *index = Some(at);
        }
        self
    }

    pub(crate) fn unexpected(token: &str, index: usize, msg: &'static str) -> Error {
        Error::new(ErrorKind::UnexpectedToken {
            token: token.to_string(),
            index,
            msg,
        })
    }

    pub(crate) fn unbalanced(depth: usize, index: usize) -> Error {
        Error::new(ErrorKind::UnbalancedGroups { depth, index })
    }
}

/// Specific type of error
#[derive(Debug)]
pub enum ErrorKind {
    /// Reading from the underlying stream (or writing the output) failed
    Io(io::Error),

    /// The scalar classifier exhausted its grammar
    ///
    /// `index` is set when the token came from a converted document
    UnrecognizedToken { token: String, index: Option<usize> },

    /// The first token was not the expected format header
    MalformedHeader { expected: String, found: String },

    /// A token appeared where its kind is not allowed
    UnexpectedToken {
        token: String,
        index: usize,
        msg: &'static str,
    },

    /// Groups were left open at the end of input, or a close had nothing to
    /// close. `depth` is the number of groups still open.
    UnbalancedGroups { depth: usize, index: usize },

    /// The token list ended where another token was required
    Eof,

    /// The converted document could not be read back
    Document(serde_json::Error),
}

impl ErrorKind {
    pub fn token_index(&self) -> Option<usize> {
        match *self {
            ErrorKind::UnrecognizedToken { index, .. } => index,
            ErrorKind::UnexpectedToken { index, .. } => Some(index),
            ErrorKind::UnbalancedGroups { index, .. } => Some(index),
            _ => None,
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self.0 {
            ErrorKind::Io(ref err) => Some(err),
            ErrorKind::Document(ref err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self.0 {
            ErrorKind::Io(ref err) => write!(f, "io error: {}", err),
            ErrorKind::UnrecognizedToken {
                ref token,
                index: None,
            } => write!(f, "unrecognized token: {:?}", token),
            ErrorKind::UnrecognizedToken {
                ref token,
                index: Some(index),
            } => write!(f, "unrecognized token: {:?} (index: {})", token, index),
            ErrorKind::MalformedHeader {
                ref expected,
                ref found,
            } => write!(f, "expected header {:?} but found {:?}", expected, found),
            ErrorKind::UnexpectedToken {
                ref token,
                index,
                msg,
            } => write!(f, "{} (token: {:?}, index: {})", msg, token, index),
            ErrorKind::UnbalancedGroups { depth, index } => write!(
                f,
                "unbalanced groups: {} left open (token index: {})",
                depth, index
            ),
            ErrorKind::Eof => write!(f, "unexpected end of tokens"),
            ErrorKind::Document(ref err) => write!(f, "document error: {}", err),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::new(ErrorKind::Document(error))
    }
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        Error::new(ErrorKind::Io(error))
    }
}
