//! Streams a converted document out as JSON
//!
//! ```
//! use ck2json::{json::JsonOptions, Ck2Parser};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let options = JsonOptions::new().with_prettyprint(false);
//!
//! // These are the default options
//! assert_eq!(options, JsonOptions::default());
//!
//! let data = b"CK2txt\nversion=\"1.0\"\ndate=1066.9.15\n";
//! let actual = Ck2Parser::new().with_json_options(options).convert_slice(data)?;
//! assert_eq!(actual, br#"{"CK2txt":{"version":"1.0","date":"1066.9.15"}}"#);
//! # Ok(())
//! # }
//! ```
//!
//! Output is written incrementally as containers open and close, so a
//! document never needs to be held in memory to be converted. The
//! [JsonWriter] is exposed for callers that want to drive the output
//! themselves.
//!
//! ```
//! use ck2json::{json::JsonWriter, Scalar};
//!
//! # fn main() -> Result<(), ck2json::Error> {
//! let mut writer = JsonWriter::new(Vec::new());
//! writer.begin_object(None)?;
//! writer.begin_array(Some("flags"))?;
//! writer.write_scalar(None, &Scalar::Symbol("a"))?;
//! writer.write_scalar(None, &Scalar::Float(1.0))?;
//! writer.end_array()?;
//! writer.end_object()?;
//! assert_eq!(writer.into_inner(), br#"{"flags":["a",1.0]}"#);
//! # Ok(())
//! # }
//! ```

use crate::{Date, Error, Scalar};
use serde_json::ser::{CompactFormatter, Formatter, PrettyFormatter};
use std::io::{self, Write};

/// Customizes the JSON output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JsonOptions {
    /// Controls if the JSON should be pretty printed
    pretty: bool,
}

impl JsonOptions {
    /// Creates the structure with default options
    pub fn new() -> Self {
        JsonOptions::default()
    }

    /// Sets if the JSON should be pretty printed or minified
    pub fn with_prettyprint(mut self, pretty: bool) -> JsonOptions {
        self.pretty = pretty;
        self
    }

    /// Returns true if the output is pretty printed
    pub fn pretty(&self) -> bool {
        self.pretty
    }

    /// Calculates the expected JSON output length relative to the input
    /// length. Used to size output buffers up front.
    pub(crate) fn output_len_factor(&self) -> usize {
        if self.pretty {
            3
        } else {
            2
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Object,
    Array,
}

#[derive(Debug)]
struct Level {
    container: Container,
    first: bool,
}

/// Writes JSON one event at a time.
///
/// Every value is written into a slot. Inside an object the slot needs a
/// key, inside an array the key is ignored, and at the top level there is
/// exactly one slot. A missing key inside an object is written as `""`.
#[derive(Debug)]
pub struct JsonWriter<W, F = CompactFormatter> {
    writer: W,
    formatter: F,
    stack: Vec<Level>,
}

impl<W> JsonWriter<W, CompactFormatter>
where
    W: Write,
{
    /// Creates a writer producing minified output
    pub fn new(writer: W) -> Self {
        JsonWriter::with_formatter(writer, CompactFormatter)
    }
}

impl<W> JsonWriter<W, PrettyFormatter<'static>>
where
    W: Write,
{
    /// Creates a writer producing output indented by two spaces
    pub fn pretty(writer: W) -> Self {
        JsonWriter::with_formatter(writer, PrettyFormatter::new())
    }
}

impl<W, F> JsonWriter<W, F>
where
    W: Write,
    F: Formatter,
{
    pub fn with_formatter(writer: W, formatter: F) -> Self {
        JsonWriter {
            writer,
            formatter,
            stack: Vec::new(),
        }
    }

    /// Number of containers currently open
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Get inner writer, keeping ownership
    pub fn inner(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Consumes this writer, returning the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Opens an object in the next slot
    pub fn begin_object(&mut self, key: Option<&str>) -> Result<(), Error> {
        self.begin_slot(key)?;
        self.formatter.begin_object(&mut self.writer)?;
        self.stack.push(Level {
            container: Container::Object,
            first: true,
        });
        Ok(())
    }

    /// Opens an array in the next slot
    pub fn begin_array(&mut self, key: Option<&str>) -> Result<(), Error> {
        self.begin_slot(key)?;
        self.formatter.begin_array(&mut self.writer)?;
        self.stack.push(Level {
            container: Container::Array,
            first: true,
        });
        Ok(())
    }

    /// Closes the innermost object
    pub fn end_object(&mut self) -> Result<(), Error> {
        self.pop(Container::Object)?;
        self.formatter.end_object(&mut self.writer)?;
        self.end_slot()
    }

    /// Closes the innermost array
    pub fn end_array(&mut self) -> Result<(), Error> {
        self.pop(Container::Array)?;
        self.formatter.end_array(&mut self.writer)?;
        self.end_slot()
    }

    /// Writes a scalar into the next slot. Strings and symbols become JSON
    /// strings, dates become `"Y.M.D"` strings, and non-finite floats become
    /// `null`.
    pub fn write_scalar(&mut self, key: Option<&str>, value: &Scalar) -> Result<(), Error> {
        self.begin_slot(key)?;
        match *value {
            Scalar::String(s) | Scalar::Symbol(s) => self.write_str(s)?,
            Scalar::Date(date) => self.write_date(date)?,
            Scalar::Float(x) if x.is_finite() => self.formatter.write_f64(&mut self.writer, x)?,
            Scalar::Float(_) => self.formatter.write_null(&mut self.writer)?,
            Scalar::Bool(x) => self.formatter.write_bool(&mut self.writer, x)?,
            Scalar::Int(x) => self.formatter.write_i64(&mut self.writer, x)?,
        }
        self.end_slot()
    }

    /// Flushes the underlying writer
    pub fn flush(&mut self) -> Result<(), Error> {
        self.writer.flush()?;
        Ok(())
    }

    fn write_str(&mut self, data: &str) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, data).map_err(io::Error::from)
    }

    #[cfg(feature = "faster_writer")]
    fn write_date(&mut self, date: Date) -> io::Result<()> {
        let mut buf = itoa::Buffer::new();
        self.writer.write_all(b"\"")?;
        self.writer.write_all(buf.format(date.year()).as_bytes())?;
        self.writer.write_all(b".")?;
        self.writer.write_all(buf.format(date.month()).as_bytes())?;
        self.writer.write_all(b".")?;
        self.writer.write_all(buf.format(date.day()).as_bytes())?;
        self.writer.write_all(b"\"")
    }

    #[cfg(not(feature = "faster_writer"))]
    fn write_date(&mut self, date: Date) -> io::Result<()> {
        write!(self.writer, "\"{}\"", date)
    }

    fn begin_slot(&mut self, key: Option<&str>) -> io::Result<()> {
        let Some(level) = self.stack.last_mut() else {
            return Ok(());
        };

        let first = std::mem::replace(&mut level.first, false);
        match level.container {
            Container::Object => {
                self.formatter.begin_object_key(&mut self.writer, first)?;
                serde_json::to_writer(&mut self.writer, key.unwrap_or_default())
                    .map_err(io::Error::from)?;
                self.formatter.end_object_key(&mut self.writer)?;
                self.formatter.begin_object_value(&mut self.writer)
            }
            Container::Array => self.formatter.begin_array_value(&mut self.writer, first),
        }
    }

    fn end_slot(&mut self) -> Result<(), Error> {
        match self.stack.last().map(|x| x.container) {
            Some(Container::Object) => self.formatter.end_object_value(&mut self.writer)?,
            Some(Container::Array) => self.formatter.end_array_value(&mut self.writer)?,
            None => {}
        }
        Ok(())
    }

    fn pop(&mut self, expected: Container) -> Result<(), Error> {
        match self.stack.pop() {
            Some(level) if level.container == expected => Ok(()),
            _ => Err(Error::from(io::Error::new(
                io::ErrorKind::InvalidInput,
                "json container closed out of order",
            ))),
        }
    }
}
