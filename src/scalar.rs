use crate::data::is_whitespace;
use crate::util::{fast_digit_parse, le_u64};
use crate::{Date, Error};
use std::fmt;

/// A classified leaf value.
///
/// Strings and symbols borrow from the token text they were classified from.
///
/// ```
/// use ck2json::{classify, Date, Scalar};
///
/// # fn main() -> Result<(), ck2json::Error> {
/// assert_eq!(classify("\"1.0\"")?, Scalar::String("1.0"));
/// assert_eq!(classify("1066.9.15")?, Scalar::Date(Date::from_ymd(1066, 9, 15)));
/// assert_eq!(classify("0.500")?, Scalar::Float(0.5));
/// assert_eq!(classify("yes")?, Scalar::Bool(true));
/// assert_eq!(classify("-12")?, Scalar::Int(-12));
/// assert_eq!(classify("k_france")?, Scalar::Symbol("k_france"));
/// assert!(classify("#").is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar<'a> {
    /// Text that was surrounded by double quotes, without the quotes
    String(&'a str),
    Date(Date),
    Float(f64),
    Bool(bool),
    Int(i64),

    /// A bare identifier-like token
    Symbol(&'a str),
}

impl<'a> Scalar<'a> {
    /// The text of a string or symbol
    pub fn as_str(&self) -> Option<&'a str> {
        match *self {
            Scalar::String(s) | Scalar::Symbol(s) => Some(s),
            _ => None,
        }
    }
}

/// Writes the canonical text form: the form that classifies back to an equal
/// scalar. Floats always carry a decimal point.
impl<'a> fmt::Display for Scalar<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Scalar::String(s) => write!(f, "\"{}\"", s),
            Scalar::Date(d) => write!(f, "{}", d),
            Scalar::Float(x) if x.fract() == 0.0 && x.is_finite() => write!(f, "{}.0", x),
            Scalar::Float(x) => write!(f, "{}", x),
            Scalar::Bool(true) => f.write_str("yes"),
            Scalar::Bool(false) => f.write_str("no"),
            Scalar::Int(x) => write!(f, "{}", x),
            Scalar::Symbol(s) => f.write_str(s),
        }
    }
}

/// Classifies a token's full text. The first grammar that matches wins:
///
/// 1. quoted string: `"..."`, inner text verbatim
/// 2. date: `D+.D+.D+`
/// 3. float: `-?D+.D+`
/// 4. bool: `yes` or `no`
/// 5. int: `-?D+` within 64 bits
/// 6. symbol: `[A-Za-z_-][A-Za-z0-9_.-]*`
///
/// Anything else is an unrecognized token.
pub fn classify(text: &str) -> Result<Scalar<'_>, Error> {
    if let Some(inner) = quoted(text) {
        Ok(Scalar::String(inner))
    } else if let Some(date) = Date::parse(text) {
        Ok(Scalar::Date(date))
    } else if let Some(x) = parse_float(text) {
        Ok(Scalar::Float(x))
    } else if let Some(x) = parse_bool(text) {
        Ok(Scalar::Bool(x))
    } else if let Some(x) = parse_int(text) {
        Ok(Scalar::Int(x))
    } else if is_symbol(text) {
        Ok(Scalar::Symbol(text))
    } else {
        Err(Error::unrecognized(text))
    }
}

#[inline]
fn quoted(text: &str) -> Option<&str> {
    text.strip_prefix('"')?.strip_suffix('"')
}

#[inline]
fn parse_bool(text: &str) -> Option<bool> {
    match text.as_bytes() {
        b"yes" => Some(true),
        b"no" => Some(false),
        _ => None,
    }
}

#[inline]
fn split_sign(d: &[u8]) -> (bool, &[u8]) {
    match d.split_first() {
        Some((b'-', rest)) => (true, rest),
        _ => (false, d),
    }
}

fn parse_float(text: &str) -> Option<f64> {
    let (_, d) = split_sign(text.as_bytes());
    let idx = d.iter().position(|&x| x == b'.')?;
    let (lead, trail) = (&d[..idx], &d[idx + 1..]);
    if lead.is_empty() || trail.is_empty() || !is_digits(lead) || !is_digits(trail) {
        return None;
    }

    text.parse::<f64>().ok()
}

fn parse_int(text: &str) -> Option<i64> {
    let (negative, d) = split_sign(text.as_bytes());
    let val = parse_digits(d)?;
    if !negative {
        i64::try_from(val).ok()
    } else if val <= i64::MAX as u64 + 1 {
        Some((val as i64).wrapping_neg())
    } else {
        None
    }
}

fn is_symbol(text: &str) -> bool {
    match text.as_bytes().split_first() {
        Some((&first, rest)) => {
            (first.is_ascii_alphabetic() || first == b'_' || first == b'-')
                && rest
                    .iter()
                    .all(|&x| x.is_ascii_alphanumeric() || matches!(x, b'_' | b'.' | b'-'))
        }
        None => false,
    }
}

#[inline]
fn is_digits(d: &[u8]) -> bool {
    d.iter().all(|x| x.is_ascii_digit())
}

/// Parses a non-empty run of ascii digits, 8 at a time where possible.
/// Returns `None` on any other byte or on overflow.
pub(crate) fn parse_digits(d: &[u8]) -> Option<u64> {
    if d.is_empty() {
        return None;
    }

    let mut chunks = d.chunks_exact(8);
    let mut result: u64 = 0;
    for chunk in chunks.by_ref() {
        let val = fast_digit_parse(le_u64(chunk))?;
        result = result.checked_mul(100_000_000)?.checked_add(val)?;
    }

    for &x in chunks.remainder() {
        if !x.is_ascii_digit() {
            return None;
        }

        result = result.checked_mul(10)?.checked_add(u64::from(x - b'0'))?;
    }

    Some(result)
}

/// Elements of a legacy whitespace-joined list
///
/// Splits on runs of whitespace that are not inside double quotes.
///
/// ```
/// let items: Vec<_> = ck2json::split_list("  1 2.5 \"a b\"  c").collect();
/// assert_eq!(items, vec!["1", "2.5", "\"a b\"", "c"]);
/// ```
pub fn split_list(text: &str) -> ListItems<'_> {
    ListItems { rest: text }
}

/// Iterator returned by [split_list]
#[derive(Debug, Clone)]
pub struct ListItems<'a> {
    rest: &'a str,
}

impl<'a> Iterator for ListItems<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let d = self.rest.as_bytes();
        let start = d.iter().position(|&x| !is_whitespace(x))?;
        let mut in_quote = false;
        let mut end = d.len();
        for (i, &x) in d.iter().enumerate().skip(start) {
            if x == b'"' {
                in_quote = !in_quote;
            } else if !in_quote && is_whitespace(x) {
                end = i;
                break;
            }
        }

        // whitespace is ascii, so both offsets sit on char boundaries
        let item = &self.rest[start..end];
        self.rest = &self.rest[end..];
        Some(item)
    }
}
