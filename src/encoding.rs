use crate::{data::WINDOWS_1252, scan::Segments, util::is_ascii};
use std::borrow::Cow;

/// An encoding for interpreting byte data as UTF-8 text
///
/// Token text is decoded verbatim: no trimming and no escape processing.
///
/// It is heavily encouraged that encoding implementations are marked
/// as `Copy` as the tokenizer decodes every token through them.
pub trait Encoding {
    /// Decodes bytes into a utf-8 compatible string -- allocating if necessary
    fn decode<'a>(&self, data: &'a [u8]) -> Cow<'a, str>;

    /// Decodes the first `len` bytes of a segmented view into one string.
    ///
    /// The default implementation joins the segments before decoding so that
    /// multi-byte sequences split across segments survive.
    fn decode_segments(&self, data: Segments, len: usize) -> String {
        let mut joined = Vec::with_capacity(len);
        for seg in data.prefix(len) {
            joined.extend_from_slice(seg);
        }
        self.decode(&joined).into_owned()
    }
}

/// Decodes bytes according to the windows1252 code page
///
/// ```
/// use ck2json::{Windows1252Encoding, Encoding};
///
/// let encoding = Windows1252Encoding::new();
/// assert_eq!(encoding.decode(b"Common Sense"), "Common Sense");
/// assert_eq!(encoding.decode(b"\xa7GRichard Plantagenet\xa7"), "§GRichard Plantagenet§");
/// assert_eq!(encoding.decode(b"1066.9.15\n"), "1066.9.15\n");
/// assert_eq!(encoding.decode(b"\xff"), "ÿ");
/// assert_eq!(encoding.decode(b"\x8a"), "Š");
/// assert_eq!(encoding.decode(b"hi\x81\x8a"), "hi\u{81}Š");
/// ```
#[derive(Debug, Default, Copy, Clone)]
pub struct Windows1252Encoding;

impl Windows1252Encoding {
    /// Creates a new windows 1252 decoder
    pub fn new() -> Self {
        Windows1252Encoding
    }

    /// Static method for decoding windows 1252 data
    pub fn decode(data: &[u8]) -> Cow<str> {
        decode_windows1252(data)
    }
}

impl Encoding for Windows1252Encoding {
    fn decode<'a>(&self, data: &'a [u8]) -> Cow<'a, str> {
        Windows1252Encoding::decode(data)
    }

    /// Single byte code page: every segment decodes on its own straight into
    /// one pre-sized buffer
    fn decode_segments(&self, data: Segments, len: usize) -> String {
        let mut result = String::with_capacity(len);
        for seg in data.prefix(len) {
            windows_1252_extend(seg, &mut result);
        }
        result
    }
}

impl<T: Encoding + ?Sized> Encoding for &'_ T {
    fn decode<'a>(&self, data: &'a [u8]) -> Cow<'a, str> {
        (**self).decode(data)
    }

    fn decode_segments(&self, data: Segments, len: usize) -> String {
        (**self).decode_segments(data, len)
    }
}

/// Decodes bytes according to the utf8 standard, replacing invalid sequences
///
/// ```
/// use ck2json::{Utf8Encoding, Encoding};
///
/// let encoding = Utf8Encoding::new();
/// assert_eq!(encoding.decode(b"Common Sense"), "Common Sense");
/// assert_eq!(encoding.decode("Jåhkåmåhkke".as_bytes()), "Jåhkåmåhkke");
/// assert_eq!(encoding.decode(b"Joe\xffcheeze"), "Joe\u{FFFD}cheeze");
/// ```
#[derive(Debug, Default, Copy, Clone)]
pub struct Utf8Encoding;

impl Utf8Encoding {
    /// Creates a new utf8 decoder
    pub fn new() -> Self {
        Utf8Encoding
    }

    /// Static method for decoding utf8 data
    pub fn decode(data: &[u8]) -> Cow<str> {
        String::from_utf8_lossy(data)
    }
}

impl Encoding for Utf8Encoding {
    fn decode<'a>(&self, data: &'a [u8]) -> Cow<'a, str> {
        Utf8Encoding::decode(data)
    }
}

#[inline]
pub(crate) fn decode_windows1252(d: &[u8]) -> Cow<str> {
    if is_ascii(d) {
        // This is safe as we just checked that the data is ascii and ascii is a subset of utf8
        debug_assert!(std::str::from_utf8(d).is_ok());
        let s = unsafe { std::str::from_utf8_unchecked(d) };
        Cow::Borrowed(s)
    } else {
        let mut result = String::with_capacity(d.len() * 2);
        windows_1252_extend(d, &mut result);
        Cow::Owned(result)
    }
}

#[inline]
fn windows_1252_extend(d: &[u8], out: &mut String) {
    if is_ascii(d) {
        let s = unsafe { std::str::from_utf8_unchecked(d) };
        out.push_str(s);
    } else {
        out.extend(d.iter().map(|&c| WINDOWS_1252[usize::from(c)]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[test]
    fn windows1252_is_verbatim() {
        assert_eq!(Windows1252Encoding::decode(b""), "");
        assert_eq!(Windows1252Encoding::decode(b"new\n"), "new\n");
        assert_eq!(Windows1252Encoding::decode(br#""Captain \"Joe\"""#), r#""Captain \"Joe\"""#);
        assert_eq!(Windows1252Encoding::decode(b"new\xF8 "), "new\u{f8} ");
    }

    #[test]
    fn windows1252_segments_decode_into_one_string() {
        let segs = vec![b"Heinrich von ".to_vec(), b"\xdcber".to_vec(), b"lingen=".to_vec()];
        let view = Segments::new(&segs, 0);
        let decoded = Windows1252Encoding.decode_segments(view, 23);
        assert_eq!(decoded, "Heinrich von Überlingen");
    }

    #[test]
    fn utf8_segments_keep_split_characters() {
        let bytes = "Jåhk".as_bytes();
        let segs = vec![bytes[..2].to_vec(), bytes[2..].to_vec()];
        let decoded = Utf8Encoding.decode_segments(Segments::new(&segs, 0), bytes.len());
        assert_eq!(decoded, "Jåhk");
    }

    #[test]
    fn scalar_to_string_undefined_characters() {
        // According to the information on Microsoft's and the Unicode Consortium's websites,
        // positions 81, 8D, 8F, 90, and 9D are unused; however, the Windows API
        // MultiByteToWideChar maps these to the corresponding C1 control codes. The "best fit"
        // mapping documents this behavior, too

        let data = &[0x81, 0x8d, 0x8f, 0x90, 0x9d];
        let (cow, _) = encoding_rs::WINDOWS_1252.decode_without_bom_handling(data);
        assert_eq!(Windows1252Encoding::decode(data), cow);
    }

    #[quickcheck]
    fn decode_equality(data: Vec<u8>) -> bool {
        let (cow, _) = encoding_rs::WINDOWS_1252.decode_without_bom_handling(&data);
        cow == Windows1252Encoding::decode(&data)
    }

    #[quickcheck]
    fn segmented_decode_equality(data: Vec<u8>, split: usize) -> bool {
        let split = split % (data.len() + 1);
        let segs = vec![data[..split].to_vec(), data[split..].to_vec()];
        let view = Segments::new(&segs, 0);
        Windows1252Encoding.decode_segments(view, data.len()) == Windows1252Encoding::decode(&data)
    }
}
