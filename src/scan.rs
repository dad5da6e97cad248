//! Delimiter search over buffered, possibly discontiguous, byte segments.

use std::iter;

/// A fixed membership table over all byte values.
///
/// Built at compile time so the tokenizer's delimiter sets live in immutable
/// statics.
///
/// ```
/// use ck2json::DelimiterSet;
///
/// const SET: DelimiterSet = DelimiterSet::new(b"{}=");
/// assert!(SET.contains(b'='));
/// assert!(!SET.contains(b'a'));
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct DelimiterSet {
    table: [bool; 256],
}

impl DelimiterSet {
    /// Creates a set containing each of the given bytes
    pub const fn new(bytes: &[u8]) -> DelimiterSet {
        let mut table = [false; 256];
        let mut i = 0;
        while i < bytes.len() {
            table[bytes[i] as usize] = true;
            i += 1;
        }
        DelimiterSet { table }
    }

    /// Returns a copy of the set with one more byte
    pub const fn with(mut self, byte: u8) -> DelimiterSet {
        self.table[byte as usize] = true;
        self
    }

    #[inline]
    pub fn contains(&self, byte: u8) -> bool {
        self.table[usize::from(byte)]
    }
}

impl std::fmt::Debug for DelimiterSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let members = (0..=255u8).filter(|&b| self.contains(b));
        f.debug_set().entries(members.map(char::from)).finish()
    }
}

/// A read-only view over buffered bytes that may be split across several
/// segments. The first segment may be partially consumed.
#[derive(Debug, Clone, Copy)]
pub struct Segments<'a> {
    head: &'a [u8],
    tail: &'a [Vec<u8>],
}

impl<'a> Segments<'a> {
    /// A view over a single contiguous slice
    pub fn single(data: &'a [u8]) -> Segments<'a> {
        Segments { head: data, tail: &[] }
    }

    /// A view over owned segments where the first `offset` bytes of the first
    /// segment have already been consumed
    pub fn new(segments: &'a [Vec<u8>], offset: usize) -> Segments<'a> {
        match segments.split_first() {
            Some((first, rest)) => Segments {
                head: &first[offset..],
                tail: rest,
            },
            None => {
                debug_assert_eq!(offset, 0);
                Segments { head: &[], tail: &[] }
            }
        }
    }

    #[inline]
    pub fn is_single_segment(&self) -> bool {
        self.tail.is_empty()
    }

    pub fn len(&self) -> usize {
        self.head.len() + self.tail.iter().map(|x| x.len()).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_empty() && self.tail.iter().all(|x| x.is_empty())
    }

    /// The segments in order
    pub fn iter(&self) -> impl Iterator<Item = &'a [u8]> + 'a {
        iter::once(self.head).chain(self.tail.iter().map(|x| x.as_slice()))
    }

    /// The segments covering the first `len` bytes of the view
    pub fn prefix(&self, len: usize) -> impl Iterator<Item = &'a [u8]> + 'a {
        let mut remaining = len;
        self.iter().map_while(move |seg| {
            if remaining == 0 {
                return None;
            }

            let take = seg.len().min(remaining);
            remaining -= take;
            Some(&seg[..take])
        })
    }

    /// Returns the view with the first `amt` bytes removed
    pub fn skip(&self, mut amt: usize) -> Segments<'a> {
        if amt <= self.head.len() {
            return Segments {
                head: &self.head[amt..],
                tail: self.tail,
            };
        }

        amt -= self.head.len();
        for (i, seg) in self.tail.iter().enumerate() {
            if amt <= seg.len() {
                return Segments {
                    head: &seg[amt..],
                    tail: &self.tail[i + 1..],
                };
            }
            amt -= seg.len();
        }

        Segments { head: &[], tail: &[] }
    }
}

/// Location of a match within a [Segments] view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Index of the segment that holds the match
    pub segment: usize,

    /// Offset within that segment (relative to the view for segment zero)
    pub offset: usize,

    /// Offset from the start of the view
    pub absolute: usize,

    /// The matched byte
    pub byte: u8,
}

/// Returns the first position of any byte of `set` within the buffered
/// bytes, or `None` if nothing currently buffered matches.
///
/// ```
/// use ck2json::{position_of_any, DelimiterSet, Segments};
///
/// const SET: DelimiterSet = DelimiterSet::new(b"=");
/// let pos = position_of_any(Segments::single(b"abc=1"), &SET).unwrap();
/// assert_eq!(pos.absolute, 3);
/// ```
#[inline]
pub fn position_of_any(data: Segments, set: &DelimiterSet) -> Option<Position> {
    if data.is_single_segment() {
        data.head
            .iter()
            .position(|&b| set.contains(b))
            .map(|offset| Position {
                segment: 0,
                offset,
                absolute: offset,
                byte: data.head[offset],
            })
    } else {
        position_of_any_multi_segment(data, set)
    }
}

fn position_of_any_multi_segment(data: Segments, set: &DelimiterSet) -> Option<Position> {
    let mut consumed = 0;
    for (segment, seg) in data.iter().enumerate() {
        if let Some(offset) = seg.iter().position(|&b| set.contains(b)) {
            return Some(Position {
                segment,
                offset,
                absolute: consumed + offset,
                byte: seg[offset],
            });
        }

        consumed += seg.len();
    }

    None
}
