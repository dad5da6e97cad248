use crate::scan::Segments;
use crate::{Error, ErrorKind};
use std::io::{self, Read};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread::{self, JoinHandle};
use tracing::{debug, trace};

enum Chunk {
    Data(Vec<u8>),
    Eof,
    Failed(io::Error),
}

enum Pump<'r> {
    /// Reads happen on the consumer's thread when it asks for more bytes
    Inline {
        reader: Box<dyn Read + 'r>,
        chunk_len: usize,
    },

    /// A background thread reads ahead into a bounded channel
    Threaded {
        rx: Receiver<Chunk>,
        handle: Option<JoinHandle<()>>,
    },
}

/// Pulls bytes from an underlying reader and exposes the unconsumed bytes as
/// a growing, possibly segmented, window.
///
/// The consumer inspects [window](ByteSource::window), acknowledges bytes
/// with [consume](ByteSource::consume), and asks for more with
/// [fill](ByteSource::fill). Bytes that are consumed are released; bytes that
/// are not stay at the front of the window as it grows.
///
/// ```
/// use ck2json::ByteSource;
///
/// # fn main() -> Result<(), ck2json::Error> {
/// let mut source = ByteSource::builder().chunk_len(4).build(&b"CK2txt"[..]);
/// assert!(source.fill()?);
/// assert_eq!(source.window().len(), 4);
/// source.consume(2);
/// assert!(source.fill()?);
/// let window: Vec<u8> = source.window().iter().flatten().copied().collect();
/// assert_eq!(window, b"2txt");
/// assert!(!source.fill()?);
/// # Ok(())
/// # }
/// ```
pub struct ByteSource<'r> {
    pump: Pump<'r>,
    segments: Vec<Vec<u8>>,

    // consumed bytes within the first segment
    offset: usize,

    // number of bytes released from prior segments
    released: usize,
    finished: bool,
}

impl ByteSource<'static> {
    /// Initializes a default [ByteSourceBuilder]
    pub fn builder() -> ByteSourceBuilder {
        ByteSourceBuilder::default()
    }
}

impl<'r> ByteSource<'r> {
    /// The bytes received but not yet consumed
    #[inline]
    pub fn window(&self) -> Segments<'_> {
        Segments::new(&self.segments, self.offset)
    }

    /// Acknowledges that the first `amt` bytes of the window have been
    /// consumed. Fully consumed segments are released.
    pub fn consume(&mut self, amt: usize) {
        debug_assert!(amt <= self.window().len());
        self.offset += amt;
        let mut drained = 0;
        while let Some(front) = self.segments.get(drained) {
            if self.offset < front.len() {
                break;
            }

            self.offset -= front.len();
            self.released += front.len();
            drained += 1;
        }

        self.segments.drain(..drained);
    }

    /// Absolute stream offset of the start of the window
    #[inline]
    pub fn position(&self) -> usize {
        self.released + self.offset
    }

    /// Returns true once the underlying reader has been exhausted
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Waits for at least one more chunk of bytes to be appended to the
    /// window. Returns `false` once the end of the stream has been reached.
    ///
    /// A read error from the underlying stream is returned here, and the
    /// source is considered finished afterwards.
    pub fn fill(&mut self) -> Result<bool, Error> {
        if self.finished {
            return Ok(false);
        }

        let chunk = match self.pump {
            Pump::Inline {
                ref mut reader,
                chunk_len,
            } => read_chunk(reader, chunk_len),
            Pump::Threaded {
                ref rx,
                ref mut handle,
            } => match rx.recv() {
                Ok(chunk) => chunk,
                Err(mpsc::RecvError) => {
                    let panicked = handle.take().map_or(false, |h| h.join().is_err());
                    let msg = if panicked {
                        "byte pump panicked"
                    } else {
                        "byte pump terminated before end of stream"
                    };
                    Chunk::Failed(io::Error::new(io::ErrorKind::Other, msg))
                }
            },
        };

        match chunk {
            Chunk::Data(data) => {
                trace!(len = data.len(), position = self.position(), "received chunk");
                self.segments.push(data);
                Ok(true)
            }
            Chunk::Eof => {
                self.finished = true;
                Ok(false)
            }
            Chunk::Failed(e) => {
                self.finished = true;
                Err(Error::new(ErrorKind::Io(e)))
            }
        }
    }
}

impl std::fmt::Debug for ByteSource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mode = match self.pump {
            Pump::Inline { .. } => "inline",
            Pump::Threaded { .. } => "threaded",
        };

        f.debug_struct("ByteSource")
            .field("mode", &mode)
            .field("segments", &self.segments.len())
            .field("window_len", &self.window().len())
            .field("position", &self.position())
            .field("finished", &self.finished)
            .finish()
    }
}

fn read_chunk<R: Read + ?Sized>(reader: &mut R, chunk_len: usize) -> Chunk {
    let mut buf = vec![0u8; chunk_len];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => return Chunk::Eof,
            Ok(read) => {
                buf.truncate(read);
                return Chunk::Data(buf);
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Chunk::Failed(e),
        }
    }
}

fn pump<R: Read>(mut reader: R, tx: SyncSender<Chunk>, chunk_len: usize) {
    debug!(chunk_len, "byte pump started");
    let mut total = 0usize;
    loop {
        let chunk = read_chunk(&mut reader, chunk_len);
        let last = match chunk {
            Chunk::Data(ref data) => {
                total += data.len();
                false
            }
            Chunk::Eof | Chunk::Failed(_) => true,
        };

        // A send fails once the consumer has gone away. The bytes of the
        // read that was in flight are discarded along with the reader.
        if tx.send(chunk).is_err() {
            debug!(total, "byte source dropped, stopping pump");
            return;
        }

        if last {
            debug!(total, "byte pump finished");
            return;
        }
    }
}

/// Configures how a [ByteSource] reads ahead
///
/// ```
/// use ck2json::ByteSource;
///
/// # fn main() -> Result<(), ck2json::Error> {
/// let data = std::io::Cursor::new(b"CK2txt\nversion=\"1.0\"\n".to_vec());
/// let mut source = ByteSource::builder()
///     .chunk_len(8)
///     .high_watermark(64)
///     .spawn(data)?;
///
/// let mut total = 0;
/// while source.fill()? {
///     let len = source.window().len();
///     total += len;
///     source.consume(len);
/// }
/// assert_eq!(total, 21);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteSourceBuilder {
    chunk_len: usize,
    high_watermark: usize,
}

impl Default for ByteSourceBuilder {
    fn default() -> Self {
        Self {
            chunk_len: 32 * 1024, // default buffer size in flate2
            high_watermark: 1024 * 1024,
        }
    }
}

impl ByteSourceBuilder {
    /// Size of each read issued against the underlying stream
    pub fn chunk_len(mut self, val: usize) -> ByteSourceBuilder {
        self.chunk_len = val.max(1);
        self
    }

    /// Upper bound of bytes a background pump reads ahead of the consumer
    /// before it pauses
    pub fn high_watermark(mut self, val: usize) -> ByteSourceBuilder {
        self.high_watermark = val;
        self
    }

    /// Number of chunks that may be in flight between pump and consumer
    pub(crate) fn capacity(&self) -> usize {
        (self.high_watermark / self.chunk_len).max(1)
    }

    /// Creates a source that reads from `reader` on demand, on the caller's
    /// thread
    pub fn build<'r, R>(self, reader: R) -> ByteSource<'r>
    where
        R: Read + 'r,
    {
        ByteSource {
            pump: Pump::Inline {
                reader: Box::new(reader),
                chunk_len: self.chunk_len,
            },
            segments: Vec::new(),
            offset: 0,
            released: 0,
            finished: false,
        }
    }

    /// Creates a source that reads from `reader` on a background thread,
    /// pausing whenever the reader is `high_watermark` bytes ahead
    pub fn spawn<R>(self, reader: R) -> Result<ByteSource<'static>, Error>
    where
        R: Read + Send + 'static,
    {
        let (tx, rx) = mpsc::sync_channel(self.capacity());
        let chunk_len = self.chunk_len;
        let handle = thread::Builder::new()
            .name(String::from("ck2json-pump"))
            .spawn(move || pump(reader, tx, chunk_len))?;

        Ok(ByteSource {
            pump: Pump::Threaded {
                rx,
                handle: Some(handle),
            },
            segments: Vec::new(),
            offset: 0,
            released: 0,
            finished: false,
        })
    }
}
