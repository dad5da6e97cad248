/*!

A streaming converter from [Crusader Kings
II](https://en.wikipedia.org/wiki/Crusader_Kings_II) plaintext saves
(`CK2txt`) to JSON.

## Features

- Streaming: save bytes are read ahead on a background thread into a bounded
  buffer while tokens are turned into JSON as they arrive
- Typed: every leaf is classified as a string, date, float, bool, integer, or
  bare symbol before being written
- Faithful: text is decoded with the Windows-1252 code page CK2 writes saves in

## Quick Start

```rust
let data = b"CK2txt\n\tversion=\"1.0\"\n\tdate=1066.9.15\n";
let json = ck2json::to_json_vec(&data[..]).unwrap();
assert_eq!(json, br#"{"CK2txt":{"version":"1.0","date":"1066.9.15"}}"#);
```

Groups are arrays when their first token is a value and objects otherwise.

```rust
let data = b"CK2txt\nflags={ a b c }\nplayer=\n{\n\tid=1\n\ttype=0\n}\n}\n";
let json = ck2json::to_json_vec(&data[..]).unwrap();
assert_eq!(json, br#"{"CK2txt":{"flags":["a","b","c"],"player":{"id":1,"type":0}}}"#);
```

## Saves on Disk

[SaveGame] converts a whole save and exposes well known fields.

```rust,no_run
use ck2json::SaveGame;

# fn main() -> Result<(), ck2json::Error> {
let dir = ck2json::save_game_location().unwrap();
let save = SaveGame::open(dir.join("autosave.ck2"))?;
println!("{:?} {:?}", save.player_name(), save.date());
# Ok(())
# }
```

## One Level Lower

The pipeline stages are public. A [ByteSource] feeds a [Tokenizer] whose
tokens are pushed into a [DocumentBuilder](builder::DocumentBuilder), and
[Ck2Parser] wires them together with configurable options.

```rust
use ck2json::{ByteSource, Token, TokenKind, Tokenizer};

# fn main() -> Result<(), ck2json::Error> {
let source = ByteSource::builder().chunk_len(4).build(&b"CK2txt\na=yes"[..]);
let tokens = Tokenizer::new(source).read_all()?;
assert_eq!(
    tokens,
    vec![
        Token::new("CK2txt", TokenKind::Value),
        Token::new("a", TokenKind::Equal),
        Token::new("yes", TokenKind::Value),
    ]
);
# Ok(())
# }
```
*/

pub mod builder;
mod data;
mod date;
mod encoding;
mod errors;
pub mod json;
mod parser;
mod save;
mod scalar;
mod scan;
mod source;
mod stack;
mod tokenizer;
pub(crate) mod util;

pub use self::date::{Date, DateError};
pub use self::encoding::{Encoding, Utf8Encoding, Windows1252Encoding};
pub use self::errors::*;
pub use self::parser::Ck2Parser;
pub use self::save::{save_game_location, Player, SaveGame};
pub use self::scalar::{classify, split_list, ListItems, Scalar};
pub use self::scan::{position_of_any, DelimiterSet, Position, Segments};
pub use self::source::{ByteSource, ByteSourceBuilder};
pub use self::stack::{Frame, FrameStack};
pub use self::tokenizer::{Token, TokenKind, Tokenizer, TokenizerOptions};

use std::io::{Read, Write};

/// Converts CK2txt read on a background thread with default options,
/// writing JSON to `writer`
pub fn to_json_writer<R, W>(reader: R, writer: W) -> Result<W, Error>
where
    R: Read + Send + 'static,
    W: Write,
{
    Ck2Parser::new().convert(reader, writer)
}

/// Converts in-memory CK2txt with default options
pub fn to_json_vec(data: &[u8]) -> Result<Vec<u8>, Error> {
    Ck2Parser::new().convert_slice(data)
}
