#![no_main]
use ck2json::{ByteSource, Ck2Parser, Tokenizer};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let whole = ck2json::to_json_vec(data);
    if let Ok(out) = &whole {
        let _: serde_json::Value = serde_json::from_slice(out).unwrap();
    }

    // chunk boundaries must not change the token stream
    let expected = Tokenizer::new(ByteSource::builder().build(data)).read_all();
    let chunked = Tokenizer::new(ByteSource::builder().chunk_len(3).build(data)).read_all();
    if let (Ok(a), Ok(b)) = (&expected, &chunked) {
        assert_eq!(a, b);
    }

    let materialized = Ck2Parser::new().materialize_tokens(true).convert_slice(data);
    assert_eq!(whole.is_ok(), materialized.is_ok());
});
