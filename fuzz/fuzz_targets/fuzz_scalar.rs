#![no_main]
use ck2json::{classify, split_list, Scalar};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = ck2json::Windows1252Encoding::decode(data);
    if let Ok(Scalar::Int(x)) = classify(&text) {
        let canonical = x.to_string();
        assert_eq!(classify(&canonical).ok(), Some(Scalar::Int(x)));
    }

    for item in split_list(&text) {
        assert!(!item.is_empty());
    }
});
