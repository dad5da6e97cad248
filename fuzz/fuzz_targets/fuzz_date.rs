#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let txt = ck2json::Windows1252Encoding::decode(data);
    if let Some(d) = ck2json::Date::parse(&txt) {
        let again = ck2json::Date::parse(&d.to_string());
        assert_eq!(again, Some(d));
    }
});
