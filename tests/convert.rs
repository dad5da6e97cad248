use ck2json::{json::JsonOptions, Ck2Parser, ErrorKind};
use serde_json::{json, Value};

const SAMPLE: &[u8] = include_bytes!("fixtures/sample.ck2");

fn expected_sample() -> Value {
    json!({
        "CK2txt": {
            "version": "2.8.3.4",
            "date": "1066.9.15",
            "player": { "id": 140, "type": 45 },
            "player_realm": "k_france",
            "player_name": "Philippe",
            "player_age": 6,
            "player_portrait": { "dna": "aagdaaaaaaa", "properties": "aq00000000000000" },
            "is_zeus_save": false,
            "game_speed": 1,
            "mapmode": 0,
            "playthrough_id": 1052,
            "checksum": "HPFXDWJZNDGQKWTXUNTZMHIGBC",
            "flags": {
                "aztec_explorers": "1066.9.15",
                "ai_flag_refuse_conversion": "1066.9.15"
            },
            "dynasties": {
                "1": {
                    "name": "Heinrich von Überlingen",
                    "culture": "german",
                    "religion": "catholic",
                    "coat_of_arms": {
                        "data": [0, 0, 0, 4, 6, 7, 0, 0],
                        "religion": "catholic"
                    }
                }
            },
            "character": {
                "140": {
                    "bn": "Philippe",
                    "b_d": "1052.5.23",
                    "wealth": 34.521,
                    "prestige": -12.0,
                    "traits": [12, 45, 67]
                }
            },
            "id": { "id": 71003, "type": 45 },
            "count": 1200
        }
    })
}

#[test]
fn sample_save_to_json() {
    let out = ck2json::to_json_vec(SAMPLE).unwrap();
    let actual: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(actual, expected_sample());
}

#[test]
fn sample_save_preserves_key_order() {
    let out = String::from_utf8(ck2json::to_json_vec(SAMPLE).unwrap()).unwrap();
    let version = out.find("\"version\"").unwrap();
    let date = out.find("\"date\"").unwrap();
    let count = out.find("\"count\"").unwrap();
    assert!(version < date && date < count);
}

#[test]
fn sample_save_pretty() {
    let parser = Ck2Parser::new().with_json_options(JsonOptions::new().with_prettyprint(true));
    let out = parser.convert_slice(SAMPLE).unwrap();
    assert!(out.starts_with(b"{\n  \"CK2txt\": {\n    \"version\": \"2.8.3.4\","));
    let actual: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(actual, expected_sample());
}

#[test]
fn version_and_date_document() {
    let out = ck2json::to_json_vec(b"CK2txt\n\tversion=\"1.0\"\n\tdate=1066.9.15\n").unwrap();
    assert_eq!(out, br#"{"CK2txt":{"version":"1.0","date":"1066.9.15"}}"#);
}

#[test]
fn flags_document() {
    let out = ck2json::to_json_vec(b"CK2txt\n\tflags={ a b c }\n").unwrap();
    assert_eq!(out, br#"{"CK2txt":{"flags":["a","b","c"]}}"#);
}

#[test]
fn player_document() {
    let out = ck2json::to_json_vec(b"CK2txt\n\tplayer={\n\t\tid=1\n\t\ttype=0\n\t}\n").unwrap();
    assert_eq!(out, br#"{"CK2txt":{"player":{"id":1,"type":0}}}"#);
}

#[test]
fn scalar_precedence_in_documents() {
    let data = b"CK2txt\na=yes\nb=no\nc=12.345\nd=12345\ne=12.3.45\nf=\"12345\"\ng=yesno\n";
    let out = ck2json::to_json_vec(&data[..]).unwrap();
    assert_eq!(
        out,
        &br#"{"CK2txt":{"a":true,"b":false,"c":12.345,"d":12345,"e":"12.3.45","f":"12345","g":"yesno"}}"#[..]
    );
}

#[test]
fn truncated_sample_is_unbalanced() {
    // cut just before the closing brace of the last group
    let end = SAMPLE.len() - b"count=1200\n}\n".len() - b"}\n".len();
    let err = ck2json::to_json_vec(&SAMPLE[..end]).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::UnbalancedGroups { .. }));
}

#[test]
fn unrecognized_scalar_is_fatal() {
    let err = ck2json::to_json_vec(b"CK2txt\nname=\xdcber\n").unwrap_err();
    match err.kind() {
        ErrorKind::UnrecognizedToken { token, index } => {
            assert_eq!(token, "Über");
            assert_eq!(*index, Some(2));
        }
        x => panic!("unexpected error: {:?}", x),
    }
}

#[test]
fn errors_display() {
    let err = ck2json::to_json_vec(b"CK2txt\nplayer={\nid=1\nstray\n}\n").unwrap_err();
    assert_eq!(
        err.to_string(),
        "value with no key in object context (token: \"stray\", index: 5)"
    );
}
