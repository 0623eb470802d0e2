mod common;

use code_reasoner::bridge::TokenBridge;
use code_reasoner::error::ReasonerError;
use common::{test_tokenizer, token_id};

#[test]
fn marker_free_text_round_trips() {
    let bridge = TokenBridge::new(test_tokenizer(), 64).unwrap();
    let text = "def add ( x , y ) : return x + y";

    let sequence = bridge.encode(text).unwrap();

    assert!(sequence.mask_positions().is_empty());
    assert_eq!(bridge.decode(&sequence).unwrap(), text);
}

#[test]
fn marker_variants_normalize_to_one_mask() {
    let bridge = TokenBridge::new(test_tokenizer(), 64).unwrap();

    for text in [
        "def [MASK] ( x )",
        "def [mask] ( x )",
        "def <MASK> ( x )",
        "def <mask> ( x )",
    ] {
        let sequence = bridge.encode(text).unwrap();
        assert_eq!(sequence.mask_positions(), &[1], "for input {text:?}");
        assert_eq!(sequence.ids()[1], bridge.mask_id());
    }
}

#[test]
fn masked_positions_match_marker_order() {
    let bridge = TokenBridge::new(test_tokenizer(), 64).unwrap();

    let sequence = bridge.encode("for [MASK] in [MASK] :").unwrap();

    assert_eq!(sequence.mask_positions(), &[1, 3]);
    assert!(sequence.is_masked(1));
    assert!(!sequence.is_masked(2));
    assert_eq!(sequence.first_mask(), Some(1));
}

#[test]
fn oversized_input_is_malformed() {
    let bridge = TokenBridge::new(test_tokenizer(), 4).unwrap();

    let err = bridge
        .encode("def add ( x , y ) : return x + y")
        .unwrap_err();

    assert!(matches!(err, ReasonerError::MalformedInput(_)));
}

#[test]
fn decode_with_substitutes_resolutions_in_position_order() {
    let bridge = TokenBridge::new(test_tokenizer(), 64).unwrap();
    let sequence = bridge.encode("def [MASK] ( [MASK] )").unwrap();

    let text = bridge
        .decode_with(&sequence, |position| match position {
            1 => Some("add".to_string()),
            3 => Some("x".to_string()),
            _ => None,
        })
        .unwrap();

    assert_eq!(text, "def add ( x )");
}

#[test]
fn unresolved_positions_keep_their_marker() {
    let bridge = TokenBridge::new(test_tokenizer(), 64).unwrap();
    let sequence = bridge.encode("def [MASK] ( [MASK] )").unwrap();

    let text = bridge
        .decode_with(&sequence, |position| {
            (position == 1).then(|| "add".to_string())
        })
        .unwrap();

    assert_eq!(text, "def add ( [MASK] )");
}

#[test]
fn fragments_encode_without_special_tokens() {
    let bridge = TokenBridge::new(test_tokenizer(), 64).unwrap();

    assert_eq!(bridge.encode_fragment("add").unwrap(), vec![token_id("add")]);
    assert_eq!(
        bridge.encode_fragment("x y").unwrap(),
        vec![token_id("x"), token_id("y")]
    );
    assert_eq!(
        bridge.encode_fragment("somethingunknown").unwrap(),
        vec![token_id("[UNK]")]
    );
}
